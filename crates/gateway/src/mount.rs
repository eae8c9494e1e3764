use serde::{Deserialize, Serialize};

/// Derive the endpoint mount path for a schema source's base name: strip
/// everything from the first `.` onward, then case-fold.
///
/// Truncation happens at the first separator, not the last:
/// `Posts.v2.graphql` mounts at `/posts`, not `/posts.v2`. A dotfile
/// truncates to the empty segment and mounts at `/`.
pub fn mount_name(source_name: &str) -> String {
    let stem = source_name
        .split_once('.')
        .map_or(source_name, |(stem, _)| stem);
    stem.to_lowercase()
}

/// What to do when two sources derive the same mount path.
///
/// Which candidate is "first" or "last" follows enumeration order, which is
/// filesystem-defined and not stable across machines. Treat a collision as a
/// misnamed schema set; the policy only decides how loudly to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Fail the whole assembly.
    Reject,
    /// Keep the first registration, drop later ones (logged).
    FirstWins,
    /// Overwrite with the later registration (logged). The last candidate
    /// in enumeration order wins.
    #[default]
    LastWins,
}
