//! SDL compilation: turn a schema document into an executable schema.
//!
//! Sources ship plain SDL; compiling each document into an
//! `async_graphql::dynamic::Schema` means requests run through the real
//! engine: validation, introspection, argument coercion, error shapes.
//! Data fields resolve to null (a mounted document describes a type system,
//! not a data source); sources that need live resolvers hand over a prebuilt
//! schema via [`StaticSource`](crate::source::StaticSource) instead.

use async_graphql::{
    dynamic::{
        Enum, EnumItem, Field, FieldFuture, InputObject, InputValue, Interface, InterfaceField,
        Object, Scalar, Schema, SchemaBuilder, TypeRef, Union,
    },
    parser::{
        parse_schema,
        types::{
            BaseType, EnumType, FieldDefinition, InputObjectType, InputValueDefinition,
            InterfaceType, ObjectType, ServiceDocument, Type, TypeDefinition, TypeKind,
            TypeSystemDefinition, UnionType,
        },
    },
};

use crate::{error::SchemaError, source::LoadedSchema};

/// Compile an SDL document into an executable schema.
///
/// `name` is the source's base name, used only in error values. Type
/// extensions and directive definitions are skipped; subscription roots are
/// not mounted (the gateway serves queries and mutations over HTTP).
pub fn compile_sdl(name: &str, sdl: &str) -> Result<LoadedSchema, SchemaError> {
    let invalid = |message: String| SchemaError::InvalidSdl {
        name: name.to_string(),
        message,
    };

    let doc = parse_schema(sdl).map_err(|e| invalid(e.to_string()))?;

    let (query_root, mutation_root) = root_names(&doc);
    if !defines_object(&doc, &query_root) {
        return Err(SchemaError::MissingSchema {
            name: name.to_string(),
        });
    }

    let mut builder = Schema::build(&query_root, mutation_root.as_deref(), None);
    for definition in &doc.definitions {
        let TypeSystemDefinition::Type(ty) = definition else {
            continue;
        };
        if ty.node.extend {
            continue;
        }
        builder = register_type(builder, &ty.node);
    }

    builder
        .finish()
        .map(LoadedSchema::new)
        .map_err(|e| invalid(e.to_string()))
}

/// Root operation names: the explicit `schema { ... }` declaration when
/// present, otherwise the conventional `Query`/`Mutation` defaults.
fn root_names(doc: &ServiceDocument) -> (String, Option<String>) {
    for definition in &doc.definitions {
        if let TypeSystemDefinition::Schema(schema) = definition {
            if schema.node.extend {
                continue;
            }
            let query = schema
                .node
                .query
                .as_ref()
                .map_or_else(|| "Query".to_string(), |n| n.node.to_string());
            let mutation = schema.node.mutation.as_ref().map(|n| n.node.to_string());
            return (query, mutation);
        }
    }
    let mutation = defines_object(doc, "Mutation").then(|| "Mutation".to_string());
    ("Query".to_string(), mutation)
}

fn defines_object(doc: &ServiceDocument, name: &str) -> bool {
    doc.definitions.iter().any(|definition| match definition {
        TypeSystemDefinition::Type(ty) => {
            !ty.node.extend
                && ty.node.name.node.as_str() == name
                && matches!(ty.node.kind, TypeKind::Object(_))
        },
        _ => false,
    })
}

fn register_type(builder: SchemaBuilder, definition: &TypeDefinition) -> SchemaBuilder {
    let name = definition.name.node.as_str();
    let description = definition.description.as_ref().map(|d| d.node.clone());
    match &definition.kind {
        TypeKind::Scalar => {
            let mut scalar = Scalar::new(name.to_string());
            if let Some(d) = description {
                scalar = scalar.description(d);
            }
            builder.register(scalar)
        },
        TypeKind::Object(object) => builder.register(object_type(name, description, object)),
        TypeKind::Interface(interface) => {
            builder.register(interface_type(name, description, interface))
        },
        TypeKind::Union(union) => builder.register(union_type(name, description, union)),
        TypeKind::Enum(variants) => builder.register(enum_type(name, description, variants)),
        TypeKind::InputObject(input) => {
            builder.register(input_object_type(name, description, input))
        },
    }
}

fn object_type(name: &str, description: Option<String>, definition: &ObjectType) -> Object {
    let mut object = Object::new(name.to_string());
    if let Some(d) = description {
        object = object.description(d);
    }
    for interface in &definition.implements {
        object = object.implement(interface.node.to_string());
    }
    for field in &definition.fields {
        object = object.field(data_field(&field.node));
    }
    object
}

/// A field that resolves to null. The engine still validates selections and
/// arguments against the type system; selecting a non-null field surfaces the
/// usual execution error.
fn data_field(definition: &FieldDefinition) -> Field {
    let mut field = Field::new(
        definition.name.node.to_string(),
        type_ref(&definition.ty.node),
        |_| FieldFuture::from_value(None),
    );
    if let Some(d) = &definition.description {
        field = field.description(d.node.clone());
    }
    for argument in &definition.arguments {
        field = field.argument(input_value(&argument.node));
    }
    field
}

fn interface_type(
    name: &str,
    description: Option<String>,
    definition: &InterfaceType,
) -> Interface {
    let mut interface = Interface::new(name.to_string());
    if let Some(d) = description {
        interface = interface.description(d);
    }
    for field in &definition.fields {
        let mut interface_field = InterfaceField::new(
            field.node.name.node.to_string(),
            type_ref(&field.node.ty.node),
        );
        if let Some(d) = &field.node.description {
            interface_field = interface_field.description(d.node.clone());
        }
        for argument in &field.node.arguments {
            interface_field = interface_field.argument(input_value(&argument.node));
        }
        interface = interface.field(interface_field);
    }
    interface
}

fn union_type(name: &str, description: Option<String>, definition: &UnionType) -> Union {
    let mut union = Union::new(name.to_string());
    if let Some(d) = description {
        union = union.description(d);
    }
    for member in &definition.members {
        union = union.possible_type(member.node.to_string());
    }
    union
}

fn enum_type(name: &str, description: Option<String>, definition: &EnumType) -> Enum {
    let mut items = Enum::new(name.to_string());
    if let Some(d) = description {
        items = items.description(d);
    }
    for value in &definition.values {
        let mut item = EnumItem::new(value.node.value.node.to_string());
        if let Some(d) = &value.node.description {
            item = item.description(d.node.clone());
        }
        items = items.item(item);
    }
    items
}

fn input_object_type(
    name: &str,
    description: Option<String>,
    definition: &InputObjectType,
) -> InputObject {
    let mut input = InputObject::new(name.to_string());
    if let Some(d) = description {
        input = input.description(d);
    }
    for field in &definition.fields {
        input = input.field(input_value(&field.node));
    }
    input
}

fn input_value(definition: &InputValueDefinition) -> InputValue {
    let mut value = InputValue::new(
        definition.name.node.to_string(),
        type_ref(&definition.ty.node),
    );
    if let Some(d) = &definition.description {
        value = value.description(d.node.clone());
    }
    if let Some(default) = &definition.default_value {
        value = value.default_value(default.node.clone());
    }
    value
}

fn type_ref(ty: &Type) -> TypeRef {
    let base = match &ty.base {
        BaseType::Named(name) => TypeRef::Named(name.to_string().into()),
        BaseType::List(inner) => TypeRef::List(Box::new(type_ref(inner))),
    };
    if ty.nullable {
        base
    } else {
        TypeRef::NonNull(Box::new(base))
    }
}
