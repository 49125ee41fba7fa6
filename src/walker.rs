//! Recursive traversal of a file's type tree.
//!
//! At each scope all enums are visited before any message, and each message's
//! own children are visited before its next sibling. A nested type's target
//! name joins its ancestor chain with `_`; its schema name joins the same chain
//! with `.`.

use prost_types::{DescriptorProto, EnumDescriptorProto, FileDescriptorProto, ServiceDescriptorProto};

use crate::error::GenerateError;
use crate::options::GenerationOptions;
use crate::source_info::{fields, SourceInfo};

/// One visited node.
#[derive(Debug, Clone)]
pub struct Visit<'a, T> {
    /// Target-language name, e.g. `Outer_Inner`.
    pub ts_name: String,
    /// Schema name relative to the package, e.g. `Outer.Inner`.
    pub proto_name: String,
    pub descriptor: &'a T,
    pub source: SourceInfo<'a>,
}

/// Visit every enum and message in `file`, in pre-order.
pub fn visit<'a, M, E>(
    file: &'a FileDescriptorProto,
    source: &SourceInfo<'a>,
    options: &GenerationOptions,
    on_message: &mut M,
    on_enum: &mut E,
) -> Result<(), GenerateError>
where
    M: FnMut(Visit<'a, DescriptorProto>) -> Result<(), GenerateError>,
    E: FnMut(Visit<'a, EnumDescriptorProto>) -> Result<(), GenerateError>,
{
    let scope = Scope {
        enums: &file.enum_type,
        messages: &file.message_type,
        enum_field: fields::file::ENUM_TYPE,
        message_field: fields::file::MESSAGE_TYPE,
    };
    walk(scope, source, options, "", "", on_message, on_enum)
}

/// Visit only the messages of `file`.
pub fn visit_messages<'a, M>(
    file: &'a FileDescriptorProto,
    source: &SourceInfo<'a>,
    options: &GenerationOptions,
    on_message: &mut M,
) -> Result<(), GenerateError>
where
    M: FnMut(Visit<'a, DescriptorProto>) -> Result<(), GenerateError>,
{
    visit(file, source, options, on_message, &mut |_| Ok(()))
}

/// Visit the services of `file`. Services do not nest.
pub fn visit_services<'a, S>(
    file: &'a FileDescriptorProto,
    source: &SourceInfo<'a>,
    on_service: &mut S,
) -> Result<(), GenerateError>
where
    S: FnMut(&'a ServiceDescriptorProto, SourceInfo<'a>) -> Result<(), GenerateError>,
{
    for (index, service) in file.service.iter().enumerate() {
        on_service(service, source.open(fields::file::SERVICE, index))?;
    }
    Ok(())
}

struct Scope<'a> {
    enums: &'a [EnumDescriptorProto],
    messages: &'a [DescriptorProto],
    enum_field: i32,
    message_field: i32,
}

fn walk<'a, M, E>(
    scope: Scope<'a>,
    source: &SourceInfo<'a>,
    options: &GenerationOptions,
    ts_prefix: &str,
    proto_prefix: &str,
    on_message: &mut M,
    on_enum: &mut E,
) -> Result<(), GenerateError>
where
    M: FnMut(Visit<'a, DescriptorProto>) -> Result<(), GenerateError>,
    E: FnMut(Visit<'a, EnumDescriptorProto>) -> Result<(), GenerateError>,
{
    for (index, descriptor) in scope.enums.iter().enumerate() {
        let name = required_name(descriptor.name.as_deref(), proto_prefix)?;
        on_enum(Visit {
            ts_name: format!("{}{}", ts_prefix, options.maybe_snake_to_camel(name)),
            proto_name: format!("{}{}", proto_prefix, name),
            descriptor,
            source: source.open(scope.enum_field, index),
        })?;
    }

    for (index, descriptor) in scope.messages.iter().enumerate() {
        let name = required_name(descriptor.name.as_deref(), proto_prefix)?;
        let ts_name = format!("{}{}", ts_prefix, options.maybe_snake_to_camel(name));
        let proto_name = format!("{}{}", proto_prefix, name);
        let nested_source = source.open(scope.message_field, index);

        on_message(Visit {
            ts_name: ts_name.clone(),
            proto_name: proto_name.clone(),
            descriptor,
            source: nested_source.clone(),
        })?;

        let nested = Scope {
            enums: &descriptor.enum_type,
            messages: &descriptor.nested_type,
            enum_field: fields::message::ENUM_TYPE,
            message_field: fields::message::NESTED_TYPE,
        };
        walk(
            nested,
            &nested_source,
            options,
            &format!("{}_", ts_name),
            &format!("{}.", proto_name),
            on_message,
            on_enum,
        )?;
    }

    Ok(())
}

fn required_name<'n>(name: Option<&'n str>, scope: &str) -> Result<&'n str, GenerateError> {
    match name {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(GenerateError::MissingName(format!("{}<unnamed>", scope))),
    }
}
