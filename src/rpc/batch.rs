//! Name-based heuristics that decide which methods get DataLoader wrappers.
//!
//! Everything here is a pure function of descriptors and names.

use prost_types::field_descriptor_proto::Label;
use prost_types::{DescriptorProto, FieldDescriptorProto, MethodDescriptorProto};

/// A `BatchXxx` method that can back a synthesized single-key `GetXxx`.
#[derive(Debug, Clone)]
pub struct BatchMethod<'a> {
    pub method: &'a MethodDescriptorProto,
    /// Name of the synthesized single-key method.
    pub single_method_name: String,
    /// The request's only field: the list of keys.
    pub input_field: &'a FieldDescriptorProto,
    /// The response's only field: a list or a map of results.
    pub output_field: &'a FieldDescriptorProto,
}

/// Detect a batch method: its name starts with `Batch` and both the request
/// and the response consist of exactly one repeated field.
pub fn detect_batch_method<'a>(
    method: &'a MethodDescriptorProto,
    input: &'a DescriptorProto,
    output: &'a DescriptorProto,
) -> Option<BatchMethod<'a>> {
    let single_method_name = companion_name(method.name())?;
    let input_field = single_repeated_field(input)?;
    let output_field = single_repeated_field(output)?;
    Some(BatchMethod {
        method,
        single_method_name,
        input_field,
        output_field,
    })
}

fn single_repeated_field(message: &DescriptorProto) -> Option<&FieldDescriptorProto> {
    match message.field.as_slice() {
        [field] if field.label() == Label::Repeated => Some(field),
        _ => None,
    }
}

/// `BatchGetWidgets` -> `GetWidget`, `BatchTags` -> `GetTag`.
///
/// `None` when `name` does not start with `Batch` or nothing follows it.
pub fn companion_name(name: &str) -> Option<String> {
    let rest = name.strip_prefix("Batch").filter(|r| !r.is_empty())?;
    let getter = if rest.starts_with("Get") {
        rest.to_string()
    } else {
        format!("Get{}", rest)
    };
    Some(singular(&getter))
}

/// Drop one trailing `s`. Naive, and only used for generated names.
pub fn singular(name: &str) -> String {
    name.strip_suffix('s').unwrap_or(name).to_string()
}

/// Methods named `GetXxx` are wrapped in a per-context request cache.
pub fn is_cacheable(name: &str) -> bool {
    name.strip_prefix("Get")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}
