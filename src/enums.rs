//! Enum generation.
//!
//! An enum becomes a const object of numbered members plus a numeric-literal
//! union type of the same name. `UNRECOGNIZED = -1` is always appended so
//! unknown wire values have somewhere to land.

use std::collections::HashSet;

use prost_types::EnumDescriptorProto;

use crate::code::{CodeBlock, FunctionSpec, FunctionStyle, TypeName};
use crate::options::GenerationOptions;
use crate::source_info::{fields, SourceInfo};

pub const UNRECOGNIZED_NAME: &str = "UNRECOGNIZED";
pub const UNRECOGNIZED_VALUE: i32 = -1;

pub fn generate_enum(
    ts_name: &str,
    descriptor: &EnumDescriptorProto,
    source: &SourceInfo<'_>,
    options: &GenerationOptions,
) -> CodeBlock {
    let mut code = CodeBlock::new();
    code.doc(source.description().text().as_deref());
    code.begin_control_flow(format!("export const {} =", ts_name));

    for (index, value) in descriptor.value.iter().enumerate() {
        if let Some(doc) = source.lookup(fields::enumeration::VALUE, index).text() {
            code.doc(Some(format!("{} - {}", value.name(), doc).as_str()));
        }
        code.line(format!("{}: {} as {},", value.name(), value.number(), ts_name));
    }
    code.line(format!("{}: {} as {},", UNRECOGNIZED_NAME, UNRECOGNIZED_VALUE, ts_name));

    if options.output_json_methods {
        generate_from_json(ts_name, descriptor).emit(FunctionStyle::HashEntry, &mut code);
        generate_to_json(ts_name, descriptor).emit(FunctionStyle::HashEntry, &mut code);
    }
    code.dedent().line("};");
    code.blank();

    let mut numbers: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for number in descriptor.value.iter().map(|v| v.number()).chain([UNRECOGNIZED_VALUE]) {
        if seen.insert(number) {
            numbers.push(number.to_string());
        }
    }
    code.statement(format!("export type {} = {}", ts_name, numbers.join(" | ")));
    code
}

/// Members whose number was not already taken by an earlier member.
fn first_by_number(descriptor: &EnumDescriptorProto) -> impl Iterator<Item = (&str, i32, bool)> + '_ {
    let mut seen = HashSet::new();
    descriptor
        .value
        .iter()
        .map(move |v| (v.name(), v.number(), seen.insert(v.number())))
}

/// Accepts the number or the name; anything else is `UNRECOGNIZED`.
fn generate_from_json(ts_name: &str, descriptor: &EnumDescriptorProto) -> FunctionSpec {
    let mut body = CodeBlock::new();
    body.begin_control_flow("switch (object)");
    let mut unrecognized_taken = false;
    for (name, number, first) in first_by_number(descriptor) {
        if first {
            body.line(format!("case {}:", number));
        }
        unrecognized_taken |= number == UNRECOGNIZED_VALUE && first;
        body.line(format!("case \"{}\":", name))
            .indent()
            .statement(format!("return {}.{}", ts_name, name))
            .dedent();
    }
    if !unrecognized_taken {
        body.line(format!("case {}:", UNRECOGNIZED_VALUE));
    }
    body.line(format!("case \"{}\":", UNRECOGNIZED_NAME))
        .line("default:")
        .indent()
        .statement(format!("return {}.{}", ts_name, UNRECOGNIZED_NAME))
        .dedent()
        .end_control_flow();

    FunctionSpec::new("fromJSON")
        .param("object", TypeName::simple("any"))
        .returns(TypeName::simple(ts_name))
        .body(body)
}

/// Maps each number to its first declared name; unknown numbers become `"UNKNOWN"`.
fn generate_to_json(ts_name: &str, descriptor: &EnumDescriptorProto) -> FunctionSpec {
    let mut body = CodeBlock::new();
    body.begin_control_flow("switch (object)");
    for (name, _, first) in first_by_number(descriptor) {
        if !first {
            continue;
        }
        body.line(format!("case {}.{}:", ts_name, name))
            .indent()
            .statement(format!("return \"{}\"", name))
            .dedent();
    }
    body.line("default:")
        .indent()
        .statement("return \"UNKNOWN\"")
        .dedent()
        .end_control_flow();

    FunctionSpec::new("toJSON")
        .param("object", TypeName::simple(ts_name))
        .returns(TypeName::string())
        .body(body)
}
