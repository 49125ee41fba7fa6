//! JSON conversion generation (`fromJSON` / `toJSON`).

use crate::classify::{Classification, FieldKind, Scalar};
use crate::code::{CodeBlock, FunctionSpec, TypeName};
use crate::options::{GenerationOptions, LongOption};
use crate::runtime::helpers;

use super::seed_message;

/// `fromJSON(object: any): X`
pub fn generate_from_json(ts_name: &str, fields: &[Classification], options: &GenerationOptions) -> FunctionSpec {
    let mut body = CodeBlock::new();
    seed_message(ts_name, fields, &mut body);

    for field in fields {
        let source = format!("object.{}", field.name);
        let target = format!("message.{}", field.name);
        body.begin_control_flow(format!(
            "if ({s} !== undefined && {s} !== null)",
            s = source
        ));

        match &field.kind {
            FieldKind::Map(map) => {
                let key = if map.numeric_key(options) { "Number(key)" } else { "key" };
                let value = from_json_value(&map.value, "value", options, &mut body);
                body.begin_lambda(format!("Object.entries({}).forEach(([key, value]) =>", source))
                    .statement(format!("{}[{}] = {}", target, key, value))
                    .end_lambda(");");
            }
            kind if field.repeated => {
                let value = from_json_value(kind, "e", options, &mut body);
                body.begin_control_flow(format!("for (const e of {})", source))
                    .statement(format!("{}.push({})", target, value))
                    .end_control_flow();
            }
            kind => {
                let value = from_json_value(kind, &source, options, &mut body);
                body.statement(format!("{} = {}", target, value));
            }
        }

        if !field.repeated {
            let default = if field.oneof {
                "undefined".to_string()
            } else {
                field.default_value(options, &mut body)
            };
            body.next_control_flow("else")
                .statement(format!("{} = {}", target, default));
        }
        body.end_control_flow();
    }

    body.statement("return message");

    FunctionSpec::new("fromJSON")
        .param("object", TypeName::simple("any"))
        .returns(TypeName::simple(ts_name))
        .body(body)
}

fn from_json_value(kind: &FieldKind, from: &str, options: &GenerationOptions, body: &mut CodeBlock) -> String {
    match kind {
        FieldKind::Primitive(scalar) => scalar.from_json(from, options, body),
        FieldKind::Enum(symbol) | FieldKind::Message(symbol) => {
            format!("{}.fromJSON({})", body.sym(symbol), from)
        }
        FieldKind::Wrapper { value, .. } => match value {
            Scalar::Bytes => from.to_string(),
            Scalar::Bool => format!("Boolean({})", from),
            Scalar::String => format!("String({})", from),
            _ => format!("Number({})", from),
        },
        FieldKind::Timestamp(_) => format!(
            "{}({})",
            body.sym(&helpers::symbol(helpers::FROM_JSON_TIMESTAMP)),
            from
        ),
        FieldKind::Map(map) => format!("{}.fromJSON({})", body.sym(&map.entry), from),
    }
}

/// `toJSON(message: X): unknown`
///
/// Lists are always materialized; 64-bit values in `Long` mode become decimal
/// strings.
pub fn generate_to_json(ts_name: &str, fields: &[Classification], options: &GenerationOptions) -> FunctionSpec {
    let mut body = CodeBlock::new();
    body.statement("const obj: any = {}");

    for field in fields {
        let place = format!("message.{}", field.name);
        let out = format!("obj.{}", field.name);

        match &field.kind {
            FieldKind::Map(map) => {
                let value = to_json_value(&map.value, "v", Presence::Element, options, &mut body);
                body.statement(format!("{} = {{}}", out))
                    .begin_control_flow(format!("if ({})", place))
                    .begin_lambda(format!("Object.entries({}).forEach(([k, v]) =>", place))
                    .statement(format!("{}[k] = {}", out, value))
                    .end_lambda(");")
                    .end_control_flow();
            }
            kind if field.repeated => {
                let value = to_json_value(kind, "e", Presence::Element, options, &mut body);
                body.begin_control_flow(format!("if ({})", place))
                    .statement(format!("{} = {}.map((e) => {})", out, place, value))
                    .next_control_flow("else")
                    .statement(format!("{} = []", out))
                    .end_control_flow();
            }
            kind => {
                let presence = if field.oneof {
                    Presence::Oneof
                } else {
                    Presence::Singular
                };
                let value = to_json_value(kind, &place, presence, options, &mut body);
                body.statement(format!("{} = {}", out, value));
            }
        }
    }

    body.statement("return obj");

    FunctionSpec::new("toJSON")
        .param("message", TypeName::simple(ts_name))
        .returns(TypeName::simple("unknown"))
        .body(body)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    /// A list element or map value; always present.
    Element,
    /// A oneof member; `undefined` when another member is set.
    Oneof,
    /// A plain singular field; may be missing on hand-built objects.
    Singular,
}

fn to_json_value(
    kind: &FieldKind,
    from: &str,
    presence: Presence,
    options: &GenerationOptions,
    body: &mut CodeBlock,
) -> String {
    match kind {
        FieldKind::Enum(symbol) => {
            let symbol = body.sym(symbol);
            match presence {
                Presence::Oneof => format!("{f} !== undefined ? {}.toJSON({f}) : undefined", symbol, f = from),
                _ => format!("{}.toJSON({})", symbol, from),
            }
        }
        FieldKind::Timestamp(_) => format!("{f} !== undefined ? {f}.toISOString() : null", f = from),
        FieldKind::Message(symbol) => {
            format!("{f} ? {}.toJSON({f}) : undefined", body.sym(symbol), f = from)
        }
        FieldKind::Map(map) => format!("{f} ? {}.toJSON({f}) : undefined", body.sym(&map.entry), f = from),
        FieldKind::Wrapper { .. } => from.to_string(),
        FieldKind::Primitive(scalar) => {
            let long = scalar.is_long() && options.force_long == LongOption::Long;
            match presence {
                Presence::Element if long => format!("{}.toString()", from),
                Presence::Element => from.to_string(),
                Presence::Oneof if long => {
                    format!("{f} !== undefined ? {f}.toString() : undefined", f = from)
                }
                Presence::Oneof => from.to_string(),
                Presence::Singular => {
                    let default = scalar.default_value(options, body);
                    if long {
                        format!("({} || {}).toString()", from, default)
                    } else {
                        format!("{} || {}", from, default)
                    }
                }
            }
        }
    }
}
