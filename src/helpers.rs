//! File-local utility declarations emitted on demand.
//!
//! Generators only reference helpers by name (see [`runtime::helpers`]).
//! Once a unit's items are generated, [`generate_helpers`] closes the set of
//! referenced helpers over their own dependencies and emits them in a fixed
//! order at the end of the unit.

use std::collections::BTreeSet;

use crate::classify::TIMESTAMP;
use crate::code::{CodeBlock, FileSpec, FunctionSpec, Item, TypeName};
use crate::error::GenerateError;
use crate::options::{GenerationOptions, LongOption};
use crate::registry::TypeMap;
use crate::runtime::{self, helpers};

/// Emission order of helpers within a unit.
pub const ORDER: [&str; 7] = [
    helpers::LONG_TO_NUMBER,
    helpers::LONG_TO_STRING,
    helpers::NUMBER_TO_LONG,
    helpers::DEEP_PARTIAL,
    helpers::TO_TIMESTAMP,
    helpers::FROM_TIMESTAMP,
    helpers::FROM_JSON_TIMESTAMP,
];

const DEEP_PARTIAL_ALIAS: &str = "\
type Builtin = Date | Function | Uint8Array | string | number | undefined;
type DeepPartial<T> = T extends Builtin
  ? T
  : T extends Array<infer U>
  ? Array<DeepPartial<U>>
  : T extends ReadonlyArray<infer U>
  ? ReadonlyArray<DeepPartial<U>>
  : T extends {}
  ? { [K in keyof T]?: DeepPartial<T[K]> }
  : Partial<T>;";

/// Declarations for every helper in `used` plus the helpers those reference.
pub fn generate_helpers(
    used: &BTreeSet<String>,
    registry: &TypeMap<'_>,
    options: &GenerationOptions,
) -> Result<Vec<Item>, GenerateError> {
    let mut needed = used.clone();
    loop {
        let mut unit = FileSpec::new("");
        for name in ORDER.iter().filter(|n| needed.contains(**n)) {
            if let Some(item) = generate_helper(name, registry, options)? {
                unit.add(item);
            }
        }
        let before = needed.len();
        needed.extend(unit.references().helpers);
        if needed.len() == before {
            return Ok(unit.items);
        }
    }
}

/// The declaration of one helper, or `None` for an unknown name.
pub fn generate_helper(
    name: &str,
    registry: &TypeMap<'_>,
    options: &GenerationOptions,
) -> Result<Option<Item>, GenerateError> {
    let spec = match name {
        helpers::LONG_TO_NUMBER => long_to_number(),
        helpers::LONG_TO_STRING => long_to_string(),
        helpers::NUMBER_TO_LONG => number_to_long(),
        helpers::DEEP_PARTIAL => {
            let mut code = CodeBlock::new();
            for line in DEEP_PARTIAL_ALIAS.lines() {
                code.line(line);
            }
            return Ok(Some(Item::Code(code)));
        }
        helpers::TO_TIMESTAMP => to_timestamp(timestamp(registry)?, options),
        helpers::FROM_TIMESTAMP => from_timestamp(timestamp(registry)?, options),
        helpers::FROM_JSON_TIMESTAMP => from_json_timestamp(timestamp(registry)?),
        _ => return Ok(None),
    };
    Ok(Some(Item::Function {
        spec,
        exported: false,
    }))
}

fn timestamp(registry: &TypeMap<'_>) -> Result<TypeName, GenerateError> {
    registry.symbol(TIMESTAMP).map(TypeName::from)
}

fn long_to_number() -> FunctionSpec {
    let mut body = CodeBlock::new();
    body.begin_control_flow("if (long.gt(Number.MAX_SAFE_INTEGER))")
        .statement("throw new globalThis.Error(\"Value is larger than Number.MAX_SAFE_INTEGER\")")
        .end_control_flow()
        .statement("return long.toNumber()");
    FunctionSpec::new(helpers::LONG_TO_NUMBER)
        .param("long", runtime::long())
        .returns(TypeName::number())
        .body(body)
}

fn long_to_string() -> FunctionSpec {
    let mut body = CodeBlock::new();
    body.statement("return long.toString()");
    FunctionSpec::new(helpers::LONG_TO_STRING)
        .param("long", runtime::long())
        .returns(TypeName::string())
        .body(body)
}

fn number_to_long() -> FunctionSpec {
    let mut body = CodeBlock::new();
    let long = body.sym(&runtime::long());
    body.statement(format!("return {}.fromNumber(number)", long));
    FunctionSpec::new(helpers::NUMBER_TO_LONG)
        .param("number", TypeName::number())
        .returns(runtime::long())
        .body(body)
}

fn to_timestamp(timestamp: TypeName, options: &GenerationOptions) -> FunctionSpec {
    let mut body = CodeBlock::new();
    let seconds = match options.force_long {
        LongOption::Number => "Math.trunc(date.getTime() / 1_000)".to_string(),
        LongOption::Long => format!(
            "{}(Math.trunc(date.getTime() / 1_000))",
            body.sym(&helpers::symbol(helpers::NUMBER_TO_LONG))
        ),
        LongOption::String => "Math.trunc(date.getTime() / 1_000).toString()".to_string(),
    };
    body.statement(format!("const seconds = {}", seconds))
        .statement("const nanos = (date.getTime() % 1_000) * 1_000_000")
        .statement("return { seconds, nanos }");
    FunctionSpec::new(helpers::TO_TIMESTAMP)
        .param("date", TypeName::simple("Date"))
        .returns(timestamp)
        .body(body)
}

fn from_timestamp(timestamp: TypeName, options: &GenerationOptions) -> FunctionSpec {
    let seconds = match options.force_long {
        LongOption::Number => "t.seconds",
        LongOption::Long => "t.seconds.toNumber()",
        LongOption::String => "Number(t.seconds)",
    };
    let mut body = CodeBlock::new();
    body.statement(format!("let millis = {} * 1_000", seconds))
        .statement("millis += t.nanos / 1_000_000")
        .statement("return new Date(millis)");
    FunctionSpec::new(helpers::FROM_TIMESTAMP)
        .param("t", timestamp)
        .returns(TypeName::simple("Date"))
        .body(body)
}

/// Accepts a `Date`, an RFC 3339 string, or a `{ seconds, nanos }` object.
fn from_json_timestamp(timestamp: TypeName) -> FunctionSpec {
    let mut body = CodeBlock::new();
    let timestamp_value = body.ty(&timestamp);
    let from = body.sym(&helpers::symbol(helpers::FROM_TIMESTAMP));
    body.begin_control_flow("if (o instanceof Date)")
        .statement("return o")
        .next_control_flow("else if (typeof o === \"string\")")
        .statement("return new Date(o)")
        .next_control_flow("else")
        .statement(format!("return {}({}.fromJSON(o))", from, timestamp_value))
        .end_control_flow();
    FunctionSpec::new(helpers::FROM_JSON_TIMESTAMP)
        .param("o", TypeName::simple("any"))
        .returns(TypeName::simple("Date"))
        .body(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use prost_types::{DescriptorProto, FileDescriptorProto};

    fn timestamp_file() -> Vec<FileDescriptorProto> {
        vec![FileDescriptorProto {
            name: Some("google/protobuf/timestamp.proto".into()),
            package: Some("google.protobuf".into()),
            message_type: vec![DescriptorProto {
                name: Some("Timestamp".into()),
                ..Default::default()
            }],
            ..Default::default()
        }]
    }

    fn render(items: Vec<Item>) -> String {
        let mut file = FileSpec::new("a");
        for item in items {
            file.add(item);
        }
        file.render()
    }

    #[test]
    fn test_long_to_number() {
        let files = timestamp_file();
        let options = GenerationOptions::default();
        let registry = TypeMap::build(&files, &options).unwrap();
        let used = BTreeSet::from([helpers::LONG_TO_NUMBER.to_string()]);
        assert_eq!(
            render(generate_helpers(&used, &registry, &options).unwrap()),
            r#"import * as Long from 'long';

function longToNumber(long: Long): number {
  if (long.gt(Number.MAX_SAFE_INTEGER)) {
    throw new globalThis.Error("Value is larger than Number.MAX_SAFE_INTEGER");
  }
  return long.toNumber();
}
"#
        );
    }

    #[test]
    fn test_dependencies_are_closed_over() {
        let files = timestamp_file();
        let options = GenerationOptions {
            force_long: LongOption::Long,
            ..Default::default()
        };
        let registry = TypeMap::build(&files, &options).unwrap();
        let used = BTreeSet::from([
            helpers::FROM_JSON_TIMESTAMP.to_string(),
            helpers::TO_TIMESTAMP.to_string(),
        ]);
        let out = render(generate_helpers(&used, &registry, &options).unwrap());

        let order: Vec<usize> = ["function numberToLong", "function toTimestamp", "function fromTimestamp", "function fromJsonTimestamp"]
            .iter()
            .map(|needle| out.find(needle).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{}", out);
        assert!(out.contains("const seconds = numberToLong(Math.trunc(date.getTime() / 1_000));"));
        assert!(out.contains("let millis = t.seconds.toNumber() * 1_000;"));
        assert!(out.contains("import { Timestamp } from './google/protobuf/timestamp';"));
    }

    #[test]
    fn test_deep_partial_alias() {
        let files = timestamp_file();
        let options = GenerationOptions::default();
        let registry = TypeMap::build(&files, &options).unwrap();
        let used = BTreeSet::from([helpers::DEEP_PARTIAL.to_string()]);
        let out = render(generate_helpers(&used, &registry, &options).unwrap());
        assert!(out.starts_with("type Builtin = Date | Function | Uint8Array | string | number | undefined;\n"));
        assert!(out.contains("  ? { [K in keyof T]?: DeepPartial<T[K]> }\n"));
    }

    #[test]
    fn test_timestamp_requires_registered_type() {
        let registry = TypeMap::default();
        let err = generate_helper(helpers::TO_TIMESTAMP, &registry, &GenerationOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "no type found for .google.protobuf.Timestamp");
    }
}
