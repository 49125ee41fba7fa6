//! Binary encode generation.

use crate::classify::{Classification, FieldKind};
use crate::code::{CodeBlock, FunctionSpec, TypeName};
use crate::options::GenerationOptions;
use crate::runtime::{self, helpers};

/// `encode(message: X, writer: Writer = Writer.create()): Writer`
///
/// Fields are written in declaration order. Singular scalars outside a oneof
/// are omitted when they hold their default.
pub fn generate_encode(ts_name: &str, fields: &[Classification], options: &GenerationOptions) -> FunctionSpec {
    let mut body = CodeBlock::new();
    for field in fields {
        encode_field(field, options, &mut body);
    }
    body.statement("return writer");

    let mut default = CodeBlock::new();
    let writer = default.sym(&runtime::writer());
    default.line(format!("{}.create()", writer));

    FunctionSpec::new("encode")
        .param("message", TypeName::simple(ts_name))
        .param_with_default("writer", runtime::writer(), default)
        .returns(runtime::writer())
        .body(body)
}

fn encode_field(field: &Classification, options: &GenerationOptions, body: &mut CodeBlock) {
    let place = format!("message.{}", field.name);
    let tag = field.tag();

    if let FieldKind::Map(map) = &field.kind {
        let entry = body.sym(&map.entry);
        let key = map.key_from_object("key", options, body);
        body.begin_lambda(format!("Object.entries({}).forEach(([key, value]) =>", place))
            .statement(format!(
                "{}.encode({{ key: {}, value }}, writer.uint32({}).fork()).ldelim()",
                entry, key, tag
            ))
            .end_lambda(");");
        return;
    }

    if field.is_packed() {
        let call = field.kind.reader_call().unwrap_or("int32");
        body.begin_control_flow(format!("if ({}.length > 0)", place))
            .statement(format!("writer.uint32({}).fork()", field.packed_tag()))
            .begin_control_flow(format!("for (const v of {})", place))
            .statement(format!("writer.{}(v)", call))
            .end_control_flow()
            .statement("writer.ldelim()")
            .end_control_flow();
        return;
    }

    if field.repeated {
        let write = write_snippet(&field.kind, tag, "v!", body);
        body.begin_control_flow(format!("for (const v of {})", place))
            .statement(write)
            .end_control_flow();
        return;
    }

    let condition = match field.not_default_check(&place, options, body) {
        Some(check) => check,
        None => format!("{} !== undefined", place),
    };
    let write = write_snippet(&field.kind, tag, &place, body);
    body.begin_control_flow(format!("if ({})", condition))
        .statement(write)
        .end_control_flow();
}

/// Statement writing the value at `place` under `tag`.
fn write_snippet(kind: &FieldKind, tag: u32, place: &str, body: &mut CodeBlock) -> String {
    match kind {
        FieldKind::Primitive(_) | FieldKind::Enum(_) => format!(
            "writer.uint32({}).{}({})",
            tag,
            kind.reader_call().unwrap_or("int32"),
            place
        ),
        FieldKind::Timestamp(timestamp) => {
            let to = body.sym(&helpers::symbol(helpers::TO_TIMESTAMP));
            format!(
                "{}.encode({}({}), writer.uint32({}).fork()).ldelim()",
                body.sym(timestamp),
                to,
                place,
                tag
            )
        }
        FieldKind::Wrapper { wrapper, .. } => format!(
            "{}.encode({{ value: {}! }}, writer.uint32({}).fork()).ldelim()",
            body.sym(wrapper),
            place,
            tag
        ),
        FieldKind::Message(symbol) => format!(
            "{}.encode({}, writer.uint32({}).fork()).ldelim()",
            body.sym(symbol),
            place,
            tag
        ),
        FieldKind::Map(map) => format!(
            "{}.encode({}, writer.uint32({}).fork()).ldelim()",
            body.sym(&map.entry),
            place,
            tag
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{MapEntry, Scalar};
    use crate::code::{FunctionStyle, Symbol};
    use crate::options::LongOption;
    use pretty_assertions::assert_eq;

    fn field(name: &str, number: i32, repeated: bool, oneof: bool, kind: FieldKind) -> Classification {
        Classification {
            name: name.into(),
            number,
            repeated,
            oneof,
            kind,
        }
    }

    fn render(fields: &[Classification], options: &GenerationOptions) -> String {
        generate_encode("Foo", fields, options).body.render()
    }

    #[test]
    fn test_signature() {
        let mut out = CodeBlock::new();
        generate_encode("Foo", &[], &GenerationOptions::default()).emit(FunctionStyle::Method, &mut out);
        assert_eq!(
            out.render(),
            "encode(message: Foo, writer: Writer = Writer.create()): Writer {\n  return writer;\n}\n"
        );
        assert_eq!(out.references().imports.len(), 1);
    }

    #[test]
    fn test_scalars_skip_defaults() {
        let fields = vec![
            field("name", 1, false, false, FieldKind::Primitive(Scalar::String)),
            field("data", 2, false, false, FieldKind::Primitive(Scalar::Bytes)),
            field("ok", 3, false, false, FieldKind::Primitive(Scalar::Bool)),
            field("ratio", 4, false, false, FieldKind::Primitive(Scalar::Double)),
        ];
        assert_eq!(
            render(&fields, &GenerationOptions::default()),
            "if (message.name !== \"\") {\n  writer.uint32(10).string(message.name);\n}\n\
             if (message.data.length !== 0) {\n  writer.uint32(18).bytes(message.data);\n}\n\
             if (message.ok !== false) {\n  writer.uint32(24).bool(message.ok);\n}\n\
             if (message.ratio !== 0) {\n  writer.uint32(33).double(message.ratio);\n}\n\
             return writer;\n"
        );
    }

    #[test]
    fn test_long_mode_uses_is_zero() {
        let fields = vec![field("big", 1, false, false, FieldKind::Primitive(Scalar::Int64))];
        let options = GenerationOptions {
            force_long: LongOption::Long,
            ..Default::default()
        };
        assert!(render(&fields, &options).starts_with("if (!message.big.isZero()) {\n  writer.uint32(8).int64(message.big);\n}\n"));
    }

    #[test]
    fn test_oneof_and_message_written_when_present() {
        let fields = vec![
            field("a", 1, false, true, FieldKind::Primitive(Scalar::Int32)),
            field("child", 2, false, false, FieldKind::Message(Symbol::generated("Child", "b"))),
        ];
        assert_eq!(
            render(&fields, &GenerationOptions::default()),
            "if (message.a !== undefined) {\n  writer.uint32(8).int32(message.a);\n}\n\
             if (message.child !== undefined) {\n  Child.encode(message.child, writer.uint32(18).fork()).ldelim();\n}\n\
             return writer;\n"
        );
    }

    #[test]
    fn test_packed_and_unpacked_repeated() {
        let fields = vec![
            field("ids", 1, true, false, FieldKind::Primitive(Scalar::Sint32)),
            field("names", 2, true, false, FieldKind::Primitive(Scalar::String)),
        ];
        assert_eq!(
            render(&fields, &GenerationOptions::default()),
            "if (message.ids.length > 0) {\n\
             \x20 writer.uint32(10).fork();\n\
             \x20 for (const v of message.ids) {\n\
             \x20   writer.sint32(v);\n\
             \x20 }\n\
             \x20 writer.ldelim();\n\
             }\n\
             for (const v of message.names) {\n\
             \x20 writer.uint32(18).string(v!);\n\
             }\n\
             return writer;\n"
        );
    }

    #[test]
    fn test_map_entries() {
        let map = MapEntry {
            entry: Symbol::generated("Foo_TagsEntry", "a"),
            key: Scalar::String,
            value: FieldKind::Primitive(Scalar::Int32),
        };
        let fields = vec![field("tags", 5, true, false, FieldKind::Map(Box::new(map)))];
        assert_eq!(
            render(&fields, &GenerationOptions::default()),
            "Object.entries(message.tags).forEach(([key, value]) => {\n\
             \x20 Foo_TagsEntry.encode({ key: key, value }, writer.uint32(42).fork()).ldelim();\n\
             });\n\
             return writer;\n"
        );
    }

    #[test]
    fn test_map_keys_follow_key_type() {
        let map_with = |key: Scalar| {
            let map = MapEntry {
                entry: Symbol::generated("Foo_MEntry", "a"),
                key,
                value: FieldKind::Primitive(Scalar::String),
            };
            vec![field("m", 1, true, false, FieldKind::Map(Box::new(map)))]
        };
        let long = GenerationOptions {
            force_long: LongOption::Long,
            ..Default::default()
        };
        let string = GenerationOptions {
            force_long: LongOption::String,
            ..Default::default()
        };
        let default = GenerationOptions::default();

        let cases = [
            (Scalar::Bool, &default, "key === \"true\""),
            (Scalar::Uint32, &default, "Number(key)"),
            (Scalar::Int64, &default, "Number(key)"),
            (Scalar::Int64, &long, "Long.fromString(key)"),
            (Scalar::Fixed64, &long, "Long.fromString(key, true)"),
            (Scalar::Sint64, &string, "key"),
        ];
        for (key, options, expected) in cases {
            let out = render(&map_with(key), options);
            assert!(
                out.contains(&format!("Foo_MEntry.encode({{ key: {}, value }}", expected)),
                "{:?}: {}",
                key,
                out
            );
        }
    }

    #[test]
    fn test_timestamp_uses_helper() {
        let fields = vec![field(
            "at",
            1,
            false,
            false,
            FieldKind::Timestamp(Symbol::generated("Timestamp", "google/protobuf/timestamp")),
        )];
        let body = generate_encode("Foo", &fields, &GenerationOptions::default()).body;
        assert!(body
            .render()
            .contains("Timestamp.encode(toTimestamp(message.at), writer.uint32(10).fork()).ldelim();"));
        assert!(body.references().helpers.contains("toTimestamp"));
    }
}
