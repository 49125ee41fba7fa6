//! Binary decode generation.

use crate::classify::{Classification, FieldKind, Scalar};
use crate::code::{CodeBlock, FunctionSpec, TypeName};
use crate::options::{GenerationOptions, LongOption};
use crate::runtime::{self, helpers};

use super::seed_message;

/// `decode(input: Reader | Uint8Array, length?: number): X`
///
/// Reads tags until `end`, dispatching on the field number. Unknown fields
/// are skipped by wire type. Packable repeated fields accept both the packed
/// and the unpacked encoding.
pub fn generate_decode(ts_name: &str, fields: &[Classification], options: &GenerationOptions) -> FunctionSpec {
    let mut body = CodeBlock::new();
    let reader = body.sym(&runtime::reader());

    body.statement(format!(
        "const reader = input instanceof {r} ? input : new {r}(input)",
        r = reader
    ));
    body.statement("let end = length === undefined ? reader.len : reader.pos + length");
    seed_message(ts_name, fields, &mut body);

    body.begin_control_flow("while (reader.pos < end)")
        .statement("const tag = reader.uint32()")
        .begin_control_flow("switch (tag >>> 3)");

    for field in fields {
        body.line(format!("case {}:", field.number)).indent();
        decode_field(field, options, &mut body);
        body.statement("break").dedent();
    }

    body.line("default:")
        .indent()
        .statement("reader.skipType(tag & 7)")
        .statement("break")
        .dedent();

    body.end_control_flow().end_control_flow();
    body.statement("return message");

    FunctionSpec::new("decode")
        .param(
            "input",
            TypeName::Union(vec![runtime::reader().into(), TypeName::simple("Uint8Array")]),
        )
        .param("length?", TypeName::number())
        .returns(TypeName::simple(ts_name))
        .body(body)
}

fn decode_field(field: &Classification, options: &GenerationOptions, body: &mut CodeBlock) {
    let target = format!("message.{}", field.name);

    if let FieldKind::Map(map) = &field.kind {
        let entry = format!("entry{}", field.number);
        let entry_type = body.sym(&map.entry);
        body.statement(format!(
            "const {} = {}.decode(reader, reader.uint32())",
            entry, entry_type
        ));
        body.begin_control_flow(format!("if ({}.value !== undefined)", entry))
            .statement(format!("{}[{e}.key] = {e}.value", target, e = entry))
            .end_control_flow();
        return;
    }

    let read = read_snippet(&field.kind, options, body);
    if field.is_packed() {
        body.begin_control_flow("if ((tag & 7) === 2)")
            .statement("const end2 = reader.uint32() + reader.pos")
            .begin_control_flow("while (reader.pos < end2)")
            .statement(format!("{}.push({})", target, read))
            .end_control_flow()
            .next_control_flow("else")
            .statement(format!("{}.push({})", target, read))
            .end_control_flow();
    } else if field.repeated {
        body.statement(format!("{}.push({})", target, read));
    } else {
        body.statement(format!("{} = {}", target, read));
    }
}

/// Expression reading one value of `kind` from `reader`.
pub(crate) fn read_snippet(kind: &FieldKind, options: &GenerationOptions, body: &mut CodeBlock) -> String {
    match kind {
        FieldKind::Primitive(scalar) if scalar.is_long() => read_long(*scalar, options, body),
        FieldKind::Primitive(scalar) => format!("reader.{}()", scalar.reader_call()),
        FieldKind::Enum(symbol) => {
            if options.output_json_methods {
                format!("{}.fromJSON(reader.int32())", body.sym(symbol))
            } else {
                "reader.int32() as any".to_string()
            }
        }
        FieldKind::Wrapper { wrapper, .. } => {
            format!("{}.decode(reader, reader.uint32()).value", body.sym(wrapper))
        }
        FieldKind::Timestamp(timestamp) => {
            let from = body.sym(&helpers::symbol(helpers::FROM_TIMESTAMP));
            format!("{}({}.decode(reader, reader.uint32()))", from, body.sym(timestamp))
        }
        FieldKind::Message(symbol) => format!("{}.decode(reader, reader.uint32())", body.sym(symbol)),
        // Maps are decoded entry by entry in `decode_field`.
        FieldKind::Map(map) => format!("{}.decode(reader, reader.uint32())", body.sym(&map.entry)),
    }
}

fn read_long(scalar: Scalar, options: &GenerationOptions, body: &mut CodeBlock) -> String {
    let long = body.sym(&runtime::long());
    let raw = format!("reader.{}() as {}", scalar.reader_call(), long);
    match options.force_long {
        LongOption::Long => raw,
        LongOption::Number => {
            format!("{}({})", body.sym(&helpers::symbol(helpers::LONG_TO_NUMBER)), raw)
        }
        LongOption::String => {
            format!("{}({})", body.sym(&helpers::symbol(helpers::LONG_TO_STRING)), raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Symbol;
    use pretty_assertions::assert_eq;

    fn field(name: &str, number: i32, repeated: bool, kind: FieldKind) -> Classification {
        Classification {
            name: name.into(),
            number,
            repeated,
            oneof: false,
            kind,
        }
    }

    #[test]
    fn test_packed_field_accepts_both_encodings() {
        let fields = vec![field("ids", 1, true, FieldKind::Primitive(Scalar::Int32))];
        let out = generate_decode("Foo", &fields, &GenerationOptions::default())
            .body
            .render();
        assert_eq!(
            out,
            "const reader = input instanceof Reader ? input : new Reader(input);\n\
             let end = length === undefined ? reader.len : reader.pos + length;\n\
             const message = { ...baseFoo } as Foo;\n\
             message.ids = [];\n\
             while (reader.pos < end) {\n\
             \x20 const tag = reader.uint32();\n\
             \x20 switch (tag >>> 3) {\n\
             \x20   case 1:\n\
             \x20     if ((tag & 7) === 2) {\n\
             \x20       const end2 = reader.uint32() + reader.pos;\n\
             \x20       while (reader.pos < end2) {\n\
             \x20         message.ids.push(reader.int32());\n\
             \x20       }\n\
             \x20     } else {\n\
             \x20       message.ids.push(reader.int32());\n\
             \x20     }\n\
             \x20     break;\n\
             \x20   default:\n\
             \x20     reader.skipType(tag & 7);\n\
             \x20     break;\n\
             \x20 }\n\
             }\n\
             return message;\n"
        );
    }

    #[test]
    fn test_strings_are_never_packed() {
        let fields = vec![field("names", 2, true, FieldKind::Primitive(Scalar::String))];
        let out = generate_decode("Foo", &fields, &GenerationOptions::default())
            .body
            .render();
        assert!(out.contains("      message.names.push(reader.string());\n"));
        assert!(!out.contains("(tag & 7) === 2"));
    }

    #[test]
    fn test_long_modes() {
        let fields = vec![field("big", 1, false, FieldKind::Primitive(Scalar::Uint64))];
        let number = generate_decode("Foo", &fields, &GenerationOptions::default()).body;
        assert!(number.render().contains("message.big = longToNumber(reader.uint64() as Long);"));
        assert!(number.references().helpers.contains("longToNumber"));

        let options = GenerationOptions {
            force_long: LongOption::String,
            ..Default::default()
        };
        let string = generate_decode("Foo", &fields, &options).body;
        assert!(string.render().contains("message.big = longToString(reader.uint64() as Long);"));

        let options = GenerationOptions {
            force_long: LongOption::Long,
            ..Default::default()
        };
        let long = generate_decode("Foo", &fields, &options).body;
        assert!(long.render().contains("message.big = reader.uint64() as Long;"));
        assert!(long.references().helpers.is_empty());
    }

    #[test]
    fn test_enum_goes_through_from_json() {
        let color = Symbol::generated("Color", "a");
        let fields = vec![field("color", 3, false, FieldKind::Enum(color))];
        let out = generate_decode("Foo", &fields, &GenerationOptions::default()).body.render();
        assert!(out.contains("message.color = Color.fromJSON(reader.int32());"));

        let options = GenerationOptions {
            output_json_methods: false,
            ..Default::default()
        };
        let out = generate_decode("Foo", &fields, &options).body.render();
        assert!(out.contains("message.color = reader.int32() as any;"));
    }

    #[test]
    fn test_map_entry_folded_in() {
        let map = crate::classify::MapEntry {
            entry: Symbol::generated("Foo_TagsEntry", "a"),
            key: Scalar::String,
            value: FieldKind::Primitive(Scalar::Int32),
        };
        let fields = vec![field("tags", 4, true, FieldKind::Map(Box::new(map)))];
        let out = generate_decode("Foo", &fields, &GenerationOptions::default()).body.render();
        assert!(out.contains("message.tags = {};\n"));
        assert!(out.contains(
            "      const entry4 = Foo_TagsEntry.decode(reader, reader.uint32());\n\
             \x20     if (entry4.value !== undefined) {\n\
             \x20       message.tags[entry4.key] = entry4.value;\n\
             \x20     }\n"
        ));
    }

    #[test]
    fn test_timestamp_and_wrapper() {
        let fields = vec![
            field("at", 1, false, FieldKind::Timestamp(Symbol::generated("Timestamp", "google/protobuf/timestamp"))),
            field(
                "count",
                2,
                false,
                FieldKind::Wrapper {
                    wrapper: Symbol::generated("Int32Value", "google/protobuf/wrappers"),
                    value: Scalar::Int32,
                },
            ),
        ];
        let body = generate_decode("Foo", &fields, &GenerationOptions::default()).body;
        let out = body.render();
        assert!(out.contains("message.at = fromTimestamp(Timestamp.decode(reader, reader.uint32()));"));
        assert!(out.contains("message.count = Int32Value.decode(reader, reader.uint32()).value;"));
        assert!(body.references().helpers.contains("fromTimestamp"));
    }
}
