//! `fromPartial` generation: build a complete message from a `DeepPartial`.

use crate::classify::{Classification, FieldKind, Scalar};
use crate::code::{CodeBlock, FunctionSpec, TypeName};
use crate::options::{GenerationOptions, LongOption};
use crate::runtime::{self, helpers};

use super::seed_message;

pub fn generate_from_partial(ts_name: &str, fields: &[Classification], options: &GenerationOptions) -> FunctionSpec {
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
                let value = partial_value(&map.value, "value", options, &mut body);
                body.begin_lambda(format!("Object.entries({}).forEach(([key, value]) =>", source))
                    .begin_control_flow("if (value !== undefined)")
                    .statement(format!("{}[{}] = {}", target, key, value))
                    .end_control_flow()
                    .end_lambda(");");
            }
            kind if field.repeated => {
                let value = partial_value(kind, "e", options, &mut body);
                body.begin_control_flow(format!("for (const e of {})", source))
                    .statement(format!("{}.push({})", target, value))
                    .end_control_flow();
            }
            kind => {
                let value = partial_value(kind, &source, options, &mut body);
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

    let deep_partial = TypeName::from(helpers::symbol(helpers::DEEP_PARTIAL))
        .generic(vec![TypeName::simple(ts_name)]);
    FunctionSpec::new("fromPartial")
        .param("object", deep_partial)
        .returns(TypeName::simple(ts_name))
        .body(body)
}

/// Scalars pass through; messages recurse.
fn partial_value(kind: &FieldKind, from: &str, options: &GenerationOptions, body: &mut CodeBlock) -> String {
    match kind {
        FieldKind::Message(symbol) => format!("{}.fromPartial({})", body.sym(symbol), from),
        FieldKind::Map(map) => format!("{}.fromPartial({})", body.sym(&map.entry), from),
        FieldKind::Primitive(scalar) if is_long_object(*scalar, options) => {
            format!("{} as {}", from, body.sym(&runtime::long()))
        }
        FieldKind::Primitive(_)
        | FieldKind::Enum(_)
        | FieldKind::Wrapper { .. }
        | FieldKind::Timestamp(_) => from.to_string(),
    }
}

/// `DeepPartial` recurses into `Long`'s own properties, so values need a cast back.
fn is_long_object(scalar: Scalar, options: &GenerationOptions) -> bool {
    scalar.is_long() && options.force_long == LongOption::Long
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::MapEntry;
    use crate::code::{FunctionStyle, Symbol};
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

    #[test]
    fn test_signature_references_deep_partial() {
        let mut out = CodeBlock::new();
        generate_from_partial("Foo", &[], &GenerationOptions::default()).emit(FunctionStyle::Method, &mut out);
        assert!(out.render().starts_with("fromPartial(object: DeepPartial<Foo>): Foo {\n"));
        assert!(out.references().helpers.contains("DeepPartial"));
    }

    #[test]
    fn test_nested_messages_recurse() {
        let child = Symbol::generated("Child", "a");
        let fields = vec![
            field("child", 1, false, false, FieldKind::Message(child.clone())),
            field("children", 2, true, false, FieldKind::Message(child)),
            field("name", 3, false, false, FieldKind::Primitive(Scalar::String)),
        ];
        assert_eq!(
            generate_from_partial("Foo", &fields, &GenerationOptions::default()).body.render(),
            "const message = { ...baseFoo } as Foo;\n\
             message.children = [];\n\
             if (object.child !== undefined && object.child !== null) {\n\
             \x20 message.child = Child.fromPartial(object.child);\n\
             } else {\n\
             \x20 message.child = undefined;\n\
             }\n\
             if (object.children !== undefined && object.children !== null) {\n\
             \x20 for (const e of object.children) {\n\
             \x20   message.children.push(Child.fromPartial(e));\n\
             \x20 }\n\
             }\n\
             if (object.name !== undefined && object.name !== null) {\n\
             \x20 message.name = object.name;\n\
             } else {\n\
             \x20 message.name = \"\";\n\
             }\n\
             return message;\n"
        );
    }

    #[test]
    fn test_map_values() {
        let map = MapEntry {
            entry: Symbol::generated("Foo_ByIdEntry", "a"),
            key: Scalar::Int64,
            value: FieldKind::Message(Symbol::generated("Child", "a")),
        };
        let fields = vec![field("byId", 1, true, false, FieldKind::Map(Box::new(map)))];
        let out = generate_from_partial("Foo", &fields, &GenerationOptions::default()).body.render();
        assert!(out.contains(
            "  Object.entries(object.byId).forEach(([key, value]) => {\n\
             \x20   if (value !== undefined) {\n\
             \x20     message.byId[Number(key)] = Child.fromPartial(value);\n\
             \x20   }\n\
             \x20 });\n"
        ));
    }

    #[test]
    fn test_long_values_are_cast() {
        let fields = vec![field("big", 1, false, false, FieldKind::Primitive(Scalar::Int64))];
        let options = GenerationOptions {
            force_long: LongOption::Long,
            ..Default::default()
        };
        let out = generate_from_partial("Foo", &fields, &options).body.render();
        assert!(out.contains("message.big = object.big as Long;"));
        assert!(out.contains("message.big = Long.ZERO;"));
    }
}
