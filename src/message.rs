//! Message interface and base-instance generation.

use prost_types::DescriptorProto;

use crate::classify::Classification;
use crate::code::{CodeBlock, InterfaceSpec, PropertySpec};
use crate::codec::base_instance_name;
use crate::options::GenerationOptions;
use crate::source_info::{fields as paths, SourceInfo};

/// `export interface X { ... }` with one property per field, in declaration order.
pub fn generate_interface(
    ts_name: &str,
    descriptor: &DescriptorProto,
    fields: &[Classification],
    source: &SourceInfo<'_>,
    options: &GenerationOptions,
) -> InterfaceSpec {
    let mut interface = InterfaceSpec::new(ts_name)
        .exported()
        .doc(source.description().text());

    debug_assert_eq!(descriptor.field.len(), fields.len());
    for (index, field) in fields.iter().enumerate() {
        let doc = source.lookup(paths::message::FIELD, index).text();
        interface = interface.property(PropertySpec::new(field.name.clone(), field.ts_type(options)).doc(doc));
    }
    interface
}

/// `const baseX: object = { ... }` holding the default of every singular,
/// non-oneof field.
pub fn generate_base_instance(ts_name: &str, fields: &[Classification], options: &GenerationOptions) -> CodeBlock {
    let mut code = CodeBlock::new();
    let defaults: Vec<(String, String)> = fields
        .iter()
        .filter(|f| !f.repeated && !f.oneof)
        .map(|f| (f.name.clone(), f.default_value(options, &mut code)))
        .collect();

    let header = format!("const {}: object =", base_instance_name(ts_name));
    if defaults.is_empty() {
        code.statement(format!("{} {{}}", header));
        return code;
    }

    code.begin_control_flow(header);
    for (name, value) in defaults {
        code.line(format!("{}: {},", name, value));
    }
    code.dedent().line("};");
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{FieldKind, Scalar};
    use crate::code::{FileSpec, Item, Symbol};
    use pretty_assertions::assert_eq;

    fn field(name: &str, repeated: bool, oneof: bool, kind: FieldKind) -> Classification {
        Classification {
            name: name.into(),
            number: 1,
            repeated,
            oneof,
            kind,
        }
    }

    #[test]
    fn test_base_instance() {
        let fields = vec![
            field("name", false, false, FieldKind::Primitive(Scalar::String)),
            field("data", false, false, FieldKind::Primitive(Scalar::Bytes)),
            field("ids", true, false, FieldKind::Primitive(Scalar::Int32)),
            field("choice", false, true, FieldKind::Primitive(Scalar::Int32)),
            field("child", false, false, FieldKind::Message(Symbol::generated("Child", "a"))),
        ];
        assert_eq!(
            generate_base_instance("Foo", &fields, &GenerationOptions::default()).render(),
            "const baseFoo: object = {\n  name: \"\",\n  data: new Uint8Array(),\n  child: undefined,\n};\n"
        );
    }

    #[test]
    fn test_empty_base_instance() {
        assert_eq!(
            generate_base_instance("Empty", &[], &GenerationOptions::default()).render(),
            "const baseEmpty: object = {};\n"
        );
    }

    #[test]
    fn test_interface_properties() {
        let descriptor = DescriptorProto {
            field: vec![Default::default(), Default::default()],
            ..Default::default()
        };
        let fields = vec![
            field("name", false, false, FieldKind::Primitive(Scalar::String)),
            field("ids", true, false, FieldKind::Primitive(Scalar::Int32)),
        ];
        let interface = generate_interface(
            "Foo",
            &descriptor,
            &fields,
            &SourceInfo::empty(),
            &GenerationOptions::default(),
        );
        let mut file = FileSpec::new("a");
        file.add(Item::Interface(interface));
        assert_eq!(
            file.render(),
            "export interface Foo {\n  name: string;\n  ids: number[];\n}\n"
        );
    }
}
