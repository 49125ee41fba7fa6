//! Descriptor builders shared by the integration tests.
#![allow(dead_code)]

use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, MessageOptions, MethodDescriptorProto, ServiceDescriptorProto,
};

pub fn file(name: &str, package: &str) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.into()),
        package: Some(package.into()),
        syntax: Some("proto3".into()),
        ..Default::default()
    }
}

pub fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.into()),
        field: fields,
        ..Default::default()
    }
}

pub fn scalar(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.into()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

/// A message- or enum-typed field referencing `type_name` (fully qualified).
pub fn typed(name: &str, number: i32, ty: Type, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.into()),
        ..scalar(name, number, ty)
    }
}

pub fn repeated(mut field: FieldDescriptorProto) -> FieldDescriptorProto {
    field.label = Some(Label::Repeated as i32);
    field
}

pub fn in_oneof(mut field: FieldDescriptorProto, index: i32) -> FieldDescriptorProto {
    field.oneof_index = Some(index);
    field
}

/// The synthetic `XxxEntry` message protoc generates for a map field.
pub fn map_entry(name: &str, key: Type, value: FieldDescriptorProto) -> DescriptorProto {
    let mut value = value;
    value.name = Some("value".into());
    value.number = Some(2);
    DescriptorProto {
        name: Some(name.into()),
        field: vec![scalar("key", 1, key), value],
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn enumeration(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.into()),
        value: values
            .iter()
            .map(|(name, number)| EnumValueDescriptorProto {
                name: Some(name.to_string()),
                number: Some(*number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

pub fn method(name: &str, input: &str, output: &str) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.into()),
        input_type: Some(input.into()),
        output_type: Some(output.into()),
        ..Default::default()
    }
}

pub fn service(name: &str, methods: Vec<MethodDescriptorProto>) -> ServiceDescriptorProto {
    ServiceDescriptorProto {
        name: Some(name.into()),
        method: methods,
        ..Default::default()
    }
}

pub fn request(files: Vec<FileDescriptorProto>, parameter: &str) -> CodeGeneratorRequest {
    CodeGeneratorRequest {
        parameter: Some(parameter.into()),
        proto_file: files,
        ..Default::default()
    }
}

/// Generate and return the response, panicking on a reported error.
pub fn generate_ok(files: Vec<FileDescriptorProto>, parameter: &str) -> CodeGeneratorResponse {
    let response = protots::plugin::generate(&request(files, parameter));
    if let Some(err) = &response.error {
        panic!("generation failed: {}", err);
    }
    response
}

/// Content of the generated unit named `name`.
pub fn content<'a>(response: &'a CodeGeneratorResponse, name: &str) -> &'a str {
    response
        .file
        .iter()
        .find(|f| f.name() == name)
        .unwrap_or_else(|| panic!("no generated file named {}", name))
        .content()
}

/// Generate a single file and return its content.
pub fn generate_one(file: FileDescriptorProto, parameter: &str) -> String {
    let name = file.name().replace(".proto", ".ts");
    let response = generate_ok(vec![file], parameter);
    content(&response, &name).to_string()
}
