//! Protots: a protoc plugin that turns protobuf descriptors into TypeScript.
//!
//! Each `.proto` file becomes one `.ts` module containing an interface per
//! message, a const object per enum, binary (`protobufjs/minimal`) and JSON
//! codecs, and promise-based RPC clients over a pluggable transport.
//! 64-bit integers can be emitted as `number`, `Long`, or `string`.
//!
//! # Quick Start
//!
//! ```rust
//! use prost_types::compiler::CodeGeneratorRequest;
//! use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto};
//! use prost_types::field_descriptor_proto::{Label, Type};
//!
//! let request = CodeGeneratorRequest {
//!     parameter: Some("outputJsonMethods=false".into()),
//!     proto_file: vec![FileDescriptorProto {
//!         name: Some("person.proto".into()),
//!         package: Some("demo".into()),
//!         message_type: vec![DescriptorProto {
//!             name: Some("Person".into()),
//!             field: vec![FieldDescriptorProto {
//!                 name: Some("full_name".into()),
//!                 number: Some(1),
//!                 label: Some(Label::Optional as i32),
//!                 r#type: Some(Type::String as i32),
//!                 ..Default::default()
//!             }],
//!             ..Default::default()
//!         }],
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! };
//!
//! let response = protots::plugin::generate(&request);
//! assert_eq!(response.error, None);
//! let file = &response.file[0];
//! assert_eq!(file.name(), "person.ts");
//! assert!(file.content().contains("export interface Person {\n  fullName: string;\n}"));
//! ```

pub mod classify;
pub mod code;
pub mod codec;
pub mod enums;
pub mod error;
pub mod file;
pub mod helpers;
pub mod message;
pub mod options;
pub mod plugin;
pub mod registry;
pub mod rpc;
pub mod runtime;
pub mod source_info;
pub mod walker;

pub use error::{Error, GenerateError, PluginError, Result};
pub use file::{generate_file, GeneratedFile};
pub use options::{GenerationOptions, LongOption};
pub use registry::TypeMap;
