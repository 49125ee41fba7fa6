//! The protoc plugin protocol: request in, response out.
//!
//! Generation errors are reported through the response's `error` field, so
//! protoc prints them and fails the build. Errors that make the exchange itself
//! impossible (undecodable input, broken pipes) surface as [`PluginError`].

use std::io::{Read, Write};

use prost::Message;
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use tracing::{error, info};

use crate::error::{GenerateError, PluginError};
use crate::file::generate_file;
use crate::options::GenerationOptions;
use crate::registry::TypeMap;

/// Proto3 `optional` fields are plain fields with a synthetic oneof; the
/// generator handles them like any other field.
const SUPPORTED_FEATURES: u64 = Feature::Proto3Optional as u64;

/// Run the generator over a decoded request.
pub fn generate(request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    match generate_files(request) {
        Ok(file) => CodeGeneratorResponse {
            file,
            error: None,
            supported_features: Some(SUPPORTED_FEATURES),
        },
        Err(err) => {
            error!(%err, "generation failed");
            CodeGeneratorResponse {
                file: Vec::new(),
                error: Some(err.to_string()),
                supported_features: Some(SUPPORTED_FEATURES),
            }
        }
    }
}

/// The files to write, in request order.
///
/// Every file in the request is registered first so references resolve in
/// either direction; only the files listed in `file_to_generate` (or all, if
/// the list is empty) are emitted.
pub fn generate_files(request: &CodeGeneratorRequest) -> Result<Vec<File>, GenerateError> {
    let options = GenerationOptions::from_parameter(request.parameter());
    let registry = TypeMap::build(&request.proto_file, &options)?;

    for name in &request.file_to_generate {
        if !request.proto_file.iter().any(|f| f.name() == name) {
            return Err(GenerateError::UnknownFile(name.clone()));
        }
    }
    let selected = request.proto_file.iter().filter(|f| {
        request.file_to_generate.is_empty()
            || request.file_to_generate.iter().any(|name| name == f.name())
    });

    let mut files = Vec::new();
    for file in selected {
        let generated = generate_file(file, &registry, &options)?;
        files.push(File {
            name: Some(generated.name),
            content: Some(generated.content),
            ..Default::default()
        });
    }
    info!(
        files = files.len(),
        types = registry.len(),
        "generated TypeScript"
    );
    Ok(files)
}

/// Decode a request from `reader`, which is read to the end.
pub fn read_request<R: Read>(mut reader: R) -> Result<CodeGeneratorRequest, PluginError> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(CodeGeneratorRequest::decode(buf.as_slice())?)
}

pub fn write_response<W: Write>(mut writer: W, response: &CodeGeneratorResponse) -> Result<(), PluginError> {
    let mut buf = Vec::with_capacity(response.encoded_len());
    response.encode(&mut buf)?;
    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}

/// One full plugin exchange.
pub fn run<R: Read, W: Write>(input: R, output: W) -> crate::Result<()> {
    let request = read_request(input)?;
    let response = generate(&request);
    write_response(output, &response)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::FileDescriptorProto;

    #[test]
    fn test_unknown_file_to_generate() {
        let request = CodeGeneratorRequest {
            file_to_generate: vec!["missing.proto".into()],
            proto_file: vec![FileDescriptorProto {
                name: Some("present.proto".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let response = generate(&request);
        assert!(response.file.is_empty());
        assert_eq!(
            response.error.as_deref(),
            Some("file 'missing.proto' is listed for generation but not present in the request")
        );
    }

    #[test]
    fn test_roundtrip_through_bytes() {
        let request = CodeGeneratorRequest {
            proto_file: vec![FileDescriptorProto {
                name: Some("empty.proto".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut output = Vec::new();
        run(request.encode_to_vec().as_slice(), &mut output).unwrap();

        let response = CodeGeneratorResponse::decode(output.as_slice()).unwrap();
        assert_eq!(response.error, None);
        assert_eq!(response.supported_features, Some(SUPPORTED_FEATURES));
        assert_eq!(response.file.len(), 1);
        assert_eq!(response.file[0].name(), "empty.ts");
        assert_eq!(response.file[0].content(), "");
    }

    #[test]
    fn test_undecodable_request() {
        let err = read_request(&[0xff, 0xff, 0xff][..]).unwrap_err();
        assert!(matches!(err, PluginError::Decode(_)));
    }
}
