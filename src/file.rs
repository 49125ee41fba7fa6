//! Assembly of one generated TypeScript unit per `.proto` file.

use std::cell::RefCell;

use prost_types::FileDescriptorProto;
use tracing::debug;

use crate::classify::classify_message;
use crate::code::{FileSpec, Item};
use crate::error::GenerateError;
use crate::options::GenerationOptions;
use crate::registry::{module_name, TypeMap};
use crate::source_info::{fields, Locations};
use crate::{codec, enums, helpers, message, rpc, walker};

/// Rendered output for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Output path, e.g. `company/foo.ts`.
    pub name: String,
    pub content: String,
}

/// Output path of the unit generated for `file_name`.
pub fn output_name(file_name: &str) -> String {
    format!("{}.ts", module_name(file_name))
}

/// Generate the unit for `file`. Every type it references must be in `registry`.
///
/// Items appear in this order: enums and messages in walk order (each
/// message's interface, base instance and codec together), service
/// interfaces and clients, the transport interfaces, then helpers.
pub fn generate_file(
    file: &FileDescriptorProto,
    registry: &TypeMap<'_>,
    options: &GenerationOptions,
) -> Result<GeneratedFile, GenerateError> {
    let locations = Locations::from_file(file);
    let source = locations.root();
    let mut unit = FileSpec::new(module_name(file.name()));
    unit.header = source.lookup_singular(fields::file::SYNTAX).text();
    unit.declared = registry.names_in(&unit.module).map(String::from).collect();

    // Both visitors append to the same list so walk order is preserved.
    let items = RefCell::new(Vec::new());
    walker::visit(
        file,
        &source,
        options,
        &mut |visit| {
            let classified = classify_message(visit.descriptor, registry, options)?;
            let mut items = items.borrow_mut();
            items.push(Item::Interface(message::generate_interface(
                &visit.ts_name,
                visit.descriptor,
                &classified,
                &visit.source,
                options,
            )));
            if options.emits_codecs() {
                items.push(Item::Code(message::generate_base_instance(
                    &visit.ts_name,
                    &classified,
                    options,
                )));
                items.push(Item::Code(codec::generate_codec(&visit.ts_name, &classified, options)));
            }
            Ok(())
        },
        &mut |visit| {
            items.borrow_mut().push(Item::Code(enums::generate_enum(
                &visit.ts_name,
                visit.descriptor,
                &visit.source,
                options,
            )));
            Ok(())
        },
    )?;
    unit.items = items.into_inner();

    walker::visit_services(file, &source, &mut |service, service_source| {
        unit.items.extend(rpc::generate_service(file, service, &service_source, registry, options)?);
        Ok(())
    })?;

    if !file.service.is_empty() {
        if options.output_client_impl && options.output_encode_methods {
            unit.add(Item::Interface(rpc::generate_rpc_interface(options)));
        }
        if options.use_context {
            unit.items.extend(rpc::generate_data_loaders());
        }
    }

    let used = unit.references().helpers;
    let helper_items = helpers::generate_helpers(&used, registry, options)?;
    debug!(
        file = file.name(),
        items = unit.items.len(),
        helpers = helper_items.len(),
        "generated unit"
    );
    unit.items.extend(helper_items);

    Ok(GeneratedFile {
        name: output_name(file.name()),
        content: unit.render(),
    })
}
