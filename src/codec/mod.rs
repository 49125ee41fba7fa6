//! Per-message codec generation.
//!
//! Each message gets one `export const X = { ... }` object whose entries are
//! produced by the generators in this module: binary `encode`/`decode`,
//! `fromJSON`/`toJSON`, and `fromPartial`.

pub mod decode;
pub mod encode;
pub mod json;
pub mod partial;
pub mod wire;

use crate::classify::Classification;
use crate::code::{CodeBlock, FunctionStyle};
use crate::options::GenerationOptions;

/// Name of the base instance a message's codecs copy defaults from.
pub fn base_instance_name(ts_name: &str) -> String {
    format!("base{}", ts_name)
}

/// `const message = { ...baseX } as X;` followed by fresh lists and maps.
pub(crate) fn seed_message(ts_name: &str, fields: &[Classification], body: &mut CodeBlock) {
    body.statement(format!(
        "const message = {{ ...{} }} as {}",
        base_instance_name(ts_name),
        ts_name
    ));
    for field in fields.iter().filter(|f| f.repeated) {
        let empty = if field.is_map() { "{}" } else { "[]" };
        body.statement(format!("message.{} = {}", field.name, empty));
    }
}

/// The codec object for one message.
pub fn generate_codec(ts_name: &str, fields: &[Classification], options: &GenerationOptions) -> CodeBlock {
    let mut code = CodeBlock::new();
    code.begin_control_flow(format!("export const {} =", ts_name));

    let mut functions = Vec::new();
    if options.output_encode_methods {
        functions.push(encode::generate_encode(ts_name, fields, options));
        functions.push(decode::generate_decode(ts_name, fields, options));
    }
    if options.output_json_methods {
        functions.push(json::generate_from_json(ts_name, fields, options));
        functions.push(partial::generate_from_partial(ts_name, fields, options));
        functions.push(json::generate_to_json(ts_name, fields, options));
    }
    for (i, function) in functions.iter().enumerate() {
        if i > 0 {
            code.blank();
        }
        function.emit(FunctionStyle::HashEntry, &mut code);
    }

    code.dedent().line("};");
    code
}
