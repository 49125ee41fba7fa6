//! Generation options parsed from the plugin parameter string.
//!
//! protoc passes everything after `--protots_opt=` (or the `:` in
//! `--protots_out=opts:dir`) as one comma-separated string, e.g.
//! `context=true,forceLong=string`.

use tracing::warn;

/// How 64-bit integer fields are represented in generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum LongOption {
    /// Plain `number`; values above `Number.MAX_SAFE_INTEGER` throw on decode.
    #[default]
    Number,
    /// The `Long` class from the `long` package.
    Long,
    /// Decimal strings.
    String,
}

/// Options resolved once per run and shared read-only by every generator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct GenerationOptions {
    /// Thread a `ctx: Context` argument through services and clients.
    pub use_context: bool,
    /// Convert `snake_case` names into `camelCase` identifiers.
    pub snake_to_camel: bool,
    pub force_long: LongOption,
    pub output_encode_methods: bool,
    pub output_json_methods: bool,
    pub output_client_impl: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        GenerationOptions {
            use_context: false,
            snake_to_camel: true,
            force_long: LongOption::Number,
            output_encode_methods: true,
            output_json_methods: true,
            output_client_impl: true,
        }
    }
}

impl GenerationOptions {
    /// Parse a protoc parameter string.
    ///
    /// Unknown keys or values are logged and otherwise ignored, so a typo never
    /// fails a build.
    pub fn from_parameter(parameter: &str) -> Self {
        let mut options = GenerationOptions::default();

        for pair in parameter.split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let (key, value) = match pair.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (pair, ""),
            };

            match (key, value) {
                ("context", "true") => options.use_context = true,
                ("context", "false") => options.use_context = false,
                ("snakeToCamel", "false") => options.snake_to_camel = false,
                ("snakeToCamel", "true") => options.snake_to_camel = true,
                ("forceLong", "true") | ("forceLong", "long") => {
                    options.force_long = LongOption::Long
                }
                ("forceLong", "string") => options.force_long = LongOption::String,
                ("forceLong", "false") | ("forceLong", "number") => {
                    options.force_long = LongOption::Number
                }
                ("outputEncodeMethods", "false") => options.output_encode_methods = false,
                ("outputEncodeMethods", "true") => options.output_encode_methods = true,
                ("outputJsonMethods", "false") => options.output_json_methods = false,
                ("outputJsonMethods", "true") => options.output_json_methods = true,
                ("outputClientImpl", "false") => options.output_client_impl = false,
                ("outputClientImpl", "true") => options.output_client_impl = true,
                _ => warn!(key, value, "ignoring unrecognized plugin parameter"),
            }
        }

        options
    }

    /// Whether any per-message codec object (`export const Foo = { ... }`) is emitted.
    pub fn emits_codecs(&self) -> bool {
        self.output_encode_methods || self.output_json_methods
    }

    /// Apply the identifier casing transform if enabled.
    pub fn maybe_snake_to_camel(&self, name: &str) -> String {
        if self.snake_to_camel {
            snake_to_camel(name)
        } else {
            name.to_string()
        }
    }
}

/// Uppercase every word character that follows an underscore, dropping the
/// underscore: `foo_bar` -> `fooBar`, `Outer_inner` -> `OuterInner`.
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' {
            match chars.peek() {
                Some(&next) if next.is_alphanumeric() || next == '_' => {
                    out.extend(next.to_uppercase());
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}
