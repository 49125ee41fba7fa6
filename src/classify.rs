//! Field classification.
//!
//! Every generator consumes the same [`Classification`] per field, so map
//! detection, wire shape and defaults are decided exactly once.

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto};

use crate::code::{CodeBlock, Symbol, TypeName};
use crate::codec::wire::{make_tag, WireType};
use crate::error::GenerateError;
use crate::options::{GenerationOptions, LongOption};
use crate::registry::TypeMap;
use crate::runtime;

pub const TIMESTAMP: &str = ".google.protobuf.Timestamp";

/// Boxed-primitive wrapper types and the scalar each one carries.
const WRAPPERS: &[(&str, Scalar)] = &[
    (".google.protobuf.DoubleValue", Scalar::Double),
    (".google.protobuf.FloatValue", Scalar::Float),
    (".google.protobuf.Int64Value", Scalar::Int64),
    (".google.protobuf.UInt64Value", Scalar::Uint64),
    (".google.protobuf.Int32Value", Scalar::Int32),
    (".google.protobuf.UInt32Value", Scalar::Uint32),
    (".google.protobuf.BoolValue", Scalar::Bool),
    (".google.protobuf.StringValue", Scalar::String),
    (".google.protobuf.BytesValue", Scalar::Bytes),
];

/// The scalar carried by a wrapper type, if `type_name` is one.
pub fn wrapper_scalar(type_name: &str) -> Option<Scalar> {
    WRAPPERS
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, scalar)| *scalar)
}

/// Protobuf scalar value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl Scalar {
    pub fn from_type(ty: Type) -> Option<Scalar> {
        Some(match ty {
            Type::Double => Scalar::Double,
            Type::Float => Scalar::Float,
            Type::Int32 => Scalar::Int32,
            Type::Int64 => Scalar::Int64,
            Type::Uint32 => Scalar::Uint32,
            Type::Uint64 => Scalar::Uint64,
            Type::Sint32 => Scalar::Sint32,
            Type::Sint64 => Scalar::Sint64,
            Type::Fixed32 => Scalar::Fixed32,
            Type::Fixed64 => Scalar::Fixed64,
            Type::Sfixed32 => Scalar::Sfixed32,
            Type::Sfixed64 => Scalar::Sfixed64,
            Type::Bool => Scalar::Bool,
            Type::String => Scalar::String,
            Type::Bytes => Scalar::Bytes,
            Type::Group | Type::Message | Type::Enum => return None,
        })
    }

    pub fn wire_type(self) -> WireType {
        match self {
            Scalar::Int32
            | Scalar::Int64
            | Scalar::Uint32
            | Scalar::Uint64
            | Scalar::Sint32
            | Scalar::Sint64
            | Scalar::Bool => WireType::Varint,
            Scalar::Fixed64 | Scalar::Sfixed64 | Scalar::Double => WireType::Fixed64,
            Scalar::Fixed32 | Scalar::Sfixed32 | Scalar::Float => WireType::Fixed32,
            Scalar::String | Scalar::Bytes => WireType::LengthDelimited,
        }
    }

    /// Method name on protobufjs `Reader`/`Writer`.
    pub fn reader_call(self) -> &'static str {
        match self {
            Scalar::Double => "double",
            Scalar::Float => "float",
            Scalar::Int32 => "int32",
            Scalar::Int64 => "int64",
            Scalar::Uint32 => "uint32",
            Scalar::Uint64 => "uint64",
            Scalar::Sint32 => "sint32",
            Scalar::Sint64 => "sint64",
            Scalar::Fixed32 => "fixed32",
            Scalar::Fixed64 => "fixed64",
            Scalar::Sfixed32 => "sfixed32",
            Scalar::Sfixed64 => "sfixed64",
            Scalar::Bool => "bool",
            Scalar::String => "string",
            Scalar::Bytes => "bytes",
        }
    }

    /// 64-bit integer kinds, whose representation follows `forceLong`.
    pub fn is_long(self) -> bool {
        matches!(
            self,
            Scalar::Int64 | Scalar::Uint64 | Scalar::Sint64 | Scalar::Fixed64 | Scalar::Sfixed64
        )
    }

    fn is_unsigned_long(self) -> bool {
        matches!(self, Scalar::Uint64 | Scalar::Fixed64)
    }

    pub fn is_packable(self) -> bool {
        !matches!(self, Scalar::String | Scalar::Bytes)
    }

    pub fn ts_type(self, options: &GenerationOptions) -> TypeName {
        match self {
            Scalar::Bool => TypeName::boolean(),
            Scalar::String => TypeName::string(),
            Scalar::Bytes => TypeName::simple("Uint8Array"),
            s if s.is_long() => match options.force_long {
                LongOption::Number => TypeName::number(),
                LongOption::Long => runtime::long().into(),
                LongOption::String => TypeName::string(),
            },
            _ => TypeName::number(),
        }
    }

    /// The default value expression.
    pub fn default_value(self, options: &GenerationOptions, code: &mut CodeBlock) -> String {
        match self {
            Scalar::Bool => "false".to_string(),
            Scalar::String => "\"\"".to_string(),
            Scalar::Bytes => "new Uint8Array()".to_string(),
            s if s.is_long() => match options.force_long {
                LongOption::Number => "0".to_string(),
                LongOption::String => "\"0\"".to_string(),
                LongOption::Long => {
                    let long = code.sym(&runtime::long());
                    if s.is_unsigned_long() {
                        format!("{}.UZERO", long)
                    } else {
                        format!("{}.ZERO", long)
                    }
                }
            },
            _ => "0".to_string(),
        }
    }

    /// Convert a JSON value at `from` into this scalar's representation.
    pub fn from_json(self, from: &str, options: &GenerationOptions, code: &mut CodeBlock) -> String {
        match self {
            Scalar::Bytes => from.to_string(),
            Scalar::Bool => format!("Boolean({})", from),
            Scalar::String => format!("String({})", from),
            s if s.is_long() => match options.force_long {
                LongOption::Number => format!("Number({})", from),
                LongOption::String => format!("String({})", from),
                LongOption::Long => format!("{}.fromValue({})", code.sym(&runtime::long()), from),
            },
            _ => format!("Number({})", from),
        }
    }
}

/// How a field's values are represented and encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Primitive(Scalar),
    Enum(Symbol),
    Message(Symbol),
    /// A `google.protobuf.*Value` field, flattened to `T | undefined`.
    Wrapper { wrapper: Symbol, value: Scalar },
    /// `google.protobuf.Timestamp`, surfaced as `Date`.
    Timestamp(Symbol),
    Map(Box<MapEntry>),
}

/// A `map<K, V>` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    /// The synthesized entry message.
    pub entry: Symbol,
    pub key: Scalar,
    pub value: FieldKind,
}

impl MapEntry {
    /// Index signature key type. Only `string` and `number` may index an
    /// object, so bool keys and `Long` keys become strings.
    pub fn key_index_type(&self, options: &GenerationOptions) -> TypeName {
        match self.key {
            Scalar::String | Scalar::Bool => TypeName::string(),
            k if k.is_long() && options.force_long != LongOption::Number => TypeName::string(),
            _ => TypeName::number(),
        }
    }

    /// Whether JSON object keys must be coerced with `Number(key)`.
    pub fn numeric_key(&self, options: &GenerationOptions) -> bool {
        self.key_index_type(options) == TypeName::number()
    }

    /// Convert the object key `key`, always a string at runtime, into the
    /// entry's key representation before it is written.
    pub fn key_from_object(&self, key: &str, options: &GenerationOptions, code: &mut CodeBlock) -> String {
        match self.key {
            Scalar::String => key.to_string(),
            Scalar::Bool => format!("{} === \"true\"", key),
            k if k.is_long() => match options.force_long {
                LongOption::Number => format!("Number({})", key),
                LongOption::String => key.to_string(),
                LongOption::Long => {
                    let long = code.sym(&runtime::long());
                    if k.is_unsigned_long() {
                        format!("{}.fromString({}, true)", long, key)
                    } else {
                        format!("{}.fromString({})", long, key)
                    }
                }
            },
            _ => format!("Number({})", key),
        }
    }
}

/// Everything the generators need to know about one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Property name in generated code.
    pub name: String,
    pub number: i32,
    pub repeated: bool,
    /// Member of a oneof, including proto3 `optional` fields.
    pub oneof: bool,
    pub kind: FieldKind,
}

impl FieldKind {
    /// The element type, ignoring repetition and optionality.
    pub fn element_type(&self, options: &GenerationOptions) -> TypeName {
        match self {
            FieldKind::Primitive(scalar) => scalar.ts_type(options),
            FieldKind::Enum(symbol) | FieldKind::Message(symbol) => symbol.clone().into(),
            FieldKind::Wrapper { value, .. } => wrapper_value_type(*value).optional(),
            FieldKind::Timestamp(_) => TypeName::simple("Date"),
            FieldKind::Map(map) => TypeName::Index {
                key: Box::new(map.key_index_type(options)),
                value: Box::new(map.value.element_type(options)),
            },
        }
    }

    pub fn wire_type(&self) -> WireType {
        match self {
            FieldKind::Primitive(scalar) => scalar.wire_type(),
            FieldKind::Enum(_) => WireType::Varint,
            _ => WireType::LengthDelimited,
        }
    }

    /// Reader/Writer method for kinds written without framing.
    pub fn reader_call(&self) -> Option<&'static str> {
        match self {
            FieldKind::Primitive(scalar) => Some(scalar.reader_call()),
            FieldKind::Enum(_) => Some("int32"),
            _ => None,
        }
    }

    pub fn is_packable(&self) -> bool {
        match self {
            FieldKind::Primitive(scalar) => scalar.is_packable(),
            FieldKind::Enum(_) => true,
            _ => false,
        }
    }

    /// Message-like kinds default to `undefined` and are written when present.
    pub fn is_message_like(&self) -> bool {
        matches!(
            self,
            FieldKind::Message(_) | FieldKind::Wrapper { .. } | FieldKind::Timestamp(_)
        )
    }

    pub fn default_value(&self, options: &GenerationOptions, code: &mut CodeBlock) -> String {
        match self {
            FieldKind::Primitive(scalar) => scalar.default_value(options, code),
            FieldKind::Enum(_) => "0".to_string(),
            FieldKind::Map(_) => "{}".to_string(),
            FieldKind::Message(_) | FieldKind::Wrapper { .. } | FieldKind::Timestamp(_) => {
                "undefined".to_string()
            }
        }
    }
}

/// 64-bit wrappers are always surfaced as `number`.
fn wrapper_value_type(value: Scalar) -> TypeName {
    match value {
        Scalar::Bool => TypeName::boolean(),
        Scalar::String => TypeName::string(),
        Scalar::Bytes => TypeName::simple("Uint8Array"),
        _ => TypeName::number(),
    }
}

impl Classification {
    pub fn is_map(&self) -> bool {
        matches!(self.kind, FieldKind::Map(_))
    }

    /// Repeated and not a map.
    pub fn is_list(&self) -> bool {
        self.repeated && !self.is_map()
    }

    pub fn is_packed(&self) -> bool {
        self.is_list() && self.kind.is_packable()
    }

    /// Tag for a single element.
    pub fn tag(&self) -> u32 {
        make_tag(self.number, self.kind.wire_type())
    }

    /// Tag for a packed run.
    pub fn packed_tag(&self) -> u32 {
        make_tag(self.number, WireType::LengthDelimited)
    }

    /// The property type as declared in the message interface.
    pub fn ts_type(&self, options: &GenerationOptions) -> TypeName {
        let element = self.kind.element_type(options);
        if self.is_map() {
            element
        } else if self.repeated {
            element.array()
        } else if matches!(self.kind, FieldKind::Wrapper { .. }) {
            element
        } else if self.oneof || self.kind.is_message_like() {
            element.optional()
        } else {
            element
        }
    }

    /// The value a freshly constructed message holds for this field.
    pub fn default_value(&self, options: &GenerationOptions, code: &mut CodeBlock) -> String {
        if self.is_map() {
            "{}".to_string()
        } else if self.repeated {
            "[]".to_string()
        } else {
            self.kind.default_value(options, code)
        }
    }

    /// Condition under which a singular non-oneof scalar at `place` must be
    /// written. `None` when the field is always written if present.
    pub fn not_default_check(
        &self,
        place: &str,
        options: &GenerationOptions,
        code: &mut CodeBlock,
    ) -> Option<String> {
        if self.repeated || self.oneof {
            return None;
        }
        match &self.kind {
            FieldKind::Primitive(Scalar::Bytes) => Some(format!("{}.length !== 0", place)),
            FieldKind::Primitive(s) if s.is_long() && options.force_long == LongOption::Long => {
                Some(format!("!{}.isZero()", place))
            }
            FieldKind::Primitive(s) => {
                Some(format!("{} !== {}", place, s.default_value(options, code)))
            }
            FieldKind::Enum(_) => Some(format!("{} !== 0", place)),
            _ => None,
        }
    }
}

/// Classify `field` of `message`.
pub fn classify(
    message: &DescriptorProto,
    field: &FieldDescriptorProto,
    registry: &TypeMap<'_>,
    options: &GenerationOptions,
) -> Result<Classification, GenerateError> {
    let repeated = field.label() == Label::Repeated;
    let kind = classify_kind(message, field, repeated, registry)?;
    Ok(Classification {
        name: options.maybe_snake_to_camel(field.name()),
        number: field.number(),
        repeated,
        oneof: field.oneof_index.is_some(),
        kind,
    })
}

fn classify_kind(
    message: &DescriptorProto,
    field: &FieldDescriptorProto,
    repeated: bool,
    registry: &TypeMap<'_>,
) -> Result<FieldKind, GenerateError> {
    let unsupported = |reason: &str| GenerateError::UnsupportedField {
        message: message.name().to_string(),
        field: field.name().to_string(),
        reason: reason.to_string(),
    };

    match field.r#type() {
        Type::Group => Err(unsupported("group encoding is not supported")),
        Type::Enum => Ok(FieldKind::Enum(registry.symbol(field.type_name())?)),
        Type::Message => {
            let type_name = field.type_name();
            if let Some(value) = wrapper_scalar(type_name) {
                return Ok(FieldKind::Wrapper {
                    wrapper: registry.symbol(type_name)?,
                    value,
                });
            }
            if type_name == TIMESTAMP {
                return Ok(FieldKind::Timestamp(registry.symbol(type_name)?));
            }

            let entry = registry.get(type_name)?;
            let target = registry.message(type_name)?;
            let is_map_entry = target
                .options
                .as_ref()
                .is_some_and(|o| o.map_entry());
            if repeated && is_map_entry {
                let (Some(key), Some(value)) = (target.field.first(), target.field.get(1)) else {
                    return Err(unsupported("map entry must declare a key and a value"));
                };
                let key = Scalar::from_type(key.r#type())
                    .ok_or_else(|| unsupported("map keys must be scalars"))?;
                let value = classify_kind(target, value, false, registry)?;
                return Ok(FieldKind::Map(Box::new(MapEntry {
                    entry: entry.symbol(),
                    key,
                    value,
                })));
            }
            Ok(FieldKind::Message(entry.symbol()))
        }
        scalar => Scalar::from_type(scalar)
            .map(FieldKind::Primitive)
            .ok_or_else(|| unsupported("unknown field type")),
    }
}

/// Classify every field of `message`, in declaration order.
pub fn classify_message(
    message: &DescriptorProto,
    registry: &TypeMap<'_>,
    options: &GenerationOptions,
) -> Result<Vec<Classification>, GenerateError> {
    message
        .field
        .iter()
        .map(|field| classify(message, field, registry, options))
        .collect()
}
