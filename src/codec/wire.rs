//! Protobuf wire-format constants used when emitting tags.

/// Wire types the generated codecs read and write. Group framing (3 and 4)
/// is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

/// Bits of a tag holding the wire type.
pub const TAG_TYPE_BITS: u32 = 3;

/// Tag written before a field: `(number << 3) | wire_type`.
#[inline]
pub fn make_tag(number: i32, wire_type: WireType) -> u32 {
    ((number as u32) << TAG_TYPE_BITS) | wire_type as u32
}
