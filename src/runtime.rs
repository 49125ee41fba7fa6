//! Symbols provided by the generated code's runtime dependencies, plus the
//! names of file-local helpers emitted on demand.

use crate::code::Symbol;

pub const PROTOBUF_MINIMAL: &str = "protobufjs/minimal";

pub fn reader() -> Symbol {
    Symbol::named("Reader", PROTOBUF_MINIMAL)
}

pub fn writer() -> Symbol {
    Symbol::named("Writer", PROTOBUF_MINIMAL)
}

pub fn long() -> Symbol {
    Symbol::namespace("Long", "long")
}

pub fn data_loader() -> Symbol {
    Symbol::namespace("DataLoader", "dataloader")
}

pub fn hash() -> Symbol {
    Symbol::namespace("hash", "object-hash")
}

/// Helpers declared in the generated unit itself.
pub mod helpers {
    use crate::code::Symbol;

    pub const LONG_TO_NUMBER: &str = "longToNumber";
    pub const LONG_TO_STRING: &str = "longToString";
    pub const NUMBER_TO_LONG: &str = "numberToLong";
    pub const DEEP_PARTIAL: &str = "DeepPartial";
    pub const TO_TIMESTAMP: &str = "toTimestamp";
    pub const FROM_TIMESTAMP: &str = "fromTimestamp";
    pub const FROM_JSON_TIMESTAMP: &str = "fromJsonTimestamp";

    pub fn symbol(name: &str) -> Symbol {
        Symbol::helper(name)
    }
}
