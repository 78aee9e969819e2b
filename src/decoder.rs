use crate::expand::Word;
use crate::instructions::{self, PARAM_BITS, PARAM_MASK};

pub trait Decoder {
    fn decode(&self, raw: u8) -> Word;
}

/// Splits a byte into opcode and parameter fields using the static table.
/// Reserved and out-of-table codes come back as `UNK` rather than an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableDecoder;

impl TableDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for TableDecoder {
    fn decode(&self, raw: u8) -> Word {
        Word {
            op: instructions::by_code(raw >> PARAM_BITS),
            param: raw & PARAM_MASK,
        }
    }
}
