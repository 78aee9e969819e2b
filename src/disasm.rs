use serde::Serialize;

use crate::decoder::Decoder;
use crate::expand::Word;
use crate::instructions::{OperandKind, REGISTERS};

pub fn fmt_word(w: &Word) -> String {
    if w.op.is_unknown() {
        return format!("{} {}", w.op.mnemonic, w.param);
    }
    match w.op.operand {
        OperandKind::Ignored => w.op.mnemonic.to_string(),
        OperandKind::Register => match REGISTERS.get(usize::from(w.param)) {
            Some(r) => format!("{} {}", w.op.mnemonic, r.name),
            None => format!("{} r{}", w.op.mnemonic, w.param),
        },
        // A pseudo never reaches the image, so a label operand shows as its address.
        OperandKind::Immediate | OperandKind::Label => format!("{} {}", w.op.mnemonic, w.param),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub addr: usize,
    pub byte: u8,
    pub text: String,
}

pub fn disassemble<D: Decoder>(dec: &D, bytes: &[u8]) -> Vec<Line> {
    bytes
        .iter()
        .enumerate()
        .map(|(addr, &byte)| Line {
            addr,
            byte,
            text: fmt_word(&dec.decode(byte)),
        })
        .collect()
}
