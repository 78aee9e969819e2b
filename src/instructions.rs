use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Mnemonic carried by reserved table slots and by codes past the end of the table.
pub const UNKNOWN_MNEMONIC: &str = "UNK";

/// Width of the parameter field; the opcode takes the remaining high bits.
pub const PARAM_BITS: u32 = 3;
pub const PARAM_MASK: u8 = (1 << PARAM_BITS) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperandKind {
    Register,
    Immediate,
    Ignored,
    Label,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Opcode {
    pub code: u8,
    pub mnemonic: &'static str,
    pub operand: OperandKind,
    pub pseudo: bool,
    /// Real words occupied in the image. Zero is read as one.
    pub width: u8,
}

impl Opcode {
    const fn real(code: u8, mnemonic: &'static str, operand: OperandKind) -> Self {
        Self {
            code,
            mnemonic,
            operand,
            pseudo: false,
            width: 1,
        }
    }

    const fn jump(code: u8, mnemonic: &'static str) -> Self {
        Self {
            code,
            mnemonic,
            operand: OperandKind::Label,
            pseudo: true,
            width: 3,
        }
    }

    const fn reserved(code: u8) -> Self {
        Self::real(code, UNKNOWN_MNEMONIC, OperandKind::Immediate)
    }

    pub fn expansion_width(&self) -> usize {
        usize::from(self.width.max(1))
    }

    pub fn is_unknown(&self) -> bool {
        self.mnemonic == UNKNOWN_MNEMONIC
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Register {
    pub name: &'static str,
    pub code: u8,
}

/// Indexed by opcode code.
pub const TABLE: &[Opcode] = &[
    Opcode::real(0x00, "halt", OperandKind::Ignored),
    Opcode::real(0x01, "li", OperandKind::Immediate),
    Opcode::real(0x02, "ld", OperandKind::Register),
    Opcode::real(0x03, "st", OperandKind::Register),
    Opcode::real(0x04, "getpc", OperandKind::Register),
    Opcode::real(0x05, "getst", OperandKind::Register),
    Opcode::real(0x06, "setst", OperandKind::Register),
    Opcode::real(0x07, "shli", OperandKind::Immediate),
    Opcode::real(0x08, "shri", OperandKind::Immediate),
    Opcode::real(0x09, "getacc", OperandKind::Register),
    Opcode::real(0x0a, "setacc", OperandKind::Register),
    Opcode::real(0x0b, "swacc", OperandKind::Register),
    Opcode::real(0x0c, "or", OperandKind::Register),
    Opcode::real(0x0d, "and", OperandKind::Register),
    Opcode::real(0x0e, "xor", OperandKind::Register),
    Opcode::real(0x0f, "add", OperandKind::Register),
    Opcode::real(0x10, "sub", OperandKind::Register),
    Opcode::real(0x11, "inc", OperandKind::Immediate),
    Opcode::real(0x12, "dec", OperandKind::Immediate),
    Opcode::reserved(0x13),
    Opcode::jump(0x14, "jz"),
    Opcode::jump(0x15, "jnz"),
    Opcode::jump(0x16, "jo"),
    Opcode::jump(0x17, "jno"),
    Opcode::jump(0x18, "jmp"),
    Opcode::reserved(0x19),
    Opcode::real(0x1a, "li0", OperandKind::Immediate),
    Opcode::real(0x1b, "li1", OperandKind::Immediate),
    Opcode::real(0x1c, "sjf", OperandKind::Immediate),
    Opcode::real(0x1d, "sjfn", OperandKind::Immediate),
    Opcode::real(0x1e, "jmplo", OperandKind::Immediate),
    Opcode::real(0x1f, "jmphi", OperandKind::Immediate),
];

pub const REGISTERS: &[Register] = &[
    Register { name: "r0", code: 0 },
    Register { name: "r1", code: 1 },
    Register { name: "r2", code: 2 },
    Register { name: "r3", code: 3 },
    Register { name: "r4", code: 4 },
    Register { name: "r5", code: 5 },
    Register { name: "r6", code: 6 },
    Register { name: "r7", code: 7 },
];

// Reserved slots are left out: they decode, but never assemble.
static BY_MNEMONIC: Lazy<HashMap<&'static str, &'static Opcode>> = Lazy::new(|| {
    TABLE
        .iter()
        .filter(|op| !op.is_unknown())
        .map(|op| (op.mnemonic, op))
        .collect()
});

static BY_REGISTER: Lazy<HashMap<&'static str, &'static Register>> =
    Lazy::new(|| REGISTERS.iter().map(|r| (r.name, r)).collect());

/// Case-insensitive mnemonic lookup.
pub fn by_mnemonic(name: &str) -> Option<&'static Opcode> {
    BY_MNEMONIC.get(name.to_ascii_lowercase().as_str()).copied()
}

/// Never fails: codes past the table come back as a synthetic `UNK` opcode
/// so malformed images can still be listed.
pub fn by_code(code: u8) -> Opcode {
    match TABLE.get(usize::from(code)) {
        Some(op) => *op,
        None => Opcode::reserved(code),
    }
}

/// Case-insensitive register lookup.
pub fn register(name: &str) -> Option<&'static Register> {
    BY_REGISTER.get(name.to_ascii_lowercase().as_str()).copied()
}

/// Pure bit-pack; the caller has already range-checked `param`.
pub fn encode(op: &Opcode, param: u8) -> u8 {
    (op.code << PARAM_BITS) | (param & PARAM_MASK)
}
