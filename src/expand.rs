//! Pass 2: lower pseudo jumps and resolve operands to 3-bit parameters.

use tracing::{debug, trace};

use crate::error::{AsmError, Result};
use crate::instructions::{self, Opcode, OperandKind, PARAM_BITS, PARAM_MASK};
use crate::interm::IntermInstr;
use crate::labels::LabelTable;
use crate::lexer::parse_num;
use crate::token::Token;

/// Status flag selectors understood by `sjf`/`sjfn`.
pub const FLAG_ZERO: u8 = 0;
pub const FLAG_OVERFLOW: u8 = 1;
/// Hardwired to one.
pub const FLAG_ONE: u8 = 7;

/// Widest address a `jmplo`/`jmphi` pair can carry.
pub const MAX_JUMP_TARGET: usize = (1 << (2 * PARAM_BITS)) - 1;

/// Jump suppression test emitted in front of `jmplo`/`jmphi`. The CPU can
/// only cancel a pending jump, so each condition is encoded by its opposite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipTest {
    /// `sjf f`: cancel when flag `f` is set.
    IfSet(u8),
    /// `sjfn f`: cancel when flag `f` is clear.
    IfClear(u8),
}

/// Pseudo jump mnemonic and the test it lowers to.
pub const JUMPS: &[(&str, SkipTest)] = &[
    ("jz", SkipTest::IfClear(FLAG_ZERO)),
    ("jnz", SkipTest::IfSet(FLAG_ZERO)),
    ("jo", SkipTest::IfClear(FLAG_OVERFLOW)),
    ("jno", SkipTest::IfSet(FLAG_OVERFLOW)),
    ("jmp", SkipTest::IfClear(FLAG_ONE)),
];

impl SkipTest {
    pub fn for_jump(mnemonic: &str) -> Option<Self> {
        JUMPS
            .iter()
            .find(|(mn, _)| mn.eq_ignore_ascii_case(mnemonic))
            .map(|&(_, test)| test)
    }

    /// Inverse of [`SkipTest::for_jump`]: the pseudo jump a test belongs to.
    pub fn jump_mnemonic(self) -> Option<&'static str> {
        JUMPS.iter().find(|&&(_, t)| t == self).map(|&(mn, _)| mn)
    }

    /// Reads a test back from a decoded `sjf`/`sjfn` word.
    pub fn from_word(w: &Word) -> Option<Self> {
        match w.op.mnemonic {
            "sjf" => Some(SkipTest::IfSet(w.param)),
            "sjfn" => Some(SkipTest::IfClear(w.param)),
            _ => None,
        }
    }

    pub fn emit(self) -> (&'static str, u8) {
        match self {
            SkipTest::IfSet(f) => ("sjf", f),
            SkipTest::IfClear(f) => ("sjfn", f),
        }
    }
}

/// How a pass-1 entry reaches the image.
enum Lowering<'a> {
    Real(&'a IntermInstr),
    Jump {
        src: &'a IntermInstr,
        test: SkipTest,
        target: &'a str,
    },
}

impl<'a> Lowering<'a> {
    fn classify(instr: &'a IntermInstr) -> Self {
        if !instr.op.pseudo {
            return Lowering::Real(instr);
        }
        match SkipTest::for_jump(instr.op.mnemonic) {
            Some(test) => Lowering::Jump {
                src: instr,
                test,
                target: instr.param_text(),
            },
            // Every pseudo in the table is a jump.
            None => unreachable!("pseudo `{}` has no lowering", instr.op.mnemonic),
        }
    }
}

/// One final instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word {
    pub op: Opcode,
    pub param: u8,
}

impl Word {
    pub fn encode(&self) -> u8 {
        instructions::encode(&self.op, self.param)
    }
}

/// Replaces every pseudo entry by its real instructions. The result holds
/// only real opcodes, one per image word, in address order.
pub fn expand(instrs: &[IntermInstr], labels: &LabelTable) -> Result<Vec<IntermInstr>> {
    let mut out = Vec::with_capacity(instrs.len());
    for instr in instrs {
        match Lowering::classify(instr) {
            Lowering::Real(real) => out.push(real.clone()),
            Lowering::Jump { src, test, target } => {
                let addr = lookup(labels, target, src.line)?;
                if addr > MAX_JUMP_TARGET {
                    return Err(AsmError::AddressOutOfRange {
                        line: src.line,
                        name: target.to_string(),
                        addr,
                        bits: 2 * PARAM_BITS,
                    });
                }
                let lo = addr & usize::from(PARAM_MASK);
                let hi = (addr >> PARAM_BITS) & usize::from(PARAM_MASK);
                let (test_mn, flag) = test.emit();
                let seq = [(test_mn, usize::from(flag)), ("jmplo", lo), ("jmphi", hi)];
                debug_assert_eq!(seq.len(), src.op.expansion_width());
                for (i, (mn, value)) in seq.into_iter().enumerate() {
                    out.push(IntermInstr::new(
                        src.addr + i,
                        real_op(mn),
                        Some(Token::imm(value)),
                        src.line,
                    ));
                }
                trace!(pseudo = src.op.mnemonic, target, addr, "lowered");
            }
        }
    }
    debug!(words = out.len(), "expanded");
    Ok(out)
}

/// Turns real intermediate instructions into encoded-ready words.
pub fn resolve(instrs: &[IntermInstr], labels: &LabelTable) -> Result<Vec<Word>> {
    instrs.iter().map(|i| resolve_one(i, labels)).collect()
}

fn resolve_one(instr: &IntermInstr, labels: &LabelTable) -> Result<Word> {
    let text = instr.param_text();
    let param = match instr.op.operand {
        OperandKind::Ignored => 0,
        OperandKind::Register => {
            instructions::register(text)
                .ok_or_else(|| AsmError::UnknownRegister {
                    line: instr.line,
                    name: text.to_string(),
                })?
                .code
        }
        OperandKind::Immediate => match parse_num(text) {
            Some(v) if (0..=i64::from(PARAM_MASK)).contains(&v) => v as u8,
            _ => {
                return Err(AsmError::InvalidImmediate {
                    line: instr.line,
                    text: text.to_string(),
                })
            }
        },
        OperandKind::Label => {
            let addr = lookup(labels, text, instr.line)?;
            if addr > usize::from(PARAM_MASK) {
                return Err(AsmError::AddressOutOfRange {
                    line: instr.line,
                    name: text.to_string(),
                    addr,
                    bits: PARAM_BITS,
                });
            }
            addr as u8
        }
    };
    Ok(Word {
        op: instr.op,
        param,
    })
}

fn lookup(labels: &LabelTable, name: &str, line: usize) -> Result<usize> {
    labels.resolve(name).ok_or_else(|| AsmError::UndefinedLabel {
        line,
        name: name.to_string(),
    })
}

fn real_op(mnemonic: &str) -> Opcode {
    match instructions::by_mnemonic(mnemonic) {
        Some(op) => *op,
        None => unreachable!("lowering names missing opcode `{mnemonic}`"),
    }
}
