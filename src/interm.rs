//! Pass 1: assign addresses and collect labels.

use tracing::{debug, trace};

use crate::error::{AsmError, Result};
use crate::instructions::{self, Opcode, OperandKind};
use crate::labels::LabelTable;
use crate::token::{Item, SourceLine, Token, TokenKind};

/// One source instruction placed at its final address. A pseudo entry
/// occupies `op.expansion_width()` words starting at `addr`.
#[derive(Debug, Clone, Eq)]
pub struct IntermInstr {
    pub addr: usize,
    pub op: Opcode,
    pub param: Option<Token>,
    /// Source line, for diagnostics only.
    pub line: usize,
}

impl IntermInstr {
    pub fn new(addr: usize, op: Opcode, param: Option<Token>, line: usize) -> Self {
        Self {
            addr,
            op,
            param,
            line,
        }
    }

    pub fn param_text(&self) -> &str {
        self.param.as_ref().map_or("", |t| t.text.as_str())
    }
}

// Address, opcode and operand text; the line and token kind are not compared.
impl PartialEq for IntermInstr {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr && self.op == other.op && self.param_text() == other.param_text()
    }
}

pub fn build(lines: &[SourceLine]) -> Result<(Vec<IntermInstr>, LabelTable)> {
    let mut labels = LabelTable::new();
    let mut out = Vec::new();
    let mut addr = 0usize;

    for src in lines {
        match &src.item {
            Item::Label(def) => {
                labels.define(&def.text, addr, src.line)?;
                trace!(name = %def.text, addr, "label");
            }
            Item::Instr { mnemonic, operand } => {
                let op = *instructions::by_mnemonic(mnemonic).ok_or_else(|| {
                    AsmError::UnknownMnemonic {
                        line: src.line,
                        mnemonic: mnemonic.clone(),
                    }
                })?;
                let param = check_operand(&op, operand.as_ref(), src.line)?;
                out.push(IntermInstr::new(addr, op, param, src.line));
                addr += op.expansion_width();
            }
        }
    }

    debug!(instrs = out.len(), words = addr, labels = labels.len(), "pass 1 done");
    Ok((out, labels))
}

fn check_operand(op: &Opcode, operand: Option<&Token>, line: usize) -> Result<Option<Token>> {
    let want = match op.operand {
        OperandKind::Ignored => return Ok(None),
        OperandKind::Register => TokenKind::Register,
        OperandKind::Immediate => TokenKind::Immediate,
        OperandKind::Label => TokenKind::LabelRef,
    };
    match operand {
        Some(tok) if tok.kind == want => Ok(Some(tok.clone())),
        other => Err(AsmError::OperandTypeMismatch {
            line,
            mnemonic: op.mnemonic,
            expected: want.describe(),
            found: other.map_or(TokenKind::None, |t| t.kind).describe(),
            text: other.map_or_else(String::new, |t| t.text.clone()),
        }),
    }
}
