/// Every variant carries the 1-based source line and the offending text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("line {line}: syntax error near `{text}`: {reason}")]
    Syntax {
        line: usize,
        text: String,
        reason: &'static str,
    },
    #[error("line {line}: unknown mnemonic `{mnemonic}`")]
    UnknownMnemonic { line: usize, mnemonic: String },
    #[error("line {line}: `{mnemonic}` expects {expected} operand, found {found} `{text}`")]
    OperandTypeMismatch {
        line: usize,
        mnemonic: &'static str,
        expected: &'static str,
        found: &'static str,
        text: String,
    },
    #[error("line {line}: label `{name}` already defined on line {first}")]
    DuplicateLabel {
        line: usize,
        name: String,
        first: usize,
    },
    #[error("line {line}: undefined label `{name}`")]
    UndefinedLabel { line: usize, name: String },
    #[error("line {line}: unknown register `{name}`")]
    UnknownRegister { line: usize, name: String },
    #[error("line {line}: invalid immediate `{text}` (expected 0..=7)")]
    InvalidImmediate { line: usize, text: String },
    #[error("line {line}: address {addr:#x} of `{name}` does not fit in {bits} bits")]
    AddressOutOfRange {
        line: usize,
        name: String,
        addr: usize,
        bits: u32,
    },
}

impl AsmError {
    pub fn line(&self) -> usize {
        match self {
            AsmError::Syntax { line, .. }
            | AsmError::UnknownMnemonic { line, .. }
            | AsmError::OperandTypeMismatch { line, .. }
            | AsmError::DuplicateLabel { line, .. }
            | AsmError::UndefinedLabel { line, .. }
            | AsmError::UnknownRegister { line, .. }
            | AsmError::InvalidImmediate { line, .. }
            | AsmError::AddressOutOfRange { line, .. } => *line,
        }
    }
}

pub type Result<T, E = AsmError> = std::result::Result<T, E>;
