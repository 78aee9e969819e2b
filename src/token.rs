use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Immediate,
    Register,
    LabelRef,
    LabelDef,
    None,
}

impl TokenKind {
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Immediate => "an immediate",
            TokenKind::Register => "a register",
            TokenKind::LabelRef => "a label",
            TokenKind::LabelDef => "a label definition",
            TokenKind::None => "no",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn imm(value: impl ToString) -> Self {
        Self::new(value.to_string(), TokenKind::Immediate)
    }

    pub fn reg(name: &str) -> Self {
        Self::new(name, TokenKind::Register)
    }

    pub fn label(name: &str) -> Self {
        Self::new(name, TokenKind::LabelRef)
    }
}

/// One record handed over by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// Token kind is always `LabelDef`.
    Label(Token),
    Instr {
        mnemonic: String,
        operand: Option<Token>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based
    pub line: usize,
    pub item: Item,
}

impl SourceLine {
    pub fn label(line: usize, name: &str) -> Self {
        Self {
            line,
            item: Item::Label(Token::new(name, TokenKind::LabelDef)),
        }
    }

    pub fn instr(line: usize, mnemonic: &str, operand: Option<Token>) -> Self {
        Self {
            line,
            item: Item::Instr {
                mnemonic: mnemonic.to_string(),
                operand,
            },
        }
    }
}
