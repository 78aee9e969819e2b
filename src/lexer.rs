//! Line tokenizer feeding the assembler passes.
//!
//! Grammar, one statement per line:
//!
//! ```text
//! [label:] [mnemonic [operand]] [; comment]
//! ```

use tracing::trace;

use crate::error::{AsmError, Result};
use crate::token::{SourceLine, Token, TokenKind};

pub fn tokenize(source: &str) -> Result<Vec<SourceLine>> {
    let mut out = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        tokenize_line(idx + 1, raw, &mut out)?;
    }
    trace!(records = out.len(), "tokenized source");
    Ok(out)
}

fn tokenize_line(line: usize, raw: &str, out: &mut Vec<SourceLine>) -> Result<()> {
    let mut s = raw;
    if let Some(p) = s.find(';') {
        s = &s[..p];
    }
    let mut s = s.trim();
    if s.is_empty() {
        return Ok(());
    }

    if let Some((head, rest)) = s.split_once(':') {
        let name = head.trim();
        if !is_ident(name) {
            return Err(AsmError::Syntax {
                line,
                text: name.to_string(),
                reason: "label names must be identifiers",
            });
        }
        if is_register_name(name) {
            return Err(AsmError::Syntax {
                line,
                text: name.to_string(),
                reason: "label name collides with a register",
            });
        }
        out.push(SourceLine::label(line, name));
        s = rest.trim();
        if s.is_empty() {
            return Ok(());
        }
    }

    let (mnemonic, rest) = match s.split_once(char::is_whitespace) {
        Some((mn, rest)) => (mn, rest.trim()),
        None => (s, ""),
    };
    if !is_ident(mnemonic) {
        return Err(AsmError::Syntax {
            line,
            text: mnemonic.to_string(),
            reason: "expected a mnemonic",
        });
    }

    let operand = if rest.is_empty() {
        None
    } else {
        if rest.contains(|c: char| c == ',' || c.is_whitespace()) {
            return Err(AsmError::Syntax {
                line,
                text: rest.to_string(),
                reason: "expected at most one operand",
            });
        }
        Some(classify(line, rest)?)
    };
    out.push(SourceLine::instr(line, mnemonic, operand));
    Ok(())
}

fn classify(line: usize, text: &str) -> Result<Token> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let kind = if digits.starts_with(|c: char| c.is_ascii_digit()) {
        TokenKind::Immediate
    } else if is_register_name(text) {
        TokenKind::Register
    } else if is_ident(text) {
        TokenKind::LabelRef
    } else {
        return Err(AsmError::Syntax {
            line,
            text: text.to_string(),
            reason: "unrecognized operand",
        });
    };
    Ok(Token::new(text, kind))
}

fn is_register_name(s: &str) -> bool {
    match s.strip_prefix(['r', 'R']) {
        Some(n) => !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '.' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Parses `0x`, `0b`, `0o` or decimal, with an optional leading `-`.
/// Signs anywhere else are rejected.
pub fn parse_num(s: &str) -> Option<i64> {
    let t = s.trim();
    let (neg, t) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t),
    };
    let (radix, digits) = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        (16, hex)
    } else if let Some(bin) = t.strip_prefix("0b").or_else(|| t.strip_prefix("0B")) {
        (2, bin)
    } else if let Some(oct) = t.strip_prefix("0o").or_else(|| t.strip_prefix("0O")) {
        (8, oct)
    } else {
        (10, t)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let v = i64::from_str_radix(digits, radix).ok()?;
    Some(if neg { -v } else { v })
}
