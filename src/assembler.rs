use tracing::{debug, info_span};

use crate::encoder::encode_words;
use crate::error::Result;
use crate::expand::{expand, resolve, Word};
use crate::interm;
use crate::labels::LabelTable;
use crate::lexer;
use crate::token::SourceLine;

/// Output of a single assembly run. Each run owns its label table.
#[derive(Debug, Clone)]
pub struct Program {
    pub bytes: Vec<u8>,
    pub words: Vec<Word>,
    pub labels: LabelTable,
}

pub fn assemble(lines: &[SourceLine]) -> Result<Program> {
    let _span = info_span!("assemble", records = lines.len()).entered();

    let (instrs, labels) = interm::build(lines)?;
    let real = expand(&instrs, &labels)?;
    let words = resolve(&real, &labels)?;
    let bytes = encode_words(&words);

    debug!(bytes = bytes.len(), "encoded");
    Ok(Program {
        bytes,
        words,
        labels,
    })
}

pub fn assemble_source(source: &str) -> Result<Program> {
    let lines = lexer::tokenize(source)?;
    assemble(&lines)
}
