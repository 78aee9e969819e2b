pub mod assembler;
pub mod decoder;
pub mod disasm;
pub mod encoder;
pub mod error;
pub mod expand;
pub mod instructions;
pub mod interm;
pub mod labels;
pub mod lexer;
pub mod token;

pub use assembler::{assemble, assemble_source, Program};
pub use decoder::{Decoder, TableDecoder};
pub use error::AsmError;
pub use expand::Word;
pub use instructions::{Opcode, OperandKind, Register};
