//! # PIO Assembler Library
//!
//! Assembles programs for the programmable I/O state machines into 16-bit
//! instruction words.
//!
//! It includes modules for:
//! - Line classification and label collection (`parser`)
//! - Instruction encoding and delay/side-set packing (`encoder`)
//! - Instruction set tables (`isa`)
//! - Label table management (`symbol`)
//! - Error handling (`error`)
//! - Output formats (`utils`)
//!
//! ## Example Usage
//!
//! ```rust
//! use pio_asm::assemble;
//!
//! const SOURCE_CODE: &str = "
//! .program squarewave
//!     set pindirs, 1   ; Set pin to output
//! again:
//!     set pins, 1 [1]  ; Drive pin high and then delay for one cycle
//!     set pins, 0      ; Drive pin low
//!     jmp again        ; Set PC to label `again`
//! ";
//!
//! let program = assemble(SOURCE_CODE).unwrap();
//! assert_eq!(program.code, vec![0xE081, 0xE101, 0xE000, 0x0001]);
//! ```

pub mod assembler;
pub mod encoder;
pub mod error;
pub mod isa;
pub mod parser;
pub mod symbol;
pub mod utils;

pub use assembler::{AssemblyOutput, assemble};
pub use error::{AssemblerError, ErrorKind};
pub use symbol::SymbolTable;
pub use utils::OutputFormat;
