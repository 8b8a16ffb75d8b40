//! Defines the error types used throughout the assembler.
//!
//! Every failure is fatal for the whole assembly: the first error aborts
//! the run and no words are produced.
use thiserror::Error;

/// What went wrong, together with the offending value where there is one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A second `.program` directive was found.
    #[error("multiple programs not supported (second program '{0}')")]
    DuplicateProgram(String),
    /// `.wrap_target` after the first instruction.
    #[error(".wrap_target is only supported before the first instruction")]
    UnsupportedWrap,
    #[error("delay {value} out of range (max {max})")]
    DelayOutOfRange { value: i64, max: i64 },
    #[error("side-set value {value} out of range (max {max})")]
    SideSetOutOfRange { value: i64, max: i64 },
    #[error("unknown jump condition '{0}'")]
    UnknownCondition(String),
    #[error("unknown source '{0}'")]
    UnknownSource(String),
    #[error("unknown destination '{0}'")]
    UnknownDestination(String),
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
    /// A numeric operand outside the bound of its field.
    #[error("{operand} {value} out of range ({min}..={max})")]
    OperandRange {
        operand: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("unknown instruction '{0}'")]
    UnknownInstruction(String),
    /// A jump target that is neither a label nor an integer.
    #[error("unresolved label '{0}'")]
    UnresolvedLabel(String),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("missing {0}")]
    MissingOperand(&'static str),
    #[error("unexpected operand '{0}'")]
    UnexpectedOperand(String),
    #[error("unknown directive '{0}'")]
    UnknownDirective(String),
    #[error("label '{0}' already defined")]
    DuplicateLabel(String),
}

/// The main error type for the assembler.
///
/// Carries the 1-based line number and the text of the source line that
/// caused the failure, so a caller can present a useful diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind} ('{text}')")]
pub struct AssemblerError {
    pub kind: ErrorKind,
    pub line: usize,
    pub text: String,
}

impl AssemblerError {
    pub fn new(kind: ErrorKind, line: usize, text: impl Into<String>) -> Self {
        AssemblerError {
            kind,
            line,
            text: text.into(),
        }
    }
}
