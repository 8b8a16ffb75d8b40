//! Line normalization and the directive/label collection pass.
//!
//! The first pass walks the source once, classifies every line, handles
//! directives, records labels and queues instruction lines for encoding.
//! Nothing is encoded here; by the time the encoder runs the label table
//! is complete.

use crate::error::{AssemblerError, ErrorKind};
use crate::symbol::SymbolTable;

/// Classification of a non-empty source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `.keyword args...`
    Directive { keyword: &'a str, args: Vec<&'a str> },
    /// `name:`
    Label(&'a str),
    /// Anything else; the text is kept for the encoder.
    Instruction(&'a str),
}

/// A logical line after comment and whitespace stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 1-based line number in the source.
    pub line_number: usize,
    /// The stripped text.
    pub text: &'a str,
    pub kind: LineKind<'a>,
}

/// An instruction line queued for the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionLine {
    pub line_number: usize,
    pub text: String,
}

impl InstructionLine {
    pub fn tokens(&self) -> Vec<&str> {
        tokenize(&self.text)
    }
}

/// Result of the collection pass.
#[derive(Debug, Default)]
pub struct Program {
    /// Name given by `.program`; informational only.
    pub name: Option<String>,
    /// Side-set width from `.side_set`, 0 when absent.
    pub side_set: u8,
    pub labels: SymbolTable,
    pub instructions: Vec<InstructionLine>,
}

/// Removes a trailing `;` comment.
pub fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Splits an instruction into tokens. Whitespace and commas both separate
/// operands, so `in pins, 1` and `in pins 1` are the same.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .collect()
}

/// Parses an integer literal: decimal, `0x` hexadecimal or `0b` binary,
/// with an optional leading minus.
pub fn parse_integer(text: &str) -> Result<i64, ErrorKind> {
    let invalid = || ErrorKind::InvalidNumber(text.to_string());
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        (2, bin)
    } else {
        (10, digits)
    };

    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }
    let value = i64::from_str_radix(body, radix).map_err(|_| invalid())?;

    Ok(if negative { -value } else { value })
}

/// Strips comments and whitespace and classifies each remaining line.
pub fn normalize(source: &str) -> Vec<SourceLine<'_>> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let text = strip_comment(raw.trim()).trim();
            if text.is_empty() {
                return None;
            }

            let kind = if text.starts_with('.') {
                let mut words = text.split_whitespace();
                let keyword = words.next().unwrap_or(text);
                LineKind::Directive {
                    keyword,
                    args: words.collect(),
                }
            } else if let Some(name) = text.strip_suffix(':') {
                LineKind::Label(name.trim())
            } else {
                LineKind::Instruction(text)
            };

            log::trace!("line {}: {:?}", index + 1, kind);
            Some(SourceLine {
                line_number: index + 1,
                text,
                kind,
            })
        })
        .collect()
}

/// State of the collection pass.
#[derive(Debug, Default)]
struct Collector {
    program: Program,
}

impl Collector {
    fn line(&mut self, line: &SourceLine<'_>) -> Result<(), ErrorKind> {
        match &line.kind {
            LineKind::Directive { keyword, args } => self.directive(keyword, args),
            LineKind::Label(name) => {
                if name.is_empty() {
                    return Err(ErrorKind::MissingOperand("label name"));
                }
                let index = self.program.instructions.len();
                self.program.labels.define(name, index, line.line_number)
            }
            LineKind::Instruction(text) => {
                self.program.instructions.push(InstructionLine {
                    line_number: line.line_number,
                    text: text.to_string(),
                });
                Ok(())
            }
        }
    }

    /// Only the first argument of a directive is read; anything after it
    /// (`.side_set 1 opt`) is ignored.
    fn directive(&mut self, keyword: &str, args: &[&str]) -> Result<(), ErrorKind> {
        match keyword {
            ".program" => {
                let name = *args.first().ok_or(ErrorKind::MissingOperand("program name"))?;
                if self.program.name.is_some() {
                    return Err(ErrorKind::DuplicateProgram(name.to_string()));
                }
                self.program.name = Some(name.to_string());
            }
            ".wrap_target" => {
                if !self.program.instructions.is_empty() {
                    return Err(ErrorKind::UnsupportedWrap);
                }
            }
            ".wrap" => {}
            ".side_set" => {
                let text = *args.first().ok_or(ErrorKind::MissingOperand("side-set width"))?;
                let width = parse_integer(text)?;
                // Widths above the delay field are only rejected once an
                // instruction actually uses a delay or side-set value.
                let width = u8::try_from(width).map_err(|_| ErrorKind::OperandRange {
                    operand: "side-set width",
                    value: width,
                    min: 0,
                    max: i64::from(u8::MAX),
                })?;
                self.program.side_set = width;
            }
            _ => return Err(ErrorKind::UnknownDirective(keyword.to_string())),
        }
        Ok(())
    }
}

/// Runs the collection pass over normalized lines.
pub fn collect(lines: &[SourceLine<'_>]) -> Result<Program, AssemblerError> {
    let mut collector = Collector::default();
    for line in lines {
        collector
            .line(line)
            .map_err(|kind| AssemblerError::new(kind, line.line_number, line.text))?;
    }
    Ok(collector.program)
}
