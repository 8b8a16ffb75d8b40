//! Instruction encoding, second pass of the assembler.
//!
//! Each queued instruction line is tokenized, its trailing `[delay]` and
//! `side N` modifiers are stripped off and packed, the mnemonic selects one
//! of the opcode encoders, and the packed delay/side-set value is merged
//! into bits 8..=12 of the result.

use crate::error::{AssemblerError, ErrorKind};
use crate::isa::{
    Condition, InSource, Mnemonic, MovDestination, MovOp, MovSource, OutDestination,
    SetDestination, WaitSource, fields,
};
use crate::parser::{InstructionLine, parse_integer};
use crate::symbol::SymbolTable;

/// Per-program encoding context. Read-only once built.
#[derive(Debug)]
pub struct Encoder<'a> {
    labels: &'a SymbolTable,
    side_set: u8,
    /// Bits left for the delay, `None` when the side-set width does not fit
    /// the field.
    delay_bits: Option<u8>,
    max_delay: i64,
}

impl<'a> Encoder<'a> {
    /// A `side_set` wider than [`fields::MAX_SIDE_SET`] leaves no room for
    /// a delay: instructions without modifiers still encode, any `[N]` or
    /// `side N` fails.
    pub fn new(labels: &'a SymbolTable, side_set: u8) -> Self {
        let delay_bits = fields::DELAY_BITS.checked_sub(side_set);
        Encoder {
            labels,
            side_set,
            delay_bits,
            max_delay: delay_bits.map_or(-1, |bits| (1i64 << bits) - 1),
        }
    }

    /// Largest delay an instruction may request with this side-set width.
    pub fn max_delay(&self) -> i64 {
        self.max_delay
    }

    /// Encodes one instruction line into its final word.
    pub fn encode(&self, instruction: &InstructionLine) -> Result<u16, AssemblerError> {
        let word = self
            .encode_tokens(instruction.tokens())
            .map_err(|kind| {
                AssemblerError::new(kind, instruction.line_number, instruction.text.as_str())
            })?;
        log::debug!(
            "line {}: {:<24} {:#06x}",
            instruction.line_number,
            instruction.text,
            word
        );
        Ok(word)
    }

    fn encode_tokens(&self, mut tokens: Vec<&str>) -> Result<u16, ErrorKind> {
        let delay = self.take_modifiers(&mut tokens)?;

        let (&mnemonic, operands) = tokens
            .split_first()
            .ok_or(ErrorKind::MissingOperand("instruction"))?;
        let mnemonic = Mnemonic::from_name(mnemonic)
            .ok_or_else(|| ErrorKind::UnknownInstruction(mnemonic.to_string()))?;

        let word = match mnemonic {
            Mnemonic::Nop => mnemonic.template(),
            Mnemonic::Jmp => self.encode_jmp(operands)?,
            Mnemonic::Wait => encode_wait(operands)?,
            Mnemonic::In => encode_in(operands)?,
            Mnemonic::Out => encode_out(operands)?,
            Mnemonic::Push | Mnemonic::Pull => encode_push_pull(mnemonic, operands),
            Mnemonic::Mov => encode_mov(operands)?,
            Mnemonic::Irq => encode_irq(operands)?,
            Mnemonic::Set => encode_set(operands)?,
        };

        Ok(word | (delay << fields::DELAY_SHIFT))
    }

    /// Removes a trailing `[N]` delay and a `side N` modifier from `tokens`
    /// and returns the packed 5-bit delay/side-set value.
    ///
    /// The delay occupies the low `5 - side_set` bits, the side-set value
    /// the bits above it.
    fn take_modifiers(&self, tokens: &mut Vec<&str>) -> Result<u16, ErrorKind> {
        let mut delay = 0u16;

        if let Some(&last) = tokens.last().filter(|token| token.ends_with(']')) {
            let value = parse_integer(last.trim_start_matches('[').trim_end_matches(']'))?;
            if !(0..=self.max_delay).contains(&value) {
                return Err(ErrorKind::DelayOutOfRange {
                    value,
                    max: self.max_delay,
                });
            }
            delay = value as u16;
            tokens.pop();
        }

        let count = tokens.len();
        if count > 1 && tokens[count - 2] == "side" {
            let value = parse_integer(tokens[count - 1])?;
            let shift = self.delay_bits.ok_or(ErrorKind::OperandRange {
                operand: "side-set width",
                value: i64::from(self.side_set),
                min: 0,
                max: i64::from(fields::MAX_SIDE_SET),
            })?;
            // Bound is 2^width inclusive, one above the largest value the
            // field can hold.
            let max = 1i64 << self.side_set;
            if !(0..=max).contains(&value) {
                return Err(ErrorKind::SideSetOutOfRange { value, max });
            }
            delay |= (value as u16) << shift;
            tokens.truncate(count - 2);
        }

        Ok(delay)
    }

    /// `jmp [cond] target`
    fn encode_jmp(&self, operands: &[&str]) -> Result<u16, ErrorKind> {
        let (condition, target) = match operands {
            [] => return Err(ErrorKind::MissingOperand("jump target")),
            [target] => (Condition::Always, *target),
            [condition, target] => (
                Condition::from_name(condition)
                    .ok_or_else(|| ErrorKind::UnknownCondition(condition.to_string()))?,
                *target,
            ),
            [_, _, extra, ..] => return Err(ErrorKind::UnexpectedOperand(extra.to_string())),
        };

        let address = match self.labels.resolve(target) {
            Some(index) => index as i64,
            None => parse_integer(target)
                .map_err(|_| ErrorKind::UnresolvedLabel(target.to_string()))?,
        };
        let address = check_range("jump target", address, 0, i64::from(fields::LOW_FIVE))?;

        Ok(Mnemonic::Jmp.template() | (condition.index() << fields::SELECT_SHIFT) | address)
    }
}

/// `wait polarity source index [rel]`
fn encode_wait(operands: &[&str]) -> Result<u16, ErrorKind> {
    let polarity = number(operand(operands, 0, "wait polarity")?, "polarity", 0, 1)?;
    let source_name = operand(operands, 1, "wait source")?;
    let source = WaitSource::from_name(source_name)
        .ok_or_else(|| ErrorKind::UnknownSource(source_name.to_string()))?;
    let index = number(
        operand(operands, 2, "wait index")?,
        "wait index",
        0,
        i64::from(fields::LOW_FIVE),
    )?;

    let mut word = Mnemonic::Wait.template()
        | (polarity << fields::WAIT_POLARITY_SHIFT)
        | (source.index() << fields::WAIT_SOURCE_SHIFT)
        | index;

    match operands.get(3) {
        Some(&"rel") => {
            word |= fields::WAIT_REL;
            expect_no_more(operands, 4)?;
        }
        Some(extra) => return Err(ErrorKind::UnexpectedOperand(extra.to_string())),
        None => {}
    }
    Ok(word)
}

/// `in source count`
fn encode_in(operands: &[&str]) -> Result<u16, ErrorKind> {
    let name = operand(operands, 0, "in source")?;
    let source =
        InSource::from_name(name).ok_or_else(|| ErrorKind::UnknownSource(name.to_string()))?;
    let count = bit_count(operand(operands, 1, "bit count")?)?;
    expect_no_more(operands, 2)?;

    Ok(Mnemonic::In.template() | (source.index() << fields::SELECT_SHIFT) | count)
}

/// `out destination count`
fn encode_out(operands: &[&str]) -> Result<u16, ErrorKind> {
    let name = operand(operands, 0, "out destination")?;
    let destination = OutDestination::from_name(name)
        .ok_or_else(|| ErrorKind::UnknownDestination(name.to_string()))?;
    let count = bit_count(operand(operands, 1, "bit count")?)?;
    expect_no_more(operands, 2)?;

    Ok(Mnemonic::Out.template() | (destination.index() << fields::SELECT_SHIFT) | count)
}

/// `push [iffull] [block|noblock]`, `pull [ifempty] [block|noblock]`
///
/// Blocking unless the last token is a `...block` spelling other than
/// `block` itself.
fn encode_push_pull(mnemonic: Mnemonic, operands: &[&str]) -> u16 {
    let mut word = mnemonic.template();

    if let Some(&"iffull" | &"ifempty") = operands.first() {
        word |= fields::IF_FULL_EMPTY;
    }
    match operands.last() {
        Some(&last) if last != "block" && last.ends_with("block") => {}
        _ => word |= fields::BLOCK,
    }
    word
}

/// `mov destination [op] source`, where the operator may also prefix the
/// source (`mov x, ~y`).
fn encode_mov(operands: &[&str]) -> Result<u16, ErrorKind> {
    let name = operand(operands, 0, "mov destination")?;
    let destination = MovDestination::from_name(name)
        .ok_or_else(|| ErrorKind::UnknownDestination(name.to_string()))?;

    let (op, source_name) = match operands {
        [_] | [] => return Err(ErrorKind::MissingOperand("mov source")),
        [_, source] => MovOp::split_prefix(source),
        [_, op, source] => (
            Some(MovOp::from_name(op).ok_or_else(|| ErrorKind::UnknownOperator(op.to_string()))?),
            *source,
        ),
        [_, _, _, extra, ..] => return Err(ErrorKind::UnexpectedOperand(extra.to_string())),
    };
    let source = MovSource::from_name(source_name)
        .ok_or_else(|| ErrorKind::UnknownSource(source_name.to_string()))?;
    let op = op.map_or(0, MovOp::index);

    Ok(Mnemonic::Mov.template()
        | (destination.index() << fields::SELECT_SHIFT)
        | (op << fields::MOV_OP_SHIFT)
        | source.index())
}

/// `irq [set|wait|clear] index [rel]`
///
/// Any mode other than `wait` or `clear` means set.
fn encode_irq(operands: &[&str]) -> Result<u16, ErrorKind> {
    let mut word = Mnemonic::Irq.template();
    let mut operands = operands;

    if let [head @ .., "rel"] = operands {
        word |= fields::IRQ_REL;
        operands = head;
    }

    let index = match operands {
        [] => return Err(ErrorKind::MissingOperand("irq index")),
        [index] => *index,
        [mode, index] => {
            word |= match *mode {
                "wait" => fields::IRQ_WAIT,
                "clear" => fields::IRQ_CLEAR,
                _ => 0,
            };
            *index
        }
        [_, _, extra, ..] => return Err(ErrorKind::UnexpectedOperand(extra.to_string())),
    };

    Ok(word | number(index, "irq index", 0, 7)?)
}

/// `set destination value`
fn encode_set(operands: &[&str]) -> Result<u16, ErrorKind> {
    let name = operand(operands, 0, "set destination")?;
    let destination = SetDestination::from_name(name)
        .ok_or_else(|| ErrorKind::UnknownDestination(name.to_string()))?;
    let value = number(
        operand(operands, 1, "set value")?,
        "set value",
        0,
        i64::from(fields::LOW_FIVE),
    )?;
    expect_no_more(operands, 2)?;

    Ok(Mnemonic::Set.template() | (destination.index() << fields::SELECT_SHIFT) | value)
}

// --- Operand helpers ---

fn operand<'t>(
    operands: &[&'t str],
    index: usize,
    what: &'static str,
) -> Result<&'t str, ErrorKind> {
    operands
        .get(index)
        .copied()
        .ok_or(ErrorKind::MissingOperand(what))
}

fn expect_no_more(operands: &[&str], count: usize) -> Result<(), ErrorKind> {
    match operands.get(count) {
        Some(extra) => Err(ErrorKind::UnexpectedOperand(extra.to_string())),
        None => Ok(()),
    }
}

fn check_range(operand: &'static str, value: i64, min: i64, max: i64) -> Result<u16, ErrorKind> {
    if (min..=max).contains(&value) {
        Ok(value as u16)
    } else {
        Err(ErrorKind::OperandRange {
            operand,
            value,
            min,
            max,
        })
    }
}

fn number(text: &str, operand: &'static str, min: i64, max: i64) -> Result<u16, ErrorKind> {
    check_range(operand, parse_integer(text)?, min, max)
}

/// Shift counts run 1..=32; 32 is encoded as 0.
fn bit_count(text: &str) -> Result<u16, ErrorKind> {
    Ok(number(text, "bit count", 1, 32)? & fields::LOW_FIVE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_with(labels: &SymbolTable, side_set: u8, text: &str) -> Result<u16, ErrorKind> {
        Encoder::new(labels, side_set)
            .encode(&InstructionLine {
                line_number: 1,
                text: text.to_string(),
            })
            .map_err(|err| err.kind)
    }

    fn encode(text: &str) -> Result<u16, ErrorKind> {
        encode_with(&SymbolTable::new(), 0, text)
    }

    #[test]
    fn test_max_delay() {
        let labels = SymbolTable::new();
        assert_eq!(Encoder::new(&labels, 0).max_delay(), 31);
        assert_eq!(Encoder::new(&labels, 2).max_delay(), 7);
        assert_eq!(Encoder::new(&labels, 5).max_delay(), 0);
    }

    #[test]
    fn test_nop() {
        assert_eq!(encode("nop"), Ok(0xA042));
        assert_eq!(encode("nop [5]"), Ok(0xA542));
        assert_eq!(encode("nop x y"), Ok(0xA042));
        assert_eq!(
            encode("NOP"),
            Err(ErrorKind::UnknownInstruction("NOP".to_string()))
        );
    }

    #[test]
    fn test_jmp() {
        let mut labels = SymbolTable::new();
        labels.define("loop", 3, 1).unwrap();

        assert_eq!(encode_with(&labels, 0, "jmp loop"), Ok(0x0003));
        assert_eq!(encode_with(&labels, 0, "jmp x-- loop"), Ok(0x0043));
        assert_eq!(encode_with(&labels, 0, "jmp !osre 5"), Ok(0x00E5));
        assert_eq!(encode_with(&labels, 0, "jmp pin, 0x1f"), Ok(0x00DF));
        assert_eq!(
            encode_with(&labels, 0, "jmp nowhere"),
            Err(ErrorKind::UnresolvedLabel("nowhere".to_string()))
        );
        assert_eq!(
            encode_with(&labels, 0, "jmp sometimes loop"),
            Err(ErrorKind::UnknownCondition("sometimes".to_string()))
        );
        assert!(matches!(
            encode_with(&labels, 0, "jmp 32"),
            Err(ErrorKind::OperandRange { value: 32, .. })
        ));
        assert_eq!(
            encode_with(&labels, 0, "jmp"),
            Err(ErrorKind::MissingOperand("jump target"))
        );
    }

    #[test]
    fn test_wait() {
        assert_eq!(encode("wait 1 gpio 5"), Ok(0x2085));
        assert_eq!(encode("wait 1 pin 3"), Ok(0x2093));
        assert_eq!(encode("wait 0 irq 2 rel"), Ok(0x2032));
        assert!(matches!(
            encode("wait 2 gpio 0"),
            Err(ErrorKind::OperandRange { operand: "polarity", .. })
        ));
        assert!(matches!(
            encode("wait 1 gpio 32"),
            Err(ErrorKind::OperandRange { operand: "wait index", .. })
        ));
        assert_eq!(
            encode("wait 1 jmppin 0"),
            Err(ErrorKind::UnknownSource("jmppin".to_string()))
        );
    }

    #[test]
    fn test_in_out() {
        assert_eq!(encode("in pins, 1"), Ok(0x4001));
        assert_eq!(encode("in pins, 32"), Ok(0x4000));
        assert_eq!(encode("in osr, 8"), Ok(0x40E8));
        assert_eq!(encode("out pindirs, 32"), Ok(0x6080));
        assert_eq!(encode("out exec, 16"), Ok(0x60F0));
        assert!(matches!(
            encode("in x, 0"),
            Err(ErrorKind::OperandRange { operand: "bit count", value: 0, .. })
        ));
        assert!(matches!(
            encode("out x, 33"),
            Err(ErrorKind::OperandRange { value: 33, .. })
        ));
        assert_eq!(
            encode("in status, 1"),
            Err(ErrorKind::UnknownSource("status".to_string()))
        );
        assert_eq!(
            encode("out status, 1"),
            Err(ErrorKind::UnknownDestination("status".to_string()))
        );
    }

    #[test]
    fn test_push_pull() {
        assert_eq!(encode("push"), Ok(0x8020));
        assert_eq!(encode("push noblock"), Ok(0x8000));
        assert_eq!(encode("push iffull block"), Ok(0x8060));
        assert_eq!(encode("push iffull"), Ok(0x8060));
        assert_eq!(encode("pull"), Ok(0x80A0));
        assert_eq!(encode("pull ifempty noblock"), Ok(0x80C0));
        assert_eq!(encode("push foo"), Ok(0x8020));
        assert_eq!(encode("pull ifempty fooblock"), Ok(0x80C0));
    }

    #[test]
    fn test_mov() {
        assert_eq!(encode("mov isr, osr"), Ok(0xA0C7));
        assert_eq!(encode("mov y, y"), Ok(0xA042));
        assert_eq!(encode("mov x, ~y"), Ok(0xA02A));
        assert_eq!(encode("mov x ~ y"), Ok(0xA02A));
        assert_eq!(encode("mov x, !y"), Ok(0xA02A));
        assert_eq!(encode("mov pins, ::isr"), Ok(0xA016));
        assert_eq!(
            encode("mov null, x"),
            Err(ErrorKind::UnknownDestination("null".to_string()))
        );
        assert_eq!(
            encode("mov x, exec"),
            Err(ErrorKind::UnknownSource("exec".to_string()))
        );
        assert_eq!(
            encode("mov x + y"),
            Err(ErrorKind::UnknownOperator("+".to_string()))
        );
    }

    #[test]
    fn test_irq() {
        assert_eq!(encode("irq 3"), Ok(0xC003));
        assert_eq!(encode("irq set 3"), Ok(0xC003));
        assert_eq!(encode("irq nowait 3"), Ok(0xC003));
        assert_eq!(encode("irq wait 1 rel"), Ok(0xC031));
        assert_eq!(encode("irq clear 7"), Ok(0xC047));
        assert!(matches!(
            encode("irq 8"),
            Err(ErrorKind::OperandRange { operand: "irq index", .. })
        ));
        assert_eq!(encode("irq later 1"), Ok(0xC001));
    }

    #[test]
    fn test_set() {
        assert_eq!(encode("set pindirs, 3"), Ok(0xE083));
        assert_eq!(encode("set x, 31"), Ok(0xE03F));
        assert!(matches!(
            encode("set x, 32"),
            Err(ErrorKind::OperandRange { value: 32, .. })
        ));
        assert_eq!(
            encode("set osr, 1"),
            Err(ErrorKind::UnknownDestination("osr".to_string()))
        );
    }

    #[test]
    fn test_delay_bounds() {
        let labels = SymbolTable::new();
        assert_eq!(encode_with(&labels, 0, "nop [31]"), Ok(0xBF42));
        assert_eq!(
            encode_with(&labels, 0, "nop [32]"),
            Err(ErrorKind::DelayOutOfRange { value: 32, max: 31 })
        );
        assert_eq!(encode_with(&labels, 2, "set x, 1 [7]"), Ok(0xE721));
        assert_eq!(
            encode_with(&labels, 2, "set x, 1 [8]"),
            Err(ErrorKind::DelayOutOfRange { value: 8, max: 7 })
        );
        assert!(matches!(
            encode_with(&labels, 0, "nop [-1]"),
            Err(ErrorKind::DelayOutOfRange { value: -1, .. })
        ));
        assert_eq!(
            encode_with(&labels, 0, "nop [x]"),
            Err(ErrorKind::InvalidNumber("x".to_string()))
        );
    }

    #[test]
    fn test_side_set_packing() {
        let labels = SymbolTable::new();
        assert_eq!(encode_with(&labels, 1, "nop side 1"), Ok(0xB042));
        assert_eq!(encode_with(&labels, 1, "nop side 1 [3]"), Ok(0xB342));
        assert_eq!(encode_with(&labels, 1, "set pins, 0 side 0 [15]"), Ok(0xEF00));
        assert_eq!(encode_with(&labels, 2, "out pins, 1 side 3"), Ok(0x7801));
        assert_eq!(
            encode_with(&labels, 1, "nop side 3"),
            Err(ErrorKind::SideSetOutOfRange { value: 3, max: 2 })
        );
    }

    #[test]
    fn test_side_set_bound_admits_two_to_the_width() {
        let labels = SymbolTable::new();
        assert!(encode_with(&labels, 1, "nop side 2").is_ok());
        assert!(encode_with(&labels, 3, "nop side 8").is_ok());
        assert!(encode_with(&labels, 3, "nop side 9").is_err());
    }

    #[test]
    fn test_side_set_wider_than_field() {
        let labels = SymbolTable::new();
        assert_eq!(Encoder::new(&labels, 6).max_delay(), -1);
        assert_eq!(Encoder::new(&labels, u8::MAX).max_delay(), -1);
        assert_eq!(encode_with(&labels, 6, "set x, 1"), Ok(0xE021));
        assert_eq!(
            encode_with(&labels, 6, "nop [0]"),
            Err(ErrorKind::DelayOutOfRange { value: 0, max: -1 })
        );
        assert_eq!(
            encode_with(&labels, 6, "nop side 1"),
            Err(ErrorKind::OperandRange {
                operand: "side-set width",
                value: 6,
                min: 0,
                max: 5,
            })
        );
    }

    #[test]
    fn test_unknown_instruction() {
        assert_eq!(
            encode("frobnicate x"),
            Err(ErrorKind::UnknownInstruction("frobnicate".to_string()))
        );
        assert_eq!(
            encode("[2]"),
            Err(ErrorKind::MissingOperand("instruction"))
        );
    }
}
