//! PIO instruction set definitions: opcode templates, field positions and
//! the fixed operand name tables.
//!
//! Every instruction is a 16-bit word:
//!
//! ```text
//!  15 13 12      8 7              0
//! +-----+---------+----------------+
//! | op  | delay / |    operands    |
//! |     | sideset |                |
//! +-----+---------+----------------+
//! ```
//!
//! The operand tables only contain the names that have an encoding. Slots
//! the decoder reserves have no variant, so a lookup for them fails instead
//! of handing back an unusable index.

/// Opcode templates. Top three bits select the instruction class; all other
/// bits are zero and filled in by the encoder.
pub mod opcodes {
    pub const JMP: u16 = 0b000 << 13;
    pub const WAIT: u16 = 0b001 << 13;
    pub const IN: u16 = 0b010 << 13;
    pub const OUT: u16 = 0b011 << 13;
    pub const PUSH_PULL: u16 = 0b100 << 13;
    pub const MOV: u16 = 0b101 << 13;
    pub const IRQ: u16 = 0b110 << 13;
    pub const SET: u16 = 0b111 << 13;

    /// `nop` assembles to `mov y, y`.
    //                       mov delay   y op   y
    pub const NOP: u16 = 0b101_00000_010_00_010;
}

/// Bit positions and flags inside the low byte.
pub mod fields {
    /// Shift of the shared delay/side-set field (bits 8..=12).
    pub const DELAY_SHIFT: u16 = 8;
    /// Width of the delay/side-set field.
    pub const DELAY_BITS: u8 = 5;
    /// Largest side-set width a program may declare.
    pub const MAX_SIDE_SET: u8 = DELAY_BITS;

    /// Shift of the 3-bit selector (condition, source, destination) in bits 5..=7.
    pub const SELECT_SHIFT: u16 = 5;
    /// Mask of the 5-bit operand at bits 0..=4.
    pub const LOW_FIVE: u16 = 0x1f;

    pub const WAIT_POLARITY_SHIFT: u16 = 7;
    pub const WAIT_SOURCE_SHIFT: u16 = 4;
    pub const WAIT_REL: u16 = 0x10;

    pub const PULL: u16 = 0x80;
    pub const IF_FULL_EMPTY: u16 = 0x40;
    pub const BLOCK: u16 = 0x20;

    pub const MOV_OP_SHIFT: u16 = 3;

    pub const IRQ_CLEAR: u16 = 0x40;
    pub const IRQ_WAIT: u16 = 0x20;
    pub const IRQ_REL: u16 = 0x10;
}

/// The recognised mnemonics. `push` and `pull` share an opcode class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Nop,
    Jmp,
    Wait,
    In,
    Out,
    Push,
    Pull,
    Mov,
    Irq,
    Set,
}

impl Mnemonic {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nop" => Some(Mnemonic::Nop),
            "jmp" => Some(Mnemonic::Jmp),
            "wait" => Some(Mnemonic::Wait),
            "in" => Some(Mnemonic::In),
            "out" => Some(Mnemonic::Out),
            "push" => Some(Mnemonic::Push),
            "pull" => Some(Mnemonic::Pull),
            "mov" => Some(Mnemonic::Mov),
            "irq" => Some(Mnemonic::Irq),
            "set" => Some(Mnemonic::Set),
            _ => None,
        }
    }

    /// The opcode template this mnemonic starts from.
    pub fn template(self) -> u16 {
        match self {
            Mnemonic::Nop => opcodes::NOP,
            Mnemonic::Jmp => opcodes::JMP,
            Mnemonic::Wait => opcodes::WAIT,
            Mnemonic::In => opcodes::IN,
            Mnemonic::Out => opcodes::OUT,
            Mnemonic::Push => opcodes::PUSH_PULL,
            Mnemonic::Pull => opcodes::PUSH_PULL | fields::PULL,
            Mnemonic::Mov => opcodes::MOV,
            Mnemonic::Irq => opcodes::IRQ,
            Mnemonic::Set => opcodes::SET,
        }
    }
}

/// `jmp` conditions. The unconditional jump has no spelling of its own; it
/// is what an omitted condition means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Always = 0,
    XZero = 1,
    XDecrement = 2,
    YZero = 3,
    YDecrement = 4,
    XNotEqualY = 5,
    Pin = 6,
    OsrNotEmpty = 7,
}

impl Condition {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "!x" => Some(Condition::XZero),
            "x--" => Some(Condition::XDecrement),
            "!y" => Some(Condition::YZero),
            "y--" => Some(Condition::YDecrement),
            "x!=y" => Some(Condition::XNotEqualY),
            "pin" => Some(Condition::Pin),
            "!osre" => Some(Condition::OsrNotEmpty),
            _ => None,
        }
    }

    pub fn index(self) -> u16 {
        self as u16
    }
}

/// `wait` sources. Slot 3 is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitSource {
    Gpio = 0,
    Pin = 1,
    Irq = 2,
}

impl WaitSource {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "gpio" => Some(WaitSource::Gpio),
            "pin" => Some(WaitSource::Pin),
            "irq" => Some(WaitSource::Irq),
            _ => None,
        }
    }

    pub fn index(self) -> u16 {
        self as u16
    }
}

/// `in` sources. Slots 4 and 5 are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InSource {
    Pins = 0,
    X = 1,
    Y = 2,
    Null = 3,
    Isr = 6,
    Osr = 7,
}

impl InSource {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pins" => Some(InSource::Pins),
            "x" => Some(InSource::X),
            "y" => Some(InSource::Y),
            "null" => Some(InSource::Null),
            "isr" => Some(InSource::Isr),
            "osr" => Some(InSource::Osr),
            _ => None,
        }
    }

    pub fn index(self) -> u16 {
        self as u16
    }
}

/// `out` destinations. All eight slots are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutDestination {
    Pins = 0,
    X = 1,
    Y = 2,
    Null = 3,
    Pindirs = 4,
    Pc = 5,
    Isr = 6,
    Exec = 7,
}

impl OutDestination {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pins" => Some(OutDestination::Pins),
            "x" => Some(OutDestination::X),
            "y" => Some(OutDestination::Y),
            "null" => Some(OutDestination::Null),
            "pindirs" => Some(OutDestination::Pindirs),
            "pc" => Some(OutDestination::Pc),
            "isr" => Some(OutDestination::Isr),
            "exec" => Some(OutDestination::Exec),
            _ => None,
        }
    }

    pub fn index(self) -> u16 {
        self as u16
    }
}

/// `mov` destinations. Slot 3 is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovDestination {
    Pins = 0,
    X = 1,
    Y = 2,
    Exec = 4,
    Pc = 5,
    Isr = 6,
    Osr = 7,
}

impl MovDestination {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pins" => Some(MovDestination::Pins),
            "x" => Some(MovDestination::X),
            "y" => Some(MovDestination::Y),
            "exec" => Some(MovDestination::Exec),
            "pc" => Some(MovDestination::Pc),
            "isr" => Some(MovDestination::Isr),
            "osr" => Some(MovDestination::Osr),
            _ => None,
        }
    }

    pub fn index(self) -> u16 {
        self as u16
    }
}

/// `mov` sources. Slot 4 is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovSource {
    Pins = 0,
    X = 1,
    Y = 2,
    Null = 3,
    Status = 5,
    Isr = 6,
    Osr = 7,
}

impl MovSource {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pins" => Some(MovSource::Pins),
            "x" => Some(MovSource::X),
            "y" => Some(MovSource::Y),
            "null" => Some(MovSource::Null),
            "status" => Some(MovSource::Status),
            "isr" => Some(MovSource::Isr),
            "osr" => Some(MovSource::Osr),
            _ => None,
        }
    }

    pub fn index(self) -> u16 {
        self as u16
    }
}

/// Unary `mov` operators. Index 0 is "no operation" and index 3 is reserved,
/// so neither has a spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovOp {
    Invert = 1,
    Reverse = 2,
}

impl MovOp {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "~" | "!" => Some(MovOp::Invert),
            "::" => Some(MovOp::Reverse),
            _ => None,
        }
    }

    /// Splits an operator glued to the front of a source (`~x`, `::isr`).
    pub fn split_prefix(operand: &str) -> (Option<Self>, &str) {
        if let Some(rest) = operand.strip_prefix("::") {
            (Some(MovOp::Reverse), rest)
        } else if let Some(rest) = operand.strip_prefix(['~', '!']) {
            (Some(MovOp::Invert), rest)
        } else {
            (None, operand)
        }
    }

    pub fn index(self) -> u16 {
        self as u16
    }
}

/// `set` destinations. Slots 3, 5, 6 and 7 are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetDestination {
    Pins = 0,
    X = 1,
    Y = 2,
    Pindirs = 4,
}

impl SetDestination {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pins" => Some(SetDestination::Pins),
            "x" => Some(SetDestination::X),
            "y" => Some(SetDestination::Y),
            "pindirs" => Some(SetDestination::Pindirs),
            _ => None,
        }
    }

    pub fn index(self) -> u16 {
        self as u16
    }
}
