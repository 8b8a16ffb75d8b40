//! Ties the two passes together.

use crate::encoder::Encoder;
use crate::error::AssemblerError;
use crate::parser::{collect, normalize};

/// An assembled program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssemblyOutput {
    /// Name from the `.program` directive, if any.
    pub name: Option<String>,
    /// Declared side-set width.
    pub side_set: u8,
    /// One word per instruction, in program order.
    pub code: Vec<u16>,
}

impl AssemblyOutput {
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn size_in_bytes(&self) -> usize {
        self.code.len() * 2
    }
}

/// Assembles PIO source text.
///
/// Runs the collection pass over the whole text first, so labels resolve
/// regardless of where they are defined, then encodes every instruction.
/// The first error aborts the assembly.
pub fn assemble(source: &str) -> Result<AssemblyOutput, AssemblerError> {
    let lines = normalize(source);
    let program = collect(&lines)?;
    log::debug!(
        "program {:?}: {} instructions, {} labels, side_set {}",
        program.name,
        program.instructions.len(),
        program.labels.len(),
        program.side_set
    );
    for (name, symbol) in program.labels.iter() {
        log::trace!(
            "label {name} -> {} (line {})",
            symbol.index(),
            symbol.defined_at_line()
        );
    }

    let encoder = Encoder::new(&program.labels, program.side_set);
    let code = program
        .instructions
        .iter()
        .map(|instruction| encoder.encode(instruction))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AssemblyOutput {
        name: program.name,
        side_set: program.side_set,
        code,
    })
}
