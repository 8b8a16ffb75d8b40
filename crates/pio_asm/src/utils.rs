//! Reading and writing assembled programs in the formats tooling expects.
use clap::ValueEnum;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Read, Write};
use std::path::Path;

/// Output format for the assembled words
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw binary, little-endian 16-bit words
    Binary,
    /// Intel HEX format
    Hex,
    /// Text format (index and word in hex per line)
    Text,
    /// Comma separated word literals, ready to paste into host code
    Array,
}

impl OutputFormat {
    /// Default file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Binary => "bin",
            OutputFormat::Hex => "hex",
            OutputFormat::Text => "txt",
            OutputFormat::Array => "array",
        }
    }
}

fn invalid_data(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}

/// Read assembled words from any reader
pub fn read_words<R: BufRead>(reader: R, format: OutputFormat) -> io::Result<Vec<u16>> {
    match format {
        OutputFormat::Binary => read_binary(reader),
        OutputFormat::Hex => read_hex(reader),
        OutputFormat::Text => read_text(reader),
        OutputFormat::Array => read_array(reader),
    }
}

fn read_binary<R: Read>(mut reader: R) -> io::Result<Vec<u16>> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.len() % 2 != 0 {
        return Err(invalid_data("Binary size is not a multiple of 2 bytes"));
    }

    Ok(buffer
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect())
}

fn parse_hex_byte(text: &str, pos: usize) -> io::Result<u8> {
    let digits = text
        .get(pos..pos + 2)
        .ok_or_else(|| invalid_data("Record too short"))?;
    u8::from_str_radix(digits, 16).map_err(|e| invalid_data(e.to_string()))
}

fn read_hex<R: BufRead>(reader: R) -> io::Result<Vec<u16>> {
    let mut bytes = Vec::new();

    for line_result in reader.lines() {
        let line = line_result?;
        let line = line.trim();
        let Some(record) = line.strip_prefix(':') else {
            continue;
        };

        let count = parse_hex_byte(record, 0)? as usize;
        let record_len = 4 + count;
        let raw = (0..=record_len)
            .map(|i| parse_hex_byte(record, i * 2))
            .collect::<io::Result<Vec<u8>>>()?;

        let sum = raw.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        if sum != 0 {
            return Err(invalid_data(format!("Checksum mismatch in record: {}", line)));
        }

        match raw[3] {
            0x00 => {
                let address = u16::from_be_bytes([raw[1], raw[2]]) as usize;
                if bytes.len() < address {
                    bytes.resize(address, 0);
                }
                let data = &raw[4..4 + count];
                if bytes.len() < address + count {
                    bytes.resize(address + count, 0);
                }
                bytes[address..address + count].copy_from_slice(data);
            }
            0x01 => break,
            other => {
                return Err(invalid_data(format!("Unsupported record type {:02X}", other)));
            }
        }
    }

    read_binary(bytes.as_slice())
}

fn read_text<R: BufRead>(reader: R) -> io::Result<Vec<u16>> {
    let mut code = Vec::new();

    for line_result in reader.lines() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        // "IIII: WWWW"
        let (index, word) = line
            .split_once(':')
            .ok_or_else(|| invalid_data(format!("Invalid text format line: {}", line)))?;

        let index = usize::from_str_radix(index.trim(), 16)
            .map_err(|e| invalid_data(e.to_string()))?;
        if index != code.len() {
            return Err(invalid_data(format!("Unexpected index {:04X}", index)));
        }
        let word = u16::from_str_radix(word.trim(), 16).map_err(|e| invalid_data(e.to_string()))?;
        code.push(word);
    }

    Ok(code)
}

fn read_array<R: BufRead>(reader: R) -> io::Result<Vec<u16>> {
    let mut code = Vec::new();

    for line_result in reader.lines() {
        let line = line_result?;
        for literal in line.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let digits = literal
                .strip_prefix("0x")
                .ok_or_else(|| invalid_data(format!("Invalid word literal: {}", literal)))?;
            code.push(u16::from_str_radix(digits, 16).map_err(|e| invalid_data(e.to_string()))?);
        }
    }

    Ok(code)
}

/// Write the assembled words to a file in the specified format
pub fn write_output(code: &[u16], path: &Path, format: OutputFormat) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_words(code, &mut writer, format)?;
    writer.flush()
}

/// Write the assembled words to any writer
pub fn write_words<W: Write>(
    code: &[u16],
    writer: &mut W,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Binary => write_binary(code, writer),
        OutputFormat::Hex => write_hex(code, writer),
        OutputFormat::Text => write_text(code, writer),
        OutputFormat::Array => write_array(code, writer),
    }
}

fn write_binary<W: Write>(code: &[u16], writer: &mut W) -> io::Result<()> {
    for word in code {
        writer.write_all(&word.to_le_bytes())?;
    }
    Ok(())
}

/// Intel HEX, 16 data bytes per record, byte addresses from 0.
fn write_hex<W: Write>(code: &[u16], writer: &mut W) -> io::Result<()> {
    let mut address: u16 = 0;

    for chunk in code.chunks(8) {
        let line: Vec<u8> = chunk.iter().flat_map(|word| word.to_le_bytes()).collect();

        let mut checksum = line.len() as u8;
        checksum = checksum.wrapping_add((address >> 8) as u8);
        checksum = checksum.wrapping_add(address as u8);

        write!(writer, ":{:02X}{:04X}00", line.len(), address)?;
        for byte in &line {
            write!(writer, "{:02X}", byte)?;
            checksum = checksum.wrapping_add(*byte);
        }
        writeln!(writer, "{:02X}", 0u8.wrapping_sub(checksum))?;

        address = address.wrapping_add(line.len() as u16);
    }

    writeln!(writer, ":00000001FF")
}

fn write_text<W: Write>(code: &[u16], writer: &mut W) -> io::Result<()> {
    for (index, word) in code.iter().enumerate() {
        writeln!(writer, "{:04X}: {:04X}", index, word)?;
    }
    Ok(())
}

fn write_array<W: Write>(code: &[u16], writer: &mut W) -> io::Result<()> {
    for word in code {
        writeln!(writer, "0x{:04X},", word)?;
    }
    Ok(())
}
