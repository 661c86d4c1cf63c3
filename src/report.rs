use std::io::Write;

use crate::error::Result;
use crate::frequency::Symbol;
use crate::huffman::Codebook;

/// Printable ASCII as-is, anything else as a 3-digit octal escape.
pub fn symbol_label(symbol: Symbol) -> String {
    match u8::try_from(symbol) {
        Ok(b) if (0x20..=0x7e).contains(&b) => (b as char).to_string(),
        _ => format!("{:03o}", symbol),
    }
}

/// Writes `<sym>: <count> x <depth> bits = <total> bits` for every symbol
/// that actually occurs in the input.
pub fn write_report<W: Write>(out: &mut W, codebook: &Codebook) -> Result<()> {
    for entry in codebook.iter().filter(|e| e.weight > 0) {
        writeln!(
            out,
            "{}: {} x {} bits = {} bits",
            symbol_label(entry.symbol),
            entry.weight,
            entry.len(),
            entry.total_bits()
        )?;
    }
    Ok(())
}
