//! Persisting the codebook and the bit-packed payload.
//!
//! Layout (all integers big-endian):
//!
//! ```text
//! "HUF1" | u16 entries | entries x (u8 symbol, u64 weight) | payload bits
//! ```
//!
//! The header carries the weights of every byte that occurs in the input. The
//! reader rebuilds the same tree from them, which works because tree
//! construction breaks ties deterministically. The payload is each input
//! byte's code followed by the sentinel's code, packed MSB-first and padded
//! with zero bits to a byte boundary.

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::Path;

use log::{debug, info, trace};

use crate::error::{HuffmanError, Result};
use crate::frequency::{EOF_SYMBOL, FreqTable, Symbol};
use crate::huffman::{Codebook, HuffmanTree};

pub const MAGIC: &[u8; 4] = b"HUF1";
const ENTRY_SIZE: usize = 1 + 8;
const HEADER_SIZE: usize = MAGIC.len() + 2;

/// Consumer of a finished codebook.
pub trait Serializer {
    fn pack(&self, input: &Path, output: &Path, codebook: &Codebook) -> Result<()>;
}

/// Default serializer producing the format documented at module level.
#[derive(Debug, Default, Clone, Copy)]
pub struct BitPacker;

struct BitWriter<W: Write> {
    inner: W,
    byte: u8,
    filled: u8,
    written: u64,
}

impl<W: Write> BitWriter<W> {
    fn new(inner: W) -> Self {
        BitWriter {
            inner,
            byte: 0,
            filled: 0,
            written: 0,
        }
    }

    fn push_bits(&mut self, bits: &[bool]) -> Result<()> {
        for &bit in bits {
            self.byte = (self.byte << 1) | bit as u8;
            self.filled += 1;
            self.written += 1;
            if self.filled == 8 {
                self.inner.write_all(&[self.byte])?;
                self.byte = 0;
                self.filled = 0;
            }
        }
        Ok(())
    }

    /// Pads the final byte with zeros and hands back the writer.
    fn finish(mut self) -> Result<(W, u64)> {
        if self.filled > 0 {
            let last = self.byte << (8 - self.filled);
            self.inner.write_all(&[last])?;
        }
        self.inner.flush()?;
        Ok((self.inner, self.written))
    }
}

fn encode_header(codebook: &Codebook) -> Result<Vec<u8>> {
    let entries: Vec<_> = codebook
        .iter()
        .filter(|e| e.symbol != EOF_SYMBOL && e.weight > 0)
        .collect();

    let mut bytes = Vec::with_capacity(HEADER_SIZE + entries.len() * ENTRY_SIZE);
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    for entry in entries {
        let symbol = u8::try_from(entry.symbol).map_err(|_| {
            HuffmanError::InvalidArgument(format!("symbol {} is not a byte", entry.symbol))
        })?;
        bytes.push(symbol);
        bytes.extend_from_slice(&entry.weight.to_be_bytes());
    }

    debug!("Header generated. Total header size: {} bytes", bytes.len());
    Ok(bytes)
}

impl Serializer for BitPacker {
    fn pack(&self, input: &Path, output: &Path, codebook: &Codebook) -> Result<()> {
        info!("Packing {} into {}", input.display(), output.display());

        let eof = codebook.get(EOF_SYMBOL).ok_or_else(|| {
            HuffmanError::InvalidArgument("codebook has no end-of-stream entry".into())
        })?;

        let header = encode_header(codebook)?;
        let header_len = header.len();

        // Encode fully before touching `output` so a failure leaves no partial file.
        let mut bits = BitWriter::new(header);
        let mut reader = BufReader::new(File::open(input)?);
        let mut buf = [0u8; 8192];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for &b in &buf[..n] {
                let entry = codebook.get(b as Symbol).ok_or_else(|| {
                    HuffmanError::InvalidArgument(format!(
                        "byte {:#04x} found in input but not in codebook",
                        b
                    ))
                })?;
                bits.push_bits(&entry.bits)?;
            }
        }
        bits.push_bits(&eof.bits)?;
        let (packed, payload_bits) = bits.finish()?;

        fs::write(output, &packed)?;
        info!(
            "Packed {} header bytes and {} payload bits",
            header_len,
            payload_bits
        );
        Ok(())
    }
}

fn decode_header(content: &[u8]) -> Result<(FreqTable, usize)> {
    if content.len() < HEADER_SIZE {
        return Err(HuffmanError::CorruptStream("file too short for header".into()));
    }
    if &content[..MAGIC.len()] != MAGIC {
        return Err(HuffmanError::CorruptStream("bad magic".into()));
    }

    let count = u16::from_be_bytes([content[4], content[5]]) as usize;
    let end = HEADER_SIZE + count * ENTRY_SIZE;
    if end > content.len() {
        return Err(HuffmanError::CorruptStream(format!(
            "header declares {} entries but file holds {} bytes",
            count,
            content.len()
        )));
    }

    let mut counts = [0u64; 256];
    let mut total = 0u64;
    for chunk in content[HEADER_SIZE..end].chunks_exact(ENTRY_SIZE) {
        let symbol = chunk[0] as usize;
        let mut weight = [0u8; 8];
        weight.copy_from_slice(&chunk[1..]);
        let weight = u64::from_be_bytes(weight);
        if weight == 0 || counts[symbol] != 0 {
            return Err(HuffmanError::CorruptStream(format!(
                "invalid header entry for symbol {}",
                symbol
            )));
        }
        total = total.checked_add(weight).ok_or_else(|| {
            HuffmanError::CorruptStream("header weights overflow 64 bits".into())
        })?;
        counts[symbol] = weight;
        trace!("header entry {:#04x} weight {}", symbol, weight);
    }

    Ok((FreqTable::from_counts(&counts), end))
}

fn decode_payload(payload: &[u8], tree: &HuffmanTree) -> Result<Vec<u8>> {
    let root = tree.root();
    if tree.node(root).is_leaf() {
        return Ok(Vec::new());
    }

    let mut result = Vec::new();
    let mut current = root;
    for &byte in payload {
        for i in (0..8).rev() {
            let bit = (byte >> i) & 1 == 1;
            current = tree
                .child(current, bit)
                .ok_or_else(|| HuffmanError::CorruptStream("walked past a leaf".into()))?;

            match tree.node(current).symbol {
                Some(EOF_SYMBOL) => return Ok(result),
                Some(symbol) => {
                    result.push(symbol as u8);
                    current = root;
                }
                None => {}
            }
        }
    }

    Err(HuffmanError::CorruptStream(
        "payload ended before the end-of-stream code".into(),
    ))
}

/// Reverses [`BitPacker::pack`]: reads `input`, writes the original bytes to
/// `output` and returns how many were written.
pub fn unpack(input: &Path, output: &Path) -> Result<usize> {
    info!("Reading encoded file: {}", input.display());
    let content = fs::read(input)?;

    let (freq, header_size) = decode_header(&content)?;
    debug!(
        "Header: {} bytes, {} distinct symbols, {} bytes expected",
        header_size,
        freq.distinct(),
        freq.total()
    );

    let tree = HuffmanTree::build(&freq)?;
    let decoded = decode_payload(&content[header_size..], &tree)?;
    if decoded.len() as u64 != freq.total() {
        return Err(HuffmanError::CorruptStream(format!(
            "expected {} bytes, decoded {}",
            freq.total(),
            decoded.len()
        )));
    }

    fs::write(output, &decoded)?;
    info!("Wrote {} bytes to {}", decoded.len(), output.display());
    Ok(decoded.len())
}
