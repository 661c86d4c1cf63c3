use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info};

use crate::error::Result;

/// Symbol id: 0..=255 are byte values, 256 is the end-of-stream sentinel.
pub type Symbol = u16;

pub const EOF_SYMBOL: Symbol = 256;
pub const SYMBOL_COUNT: usize = 257;

/// Per-symbol occurrence counts. The sentinel slot is always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreqTable {
    counts: [u64; SYMBOL_COUNT],
}

impl FreqTable {
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; SYMBOL_COUNT];
        for &b in data {
            counts[b as usize] += 1;
        }
        FreqTable { counts }
    }

    /// Builds a table from raw byte counts, leaving the sentinel at zero.
    pub fn from_counts(bytes: &[u64; 256]) -> Self {
        let mut counts = [0u64; SYMBOL_COUNT];
        counts[..256].copy_from_slice(bytes);
        FreqTable { counts }
    }

    /// Counts every byte until end of stream. On a read error nothing is
    /// returned, so a partially filled table never escapes.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut counts = [0u64; SYMBOL_COUNT];
        let mut reader = BufReader::new(reader);
        let mut buf = [0u8; 8192];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for &b in &buf[..n] {
                counts[b as usize] += 1;
            }
        }

        let table = FreqTable { counts };
        debug!(
            "Counted {} bytes across {} distinct symbols",
            table.total(),
            table.distinct()
        );
        Ok(table)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        info!("Counting symbol frequencies in {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn count(&self, symbol: Symbol) -> u64 {
        self.counts[symbol as usize]
    }

    /// Total number of input bytes (the sentinel contributes nothing).
    /// Saturates at `u64::MAX` for tables built from arbitrary counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().fold(0, |acc, &c| acc.saturating_add(c))
    }

    /// Like [`FreqTable::total`], but `None` when the sum overflows.
    pub fn checked_total(&self) -> Option<u64> {
        self.counts.iter().try_fold(0u64, |acc, &c| acc.checked_add(c))
    }

    /// Number of byte values that occur at least once.
    pub fn distinct(&self) -> usize {
        self.counts[..256].iter().filter(|&&c| c > 0).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(s, &c)| (s as Symbol, c))
    }
}
