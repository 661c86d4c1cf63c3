//! # huffpack
//!
//! Builds an optimal prefix code for the byte alphabet (plus an end-of-stream
//! sentinel) with the greedy Huffman algorithm and hands the resulting
//! codebook to a [`Serializer`].
//!
//! ```no_run
//! use std::path::Path;
//! use huffpack::{BitPacker, encode_file};
//!
//! let mut report = std::io::stdout();
//! encode_file(Path::new("input.txt"), Path::new("input.huf"), &BitPacker, &mut report)?;
//! huffpack::unpack(Path::new("input.huf"), Path::new("input.out"))?;
//! # Ok::<(), huffpack::HuffmanError>(())
//! ```

pub mod error;
pub mod frequency;
pub mod huffman;
pub mod pack;
pub mod pqueue;
pub mod report;

use std::io::Write;
use std::path::Path;

use log::{debug, info};

pub use error::{HuffmanError, Result};
pub use frequency::{EOF_SYMBOL, FreqTable, SYMBOL_COUNT, Symbol};
pub use huffman::{CodeEntry, Codebook, HuffmanTree};
pub use pack::{BitPacker, Serializer, unpack};
pub use pqueue::PriorityQueue;

/// Runs the whole encoder: count, build, report, then hand off to `serializer`.
///
/// The tree is dropped once the serializer returns.
pub fn encode_file<S, W>(input: &Path, output: &Path, serializer: &S, report: &mut W) -> Result<()>
where
    S: Serializer + ?Sized,
    W: Write,
{
    info!("--- Start Encoding ---");
    let freq = FreqTable::from_path(input)?;

    debug!("Building Huffman Tree...");
    let tree = HuffmanTree::build(&freq)?;
    let codebook = tree.codebook();
    debug!(
        "Code table built. {} leaves, {} payload bits",
        tree.leaf_count(),
        tree.weighted_length()
    );

    report::write_report(report, &codebook)?;

    serializer.pack(input, output, &codebook)?;
    info!("--- End ---");
    Ok(())
}
