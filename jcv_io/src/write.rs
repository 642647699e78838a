use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};
use xxhash_rust::xxh3::xxh3_64;

use jcv_core::prefix::CodeLengthStats;
use jcv_core::{
    assemble, ChannelStreams, CodeBook, Codeword, Component, EncodingKind, FrequencyTable,
};

use crate::layout::OutputLayout;

/// What was written for one (component, encoding kind) pair.
#[derive(Debug, Clone)]
pub struct HuffmanSummary {
    pub component: Component,
    pub kind: EncodingKind,
    pub codebook: CodeBook,
    pub packed_bytes: usize,
}

/// What was written for one component's bitstream.
#[derive(Debug, Clone)]
pub struct BitstreamSummary {
    pub component: Component,
    pub path: PathBuf,
    pub bytes: usize,
    /// xxh3-64 of the written bytes.
    pub checksum: u64,
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating directory {:?}", parent))?;
    }
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    Ok(BufWriter::new(file))
}

/// `<symbol> <codeword>` per line, ascending by symbol.
pub fn write_codebook(path: &Path, book: &CodeBook) -> anyhow::Result<()> {
    let mut out = create(path)?;
    for (symbol, code) in book.iter() {
        writeln!(out, "{} {}", symbol, code)?;
    }
    out.flush()?;
    Ok(())
}

/// One line per block: that block's codewords joined by spaces.
pub fn write_huffman_data(path: &Path, book: &CodeBook, blocks: &[Vec<i64>]) -> anyhow::Result<()> {
    let mut out = create(path)?;
    for (index, block) in blocks.iter().enumerate() {
        let line = book
            .encode_line(block)
            .with_context(|| format!("encoding block {}", index))?;
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(())
}

/// Read back a codebook file, skipping blank and malformed lines.
pub fn read_codebook(path: &Path) -> anyhow::Result<CodeBook> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let mut entries = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let parsed = line.split_once(' ').and_then(|(symbol, code)| {
            Some((symbol.parse::<i64>().ok()?, code.trim().parse::<Codeword>().ok()?))
        });
        match parsed {
            Some(entry) => entries.push(entry),
            None => warn!(path = ?path, line, "skipping malformed codebook line"),
        }
    }
    Ok(CodeBook::from_entries(entries))
}

/// Build, write and pack the codes of every encoding kind of one component.
///
/// Kinds the hardware did not dump are skipped.
pub fn write_huffman_outputs(
    layout: &OutputLayout,
    streams: &ChannelStreams,
) -> anyhow::Result<Vec<HuffmanSummary>> {
    let component = streams.component;
    let mut summaries = Vec::new();
    for kind in EncodingKind::ALL {
        if !streams.has(kind) {
            warn!(component = %component, kind = %kind, "no symbols, skipping Huffman coding");
            continue;
        }
        let blocks = streams.block_symbols(kind);
        let frequencies = FrequencyTable::from_symbols(blocks.iter().flatten().copied());
        let codebook = CodeBook::build(&frequencies);

        write_codebook(&layout.codes_file(component, kind), &codebook)?;
        write_huffman_data(&layout.data_file(component, kind), &codebook, &blocks)?;
        let packed = codebook.pack(&blocks)?;
        let packed_path = layout.packed_file(component, kind);
        fs::write(&packed_path, &packed).with_context(|| format!("writing {:?}", packed_path))?;

        info!(
            component = %component,
            kind = %kind,
            unique = codebook.len(),
            packed_bytes = packed.len(),
            "wrote Huffman outputs"
        );
        summaries.push(HuffmanSummary {
            component,
            kind,
            codebook,
            packed_bytes: packed.len(),
        });
    }
    Ok(summaries)
}

/// Code-length statistics of every codebook file present under the layout.
pub fn codebook_statistics(
    layout: &OutputLayout,
) -> anyhow::Result<Vec<(Component, EncodingKind, CodeLengthStats)>> {
    let mut stats = Vec::new();
    for component in Component::ALL {
        for kind in EncodingKind::ALL {
            let path = layout.codes_file(component, kind);
            if !path.exists() {
                warn!(path = ?path, "codebook missing, statistics omitted");
                continue;
            }
            if let Some(s) = read_codebook(&path)?.length_stats() {
                stats.push((component, kind, s));
            }
        }
    }
    Ok(stats)
}

/// Assemble and write `<c>_encoded.bin` for one component.
pub fn write_bitstream(
    layout: &OutputLayout,
    streams: &ChannelStreams,
) -> anyhow::Result<BitstreamSummary> {
    let component = streams.component;
    let bytes = assemble(component, streams.first_delta(), streams.rle.values())
        .with_context(|| format!("assembling bitstream for {}", component))?;
    let path = layout.bitstream_file(component);
    let mut out = create(&path)?;
    out.write_all(&bytes)?;
    out.flush()?;

    let summary = BitstreamSummary {
        component,
        path,
        bytes: bytes.len(),
        checksum: xxh3_64(&bytes),
    };
    info!(
        component = %component,
        bytes = summary.bytes,
        checksum = %format!("{:016x}", summary.checksum),
        "wrote bitstream"
    );
    Ok(summary)
}
