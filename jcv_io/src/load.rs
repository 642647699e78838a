use std::fs;
use std::io;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

use jcv_core::compare::parse_numeric_dump;
use jcv_core::{
    Block, ChannelStreams, Component, DumpSource, EncodingKind, Error, RunLengthPair, Stage,
};

use crate::layout::OutputLayout;

// ── Parsers ────────────────────────────────────────────────────────────────

fn parse_int(tok: &str, line: usize) -> anyhow::Result<i64> {
    tok.parse::<i64>()
        .with_context(|| format!("line {}: {:?} is not an integer", line, tok))
}

/// 64 whitespace-separated integers, row-major.
pub fn parse_block_text(text: &str) -> anyhow::Result<Block> {
    let values = text
        .split_whitespace()
        .enumerate()
        .map(|(i, tok)| parse_int(tok, i + 1))
        .collect::<anyhow::Result<Vec<i64>>>()?;
    Ok(Block::from_slice(&values)?)
}

/// One `<run> <value>` pair per non-empty line.
pub fn parse_rle_text(text: &str) -> anyhow::Result<Vec<RunLengthPair>> {
    let mut pairs = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let mut toks = line.split_whitespace();
        match (toks.next(), toks.next(), toks.next()) {
            (None, _, _) => continue,
            (Some(run), Some(value), None) => {
                pairs.push(RunLengthPair::new(parse_int(run, i + 1)?, parse_int(value, i + 1)?));
            }
            _ => anyhow::bail!("line {}: expected \"<run-length> <value>\", got {:?}", i + 1, line),
        }
    }
    Ok(pairs)
}

/// A single integer on the first non-empty line.
pub fn parse_delta_text(text: &str) -> anyhow::Result<i64> {
    let (i, line) = text
        .lines()
        .enumerate()
        .find(|(_, l)| !l.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("empty delta dump"))?;
    parse_int(line.trim(), i + 1)
}

// ── Sample blocks ──────────────────────────────────────────────────────────

pub fn load_sample_block(path: impl AsRef<Path>) -> anyhow::Result<Block> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("reading block {:?}", path))?;
    parse_block_text(&text).with_context(|| format!("parsing block {:?}", path))
}

/// Load `<c>_block_0.txt`, `<c>_block_1.txt`, ... up to the first gap.
pub fn load_sample_blocks(
    layout: &OutputLayout,
    component: Component,
) -> anyhow::Result<Vec<Block>> {
    let mut blocks = Vec::new();
    loop {
        let path = layout.sample_block(component, blocks.len());
        if !path.exists() {
            break;
        }
        blocks.push(load_sample_block(&path)?);
    }
    debug!(component = %component, blocks = blocks.len(), "loaded sample blocks");
    Ok(blocks)
}

// ── Symbol streams ─────────────────────────────────────────────────────────

/// Block index of a `<C>_<i>.txt` file belonging to `component`.
fn block_index(file_name: &str, component: Component) -> Option<usize> {
    let stem = file_name.strip_suffix(".txt")?;
    let (name, index) = stem.split_once('_')?;
    if name.parse::<Component>().ok()? != component {
        return None;
    }
    index.parse().ok()
}

/// Files of one kind for one component, sorted by block index.
fn stream_files(
    layout: &OutputLayout,
    kind: EncodingKind,
    component: Component,
) -> anyhow::Result<Vec<(usize, String)>> {
    let dir = layout.stream_dir(kind);
    if !dir.is_dir() {
        warn!(dir = ?dir, "no {} dumps found", kind);
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("listing {:?}", dir))? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(index) = block_index(&name, component) {
            let text = fs::read_to_string(entry.path())
                .with_context(|| format!("reading {:?}", entry.path()))?;
            files.push((index, text));
        }
    }
    files.sort_by_key(|(index, _)| *index);
    Ok(files)
}

/// Load both symbol streams of one component, keyed by block index.
///
/// A missing `RLE` or `Delta` directory leaves that stream empty. Gaps in the
/// block numbering are kept as gaps and logged.
pub fn load_channel_streams(
    layout: &OutputLayout,
    component: Component,
) -> anyhow::Result<ChannelStreams> {
    let mut streams = ChannelStreams::new(component);
    for (index, text) in stream_files(layout, EncodingKind::Rle, component)? {
        let pairs = parse_rle_text(&text)
            .with_context(|| format!("RLE block {} of {}", index, component))?;
        if streams.rle.insert(index, pairs).is_some() {
            warn!(
                component = %component,
                block = index,
                "duplicate RLE dump, keeping the last one"
            );
        }
    }
    for (index, text) in stream_files(layout, EncodingKind::Delta, component)? {
        let delta = parse_delta_text(&text)
            .with_context(|| format!("Delta block {} of {}", index, component))?;
        if streams.delta.insert(index, delta).is_some() {
            warn!(
                component = %component,
                block = index,
                "duplicate Delta dump, keeping the last one"
            );
        }
    }
    for kind in EncodingKind::ALL {
        let missing = streams.missing_blocks(kind);
        if !missing.is_empty() {
            warn!(component = %component, kind = %kind, ?missing, "gaps in block numbering");
        }
    }
    debug!(
        component = %component,
        rle_blocks = streams.rle.len(),
        delta_blocks = streams.delta.len(),
        "loaded symbol streams"
    );
    Ok(streams)
}

// ── Hardware stage dumps ───────────────────────────────────────────────────

/// [`DumpSource`] over the `<DCT|Quant|Zigzag>/<C>_<i>.txt` files of a layout.
#[derive(Debug, Clone)]
pub struct DirDumpSource {
    layout: OutputLayout,
}

impl DirDumpSource {
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout }
    }
}

impl DumpSource for DirDumpSource {
    fn stage_dump(
        &self,
        component: Component,
        stage: Stage,
        block: usize,
    ) -> jcv_core::Result<Vec<f64>> {
        let path = self.layout.stage_file(stage, component, block);
        let text = fs::read_to_string(&path).map_err(|e| {
            Error::Io(io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
        })?;
        parse_numeric_dump(&text).map_err(|e| match e {
            Error::Parse(msg) => Error::parse(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rle_text_skips_blank_lines() {
        let pairs = parse_rle_text("0 12\n\n3 -4\n").unwrap();
        assert_eq!(pairs, vec![RunLengthPair::new(0, 12), RunLengthPair::new(3, -4)]);
    }

    #[test]
    fn rle_text_rejects_odd_lines() {
        assert!(parse_rle_text("0 12 5\n").is_err());
        assert!(parse_rle_text("7\n").is_err());
        assert!(parse_rle_text("a b\n").is_err());
    }

    #[test]
    fn delta_text_reads_first_value() {
        assert_eq!(parse_delta_text("\n -17 \n").unwrap(), -17);
        assert!(parse_delta_text("  \n").is_err());
    }

    #[test]
    fn block_text_needs_64_values() {
        let text: String = (0..64).map(|v| format!("{}\n", v - 32)).collect();
        let block = parse_block_text(&text).unwrap();
        assert_eq!(block[(0, 0)], -32);
        assert_eq!(block[(7, 7)], 31);
        assert!(parse_block_text("1 2 3").is_err());
    }

    #[test]
    fn stage_dump_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        let source = DirDumpSource::new(layout.clone());

        let missing = source.stage_dump(Component::Cr, Stage::Dct, 4).unwrap_err();
        let expected = layout.stage_file(Stage::Dct, Component::Cr, 4);
        assert!(matches!(missing, Error::Io(_)));
        assert!(missing.to_string().contains(&expected.display().to_string()));

        let bad = layout.stage_file(Stage::Zigzag, Component::Y, 0);
        fs::create_dir_all(bad.parent().unwrap()).unwrap();
        fs::write(&bad, "1 2 nan?").unwrap();
        let err = source.stage_dump(Component::Y, Stage::Zigzag, 0).unwrap_err();
        assert!(err.to_string().contains(&bad.display().to_string()));
        assert!(err.to_string().contains("nan?"));
    }

    #[test]
    fn block_index_filters_by_component() {
        assert_eq!(block_index("Cb_12.txt", Component::Cb), Some(12));
        assert_eq!(block_index("Cr_12.txt", Component::Cb), None);
        assert_eq!(block_index("Y_x.txt", Component::Y), None);
        assert_eq!(block_index("Y_3.bin", Component::Y), None);
    }
}
