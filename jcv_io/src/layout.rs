use std::path::{Path, PathBuf};

use jcv_core::{Component, EncodingKind, Stage};

/// Directory convention shared with the hardware test bench.
///
/// ```text
/// <root>/<c>_block_<i>.txt              level-shifted sample blocks, 64 lines
/// <root>/RLE/<C>_<i>.txt                "<run> <value>" per line
/// <root>/Delta/<C>_<i>.txt              single DC difference
/// <root>/<DCT|Quant|Zigzag>/<C>_<i>.txt hardware stage dumps
/// <root>/huffman/<C>_<kind>_codes.txt   written: "<symbol> <codeword>"
/// <root>/huffman/<C>_<kind>_data.txt    written: one line per block
/// <root>/huffman/<C>_<kind>_packed.bin  written: packed codewords
/// <root>/bitstream/<c>_encoded.bin      written: channel record
/// ```
///
/// `<C>` is `Y`, `Cb` or `Cr`; `<c>` is its lowercase form.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sample_block(&self, component: Component, index: usize) -> PathBuf {
        self.root
            .join(format!("{}_block_{}.txt", component.file_stem(), index))
    }

    pub fn stream_dir(&self, kind: EncodingKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    pub fn stream_file(&self, kind: EncodingKind, component: Component, index: usize) -> PathBuf {
        self.stream_dir(kind)
            .join(format!("{}_{}.txt", component.name(), index))
    }

    pub fn stage_file(&self, stage: Stage, component: Component, index: usize) -> PathBuf {
        self.root
            .join(stage.dir_name())
            .join(format!("{}_{}.txt", component.name(), index))
    }

    pub fn huffman_dir(&self) -> PathBuf {
        self.root.join("huffman")
    }

    fn huffman_file(&self, component: Component, kind: EncodingKind, suffix: &str) -> PathBuf {
        self.huffman_dir()
            .join(format!("{}_{}_{}", component.name(), kind.file_tag(), suffix))
    }

    pub fn codes_file(&self, component: Component, kind: EncodingKind) -> PathBuf {
        self.huffman_file(component, kind, "codes.txt")
    }

    pub fn data_file(&self, component: Component, kind: EncodingKind) -> PathBuf {
        self.huffman_file(component, kind, "data.txt")
    }

    pub fn packed_file(&self, component: Component, kind: EncodingKind) -> PathBuf {
        self.huffman_file(component, kind, "packed.bin")
    }

    pub fn bitstream_dir(&self) -> PathBuf {
        self.root.join("bitstream")
    }

    pub fn bitstream_file(&self, component: Component) -> PathBuf {
        self.bitstream_dir()
            .join(format!("{}_encoded.bin", component.file_stem()))
    }
}
