mod config;
mod layout;
mod load;
mod write;

pub use config::load_config;
pub use layout::OutputLayout;
pub use load::{
    load_channel_streams, load_sample_block, load_sample_blocks, parse_block_text, parse_delta_text,
    parse_rle_text, DirDumpSource,
};
pub use write::{
    codebook_statistics, read_codebook, write_bitstream, write_codebook, write_huffman_data,
    write_huffman_outputs, BitstreamSummary, HuffmanSummary,
};
