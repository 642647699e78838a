//! Runs the `jcv` binary against temporary dump directories and checks its
//! output and exit codes (0 success, 1 failed comparison, 2 error).

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use jcv_core::{Block, Component, EncodingKind, PipelineConfig, Stage, Verifier};
use jcv_io::OutputLayout;

// ── helpers ───────────────────────────────────────────────────────────────

fn jcv(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jcv"))
        .args(args)
        .output()
        .expect("failed to run jcv")
}

fn stdout_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn sample_values(offset: i64) -> Vec<i64> {
    (0..64).map(|k| (k * 7 + offset) % 200 - 100).collect()
}

/// Sample block plus hardware dumps that agree with the reference.
fn write_matching_block(layout: &OutputLayout, component: Component, index: usize) {
    let values = sample_values(index as i64);
    let text: String = values.iter().map(|v| format!("{}\n", v)).collect();
    write(&layout.sample_block(component, index), &text);

    let verifier = Verifier::new(&PipelineConfig::default()).unwrap();
    let r = verifier.reference(component, &Block::from_slice(&values).unwrap());
    let join = |values: Vec<String>| values.join(" ");
    write(
        &layout.stage_file(Stage::Dct, component, index),
        &join(r.dct.iter().map(|v| (v * 10_000).to_string()).collect()),
    );
    write(
        &layout.stage_file(Stage::Quant, component, index),
        &join(r.quant.iter().map(|v| (v as f64 / 1e4).to_string()).collect()),
    );
    write(
        &layout.stage_file(Stage::Zigzag, component, index),
        &join(r.zigzag.as_slice().iter().map(|&v| (v as f64 / 1e4).to_string()).collect()),
    );
}

fn write_streams(layout: &OutputLayout, component: Component) {
    write(&layout.stream_file(EncodingKind::Rle, component, 0), "0 5\n0 0\n");
    write(&layout.stream_file(EncodingKind::Rle, component, 1), "0 0\n");
    write(&layout.stream_file(EncodingKind::Delta, component, 0), "7\n");
    write(&layout.stream_file(EncodingKind::Delta, component, 1), "-2\n");
}

// ── compare ───────────────────────────────────────────────────────────────

#[test]
fn compare_uses_the_stage_default_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let hw = dir.path().join("hw.txt");
    let sw = dir.path().join("sw.txt");
    fs::write(&hw, "10000 20000 30000").unwrap();
    fs::write(&sw, "1\n2\n3\n").unwrap();

    let output = jcv(&["compare", path_str(&hw), path_str(&sw), "--stage", "Y_DCT"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_string(&output).contains("Y_DCT: PASS (max diff 0 < 1000)"));
}

#[test]
fn compare_explicit_threshold_overrides_the_default() {
    let dir = tempfile::tempdir().unwrap();
    let hw = dir.path().join("hw.txt");
    let sw = dir.path().join("sw.txt");
    fs::write(&hw, "1 2 3").unwrap();
    fs::write(&sw, "10000 20000 40000").unwrap();

    // software side rescaled: max diff 1, under the quant default of 2
    let output = jcv(&["compare", path_str(&hw), path_str(&sw), "-s", "Cb_Quant"]);
    assert_eq!(output.status.code(), Some(0));

    let output = jcv(&["compare", path_str(&hw), path_str(&sw), "-s", "Cb_Quant", "-t", "1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_string(&output).contains("Cb_Quant: FAIL"));
}

#[test]
fn compare_threshold_comes_from_the_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let hw = dir.path().join("hw.txt");
    let sw = dir.path().join("sw.txt");
    let config = dir.path().join("jcv.json");
    fs::write(&hw, "10000 20000 30010").unwrap();
    fs::write(&sw, "1 2 3").unwrap();
    fs::write(&config, r#"{ "thresholds": { "dct": 0.0005 } }"#).unwrap();

    let args = ["compare", path_str(&hw), path_str(&sw), "-s", "Y_DCT"];
    assert_eq!(jcv(&args).status.code(), Some(0));

    let mut with_config = vec!["--config", path_str(&config)];
    with_config.extend_from_slice(&args);
    assert_eq!(jcv(&with_config).status.code(), Some(1));
}

#[test]
fn compare_unknown_stage_needs_a_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let hw = dir.path().join("hw.txt");
    let sw = dir.path().join("sw.txt");
    fs::write(&hw, "5 6").unwrap();
    fs::write(&sw, "5 6").unwrap();

    let output = jcv(&["compare", path_str(&hw), path_str(&sw), "-s", "Y_Huffman"]);
    assert_eq!(output.status.code(), Some(2));

    let output = jcv(&["compare", path_str(&hw), path_str(&sw), "-s", "Y_Huffman", "-t", "0.5"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn compare_shape_mismatch_is_a_failed_comparison() {
    let dir = tempfile::tempdir().unwrap();
    let hw = dir.path().join("hw.txt");
    let sw = dir.path().join("sw.txt");
    fs::write(&hw, "1 2 3").unwrap();
    fs::write(&sw, "1 2").unwrap();

    let output = jcv(&["compare", path_str(&hw), path_str(&sw), "-s", "Cr_Zigzag"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_string(&output).contains("Cr_Zigzag: ERROR"));
}

// ── verify ────────────────────────────────────────────────────────────────

#[test]
fn verify_exit_code_follows_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    write_matching_block(&layout, Component::Y, 0);
    write_matching_block(&layout, Component::Cb, 0);
    let report = dir.path().join("report.json");

    let output = jcv(&["verify", "-o", path_str(dir.path()), "--json", path_str(&report)]);
    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    let stages = json["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 6);
    assert!(stages.iter().all(|s| s["outcome"]["status"] == "pass"));
    assert_eq!(stages[3]["stage"], "Cb_DCT");

    write(&layout.stage_file(Stage::Zigzag, Component::Cb, 0), "1 2 3");
    let output = jcv(&["verify", "-o", path_str(dir.path())]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_string(&output).contains("Cb_Zigzag: ERROR"));
    assert!(stdout_string(&output).contains("Y_Zigzag: PASS"));
}

#[test]
fn verify_keeps_going_past_an_unreadable_channel() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    write(&layout.sample_block(Component::Y, 0), "not a block");
    write_matching_block(&layout, Component::Cr, 0);

    let output = jcv(&["verify", "-o", path_str(dir.path())]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout_string(&output);
    assert!(stdout.contains("Cr_DCT: PASS"));
    assert!(stdout.contains("Cr_Zigzag: PASS"));
}

// ── encode / inspect ──────────────────────────────────────────────────────

#[test]
fn encode_reports_the_compression_ratio() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    write_matching_block(&layout, Component::Y, 0);
    write_matching_block(&layout, Component::Y, 1);
    write_streams(&layout, Component::Y);

    let output = jcv(&["encode", "-o", path_str(dir.path())]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_string(&output);
    // 2 blocks × 64 samples over 1 tag + 2 DC + 3 × 3 AC bytes
    assert!(stdout.contains("original size   : 128 B"));
    assert!(stdout.contains("compressed size : 12 B"));
    assert!(stdout.contains("ratio           : 10.67:1"));
    assert!(stdout.contains("Y RLE: 2 unique codes"));
    assert!(!layout.bitstream_file(Component::Cb).exists());

    let output = jcv(&["inspect", path_str(&layout.bitstream_file(Component::Y))]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_string(&output);
    assert!(stdout.contains("dc delta   : 7"));
    assert!(stdout.contains("ac entries : 3"));
}

#[test]
fn encode_keeps_going_past_a_malformed_channel() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    write(&layout.stream_file(EncodingKind::Rle, Component::Y, 0), "0 x\n");
    write_streams(&layout, Component::Cb);
    write_streams(&layout, Component::Cr);

    let output = jcv(&["encode", "-o", path_str(dir.path())]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!layout.bitstream_file(Component::Y).exists());
    assert!(layout.bitstream_file(Component::Cb).exists());
    assert!(layout.bitstream_file(Component::Cr).exists());
    assert!(layout.codes_file(Component::Cr, EncodingKind::Delta).exists());
}

#[test]
fn inspect_rejects_a_malformed_bitstream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("y_encoded.bin");
    fs::write(&path, [b'Y', 0]).unwrap();
    assert_eq!(jcv(&["inspect", path_str(&path)]).status.code(), Some(2));
}
