//! Integration tests for the `sismo` binary.
//!
//! Each test generates its own synthetic miniSEED file and points `--config`
//! at an empty settings file so the user's config directory is never read.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// The `sismo` binary built by cargo, reading settings from `config`.
fn sismo_with_config(config: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sismo"));
    cmd.arg("--config").arg(config).env_remove("RUST_LOG");
    cmd
}

/// The `sismo` binary with an empty settings file in `dir`.
fn sismo_bin(dir: &Path) -> Command {
    let config = dir.join("settings.toml");
    if !config.exists() {
        std::fs::write(&config, "").unwrap();
    }
    sismo_with_config(&config)
}

fn run(cmd: &mut Command) -> Output {
    let output = cmd.output().expect("failed to run sismo");
    assert!(
        output.status.success(),
        "sismo failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

/// 10 s of a 5 Hz sine at 100 Hz, as in the classic pitch-2 scenario.
fn generate(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    run(sismo_bin(dir).arg("generate").arg(&path));
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// generate / info
// ---------------------------------------------------------------------------

#[test]
fn info_lists_generated_trace() {
    let dir = TempDir::new().unwrap();
    let input = generate(dir.path(), "quake.mseed");

    let out = stdout(&run(sismo_bin(dir.path()).arg("info").arg(&input)));
    assert!(out.contains("Traces: 1"), "{out}");
    assert!(out.contains("XX.SYN..HHZ"), "{out}");
    assert!(out.contains("1000 samples"), "{out}");
    assert!(out.contains("100 Hz"), "{out}");
    assert!(out.contains("2000-01-01T00:00:00"), "{out}");
}

#[test]
fn generate_float64_with_custom_id() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("float.mseed");
    run(sismo_bin(dir.path())
        .args(["generate", "--encoding", "float64", "--source-id", "IU.ANMO.00.BHZ"])
        .args(["--sample-rate", "20", "--duration", "30"])
        .arg(&path));

    let out = stdout(&run(sismo_bin(dir.path()).arg("info").arg(&path)));
    assert!(out.contains("IU.ANMO.00.BHZ"), "{out}");
    assert!(out.contains("600 samples"), "{out}");
}

// ---------------------------------------------------------------------------
// plot
// ---------------------------------------------------------------------------

#[test]
fn plot_json_payload() {
    let dir = TempDir::new().unwrap();
    let input = generate(dir.path(), "quake.mseed");

    let output = run(sismo_bin(dir.path())
        .args(["plot", "--json", "--low-cutoff", "1", "--high-cutoff", "10"])
        .arg(&input));
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(payload["filename"], "quake.mseed");
    let png = STANDARD.decode(payload["plot"].as_str().unwrap()).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    assert!(!dir.path().join("quake.png").exists());
}

#[test]
fn plot_writes_png_next_to_input() {
    let dir = TempDir::new().unwrap();
    let input = generate(dir.path(), "quake.mseed");

    let out = stdout(&run(sismo_bin(dir.path()).arg("plot").arg(&input)));
    let png_path = dir.path().join("quake.png");
    assert!(out.contains("quake.png"), "{out}");
    let png = std::fs::read(png_path).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn plot_rejects_cutoff_above_nyquist() {
    let dir = TempDir::new().unwrap();
    let input = generate(dir.path(), "quake.mseed");

    let output = sismo_bin(dir.path())
        .args(["plot", "--high-cutoff", "60"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.to_lowercase().contains("nyquist"), "{stderr}");
}

#[test]
fn settings_file_drives_render_size() {
    let dir = TempDir::new().unwrap();
    let input = generate(dir.path(), "quake.mseed");
    let config = dir.path().join("small.toml");
    std::fs::write(&config, "[render]\nwidth = 400\nheight = 300\n").unwrap();

    let out_png = dir.path().join("small.png");
    run(sismo_with_config(&config)
        .arg("plot")
        .arg(&input)
        .arg("-o")
        .arg(&out_png));

    let png = std::fs::read(out_png).unwrap();
    // IHDR width and height, big-endian, right after the chunk type.
    assert_eq!(u32::from_be_bytes(png[16..20].try_into().unwrap()), 400);
    assert_eq!(u32::from_be_bytes(png[20..24].try_into().unwrap()), 300);
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

#[test]
fn convert_pitch_two() {
    let dir = TempDir::new().unwrap();
    let input = generate(dir.path(), "quake.mseed");
    let out_dir = dir.path().join("audio");

    let out = stdout(&run(sismo_bin(dir.path())
        .args(["convert", "--pitch", "2", "--output-dir"])
        .arg(&out_dir)
        .arg(&input)));
    assert!(out.contains("quake_pitch_2.wav"), "{out}");

    let audio = sismo_io::read_pcm16_wav(out_dir.join("quake_pitch_2.wav")).unwrap();
    assert_eq!(audio.sample_rate_hz, 200);
    assert_eq!(audio.len(), 1000);
    assert_eq!(audio.peak(), 32767);
}

#[test]
fn convert_high_pass_residual_still_renders() {
    let dir = TempDir::new().unwrap();
    let input = generate(dir.path(), "quake.mseed");

    run(sismo_bin(dir.path())
        .args(["convert", "--low-cutoff", "20"])
        .arg(&input));
    let audio = sismo_io::read_pcm16_wav(dir.path().join("quake_pitch_1.wav")).unwrap();
    assert_eq!(audio.sample_rate_hz, 100);
    assert_eq!(audio.peak(), 32767);
}

#[test]
fn convert_rejects_zero_pitch() {
    let dir = TempDir::new().unwrap();
    let input = generate(dir.path(), "quake.mseed");

    let output = sismo_bin(dir.path())
        .args(["convert", "--pitch", "0"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("pitch_factor"));
    assert!(!dir.path().join("quake_pitch_0.wav").exists());
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let output = sismo_bin(dir.path())
        .args(["convert"])
        .arg(dir.path().join("nope.mseed"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.mseed"));
}
