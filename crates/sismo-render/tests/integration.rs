//! End-to-end rendering of conditioned traces.

use image::ImageFormat;
use sismo_analysis::{SpectrogramConfig, StftAnalyzer, spectrogram};
use sismo_core::{Conditioning, FilterSpec, Trace};
use sismo_render::{Colormap, Layout, RenderConfig, render, render_image};

fn sine(freq: f64, sr: f64, secs: f64) -> Trace {
    let n = (sr * secs) as usize;
    let samples = (0..n)
        .map(|i| (std::f64::consts::TAU * freq * i as f64 / sr).sin())
        .collect();
    Trace::new(samples, sr).unwrap()
}

fn small_config() -> RenderConfig {
    RenderConfig {
        width: 640,
        height: 480,
        margin: 12,
        panel_gap: 12,
        title_font_px: 12.0,
        label_font_px: 12.0,
        tick_font_px: 12.0,
        ..RenderConfig::default()
    }
}

#[test]
fn png_decodes_with_configured_size() {
    let trace = sine(5.0, 100.0, 10.0);
    let spec = spectrogram(trace.samples(), trace.sampling_rate_hz()).unwrap();
    let png = render(&trace, &spec, &small_config()).unwrap();

    let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
    assert_eq!(decoded.width(), 640);
    assert_eq!(decoded.height(), 480);
}

#[test]
fn default_size_matches_fifteen_by_ten() {
    let trace = sine(1.0, 20.0, 30.0);
    let spec = spectrogram(trace.samples(), 20.0).unwrap();
    let image = render_image(&trace, &spec, &RenderConfig::default()).unwrap();
    assert_eq!(image.dimensions(), (1500, 1000));
}

#[test]
fn plot_path_output_renders() {
    // Detrended and band-passed, as the plot command does it.
    let raw = sine(5.0, 100.0, 10.0);
    let offset = raw.with_samples(raw.samples().iter().map(|s| s + 3.0).collect()).unwrap();
    let conditioned = Conditioning::for_plot(FilterSpec::new(1.0, 10.0)).apply(&offset).unwrap();
    let spec = spectrogram(conditioned.samples(), 100.0).unwrap();
    let png = render(&conditioned, &spec, &small_config()).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn margins_stay_background() {
    let config = small_config();
    let trace = sine(3.0, 50.0, 8.0);
    let spec = spectrogram(trace.samples(), 50.0).unwrap();
    let image = render_image(&trace, &spec, &config).unwrap();

    // Top-right corner is far from every tick and frame.
    assert_eq!(image.get_pixel(config.width - 1, 0).0, config.background);
    assert_eq!(image.get_pixel(config.width - 2, config.height - 2).0, config.background);
}

#[test]
fn panel_titles_sit_above_the_frames() {
    let config = small_config();
    let trace = sine(3.0, 50.0, 8.0);
    let spec = spectrogram(trace.samples(), 50.0).unwrap();
    let image = render_image(&trace, &spec, &config).unwrap();
    let layout = Layout::new(&config).unwrap();

    for panel in [layout.waveform, layout.spectrogram] {
        let title_rows = panel.y - 16..panel.y - 2;
        let ink = title_rows
            .flat_map(|y| (panel.x..panel.right()).map(move |x| (x, y)))
            .filter(|&(x, y)| image.get_pixel(x, y).0 != config.background)
            .count();
        assert!(ink > 20, "title ink {ink}");
    }
}

#[test]
fn bigger_fonts_shrink_the_panels() {
    let small = Layout::new(&small_config()).unwrap();
    let large = Layout::new(&RenderConfig {
        label_font_px: 24.0,
        tick_font_px: 24.0,
        ..small_config()
    })
    .unwrap();
    assert!(large.waveform.x > small.waveform.x);
    assert!(large.waveform.width < small.waveform.width);
    assert!(large.spectrogram.height < small.spectrogram.height);
}

#[test]
fn short_trace_fills_spectrogram_panel() {
    // 50 samples is shorter than one window: a single zero-padded frame.
    let config = small_config();
    let trace = sine(4.0, 100.0, 0.5);
    let spec = spectrogram(trace.samples(), 100.0).unwrap();
    assert_eq!(spec.num_frames(), 1);

    let image = render_image(&trace, &spec, &config).unwrap();
    let panel = Layout::new(&config).unwrap().spectrogram;
    for x in [panel.x, panel.x + panel.width / 2, panel.right() - 1] {
        let pixel = image.get_pixel(x, panel.y + panel.height / 2).0;
        assert_ne!(pixel, config.background);
    }
}

#[test]
fn mesh_hull_leaves_edges_uncovered() {
    // Frame centres start at fft_size / 2 / sr, so the first columns of a long
    // multi-frame spectrogram fall outside the mesh.
    let config = small_config();
    let trace = sine(2.0, 100.0, 20.0);
    let analyzer = StftAnalyzer::new(100.0, SpectrogramConfig::default()).unwrap();
    let spec = analyzer.analyze(trace.samples()).unwrap();
    assert!(spec.num_frames() > 1);

    let image = render_image(&trace, &spec, &config).unwrap();
    let panel = Layout::new(&config).unwrap().spectrogram;
    let centre_row = panel.y + panel.height / 2;
    assert_eq!(image.get_pixel(panel.x, centre_row).0, config.background);
    assert_ne!(image.get_pixel(panel.x + panel.width / 2, centre_row).0, config.background);
}

#[test]
fn colormap_choice_changes_the_image() {
    let trace = sine(5.0, 100.0, 10.0);
    let spec = spectrogram(trace.samples(), 100.0).unwrap();
    let turbo = render_image(&trace, &spec, &small_config()).unwrap();
    let viridis = render_image(
        &trace,
        &spec,
        &RenderConfig {
            colormap: Colormap::Viridis,
            ..small_config()
        },
    )
    .unwrap();
    assert_ne!(turbo, viridis);
}

#[test]
fn render_config_from_toml() {
    let config: RenderConfig = toml::from_str(
        r#"
        width = 800
        colormap = "magma"
        spectrogram_vmax = 2.5
        tick_font_px = 20.0
        "#,
    )
    .unwrap();
    assert_eq!(config.width, 800);
    assert_eq!(config.height, 1000);
    assert_eq!(config.colormap, Colormap::Magma);
    assert_eq!(config.spectrogram_vmax, Some(2.5));
    assert_eq!(config.spectrogram_vmin, -1.0);
    assert_eq!(config.tick_font_px, 20.0);
    assert_eq!(config.label_font_px, 31.0);
}

#[test]
fn degenerate_config_is_a_render_error() {
    let trace = sine(5.0, 100.0, 2.0);
    let spec = spectrogram(trace.samples(), 100.0).unwrap();
    let config = RenderConfig {
        width: 10,
        ..RenderConfig::default()
    };
    let err = render(&trace, &spec, &config).unwrap_err();
    assert!(matches!(err, sismo_render::Error::Render(_)));
}
