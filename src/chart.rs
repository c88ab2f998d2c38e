use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use log::debug;
use plotters::prelude::*;
use plotters::style::register_font;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::models::market::PriceSample;

const CHART_SIZE: (u32, u32) = (640, 360);
const MAX_X_LABELS: usize = 12;
const FONT_FAMILY: &str = "sans-serif";
const FONT_BYTES: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

static FONT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

fn chart_err<E: std::fmt::Display>(err: E) -> Error {
    Error::ChartError(err.to_string())
}

/// Registers the embedded font with plotters once per process.
fn ensure_font() -> Result<()> {
    FONT.get_or_init(|| {
        register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES)
            .map_err(|_| "embedded chart font could not be loaded".to_string())
    })
    .clone()
    .map_err(Error::ChartError)
}

/// Y-axis bounds with a little headroom. A flat series gets a band around it.
fn price_range(samples: &[PriceSample]) -> (f64, f64) {
    let min = samples.iter().map(|s| s.price).fold(f64::INFINITY, f64::min);
    let max = samples.iter().map(|s| s.price).fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let pad = if span > f64::EPSILON {
        span * 0.05
    } else {
        (max.abs() * 0.05).max(1e-9)
    };
    (min - pad, max + pad)
}

/// Time label shown under sample `x`, or nothing between samples.
fn sample_label(samples: &[PriceSample], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    samples
        .get(index as usize)
        .map(|s| s.label.clone())
        .unwrap_or_default()
}

/// Renders `samples` in insertion order as a PNG line chart with a marker at
/// each sample, time labels on the x axis and USD prices on the y axis.
pub fn render_price_chart(address: &str, samples: &[PriceSample]) -> Result<Vec<u8>> {
    if samples.is_empty() {
        return Err(Error::ChartError(format!("no samples recorded for {}", address)));
    }
    ensure_font()?;

    let (width, height) = CHART_SIZE;
    let mut pixels = vec![0u8; (width * height * 3) as usize];
    draw_chart(&mut pixels, address, samples)?;

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&pixels, width, height, ColorType::Rgb8)
        .map_err(chart_err)?;

    debug!("Rendered chart for {} ({} samples, {} bytes)", address, samples.len(), png.len());
    Ok(png)
}

fn draw_chart(pixels: &mut [u8], address: &str, samples: &[PriceSample]) -> Result<()> {
    let root = BitMapBackend::with_buffer(pixels, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let last = (samples.len() - 1) as f64;
    let (y_min, y_max) = price_range(samples);

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Price chart: {}", address), (FONT_FAMILY, 16))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..last + 0.5, y_min..y_max)
        .map_err(chart_err)?;

    let x_label = |x: &f64| sample_label(samples, *x);
    let y_label = |y: &f64| format!("{:.6}", y);

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Price (USD)")
        .x_labels(samples.len().min(MAX_X_LABELS))
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .label_style((FONT_FAMILY, 11))
        .draw()
        .map_err(chart_err)?;

    let points: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .map(|(i, s)| (i as f64, s.price))
        .collect();

    chart
        .draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(2)))
        .map_err(chart_err)?;
    chart
        .draw_series(points.iter().map(|&point| Circle::new(point, 3, BLUE.filled())))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}
