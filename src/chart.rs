//! Throughput and latency charts for a finished sweep.
//!
//! Series preparation is pure and lives in [`chart_specs`]; drawing sits
//! behind [`ChartRenderer`] so aggregation can be tested without a backend.
//! Failed points are plotted like any other point.

use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::RenderError;
use crate::sweep::SweepResult;

const FONT_FAMILY: &str = "sans-serif";

/// Common TrueType locations probed when no font is configured
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// The two charts produced per sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Throughput,
    Latency,
}

impl ChartKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::Throughput => "throughput.png",
            ChartKind::Latency => "latency.png",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Throughput => "Throughput vs Threads",
            ChartKind::Latency => "Average Latency vs Threads",
        }
    }

    pub fn y_desc(&self) -> &'static str {
        match self {
            ChartKind::Throughput => "QPS (Queries Per Second)",
            ChartKind::Latency => "Latency (ms)",
        }
    }

    fn color(&self) -> RGBColor {
        match self {
            ChartKind::Throughput => RGBColor(0x28, 0xa7, 0x45),
            ChartKind::Latency => RGBColor(0xdc, 0x35, 0x45),
        }
    }
}

/// Chart-ready data for one artifact
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    /// `(thread_count, value)` in sweep order
    pub points: Vec<(u32, f64)>,
    /// Per-point value labels, parallel to `points`
    pub labels: Vec<String>,
}

impl ChartSpec {
    fn new(kind: ChartKind, points: Vec<(u32, f64)>) -> Self {
        let labels = points.iter().map(|(_, y)| format!("{:.1}", y)).collect();
        Self {
            kind,
            points,
            labels,
        }
    }

    /// X range padded around the thread counts
    pub fn x_range(&self) -> Range<f64> {
        let min = self.points.iter().map(|p| p.0).min().unwrap_or(0) as f64;
        let max = self.points.iter().map(|p| p.0).max().unwrap_or(1) as f64;
        let pad = ((max - min) * 0.05).max(0.5);
        (min - pad)..(max + pad)
    }

    /// Y range from zero with headroom for value labels
    pub fn y_range(&self) -> Range<f64> {
        let max = self.points.iter().map(|p| p.1).fold(0.0_f64, f64::max);
        if max > 0.0 {
            0.0..max * 1.15
        } else {
            0.0..1.0
        }
    }
}

/// Throughput and latency specs, in that order
pub fn chart_specs(result: &SweepResult) -> [ChartSpec; 2] {
    [
        ChartSpec::new(ChartKind::Throughput, result.qps_series()),
        ChartSpec::new(ChartKind::Latency, result.latency_series()),
    ]
}

/// Consumes a sweep once it is complete and persists its charts
pub trait ChartRenderer {
    /// Write both charts into `output_dir`, creating it if needed.
    /// Existing artifacts are overwritten. Returns the written paths.
    fn render(&self, result: &SweepResult, output_dir: &Path) -> Result<Vec<PathBuf>, RenderError>;
}

/// PNG charts through plotters' bitmap backend
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    width: u32,
    height: u32,
    text: bool,
}

impl PlottersRenderer {
    /// Renderer with captions and labels when a font can be loaded.
    ///
    /// The font is registered process-wide on first use; later calls reuse it.
    pub fn new(font: Option<&Path>) -> Self {
        let text = *REGISTERED_FONT.get_or_init(|| register_font(font));
        Self {
            width: 1000,
            height: 600,
            text,
        }
    }

    /// Renderer that draws only series and markers
    pub fn without_text() -> Self {
        Self {
            width: 1000,
            height: 600,
            text: false,
        }
    }

    pub fn text_enabled(&self) -> bool {
        self.text
    }

    fn draw(&self, spec: &ChartSpec, path: &Path) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;

        let mut builder = ChartBuilder::on(&root);
        builder.margin(20);
        if self.text {
            builder
                .caption(spec.kind.title(), (FONT_FAMILY, 28))
                .x_label_area_size(50)
                .y_label_area_size(80);
        }
        let mut chart = builder
            .build_cartesian_2d(spec.x_range(), spec.y_range())
            .map_err(drawing)?;

        if self.text {
            chart
                .configure_mesh()
                .x_desc("Threads")
                .y_desc(spec.kind.y_desc())
                .x_label_formatter(&|x| format!("{:.0}", x))
                .draw()
                .map_err(drawing)?;
        }

        let color = spec.kind.color();
        let coords: Vec<(f64, f64)> = spec.points.iter().map(|&(x, y)| (x as f64, y)).collect();

        chart
            .draw_series(LineSeries::new(coords.iter().copied(), color.stroke_width(2)))
            .map_err(drawing)?;

        match spec.kind {
            ChartKind::Throughput => {
                chart
                    .draw_series(coords.iter().map(|&c| Circle::new(c, 5, color.filled())))
                    .map_err(drawing)?;
            }
            ChartKind::Latency => {
                chart
                    .draw_series(coords.iter().map(|&c| {
                        EmptyElement::at(c) + Rectangle::new([(-5, -5), (5, 5)], color.filled())
                    }))
                    .map_err(drawing)?;
            }
        }

        if self.text {
            chart
                .draw_series(coords.iter().zip(&spec.labels).map(|(&c, label)| {
                    EmptyElement::at(c)
                        + Text::new(label.clone(), (-12, -24), (FONT_FAMILY, 15).into_font())
                }))
                .map_err(drawing)?;
        }

        root.present().map_err(drawing)?;
        Ok(())
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render(&self, result: &SweepResult, output_dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
        std::fs::create_dir_all(output_dir)?;

        let mut written = Vec::with_capacity(2);
        for spec in chart_specs(result) {
            let path = output_dir.join(spec.kind.file_name());
            self.draw(&spec, &path)?;
            tracing::debug!("Wrote {}", path.display());
            written.push(path);
        }

        tracing::info!("Plots saved to {}/", output_dir.display());
        Ok(written)
    }
}

fn drawing<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

static REGISTERED_FONT: OnceLock<bool> = OnceLock::new();

/// First readable font among the configured path and the system candidates
pub fn resolve_font(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        tracing::warn!("Chart font {} not found, probing system fonts", path.display());
    }

    FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

fn register_font(configured: Option<&Path>) -> bool {
    let Some(path) = resolve_font(configured) else {
        tracing::warn!("No usable font found, charts will be drawn without text");
        return false;
    };

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Cannot read font {}: {}", path.display(), e);
            return false;
        }
    };

    // plotters keeps a 'static reference for the lifetime of the process
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    match plotters::style::register_font(FONT_FAMILY, plotters::style::FontStyle::Normal, bytes) {
        Ok(()) => {
            tracing::debug!("Registered chart font {}", path.display());
            true
        }
        Err(_) => {
            tracing::warn!("Invalid font {}", path.display());
            false
        }
    }
}
