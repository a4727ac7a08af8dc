/// report/svg.rs — SVG rendering of curves and PCA scatters
///
/// Plain vector output: a white canvas, two axes on the unit square, and
/// one polyline per curve. The ROC chart also draws the chance diagonal.
/// Scatters are rescaled to their own bounding box first.
use std::path::Path;

use svg::node::element::path::Data;
use svg::node::element::{Circle, Line, Path as SvgPath, Rectangle};
use svg::Document;

use super::{PlotSink, ScatterGroup};
use crate::error::{ClfError, Result};
use crate::eval::curves::{PrCurve, RocCurve};

const WIDTH: f32 = 480.0;
const HEIGHT: f32 = 480.0;
const MARGIN: f32 = 40.0;
const DOT_RADIUS: f32 = 3.0;

/// Cycled when a chart carries more curves than colours.
const PALETTE: [&str; 6] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b"];

#[derive(Debug, Clone, Default)]
pub struct SvgPlotter;

impl SvgPlotter {
    pub fn new() -> Self {
        Self
    }

    /// Map a point of the unit square onto the canvas (y grows downwards).
    fn project(x: f64, y: f64) -> (f32, f32) {
        let span_x = WIDTH - 2.0 * MARGIN;
        let span_y = HEIGHT - 2.0 * MARGIN;
        (
            MARGIN + x.clamp(0.0, 1.0) as f32 * span_x,
            HEIGHT - MARGIN - y.clamp(0.0, 1.0) as f32 * span_y,
        )
    }

    fn canvas(title: &str) -> Document {
        let background = Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", WIDTH)
            .set("height", HEIGHT)
            .set("fill", "white");

        let x_axis = Line::new()
            .set("x1", MARGIN)
            .set("y1", HEIGHT - MARGIN)
            .set("x2", WIDTH - MARGIN)
            .set("y2", HEIGHT - MARGIN)
            .set("stroke", "black");
        let y_axis = Line::new()
            .set("x1", MARGIN)
            .set("y1", MARGIN)
            .set("x2", MARGIN)
            .set("y2", HEIGHT - MARGIN)
            .set("stroke", "black");

        Document::new()
            .set("viewBox", format!("0 0 {WIDTH} {HEIGHT}"))
            .set("width", WIDTH)
            .set("height", HEIGHT)
            .set("aria-label", title)
            .add(background)
            .add(x_axis)
            .add(y_axis)
    }

    fn polyline(xs: &[f64], ys: &[f64], colour: &str, label: &str) -> Option<SvgPath> {
        let mut points = xs.iter().zip(ys).map(|(&x, &y)| Self::project(x, y));
        let mut data = Data::new().move_to(points.next()?);
        for point in points {
            data = data.line_to(point);
        }
        Some(
            SvgPath::new()
                .set("d", data)
                .set("fill", "none")
                .set("stroke", colour)
                .set("stroke-width", 2)
                .set("data-label", label),
        )
    }

    /// Per-axis (min, span) over every point of every group. A flat axis
    /// gets span 0 and its points land mid-axis.
    fn bounds(groups: &[ScatterGroup]) -> [(f64, f64); 2] {
        let mut lo = [f64::INFINITY; 2];
        let mut hi = [f64::NEG_INFINITY; 2];
        for &(x, y) in groups.iter().flat_map(|g| &g.points) {
            for (axis, v) in [x, y].into_iter().enumerate() {
                lo[axis] = lo[axis].min(v);
                hi[axis] = hi[axis].max(v);
            }
        }
        [0, 1].map(|axis| {
            if lo[axis].is_finite() && hi[axis].is_finite() {
                (lo[axis], hi[axis] - lo[axis])
            } else {
                (0.0, 0.0)
            }
        })
    }

    fn rescale(v: f64, (min, span): (f64, f64)) -> f64 {
        if span > 0.0 {
            (v - min) / span
        } else {
            0.5
        }
    }

    fn save(path: &Path, document: &Document) -> Result<()> {
        svg::save(path, document).map_err(|e| ClfError::Plot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl PlotSink for SvgPlotter {
    fn plot_roc(&self, curves: &[RocCurve], title: &str, path: &Path) -> Result<()> {
        let (x0, y0) = Self::project(0.0, 0.0);
        let (x1, y1) = Self::project(1.0, 1.0);
        let chance = Line::new()
            .set("x1", x0)
            .set("y1", y0)
            .set("x2", x1)
            .set("y2", y1)
            .set("stroke", "grey")
            .set("stroke-dasharray", "6 4");

        let mut document = Self::canvas(title).add(chance);
        for (i, curve) in curves.iter().enumerate() {
            let label = format!("{} (area = {:.2})", curve.label, curve.auc);
            if let Some(line) = Self::polyline(&curve.fpr, &curve.tpr, PALETTE[i % PALETTE.len()], &label) {
                document = document.add(line);
            }
        }
        Self::save(path, &document)
    }

    fn plot_precision_recall(&self, curve: &PrCurve, title: &str, path: &Path) -> Result<()> {
        let label = format!("AP = {:.2}", curve.average_precision);
        let mut document = Self::canvas(title);
        if let Some(line) = Self::polyline(&curve.recall, &curve.precision, PALETTE[0], &label) {
            document = document.add(line);
        }
        Self::save(path, &document)
    }

    fn plot_scatter(&self, groups: &[ScatterGroup], title: &str, path: &Path) -> Result<()> {
        let [bx, by] = Self::bounds(groups);
        let mut document = Self::canvas(title);
        for (i, group) in groups.iter().enumerate() {
            let colour = PALETTE[i % PALETTE.len()];
            let label = format!("{} (n = {})", group.label, group.points.len());
            for &(x, y) in &group.points {
                let (cx, cy) = Self::project(Self::rescale(x, bx), Self::rescale(y, by));
                let dot = Circle::new()
                    .set("cx", cx)
                    .set("cy", cy)
                    .set("r", DOT_RADIUS)
                    .set("fill", colour)
                    .set("fill-opacity", 0.7)
                    .set("data-label", label.as_str());
                document = document.add(dot);
            }
        }
        Self::save(path, &document)
    }
}
