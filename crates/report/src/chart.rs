//! Log-log response spectrum chart

use crate::summary::format_value;
use crate::ReportError;
use ab_glyph::{FontRef, PxScale};
use data_validator::ChartBounds;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use inference_engine::SpectrumPoint;
use std::io::Cursor;
use tracing::debug;

/// Horizontal axis range (s)
pub const CHART_PERIOD_RANGE: (f64, f64) = (0.03, 2.0);

/// Default image size (px), an 8x2 inch figure at 100 dpi
pub const DEFAULT_CHART_SIZE: (u32, u32) = (800, 200);

pub const X_AXIS_TITLE: &str = "T (s)";
pub const Y_AXIS_TITLE: &str = "PSA (cm/s^2)";

const MARGIN_LEFT: u32 = 56;
const MARGIN_RIGHT: u32 = 16;
const MARGIN_TOP: u32 = 20;
const MARGIN_BOTTOM: u32 = 36;

const FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
const LABEL_SCALE: f32 = 12.0;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const MAJOR_GRID: Rgb<u8> = Rgb([176, 176, 176]);
const MINOR_GRID: Rgb<u8> = Rgb([226, 226, 226]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);

/// Renders PSA against period on log-log axes
#[derive(Clone)]
pub struct SpectrumChart {
    width: u32,
    height: u32,
    font: FontRef<'static>,
}

impl std::fmt::Debug for SpectrumChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumChart")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl SpectrumChart {
    pub fn new(width: u32, height: u32) -> Result<Self, ReportError> {
        if width <= MARGIN_LEFT + MARGIN_RIGHT + 10 || height <= MARGIN_TOP + MARGIN_BOTTOM + 10 {
            return Err(ReportError::ChartTooSmall { width, height });
        }
        let font = FontRef::try_from_slice(FONT_BYTES)
            .map_err(|e| ReportError::Font(e.to_string()))?;
        Ok(Self {
            width,
            height,
            font,
        })
    }

    /// Chart at [`DEFAULT_CHART_SIZE`]
    pub fn with_default_size() -> Result<Self, ReportError> {
        Self::new(DEFAULT_CHART_SIZE.0, DEFAULT_CHART_SIZE.1)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Plot area as (left, top, right, bottom) pixel edges
    fn plot_area(&self) -> (f32, f32, f32, f32) {
        (
            MARGIN_LEFT as f32,
            MARGIN_TOP as f32,
            (self.width - MARGIN_RIGHT) as f32,
            (self.height - MARGIN_BOTTOM) as f32,
        )
    }

    /// Map a point in log10 space to pixels
    fn to_pixel(&self, log_x: f64, log_y: f64, bounds: &ChartBounds) -> (f32, f32) {
        let (left, top, right, bottom) = self.plot_area();
        let (x_lo, x_hi) = log_range(CHART_PERIOD_RANGE.0, CHART_PERIOD_RANGE.1);
        let (y_lo, y_hi) = log_range(bounds.lower, bounds.upper);

        let fx = (log_x - x_lo) / (x_hi - x_lo);
        let fy = (log_y - y_lo) / (y_hi - y_lo);
        (
            left + (fx as f32) * (right - left),
            bottom - (fy as f32) * (bottom - top),
        )
    }

    /// Pixel position of a (period, psa) pair
    pub fn pixel_for(&self, period: f64, psa: f64, bounds: &ChartBounds) -> (f32, f32) {
        self.to_pixel(period.log10(), psa.log10(), bounds)
    }

    /// Draw the chart
    pub fn render(&self, spectrum: &[SpectrumPoint], bounds: &ChartBounds) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.width, self.height, BACKGROUND);
        let (left, top, right, bottom) = self.plot_area();

        // vertical grid over periods
        for (value, major) in log_ticks(CHART_PERIOD_RANGE.0, CHART_PERIOD_RANGE.1) {
            let (x, _) = self.to_pixel(value.log10(), bounds.lower.log10(), bounds);
            let color = if major { MAJOR_GRID } else { MINOR_GRID };
            draw_line_segment_mut(&mut img, (x, top), (x, bottom), color);
        }

        // horizontal grid over PSA
        for (value, major) in log_ticks(bounds.lower, bounds.upper) {
            let (_, y) = self.to_pixel(CHART_PERIOD_RANGE.0.log10(), value.log10(), bounds);
            let color = if major { MAJOR_GRID } else { MINOR_GRID };
            draw_line_segment_mut(&mut img, (left, y), (right, y), color);
        }

        let x_range = log_range(CHART_PERIOD_RANGE.0, CHART_PERIOD_RANGE.1);
        let y_range = log_range(bounds.lower, bounds.upper);
        let points: Vec<(f64, f64)> = spectrum
            .iter()
            .filter(|p| p.period > 0.0 && p.psa > 0.0)
            .map(|p| (p.period.log10(), p.psa.log10()))
            .collect();

        let mut drawn = 0;
        for pair in points.windows(2) {
            if let Some((a, b)) = clip_segment(pair[0], pair[1], x_range, y_range) {
                let start = self.to_pixel(a.0, a.1, bounds);
                let end = self.to_pixel(b.0, b.1, bounds);
                draw_line_segment_mut(&mut img, start, end, INK);
                draw_line_segment_mut(&mut img, (start.0, start.1 + 1.0), (end.0, end.1 + 1.0), INK);
                drawn += 1;
            }
        }

        let frame = Rect::at(left as i32, top as i32)
            .of_size((right - left) as u32 + 1, (bottom - top) as u32 + 1);
        draw_hollow_rect_mut(&mut img, frame, INK);
        self.draw_labels(&mut img, bounds);

        debug!(
            "Rendered spectrum chart {}x{} ({} of {} segments visible)",
            self.width,
            self.height,
            drawn,
            points.len().saturating_sub(1)
        );
        img
    }

    /// Decade tick labels and both axis titles, all inside the margins
    fn draw_labels(&self, img: &mut RgbImage, bounds: &ChartBounds) {
        let (left, top, right, bottom) = self.plot_area();
        let scale = PxScale::from(LABEL_SCALE);

        for (value, major) in log_ticks(CHART_PERIOD_RANGE.0, CHART_PERIOD_RANGE.1) {
            if !major {
                continue;
            }
            let text = decade_label(value);
            let (w, _) = text_size(scale, &self.font, &text);
            let (x, _) = self.to_pixel(value.log10(), bounds.lower.log10(), bounds);
            let x = x as i32 - w as i32 / 2;
            draw_text_mut(img, INK, x, bottom as i32 + 4, scale, &self.font, &text);
        }

        for (value, major) in log_ticks(bounds.lower, bounds.upper) {
            if !major {
                continue;
            }
            let text = decade_label(value);
            let (w, h) = text_size(scale, &self.font, &text);
            let (_, y) = self.to_pixel(CHART_PERIOD_RANGE.0.log10(), value.log10(), bounds);
            let x = left as i32 - 4 - w as i32;
            draw_text_mut(img, INK, x, y as i32 - h as i32 / 2, scale, &self.font, &text);
        }

        let (w, _) = text_size(scale, &self.font, X_AXIS_TITLE);
        let x = ((left + right) / 2.0) as i32 - w as i32 / 2;
        draw_text_mut(img, INK, x, bottom as i32 + 20, scale, &self.font, X_AXIS_TITLE);
        draw_text_mut(img, INK, left as i32, top as i32 - 16, scale, &self.font, Y_AXIS_TITLE);
    }

    /// Draw the chart and encode it as PNG
    pub fn render_png(
        &self,
        spectrum: &[SpectrumPoint],
        bounds: &ChartBounds,
    ) -> Result<Vec<u8>, ReportError> {
        let img = self.render(spectrum, bounds);
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// "0.1", "1", "100" near unity, "1e5" style further out
fn decade_label(value: f64) -> String {
    let exp = value.log10().round() as i32;
    match exp {
        -2..=-1 => format_value(value),
        0..=3 => format!("{:.0}", value),
        _ => format!("1e{}", exp),
    }
}

fn log_range(lo: f64, hi: f64) -> (f64, f64) {
    (lo.log10(), hi.log10())
}

/// Grid values 1..9 x 10^k inside [lo, hi]; `true` marks decades
fn log_ticks(lo: f64, hi: f64) -> Vec<(f64, bool)> {
    let mut ticks = Vec::new();
    let first = lo.log10().floor() as i32;
    let last = hi.log10().ceil() as i32;
    for exp in first..=last {
        for k in 1..=9 {
            // divide for negative exponents so 0.03 comes out exact
            let value = if exp < 0 {
                k as f64 / 10f64.powi(-exp)
            } else {
                k as f64 * 10f64.powi(exp)
            };
            if value >= lo && value <= hi {
                ticks.push((value, k == 1));
            }
        }
    }
    ticks
}

/// Liang-Barsky clip of segment p0-p1 against the box x_range x y_range
fn clip_segment(
    p0: (f64, f64),
    p1: (f64, f64),
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let dx = p1.0 - p0.0;
    let dy = p1.1 - p0.1;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;

    let edges = [
        (-dx, p0.0 - x_range.0),
        (dx, x_range.1 - p0.0),
        (-dy, p0.1 - y_range.0),
        (dy, y_range.1 - p0.1),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        (p0.0 + t0 * dx, p0.1 + t0 * dy),
        (p0.0 + t1 * dx, p0.1 + t1 * dy),
    ))
}
