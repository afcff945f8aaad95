//! PNG charts for a window: daily average price line and price box plot.
//!
//! Plain raster drawing on an `image` buffer; there are no text labels, the
//! CSV tables carry the numbers.

use anyhow::{Context, Result, bail};
use image::{Rgb, RgbImage};
use std::path::Path;

use crate::analyzers::types::DailyPrice;
use crate::analyzers::utility::{median, quantile, sorted};

pub const DAILY_CHART_FILE: &str = "daily_avg_price.png";
pub const BOX_CHART_FILE: &str = "price_box_oct_nov.png";

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 720;
const MARGIN: u32 = 80;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const SERIES: Rgb<u8> = Rgb([31, 119, 180]);
const MEDIAN: Rgb<u8> = Rgb([255, 127, 14]);

/// Five-number summary used to draw a box, outliers excluded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
}

impl BoxSummary {
    /// Whiskers reach the most extreme values within 1.5 IQR of the box.
    pub fn from_prices(prices: &[f64]) -> Option<Self> {
        let s = sorted(prices);
        let q1 = quantile(&s, 0.25)?;
        let q3 = quantile(&s, 0.75)?;
        let med = median(&s)?;
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let whisker_low = s.iter().copied().find(|v| *v >= lo_fence).unwrap_or(q1);
        let whisker_high = s.iter().rev().copied().find(|v| *v <= hi_fence).unwrap_or(q3);

        Some(Self {
            whisker_low: whisker_low.min(q1),
            q1,
            median: med,
            q3,
            whisker_high: whisker_high.max(q3),
        })
    }
}

/// Maps values onto the vertical pixel range of the plot area.
struct YScale {
    lo: f64,
    hi: f64,
}

impl YScale {
    fn padded(lo: f64, hi: f64) -> Self {
        let span = (hi - lo).abs().max(1.0);
        Self {
            lo: lo - span * 0.05,
            hi: hi + span * 0.05,
        }
    }

    fn px(&self, v: f64) -> i64 {
        let top = MARGIN as f64;
        let bottom = (HEIGHT - MARGIN) as f64;
        let t = (v - self.lo) / (self.hi - self.lo);
        (bottom - t * (bottom - top)).round() as i64
    }
}

fn canvas() -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, WHITE);
    for i in 1..5 {
        let y = (MARGIN + i * (HEIGHT - 2 * MARGIN) / 5) as i64;
        line(&mut img, (MARGIN as i64, y), ((WIDTH - MARGIN) as i64, y), GRID);
    }
    let (left, bottom) = (MARGIN as i64, (HEIGHT - MARGIN) as i64);
    line(&mut img, (left, MARGIN as i64), (left, bottom), AXIS);
    line(&mut img, (left, bottom), ((WIDTH - MARGIN) as i64, bottom), AXIS);
    img
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham line, clipped to the image.
fn line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put(img, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn thick_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    for d in -1..=1 {
        line(img, (from.0, from.1 + d), (to.0, to.1 + d), color);
    }
}

fn rect_outline(img: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
    line(img, (x0, y0), (x1, y0), color);
    line(img, (x1, y0), (x1, y1), color);
    line(img, (x1, y1), (x0, y1), color);
    line(img, (x0, y1), (x0, y0), color);
}

/// Line chart of `avg_price` per day; days without a price are skipped.
pub fn render_daily_chart(daily: &[DailyPrice], path: &Path) -> Result<()> {
    let points: Vec<_> = daily
        .iter()
        .filter_map(|d| d.avg_price.map(|p| (d.date, p)))
        .collect();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        bail!("no priced days to plot");
    };

    let lo = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let hi = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let y = YScale::padded(lo, hi);

    let span_days = (last.0 - first.0).num_days().max(1) as f64;
    let plot_w = (WIDTH - 2 * MARGIN) as f64;
    let x = |date: chrono::NaiveDate| {
        let t = (date - first.0).num_days() as f64 / span_days;
        (MARGIN as f64 + t * plot_w).round() as i64
    };

    let mut img = canvas();
    let pixels: Vec<(i64, i64)> = points.iter().map(|(d, p)| (x(*d), y.px(*p))).collect();
    for pair in pixels.windows(2) {
        thick_line(&mut img, pair[0], pair[1], SERIES);
    }
    if let [only] = pixels.as_slice() {
        thick_line(&mut img, (only.0 - 3, only.1), (only.0 + 3, only.1), SERIES);
    }

    img.save(path)
        .with_context(|| format!("saving chart {}", path.display()))
}

/// Box-and-whisker chart of `prices`, outliers not drawn.
pub fn render_box_chart(prices: &[f64], path: &Path) -> Result<()> {
    let Some(b) = BoxSummary::from_prices(prices) else {
        bail!("no prices to plot");
    };
    let y = YScale::padded(b.whisker_low, b.whisker_high);

    let mut img = canvas();
    let cx = (WIDTH / 2) as i64;
    let half = 120i64;
    let cap = 60i64;

    let (q1, q3, med) = (y.px(b.q1), y.px(b.q3), y.px(b.median));
    let (lo, hi) = (y.px(b.whisker_low), y.px(b.whisker_high));

    rect_outline(&mut img, cx - half, q3, cx + half, q1, AXIS);
    thick_line(&mut img, (cx - half, med), (cx + half, med), MEDIAN);
    line(&mut img, (cx, q1), (cx, lo), AXIS);
    line(&mut img, (cx, q3), (cx, hi), AXIS);
    line(&mut img, (cx - cap, lo), (cx + cap, lo), AXIS);
    line(&mut img, (cx - cap, hi), (cx + cap, hi), AXIS);

    img.save(path)
        .with_context(|| format!("saving chart {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32, price: Option<f64>) -> DailyPrice {
        DailyPrice {
            date: NaiveDate::from_ymd_opt(2025, 10, d).unwrap(),
            avg_price: price,
            median_price: price,
            observations: 1,
        }
    }

    #[test]
    fn test_box_summary_drops_outliers() {
        let b = BoxSummary::from_prices(&[100.0, 110.0, 120.0, 130.0, 140.0, 5000.0]).unwrap();

        assert!(b.whisker_high < 5000.0);
        assert_eq!(b.whisker_low, 100.0);
        assert!(b.q1 <= b.median && b.median <= b.q3);
    }

    #[test]
    fn test_box_summary_empty() {
        assert!(BoxSummary::from_prices(&[]).is_none());
    }

    #[test]
    fn test_box_summary_constant_series() {
        let b = BoxSummary::from_prices(&[80.0, 80.0, 80.0]).unwrap();
        assert_eq!(b.whisker_low, 80.0);
        assert_eq!(b.whisker_high, 80.0);
    }

    #[test]
    fn test_render_daily_chart_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DAILY_CHART_FILE);
        let daily = vec![day(1, Some(100.0)), day(2, None), day(3, Some(300.0))];

        render_daily_chart(&daily, &path).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!(img.width(), WIDTH);
        assert_eq!(img.height(), HEIGHT);
    }

    #[test]
    fn test_render_daily_chart_without_prices_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DAILY_CHART_FILE);

        assert!(render_daily_chart(&[day(1, None)], &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_render_box_chart_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BOX_CHART_FILE);

        render_box_chart(&[100.0, 150.0, 150.0, 200.0, 300.0], &path).unwrap();
        assert!(path.exists());
    }
}
