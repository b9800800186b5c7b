//! Server-rendered SVG bar charts.
//!
//! A [`BarChart`] holds one or more series over a shared list of categories
//! and renders to a standalone `<svg>` element. Multiple series are drawn as
//! grouped bars. Each bar carries a `<title>` child, which browsers show as
//! a hover tooltip. Missing values draw no bar.

use ledger_core::formatting::{format_amount, format_compact};

use crate::markup::escape;
use crate::themes::Theme;

// ── Geometry ──────────────────────────────────────────────────────────────────

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 52.0;
const MARGIN_BOTTOM: f64 = 88.0;
/// Share of each category band covered by bars.
const BAND_FILL: f64 = 0.8;
/// Target number of intervals on the value axis.
const TARGET_TICKS: f64 = 5.0;
/// Upper bound on value-axis intervals.
const MAX_TICKS: usize = 20;

// ── Series / BarChart ─────────────────────────────────────────────────────────

/// One named sequence of values, index-aligned with the chart categories.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// A vertical bar chart with a categorical x-axis.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    /// Currency label used in tooltips.
    pub currency: String,
}

impl BarChart {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        categories: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            categories,
            series: Vec::new(),
            currency: String::new(),
        }
    }

    /// Add a series. `values` is truncated or padded with missing values to
    /// the number of categories.
    pub fn with_series(mut self, name: impl Into<String>, mut values: Vec<Option<f64>>) -> Self {
        values.resize(self.categories.len(), None);
        self.series.push(Series {
            name: name.into(),
            values,
        });
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Number of bars that will be drawn. Missing and non-finite values
    /// draw nothing.
    pub fn bar_count(&self) -> usize {
        self.series
            .iter()
            .map(|s| s.values.iter().flatten().filter(|v| v.is_finite()).count())
            .sum()
    }

    /// Render the chart as an `<svg>` element.
    pub fn render_svg(&self, theme: &Theme) -> String {
        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let plot_bottom = MARGIN_TOP + plot_h;

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="chart" viewBox="0 0 {w} {h}" width="100%" role="img" aria-label="{title}">"#,
            w = WIDTH,
            h = HEIGHT,
            title = escape(&self.title),
        );
        svg.push_str(&format!(
            r#"<text x="{x}" y="22" font-size="16" font-weight="600" fill="{fill}">{title}</text>"#,
            x = MARGIN_LEFT,
            fill = theme.text,
            title = escape(&self.title),
        ));

        let scale = Scale::for_values(
            self.series
                .iter()
                .flat_map(|s| s.values.iter().flatten().copied()),
        );
        let y_of = |v: f64| MARGIN_TOP + (1.0 - scale.fraction(v)) * plot_h;

        // Grid lines and value-axis ticks.
        for tick in scale.ticks() {
            let y = y_of(tick);
            svg.push_str(&format!(
                r#"<line x1="{x1}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="{grid}" stroke-width="1"/>"#,
                x1 = MARGIN_LEFT,
                x2 = MARGIN_LEFT + plot_w,
                grid = theme.grid,
            ));
            svg.push_str(&format!(
                r#"<text x="{x}" y="{y:.1}" font-size="11" text-anchor="end" dominant-baseline="middle" fill="{fill}">{label}</text>"#,
                x = MARGIN_LEFT - 8.0,
                y = y,
                fill = theme.muted,
                label = format_compact(tick),
            ));
        }

        if self.categories.is_empty() || self.bar_count() == 0 {
            svg.push_str(&format!(
                r#"<text class="no-data" x="{x}" y="{y}" font-size="14" text-anchor="middle" fill="{fill}">No data</text>"#,
                x = MARGIN_LEFT + plot_w / 2.0,
                y = MARGIN_TOP + plot_h / 2.0,
                fill = theme.muted,
            ));
        }

        // Bars.
        if !self.categories.is_empty() && !self.series.is_empty() {
            let band = plot_w / self.categories.len() as f64;
            let bar_w = band * BAND_FILL / self.series.len() as f64;
            let zero_y = y_of(0.0);
            let single = self.series.len() == 1;

            for (ci, category) in self.categories.iter().enumerate() {
                let band_x = MARGIN_LEFT + ci as f64 * band + band * (1.0 - BAND_FILL) / 2.0;
                for (si, series) in self.series.iter().enumerate() {
                    let Some(value) = series.values[ci].filter(|v| v.is_finite()) else {
                        continue;
                    };
                    let y = y_of(value);
                    let fill = if single && value < 0.0 {
                        theme.negative
                    } else {
                        theme.series_color(si)
                    };
                    svg.push_str(&format!(
                        r#"<rect class="bar" x="{x:.1}" y="{top:.1}" width="{w:.1}" height="{h:.1}" fill="{fill}"><title>{tip}</title></rect>"#,
                        x = band_x + si as f64 * bar_w,
                        top = y.min(zero_y),
                        w = bar_w,
                        h = (y - zero_y).abs(),
                        tip = escape(&format!(
                            "{}\n{}: {}",
                            category,
                            series.name,
                            format_amount(value, &self.currency)
                        )),
                    ));
                }
            }

            // Category labels, slanted so long month names fit.
            for (ci, category) in self.categories.iter().enumerate() {
                let x = MARGIN_LEFT + (ci as f64 + 0.5) * band;
                let y = plot_bottom + 14.0;
                svg.push_str(&format!(
                    r#"<text x="{x:.1}" y="{y:.1}" font-size="11" text-anchor="end" transform="rotate(-30 {x:.1} {y:.1})" fill="{fill}">{label}</text>"#,
                    fill = theme.muted,
                    label = escape(category),
                ));
            }
        }

        // Zero baseline and axis titles.
        svg.push_str(&format!(
            r#"<line x1="{x1}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="{axis}" stroke-width="1"/>"#,
            x1 = MARGIN_LEFT,
            x2 = MARGIN_LEFT + plot_w,
            y = y_of(0.0),
            axis = theme.axis,
        ));
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" font-size="12" text-anchor="middle" fill="{fill}">{label}</text>"#,
            x = MARGIN_LEFT + plot_w / 2.0,
            y = HEIGHT - 8.0,
            fill = theme.text,
            label = escape(&self.x_label),
        ));
        svg.push_str(&format!(
            r#"<text x="16" y="{y}" font-size="12" text-anchor="middle" transform="rotate(-90 16 {y})" fill="{fill}">{label}</text>"#,
            y = MARGIN_TOP + plot_h / 2.0,
            fill = theme.text,
            label = escape(&self.y_label),
        ));

        if self.series.len() > 1 {
            svg.push_str(&self.render_legend(theme));
        }

        svg.push_str("</svg>");
        svg
    }

    fn render_legend(&self, theme: &Theme) -> String {
        let mut out = String::from(r#"<g class="legend">"#);
        let mut x = WIDTH - MARGIN_RIGHT - 110.0 * self.series.len() as f64;
        for (si, series) in self.series.iter().enumerate() {
            out.push_str(&format!(
                r#"<rect x="{x:.1}" y="30" width="12" height="12" fill="{fill}"/><text x="{tx:.1}" y="40" font-size="12" fill="{text}">{name}</text>"#,
                fill = theme.series_color(si),
                tx = x + 18.0,
                text = theme.text,
                name = escape(&series.name),
            ));
            x += 110.0;
        }
        out.push_str("</g>");
        out
    }
}

// ── Scale ─────────────────────────────────────────────────────────────────────

/// Value-axis range, always including zero, snapped to a "nice" step.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Scale {
    min: f64,
    max: f64,
    step: f64,
}

impl Scale {
    fn for_values(values: impl Iterator<Item = f64>) -> Self {
        let (lo, hi) = values
            .filter(|v| v.is_finite())
            .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let hi = if hi == lo { lo + 1.0 } else { hi };

        let step = nice_step((hi - lo) / TARGET_TICKS);
        let min = (lo / step).floor() * step;
        let max = (hi / step).ceil() * step;
        if min.is_finite() && max.is_finite() && (max - min).is_finite() {
            return Self { min, max, step };
        }

        // Near f64::MAX the snapped range overflows; use the raw bounds.
        Self {
            min: lo,
            max: hi,
            step: hi / TARGET_TICKS - lo / TARGET_TICKS,
        }
    }

    /// Position of `v` within the range, `0.0` at `min` and `1.0` at `max`.
    /// Halving first keeps the differences finite for extreme bounds.
    fn fraction(&self, v: f64) -> f64 {
        (v / 2.0 - self.min / 2.0) / (self.max / 2.0 - self.min / 2.0)
    }

    fn ticks(&self) -> Vec<f64> {
        let intervals = (self.max / self.step - self.min / self.step).round();
        let n = if intervals.is_finite() && intervals >= 0.0 {
            (intervals as usize).min(MAX_TICKS)
        } else {
            0
        };
        std::iter::successors(Some(self.min), |t| Some(t + self.step))
            .take(n + 1)
            .collect()
    }
}

/// Round `raw` up to 1, 2 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10_f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

// ── Tests ─────────────────────────────────────────────────────────────────────
