/// Colour palette used by the page stylesheet and the SVG charts.
///
/// Every field is a CSS colour string.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,

    // ── Page ─────────────────────────────────────────────────────────────────
    pub background: &'static str,
    pub surface: &'static str,
    pub border: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub accent: &'static str,

    // ── Charts ───────────────────────────────────────────────────────────────
    pub grid: &'static str,
    pub axis: &'static str,
    /// Fill colours for successive series in a chart.
    pub series: [&'static str; 2],
    /// Fill for bars below zero in single-series charts.
    pub negative: &'static str,

    // ── Notifications ────────────────────────────────────────────────────────
    pub error_background: &'static str,
    pub error_text: &'static str,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// White page with dark text (default).
    pub fn light() -> Self {
        Self {
            name: "light",
            background: "#ffffff",
            surface: "#f6f7fb",
            border: "#dfe3ec",
            text: "#262730",
            muted: "#6b7080",
            accent: "#ff4b4b",
            grid: "#e6e9ef",
            axis: "#8a8f9c",
            series: ["#636efa", "#ef553b"],
            negative: "#ef553b",
            error_background: "#ffe9e9",
            error_text: "#9b1c1c",
        }
    }

    /// Dark page for low-light screens.
    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: "#0e1117",
            surface: "#161a23",
            border: "#2b3040",
            text: "#fafafa",
            muted: "#a3a8b8",
            accent: "#ff4b4b",
            grid: "#2b3040",
            axis: "#a3a8b8",
            series: ["#83c9ff", "#ff8c7a"],
            negative: "#ff8c7a",
            error_background: "#3d1a1a",
            error_text: "#ffb4b4",
        }
    }

    /// Resolve a theme by name; unknown names fall back to [`Theme::light`].
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "dark" => Self::dark(),
            _ => Self::light(),
        }
    }

    /// Fill colour of the `index`-th series, cycling through the palette.
    pub fn series_color(&self, index: usize) -> &'static str {
        self.series[index % self.series.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
