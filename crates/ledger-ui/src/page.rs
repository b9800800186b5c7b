//! HTML page rendering.
//!
//! The page always carries the upload form. With a [`Dashboard`] it adds two
//! side-by-side panels: monthly charts and the monthly table on the left,
//! the weekday chart on the right.

use ledger_core::formatting::{format_number, format_optional};
use ledger_core::models::NetAmountStrategy;
use ledger_data::analysis::Dashboard;

use crate::charts::BarChart;
use crate::markup::escape;
use crate::themes::Theme;

pub const PAGE_TITLE: &str = "Financial Analysis";

/// What the page should show.
#[derive(Debug, Clone, Copy)]
pub enum PageView<'a> {
    /// No file uploaded yet.
    Empty,
    /// Derived tables of an uploaded file. `source` is the file name, if known.
    Dashboard {
        dashboard: &'a Dashboard,
        source: Option<&'a str>,
    },
    /// The last upload could not be analysed.
    Error(&'a str),
}

/// Renders complete HTML documents for every [`PageView`].
#[derive(Debug, Clone)]
pub struct PageRenderer {
    theme: Theme,
    currency: String,
    default_strategy: NetAmountStrategy,
}

impl PageRenderer {
    pub fn new(
        theme: Theme,
        currency: impl Into<String>,
        default_strategy: NetAmountStrategy,
    ) -> Self {
        Self {
            theme,
            currency: currency.into(),
            default_strategy,
        }
    }

    pub fn default_strategy(&self) -> NetAmountStrategy {
        self.default_strategy
    }

    /// Render a full HTML document.
    pub fn render(&self, view: &PageView<'_>) -> String {
        let selected = match view {
            PageView::Dashboard { dashboard, .. } => dashboard.strategy,
            _ => self.default_strategy,
        };

        let mut body = self.upload_form(selected);
        match view {
            PageView::Empty => {}
            PageView::Error(message) => {
                body.push_str(&format!(
                    r#"<div class="error" role="alert"><strong>Error:</strong> {}</div>"#,
                    escape(message)
                ));
            }
            PageView::Dashboard { dashboard, source } => {
                body.push_str(&self.dashboard_panels(dashboard, *source));
            }
        }

        format!(
            concat!(
                "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n",
                "<meta charset=\"utf-8\">\n",
                "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
                "<title>{title}</title>\n<style>{style}</style>\n</head>\n",
                "<body>\n<main class=\"block-container\">\n",
                "<h1>&#128202; {title} Tool</h1>\n{body}\n</main>\n</body>\n</html>\n"
            ),
            title = PAGE_TITLE,
            style = self.stylesheet(),
            body = body,
        )
    }

    // ── Charts ───────────────────────────────────────────────────────────────

    /// Monthly net-amount sum against the month label.
    pub fn monthly_sum_chart(&self, dashboard: &Dashboard) -> BarChart {
        BarChart::new("Net Amount per Month", "Months", self.amount_label(), month_labels(dashboard))
            .with_series(
                "Net Amount",
                dashboard
                    .monthly
                    .iter()
                    .map(|r| Some(r.sum_net_amount))
                    .collect(),
            )
            .with_currency(&self.currency)
    }

    /// Monthly average and median side by side.
    pub fn average_median_chart(&self, dashboard: &Dashboard) -> BarChart {
        BarChart::new(
            "Monthly Average & Median",
            "Months",
            self.amount_label(),
            month_labels(dashboard),
        )
        .with_series(
            "Average",
            dashboard.monthly.iter().map(|r| r.avg_net_amount).collect(),
        )
        .with_series(
            "Median",
            dashboard.monthly.iter().map(|r| r.median_net_amount).collect(),
        )
        .with_currency(&self.currency)
    }

    /// Weekday net-amount sum, Monday to Friday.
    pub fn weekday_chart(&self, dashboard: &Dashboard) -> BarChart {
        BarChart::new(
            "Net amount per weekday",
            "Weekday",
            self.amount_label(),
            dashboard.weekday.iter().map(|r| r.day.clone()).collect(),
        )
        .with_series(
            "Net Amount",
            dashboard.weekday.iter().map(|r| r.net_amount).collect(),
        )
        .with_currency(&self.currency)
    }

    // ── Sections ─────────────────────────────────────────────────────────────

    fn upload_form(&self, selected: NetAmountStrategy) -> String {
        let options: String = NetAmountStrategy::ALL
            .iter()
            .map(|s| {
                format!(
                    r#"<option value="{}"{}>{}</option>"#,
                    s.as_str(),
                    if *s == selected { " selected" } else { "" },
                    s.label()
                )
            })
            .collect();

        format!(
            concat!(
                r#"<form class="upload" method="post" action="/" enctype="multipart/form-data">"#,
                r#"<label for="file">&#128193; To start your analysis upload a file</label>"#,
                r#"<input type="file" id="file" name="file" accept=".csv,.txt">"#,
                r#"<label for="strategy">Net amount</label>"#,
                r#"<select id="strategy" name="strategy">{options}</select>"#,
                r#"<button type="submit">Analyse</button>"#,
                "</form>\n"
            ),
            options = options
        )
    }

    fn dashboard_panels(&self, dashboard: &Dashboard, source: Option<&str>) -> String {
        let mut summary = format!(
            "{} rows &middot; {}",
            dashboard.rows,
            dashboard.strategy.label()
        );
        if let Some(name) = source {
            summary = format!("{} &middot; {}", escape(name), summary);
        }

        format!(
            concat!(
                "<p class=\"summary\">{summary}</p>\n",
                "<div class=\"columns\">\n",
                "<section class=\"column\">\n",
                "<h2>Net Amount by Month</h2>\n{sum_chart}\n",
                "<h2>Monthly Average &amp; Median</h2>\n{avg_chart}\n{table}",
                "</section>\n",
                "<section class=\"column\">\n",
                "<h2>Net Amount per Weekday</h2>\n{weekday_chart}\n",
                "</section>\n",
                "</div>"
            ),
            summary = summary,
            sum_chart = self.monthly_sum_chart(dashboard).render_svg(&self.theme),
            avg_chart = self.average_median_chart(dashboard).render_svg(&self.theme),
            table = self.monthly_table(dashboard),
            weekday_chart = self.weekday_chart(dashboard).render_svg(&self.theme),
        )
    }

    /// Merged monthly table with a totals row.
    fn monthly_table(&self, dashboard: &Dashboard) -> String {
        let mut html = String::from(concat!(
            r#"<table class="monthly"><thead><tr>"#,
            "<th>Month</th><th>Debit</th><th>Credit</th>",
            "<th>Net Amount</th><th>Average</th><th>Median</th>",
            "</tr></thead><tbody>"
        ));
        for row in &dashboard.monthly {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&row.month_label),
                format_number(row.debit, 2),
                format_number(row.credit, 2),
                format_number(row.sum_net_amount, 2),
                format_optional(row.avg_net_amount, 2),
                format_optional(row.median_net_amount, 2),
            ));
        }
        let totals = &dashboard.totals;
        html.push_str(&format!(
            concat!(
                "</tbody><tfoot><tr><td>Total ({} months)</td>",
                "<td>{}</td><td>{}</td><td>{}</td><td></td><td></td></tr></tfoot></table>\n"
            ),
            totals.months,
            format_number(totals.debit, 2),
            format_number(totals.credit, 2),
            format_number(totals.net_amount, 2),
        ));
        html
    }

    fn stylesheet(&self) -> String {
        let t = &self.theme;
        format!(
            concat!(
                "body{{margin:0;font-family:system-ui,sans-serif;background:{bg};color:{text};}}",
                "div.block-container{{padding:3rem 2rem 2rem;max-width:1400px;margin:0 auto;}}",
                "form.upload{{display:flex;flex-wrap:wrap;gap:.75rem;align-items:center;",
                "padding:1rem;background:{surface};border:1px solid {border};border-radius:.5rem;}}",
                "form.upload button{{background:{accent};color:#fff;border:0;border-radius:.25rem;",
                "padding:.4rem 1rem;cursor:pointer;}}",
                ".summary{{color:{muted};}}",
                ".columns{{display:grid;grid-template-columns:repeat(auto-fit,minmax(420px,1fr));gap:2rem;}}",
                ".error{{margin-top:1rem;padding:1rem;border-radius:.5rem;",
                "background:{err_bg};color:{err_text};}}",
                "table.monthly{{width:100%;border-collapse:collapse;margin-top:1rem;font-size:.9rem;}}",
                "table.monthly th,table.monthly td{{padding:.35rem .5rem;border-bottom:1px solid {border};",
                "text-align:right;}}",
                "table.monthly th:first-child,table.monthly td:first-child{{text-align:left;}}",
                "table.monthly tfoot td{{font-weight:600;}}"
            ),
            bg = t.background,
            text = t.text,
            surface = t.surface,
            border = t.border,
            accent = t.accent,
            muted = t.muted,
            err_bg = t.error_background,
            err_text = t.error_text,
        )
    }

    fn amount_label(&self) -> String {
        if self.currency.is_empty() {
            "Net Amount".to_string()
        } else {
            format!("Net Amount ({})", self.currency)
        }
    }
}

fn month_labels(dashboard: &Dashboard) -> Vec<String> {
    dashboard
        .monthly
        .iter()
        .map(|r| r.month_label.clone())
        .collect()
}
