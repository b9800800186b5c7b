//! Axum router and request handlers.
//!
//! Each upload runs the whole pipeline (ingest, derive, aggregate, render)
//! from scratch. The only shared state is the immutable [`AppState`].

use std::sync::Arc;

use axum::extract::multipart::Multipart;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ledger_core::{LedgerError, Result};
use ledger_data::analysis::{analyze_bytes, Dashboard};
use ledger_ui::page::{PageRenderer, PageView};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::upload::UploadForm;

// ── AppState ──────────────────────────────────────────────────────────────────

/// A dashboard computed at startup from `--input`.
#[derive(Debug, Clone)]
pub struct Preloaded {
    pub dashboard: Dashboard,
    pub source: String,
}

/// Read-only state shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    renderer: PageRenderer,
    preloaded: Option<Preloaded>,
}

impl AppState {
    pub fn new(renderer: PageRenderer) -> Self {
        Self {
            renderer,
            preloaded: None,
        }
    }

    /// Show `dashboard` on `GET /` instead of the empty upload page.
    pub fn with_preloaded(mut self, dashboard: Dashboard, source: impl Into<String>) -> Self {
        self.preloaded = Some(Preloaded {
            dashboard,
            source: source.into(),
        });
        self
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router.
///
/// The request body limit is disabled: whole files are accepted regardless of
/// size.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(upload))
        .route("/api/analyze", post(analyze_api))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::disable())
        .with_state(Arc::new(state))
}

/// Serve until Ctrl+C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    info!("Dashboard available at http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Ctrl+C received; shutting down");
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let view = match &state.preloaded {
        Some(p) => PageView::Dashboard {
            dashboard: &p.dashboard,
            source: Some(&p.source),
        },
        None => PageView::Empty,
    };
    Html(state.renderer.render(&view))
}

async fn upload(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let form = match UploadForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(err) => {
            warn!("Malformed upload: {}", err);
            let html = state.renderer.render(&PageView::Error(&err.body_text()));
            return (StatusCode::BAD_REQUEST, Html(html)).into_response();
        }
    };

    let Some(file) = form.file.clone() else {
        return Html(state.renderer.render(&PageView::Empty)).into_response();
    };

    let source = file.file_name.as_deref().unwrap_or("upload");
    match run_analysis(&state, &form).await {
        Ok(dashboard) => {
            info!(
                "Analysed {}: {} rows, {} months",
                source,
                dashboard.rows,
                dashboard.monthly.len()
            );
            Html(state.renderer.render(&PageView::Dashboard {
                dashboard: &dashboard,
                source: Some(source),
            }))
            .into_response()
        }
        Err(err) => {
            warn!("Analysis of {} failed: {}", source, err);
            let html = state.renderer.render(&PageView::Error(&err.to_string()));
            (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response()
        }
    }
}

async fn analyze_api(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let form = match UploadForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(err) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": err.body_text() })))
                .into_response();
        }
    };

    match run_analysis(&state, &form).await {
        Ok(dashboard) => Json(dashboard).into_response(),
        Err(err) => {
            warn!("API analysis failed: {}", err);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Run the synchronous pipeline on the blocking pool. A form without a file
/// is analysed as an empty file.
async fn run_analysis(state: &AppState, form: &UploadForm) -> Result<Dashboard> {
    let strategy = form.strategy_or(state.renderer.default_strategy())?;
    let content = form
        .file
        .as_ref()
        .map(|f| f.content.clone())
        .unwrap_or_default();

    tokio::task::spawn_blocking(move || analyze_bytes(&content, strategy))
        .await
        .map_err(|e| LedgerError::Other(e.into()))?
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::tests::{multipart_body, multipart_request};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use ledger_core::models::NetAmountStrategy;
    use ledger_ui::themes::Theme;
    use tower::ServiceExt;

    const SCENARIO: &str = "date,debit,credit\n2024-01-05,10,40\n2024-01-20,5,5\n2024-02-01,0,20\n";

    fn app() -> Router {
        router(AppState::new(PageRenderer::new(
            Theme::light(),
            "CHF",
            NetAmountStrategy::CreditBased,
        )))
    }

    async fn body_text(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    // ── GET ──────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_index_renders_empty_state() {
        let resp = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains(r#"name="file""#));
        assert!(!html.contains("<svg"));
    }

    #[tokio::test]
    async fn test_index_shows_preloaded_dashboard() {
        let dashboard = analyze_bytes(SCENARIO.as_bytes(), NetAmountStrategy::CreditBased).unwrap();
        let state = AppState::new(PageRenderer::new(
            Theme::light(),
            "CHF",
            NetAmountStrategy::CreditBased,
        ))
        .with_preloaded(dashboard, "preload.csv");

        let resp = router(state)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let html = body_text(resp).await;
        assert_eq!(html.matches("<svg").count(), 3);
        assert!(html.contains("preload.csv"));
    }

    #[tokio::test]
    async fn test_health() {
        let resp = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, "ok");
    }

    // ── POST / ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_upload_renders_dashboard() {
        let body = multipart_body(&[("file", Some("statement.csv"), SCENARIO)]);
        let resp = app().oneshot(multipart_request("/", body)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert_eq!(html.matches("<svg").count(), 3);
        assert!(html.contains("January 2024"));
        assert!(html.contains("February 2024"));
        assert!(html.contains("statement.csv"));
    }

    #[tokio::test]
    async fn test_upload_without_file_is_empty_state() {
        let body = multipart_body(&[("file", Some(""), ""), ("strategy", None, "credit")]);
        let resp = app().oneshot(multipart_request("/", body)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(!html.contains("<svg"));
        assert!(!html.contains(r#"class="error""#));
    }

    #[tokio::test]
    async fn test_upload_empty_file_renders_empty_charts() {
        let body = multipart_body(&[("file", Some("empty.csv"), "")]);
        let resp = app().oneshot(multipart_request("/", body)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert_eq!(html.matches("<svg").count(), 3);
        assert!(html.contains("No data"));
    }

    #[tokio::test]
    async fn test_upload_missing_credit_reports_error_and_keeps_serving() {
        let app = app();
        let body = multipart_body(&[("file", Some("bad.csv"), "date,debit\n2024-01-05,10\n")]);
        let resp = app
            .clone()
            .oneshot(multipart_request("/", body))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(resp).await;
        assert!(html.contains("Missing required column: credit"));
        assert!(html.contains(r#"name="file""#));

        // The same router still answers afterwards.
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_extreme_amounts_render() {
        let csv = "date,debit,credit\n2024-01-05,0,1.7e308\n2024-02-05,1.7e308,0\n";
        let body = multipart_body(&[("file", Some("huge.csv"), csv)]);
        let resp = app().oneshot(multipart_request("/", body)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert_eq!(html.matches("<svg").count(), 3);
        assert!(html.contains("January 2024"));
        assert!(!html.contains("NaN"));
    }

    #[tokio::test]
    async fn test_upload_malformed_date() {
        let body = multipart_body(&[("file", Some("bad.csv"), "date,debit,credit\nsoon,1,2\n")]);
        let resp = app().oneshot(multipart_request("/", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(resp).await.contains("Invalid date on row 1"));
    }

    #[tokio::test]
    async fn test_upload_without_multipart_content_type_is_rejected() {
        let req = Request::post("/").body(Body::from("date,debit,credit\n")).unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // ── POST /api/analyze ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_api_returns_tables() {
        let body = multipart_body(&[
            ("file", Some("statement.csv"), SCENARIO),
            ("strategy", None, "debit"),
        ]);
        let resp = app()
            .oneshot(multipart_request("/api/analyze", body))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(value["strategy"], "debit");
        assert_eq!(value["rows"], 3);
        assert_eq!(value["monthly"][0]["month_label"], "January 2024");
        assert_eq!(value["monthly"][0]["sum_net_amount"], -30.0);
        assert_eq!(value["weekday"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_api_reports_errors_as_json() {
        let body = multipart_body(&[
            ("file", Some("statement.csv"), SCENARIO),
            ("strategy", None, "sideways"),
        ]);
        let resp = app()
            .oneshot(multipart_request("/api/analyze", body))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let value: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(value["error"], "Invalid net-amount strategy: sideways");
    }
}
