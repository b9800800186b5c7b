mod bootstrap;

use anyhow::{Context, Result};
use ledger_core::settings::Settings;
use ledger_data::analysis::analyze_path;
use ledger_runtime::server::{serve, AppState};
use ledger_ui::page::PageRenderer;
use ledger_ui::themes::Theme;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();
    settings.validate()?;

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Ledger Dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    let strategy = settings.net_amount_strategy()?;
    tracing::info!(
        "Strategy: {}, Currency: {}, Theme: {}",
        strategy,
        settings.currency,
        settings.theme
    );

    let renderer = PageRenderer::new(Theme::from_name(&settings.theme), &settings.currency, strategy);
    let mut state = AppState::new(renderer);

    if let Some(path) = &settings.input {
        tracing::info!("Analysing {}", path.display());
        let dashboard = analyze_path(path, strategy)?;
        tracing::info!(
            "Loaded {} rows across {} months",
            dashboard.rows,
            dashboard.monthly.len()
        );
        state = state.with_preloaded(dashboard, path.display().to_string());
    }

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {}", address))?;

    serve(listener, state).await?;

    tracing::info!("Server stopped");
    Ok(())
}
