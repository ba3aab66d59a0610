//! Ledger bot - chat-driven income and expense bookkeeping
//!
//! Collects one entry per conversation and appends it to a monthly
//! worksheet in a shared spreadsheet.

mod chat;
mod config;
mod ledger;
mod runtime;
mod sheets;
mod state_machine;
mod validator;

use chat::TelegramGateway;
use config::BotConfig;
use ledger::LedgerStore;
use runtime::{SessionManager, SystemClock};
use sheets::{GoogleSheetsClient, LoggingSheetClient};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Pause after a failed poll before asking again
const POLL_RETRY_DELAY: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledger_bot=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = BotConfig::from_env()?;
    tracing::info!(
        spreadsheet = %config.sheets.spreadsheet_id,
        income_categories = config.categories.for_kind(ledger::EntryKind::Income).len(),
        expense_categories = config.categories.for_kind(ledger::EntryKind::Expense).len(),
        "Configuration loaded"
    );

    let sheets = LoggingSheetClient::new(Arc::new(GoogleSheetsClient::new(config.sheets)?));
    let store = Arc::new(LedgerStore::new(sheets));
    let gateway = Arc::new(TelegramGateway::new(config.telegram)?);
    let manager = SessionManager::new(
        store,
        gateway.clone(),
        Arc::new(SystemClock),
        config.categories,
    );

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                return;
            }
            tracing::info!("Shutdown requested");
            shutdown.cancel();
        }
    });

    tracing::info!("Ledger bot polling for messages");
    loop {
        let batch = tokio::select! {
            () = shutdown.cancelled() => break,
            batch = gateway.poll() => batch,
        };

        match batch {
            Ok(messages) => {
                for inbound in messages {
                    manager.dispatch(inbound).await;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Polling for messages failed");
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    () = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                }
            }
        }
    }

    tracing::info!(
        active_sessions = manager.active_sessions().await,
        "Ledger bot stopped"
    );
    Ok(())
}
