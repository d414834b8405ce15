//! Pumpwatch - pump.fun token launch risk analyzer
//!
//! Usage:
//!   cargo run
//!
//! Environment:
//!   PORT                 - Server port (default: 8000)
//!   HOST                 - Server host (default: 0.0.0.0)
//!   SOLANA_RPC_URL       - Solana JSON-RPC endpoint
//!   SOLANA_WS_URL        - Solana WebSocket endpoint (launch stream)
//!   PUMPFUN_API_KEY      - Optional pump.fun frontend API key
//!   TWITTER_API_KEY      - Optional Twitter bearer token (social factor)
//!   DISCORD_WEBHOOK_URL  - Optional Discord alert delivery
//!   TELEGRAM_BOT_TOKEN   - Optional Telegram alert delivery
//!   RUST_LOG             - Log level (default: info)

use pumpwatch::api::{create_router, AppState};
use pumpwatch::core::alerts::AlertService;
use pumpwatch::core::analyzer::RiskAnalyzer;
use pumpwatch::models::config::Settings;
use pumpwatch::providers::{PumpFunClient, SolanaClient, StreamEvent, TwitterClient};
use pumpwatch::utils::cache::AnalysisCache;
use pumpwatch::utils::constants::{APP_NAME, APP_VERSION};
use pumpwatch::utils::store::TokenStore;
use pumpwatch::utils::telemetry::TelemetryCollector;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    print_banner();

    // Load configuration (secrets are logged as "configured", never by value)
    let settings = Arc::new(Settings::from_env());

    if std::env::var("DATABASE_URL").is_ok() {
        warn!("⚠️ DATABASE_URL is set but persistence is in-memory only, variable ignored");
    }

    // Providers
    let solana = Arc::new(SolanaClient::new(
        settings.solana_rpc_url.clone(),
        settings.rpc_timeout,
    )?);
    let pumpfun = Arc::new(PumpFunClient::new(
        settings.pumpfun_api_url.clone(),
        settings.pumpfun_api_key.clone(),
    )?);
    let twitter = match settings.twitter_api_key.clone() {
        Some(key) => Some(TwitterClient::new(key)?),
        None => None,
    };

    // Shared state
    let store = Arc::new(TokenStore::new());
    let cache = AnalysisCache::new();
    let telemetry = Arc::new(TelemetryCollector::new());
    let telemetry_for_shutdown = telemetry.clone();
    info!("📊 Telemetry initialized. Data will be exported to ./telemetry/");

    // Alert service + delivery loop
    let alerts = Arc::new(AlertService::new(settings.clone()));
    tokio::spawn(alerts.clone().run_processor());

    // Risk analyzer + watchlist monitoring loop
    let analyzer = Arc::new(RiskAnalyzer::new(
        solana.clone(),
        pumpfun.clone(),
        twitter,
        store.clone(),
        alerts.clone(),
        cache.clone(),
        telemetry.clone(),
        settings.clone(),
    ));
    tokio::spawn(analyzer.clone().run_monitor());

    // Launch stream: watch new pump.fun tokens as they are created
    if settings.auto_watch_new_tokens {
        let stream = pumpwatch::providers::LaunchStream::new(settings.solana_ws_url.clone());
        let mut events = stream.subscribe_launches();
        let stream_solana = solana.clone();
        let stream_store = store.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if let StreamEvent::NewLaunch(launch) = event {
                    match stream_solana.get_transaction_mint(&launch.signature).await {
                        Ok(Some(mint)) => {
                            if stream_store.watch(&mint) {
                                info!("👀 New launch {} added to watchlist", mint);
                            }
                        }
                        Ok(None) => {
                            warn!("📭 Launch tx {} had no token balances", launch.signature)
                        }
                        Err(e) => warn!("⚠️ Could not resolve launch mint: {}", e),
                    }
                }
            }
        });
        info!("🔌 Launch stream enabled (AUTO_WATCH_NEW_TOKENS=true)");
    }

    // HTTP API
    let state = Arc::new(AppState::new(
        analyzer,
        alerts,
        store,
        cache,
        telemetry,
    ));
    let app = create_router(state);

    let addr: SocketAddr = settings.bind_addr().parse()?;

    info!("🚀 {} v{} API starting on http://{}", APP_NAME, APP_VERSION, addr);
    info!("");
    info!("Endpoints:");
    info!("  POST   /api/token/analyze                       - Full token risk analysis");
    info!("  GET    /api/token/:token_address/risk           - Stored risk assessment");
    info!("  GET    /api/token/:token_address/holders        - Top holder breakdown");
    info!("  GET    /api/token/:token_address/transactions   - Recent classified trades");
    info!("  GET    /api/alerts                              - List alerts");
    info!("  POST   /api/alerts/subscribe                    - Create alert subscription");
    info!("  GET    /api/alerts/subscriptions/:id            - Poll a subscription feed");
    info!("  DELETE /api/alerts/:alert_id                    - Delete an alert");
    info!("  GET    /api/stats                               - Platform statistics");
    info!("  GET    /health                                  - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");
    info!("");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to install Ctrl+C handler: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    // Graceful shutdown sequence
    info!("");
    info!("🛑 Shutdown signal received, cleaning up...");

    info!("📈 Exporting final telemetry...");
    let stats = telemetry_for_shutdown.get_stats();
    info!("   Total analyzed: {}", stats.total_analyzed);
    info!("   Total threats: {}", stats.total_threats);
    info!("   Honeypots detected: {}", stats.honeypots_detected);

    match telemetry_for_shutdown.export_stats_json() {
        Ok(path) => info!("   ✅ Stats exported to: {}", path.display()),
        Err(e) => warn!("   ⚠️ Failed to export stats: {}", e),
    }
    match telemetry_for_shutdown.export_stats_csv() {
        Ok(path) => info!("   ✅ Threat counts exported to: {}", path.display()),
        Err(e) => warn!("   ⚠️ Failed to export threat counts: {}", e),
    }

    info!("👋 {} shutdown complete", APP_NAME);

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════════════════╗
    ║                                                          ║
    ║   ██████╗ ██╗   ██╗███╗   ███╗██████╗                    ║
    ║   ██╔══██╗██║   ██║████╗ ████║██╔══██╗                   ║
    ║   ██████╔╝██║   ██║██╔████╔██║██████╔╝                   ║
    ║   ██╔═══╝ ██║   ██║██║╚██╔╝██║██╔═══╝                    ║
    ║   ██║     ╚██████╔╝██║ ╚═╝ ██║██║                        ║
    ║   ╚═╝      ╚═════╝ ╚═╝     ╚═╝╚═╝                        ║
    ║               W A T C H   v0.1.0                         ║
    ║        pump.fun Launch Risk Analyzer                     ║
    ║                                                          ║
    ╚══════════════════════════════════════════════════════════╝
    "#
    );
}
