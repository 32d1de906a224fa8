//! Tab Timers - a local multi-timer daemon
//! 
//! This is the main entry point for the tab-timers application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use tab_timers::{
    config::Config,
    state::AppState,
    api::create_router,
    storage::{FileStore, KeyValueStore, MemoryStore, Persistence},
    tasks::tick_scheduler_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("tab_timers={},tower_http=info", config.log_level()))
        .init();

    info!("Starting tab-timers v{}", env!("CARGO_PKG_VERSION"));

    let store: Box<dyn KeyValueStore> = if config.in_memory {
        Box::new(MemoryStore::new())
    } else {
        let dir = config.data_dir();
        info!("State directory: {}", dir.display());
        Box::new(FileStore::new(dir))
    };
    let persistence = Persistence::new(store);

    if config.reset {
        persistence.clear()?;
        info!("All saved data deleted");
        return Ok(());
    }

    let board = match persistence.load_or_default() {
        Ok(board) => board,
        Err(e) => {
            tracing::error!("{}", e);
            anyhow::bail!("cannot read saved state; run `tab-timers --reset` to start over");
        }
    };
    persistence.save(&board)?;

    let state = Arc::new(
        AppState::new(board, persistence, config.alert_dispatcher()?)
            .with_server(config.host.clone(), config.port)
            .with_pause_on_edit(config.pause_on_edit),
    );

    // Start the tick scheduler background task
    let tick_state = Arc::clone(&state);
    let catch_up = config.catch_up;
    tokio::spawn(async move {
        tick_scheduler_task(tick_state, catch_up).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("  GET  /state, /status, /health, /events");
    info!("  POST /groups, /groups/:id/activate, /groups/active/timers, /reset?confirm=true");
    info!("  POST /timers/:id/toggle, /timers/:id/reset, /timers/:id/edit");
    info!("  PUT  /timers/:id/duration, /groups/active/name, /settings/theme, /settings/layout");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        signal = shutdown_signal() => {
            match signal {
                Ok(_) => info!("Shutdown signal received"),
                Err(e) => tracing::error!("Failed to listen for shutdown signals: {}", e),
            }
        }
    }

    if let Err(e) = state.save_now() {
        tracing::error!("Final save failed: {}", e);
    }
    info!("Server shutdown complete");
    Ok(())
}
