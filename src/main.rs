//! Surprise Timer - a countdown that beeps after a random extra wait
//!
//! This is the main entry point for the surprise-timer server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use surprise_timer::{
    api::create_router,
    config::Config,
    notify::{BellSink, CommandSink, FanOutSink, LogSink, NotificationSink},
    scheduler::RuntimeScheduler,
    state::AppState,
    tasks::spawn_timer_driver,
    timer::TimerController,
    utils::shutdown_signal,
};

/// Assemble the notification sinks requested on the command line
fn build_sink(config: &Config) -> FanOutSink {
    let mut sink = FanOutSink::new().with(Arc::new(LogSink));

    if config.bell {
        sink = sink.with(Arc::new(BellSink::new()));
    }

    if let Some(command_line) = &config.notify_command {
        match CommandSink::from_command_line(command_line) {
            Ok(command) => {
                info!("Notifications will run: {}", command_line);
                sink = sink.with(Arc::new(command.with_ticks(config.notify_ticks)));
            }
            Err(e) => warn!("Ignoring notify command: {}", e),
        }
    }

    info!("Notifications go to {} sink(s)", sink.len());
    sink
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("surprise_timer={},tower_http=info", config.log_level()))
        .init();

    let timer_config = config.timer_config();
    info!("Starting surprise-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, countdown={}ms, max_wait={}ms, tick={}ms",
        config.host, config.port, timer_config.countdown_ms, timer_config.max_wait_ms, config.tick_ms
    );

    // Create the controller and hand it to the driver task
    let sink: Arc<dyn NotificationSink> = Arc::new(build_sink(&config));
    let controller = TimerController::with_seed(
        timer_config,
        RuntimeScheduler::new(),
        sink,
        config.seed,
    )
    .with_tick_interval(config.tick_ms);
    let (commands, snapshot_rx, driver) = spawn_timer_driver(controller);

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        commands,
        snapshot_rx,
    ));

    if config.autostart {
        if let Err(e) = state.start(None).await {
            warn!("Autostart failed: {}", e);
        }
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start   - Start the countdown (optional countdown/max_wait body)");
    info!("  POST /stop    - Stop and reset");
    info!("  POST /pause   - Pause or resume the countdown");
    info!("  PUT  /config  - Edit durations for the next run");
    info!("  GET  /status  - Current phase, remaining time and progress");
    info!("  GET  /events  - Snapshot stream (server-sent events)");
    info!("  GET  /health  - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Discard any pending timer work before exiting
    if let Err(e) = state.shutdown().await {
        warn!("{}", e);
    }
    if let Err(e) = driver.await {
        warn!("Timer driver ended abnormally: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
