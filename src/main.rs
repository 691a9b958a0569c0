use servlet_studies::{config, dispatch, exercises, lifecycle, logger, server};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Tokio runtime, thread count from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("[CONFIG] Using {workers} worker threads"));
    } else {
        logger::log_info("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut dispatcher = dispatch::Dispatcher::new();
    let mut lifecycle = lifecycle::Lifecycle::new();
    exercises::register(&mut dispatcher, &mut lifecycle)?;

    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr, cfg.performance.backlog)?;
    let state = Arc::new(config::AppState::new(cfg, dispatcher));

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    // Start hooks complete before the first connection is accepted
    lifecycle.start();
    logger::log_server_start(&addr, &state);

    let tracker = Arc::new(server::ConnectionTracker::new());
    let result =
        server::start_server_loop(listener, state, Arc::clone(&tracker), signals.subscribe()).await;

    // Every connection has ended by now
    lifecycle.stop();
    logger::log_server_stopped(tracker.total());

    result.map_err(Into::into)
}
