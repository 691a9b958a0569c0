// Application state module
// Everything a connection task needs, fixed once the server starts

use super::types::Config;
use crate::dispatch::Dispatcher;

/// Application state, shared read-only across connection tasks
pub struct AppState {
    pub config: Config,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub const fn new(config: Config, dispatcher: Dispatcher) -> Self {
        Self { config, dispatcher }
    }

    /// Default configuration with every exercise route registered
    #[cfg(test)]
    pub fn for_tests() -> Self {
        let config = Config::load_from("definitely-not-a-config-file").expect("default config");
        let mut dispatcher = Dispatcher::new();
        let mut lifecycle = crate::lifecycle::Lifecycle::new();
        crate::exercises::register(&mut dispatcher, &mut lifecycle).expect("routes register");
        Self::new(config, dispatcher)
    }
}
