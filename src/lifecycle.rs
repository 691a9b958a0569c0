//! Process lifecycle hooks
//!
//! Handlers that need setup or teardown register callbacks here instead of being
//! notified per request. `start` runs before the listener accepts, `stop` after the
//! last connection has finished.

use crate::logger;
use std::sync::atomic::{AtomicBool, Ordering};

type Hook = Box<dyn Fn() + Send + Sync>;

struct NamedHook {
    name: String,
    run: Hook,
}

/// Registry of start and stop callbacks
#[derive(Default)]
pub struct Lifecycle {
    start_hooks: Vec<NamedHook>,
    stop_hooks: Vec<NamedHook>,
    started: AtomicBool,
    stopped: AtomicBool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(&mut self, name: impl Into<String>, hook: impl Fn() + Send + Sync + 'static) {
        self.start_hooks.push(NamedHook {
            name: name.into(),
            run: Box::new(hook),
        });
    }

    pub fn on_stop(&mut self, name: impl Into<String>, hook: impl Fn() + Send + Sync + 'static) {
        self.stop_hooks.push(NamedHook {
            name: name.into(),
            run: Box::new(hook),
        });
    }

    /// Run start hooks in registration order. Returns `false` if they already ran.
    pub fn start(&self) -> bool {
        if self.started.swap(true, Ordering::SeqCst) {
            return false;
        }
        for hook in &self.start_hooks {
            logger::log_debug(&format!("[Lifecycle] start: {}", hook.name));
            (hook.run)();
        }
        true
    }

    /// Run stop hooks in reverse registration order, once, and only after `start`
    pub fn stop(&self) -> bool {
        if !self.started.load(Ordering::SeqCst) || self.stopped.swap(true, Ordering::SeqCst) {
            return false;
        }
        for hook in self.stop_hooks.iter().rev() {
            logger::log_debug(&format!("[Lifecycle] stop: {}", hook.name));
            (hook.run)();
        }
        true
    }

    pub fn hook_count(&self) -> usize {
        self.start_hooks.len() + self.stop_hooks.len()
    }
}
