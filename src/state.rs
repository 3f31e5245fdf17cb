//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::processor::Processor;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    processor: Processor,
}

impl AppState {
    pub fn new(config: Config, processor: Processor) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, processor }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the request processor
    pub fn processor(&self) -> &Processor {
        &self.inner.processor
    }
}
