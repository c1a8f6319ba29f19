use serde::Serialize;
use tracing::{error, info, warn};

/// Sink for the human-readable event log.
pub trait Logger {
    fn info(&self, msg: &str);

    /// Dump `obj` after `msg`, only when details are enabled.
    fn debug<T: Serialize + ?Sized>(&self, msg: &str, obj: &T);

    fn error(&self, err: &dyn std::error::Error);

    fn details_enabled(&self) -> bool;
}

/// Logger writing through `tracing`, with object dumps rendered as YAML.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLogger {
    details: bool,
}

impl DefaultLogger {
    pub fn new(details: bool) -> Self {
        Self { details }
    }

    /// Text that `debug` would emit, or `None` when details are off.
    pub fn render<T: Serialize + ?Sized>(&self, msg: &str, obj: &T) -> Option<String> {
        if !self.details {
            return None;
        }
        match serde_yaml::to_string(obj) {
            Ok(body) => Some(format!("{}\n{}", msg, body.trim_end())),
            Err(e) => {
                warn!("Could not render details for '{}': {}", msg, e);
                None
            }
        }
    }
}

impl Logger for DefaultLogger {
    fn info(&self, msg: &str) {
        info!("{}", msg);
    }

    fn debug<T: Serialize + ?Sized>(&self, msg: &str, obj: &T) {
        if let Some(text) = self.render(msg, obj) {
            info!("{}", text);
        }
    }

    fn error(&self, err: &dyn std::error::Error) {
        error!("{}", err);
    }

    fn details_enabled(&self) -> bool {
        self.details
    }
}
