use k8s_openapi::api::core::v1::Pod;

use crate::diff::diff;
use crate::informer::ResourceEventHandler;
use crate::logger::Logger;
use crate::types::LogEvent;

pub const NO_DIFF_NOTICE: &str = "No difference, just a cache update";

fn pod_name(pod: &Pod) -> &str {
    pod.metadata.name.as_deref().unwrap_or_default()
}

/// Writes a log line for every pod lifecycle event.
pub struct PodEventHandler<L> {
    logger: L,
}

impl<L: Logger> PodEventHandler<L> {
    pub fn new(logger: L) -> Self {
        Self { logger }
    }
}

impl<L> ResourceEventHandler<Pod> for PodEventHandler<L>
where
    L: Logger + Send + 'static,
{
    fn on_add(&self, pod: &Pod) {
        self.logger.info(&LogEvent::Created(pod_name(pod)).to_string());
        self.logger.debug("Pod details:", pod);
    }

    fn on_update(&self, old: &Pod, new: &Pod) {
        self.logger.info(&LogEvent::Updated(pod_name(old)).to_string());
        if !self.logger.details_enabled() {
            return;
        }
        match diff(old, new) {
            Ok(changes) if changes.is_empty() => self.logger.info(NO_DIFF_NOTICE),
            Ok(changes) => self.logger.debug("Difference:", &changes),
            Err(e) => self.logger.error(&e),
        }
    }

    fn on_delete(&self, pod: &Pod) {
        self.logger.info(&LogEvent::Deleted(pod_name(pod)).to_string());
        self.logger.debug("Pod details:", pod);
    }
}
