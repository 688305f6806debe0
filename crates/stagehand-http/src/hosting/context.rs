use std::path::{Path, PathBuf};
use std::sync::Arc;

use stagehand_core::{Configuration, Environment};

/// What the host knows while services are being registered
#[derive(Debug, Clone)]
pub struct HostContext {
    environment: Environment,
    content_root: PathBuf,
    configuration: Arc<Configuration>,
}

impl HostContext {
    pub fn new(environment: Environment, content_root: PathBuf, configuration: Arc<Configuration>) -> Self {
        Self {
            environment,
            content_root,
            configuration,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Directory settings files are loaded from
    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    pub fn configuration(&self) -> &Arc<Configuration> {
        &self.configuration
    }
}
