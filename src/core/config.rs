use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::neuro::neuron::NeuronParams;

/// Build-time configuration of a core instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Parameter set restored on every reset.
    #[serde(default)]
    pub defaults: NeuronParams,
}

impl CoreConfig {
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let config: CoreConfig =
            serde_json::from_str(text).context("invalid core config json")?;
        config.validate();
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;

        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Falls back to built-in defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) {
        if !self.defaults.can_fire() {
            warn!(
                threshold = self.defaults.threshold,
                "default threshold is above the potential ceiling; the neuron will never fire"
            );
        }
    }
}
