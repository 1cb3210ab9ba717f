//! Generator configuration: which controllers exist and where optional tables live.

use crate::actuator::ActuatorTemplates;
use crate::device::DeviceRegistry;
use crate::tags::TagTable;
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    pub devices: DeviceRegistry,
    /// Tag template CSV; relative paths resolve against the config file.
    #[serde(default)]
    pub tags: Option<PathBuf>,
    /// Replaces the built-in actuator templates entirely when present.
    #[serde(default)]
    pub actuators: Option<ActuatorTemplates>,
}

impl GeneratorConfig {
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: GeneratorConfig = serde_json::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;

        if let (Some(tags), Some(dir)) = (&config.tags, path.parent()) {
            if tags.is_relative() {
                config.tags = Some(dir.join(tags));
            }
        }

        tracing::debug!(path = %path.display(), devices = config.devices.len(), "config loaded");
        Ok(config)
    }

    /// Tag table from `override_path`, else the configured CSV, else the built-in one.
    pub fn tag_table(&self, override_path: Option<&Path>) -> crate::Result<TagTable> {
        match override_path.or(self.tags.as_deref()) {
            Some(p) => TagTable::from_csv_path(p)
                .with_context(|| format!("failed to load tag table {}", p.display())),
            None => Ok(TagTable::builtin()?),
        }
    }

    pub fn actuator_templates(&self) -> ActuatorTemplates {
        self.actuators.clone().unwrap_or_else(ActuatorTemplates::builtin)
    }
}
