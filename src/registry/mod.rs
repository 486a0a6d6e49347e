use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::common::error::{Result, VitalsError};
use crate::domain::ReportingMode;

fn default_enabled() -> bool {
    true
}

/// Configuration for a single county's upstream feed.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CountyConfig {
    pub county: String,
    pub reporting_mode: ReportingMode,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Collector that supplies this county (arcgis, power_bi, tableau, ...).
    /// Informational only; the engine never contacts it.
    pub collector: Option<String>,
}

/// Per-county reporting-mode assignments, loaded from external configuration.
///
/// The engine never infers a county's convention from its data; an
/// unregistered county in a batch is an input-shape error.
#[derive(Debug, Clone, Default)]
pub struct ModeRegistry {
    counties: HashMap<String, CountyConfig>,
}

impl ModeRegistry {
    /// Load all county configurations from a directory of JSON files.
    pub fn load_from_directory<P: AsRef<Path>>(registry_dir: P) -> Result<Self> {
        let dir_path = registry_dir.as_ref();
        if !dir_path.exists() {
            return Err(VitalsError::Registry(format!(
                "Registry directory does not exist: {}",
                dir_path.display()
            )));
        }

        let entries = fs::read_dir(dir_path).map_err(|e| {
            VitalsError::Registry(format!("Failed to read registry directory: {}", e))
        })?;

        let mut counties = HashMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                VitalsError::Registry(format!("Failed to read directory entry: {}", e))
            })?;

            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                let content = fs::read_to_string(&path).map_err(|e| {
                    VitalsError::Registry(format!(
                        "Failed to read county config {}: {}",
                        path.display(),
                        e
                    ))
                })?;

                let config: CountyConfig = serde_json::from_str(&content).map_err(|e| {
                    VitalsError::Registry(format!(
                        "Failed to parse county config {}: {}",
                        path.display(),
                        e
                    ))
                })?;

                counties.insert(config.county.clone(), config);
            }
        }

        Ok(Self { counties })
    }

    /// Build a registry from in-memory assignments. All counties are enabled.
    pub fn from_modes<I, S>(modes: I) -> Self
    where
        I: IntoIterator<Item = (S, ReportingMode)>,
        S: Into<String>,
    {
        let counties = modes
            .into_iter()
            .map(|(county, reporting_mode)| {
                let county = county.into();
                (
                    county.clone(),
                    CountyConfig {
                        county,
                        reporting_mode,
                        enabled: true,
                        collector: None,
                    },
                )
            })
            .collect();
        Self { counties }
    }

    pub fn mode_for(&self, county: &str) -> Option<ReportingMode> {
        self.counties.get(county).map(|c| c.reporting_mode)
    }

    /// Look up a county's mode, failing with an input-shape error when the
    /// county was never registered.
    pub fn require_mode(&self, county: &str) -> Result<ReportingMode> {
        self.mode_for(county).ok_or_else(|| VitalsError::UnknownCounty {
            county: county.to_string(),
        })
    }

    pub fn is_enabled(&self, county: &str) -> bool {
        self.counties.get(county).is_some_and(|c| c.enabled)
    }

    pub fn enabled_counties(&self) -> Vec<String> {
        let mut counties: Vec<String> = self
            .counties
            .values()
            .filter(|c| c.enabled)
            .map(|c| c.county.clone())
            .collect();
        counties.sort();
        counties
    }

    pub fn len(&self) -> usize {
        self.counties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counties.is_empty()
    }

    /// Disable a county in place. Used by tests; production configuration
    /// flips the `enabled` flag in the county's JSON file instead.
    #[cfg(test)]
    pub fn disable(&mut self, county: &str) {
        if let Some(config) = self.counties.get_mut(county) {
            config.enabled = false;
        }
    }
}
