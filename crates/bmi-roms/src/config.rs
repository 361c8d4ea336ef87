//! Configuration for the BMI adapter.
//!
//! The settings file is YAML with a `bmi-roms` section:
//!
//! ```yaml
//! bmi-roms:
//!   filename: https://tds.marine.rutgers.edu/thredds/dodsC/roms/doppio/2017_da/avg/Averages_Best
//!   download: true
//!   cache_dir: /var/cache/bmi-roms
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use roms_dataset::{CatalogOptions, SourceSpec};
use serde::{Deserialize, Serialize};

use crate::error::{BmiError, BmiResult};

/// Section name in the settings file.
pub const CONFIG_SECTION: &str = "bmi-roms";

/// Dataset settings consumed by `initialize`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RomsConfig {
    /// Local path or remote URL of the dataset.
    pub filename: String,

    /// Materialise a local copy before opening.
    #[serde(default)]
    pub download: bool,

    /// Where downloaded copies are kept.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Expose variables that carry no `units` attribute.
    #[serde(default)]
    pub include_unitless: bool,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "bmi-roms")]
    bmi_roms: Option<RomsConfig>,
}

impl RomsConfig {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    /// Load and validate a YAML settings file.
    pub fn load(path: impl AsRef<Path>) -> BmiResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| BmiError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate YAML settings.
    pub fn from_yaml_str(contents: &str) -> BmiResult<Self> {
        let file: ConfigFile = serde_yaml::from_str(contents)?;
        let config = file
            .bmi_roms
            .ok_or_else(|| BmiError::config(format!("missing `{}` section", CONFIG_SECTION)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> BmiResult<Self> {
        let mut config = Self::default();
        config.overlay_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `ROMS_*` variables returned by `lookup`.
    pub fn overlay_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("ROMS_DATASET") {
            self.filename = val;
        }

        if let Some(val) = lookup("ROMS_DOWNLOAD") {
            self.download = val.to_lowercase() == "true" || val == "1";
        }

        if let Some(val) = lookup("ROMS_CACHE_DIR") {
            self.cache_dir = Some(PathBuf::from(val));
        }

        if let Some(val) = lookup("ROMS_INCLUDE_UNITLESS") {
            self.include_unitless = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> BmiResult<()> {
        if self.filename.trim().is_empty() {
            return Err(BmiError::config("filename must not be empty"));
        }
        Ok(())
    }

    /// How the catalog should acquire the dataset.
    pub fn source_spec(&self) -> SourceSpec {
        let spec = SourceSpec::new(&self.filename).with_download(self.download);
        match &self.cache_dir {
            Some(dir) => spec.with_cache_dir(dir),
            None => spec,
        }
    }

    pub fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            include_unitless: self.include_unitless,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_yaml() {
        let config = RomsConfig::from_yaml_str(
            "bmi-roms:\n  filename: example.nc\n  download: true\n",
        )
        .unwrap();
        assert_eq!(config.filename, "example.nc");
        assert!(config.download);
        assert_eq!(config.cache_dir, None);
        assert!(!config.include_unitless);
    }

    #[test]
    fn test_missing_section() {
        let err = RomsConfig::from_yaml_str("other:\n  filename: example.nc\n").unwrap_err();
        assert!(matches!(err, BmiError::Config(_)));
    }

    #[test]
    fn test_empty_filename_rejected() {
        let err = RomsConfig::from_yaml_str("bmi-roms:\n  filename: ''\n").unwrap_err();
        assert!(matches!(err, BmiError::Config(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = RomsConfig::from_yaml_str("bmi-roms: [unclosed").unwrap_err();
        assert!(matches!(err, BmiError::Config(_)));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bmi-roms.yaml");
        fs::write(
            &path,
            "bmi-roms:\n  filename: /data/roms_avg.nc\n  include_unitless: true\n",
        )
        .unwrap();

        let config = RomsConfig::load(&path).unwrap();
        assert_eq!(config.filename, "/data/roms_avg.nc");
        assert!(config.include_unitless);
        assert!(config.catalog_options().include_unitless);

        assert!(RomsConfig::load(dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_overlay_env() {
        let env: HashMap<&str, &str> = [
            ("ROMS_DATASET", "https://host/roms.nc"),
            ("ROMS_DOWNLOAD", "1"),
            ("ROMS_CACHE_DIR", "/tmp/roms-cache"),
        ]
        .into_iter()
        .collect();

        let mut config = RomsConfig::new("ignored.nc");
        config.overlay_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.filename, "https://host/roms.nc");
        assert!(config.download);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/roms-cache")));
        assert!(!config.include_unitless);

        let spec = config.source_spec();
        assert!(spec.locator.is_remote());
        assert!(spec.download);
        assert_eq!(spec.cache_dir(), PathBuf::from("/tmp/roms-cache"));
    }
}
