use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::builders::model::RewriteOptions;
use crate::builders::validator::{ConfigValidator, StandardValidator};
use crate::core::error::MsblError;

pub const DEFAULT_CONFIG_FILE: &str = "msbl.config.yml";

/// Settings shared by every command.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct GlobalSettings {
    pub encoding: String,
    pub indent: String,
    pub max_line_size: usize,
    pub component: bool,
    pub field_injection_import: String,
    pub component_import: String,
    pub repository_import: String,
    pub blacklisted_import_prefixes: Vec<String>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        let options = RewriteOptions::default();
        Self {
            encoding: "utf-8".to_string(),
            indent: options.indent,
            max_line_size: options.max_line_size,
            component: options.component,
            field_injection_import: options.field_injection_import,
            component_import: options.component_import,
            repository_import: options.repository_import,
            blacklisted_import_prefixes: options.blacklisted_import_prefixes,
        }
    }
}

impl GlobalSettings {
    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            indent: self.indent.clone(),
            max_line_size: self.max_line_size,
            component: self.component,
            field_injection_import: self.field_injection_import.clone(),
            component_import: self.component_import.clone(),
            repository_import: self.repository_import.clone(),
            blacklisted_import_prefixes: self.blacklisted_import_prefixes.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ServiceSettings {
    pub path: PathBuf,
    pub package: String,
    #[serde(default = "default_service_suffix")]
    pub suffix: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct MapperSettings {
    pub path: PathBuf,
    pub package: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_mapper_suffix")]
    pub suffix: String,
}

/// Settings of the `generate` command.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct GenerateSettings {
    #[serde(default)]
    pub force: bool,
    pub service: ServiceSettings,
    #[serde(default)]
    pub mappers: Vec<MapperSettings>,
}

fn default_service_suffix() -> String {
    "Service".to_string()
}

fn default_mapper_suffix() -> String {
    "Mapper".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct MsblConfig {
    #[serde(default)]
    pub global: GlobalSettings,
    #[serde(default)]
    pub generate: Option<GenerateSettings>,
}

/// Serialization format of a config file, picked from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }

    pub fn parse(self, content: &str) -> Result<MsblConfig> {
        match self {
            Self::Yaml => serde_yaml::from_str(content).context("Failed to parse YAML config"),
            Self::Json => serde_json::from_str(content).context("Failed to parse JSON config"),
            Self::Toml => toml::from_str(content).context("Failed to parse TOML config"),
        }
    }

    pub fn render(self, config: &MsblConfig) -> Result<String> {
        match self {
            Self::Yaml => serde_yaml::to_string(config).context("Failed to serialize to YAML"),
            Self::Json => {
                serde_json::to_string_pretty(config).context("Failed to serialize to JSON")
            }
            Self::Toml => toml::to_string_pretty(config).context("Failed to serialize to TOML"),
        }
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# msbl configuration
global:
  encoding: utf-8
  indent: "    "
  max-line-size: 120
  # annotate generated services with the component annotation below
  component: true
  field-injection-import: org.springframework.beans.factory.annotation.Autowired
  component-import: org.springframework.stereotype.Component
  repository-import: org.springframework.stereotype.Repository
  blacklisted-import-prefixes:
    - org.apache.ibatis.annotations

generate:
  force: false
  service:
    path: src/main/java/com/example/service
    package: com.example.service
    suffix: Service
  mappers:
    - path: src/main/java/com/example/mapper
      package: com.example.mapper
      prefix: ""
      suffix: Mapper
"#;

pub trait ConfigProvider {
    fn load_config(&self) -> Result<MsblConfig>;
    fn save_config(&self, config: &MsblConfig) -> Result<()>;
    fn get_config_path(&self) -> Result<PathBuf>;
}

/// Locates, loads and validates the project's config file.
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
    project_dir: PathBuf,
    explicit: bool,
}

impl ConfigManager {
    /// `config_path` is resolved against the current directory; without it the
    /// default file name inside `project_dir` is used.
    pub fn new(project_dir: PathBuf, config_path: Option<PathBuf>) -> Result<Self> {
        let explicit = config_path.is_some();
        let config_path = match config_path {
            Some(path) if path.is_absolute() => path,
            Some(path) => std::env::current_dir()
                .context("Failed to read current directory")?
                .join(path),
            None => project_dir.join(DEFAULT_CONFIG_FILE),
        };

        Ok(Self {
            config_path,
            project_dir,
            explicit,
        })
    }

    /// Writes the commented default config unless a file already exists.
    /// Returns whether a file was written.
    pub fn initialize(&self) -> Result<bool> {
        if self.config_path.exists() {
            return Ok(false);
        }
        let content = match ConfigFormat::from_path(&self.config_path) {
            ConfigFormat::Yaml => DEFAULT_CONFIG_TEMPLATE.to_string(),
            format => {
                let config = ConfigFormat::Yaml.parse(DEFAULT_CONFIG_TEMPLATE)?;
                format.render(&config)?
            }
        };
        fs::write(&self.config_path, content).context("Failed to write config file")?;
        Ok(true)
    }

    /// Loads the config and fails with every validation issue at once.
    pub fn load_validated(&self) -> Result<MsblConfig> {
        let config = self.load_config()?;
        debug!("loaded config from {}: {config:?}", self.config_path.display());

        let issues = StandardValidator::new().validate_config(&config)?;
        if !issues.is_empty() {
            return Err(MsblError::bad_config(issues.join("; ")).into());
        }
        Ok(config)
    }

    /// Like `load_validated`, but a missing default config file yields the
    /// default settings. An explicitly named file must still exist.
    pub fn load_or_default(&self) -> Result<MsblConfig> {
        if !self.explicit && !self.config_path.exists() {
            debug!("no config file at {}, using defaults", self.config_path.display());
            return Ok(MsblConfig::default());
        }
        self.load_validated()
    }

    pub fn get_project_dir(&self) -> &Path {
        &self.project_dir
    }
}

impl ConfigProvider for ConfigManager {
    fn load_config(&self) -> Result<MsblConfig> {
        if !self.config_path.is_file() {
            let message = if self.explicit {
                format!("{} is not found.", self.config_path.display())
            } else {
                "no config file found.".to_string()
            };
            return Err(MsblError::bad_config(message).into());
        }

        let content =
            fs::read_to_string(&self.config_path).context("Failed to read config file")?;

        ConfigFormat::from_path(&self.config_path)
            .parse(&content)
            .map_err(|err| MsblError::bad_config(format!("{err:#}")).into())
    }

    fn save_config(&self, config: &MsblConfig) -> Result<()> {
        let content = ConfigFormat::from_path(&self.config_path).render(config)?;

        fs::write(&self.config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn get_config_path(&self) -> Result<PathBuf> {
        Ok(self.config_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let yaml = "generate:\n  service:\n    path: svc\n    package: com.a.service\n  mappers:\n    - path: m\n      package: com.a.mapper\n";
        let config = ConfigFormat::Yaml.parse(yaml).unwrap();
        assert_eq!(config.global, GlobalSettings::default());
        let generate = config.generate.unwrap();
        assert!(!generate.force);
        assert_eq!(generate.service.suffix, "Service");
        assert_eq!(generate.mappers[0].prefix, "");
        assert_eq!(generate.mappers[0].suffix, "Mapper");
    }

    #[test]
    fn test_kebab_case_global_keys() {
        let yaml = "global:\n  max-line-size: 80\n  indent: \"\\t\"\n  blacklisted-import-prefixes: [a.b]\n";
        let config = ConfigFormat::Yaml.parse(yaml).unwrap();
        assert_eq!(config.global.max_line_size, 80);
        assert_eq!(config.global.indent, "\t");
        assert_eq!(config.global.blacklisted_import_prefixes, vec!["a.b".to_string()]);
        assert_eq!(config.global.encoding, "utf-8");
    }

    #[test]
    fn test_json_and_toml_formats() {
        let json = r#"{"global": {"component": false}}"#;
        let config = ConfigFormat::Json.parse(json).unwrap();
        assert!(!config.global.component);

        let toml = "[global]\nmax-line-size = 100\n";
        let config = ConfigFormat::Toml.parse(toml).unwrap();
        assert_eq!(config.global.max_line_size, 100);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.yaml")), ConfigFormat::Yaml);
    }

    #[test]
    fn test_default_template_parses() {
        let config = ConfigFormat::Yaml.parse(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.global, GlobalSettings::default());
        assert_eq!(config.generate.unwrap().mappers.len(), 1);
    }
}
