use anyhow::Result;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::core::config::{GenerateSettings, GlobalSettings, MapperSettings, MsblConfig};

/// The `ConfigValidator` trait defines the public interface for validating a
/// loaded msbl configuration.
///
/// Validation never stops at the first problem: every check runs and each
/// failure is reported as one human readable issue.
pub trait ConfigValidator {
    /// Performs a full validation of the `MsblConfig` and returns a list of
    /// issues found. An empty list means the configuration is usable.
    fn validate_config(&self, config: &MsblConfig) -> Result<Vec<String>>;

    /// Validates a single mapper entry of the `generate` section.
    fn validate_mapper(&self, mapper: &MapperSettings) -> Result<Vec<String>>;
}

/// Dotted identifiers: `com.example.mapper`.
static PACKAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][\w$]*(\.[A-Za-z_$][\w$]*)*$").expect("package regex is valid")
});

/// The `StandardValidator` is a concrete implementation of `ConfigValidator`.
///
/// It checks the global rewrite settings and, when present, the `generate`
/// section. File system checks happen later in the scanner, which knows the
/// project directory.
pub struct StandardValidator {
    package_pattern: &'static Regex,
}

impl Default for StandardValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardValidator {
    /// Creates a new instance of `StandardValidator`.
    pub fn new() -> Self {
        Self {
            package_pattern: &PACKAGE_RE,
        }
    }

    fn check_package(&self, what: &str, package: &str) -> Option<String> {
        if self.package_pattern.is_match(package) {
            None
        } else {
            Some(format!("Invalid {what} package name: '{package}'"))
        }
    }

    fn check_global(&self, global: &GlobalSettings) -> Vec<String> {
        let mut issues = Vec::new();

        if !global.encoding.eq_ignore_ascii_case("utf-8")
            && !global.encoding.eq_ignore_ascii_case("utf8")
        {
            issues.push(format!(
                "Unsupported encoding: {} (only utf-8 is supported)",
                global.encoding
            ));
        }
        if global.max_line_size == 0 {
            issues.push("max-line-size must be greater than 0".to_string());
        }
        if global.indent.is_empty() || !global.indent.chars().all(|c| c == ' ' || c == '\t') {
            issues.push("indent must be a non-empty run of spaces or tabs".to_string());
        }

        for (key, import) in [
            ("field-injection-import", &global.field_injection_import),
            ("component-import", &global.component_import),
            ("repository-import", &global.repository_import),
        ] {
            if !self.package_pattern.is_match(import) {
                issues.push(format!("Invalid {key}: '{import}'"));
            }
        }
        issues
    }

    fn check_generate(&self, generate: &GenerateSettings) -> Result<Vec<String>> {
        let mut issues = Vec::new();

        issues.extend(self.check_package("service", &generate.service.package));
        if generate.service.suffix.is_empty() {
            issues.push("Service suffix must not be empty".to_string());
        }
        if generate.mappers.is_empty() {
            issues.push("At least one mapper entry is required".to_string());
        }

        // Two entries with the same directory and naming would read every file twice.
        let mut seen = HashSet::new();
        for mapper in &generate.mappers {
            if !seen.insert((&mapper.path, &mapper.prefix, &mapper.suffix)) {
                issues.push(format!(
                    "Duplicate mapper entry for {}",
                    mapper.path.display()
                ));
            }
            issues.extend(self.validate_mapper(mapper)?);
        }
        Ok(issues)
    }
}

impl ConfigValidator for StandardValidator {
    fn validate_config(&self, config: &MsblConfig) -> Result<Vec<String>> {
        let mut issues = self.check_global(&config.global);

        if let Some(generate) = &config.generate {
            issues.extend(self.check_generate(generate)?);
        }

        Ok(issues)
    }

    fn validate_mapper(&self, mapper: &MapperSettings) -> Result<Vec<String>> {
        let mut issues = Vec::new();

        issues.extend(self.check_package("mapper", &mapper.package));

        // Prefix and suffix are spliced into the file name regex.
        for (key, value) in [("prefix", &mapper.prefix), ("suffix", &mapper.suffix)] {
            if !value.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
                issues.push(format!(
                    "Mapper {key} '{value}' may only contain identifier characters"
                ));
            }
        }

        Ok(issues)
    }
}
