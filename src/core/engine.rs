use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::builders::merger::ServiceMerger;
use crate::builders::model::{GeneratedUnit, RewriteOptions, SourceRecord, TargetDescriptor};
use crate::builders::proxy::ProxyGenerator;
use crate::builders::reporter::{GenerationReport, UnmatchedSource};
use crate::builders::scanner::{MergeGroup, SourceScanner};
use crate::core::config::GenerateSettings;
use crate::core::error::MsblError;
use crate::utils::{self, Confirm, StdinConfirm};

/// Arguments of the single directory pair mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub from: PathBuf,
    pub to: PathBuf,
    pub source_suffix: Option<String>,
    pub target_suffix: Option<String>,
}

/// Drives scanning, generation, merging and writing for one command.
pub struct GenerateEngine {
    project_dir: PathBuf,
    options: RewriteOptions,
    strict: bool,
    prompt: Box<dyn Confirm>,
}

impl GenerateEngine {
    pub fn new(project_dir: PathBuf, options: RewriteOptions) -> Self {
        Self {
            project_dir,
            options,
            strict: false,
            prompt: Box::new(StdinConfirm),
        }
    }

    /// Fail instead of passing text through when an interface anchor is missing.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_prompt(mut self, prompt: Box<dyn Confirm>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Generates one merged service class per merge group.
    pub fn generate(&self, settings: &GenerateSettings, force: bool) -> Result<GenerationReport> {
        let mut report = GenerationReport::default();
        debug!("generate settings: {settings:?}");

        let service_dir = self.project_dir.join(&settings.service.path);
        if !self.ensure_directory(&service_dir, force)? {
            warn!("{} was not created, nothing generated", service_dir.display());
            return Ok(report);
        }

        let groups = SourceScanner::new(&self.project_dir).scan(&settings.mappers)?;
        for group in groups {
            let Some(leader) = group.leader() else {
                continue;
            };
            let target = TargetDescriptor::derive(
                leader,
                &service_dir,
                &settings.service.package,
                &settings.service.suffix,
            );
            debug!(
                "group {} -> {} ({} members)",
                group.key,
                target.class_name,
                group.members.len()
            );

            let units = self.generate_group(&group, &target);
            self.check_matches(&units, &mut report)?;

            let content = ServiceMerger::new(
                &target.package_name,
                &target.class_name,
                &units,
                &self.options,
            )
            .merge();
            self.write_target(&target.file_path(), &content, force, &mut report)?;
        }

        Ok(report)
    }

    /// Rewrites every `*<source suffix>.java` of `from` into `to`, one class per
    /// source and without merging. Existing targets are overwritten.
    pub fn build(&self, request: &BuildRequest) -> Result<GenerationReport> {
        let mut report = GenerationReport::default();

        let source_package = utils::package_from_directory(&request.from);
        let target_package = utils::package_from_directory(&request.to);
        let source_suffix = suffix_or_default(request.source_suffix.as_deref(), &source_package);
        let target_suffix = suffix_or_default(request.target_suffix.as_deref(), &target_package);
        debug!(
            "build {source_package}.*{source_suffix} -> {target_package}.*{target_suffix}"
        );

        let target_dir = self.project_dir.join(&request.to);
        if !target_dir.is_dir() {
            return Err(MsblError::bad_argument(format!(
                "{} is not found.",
                target_dir.display()
            ))
            .into());
        }

        let sources = SourceScanner::new(&self.project_dir).scan_suffix(
            &request.from,
            &source_package,
            &source_suffix,
        )?;

        let options = &self.options;
        let units: Vec<GeneratedUnit> = sources
            .into_par_iter()
            .map(|source| {
                let target =
                    TargetDescriptor::derive(&source, &target_dir, &target_package, &target_suffix);
                ProxyGenerator::new(source, target, options).into_unit()
            })
            .collect();
        self.check_matches(&units, &mut report)?;

        for unit in &units {
            let path = target_dir.join(format!("{}.java", unit.class_name));
            if path.exists() {
                warn!("overwrite in {}.", self.relative(&path));
            }
            self.write_target(&path, &unit.text, true, &mut report)?;
        }

        Ok(report)
    }

    /// Runs the generators of one group in parallel. `collect` keeps the
    /// member order.
    fn generate_group(&self, group: &MergeGroup, target: &TargetDescriptor) -> Vec<GeneratedUnit> {
        let options = &self.options;
        group
            .members
            .par_iter()
            .map(|source: &SourceRecord| {
                ProxyGenerator::new(source.clone(), target.clone(), options).into_unit()
            })
            .collect()
    }

    fn check_matches(&self, units: &[GeneratedUnit], report: &mut GenerationReport) -> Result<()> {
        for unit in units {
            if unit.matches.is_complete() {
                continue;
            }
            let unmatched = UnmatchedSource {
                source_class_name: unit.source_class_name.clone(),
                matches: unit.matches,
            };
            if self.strict {
                return Err(MsblError::bad_argument(format!(
                    "{}: {} not found.",
                    unmatched.source_class_name,
                    unmatched.missing()
                ))
                .into());
            }
            warn!(
                "{}: {} not found, text passed through",
                unmatched.source_class_name,
                unmatched.missing()
            );
            report.unmatched.push(unmatched);
        }
        Ok(())
    }

    /// Makes sure `directory` exists, asking before creating it unless
    /// `force` is set. Returns whether the directory is usable.
    fn ensure_directory(&self, directory: &Path, force: bool) -> Result<bool> {
        if directory.is_dir() {
            return Ok(true);
        }
        if directory.exists() {
            return Err(MsblError::bad_config(format!(
                "{} is not a directory.",
                directory.display()
            ))
            .into());
        }
        if !force
            && !self
                .prompt
                .confirm(&format!("mkdir {}", self.relative(directory)), false)?
        {
            return Ok(false);
        }

        fs::create_dir_all(directory)
            .with_context(|| format!("Failed to create directory {}", directory.display()))?;
        info!("created directory {}.", self.relative(directory));
        Ok(true)
    }

    fn write_target(
        &self,
        path: &Path,
        content: &str,
        force: bool,
        report: &mut GenerationReport,
    ) -> Result<()> {
        if path.exists() {
            if !path.is_file() {
                error!("{} is not a file.", path.display());
                report.skipped.push(path.to_path_buf());
                return Ok(());
            }
            if !force
                && !self
                    .prompt
                    .confirm(&format!("overwrite {}", self.relative(path)), false)?
            {
                warn!("kept existing {}", self.relative(path));
                report.skipped.push(path.to_path_buf());
                return Ok(());
            }
        }

        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("write into {}", self.relative(path));
        report.written.push(path.to_path_buf());
        Ok(())
    }

    fn relative(&self, path: &Path) -> String {
        utils::display_relative(path, &self.project_dir)
    }
}

/// An explicit suffix, or the upper-camel last segment of the package.
fn suffix_or_default(explicit: Option<&str>, package: &str) -> String {
    match explicit {
        Some(suffix) if !suffix.is_empty() => utils::upper_camel_case(suffix),
        _ => utils::upper_camel_case(utils::last_package_segment(package)),
    }
}
