use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::builders::model::SourceRecord;
use crate::core::config::MapperSettings;
use crate::core::error::MsblError;

/// Mapper interfaces that end up in one service class, keyed by the part of
/// the file name between the configured prefix and suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeGroup {
    pub key: String,
    pub members: Vec<SourceRecord>,
}

impl MergeGroup {
    /// The member the service name is derived from.
    pub fn leader(&self) -> Option<&SourceRecord> {
        self.members.first()
    }
}

/// Finds mapper files below a project directory and reads them.
#[derive(Debug)]
pub struct SourceScanner<'a> {
    project_dir: &'a Path,
}

impl<'a> SourceScanner<'a> {
    pub fn new(project_dir: &'a Path) -> Self {
        Self { project_dir }
    }

    /// Scans every configured mapper entry and groups the records by key.
    ///
    /// Groups keep the order in which their key was first seen; members keep
    /// the order of the mapper entries, then file-name order.
    pub fn scan(&self, mappers: &[MapperSettings]) -> Result<Vec<MergeGroup>> {
        if mappers.is_empty() {
            return Err(MsblError::bad_config("at least one mapper is required.").into());
        }

        let mut groups: IndexMap<String, Vec<SourceRecord>> = IndexMap::new();
        for mapper in mappers {
            let directory = self.existing_directory(&mapper.path)?;
            let pattern = Regex::new(&format!(
                r"^{}(\w+){}\.java$",
                regex::escape(&mapper.prefix),
                regex::escape(&mapper.suffix)
            ))
            .context("Failed to build mapper file pattern")?;

            for (file_name, path) in list_files(&directory)? {
                let Some(captures) = pattern.captures(&file_name) else {
                    continue;
                };
                if !dotted(&directory).contains(&mapper.package) {
                    return Err(MsblError::bad_config(format!(
                        "illegal package name {}.",
                        mapper.package
                    ))
                    .into());
                }

                let record = read_record(
                    &path,
                    &directory,
                    &mapper.package,
                    &mapper.prefix,
                    &mapper.suffix,
                )?;
                debug!("found mapper {}", record.qualified_name());
                groups
                    .entry(captures[1].to_string())
                    .or_default()
                    .push(record);
            }
        }

        Ok(groups
            .into_iter()
            .map(|(key, members)| MergeGroup { key, members })
            .collect())
    }

    /// Every `*<suffix>.java` file of one directory, in file-name order.
    pub fn scan_suffix(
        &self,
        directory: &Path,
        package_name: &str,
        suffix: &str,
    ) -> Result<Vec<SourceRecord>> {
        let directory = self.existing_directory(directory)?;
        let mut records = Vec::new();

        for (file_name, path) in list_files(&directory)? {
            let Some(class_name) = file_name.strip_suffix(".java") else {
                continue;
            };
            if !class_name.ends_with(suffix) {
                continue;
            }
            let record = read_record(&path, &directory, package_name, "", suffix)?;
            debug!("found source {}", record.qualified_name());
            records.push(record);
        }
        Ok(records)
    }

    fn existing_directory(&self, path: &Path) -> Result<PathBuf> {
        let directory = self.project_dir.join(path);
        if !directory.is_dir() {
            return Err(
                MsblError::bad_config(format!("{} does not exist.", directory.display())).into(),
            );
        }
        Ok(directory)
    }
}

/// Regular files of `directory` as `(file name, path)`, sorted by name.
fn list_files(directory: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    let entries = fs::read_dir(directory)
        .with_context(|| format!("Failed to list {}", directory.display()))?;

    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        // Names that are not valid UTF-8 can never match a Java class name.
        if let Some(name) = entry.file_name().to_str() {
            files.push((name.to_string(), path));
        }
    }
    files.sort();
    Ok(files)
}

fn read_record(
    path: &Path,
    directory: &Path,
    package_name: &str,
    prefix: &str,
    suffix: &str,
) -> Result<SourceRecord> {
    let source_text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let class_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string();

    Ok(SourceRecord {
        directory: directory.to_path_buf(),
        package_name: package_name.to_string(),
        prefix_name: prefix.to_string(),
        suffix_name: suffix.to_string(),
        class_name,
        source_text,
    })
}

/// `a/b//c` -> `a.b.c`
fn dotted(directory: &Path) -> String {
    let text = directory.to_string_lossy();
    let mut out = String::with_capacity(text.len());
    for part in text.split(['/', '\\']).filter(|part| !part.is_empty()) {
        if !out.is_empty() || text.starts_with(['/', '\\']) {
            out.push('.');
        }
        out.push_str(part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn mapper(path: &str, package: &str, prefix: &str, suffix: &str) -> MapperSettings {
        MapperSettings {
            path: PathBuf::from(path),
            package: package.to_string(),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_groups_by_key_in_config_order() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "src/main/java/com/a/mapper/UserMapper.java", "u");
        write(root, "src/main/java/com/a/mapper/OrderMapper.java", "o");
        write(root, "src/main/java/com/a/mapper/README.md", "x");
        write(root, "src/main/java/com/a/ext/UserExtMapper.java", "ue");

        let groups = SourceScanner::new(root)
            .scan(&[
                mapper("src/main/java/com/a/mapper", "com.a.mapper", "", "Mapper"),
                mapper("src/main/java/com/a/ext", "com.a.ext", "", "ExtMapper"),
            ])
            .unwrap();

        let keys: Vec<&str> = groups.iter().map(|group| group.key.as_str()).collect();
        assert_eq!(keys, vec!["Order", "User"]);
        let users: Vec<&str> = groups[1]
            .members
            .iter()
            .map(|member| member.class_name.as_str())
            .collect();
        assert_eq!(users, vec!["UserMapper", "UserExtMapper"]);
        assert_eq!(groups[1].members[1].source_text, "ue");
        assert_eq!(groups[1].members[1].base_name(), "User");
    }

    #[test]
    fn test_prefix_is_part_of_the_pattern() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "java/com/a/TbUserMapper.java", "");
        write(root, "java/com/a/UserMapper.java", "");

        let groups = SourceScanner::new(root)
            .scan(&[mapper("java/com/a", "com.a", "Tb", "Mapper")])
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "User");
        assert_eq!(groups[0].members[0].class_name, "TbUserMapper");
    }

    #[test]
    fn test_package_must_match_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "java/com/a/UserMapper.java", "");

        let err = SourceScanner::new(root)
            .scan(&[mapper("java/com/a", "com.b", "", "Mapper")])
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<MsblError>(),
            Some(&MsblError::bad_config("illegal package name com.b."))
        );
    }

    #[test]
    fn test_missing_directory_is_a_config_error() {
        let dir = tempdir().unwrap();
        let err = SourceScanner::new(dir.path())
            .scan(&[mapper("nope", "com.a", "", "Mapper")])
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MsblError>(),
            Some(MsblError::BadConfig(_))
        ));
    }

    #[test]
    fn test_scan_suffix() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "mapper/UserMapper.java", "a");
        write(root, "mapper/Helper.java", "b");

        let records = SourceScanner::new(root)
            .scan_suffix(Path::new("mapper"), "com.a.mapper", "Mapper")
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].class_name, "UserMapper");
        assert_eq!(records[0].package_name, "com.a.mapper");
    }

    #[test]
    fn test_dotted() {
        assert_eq!(dotted(Path::new("a/b//c")), "a.b.c");
        assert_eq!(dotted(Path::new("/x/y")), ".x.y");
    }
}
