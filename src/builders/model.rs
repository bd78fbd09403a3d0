use std::path::PathBuf;

use crate::builders::imports::ImportSet;

/// One mapper interface file as found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub directory: PathBuf,
    pub package_name: String,
    pub prefix_name: String,
    pub suffix_name: String,
    pub class_name: String,
    pub source_text: String,
}

impl SourceRecord {
    /// The class name with the configured prefix and suffix removed, e.g.
    /// `TbUserMapper` -> `User` for prefix `Tb` and suffix `Mapper`.
    pub fn base_name(&self) -> &str {
        let name = self
            .class_name
            .strip_prefix(&self.prefix_name)
            .unwrap_or(&self.class_name);
        name.strip_suffix(&self.suffix_name).unwrap_or(name)
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.package_name, self.class_name)
    }
}

/// Where a generated class goes and what it is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub directory: PathBuf,
    pub package_name: String,
    pub class_name: String,
}

impl TargetDescriptor {
    pub fn derive(
        source: &SourceRecord,
        directory: impl Into<PathBuf>,
        package_name: &str,
        target_suffix: &str,
    ) -> Self {
        Self {
            directory: directory.into(),
            package_name: package_name.to_string(),
            class_name: format!("{}{}", source.base_name(), target_suffix),
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.directory.join(format!("{}.java", self.class_name))
    }
}

/// Settings every rewriting pass reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    pub indent: String,
    pub max_line_size: usize,
    /// Emit the component annotation on the generated class.
    pub component: bool,
    pub field_injection_import: String,
    pub component_import: String,
    pub repository_import: String,
    pub blacklisted_import_prefixes: Vec<String>,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            max_line_size: 120,
            component: true,
            field_injection_import: "org.springframework.beans.factory.annotation.Autowired"
                .to_string(),
            component_import: "org.springframework.stereotype.Component".to_string(),
            repository_import: "org.springframework.stereotype.Repository".to_string(),
            blacklisted_import_prefixes: vec!["org.apache.ibatis.annotations".to_string()],
        }
    }
}

impl RewriteOptions {
    /// `@Autowired` for `org.springframework.beans.factory.annotation.Autowired`.
    pub fn field_injection_annotation(&self) -> String {
        annotation_for(&self.field_injection_import)
    }

    pub fn component_annotation(&self) -> String {
        annotation_for(&self.component_import)
    }
}

fn annotation_for(qualified_name: &str) -> String {
    let simple = qualified_name.rsplit('.').next().unwrap_or(qualified_name);
    format!("@{simple}")
}

/// Which structural anchors a generation actually found.
///
/// A pass whose anchor is missing leaves the text untouched; callers decide
/// whether that is worth a warning or a hard failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructuralMatch {
    pub package_found: bool,
    pub interface_found: bool,
    pub method_count: usize,
}

impl StructuralMatch {
    pub fn is_complete(&self) -> bool {
        self.package_found && self.interface_found
    }
}

/// The result of rewriting one mapper interface into one delegating class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub class_name: String,
    pub package_name: String,
    /// Simple name of the wrapped interface.
    pub source_class_name: String,
    pub import_block: ImportSet,
    /// Doc block, class declaration and injected field. Empty when the
    /// interface declaration was not found.
    pub class_header_block: String,
    pub method_stub_blocks: Vec<String>,
    /// Everything between the injected field and the closing brace of the class.
    pub class_body: Option<String>,
    /// The complete rewritten source text.
    pub text: String,
    pub matches: StructuralMatch,
}

/// `UserMapper` -> `userMapper`.
pub fn instance_name(class_name: &str) -> String {
    let mut chars = class_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
