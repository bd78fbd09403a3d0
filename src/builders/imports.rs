use std::collections::BTreeSet;

use indexmap::IndexSet;

use crate::builders::comments::StrippedSource;
use crate::builders::model::{RewriteOptions, SourceRecord, TargetDescriptor};
use crate::builders::syntax::{is_ident_byte, keyword_at, skip_literal, skip_ws};

/// The imports of one generated class.
///
/// Simple imports are kept sorted; wildcard packages keep the order in which
/// they were first seen. A wildcard entry is stored without its trailing `.*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    pub simple: BTreeSet<String>,
    pub wildcard: IndexSet<String>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies `name` (the text between `import` and `;`) as wildcard or simple.
    pub fn insert(&mut self, name: &str) {
        match name.strip_suffix(".*") {
            Some(package) => {
                self.wildcard.insert(package.to_string());
            }
            None => {
                self.simple.insert(name.to_string());
            }
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.simple.remove(name);
    }

    /// Drops every simple or wildcard import whose qualified name starts with
    /// one of `prefixes`. A leading `static ` is ignored when matching.
    pub fn remove_prefixed(&mut self, prefixes: &[String]) {
        let allowed = |item: &String| {
            let name = item.strip_prefix("static ").unwrap_or(item);
            !prefixes.iter().any(|prefix| name.starts_with(prefix.as_str()))
        };
        self.simple.retain(allowed);
        self.wildcard.retain(allowed);
    }

    pub fn extend(&mut self, other: &Self) {
        self.simple.extend(other.simple.iter().cloned());
        for package in &other.wildcard {
            self.wildcard.insert(package.clone());
        }
    }

    /// True when a wildcard import already covers this simple import.
    pub fn is_superseded(&self, name: &str) -> bool {
        name.rfind('.')
            .is_some_and(|dot| self.wildcard.contains(&name[..dot]))
    }

    pub fn is_empty(&self) -> bool {
        self.simple.is_empty() && self.wildcard.is_empty()
    }

    /// Sorted simple imports not covered by a wildcard, then every wildcard.
    pub fn rendered_names(&self) -> Vec<String> {
        self.simple
            .iter()
            .filter(|name| !self.is_superseded(name))
            .cloned()
            .chain(self.wildcard.iter().map(|package| format!("{package}.*")))
            .collect()
    }

    pub fn render(&self) -> String {
        self.rendered_names()
            .iter()
            .map(|name| format!("import {name};"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Output of the package/import pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportsRewritten {
    pub text: String,
    pub imports: ImportSet,
    pub package_found: bool,
}

/// Moves a mapper's package and imports over to the generated service.
#[derive(Debug)]
pub struct ImportRewriter<'a> {
    source: &'a SourceRecord,
    target: &'a TargetDescriptor,
    options: &'a RewriteOptions,
}

impl<'a> ImportRewriter<'a> {
    pub fn new(
        source: &'a SourceRecord,
        target: &'a TargetDescriptor,
        options: &'a RewriteOptions,
    ) -> Self {
        Self {
            source,
            target,
            options,
        }
    }

    pub fn rewrite(&self, stripped: StrippedSource) -> ImportsRewritten {
        let (text, mut imports) = extract_imports(stripped.as_str());

        imports.insert(&self.options.field_injection_import);
        if self.options.component {
            imports.insert(&self.options.component_import);
        }
        imports.insert(&self.source.qualified_name());
        imports.remove(&self.options.repository_import);
        imports.remove_prefixed(&self.options.blacklisted_import_prefixes);

        match find_package_statement(&text, &self.source.package_name) {
            Some((start, end)) => {
                let replacement = format!(
                    "package {};\n\n{}\n\n\n",
                    self.target.package_name,
                    imports.render()
                );
                let mut rewritten = String::with_capacity(text.len() + replacement.len());
                rewritten.push_str(&text[..start]);
                rewritten.push_str(&replacement);
                rewritten.push_str(&text[end..]);
                ImportsRewritten {
                    text: rewritten,
                    imports,
                    package_found: true,
                }
            }
            None => ImportsRewritten {
                text,
                imports,
                package_found: false,
            },
        }
    }
}

/// Cuts every `import ...;` statement (and the whitespace after it) out of
/// `text` and collects the imported names.
pub fn extract_imports(text: &str) -> (String, ImportSet) {
    let bytes = text.as_bytes();
    let mut imports = ImportSet::new();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'"' || bytes[i] == b'\'' {
            i = skip_literal(text, i);
            continue;
        }
        if bytes[i] == b'i' && keyword_at(text, i, "import") {
            if let Some((name, end)) = read_import(text, i) {
                imports.insert(&name);
                out.push_str(&text[last..i]);
                i = skip_ws(text, end);
                last = i;
                continue;
            }
        }
        i += 1;
    }

    out.push_str(&text[last..]);
    (out, imports)
}

/// Parses `import [static] a.b.C;` starting at the keyword. Returns the
/// normalised name and the offset just past the semicolon.
fn read_import(text: &str, start: usize) -> Option<(String, usize)> {
    let bytes = text.as_bytes();
    let mut pos = skip_ws(text, start + "import".len());
    let mut prefix = "";
    if keyword_at(text, pos, "static") {
        prefix = "static ";
        pos = skip_ws(text, pos + "static".len());
    }
    let name_start = pos;
    while pos < bytes.len() && (is_ident_byte(bytes[pos]) || bytes[pos] == b'.' || bytes[pos] == b'*')
    {
        pos += 1;
    }
    let name = &text[name_start..pos];
    let semi = skip_ws(text, pos);
    if name.is_empty() || bytes.get(semi) != Some(&b';') {
        return None;
    }
    Some((format!("{prefix}{name}"), semi + 1))
}

/// Finds `package <name>;` together with one preceding line break (and its
/// indentation) and all whitespace after the semicolon.
fn find_package_statement(text: &str, package_name: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut search = 0;
    while let Some(rel) = text[search..].find("package") {
        let at = search + rel;
        search = at + 1;
        if !keyword_at(text, at, "package") {
            continue;
        }
        let name_start = skip_ws(text, at + "package".len());
        if name_start == at + "package".len() || !text[name_start..].starts_with(package_name) {
            continue;
        }
        let name_end = name_start + package_name.len();
        if bytes.get(name_end).is_some_and(|b| is_ident_byte(*b) || *b == b'.') {
            continue;
        }
        let semi = skip_ws(text, name_end);
        if bytes.get(semi) != Some(&b';') {
            continue;
        }
        return Some((leading_line_break(text, at), skip_ws(text, semi + 1)));
    }
    None
}

fn leading_line_break(text: &str, at: usize) -> usize {
    let before = &text[..at];
    let trimmed = before.trim_end();
    let gap = &before[trimmed.len()..];
    match gap.find('\n') {
        Some(newline) => trimmed.len() + newline,
        None => at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::comments::strip_comments;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn fixture(text: &str) -> (SourceRecord, TargetDescriptor) {
        let source = SourceRecord {
            directory: PathBuf::from("mapper"),
            package_name: "com.demo.mapper".to_string(),
            prefix_name: String::new(),
            suffix_name: "Mapper".to_string(),
            class_name: "UserMapper".to_string(),
            source_text: text.to_string(),
        };
        let target = TargetDescriptor::derive(&source, "service", "com.demo.service", "Service");
        (source, target)
    }

    #[test]
    fn test_wildcard_supersedes_simple_import() {
        let mut set = ImportSet::new();
        set.insert("x.A");
        set.insert("y.B");
        set.insert("x.*");
        assert_eq!(set.rendered_names(), vec!["y.B", "x.*"]);
    }

    #[test]
    fn test_wildcards_render_in_encounter_order_after_sorted_simple() {
        let mut set = ImportSet::new();
        set.insert("z.*");
        set.insert("b.B");
        set.insert("a.*");
        set.insert("a2.A");
        assert_eq!(set.rendered_names(), vec!["a2.A", "b.B", "z.*", "a.*"]);
    }

    #[test]
    fn test_blacklisted_prefix_removed_even_for_static_imports() {
        let mut set = ImportSet::new();
        set.insert("org.apache.ibatis.annotations.Param");
        set.insert("static org.apache.ibatis.annotations.Select.value");
        set.insert("java.util.List");
        set.remove_prefixed(&["org.apache.ibatis.annotations".to_string()]);
        assert_eq!(set.rendered_names(), vec!["java.util.List"]);
    }

    #[test]
    fn test_blacklisted_prefix_removes_wildcard_imports() {
        let mut set = ImportSet::new();
        set.insert("org.apache.ibatis.annotations.*");
        set.insert("static org.apache.ibatis.type.JdbcType.*");
        set.insert("java.util.*");
        set.remove_prefixed(&["org.apache.ibatis".to_string()]);
        assert_eq!(set.rendered_names(), vec!["java.util.*"]);
    }

    #[test]
    fn test_extract_imports_removes_statements() {
        let (text, set) = extract_imports("package a;\nimport java.util.List;\nimport  java.io.*;\nimport static a.B.c;\n\nclass X {}");
        assert_eq!(text, "package a;\nclass X {}");
        assert!(set.simple.contains("java.util.List"));
        assert!(set.simple.contains("static a.B.c"));
        assert!(set.wildcard.contains("java.io"));
    }

    #[test]
    fn test_rewrite_replaces_package_and_rebuilds_imports() {
        let text = "package com.demo.mapper;\n\nimport java.util.List;\nimport org.springframework.stereotype.Repository;\nimport org.apache.ibatis.annotations.Param;\n\npublic interface UserMapper {}";
        let (source, target) = fixture(text);
        let options = RewriteOptions::default();
        let rewritten =
            ImportRewriter::new(&source, &target, &options).rewrite(strip_comments(text));
        assert!(rewritten.package_found);
        assert_eq!(
            rewritten.text,
            "package com.demo.service;\n\n\
             import com.demo.mapper.UserMapper;\n\
             import java.util.List;\n\
             import org.springframework.beans.factory.annotation.Autowired;\n\
             import org.springframework.stereotype.Component;\n\n\n\
             public interface UserMapper {}"
        );
    }

    #[test]
    fn test_component_import_only_when_enabled() {
        let text = "package com.demo.mapper;\npublic interface UserMapper {}";
        let (source, target) = fixture(text);
        let options = RewriteOptions {
            component: false,
            ..RewriteOptions::default()
        };
        let rewritten =
            ImportRewriter::new(&source, &target, &options).rewrite(strip_comments(text));
        assert!(!rewritten.text.contains("Component"));
    }

    #[test]
    fn test_missing_package_still_extracts_imports() {
        let text = "import java.util.List;\npublic interface UserMapper {}";
        let (source, target) = fixture(text);
        let options = RewriteOptions::default();
        let rewritten =
            ImportRewriter::new(&source, &target, &options).rewrite(strip_comments(text));
        assert!(!rewritten.package_found);
        assert_eq!(rewritten.text, "public interface UserMapper {}");
    }

    #[test]
    fn test_other_package_statement_is_not_touched() {
        let text = "package com.demo.mapper2;\npublic interface UserMapper {}";
        let (source, target) = fixture(text);
        let options = RewriteOptions::default();
        let rewritten =
            ImportRewriter::new(&source, &target, &options).rewrite(strip_comments(text));
        assert!(!rewritten.package_found);
        assert!(rewritten.text.starts_with("package com.demo.mapper2;"));
    }
}
