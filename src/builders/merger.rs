use crate::builders::header::{doc_block, injected_field};
use crate::builders::imports::ImportSet;
use crate::builders::model::{GeneratedUnit, RewriteOptions};

/// Combines the proxies of one merge group into a single service class.
///
/// Input order is output order: the `implements` list, the injected fields and
/// the method blocks all follow the order of `units`.
#[derive(Debug)]
pub struct ServiceMerger<'a> {
    package_name: &'a str,
    class_name: &'a str,
    units: &'a [GeneratedUnit],
    options: &'a RewriteOptions,
}

impl<'a> ServiceMerger<'a> {
    pub fn new(
        package_name: &'a str,
        class_name: &'a str,
        units: &'a [GeneratedUnit],
        options: &'a RewriteOptions,
    ) -> Self {
        Self {
            package_name,
            class_name,
            units,
            options,
        }
    }

    pub fn merge(&self) -> String {
        let source_names: Vec<&str> = self
            .units
            .iter()
            .map(|unit| unit.source_class_name.as_str())
            .collect();

        let mut out = format!("package {};\n\n", self.package_name);
        out.push_str(&self.merged_imports().render());
        out.push_str("\n\n\n");
        out.push_str(&doc_block(&source_names));
        if self.options.component {
            out.push_str(&self.options.component_annotation());
            out.push('\n');
        }
        out.push_str(&self.class_declaration(&source_names));
        out.push('\n');

        for name in &source_names {
            out.push_str(&injected_field(name, self.options));
            out.push('\n');
        }

        let bodies: Vec<String> = self
            .units
            .iter()
            .filter_map(|unit| unit.class_body.as_deref())
            .map(|body| reindent(&self.strip_fields(body, &source_names), &self.options.indent))
            .filter(|body| !body.is_empty())
            .collect();
        out.push_str(&bodies.join("\n\n"));
        if !bodies.is_empty() {
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }

    /// Union of every constituent's imports, with the usual wildcard rule.
    pub fn merged_imports(&self) -> ImportSet {
        let mut imports = ImportSet::new();
        for unit in self.units {
            imports.extend(&unit.import_block);
        }
        imports
    }

    /// Drops injected-field declarations from a constituent body; the merged
    /// class declares every field once, above all methods.
    fn strip_fields(&self, body: &str, source_names: &[&str]) -> String {
        source_names
            .iter()
            .fold(body.to_string(), |body, name| {
                body.replace(&injected_field(name, self.options), "")
            })
    }

    /// `public class X implements A, B {`, with `implements` moved onto a
    /// continuation line when the declaration is too long.
    pub fn class_declaration(&self, source_names: &[&str]) -> String {
        let declaration = format!(
            "public class {} implements {} {{",
            self.class_name,
            source_names.join(", ")
        );
        if declaration.chars().count() > self.options.max_line_size {
            declaration.replacen(" implements", &format!("\n{}implements", self.options.indent), 1)
        } else {
            declaration
        }
    }
}

/// Removes the common indentation of `body` and indents every non-blank line
/// by one `indent` unit. Leading and trailing blank lines are dropped.
fn reindent(body: &str, indent: &str) -> String {
    let lines: Vec<&str> = body.trim_matches('\n').lines().collect();
    let common = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out: Vec<String> = lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                let stripped = line.get(common..).unwrap_or_else(|| line.trim_start());
                format!("{indent}{}", stripped.trim_end())
            }
        })
        .collect();
    while out.first().is_some_and(String::is_empty) {
        out.remove(0);
    }
    while out.last().is_some_and(String::is_empty) {
        out.pop();
    }
    out.join("\n")
}
