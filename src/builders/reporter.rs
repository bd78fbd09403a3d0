use anyhow::Result;
use std::path::PathBuf;

use crate::builders::model::StructuralMatch;

/// A generated class whose interface did not have every expected anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedSource {
    pub source_class_name: String,
    pub matches: StructuralMatch,
}

impl UnmatchedSource {
    /// Human readable list of the anchors that were not found.
    pub fn missing(&self) -> String {
        let mut missing = Vec::new();
        if !self.matches.package_found {
            missing.push("package statement");
        }
        if !self.matches.interface_found {
            missing.push("interface declaration");
        }
        missing.join(", ")
    }
}

/// What one `generate` or `build` run did.
///
/// The engine fills this in as it goes and hands it to a `StatusReporter` at
/// the end of the run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Target files that were written.
    pub written: Vec<PathBuf>,
    /// Targets that already existed and were not overwritten.
    pub skipped: Vec<PathBuf>,
    pub unmatched: Vec<UnmatchedSource>,
}

impl GenerationReport {
    pub fn is_empty(&self) -> bool {
        self.written.is_empty() && self.skipped.is_empty() && self.unmatched.is_empty()
    }
}

pub trait StatusReporter {
    fn generate_status_report(&self, report: &GenerationReport) -> Result<()>;
}

/// Prints the run summary to the console.
pub struct ConsoleReporter;

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReporter {
    /// Constructs a new `ConsoleReporter` instance.
    pub fn new() -> Self {
        Self
    }

    fn format_unmatched(&self, unmatched: &UnmatchedSource) -> String {
        format!(
            "🟡 {} (missing: {}, {} methods)",
            unmatched.source_class_name,
            unmatched.missing(),
            unmatched.matches.method_count
        )
    }
}

impl StatusReporter for ConsoleReporter {
    fn generate_status_report(&self, report: &GenerationReport) -> Result<()> {
        println!("📊 msbl Generation Report");
        println!("=========================");

        if report.is_empty() {
            println!("Nothing was generated.");
            return Ok(());
        }

        for path in &report.written {
            println!("🟢 {}", path.display());
        }
        for path in &report.skipped {
            println!("🔴 {} (skipped)", path.display());
        }
        for unmatched in &report.unmatched {
            println!("{}", self.format_unmatched(unmatched));
        }

        println!("\n📈 Summary:");
        println!("  Written: {}", report.written.len());
        println!("  Skipped: {}", report.skipped.len());
        println!("  Sources with unmatched anchors: {}", report.unmatched.len());

        if !report.unmatched.is_empty() {
            println!("\n⚠️  Run with --strict to fail on unmatched anchors");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_anchor_description() {
        let unmatched = UnmatchedSource {
            source_class_name: "UserMapper".to_string(),
            matches: StructuralMatch {
                package_found: false,
                interface_found: false,
                method_count: 0,
            },
        };
        assert_eq!(unmatched.missing(), "package statement, interface declaration");
        assert_eq!(
            ConsoleReporter::new().format_unmatched(&unmatched),
            "🟡 UserMapper (missing: package statement, interface declaration, 0 methods)"
        );
    }

    #[test]
    fn test_empty_report() {
        let report = GenerationReport::default();
        assert!(report.is_empty());
        ConsoleReporter::new().generate_status_report(&report).unwrap();
    }
}
