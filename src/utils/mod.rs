use anyhow::{Context, Result};
use log::LevelFilter;
use regex::Regex;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::LazyLock;

static ANSWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(y|n|yes|no)\s*$").expect("answer regex is valid"));

/// Sets up `env_logger`. An explicit level wins over `RUST_LOG`; without
/// either everything at `info` and above is shown.
pub fn init_logger(level: Option<&str>) {
    let mut builder = env_logger::Builder::new();
    builder.format_timestamp(None).format_target(false);

    match level {
        Some(level) => {
            builder.parse_filters(level);
        }
        None => match std::env::var("RUST_LOG") {
            Ok(filters) => {
                builder.parse_filters(&filters);
            }
            Err(_) => {
                builder.filter_level(LevelFilter::Info);
            }
        },
    }

    // A second call (tests) keeps the first logger.
    let _ = builder.try_init();
}

/// `Some(true)` for y/yes, `Some(false)` for n/no, `None` for anything else.
pub fn parse_answer(answer: &str) -> Option<bool> {
    ANSWER_RE
        .is_match(answer)
        .then(|| answer.trim_start().starts_with(['y', 'Y']))
}

/// Asks a yes/no question on stdout and reads the answer from `input`.
/// Unrecognised answers and end of input select `default`.
pub fn confirm_with(input: &mut impl BufRead, prompt: &str, default: bool) -> Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    print!("{prompt} ({hint}) ");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read answer from stdin")?;

    let accepted = parse_answer(&answer).unwrap_or(default);
    println!("{}", if accepted { "yes" } else { "no" });
    Ok(accepted)
}

pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    confirm_with(&mut io::stdin().lock(), prompt, default)
}

/// Source of yes/no decisions for interactive steps (creating a directory,
/// overwriting a file).
pub trait Confirm {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Asks on the terminal.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        confirm(prompt, default)
    }
}

/// Gives the same answer to every question without asking.
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        log::debug!("{prompt}: answered {}", if self.0 { "yes" } else { "no" });
        Ok(self.0)
    }
}

/// `mapper` -> `Mapper`. Only the first character changes.
pub fn upper_camel_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derives a Java package from a source directory:
/// `src/main/java/com/demo/mapper` -> `com.demo.mapper`.
///
/// Path separators become dots and everything up to the last `java.` is
/// dropped. Directories outside a `java` source root keep their full dotted
/// path.
pub fn package_from_directory(directory: &Path) -> String {
    let dotted = directory.to_string_lossy().replace(['/', '\\'], ".");
    let package = match dotted.rfind("java.") {
        Some(index) => &dotted[index + "java.".len()..],
        None => dotted.as_str(),
    };
    package.trim_matches('.').to_string()
}

/// The last segment of a dotted package name.
pub fn last_package_segment(package: &str) -> &str {
    package.rsplit('.').next().unwrap_or(package)
}

/// `path` relative to `base` when it lies below it, for log output.
pub fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("y\n"), Some(true));
        assert_eq!(parse_answer("  YES "), Some(true));
        assert_eq!(parse_answer("No\n"), Some(false));
        assert_eq!(parse_answer("n"), Some(false));
        assert_eq!(parse_answer("yep"), None);
        assert_eq!(parse_answer(""), None);
    }

    #[test]
    fn test_confirm_falls_back_to_default() {
        let mut input = Cursor::new("maybe\n");
        assert!(!confirm_with(&mut input, "overwrite?", false).unwrap());

        let mut input = Cursor::new("");
        assert!(confirm_with(&mut input, "mkdir?", true).unwrap());

        let mut input = Cursor::new("y\n");
        assert!(confirm_with(&mut input, "overwrite?", false).unwrap());
    }

    #[test]
    fn test_package_from_directory() {
        assert_eq!(
            package_from_directory(&PathBuf::from("src/main/java/com/demo/mapper")),
            "com.demo.mapper"
        );
        assert_eq!(
            package_from_directory(&PathBuf::from("/work/app/src/main/java/com/demo/service/")),
            "com.demo.service"
        );
        assert_eq!(package_from_directory(&PathBuf::from("out/service")), "out.service");
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(upper_camel_case("mapper"), "Mapper");
        assert_eq!(upper_camel_case(""), "");
        assert_eq!(last_package_segment("com.demo.mapper"), "mapper");
        assert_eq!(last_package_segment("mapper"), "mapper");
    }
}
