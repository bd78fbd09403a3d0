use crate::builders::syntax::skip_literal;

/// Source text with every comment removed. Only `strip_comments` produces it,
/// so every later pass can rely on never seeing a commented-out declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedSource(String);

impl StrippedSource {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Removes `/* ... */` and `// ...` comments.
///
/// String and char literals are copied verbatim, so `"http://host"` survives.
/// A line comment keeps its terminating newline. An unterminated block comment
/// is left in place. `\r\n` line endings become `\n`, so the generated lines
/// and the copied ones agree.
pub fn strip_comments(source: &str) -> StrippedSource {
    let normalised;
    let source = if source.contains("\r\n") {
        normalised = source.replace("\r\n", "\n");
        normalised.as_str()
    } else {
        source
    };
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = skip_literal(source, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => match source[i + 2..].find("*/") {
                Some(rel) => {
                    out.push_str(&source[last..i]);
                    i = i + 2 + rel + 2;
                    last = i;
                }
                None => break,
            },
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                out.push_str(&source[last..i]);
                i = source[i..].find('\n').map_or(bytes.len(), |rel| i + rel);
                last = i;
            }
            _ => i += 1,
        }
    }

    out.push_str(&source[last..]);
    StrippedSource(out)
}
