//! Lexical helpers shared by the rewriting passes.
//!
//! Everything here works on byte offsets. Structural characters are all ASCII,
//! so any offset these helpers return is a valid `str` slice boundary even when
//! the source contains multi-byte characters inside identifiers or literals.

/// Java identifier characters. Non-ASCII bytes are accepted so that unicode
/// identifiers are never split in the middle of a code point.
pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

pub fn skip_ws(text: &str, mut pos: usize) -> usize {
    let bytes = text.as_bytes();
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// Reads one identifier starting exactly at `pos` and returns its end offset.
pub fn read_ident(text: &str, pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut end = pos;
    while end < bytes.len() && is_ident_byte(bytes[end]) {
        end += 1;
    }
    (end > pos).then_some(end)
}

/// Reads a dotted name such as `org.example.Type` starting at `pos`.
/// Whitespace around the dots is tolerated.
pub fn read_qualified_name(text: &str, pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut end = read_ident(text, pos)?;
    loop {
        let dot = skip_ws(text, end);
        if dot < bytes.len() && bytes[dot] == b'.' {
            let next = skip_ws(text, dot + 1);
            match read_ident(text, next) {
                Some(after) => end = after,
                None => return Some(end),
            }
        } else {
            return Some(end);
        }
    }
}

/// True when the word `keyword` starts at `pos` and is not part of a longer identifier.
pub fn keyword_at(text: &str, pos: usize, keyword: &str) -> bool {
    let bytes = text.as_bytes();
    if !text[pos..].starts_with(keyword) {
        return false;
    }
    let before_ok = pos == 0 || !is_ident_byte(bytes[pos - 1]);
    let after = pos + keyword.len();
    let after_ok = after >= bytes.len() || !is_ident_byte(bytes[after]);
    before_ok && after_ok
}

/// Skips a string, text block or char literal whose opening quote is at `pos`.
/// Returns the offset just past the closing quote, or the end of the text when
/// the literal is unterminated.
pub fn skip_literal(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let quote = bytes[pos];
    if quote == b'"' && text[pos..].starts_with("\"\"\"") {
        return match text[pos + 3..].find("\"\"\"") {
            Some(rel) => pos + 3 + rel + 3,
            None => bytes.len(),
        };
    }
    let mut i = pos + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            b'\n' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Given the offset of an opening `(`, `[`, `{` or `<`, returns the offset of the
/// matching closer. Literals are skipped; other bracket kinds are not tracked.
pub fn find_matching(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let (opener, closer) = match bytes.get(open)? {
        b'(' => (b'(', b')'),
        b'[' => (b'[', b']'),
        b'{' => (b'{', b'}'),
        b'<' => (b'<', b'>'),
        _ => return None,
    };
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' || b == b'\'' {
            i = skip_literal(text, i);
            continue;
        }
        if b == opener {
            depth += 1;
        } else if b == closer {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// Skips a run of annotations (`@Name`, `@a.b.Name(...)`) starting at `pos`,
/// including surrounding whitespace. `@interface` is not an annotation.
/// Returns `pos` unchanged (modulo whitespace) when no annotation is present.
pub fn skip_annotations(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let mut cursor = skip_ws(text, pos);
    while cursor < bytes.len() && bytes[cursor] == b'@' && !keyword_at(text, cursor + 1, "interface")
    {
        let Some(name_end) = read_qualified_name(text, cursor + 1) else {
            break;
        };
        let mut next = skip_ws(text, name_end);
        if next < bytes.len() && bytes[next] == b'(' {
            match find_matching(text, next) {
                Some(close) => next = close + 1,
                None => break,
            }
        }
        cursor = skip_ws(text, next);
    }
    cursor
}

/// Removes every annotation from a fragment, wherever it appears.
pub fn strip_annotations(fragment: &str) -> String {
    let bytes = fragment.as_bytes();
    let mut out = String::with_capacity(fragment.len());
    let mut last = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = skip_literal(fragment, i),
            b'@' if i + 1 < bytes.len() && is_ident_byte(bytes[i + 1]) => {
                let end = skip_annotations(fragment, i);
                if end == i {
                    i += 1;
                    continue;
                }
                out.push_str(&fragment[last..i]);
                last = end;
                i = end;
            }
            _ => i += 1,
        }
    }
    out.push_str(&fragment[last..]);
    out
}

/// Splits on `sep` where no bracket of any kind is open.
pub fn split_top_level(text: &str, sep: u8) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_literal(text, i);
                continue;
            }
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' | b'>' => depth -= 1,
            b if b == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&text[start..]);
    parts
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matching_skips_literals() {
        let text = r#"@Select("select (a") (x)"#;
        assert_eq!(find_matching(text, 7), Some(19));
    }

    #[test]
    fn test_skip_annotations_with_arguments() {
        let text = "@Mapper @Repository(value = \"x\")\npublic interface A {";
        let pos = skip_annotations(text, 0);
        assert!(text[pos..].starts_with("public"));
    }

    #[test]
    fn test_skip_annotations_stops_at_interface_keyword() {
        let text = "@interface Marker {}";
        assert_eq!(skip_annotations(text, 0), 0);
    }

    #[test]
    fn test_strip_annotations_in_parameters() {
        assert_eq!(
            normalize_ws(&strip_annotations("@Param(\"id\") Long id, @Param(\"n\") String name")),
            "Long id, String name"
        );
    }

    #[test]
    fn test_split_top_level_keeps_generics_together() {
        let parts = split_top_level("Map<String, Object> params, int size", b',');
        assert_eq!(parts, vec!["Map<String, Object> params", " int size"]);
    }

    #[test]
    fn test_keyword_requires_word_boundary() {
        assert!(keyword_at("import a;", 0, "import"));
        assert!(!keyword_at("reimport a;", 2, "import"));
        assert!(!keyword_at("imports", 0, "import"));
    }
}
