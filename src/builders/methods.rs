use crate::builders::imports::{ImportSet, ImportsRewritten};
use crate::builders::model::{RewriteOptions, instance_name};
use crate::builders::syntax::{
    find_matching, is_ident_byte, keyword_at, normalize_ws, read_ident, skip_annotations,
    skip_literal, skip_ws, split_top_level, strip_annotations,
};

/// One parameter of an abstract method, annotations already removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub type_name: String,
    pub name: String,
}

impl Parameter {
    pub fn render(&self) -> String {
        format!("{} {}", self.type_name, self.name)
    }
}

/// An abstract interface method reduced to what a delegating override needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Generic method parameters including the angle brackets, e.g. `<T>`.
    pub type_parameters: Option<String>,
    pub return_type: String,
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// The exception list after `throws`, if any.
    pub throws: Option<String>,
}

impl MethodSignature {
    /// Parses one `;`-terminated member declaration (without the semicolon).
    /// Returns `None` for anything that is not an abstract method: constants,
    /// annotation-type elements with defaults, malformed input.
    pub fn parse(declaration: &str) -> Option<Self> {
        let start = skip_annotations(declaration, 0);
        let open = find_top_level_paren(declaration, start)?;
        let close = find_matching(declaration, open)?;

        let head = declaration[start..open].trim_end();
        let name_start = head
            .bytes()
            .rposition(|b| !is_ident_byte(b))
            .map_or(0, |p| p + 1);
        let name = &head[name_start..];
        if name.is_empty() || name.as_bytes()[0].is_ascii_digit() {
            return None;
        }

        let (type_parameters, return_type) = split_return_type(&head[..name_start])?;

        let tail = declaration[close + 1..].trim();
        let throws = if tail.is_empty() {
            None
        } else if keyword_at(tail, 0, "throws") {
            let list = normalize_ws(&tail["throws".len()..]);
            if list.is_empty() {
                return None;
            }
            Some(list)
        } else {
            return None;
        };

        let parameters = parse_parameters(&declaration[open + 1..close])?;

        Some(Self {
            type_parameters,
            return_type,
            name: name.to_string(),
            parameters,
            throws,
        })
    }

    pub fn returns_value(&self) -> bool {
        self.return_type != "void"
    }

    pub fn argument_list(&self) -> String {
        self.parameters
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A generated override together with the signature it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodStub {
    pub signature: MethodSignature,
    pub block: String,
}

/// Output of the method pass: every abstract method replaced by its stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodsRewritten {
    pub text: String,
    pub imports: ImportSet,
    pub package_found: bool,
    pub stubs: Vec<MethodStub>,
}

/// Turns abstract interface methods into overrides that delegate to the
/// injected mapper instance.
#[derive(Debug)]
pub struct MethodStubGenerator<'a> {
    source_class_name: &'a str,
    options: &'a RewriteOptions,
    field: String,
}

impl<'a> MethodStubGenerator<'a> {
    pub fn new(source_class_name: &'a str, options: &'a RewriteOptions) -> Self {
        Self {
            source_class_name,
            options,
            field: instance_name(source_class_name),
        }
    }

    pub fn rewrite(&self, previous: ImportsRewritten) -> MethodsRewritten {
        let ImportsRewritten {
            text,
            imports,
            package_found,
        } = previous;
        let body = locate_interface(&text, self.source_class_name).and_then(|declaration| {
            find_matching(&text, declaration.brace).map(|end| (declaration.brace, end))
        });
        let Some((brace, body_end)) = body else {
            return MethodsRewritten {
                text,
                imports,
                package_found,
                stubs: Vec::new(),
            };
        };

        let mut out = String::with_capacity(text.len() * 2);
        out.push_str(&text[..=brace]);
        let mut stubs = Vec::new();

        for member in split_members(&text, brace + 1, body_end) {
            let signature = match member.kind {
                MemberKind::Statement => {
                    MethodSignature::parse(&text[member.start..member.terminator])
                }
                MemberKind::Block => None,
            };
            match signature {
                Some(signature) => {
                    let block = self.render_stub(&signature);
                    out.push('\n');
                    out.push_str(&block);
                    out.push('\n');
                    stubs.push(MethodStub { signature, block });
                }
                None => push_verbatim(&mut out, text.as_str(), member),
            }
        }

        out.push_str(&text[body_end..]);
        MethodsRewritten {
            text: out,
            imports,
            package_found,
            stubs,
        }
    }

    /// Renders the `@Override` stub without a trailing newline.
    pub fn render_stub(&self, signature: &MethodSignature) -> String {
        let indent = &self.options.indent;
        let type_parameters = signature
            .type_parameters
            .as_ref()
            .map(|tp| format!("{tp} "))
            .unwrap_or_default();
        let throws = signature
            .throws
            .as_ref()
            .map(|list| format!(" throws {list}"))
            .unwrap_or_default();
        let prefix = format!(
            "{indent}public {type_parameters}{} {}(",
            signature.return_type, signature.name
        );
        let params: Vec<String> = signature.parameters.iter().map(Parameter::render).collect();

        let mut declaration = format!("{prefix}{}){throws} {{", params.join(", "));
        if declaration.chars().count() > self.options.max_line_size && params.len() > 1 {
            // The indent is kept as written so tabs still line up under `(`.
            let column = prefix[indent.len()..].chars().count();
            let continuation = format!(",\n{indent}{}", " ".repeat(column));
            declaration = format!("{prefix}{}){throws} {{", params.join(&continuation));
        }

        let call = format!(
            "{}.{}({})",
            self.field,
            signature.name,
            signature.argument_list()
        );
        let statement = if signature.returns_value() {
            format!("return {call};")
        } else {
            format!("{call};")
        };

        format!("{indent}@Override\n{declaration}\n{indent}{indent}{statement}\n{indent}}}")
    }
}

/// Offsets of `[annotations] public interface Name [extends ...] {`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDeclaration {
    /// Start of the first leading annotation, or of `public`.
    pub start: usize,
    /// The `extends` list, whitespace-normalised.
    pub extends: Option<String>,
    /// Offset of the opening brace.
    pub brace: usize,
}

/// Finds the public declaration of interface `name`. The first match wins.
pub fn locate_interface(text: &str, name: &str) -> Option<InterfaceDeclaration> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_literal(text, i);
                continue;
            }
            b'@' | b'p' if i == 0 || !is_ident_byte(bytes[i - 1]) => {
                if let Some(found) = parse_interface_at(text, i, name) {
                    return Some(found);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn parse_interface_at(text: &str, start: usize, name: &str) -> Option<InterfaceDeclaration> {
    let bytes = text.as_bytes();
    let mut pos = start;
    if bytes[pos] == b'@' {
        pos = skip_annotations(text, pos);
    }
    if !keyword_at(text, pos, "public") {
        return None;
    }
    pos += "public".len();
    let keyword = skip_ws(text, pos);
    if keyword == pos || !keyword_at(text, keyword, "interface") {
        return None;
    }
    pos = keyword + "interface".len();
    let name_start = skip_ws(text, pos);
    if name_start == pos || read_ident(text, name_start)? != name_start + name.len() {
        return None;
    }
    if &text[name_start..name_start + name.len()] != name {
        return None;
    }
    pos = skip_ws(text, name_start + name.len());

    let mut extends = None;
    if keyword_at(text, pos, "extends") {
        let list_start = pos + "extends".len();
        let brace = list_start + find_top_level_brace(&text[list_start..])?;
        let list = normalize_ws(&text[list_start..brace]);
        if list.is_empty() {
            return None;
        }
        extends = Some(list);
        pos = brace;
    }

    (bytes.get(pos) == Some(&b'{')).then_some(InterfaceDeclaration {
        start,
        extends,
        brace: pos,
    })
}

/// Copies a member that is not turned into a stub. It is laid out like a
/// stub: on its own line, with the indentation it had in the source.
fn push_verbatim(out: &mut String, text: &str, member: Member) {
    let raw = &text[member.start..member.end];
    let content = raw.trim();
    if content.is_empty() {
        out.push_str(raw);
        return;
    }
    let content_start = skip_ws(text, member.start);
    let line_start = text[..content_start].rfind('\n').map_or(0, |nl| nl + 1);
    let indent = &text[line_start..content_start];

    out.push('\n');
    if indent.trim().is_empty() {
        out.push_str(indent);
    }
    out.push_str(content);
    out.push('\n');
}

fn find_top_level_brace(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'<' => depth += 1,
            b'>' => depth -= 1,
            b'{' if depth == 0 => return Some(i),
            b';' | b'}' => return None,
            _ => {}
        }
    }
    None
}

fn find_top_level_paren(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_literal(text, i);
                continue;
            }
            b'<' => depth += 1,
            b'>' => depth -= 1,
            b'=' if depth == 0 => return None,
            b'(' if depth == 0 => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Splits a return-type prefix such as `public <T> List<T>` into its generic
/// parameters and the bare return type. Leading `public`/`abstract` modifiers
/// are dropped since every stub is public.
fn split_return_type(prefix: &str) -> Option<(Option<String>, String)> {
    let mut rest = strip_annotations(prefix).trim().to_string();
    loop {
        let trimmed = ["public", "abstract"]
            .iter()
            .find(|modifier| keyword_at(&rest, 0, modifier))
            .map(|modifier| rest[modifier.len()..].trim_start().to_string());
        match trimmed {
            Some(next) => rest = next,
            None => break,
        }
    }
    if ["static", "default", "private"]
        .iter()
        .any(|modifier| keyword_at(&rest, 0, modifier))
    {
        return None;
    }

    let mut type_parameters = None;
    if rest.starts_with('<') {
        let close = find_matching(&rest, 0)?;
        type_parameters = Some(normalize_ws(&rest[..=close]));
        rest = rest[close + 1..].trim_start().to_string();
    }

    let return_type = normalize_ws(&rest);
    (!return_type.is_empty()).then_some((type_parameters, return_type))
}

fn parse_parameters(list: &str) -> Option<Vec<Parameter>> {
    if list.trim().is_empty() {
        return Some(Vec::new());
    }
    split_top_level(list, b',')
        .into_iter()
        .map(|raw| {
            let cleaned = normalize_ws(&strip_annotations(raw));
            let name_start = cleaned
                .bytes()
                .rposition(|b| !is_ident_byte(b))
                .map(|p| p + 1)?;
            let name = &cleaned[name_start..];
            let type_name = cleaned[..name_start].trim_end();
            (!name.is_empty() && !type_name.is_empty()).then(|| Parameter {
                type_name: type_name.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberKind {
    /// Ends with `;` at `terminator`.
    Statement,
    /// Has a `{ ... }` body: default methods, nested types, initialisers.
    Block,
}

#[derive(Debug, Clone, Copy)]
struct Member {
    kind: MemberKind,
    start: usize,
    terminator: usize,
    /// End of the member including the whitespace that follows it.
    end: usize,
}

/// Splits the interface body `text[from..to]` into member declarations.
/// Any trailing text that is not terminated is returned as a block member.
fn split_members(text: &str, from: usize, to: usize) -> Vec<Member> {
    let bytes = text.as_bytes();
    let mut members = Vec::new();
    let mut start = from;
    let mut depth = 0i32;
    let mut i = from;

    while i < to {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_literal(text, i);
                continue;
            }
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth -= 1,
            b';' if depth == 0 => {
                let end = skip_ws(text, i + 1).min(to);
                members.push(Member {
                    kind: MemberKind::Statement,
                    start,
                    terminator: i,
                    end,
                });
                start = end;
                i = end;
                continue;
            }
            b'{' if depth == 0 => {
                let close = find_matching(text, i).map_or(to, |c| c.min(to));
                let mut end = (close + 1).min(to);
                let after = skip_ws(text, end);
                if after < to && bytes[after] == b';' {
                    end = after + 1;
                }
                end = skip_ws(text, end).min(to);
                members.push(Member {
                    kind: MemberKind::Block,
                    start,
                    terminator: end,
                    end,
                });
                start = end;
                i = end;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    if start < to {
        members.push(Member {
            kind: MemberKind::Block,
            start,
            terminator: to,
            end: to,
        });
    }
    members
}
