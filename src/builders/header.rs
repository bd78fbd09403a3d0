use crate::builders::methods::{MethodsRewritten, locate_interface};
use crate::builders::model::{
    GeneratedUnit, RewriteOptions, StructuralMatch, TargetDescriptor, instance_name,
};

/// Doc block naming every wrapped interface.
pub fn doc_block(source_class_names: &[&str]) -> String {
    let mut doc = String::from("/**\n * auto-generated.\n * proxy for:\n");
    for name in source_class_names {
        doc.push_str(&format!(" *   - {{@link {name}}}\n"));
    }
    doc.push_str(" */\n");
    doc
}

/// The annotated field holding one wrapped mapper, with a trailing newline.
pub fn injected_field(source_class_name: &str, options: &RewriteOptions) -> String {
    let indent = &options.indent;
    format!(
        "{indent}{}\n{indent}private {source_class_name} {};\n",
        options.field_injection_annotation(),
        instance_name(source_class_name)
    )
}

/// Replaces `public interface Mapper ... {` with the declaration of the
/// delegating class and its injected field.
#[derive(Debug)]
pub struct ClassHeaderRewriter<'a> {
    source_class_name: &'a str,
    target: &'a TargetDescriptor,
    options: &'a RewriteOptions,
}

impl<'a> ClassHeaderRewriter<'a> {
    pub fn new(
        source_class_name: &'a str,
        target: &'a TargetDescriptor,
        options: &'a RewriteOptions,
    ) -> Self {
        Self {
            source_class_name,
            target,
            options,
        }
    }

    pub fn header(&self, extends: Option<&str>) -> String {
        let mut header = doc_block(&[self.source_class_name]);
        if self.options.component {
            header.push_str(&self.options.component_annotation());
            header.push('\n');
        }
        let extra = extends.map(|list| format!(", {list}")).unwrap_or_default();
        header.push_str(&format!(
            "public class {} implements {}{extra} {{\n",
            self.target.class_name, self.source_class_name
        ));
        header.push_str(&injected_field(self.source_class_name, self.options));
        header
    }

    pub fn rewrite(&self, previous: MethodsRewritten) -> GeneratedUnit {
        let MethodsRewritten {
            text,
            imports,
            package_found,
            stubs,
        } = previous;
        let matches = StructuralMatch {
            package_found,
            interface_found: false,
            method_count: stubs.len(),
        };
        let method_stub_blocks = stubs.into_iter().map(|stub| stub.block).collect();

        let (text, class_header_block, class_body, interface_found) =
            match locate_interface(&text, self.source_class_name) {
                Some(declaration) => {
                    let header = self.header(declaration.extends.as_deref());
                    let mut rewritten = String::with_capacity(text.len() + header.len());
                    rewritten.push_str(&text[..declaration.start]);
                    rewritten.push_str(&header);
                    let body_start = rewritten.len();
                    rewritten.push_str(&text[declaration.brace + 1..]);

                    let class_body = rewritten[body_start..]
                        .rfind('}')
                        .map(|close| rewritten[body_start..body_start + close].to_string());
                    (rewritten, header, class_body, true)
                }
                None => (text, String::new(), None, false),
            };

        GeneratedUnit {
            class_name: self.target.class_name.clone(),
            package_name: self.target.package_name.clone(),
            source_class_name: self.source_class_name.to_string(),
            import_block: imports,
            class_header_block,
            method_stub_blocks,
            class_body,
            text,
            matches: StructuralMatch {
                interface_found,
                ..matches
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::imports::ImportSet;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn target() -> TargetDescriptor {
        TargetDescriptor {
            directory: PathBuf::from("service"),
            package_name: "com.demo.service".to_string(),
            class_name: "UserService".to_string(),
        }
    }

    fn methods(text: &str) -> MethodsRewritten {
        MethodsRewritten {
            text: text.to_string(),
            imports: ImportSet::new(),
            package_found: true,
            stubs: Vec::new(),
        }
    }

    #[test]
    fn test_header_replaces_annotated_interface_declaration() {
        let options = RewriteOptions::default();
        let target = target();
        let rewriter = ClassHeaderRewriter::new("UserMapper", &target, &options);
        let unit = rewriter.rewrite(methods(
            "@Mapper\n@Repository\npublic interface UserMapper extends Base<User> {\n}\n",
        ));
        assert!(unit.matches.interface_found);
        assert_eq!(
            unit.text,
            "/**\n * auto-generated.\n * proxy for:\n *   - {@link UserMapper}\n */\n\
             @Component\n\
             public class UserService implements UserMapper, Base<User> {\n\
             \x20   @Autowired\n\
             \x20   private UserMapper userMapper;\n\
             \n}\n"
        );
        assert_eq!(unit.class_body.as_deref(), Some("\n"));
    }

    #[test]
    fn test_header_without_component() {
        let options = RewriteOptions {
            component: false,
            ..RewriteOptions::default()
        };
        let target = target();
        let rewriter = ClassHeaderRewriter::new("UserMapper", &target, &options);
        let header = rewriter.header(None);
        assert!(!header.contains("@Component"));
        assert!(header.contains("public class UserService implements UserMapper {\n"));
    }

    #[test]
    fn test_irregular_declaration_passes_through() {
        let options = RewriteOptions::default();
        let target = target();
        let rewriter = ClassHeaderRewriter::new("UserMapper", &target, &options);
        let text = "interface UserMapper {}";
        let unit = rewriter.rewrite(methods(text));
        assert!(!unit.matches.interface_found);
        assert_eq!(unit.text, text);
        assert!(unit.class_body.is_none());
        assert!(unit.class_header_block.is_empty());
    }
}
