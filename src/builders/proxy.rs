use std::sync::OnceLock;

use crate::builders::comments::strip_comments;
use crate::builders::header::ClassHeaderRewriter;
use crate::builders::imports::ImportRewriter;
use crate::builders::methods::MethodStubGenerator;
use crate::builders::model::{GeneratedUnit, RewriteOptions, SourceRecord, TargetDescriptor};

/// Rewrites one mapper interface into one delegating service class.
///
/// The passes run in a fixed order: comments, package and imports, method
/// stubs, class header. The stub pass needs the untouched
/// `interface X { ...; }` shape, so the header goes last. Each pass only
/// accepts the value produced by the one before it.
///
/// The result is computed on the first call to [`ProxyGenerator::generate`]
/// and every later call returns the same value.
#[derive(Debug)]
pub struct ProxyGenerator<'a> {
    source: SourceRecord,
    target: TargetDescriptor,
    options: &'a RewriteOptions,
    unit: OnceLock<GeneratedUnit>,
}

impl<'a> ProxyGenerator<'a> {
    pub fn new(source: SourceRecord, target: TargetDescriptor, options: &'a RewriteOptions) -> Self {
        Self {
            source,
            target,
            options,
            unit: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &SourceRecord {
        &self.source
    }

    pub fn target(&self) -> &TargetDescriptor {
        &self.target
    }

    pub fn generate(&self) -> &GeneratedUnit {
        self.unit.get_or_init(|| self.run())
    }

    /// The rewritten source text.
    pub fn generate_text(&self) -> &str {
        &self.generate().text
    }

    pub fn into_unit(mut self) -> GeneratedUnit {
        match self.unit.take() {
            Some(unit) => unit,
            None => self.run(),
        }
    }

    fn run(&self) -> GeneratedUnit {
        let class_name = self.source.class_name.as_str();
        let stripped = strip_comments(&self.source.source_text);
        let imports =
            ImportRewriter::new(&self.source, &self.target, self.options).rewrite(stripped);
        let methods = MethodStubGenerator::new(class_name, self.options).rewrite(imports);
        ClassHeaderRewriter::new(class_name, &self.target, self.options).rewrite(methods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    const USER_MAPPER: &str = r#"/*
 * Copyright header.
 */
package com.demo.mapper;

import com.demo.entity.User;
import java.util.List;
import org.apache.ibatis.annotations.Mapper;
import org.apache.ibatis.annotations.Param;
import org.springframework.stereotype.Repository;

/**
 * User table access.
 */
@Mapper
@Repository
public interface UserMapper {

    /** find one user */
    User findById(@Param("id") Long id);

    // remove
    void deleteById(@Param("id") Long id);
}
"#;

    const EXPECTED: &str = r#"package com.demo.service;

import com.demo.entity.User;
import com.demo.mapper.UserMapper;
import java.util.List;
import org.springframework.beans.factory.annotation.Autowired;
import org.springframework.stereotype.Component;


/**
 * auto-generated.
 * proxy for:
 *   - {@link UserMapper}
 */
@Component
public class UserService implements UserMapper {
    @Autowired
    private UserMapper userMapper;

    @Override
    public User findById(Long id) {
        return userMapper.findById(id);
    }

    @Override
    public void deleteById(Long id) {
        userMapper.deleteById(id);
    }
}
"#;

    fn generator(options: &RewriteOptions) -> ProxyGenerator<'_> {
        generator_for(USER_MAPPER, options)
    }

    fn generator_for<'a>(text: &str, options: &'a RewriteOptions) -> ProxyGenerator<'a> {
        let source = SourceRecord {
            directory: PathBuf::from("src/main/java/com/demo/mapper"),
            package_name: "com.demo.mapper".to_string(),
            prefix_name: String::new(),
            suffix_name: "Mapper".to_string(),
            class_name: "UserMapper".to_string(),
            source_text: text.to_string(),
        };
        let target = TargetDescriptor::derive(
            &source,
            "src/main/java/com/demo/service",
            "com.demo.service",
            "Service",
        );
        ProxyGenerator::new(source, target, options)
    }

    #[test]
    fn test_generates_full_service_class() {
        let options = RewriteOptions::default();
        let generator = generator(&options);
        assert_eq!(generator.generate_text(), EXPECTED);
        let unit = generator.generate();
        assert!(unit.matches.is_complete());
        assert_eq!(unit.matches.method_count, 2);
        assert_eq!(unit.method_stub_blocks.len(), 2);
    }

    #[test]
    fn test_blacklisted_wildcard_import_is_dropped() {
        let options = RewriteOptions::default();
        let text = "package com.demo.mapper;\nimport org.apache.ibatis.annotations.*;\npublic interface UserMapper { @Select(\"x\") int count(); }";
        let generator = generator_for(text, &options);
        let out = generator.generate_text();
        assert!(!out.contains("org.apache.ibatis.annotations"), "{out}");
        assert!(out.contains("return userMapper.count();"));
    }

    #[test]
    fn test_crlf_source_yields_lf_output() {
        let options = RewriteOptions::default();
        let generator = generator_for(&USER_MAPPER.replace('\n', "\r\n"), &options);
        let out = generator.generate_text();
        assert!(!out.contains('\r'));
        assert_eq!(out, EXPECTED);
    }

    #[test]
    fn test_result_is_cached() {
        let options = RewriteOptions::default();
        let generator = generator(&options);
        let first = generator.generate() as *const GeneratedUnit;
        let second = generator.generate() as *const GeneratedUnit;
        assert_eq!(first, second);
        assert_eq!(generator.generate_text(), generator.generate_text());
    }

    #[test]
    fn test_generator_can_be_shared_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<ProxyGenerator<'static>>();
    }
}
