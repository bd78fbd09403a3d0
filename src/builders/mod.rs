// This file is the module declaration file for the `builders` module.
// It declares and makes public all the sub-modules within the `src/builders`
// directory. Together they turn mapper interface sources into delegating
// service class sources.

// `syntax` module:
// Low level cursor helpers shared by every rewriting pass. They walk the
// source text by byte offset, skip string and char literals, find matching
// brackets and split lists on top-level separators only.
pub mod syntax;

// `model` module:
// The plain data records passed between the passes: the scanned
// `SourceRecord`, the `TargetDescriptor`, the `RewriteOptions` every pass
// reads from, and the final `GeneratedUnit` with its `StructuralMatch` report.
pub mod model;

// `comments` module:
// The first pass. Removes block and line comments so that later passes never
// match declarations that only exist inside a comment.
pub mod comments;

// `imports` module:
// The second pass. Collects the import statements, applies the
// add/remove/blacklist rules and replaces the package statement with the
// target package followed by the sorted import block.
pub mod imports;

// `methods` module:
// The third pass. Parses each abstract method of the interface and replaces
// it with an `@Override` stub that forwards the call to the injected mapper.
pub mod methods;

// `header` module:
// The fourth pass. Replaces the interface declaration with the class
// declaration, its doc block and the injected field.
pub mod header;

// `proxy` module:
// Runs the four passes in order for one mapper and caches the result.
pub mod proxy;

// `merger` module:
// Combines the generated units of one merge group into a single service class.
pub mod merger;

// `scanner` module:
// Lists and reads mapper files from the configured directories and groups
// them into merge groups.
pub mod scanner;

// `reporter` module:
// The `StatusReporter` trait and its `ConsoleReporter` implementation, which
// prints what a run wrote, skipped and could not fully match.
pub mod reporter;

// `validator` module:
// This module is dedicated to ensuring the integrity and correctness of
// the configuration. It defines the `ConfigValidator` trait and a
// `StandardValidator` implementation.
pub mod validator;
