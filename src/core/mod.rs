// This file is the module declaration file for the `core` module.
// In Rust, a `mod.rs` file within a directory (e.g., `src/core/`)
// serves two main purposes:
//
// 1. It declares the submodules contained within that directory.
// 2. It exposes these submodules to the parent module (`src/` in this case),
//    making them accessible to the entire crate.

// `config` module:
// This module is responsible for managing the application's configuration.
// It defines the data structures for the configuration file (`MsblConfig`),
// provides a `ConfigProvider` trait for abstracting configuration access, and
// includes a `ConfigManager` to locate, load, save and validate the file in
// YAML, JSON or TOML.
pub mod config;

// `engine` module:
// The `GenerateEngine` runs the `generate` and `build` commands: it scans
// the mapper directories, drives the generators, merges their output and
// writes the target files, asking before it overwrites anything.
pub mod engine;

// `error` module:
// The typed errors reported to the user at the command line boundary.
pub mod error;
