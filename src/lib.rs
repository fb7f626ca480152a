//! Route Compass - Route metadata extraction from annotated handler declarations.
//!
//! This library walks a tree of declarations (classes, methods, parameters, fields),
//! finds the methods carrying request-mapping annotations and resolves, for each of
//! them, the full route: paths joined across the enclosing declarations, HTTP methods,
//! consumed and produced media types, request parameters and a field-level description
//! of the request and response payload types. The routes are grouped by declaring class
//! and written as a plain-text report.
//!
//! # Declaration Sources
//!
//! - **Rust sources**: `#[request_mapping]`, `#[get_mapping]`, ... attributes on structs,
//!   inherent `impl` blocks and their methods (see [`declaration::source`])
//! - **Declaration models**: YAML or JSON files describing the tree directly
//!   (see [`declaration::model`])
//!
//! Any other host can plug in by implementing [`declaration::DeclarationTree`].
//!
//! # Architecture
//!
//! 1. [`scanner`] - Classifies the input and finds Rust source files
//! 2. [`parser`] - Parses Rust source files into syntax trees
//! 3. [`declaration`] - The declaration tree abstraction and its providers
//! 4. [`annotation`] - Normalizes mapping annotations into one descriptor shape
//! 5. [`resolver`] - Merges route attributes across enclosing declarations
//! 6. [`introspector`] - Describes payload types as field lists
//! 7. [`registry`] - Groups routes by declaring class
//! 8. [`serializer`] - Renders the report and merges it into the output directory
//! 9. [`pass`] - Ties the steps together into one resolution pass
//!
//! # Example Usage
//!
//! ```no_run
//! use route_compass::{
//!     config::CompassConfig,
//!     declaration::source::SourceCollector,
//!     parser::AstParser,
//!     pass,
//!     scanner::FileScanner,
//! };
//! use std::path::{Path, PathBuf};
//!
//! let root = PathBuf::from("./my-service");
//! let scan_result = FileScanner::new(root.clone()).scan().unwrap();
//! let parsed_files = AstParser::parse_files(&scan_result.rust_files);
//! let model = SourceCollector::new(root).collect(&parsed_files);
//!
//! let config = CompassConfig::default();
//! let (output, report) = pass::run_and_write(&model, &config, Path::new("./generated")).unwrap();
//! println!("{} routes written to {}", output.registry.route_count(), report.display());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod annotation;
pub mod cli;
pub mod config;
pub mod declaration;
pub mod error;
pub mod introspector;
pub mod parser;
pub mod pass;
pub mod registry;
pub mod resolver;
pub mod route;
pub mod scanner;
pub mod serializer;
