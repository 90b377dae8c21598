//! kumo-core - Analysis engine for web-components codebases
//!
//! This crate provides the core analysis functionality:
//! - URL model and package-aware resolution
//! - Async URL loaders with per-URL load dedup
//! - Markup and script parsers (byte-level HTML tree, swc for ECMAScript)
//! - Per-language scanner registries over a single AST traversal
//! - The two-phase resolver and the queryable document graph
//! - Structured warnings with stable codes

pub mod analyzer;
pub mod config;
mod context;
pub mod document;
pub mod eval;
pub mod features;
pub mod jsdoc;
pub mod loader;
pub mod parser;
mod resolver;
pub mod scanners;
pub mod text;
pub mod urls;
pub mod warnings;

pub use analyzer::{Analysis, Analyzer, AnalyzerError, AnalyzerOptions};
pub use document::{Document, DocumentGraph, DocumentRef, FeatureQuery, ScannedDocument};
pub use features::{Feature, FeatureId, ScannedFeature};
pub use urls::{FileRelativeUrl, PackageRelativeUrl, PackageUrlResolver, ResolvedUrl};
pub use warnings::{Severity, SourcePosition, SourceRange, Warning};
