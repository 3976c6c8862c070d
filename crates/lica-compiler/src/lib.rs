//! LICA Payload Compiler
//!
//! This crate compiles the raw LICA source documents (taxonomy hierarchy,
//! domain rules, keyword lists, stopwords and optional site groups) into a
//! single [`RulePayload`](lica_core::RulePayload).

pub mod parser;
pub mod optimizer;
pub mod builder;

pub use builder::{build_payload, CompileStats};
pub use optimizer::{optimize_payload, OptimizeStats};
pub use parser::{parse_sources, CompileError, SourceSet, SourceTexts};
