//! Core domain for Parley: the structured-intent data model, the extraction
//! engine that produces it from free text, the external payload formatter,
//! the configuration contract, and the shared error taxonomy.
//!
//! Everything here is pure and I/O-free; transport, inference, and calendar
//! bindings live in their own crates and depend on this one.

pub mod config;
pub mod errors;
pub mod intent;
pub mod payload;

pub use errors::{InterfaceError, PipelineError};
pub use intent::{ExtractionResult, IntentExtractor, IntentKind};
pub use payload::IntentPayload;
