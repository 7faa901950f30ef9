//! Inference engine lifecycle and backend boundary.
//!
//! The engine owns a single process-wide readiness transition
//! (uninitialized → ready, exactly once, safe under concurrent first
//! callers) and fronts a pluggable [`backend::InferenceBackend`]. The
//! bundled [`backend::StubBackend`] is a deterministic case transform;
//! real backends are opaque beyond the trait contract and callers must
//! rely only on structure after extraction, never on exact bytes.

pub mod backend;
pub mod engine;

pub use backend::{InferenceBackend, StubBackend};
pub use engine::{EngineError, InferenceEngine};
