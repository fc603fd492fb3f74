//! Application layer - Use cases and orchestration.
//!
//! Services here depend on domain ports (traits) rather than concrete
//! infrastructure, so tests can swap in in-memory or stub implementations.

pub mod services;

pub use services::{
    AnalysisRequest, AnalysisService, ChatAnswer, ChatService, IngestOutcome, RagService,
    SessionIndex, SourceRef,
};
