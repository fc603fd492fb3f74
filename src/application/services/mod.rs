mod analysis;
mod chat;
mod rag;
mod session;

pub use analysis::{AnalysisRequest, AnalysisService};
pub use chat::{ChatAnswer, ChatService, SourceRef};
pub use rag::RagService;
pub use session::{IngestOutcome, SessionIndex};
