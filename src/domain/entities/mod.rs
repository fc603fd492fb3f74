mod analysis;
mod context;
mod conversation;
mod document;
mod embedding;

pub use analysis::{extract_score, parse_match_score, AnalysisRecord, DEFAULT_MATCH_SCORE};
pub use context::{assemble_context, assemble_context_with_count};
pub use conversation::{render_history, Message, MessageRole, Query};
pub use document::{Chunk, Chunker, CollectionId, Document, SearchResult};
pub use embedding::Embedding;
