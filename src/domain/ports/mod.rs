mod analysis_store;
mod embedding;
mod generator;
mod vector_index;

pub use analysis_store::AnalysisStore;
pub use embedding::EmbeddingService;
pub use generator::AnswerGenerator;
pub use vector_index::VectorIndex;
