//! End-to-end retrieval over the in-process stack.

use std::sync::Arc;

use resume_rag::application::{RagService, SessionIndex};
use resume_rag::domain::{assemble_context, Chunker, CollectionId, DomainError};
use resume_rag::infrastructure::{HashedEmbedding, InMemoryVectorIndex};

fn rag(chunk_size: usize, top_k: usize) -> RagService {
    let session = SessionIndex::new(
        Arc::new(HashedEmbedding::default()),
        Arc::new(InMemoryVectorIndex::new()),
        Chunker::contiguous(chunk_size).unwrap(),
    );
    RagService::new(Arc::new(session), top_k)
}

#[tokio::test]
async fn test_ingest_retrieve_assemble() {
    let rag = rag(7, 3);
    let c = CollectionId::new("alpha");

    let outcome = rag
        .session()
        .ingest(&c, "ALPHA BETA GAMMA DELTA")
        .await
        .unwrap();
    assert_eq!(outcome.chunk_count(), 4);

    let results = rag.retrieve(&c, "ETA GAM").await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].chunk.text, "ETA GAM");
    assert_eq!(results[0].chunk.ordinal, 1);

    let context = assemble_context(&results, 3000);
    assert!(context.starts_with("ETA GAM\n"));
    assert_eq!(context.lines().count(), 3);
}

#[tokio::test]
async fn test_each_chunk_retrieves_itself_first() {
    let rag = rag(30, 1);
    let c = CollectionId::new("resume");
    let text = "Jordan Lee, backend engineer. Six years of Rust and Go. \
                Led a team of five at Acme. BSc Computer Science, 2016. \
                Certified Kubernetes administrator.";
    rag.session().ingest(&c, text).await.unwrap();

    let chunker = Chunker::contiguous(30).unwrap();
    for piece in chunker.split(text) {
        let results = rag.retrieve(&c, piece).await.unwrap();
        assert_eq!(results[0].chunk.text, piece);
        assert!((results[0].score - 1.0).abs() < 1e-4);
    }
}

#[tokio::test]
async fn test_top_k_bounds() {
    let rag = rag(7, 3);
    let c = CollectionId::new("alpha");
    rag.session()
        .ingest(&c, "ALPHA BETA GAMMA DELTA")
        .await
        .unwrap();

    assert!(rag.retrieve_top_k(&c, "ALPHA", 0).await.unwrap().is_empty());
    assert_eq!(rag.retrieve_top_k(&c, "ALPHA", 2).await.unwrap().len(), 2);
    assert_eq!(rag.retrieve_top_k(&c, "ALPHA", 50).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_new_document_replaces_previous() {
    let rag = rag(20, 10);
    let first = CollectionId::new("first");
    let second = CollectionId::new("second");

    rag.session()
        .ingest(&first, "Worked at Initech on payroll systems.")
        .await
        .unwrap();
    rag.session()
        .ingest(&second, "Studied marine biology at the coast.")
        .await
        .unwrap();

    let err = rag.retrieve(&first, "payroll").await.unwrap_err();
    assert!(matches!(err, DomainError::UnknownCollection(_)));

    let results = rag.retrieve(&second, "payroll").await.unwrap();
    assert!(!results.is_empty());
    for r in &results {
        assert!(!r.chunk.text.contains("Initech"));
        assert!(!r.chunk.text.contains("payroll"));
    }
}

#[tokio::test]
async fn test_reset_same_collection_clears_chunks() {
    let rag = rag(10, 5);
    let c = CollectionId::new("c");
    rag.session().ingest(&c, "first resume text").await.unwrap();
    rag.session().reset(&c).await.unwrap();

    assert_eq!(rag.session().len(&c).await.unwrap(), 0);
    assert!(rag.retrieve(&c, "resume").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_before_any_ingest() {
    let rag = rag(10, 5);
    let err = rag
        .retrieve(&CollectionId::new("nothing"), "skills")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UnknownCollection(_)));
    assert!(rag.session().active_collection().await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ingests_never_interleave() {
    let rag = Arc::new(rag(8, 3));
    let text = "Staff engineer with a decade of distributed systems work.";
    let expected = Chunker::contiguous(8).unwrap().split(text).len();

    let mut handles = Vec::new();
    for i in 0..8 {
        let rag = rag.clone();
        handles.push(tokio::spawn(async move {
            let c = CollectionId::new(format!("upload-{i}"));
            rag.session().ingest(&c, text).await.unwrap();
            // Searches may race later uploads; a replaced collection is the
            // only acceptable failure.
            match rag.retrieve(&c, "distributed").await {
                Ok(results) => assert!(results.len() <= 3),
                Err(e) => assert!(matches!(e, DomainError::UnknownCollection(_))),
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let active = rag.session().active_collection().await.unwrap();
    assert_eq!(rag.session().len(&active).await.unwrap(), expected);
}
