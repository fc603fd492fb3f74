use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::domain::{CollectionId, DomainError};

/// Score recorded when the generator's report carries no usable score.
pub const DEFAULT_MATCH_SCORE: u8 = 0;

/// A completed résumé analysis, as kept in the history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub filename: String,
    pub job_role: Option<String>,
    pub company_name: Option<String>,
    pub match_score: u8,
    pub score_parsed: bool,
    pub report: String,
    pub collection_id: CollectionId,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(
        filename: impl Into<String>,
        collection_id: CollectionId,
        report: impl Into<String>,
    ) -> Self {
        let report = report.into();
        let (match_score, score_parsed) = match parse_match_score(&report) {
            Ok(score) => (score, true),
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default match score");
                (DEFAULT_MATCH_SCORE, false)
            }
        };

        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            job_role: None,
            company_name: None,
            match_score,
            score_parsed,
            report,
            collection_id,
            chunk_count: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_job_role(mut self, job_role: Option<String>) -> Self {
        self.job_role = job_role;
        self
    }

    pub fn with_company_name(mut self, company_name: Option<String>) -> Self {
        self.company_name = company_name;
        self
    }

    pub fn with_chunk_count(mut self, chunk_count: usize) -> Self {
        self.chunk_count = chunk_count;
        self
    }
}

fn score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Label, then up to a few non-word characters on the same line
    // (":", "**", "(", "#"), then the number.
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)match[ \t_-]*score[^\w\n]{0,8}(\d{1,3})\b")
            .expect("score pattern is a valid regex")
    })
}

/// Finds the first `MATCH SCORE` label followed by an integer in `0..=100`.
///
/// Out-of-range numbers are skipped and the scan continues.
pub fn extract_score(report: &str) -> Option<u8> {
    score_pattern()
        .captures_iter(report)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u8>().ok())
        .find(|score| *score <= 100)
}

pub fn parse_match_score(report: &str) -> Result<u8, DomainError> {
    extract_score(report).ok_or_else(|| {
        DomainError::MalformedGeneratorOutput("no MATCH SCORE between 0 and 100".to_string())
    })
}
