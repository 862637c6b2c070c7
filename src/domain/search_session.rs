use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::search_result::RunSummary;

/// Durable record of one finished coordination run.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct SearchSession {
    pub id: Uuid,
    pub industry: String,
    pub cities: Vec<String>,
    pub keywords: Vec<String>,
    pub max_searches: i32,
    pub queries_attempted: i32,
    pub accepted_count: i32,
    pub duplicate_count: i32,
    pub rejected_count: i32,
    pub error_count: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SearchSession {
    pub fn from_summary(
        id: Uuid,
        industry: &str,
        cities: &[String],
        keywords: &[String],
        max_searches: usize,
        summary: &RunSummary,
        started_at: DateTime<Utc>,
    ) -> Self {
        SearchSession {
            id,
            industry: industry.to_string(),
            cities: cities.to_vec(),
            keywords: keywords.to_vec(),
            max_searches: to_i32(max_searches),
            queries_attempted: to_i32(summary.queries_attempted),
            accepted_count: to_i32(summary.accepted_count),
            duplicate_count: to_i32(summary.duplicate_count),
            rejected_count: to_i32(summary.rejected_count),
            error_count: to_i32(summary.error_count),
            started_at,
            finished_at: Utc::now(),
        }
    }
}

fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
