use serde::{Deserialize, Serialize};

/// One unfiltered item returned by a search provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResult {
    pub title: String,
    pub snippet: String,
    pub link: String,
    pub business_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchTask {
    pub keyword: String,
    pub city: String,
    pub max_results: usize,
}

impl SearchTask {
    pub fn search_term(&self) -> String {
        format!("{} {}", self.keyword, self.city)
    }
}

/// Query parameters in the shape the Google-engine search API expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParams {
    pub q: String,
    pub location: String,
    pub hl: String,
    pub gl: String,
    pub google_domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<u8>,
}

/// Counters for one coordination pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub queries_attempted: usize,
    pub accepted_count: usize,
    pub duplicate_count: usize,
    pub rejected_count: usize,
    pub error_count: usize,
}
