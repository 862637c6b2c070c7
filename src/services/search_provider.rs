use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    domain::search_result::{QueryParams, RawResult},
    error::SearchError,
};

pub const SERPAPI_SOURCE: &str = "SerpApi";

/// A keyword search backend. Implementations translate the provider wire
/// format into `RawResult`s and do no filtering of their own.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Tag written to `lead.source` for results from this provider.
    fn source_tag(&self) -> &str;

    async fn search(&self, params: &QueryParams) -> Result<Vec<RawResult>, SearchError>;
}

pub struct SerpApiClient {
    client: Client,
    api_key: String,
    url: String,
}

#[derive(Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    local_results: Option<LocalResults>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LocalResults {
    Places { places: Vec<LocalPlace> },
    List(Vec<LocalPlace>),
}

#[derive(Deserialize)]
struct LocalPlace {
    #[serde(default)]
    title: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    links: Option<PlaceLinks>,
}

#[derive(Deserialize)]
struct PlaceLinks {
    #[serde(default)]
    website: Option<String>,
}

impl SerpApiClient {
    pub fn new(api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create SerpApi HTTP client")?;

        Ok(SerpApiClient {
            client,
            api_key,
            url: "https://serpapi.com/search.json".to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    fn source_tag(&self) -> &str {
        SERPAPI_SOURCE
    }

    async fn search(&self, params: &QueryParams) -> Result<Vec<RawResult>, SearchError> {
        let res = self
            .client
            .get(&self.url)
            .query(&[("engine", "google"), ("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = res.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = res.text().await?;
        let results = parse_serpapi_response(&body)?;
        log::info!("SerpApi returned {} results for: {}", results.len(), params.q);

        Ok(results)
    }
}

/// Organic results first, then local pack places.
fn parse_serpapi_response(body: &str) -> Result<Vec<RawResult>, SearchError> {
    let response: SerpApiResponse = serde_json::from_str(body)?;

    if let Some(error) = response.error {
        // An exhausted query quota is reported in-band rather than as a 429
        return match error.to_lowercase().contains("run out of searches") {
            true => Err(SearchError::RateLimited),
            false => Err(SearchError::Provider(error)),
        };
    }

    let organic = response.organic_results.into_iter().map(|r| RawResult {
        title: r.title,
        snippet: r.snippet,
        link: r.link,
        ..Default::default()
    });

    let places = match response.local_results {
        Some(LocalResults::Places { places }) => places,
        Some(LocalResults::List(places)) => places,
        None => vec![],
    };
    let local = places.into_iter().map(|p| {
        let website = p.links.and_then(|l| l.website);
        RawResult {
            title: p.title.clone(),
            snippet: p.description.unwrap_or_default(),
            link: website.clone().unwrap_or_default(),
            business_name: Some(p.title),
            phone: p.phone,
            address: p.address,
            website,
        }
    });

    Ok(organic.chain(local).collect())
}
