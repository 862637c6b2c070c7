use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::{
    mpsc::{UnboundedReceiver, UnboundedSender},
    Mutex,
};
use uuid::Uuid;

use crate::{
    configuration::SearchSettings,
    dal::search_session_db,
    domain::{
        industry::{profile_by_slug, IndustryProfile},
        search_result::RunSummary,
        search_session::SearchSession,
    },
};

use super::SearchCoordinator;

/// One queued coordination run, already validated and resolved to a profile.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub id: Uuid,
    pub profile: IndustryProfile,
    pub cities: Vec<String>,
    pub keywords: Vec<String>,
    pub max_searches: usize,
}

pub struct SearchRequestSender {
    pub sender: UnboundedSender<SearchRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunningSearch {
    pub id: Uuid,
    pub industry: String,
    pub cities: Vec<String>,
    pub keywords: Vec<String>,
    pub max_searches: usize,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStatus {
    pub is_running: bool,
    pub current: Option<RunningSearch>,
    pub last_summary: Option<RunSummary>,
    pub last_finished_at: Option<DateTime<Utc>>,
}

pub type SharedSearchStatus = Arc<Mutex<SearchStatus>>;

#[derive(Debug, Default, Deserialize)]
pub struct StartSearchBody {
    pub industry: Option<String>,
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub max_searches: Option<usize>,
}

impl StartSearchBody {
    /// Resolves the profile, applies its defaults for empty lists and checks
    /// the configured limits.
    pub fn into_request(self, settings: &SearchSettings) -> Result<SearchRequest, String> {
        let slug = self
            .industry
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| settings.default_industry.clone());
        let profile =
            profile_by_slug(&slug).ok_or_else(|| format!("Unknown industry: {}", slug))?;

        let cities = or_defaults(clean(self.cities), &profile.cities, settings.max_cities);
        let keywords = or_defaults(clean(self.keywords), &profile.keywords, settings.max_keywords);

        if cities.len() > settings.max_cities {
            return Err(format!("At most {} cities are allowed", settings.max_cities));
        }
        if keywords.len() > settings.max_keywords {
            return Err(format!("At most {} keywords are allowed", settings.max_keywords));
        }

        let max_searches = self.max_searches.unwrap_or(settings.max_searches);
        if max_searches == 0 || max_searches > settings.max_searches {
            return Err(format!(
                "max_searches must be between 1 and {}",
                settings.max_searches
            ));
        }

        Ok(SearchRequest {
            id: Uuid::new_v4(),
            profile,
            cities,
            keywords,
            max_searches,
        })
    }
}

fn clean(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn or_defaults(values: Vec<String>, defaults: &[String], limit: usize) -> Vec<String> {
    match values.is_empty() {
        true => defaults.iter().take(limit).cloned().collect(),
        false => values,
    }
}

/// Marks the status as running unless a run is already in progress.
pub async fn try_begin(status: &SharedSearchStatus, request: &SearchRequest) -> bool {
    let mut status = status.lock().await;
    if status.is_running {
        return false;
    }

    status.is_running = true;
    status.current = Some(RunningSearch {
        id: request.id,
        industry: request.profile.slug.clone(),
        cities: request.cities.clone(),
        keywords: request.keywords.clone(),
        max_searches: request.max_searches,
        started_at: Utc::now(),
    });
    true
}

/// Clears a run that was marked as started but never reached the handler.
pub async fn abandon(status: &SharedSearchStatus) {
    let mut status = status.lock().await;
    status.is_running = false;
    status.current = None;
}

async fn finish(status: &SharedSearchStatus, summary: RunSummary) {
    let mut status = status.lock().await;
    status.is_running = false;
    status.current = None;
    status.last_summary = Some(summary);
    status.last_finished_at = Some(Utc::now());
}

pub async fn search_handler(
    mut search_receiver: UnboundedReceiver<SearchRequest>,
    coordinator: SearchCoordinator,
    pool: PgPool,
    status: SharedSearchStatus,
) {
    log::info!("Started search handler");

    while let Some(request) = search_receiver.recv().await {
        let started_at = Utc::now();
        log::info!(
            "Running search {} for {} ({} queued)",
            request.id,
            request.profile.slug,
            search_receiver.len()
        );

        let summary = coordinator
            .run(
                &request.profile,
                &request.cities,
                &request.keywords,
                request.max_searches,
            )
            .await;

        let session = SearchSession::from_summary(
            request.id,
            &request.profile.slug,
            &request.cities,
            &request.keywords,
            request.max_searches,
            &summary,
            started_at,
        );
        if let Err(e) = search_session_db::insert_search_session(&pool, &session).await {
            log::error!("Failed to store search session {}: {:?}", request.id, e);
        }

        finish(&status, summary).await;
    }

    log::error!("Search request channel closed, search handler exiting");
}
