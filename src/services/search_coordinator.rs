use std::{sync::Arc, time::Duration};

use itertools::Itertools;

use crate::{
    domain::{
        contact,
        industry::IndustryProfile,
        lead::{LeadSource, LeadStatus, NewLead},
        search_result::{QueryParams, RawResult, RunSummary, SearchTask},
    },
    error::{LeadError, SearchError},
};

use super::{LeadStore, SaveOutcome, SearchProvider};

/// Runs keyword × city searches one pair at a time and persists the accepted,
/// previously unseen leads in enumeration order.
#[derive(Clone)]
pub struct SearchCoordinator {
    provider: Arc<dyn SearchProvider>,
    store: LeadStore,
    results_per_query: usize,
    rate_limit_backoff: Duration,
}

impl SearchCoordinator {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        store: LeadStore,
        results_per_query: usize,
        rate_limit_backoff: Duration,
    ) -> Self {
        SearchCoordinator {
            provider,
            store,
            results_per_query,
            rate_limit_backoff,
        }
    }

    pub async fn run(
        &self,
        profile: &IndustryProfile,
        cities: &[String],
        keywords: &[String],
        max_searches: usize,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        let tasks = build_work_list(keywords, cities, max_searches, self.results_per_query);

        log::info!(
            "Starting {} search run with {} queries ({} keywords x {} cities, cap {})",
            profile.name,
            tasks.len(),
            keywords.len(),
            cities.len(),
            max_searches
        );

        for (i, task) in tasks.iter().enumerate() {
            summary.queries_attempted += 1;
            let params = profile.build_query(&task.keyword, &task.city);

            let results = match self.search_with_retry(&params).await {
                Ok(results) => results,
                Err(e) => {
                    log::error!(
                        "Search {}/{} failed for '{}': {}",
                        i + 1,
                        tasks.len(),
                        task.search_term(),
                        e
                    );
                    summary.error_count += 1;
                    continue;
                }
            };

            log::info!(
                "Search {}/{} '{}' returned {} results",
                i + 1,
                tasks.len(),
                task.search_term(),
                results.len()
            );

            for result in results.into_iter().take(task.max_results) {
                if !profile.classify(&result) {
                    log::debug!("Rejected result: {}", result.title);
                    summary.rejected_count += 1;
                    continue;
                }

                let source = LeadSource::Provider(self.provider.source_tag().to_string());
                let candidate = candidate_from_result(result, task, source);

                match self.store.save_if_new(candidate).await {
                    Ok(SaveOutcome::Saved(lead)) => {
                        log::info!("Saved lead {} with id {}", lead.name, lead.id);
                        summary.accepted_count += 1;
                    }
                    Ok(SaveOutcome::Duplicate(lead)) => {
                        log::info!("Lead {} already exists with id {}", lead.name, lead.id);
                        summary.duplicate_count += 1;
                    }
                    Err(LeadError::Validation(reason)) => {
                        log::warn!("Discarding candidate from '{}': {}", task.search_term(), reason);
                        summary.error_count += 1;
                    }
                    Err(e @ LeadError::Persistence(_)) => {
                        log::error!("{}: {:?}", e, e);
                        summary.error_count += 1;
                    }
                }
            }
        }

        log::info!(
            "Search run finished: {} queries, {} accepted, {} duplicates, {} rejected, {} errors",
            summary.queries_attempted,
            summary.accepted_count,
            summary.duplicate_count,
            summary.rejected_count,
            summary.error_count
        );

        summary
    }

    /// A rate-limited query is retried once after the backoff delay.
    async fn search_with_retry(
        &self,
        params: &QueryParams,
    ) -> Result<Vec<RawResult>, SearchError> {
        match self.provider.search(params).await {
            Err(e) if e.is_rate_limited() => {
                log::warn!(
                    "Rate limited on '{}', retrying in {:?}",
                    params.q,
                    self.rate_limit_backoff
                );
                tokio::time::sleep(self.rate_limit_backoff).await;
                self.provider.search(params).await
            }
            other => other,
        }
    }
}

/// Keyword-major cross product truncated to `max_searches` pairs.
pub fn build_work_list(
    keywords: &[String],
    cities: &[String],
    max_searches: usize,
    max_results: usize,
) -> Vec<SearchTask> {
    keywords
        .iter()
        .cartesian_product(cities.iter())
        .take(max_searches)
        .map(|(keyword, city)| SearchTask {
            keyword: keyword.clone(),
            city: city.clone(),
            max_results,
        })
        .collect()
}

pub fn candidate_from_result(result: RawResult, task: &SearchTask, source: LeadSource) -> NewLead {
    let name = result
        .business_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(result.title);

    let (profile_url, link_website) = match result.link.trim() {
        "" => (None, None),
        link if contact::is_social_profile(link) => (Some(link.to_string()), None),
        link => (None, Some(link.to_string())),
    };

    NewLead {
        name,
        email: contact::find_email(&result.snippet),
        phone: result.phone,
        profile_url,
        website: result.website.or(link_website),
        description: result.snippet,
        location: Some(task.city.clone()),
        search_term: Some(task.search_term()),
        source,
        status: LeadStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use async_trait::async_trait;

    use super::{build_work_list, candidate_from_result, SearchCoordinator};
    use crate::{
        domain::{
            industry::{medical_aesthetics, IndustryProfile},
            lead::{LeadSource, LeadStatus},
            search_result::{QueryParams, RawResult, SearchTask},
        },
        error::SearchError,
        services::{lead_gateway::testing::MemoryGateway, LeadStore, SearchProvider},
    };

    type Responder = Box<dyn Fn(usize, &QueryParams) -> Result<Vec<RawResult>, SearchError> + Send + Sync>;

    struct StubProvider {
        calls: Mutex<Vec<QueryParams>>,
        responder: Responder,
    }

    impl StubProvider {
        fn new(responder: Responder) -> Arc<Self> {
            Arc::new(StubProvider {
                calls: Mutex::default(),
                responder,
            })
        }

        fn queries(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|p| p.q.clone()).collect()
        }
    }

    #[async_trait]
    impl SearchProvider for StubProvider {
        fn source_tag(&self) -> &str {
            "SerpApi"
        }

        async fn search(&self, params: &QueryParams) -> Result<Vec<RawResult>, SearchError> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(params.clone());
                calls.len() - 1
            };
            (self.responder)(index, params)
        }
    }

    fn clinic(title: &str, link: &str) -> RawResult {
        RawResult {
            title: title.to_string(),
            snippet: "Clínica de medicina estética".to_string(),
            link: link.to_string(),
            ..Default::default()
        }
    }

    /// One distinct clinic per query, derived from the location.
    fn clinic_per_query() -> Responder {
        Box::new(|_, params| {
            Ok(vec![clinic(
                &format!("Clínica {} {}", params.location, params.q.len()),
                &format!("https://{}-{}.es", params.location, params.q.len()),
            )])
        })
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn coordinator(provider: Arc<StubProvider>, gateway: Arc<MemoryGateway>) -> SearchCoordinator {
        SearchCoordinator::new(provider, LeadStore::new(gateway), 5, Duration::ZERO)
    }

    #[tokio::test]
    async fn single_accepted_result_is_persisted_as_pending() {
        let provider = StubProvider::new(Box::new(|_, _| {
            Ok(vec![clinic("Clínica X", "https://clinicax.es")])
        }));
        let gateway = Arc::new(MemoryGateway::default());
        let profile = medical_aesthetics();

        let summary = coordinator(provider, gateway.clone())
            .run(&profile, &strings(&["madrid"]), &strings(&["botox"]), 10)
            .await;

        assert_eq!(summary.accepted_count, 1);
        assert_eq!(summary.duplicate_count, 0);
        assert_eq!(summary.error_count, 0);

        let leads = gateway.leads.lock().unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "Clínica X");
        assert_eq!(leads[0].website.as_deref(), Some("https://clinicax.es"));
        assert_eq!(leads[0].source, LeadSource::Provider("SerpApi".to_string()));
        assert_eq!(leads[0].status, LeadStatus::Pending);
        assert_eq!(leads[0].search_term.as_deref(), Some("botox madrid"));
    }

    #[tokio::test]
    async fn second_identical_run_only_finds_duplicates() {
        let provider = StubProvider::new(clinic_per_query());
        let gateway = Arc::new(MemoryGateway::default());
        let profile = medical_aesthetics();
        let cities = strings(&["madrid", "barcelona"]);
        let keywords = strings(&["botox", "profhilo"]);
        let coordinator = coordinator(provider, gateway.clone());

        let first = coordinator.run(&profile, &cities, &keywords, 4).await;
        let second = coordinator.run(&profile, &cities, &keywords, 4).await;

        assert_eq!(first.accepted_count, 4);
        assert_eq!(second.accepted_count, 0);
        assert_eq!(second.duplicate_count, first.accepted_count);
        assert_eq!(gateway.names().len(), 4);
    }

    #[tokio::test]
    async fn leads_are_persisted_in_keyword_major_order() {
        let provider = StubProvider::new(Box::new(|_, params| {
            let keyword = params.q.split('"').nth(1).unwrap_or_default().to_string();
            Ok((1..=2)
                .map(|n| {
                    clinic(
                        &format!("Clínica {} {} {}", keyword, params.location, n),
                        &format!("https://{}-{}-{}.es", keyword, params.location, n),
                    )
                })
                .collect())
        }));
        let gateway = Arc::new(MemoryGateway::default());
        let profile = medical_aesthetics();

        let summary = coordinator(provider, gateway.clone())
            .run(
                &profile,
                &strings(&["madrid", "barcelona"]),
                &strings(&["botox", "profhilo", "juvederm"]),
                5,
            )
            .await;

        let expected: Vec<String> = [
            ("botox", "madrid"),
            ("botox", "barcelona"),
            ("profhilo", "madrid"),
            ("profhilo", "barcelona"),
            ("juvederm", "madrid"),
        ]
        .iter()
        .flat_map(|(k, c)| (1..=2).map(move |n| format!("Clínica {} {} {}", k, c, n)))
        .collect();

        assert_eq!(summary.accepted_count, 10);
        assert_eq!(gateway.names(), expected);
    }

    #[tokio::test]
    async fn cap_limits_queries_in_enumeration_order() {
        let provider = StubProvider::new(Box::new(|_, _| Ok(vec![])));
        let gateway = Arc::new(MemoryGateway::default());
        let profile = medical_aesthetics();

        let summary = coordinator(provider.clone(), gateway)
            .run(&profile, &strings(&["A", "B"]), &strings(&["k1", "k2", "k3"]), 4)
            .await;

        let expected: Vec<String> = [("k1", "A"), ("k1", "B"), ("k2", "A"), ("k2", "B")]
            .iter()
            .map(|(k, c)| profile.build_query(k, c).q)
            .collect();

        assert_eq!(summary.queries_attempted, 4);
        assert_eq!(provider.queries(), expected);
    }

    #[tokio::test]
    async fn provider_error_does_not_stop_the_run() {
        let inner = clinic_per_query();
        let provider = StubProvider::new(Box::new(move |index, params| match index {
            1 => Err(SearchError::Provider("boom".to_string())),
            _ => inner(index, params),
        }));
        let gateway = Arc::new(MemoryGateway::default());
        let profile = medical_aesthetics();

        let summary = coordinator(provider.clone(), gateway.clone())
            .run(
                &profile,
                &strings(&["madrid", "barcelona"]),
                &strings(&["botox", "profhilo"]),
                4,
            )
            .await;

        assert_eq!(provider.queries().len(), 4);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.accepted_count, 3);
        assert_eq!(gateway.names().len(), 3);
    }

    #[tokio::test]
    async fn rate_limited_query_is_retried_once() {
        let inner = clinic_per_query();
        let provider = StubProvider::new(Box::new(move |index, params| match index {
            0 => Err(SearchError::RateLimited),
            _ => inner(index, params),
        }));
        let gateway = Arc::new(MemoryGateway::default());
        let profile = medical_aesthetics();

        let summary = coordinator(provider.clone(), gateway)
            .run(&profile, &strings(&["madrid"]), &strings(&["botox"]), 1)
            .await;

        assert_eq!(provider.queries().len(), 2);
        assert_eq!(summary.error_count, 0);
        assert_eq!(summary.accepted_count, 1);
    }

    #[tokio::test]
    async fn repeated_rate_limit_counts_one_error_and_moves_on() {
        let inner = clinic_per_query();
        let provider = StubProvider::new(Box::new(move |index, params| match index {
            0 | 1 => Err(SearchError::RateLimited),
            _ => inner(index, params),
        }));
        let gateway = Arc::new(MemoryGateway::default());
        let profile = medical_aesthetics();

        let summary = coordinator(provider.clone(), gateway)
            .run(&profile, &strings(&["madrid", "barcelona"]), &strings(&["botox"]), 2)
            .await;

        assert_eq!(provider.queries().len(), 3);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.accepted_count, 1);
    }

    #[tokio::test]
    async fn rejected_and_invalid_results_are_counted_not_saved() {
        let provider = StubProvider::new(Box::new(|_, _| {
            Ok(vec![
                clinic("Ferretería López", "https://ferreteria.es").with_snippet("Herramientas"),
                clinic("", "https://clinica-sin-nombre.es"),
                clinic("Clínica X", "https://clinicax.es"),
            ])
        }));
        let gateway = Arc::new(MemoryGateway::default());
        let profile = medical_aesthetics();

        let summary = coordinator(provider, gateway.clone())
            .run(&profile, &strings(&["madrid"]), &strings(&["botox"]), 1)
            .await;

        assert_eq!(summary.rejected_count, 1);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.accepted_count, 1);
        assert_eq!(gateway.names(), vec!["Clínica X".to_string()]);
    }

    #[tokio::test]
    async fn persistence_failure_is_counted_and_run_continues() {
        let provider = StubProvider::new(Box::new(|_, _| {
            Ok(vec![
                clinic("Clínica Rota", "https://rota.es"),
                clinic("Clínica X", "https://clinicax.es"),
            ])
        }));
        let gateway = Arc::new(MemoryGateway::failing_on(&["Clínica Rota"]));
        let profile = medical_aesthetics();

        let summary = coordinator(provider, gateway.clone())
            .run(&profile, &strings(&["madrid"]), &strings(&["botox"]), 1)
            .await;

        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.accepted_count, 1);
    }

    #[tokio::test]
    async fn only_the_first_results_per_query_are_considered() {
        let provider = StubProvider::new(Box::new(|_, _| {
            Ok((0..8)
                .map(|i| clinic(&format!("Clínica {}", i), &format!("https://c{}.es", i)))
                .collect())
        }));
        let gateway = Arc::new(MemoryGateway::default());
        let profile = medical_aesthetics();

        let summary = coordinator(provider, gateway)
            .run(&profile, &strings(&["madrid"]), &strings(&["botox"]), 1)
            .await;

        assert_eq!(summary.accepted_count, 5);
    }

    #[tokio::test]
    async fn custom_classifier_is_honoured() {
        fn reject_all(_: &IndustryProfile, _: &RawResult) -> bool {
            false
        }

        let provider = StubProvider::new(Box::new(|_, _| {
            Ok(vec![clinic("Clínica X", "https://clinicax.es")])
        }));
        let gateway = Arc::new(MemoryGateway::default());
        let profile = medical_aesthetics().with_classifier(reject_all);

        let summary = coordinator(provider, gateway)
            .run(&profile, &strings(&["madrid"]), &strings(&["botox"]), 1)
            .await;

        assert_eq!(summary.rejected_count, 1);
        assert_eq!(summary.accepted_count, 0);
    }

    #[test]
    fn work_list_is_keyword_major_and_capped() {
        let tasks = build_work_list(
            &strings(&["k1", "k2", "k3"]),
            &strings(&["A", "B"]),
            4,
            5,
        );
        let pairs: Vec<(&str, &str)> = tasks
            .iter()
            .map(|t| (t.keyword.as_str(), t.city.as_str()))
            .collect();

        assert_eq!(pairs, vec![("k1", "A"), ("k1", "B"), ("k2", "A"), ("k2", "B")]);
    }

    #[test]
    fn work_list_shorter_than_cap_is_not_padded() {
        let tasks = build_work_list(&strings(&["k1"]), &strings(&["A"]), 10, 5);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn candidate_maps_social_links_and_structured_fields() {
        let task = SearchTask {
            keyword: "botox".to_string(),
            city: "madrid".to_string(),
            max_results: 5,
        };
        let result = RawResult {
            title: "Clínica X | Instagram".to_string(),
            snippet: "Escríbenos a info@clinicax.es".to_string(),
            link: "https://www.instagram.com/clinicax".to_string(),
            business_name: Some("Clínica X".to_string()),
            phone: Some("+34 911 222 333".to_string()),
            address: None,
            website: Some("https://clinicax.es".to_string()),
        };

        let lead = candidate_from_result(result, &task, LeadSource::Provider("SerpApi".to_string()));

        assert_eq!(lead.name, "Clínica X");
        assert_eq!(lead.email.as_deref(), Some("info@clinicax.es"));
        assert_eq!(lead.profile_url.as_deref(), Some("https://www.instagram.com/clinicax"));
        assert_eq!(lead.website.as_deref(), Some("https://clinicax.es"));
        assert_eq!(lead.location.as_deref(), Some("madrid"));
    }

    trait WithSnippet {
        fn with_snippet(self, snippet: &str) -> Self;
    }

    impl WithSnippet for RawResult {
        fn with_snippet(mut self, snippet: &str) -> Self {
            self.snippet = snippet.to_string();
            self
        }
    }
}
