use std::{net::TcpListener, sync::Arc, time::Duration};

use anyhow::Context;
use ekslens::{
    configuration::get_configuration,
    services::{
        search_handler, LeadStore, OpenaiClient, PgLeadGateway, SearchCoordinator,
        SearchRequest, SearchRequestSender, SearchStatus, SerpApiClient,
    },
    startup::run,
};
use env_logger::Env;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::{mpsc, Mutex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;

    let pool_options = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(15 * 60)) // 15 minutes
        .max_lifetime(None);

    let connection_pool = pool_options.connect_lazy_with(configuration.database.with_db());
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .context("Failed to run database migrations")?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    log::info!("Listening on {}", address);

    if configuration.api_keys.serpapi.is_empty() {
        log::warn!("No SerpApi key configured, searches will fail");
    }
    let search = configuration.search.clone();
    let provider = SerpApiClient::new(
        configuration.api_keys.serpapi,
        Duration::from_secs(search.request_timeout_secs),
    )?;
    // Shared by the search runner and the manual lead route
    let lead_store = LeadStore::new(Arc::new(PgLeadGateway::new(connection_pool.clone())));
    let coordinator = SearchCoordinator::new(
        Arc::new(provider),
        lead_store.clone(),
        search.results_per_query,
        Duration::from_secs(search.rate_limit_backoff_secs),
    );
    let openai_client = OpenaiClient::new(configuration.api_keys.openai);

    let (search_sender, search_receiver) = mpsc::unbounded_channel::<SearchRequest>();
    let search_sender = SearchRequestSender {
        sender: search_sender,
    };
    let search_status = Arc::new(Mutex::new(SearchStatus::default()));

    // Spawn background tasks
    let pool_clone = connection_pool.clone();
    let status_clone = search_status.clone();
    tokio::spawn(async move {
        search_handler(search_receiver, coordinator, pool_clone, status_clone).await
    });

    run(
        listener,
        connection_pool,
        lead_store,
        openai_client,
        search_sender,
        search_status,
        search,
    )?
    .await?;

    Ok(())
}
