use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;

use crate::{
    configuration::SearchSettings,
    routes::{
        dashboard_route, default_route, industry_route, lead_route, report_route, search_route,
        stat_route,
    },
    services::{LeadStore, OpenaiClient, SearchRequestSender, SharedSearchStatus},
};

pub fn run(
    listener: TcpListener,
    db_pool: PgPool,
    lead_store: LeadStore,
    openai_client: OpenaiClient,
    search_sender: SearchRequestSender,
    search_status: SharedSearchStatus,
    search_settings: SearchSettings,
) -> Result<Server, std::io::Error> {
    let db_pool = web::Data::new(db_pool);
    let lead_store = web::Data::new(lead_store);
    let openai_client = web::Data::new(openai_client);
    let search_sender = web::Data::new(search_sender);
    let search_status = web::Data::new(search_status);
    let search_settings = web::Data::new(search_settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(dashboard_route::dashboard)
            .service(
                web::scope("/api")
                    .service(search_route::start_search)
                    .service(search_route::get_search_status)
                    .service(stat_route::stats)
                    .service(lead_route::list_leads)
                    .service(lead_route::search_leads)
                    .service(lead_route::get_lead)
                    .service(lead_route::add_lead)
                    .service(lead_route::update_lead_status)
                    .service(lead_route::generate_email)
                    .service(lead_route::list_emails)
                    .service(industry_route::list_industries)
                    .service(industry_route::get_industry)
                    .service(report_route::list_reports)
                    .service(report_route::run_report),
            )
            .app_data(db_pool.clone())
            .app_data(lead_store.clone())
            .app_data(openai_client.clone())
            .app_data(search_sender.clone())
            .app_data(search_status.clone())
            .app_data(search_settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
