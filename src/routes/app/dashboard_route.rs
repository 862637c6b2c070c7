use std::collections::BTreeMap;

use actix_web::{get, web, HttpResponse};
use askama::Template;
use sqlx::PgPool;

use crate::{
    dal::stat_db::CountRow,
    domain::industry::{available_profiles, IndustryInfo},
    routes::stat_route::{collect_stats, LeadStats},
    services::{SearchStatus, SharedSearchStatus},
};

struct LeadRow {
    id: i64,
    name: String,
    contact: String,
    location: String,
    source: String,
    status: &'static str,
    created_at: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    total_leads: i64,
    total_emails: i64,
    by_source: Vec<CountRow>,
    by_status: Vec<CountRow>,
    leads: Vec<LeadRow>,
    industries: Vec<IndustryInfo>,
    status: SearchStatus,
}

impl DashboardTemplate {
    fn new(stats: LeadStats, status: SearchStatus) -> Self {
        let counts = |map: BTreeMap<String, i64>| -> Vec<CountRow> {
            map.into_iter()
                .map(|(label, count)| CountRow { label, count })
                .collect()
        };

        let leads = stats
            .recent_leads
            .into_iter()
            .map(|lead| LeadRow {
                id: lead.id,
                contact: [&lead.email, &lead.phone, &lead.website, &lead.profile_url]
                    .into_iter()
                    .flatten()
                    .next()
                    .cloned()
                    .unwrap_or_default(),
                location: lead.location.unwrap_or_default(),
                source: lead.source.to_string(),
                status: lead.status.as_str(),
                created_at: lead.created_at.format("%Y-%m-%d %H:%M").to_string(),
                name: lead.name,
            })
            .collect();

        DashboardTemplate {
            total_leads: stats.total_leads,
            total_emails: stats.total_emails,
            by_source: counts(stats.by_source),
            by_status: counts(stats.by_status),
            leads,
            industries: available_profiles().iter().map(IndustryInfo::from).collect(),
            status,
        }
    }
}

#[get("/dashboard")]
async fn dashboard(
    pool: web::Data<PgPool>,
    search_status: web::Data<SharedSearchStatus>,
) -> HttpResponse {
    let stats = match collect_stats(&pool).await {
        Ok(stats) => stats,
        Err(e) => {
            log::error!("Failed to collect dashboard stats: {:?}", e);
            return HttpResponse::InternalServerError().body("Failed to load dashboard");
        }
    };
    let status = search_status.lock().await.clone();

    match DashboardTemplate::new(stats, status).render() {
        Ok(html) => HttpResponse::Ok().content_type("text/html; charset=utf-8").body(html),
        Err(e) => {
            log::error!("Failed to render dashboard: {:?}", e);
            HttpResponse::InternalServerError().body("Failed to render dashboard")
        }
    }
}
