use std::collections::BTreeMap;

use actix_web::{get, web, HttpResponse};
use serde::Serialize;
use sqlx::PgPool;

use crate::{
    dal::{lead_db, stat_db},
    domain::lead::{Lead, LeadFilter},
};

use super::lead_route::error_response;

const RECENT_LEADS: i64 = 10;

#[derive(Serialize)]
pub struct LeadStats {
    pub total_leads: i64,
    pub total_emails: i64,
    pub by_source: BTreeMap<String, i64>,
    pub by_status: BTreeMap<String, i64>,
    pub recent_leads: Vec<Lead>,
}

pub async fn collect_stats(pool: &PgPool) -> Result<LeadStats, sqlx::Error> {
    Ok(LeadStats {
        total_leads: lead_db::count_leads(pool).await?,
        total_emails: stat_db::count_generated_emails(pool).await?,
        by_source: stat_db::aggregate_by_source(pool).await?,
        by_status: stat_db::aggregate_by_status(pool).await?,
        recent_leads: lead_db::list_leads(pool, &LeadFilter::default(), RECENT_LEADS, 0).await?,
    })
}

#[get("/stats")]
async fn stats(pool: web::Data<PgPool>) -> HttpResponse {
    match collect_stats(&pool).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => {
            log::error!("Failed to collect stats: {:?}", e);
            error_response(HttpResponse::InternalServerError(), "Failed to collect stats")
        }
    }
}
