use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::dal::report_db::{self, Report};

use super::lead_route::error_response;

const DEFAULT_REPORT_LIMIT: i64 = 50;
const MAX_REPORT_LIMIT: i64 = 500;

#[derive(Deserialize)]
struct ReportQuery {
    limit: Option<i64>,
}

#[get("/reports")]
async fn list_reports() -> HttpResponse {
    let names: Vec<&str> = Report::ALL.iter().map(Report::name).collect();
    HttpResponse::Ok().json(names)
}

#[get("/reports/{name}")]
async fn run_report(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    query: web::Query<ReportQuery>,
) -> HttpResponse {
    let report = match Report::from_name(&path) {
        Some(report) => report,
        None => return error_response(HttpResponse::NotFound(), "Unknown report"),
    };
    let limit = query
        .limit
        .unwrap_or(DEFAULT_REPORT_LIMIT)
        .clamp(1, MAX_REPORT_LIMIT);

    match report_db::run_report(&pool, report, limit).await {
        Ok(output) => HttpResponse::Ok().json(output),
        Err(e) => {
            log::error!("Failed to run report {}: {:?}", report.name(), e);
            error_response(HttpResponse::InternalServerError(), "Failed to run report")
        }
    }
}
