use actix_web::{get, web, HttpResponse};

use crate::domain::industry::{available_profiles, profile_by_slug, IndustryInfo};

use super::lead_route::error_response;

#[get("/industries")]
async fn list_industries() -> HttpResponse {
    let industries: Vec<IndustryInfo> = available_profiles().iter().map(IndustryInfo::from).collect();
    HttpResponse::Ok().json(industries)
}

#[get("/industries/{slug}")]
async fn get_industry(path: web::Path<String>) -> HttpResponse {
    match profile_by_slug(&path) {
        Some(profile) => HttpResponse::Ok().json(IndustryInfo::from(&profile)),
        None => error_response(HttpResponse::NotFound(), "Unknown industry"),
    }
}
