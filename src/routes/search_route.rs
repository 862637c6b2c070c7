use actix_web::{get, post, web, HttpResponse};
use serde_json::json;

use crate::{
    configuration::SearchSettings,
    services::{abandon, try_begin, SearchRequestSender, SharedSearchStatus, StartSearchBody},
};

use super::lead_route::error_response;

#[post("/search/start")]
async fn start_search(
    settings: web::Data<SearchSettings>,
    search_sender: web::Data<SearchRequestSender>,
    search_status: web::Data<SharedSearchStatus>,
    body: web::Json<StartSearchBody>,
) -> HttpResponse {
    let request = match body.into_inner().into_request(&settings) {
        Ok(request) => request,
        Err(e) => return error_response(HttpResponse::BadRequest(), &e),
    };

    if !try_begin(&search_status, &request).await {
        return error_response(HttpResponse::Conflict(), "A search is already running");
    }

    let id = request.id;
    let planned = request.max_searches.min(request.cities.len() * request.keywords.len());
    if let Err(e) = search_sender.sender.send(request) {
        log::error!("Search request channel got an Error: {:?}", e);
        abandon(&search_status).await;
        return error_response(
            HttpResponse::InternalServerError(),
            "Search runner is not available",
        );
    }

    HttpResponse::Accepted().json(json!({
        "id": id,
        "planned_queries": planned,
    }))
}

#[get("/search/status")]
async fn get_search_status(search_status: web::Data<SharedSearchStatus>) -> HttpResponse {
    let status = search_status.lock().await.clone();
    HttpResponse::Ok().json(status)
}
