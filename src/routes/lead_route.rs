use actix_web::{get, post, put, web, HttpResponse, HttpResponseBuilder};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::{
    configuration::SearchSettings,
    dal::{email_db, lead_db},
    domain::{
        email::NewGeneratedEmail,
        industry::profile_by_slug,
        lead::{LeadFilter, LeadSource, LeadStatus, NewLead},
    },
    error::LeadError,
    services::{LeadStore, OpenaiClient, SaveOutcome, EMAIL_MODEL},
};

const DEFAULT_PAGE_SIZE: i64 = 100;
const MAX_PAGE_SIZE: i64 = 500;

pub fn error_response(mut builder: HttpResponseBuilder, message: &str) -> HttpResponse {
    builder.json(json!({ "error": message }))
}

#[derive(Deserialize)]
struct ListLeadsQuery {
    status: Option<String>,
    source: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl ListLeadsQuery {
    fn filter(&self) -> Result<LeadFilter, String> {
        let status = match self.status.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(status) => Some(LeadStatus::try_from(status)?),
            None => None,
        };
        let source = self
            .source
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(LeadFilter { status, source })
    }
}

#[get("/leads")]
async fn list_leads(pool: web::Data<PgPool>, query: web::Query<ListLeadsQuery>) -> HttpResponse {
    let filter = match query.filter() {
        Ok(filter) => filter,
        Err(e) => return error_response(HttpResponse::BadRequest(), &e),
    };
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    match lead_db::list_leads(&pool, &filter, limit, offset).await {
        Ok(leads) => HttpResponse::Ok().json(leads),
        Err(e) => {
            log::error!("Failed to list leads: {:?}", e);
            error_response(HttpResponse::InternalServerError(), "Failed to list leads")
        }
    }
}

#[derive(Deserialize)]
struct SearchLeadsQuery {
    keyword: String,
}

#[get("/leads/search")]
async fn search_leads(pool: web::Data<PgPool>, query: web::Query<SearchLeadsQuery>) -> HttpResponse {
    if query.keyword.trim().is_empty() {
        return error_response(HttpResponse::BadRequest(), "keyword is required");
    }

    match lead_db::search_leads(&pool, &query.keyword).await {
        Ok(leads) => HttpResponse::Ok().json(leads),
        Err(e) => {
            log::error!("Failed to search leads for {}: {:?}", query.keyword, e);
            error_response(HttpResponse::InternalServerError(), "Failed to search leads")
        }
    }
}

#[get("/leads/{id}")]
async fn get_lead(pool: web::Data<PgPool>, path: web::Path<i64>) -> HttpResponse {
    let id = path.into_inner();
    match lead_db::get_lead(&pool, id).await {
        Ok(Some(lead)) => HttpResponse::Ok().json(lead),
        Ok(None) => error_response(HttpResponse::NotFound(), "Lead not found"),
        Err(e) => {
            log::error!("Failed to fetch lead {}: {:?}", id, e);
            error_response(HttpResponse::InternalServerError(), "Failed to fetch lead")
        }
    }
}

#[derive(Deserialize)]
struct ManualLeadBody {
    name: String,
    email: Option<String>,
    phone: Option<String>,
    profile_url: Option<String>,
    website: Option<String>,
    #[serde(default)]
    description: String,
    location: Option<String>,
    source: Option<String>,
}

impl ManualLeadBody {
    fn into_new_lead(self) -> Result<NewLead, String> {
        let source = match self.source.as_deref().map(str::trim) {
            None | Some("") | Some("Manual") => LeadSource::Manual,
            Some("Referral") => LeadSource::Referral,
            Some(other) => {
                return Err(format!(
                    "{} is not a valid source, use Manual or Referral",
                    other
                ))
            }
        };

        Ok(NewLead {
            name: self.name,
            email: self.email,
            phone: self.phone,
            profile_url: self.profile_url,
            website: self.website,
            description: self.description,
            location: self.location,
            search_term: None,
            source,
            status: LeadStatus::Pending,
        })
    }
}

#[post("/leads")]
async fn add_lead(lead_store: web::Data<LeadStore>, body: web::Json<ManualLeadBody>) -> HttpResponse {
    let candidate = match body.into_inner().into_new_lead() {
        Ok(candidate) => candidate,
        Err(e) => return error_response(HttpResponse::BadRequest(), &e),
    };

    match lead_store.save_if_new(candidate).await {
        Ok(SaveOutcome::Saved(lead)) => {
            log::info!("Added {} lead {} with id {}", lead.source, lead.name, lead.id);
            HttpResponse::Created().json(lead)
        }
        Ok(SaveOutcome::Duplicate(lead)) => HttpResponse::Conflict().json(json!({
            "error": "Lead already exists",
            "lead": lead,
        })),
        Err(LeadError::Validation(e)) => error_response(HttpResponse::BadRequest(), &e),
        Err(e) => {
            log::error!("{}: {:?}", e, e);
            error_response(HttpResponse::InternalServerError(), "Failed to save lead")
        }
    }
}

#[derive(Deserialize)]
struct UpdateStatusBody {
    status: String,
}

#[put("/leads/{id}/status")]
async fn update_lead_status(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    body: web::Json<UpdateStatusBody>,
) -> HttpResponse {
    let id = path.into_inner();
    let status = match LeadStatus::try_from(body.status.as_str()) {
        Ok(status) => status,
        Err(e) => return error_response(HttpResponse::BadRequest(), &e),
    };

    match lead_db::update_lead_status(&pool, id, status).await {
        Ok(Some(lead)) => HttpResponse::Ok().json(lead),
        Ok(None) => error_response(HttpResponse::NotFound(), "Lead not found"),
        Err(e) => {
            log::error!("Failed to update status of lead {}: {:?}", id, e);
            error_response(HttpResponse::InternalServerError(), "Failed to update lead")
        }
    }
}

#[derive(Deserialize)]
struct GenerateEmailQuery {
    industry: Option<String>,
}

#[post("/leads/{id}/email")]
async fn generate_email(
    pool: web::Data<PgPool>,
    openai_client: web::Data<OpenaiClient>,
    settings: web::Data<SearchSettings>,
    path: web::Path<i64>,
    query: web::Query<GenerateEmailQuery>,
) -> HttpResponse {
    let id = path.into_inner();
    let slug = query
        .industry
        .clone()
        .unwrap_or_else(|| settings.default_industry.clone());
    let profile = match profile_by_slug(&slug) {
        Some(profile) => profile,
        None => {
            return error_response(
                HttpResponse::BadRequest(),
                &format!("Unknown industry: {}", slug),
            )
        }
    };

    let lead = match lead_db::get_lead(&pool, id).await {
        Ok(Some(lead)) => lead,
        Ok(None) => return error_response(HttpResponse::NotFound(), "Lead not found"),
        Err(e) => {
            log::error!("Failed to fetch lead {}: {:?}", id, e);
            return error_response(HttpResponse::InternalServerError(), "Failed to fetch lead");
        }
    };

    let email = match openai_client
        .generate_outreach_email(&lead, &profile.email_context)
        .await
    {
        Ok(email) => email,
        Err(e) => {
            log::error!("Failed to generate email for lead {}: {:?}", id, e);
            return error_response(HttpResponse::BadGateway(), "Failed to generate email");
        }
    };

    let draft = NewGeneratedEmail {
        lead_id: lead.id,
        subject: email.subject,
        content: email.body,
        language: profile.email_context.language.clone(),
        generated_by: EMAIL_MODEL.to_string(),
    };
    match email_db::insert_generated_email(&pool, draft).await {
        Ok(saved) => HttpResponse::Created().json(saved),
        Err(e) => {
            log::error!("Failed to store email for lead {}: {:?}", id, e);
            error_response(HttpResponse::InternalServerError(), "Failed to store email")
        }
    }
}

#[get("/leads/{id}/emails")]
async fn list_emails(pool: web::Data<PgPool>, path: web::Path<i64>) -> HttpResponse {
    let id = path.into_inner();
    match email_db::get_emails_for_lead(&pool, id).await {
        Ok(emails) => HttpResponse::Ok().json(emails),
        Err(e) => {
            log::error!("Failed to list emails for lead {}: {:?}", id, e);
            error_response(HttpResponse::InternalServerError(), "Failed to list emails")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ListLeadsQuery, ManualLeadBody};
    use crate::domain::lead::{LeadSource, LeadStatus};

    fn body(source: Option<&str>) -> ManualLeadBody {
        ManualLeadBody {
            name: "Clínica X".to_string(),
            email: Some("info@clinicax.es".to_string()),
            phone: None,
            profile_url: None,
            website: None,
            description: String::new(),
            location: Some("madrid".to_string()),
            source: source.map(str::to_string),
        }
    }

    #[test]
    fn manual_leads_default_to_manual_source() {
        let lead = body(None).into_new_lead().unwrap();
        assert_eq!(lead.source, LeadSource::Manual);
        assert_eq!(lead.status, LeadStatus::Pending);

        let lead = body(Some("Referral")).into_new_lead().unwrap();
        assert_eq!(lead.source, LeadSource::Referral);
    }

    #[test]
    fn provider_sources_cannot_be_claimed_manually() {
        assert!(body(Some("SerpApi")).into_new_lead().is_err());
    }

    #[test]
    fn list_filter_parses_status() {
        let query = ListLeadsQuery {
            status: Some("Contacted".to_string()),
            source: Some(" ".to_string()),
            limit: None,
            offset: None,
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.status, Some(LeadStatus::Contacted));
        assert_eq!(filter.source, None);

        let query = ListLeadsQuery {
            status: Some("lost".to_string()),
            source: None,
            limit: None,
            offset: None,
        };
        assert!(query.filter().is_err());
    }
}
