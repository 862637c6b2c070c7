use sqlx::PgPool;

use crate::domain::lead::{Lead, LeadFilter, LeadStatus, NewLead};

const SEARCH_LIMIT: i64 = 20;

/// Oldest lead with the same name key sharing at least one contact channel.
/// Either candidate URL may match either stored URL column.
pub async fn find_duplicate(pool: &PgPool, candidate: &NewLead) -> Result<Option<Lead>, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r#"
        select
            id, name, email, phone, profile_url, website, description,
            location, search_term, source, status, created_at
        from
            lead
        where
            name_key = $1 and
            (
                ($2::text is not null and email = $2) or
                ($3::text is not null and phone = $3) or
                ($4::text is not null and (profile_url = $4 or website = $4)) or
                ($5::text is not null and (profile_url = $5 or website = $5)) or
                (
                    $2::text is null and $3::text is null and
                    $4::text is null and $5::text is null and
                    email is null and phone is null and
                    profile_url is null and website is null
                )
            )
        order by id asc
        limit 1
        "#,
    )
    .bind(candidate.name_key())
    .bind(&candidate.email)
    .bind(&candidate.phone)
    .bind(&candidate.profile_url)
    .bind(&candidate.website)
    .fetch_optional(pool)
    .await
}

pub async fn insert_lead(pool: &PgPool, lead: &NewLead) -> Result<Lead, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r#"
        insert into lead
            (name, name_key, email, phone, profile_url, website, description,
             location, search_term, source, status)
        values
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        returning
            id, name, email, phone, profile_url, website, description,
            location, search_term, source, status, created_at
        "#,
    )
    .bind(&lead.name)
    .bind(lead.name_key())
    .bind(&lead.email)
    .bind(&lead.phone)
    .bind(&lead.profile_url)
    .bind(&lead.website)
    .bind(&lead.description)
    .bind(&lead.location)
    .bind(&lead.search_term)
    .bind(lead.source.as_str())
    .bind(lead.status)
    .fetch_one(pool)
    .await
}

pub async fn get_lead(pool: &PgPool, id: i64) -> Result<Option<Lead>, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r#"
        select
            id, name, email, phone, profile_url, website, description,
            location, search_term, source, status, created_at
        from
            lead
        where
            id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list_leads(
    pool: &PgPool,
    filter: &LeadFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Lead>, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r#"
        select
            id, name, email, phone, profile_url, website, description,
            location, search_term, source, status, created_at
        from
            lead
        where
            ($1::LeadStatus is null or status = $1) and
            ($2::text is null or source = $2)
        order by created_at desc, id desc
        limit $3
        offset $4
        "#,
    )
    .bind(filter.status)
    .bind(&filter.source)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Case-insensitive substring match over name, description, website and source.
pub async fn search_leads(pool: &PgPool, keyword: &str) -> Result<Vec<Lead>, sqlx::Error> {
    let pattern = format!("%{}%", escape_like(&keyword.trim().to_lowercase()));

    sqlx::query_as::<_, Lead>(
        r#"
        select
            id, name, email, phone, profile_url, website, description,
            location, search_term, source, status, created_at
        from
            lead
        where
            lower(name) like $1 or
            lower(description) like $1 or
            lower(coalesce(website, '')) like $1 or
            lower(source) like $1
        order by created_at desc
        limit $2
        "#,
    )
    .bind(pattern)
    .bind(SEARCH_LIMIT)
    .fetch_all(pool)
    .await
}

pub async fn update_lead_status(
    pool: &PgPool,
    id: i64,
    status: LeadStatus,
) -> Result<Option<Lead>, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r#"
        update lead set
            status = $2,
            updated_at = now()
        where
            id = $1
        returning
            id, name, email, phone, profile_url, website, description,
            location, search_term, source, status, created_at
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await
}

pub async fn count_leads(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("select count(*) from lead")
        .fetch_one(pool)
        .await
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
