use sqlx::PgPool;

use crate::domain::email::{GeneratedEmail, NewGeneratedEmail};

pub async fn insert_generated_email(
    pool: &PgPool,
    email: NewGeneratedEmail,
) -> Result<GeneratedEmail, sqlx::Error> {
    sqlx::query_as::<_, GeneratedEmail>(
        r"
        insert into generated_email
            (lead_id, subject, content, language, generated_by)
        values
            ($1, $2, $3, $4, $5)
        returning
            id, lead_id, subject, content, language, generated_by, status, created_at
        ",
    )
    .bind(email.lead_id)
    .bind(email.subject)
    .bind(email.content)
    .bind(email.language)
    .bind(email.generated_by)
    .fetch_one(pool)
    .await
}

pub async fn get_emails_for_lead(
    pool: &PgPool,
    lead_id: i64,
) -> Result<Vec<GeneratedEmail>, sqlx::Error> {
    sqlx::query_as::<_, GeneratedEmail>(
        r"
        select
            id, lead_id, subject, content, language, generated_by, status, created_at
        from
            generated_email
        where
            lead_id = $1
        order by created_at desc
        ",
    )
    .bind(lead_id)
    .fetch_all(pool)
    .await
}
