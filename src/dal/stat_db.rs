use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CountRow {
    pub label: String,
    pub count: i64,
}

/// Lead counts per source tag, used for ROI attribution.
pub async fn aggregate_by_source(pool: &PgPool) -> Result<BTreeMap<String, i64>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CountRow>(
        r#"
        select
            source as label,
            count(*) as count
        from
            lead
        group by
            source
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| (r.label, r.count)).collect())
}

pub async fn aggregate_by_status(pool: &PgPool) -> Result<BTreeMap<String, i64>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CountRow>(
        r#"
        select
            lower(status::text) as label,
            count(*) as count
        from
            lead
        group by
            status
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| (r.label, r.count)).collect())
}

pub async fn count_generated_emails(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("select count(*) from generated_email")
        .fetch_one(pool)
        .await
}
