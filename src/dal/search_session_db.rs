use sqlx::PgPool;

use crate::domain::search_session::SearchSession;

pub async fn insert_search_session(
    pool: &PgPool,
    session: &SearchSession,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        insert into search_session
            (id, industry, cities, keywords, max_searches, queries_attempted,
             accepted_count, duplicate_count, rejected_count, error_count,
             started_at, finished_at)
        values
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ",
    )
    .bind(session.id)
    .bind(&session.industry)
    .bind(&session.cities)
    .bind(&session.keywords)
    .bind(session.max_searches)
    .bind(session.queries_attempted)
    .bind(session.accepted_count)
    .bind(session.duplicate_count)
    .bind(session.rejected_count)
    .bind(session.error_count)
    .bind(session.started_at)
    .bind(session.finished_at)
    .execute(pool)
    .await?;

    Ok(())
}
