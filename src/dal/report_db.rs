use serde::Serialize;
use sqlx::PgPool;

use crate::domain::{lead::Lead, search_session::SearchSession};

use super::stat_db::CountRow;

/// Fixed, parameterized reports. Callers pick one by name; no caller supplied
/// SQL is ever executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    LeadsByCity,
    LeadsBySearchTerm,
    LeadsBySourceLast30Days,
    LeadsMissingContact,
    PendingLeads,
    RecentSessions,
}

impl Report {
    pub const ALL: [Report; 6] = [
        Report::LeadsByCity,
        Report::LeadsBySearchTerm,
        Report::LeadsBySourceLast30Days,
        Report::LeadsMissingContact,
        Report::PendingLeads,
        Report::RecentSessions,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Report::LeadsByCity => "leads_by_city",
            Report::LeadsBySearchTerm => "leads_by_search_term",
            Report::LeadsBySourceLast30Days => "leads_by_source_last_30_days",
            Report::LeadsMissingContact => "leads_missing_contact",
            Report::PendingLeads => "pending_leads",
            Report::RecentSessions => "recent_sessions",
        }
    }

    pub fn from_name(name: &str) -> Option<Report> {
        Report::ALL.into_iter().find(|r| r.name() == name)
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReportOutput {
    Counts(Vec<CountRow>),
    Leads(Vec<Lead>),
    Sessions(Vec<SearchSession>),
}

pub async fn run_report(
    pool: &PgPool,
    report: Report,
    limit: i64,
) -> Result<ReportOutput, sqlx::Error> {
    match report {
        Report::LeadsByCity => {
            let rows = sqlx::query_as::<_, CountRow>(
                r"
                select
                    coalesce(location, 'unknown') as label,
                    count(*) as count
                from
                    lead
                group by
                    1
                order by
                    2 desc, 1
                limit $1
                ",
            )
            .bind(limit)
            .fetch_all(pool)
            .await?;
            Ok(ReportOutput::Counts(rows))
        }
        Report::LeadsBySearchTerm => {
            let rows = sqlx::query_as::<_, CountRow>(
                r"
                select
                    coalesce(search_term, 'unknown') as label,
                    count(*) as count
                from
                    lead
                group by
                    1
                order by
                    2 desc, 1
                limit $1
                ",
            )
            .bind(limit)
            .fetch_all(pool)
            .await?;
            Ok(ReportOutput::Counts(rows))
        }
        Report::LeadsBySourceLast30Days => {
            let rows = sqlx::query_as::<_, CountRow>(
                r"
                select
                    source as label,
                    count(*) as count
                from
                    lead
                where
                    created_at > now() - interval '30 days'
                group by
                    source
                order by
                    2 desc, 1
                limit $1
                ",
            )
            .bind(limit)
            .fetch_all(pool)
            .await?;
            Ok(ReportOutput::Counts(rows))
        }
        Report::LeadsMissingContact => {
            let rows = sqlx::query_as::<_, Lead>(
                r"
                select
                    id, name, email, phone, profile_url, website, description,
                    location, search_term, source, status, created_at
                from
                    lead
                where
                    email is null and
                    phone is null and
                    profile_url is null and
                    website is null
                order by created_at desc
                limit $1
                ",
            )
            .bind(limit)
            .fetch_all(pool)
            .await?;
            Ok(ReportOutput::Leads(rows))
        }
        Report::PendingLeads => {
            let rows = sqlx::query_as::<_, Lead>(
                r"
                select
                    id, name, email, phone, profile_url, website, description,
                    location, search_term, source, status, created_at
                from
                    lead
                where
                    status = 'PENDING'
                order by created_at asc
                limit $1
                ",
            )
            .bind(limit)
            .fetch_all(pool)
            .await?;
            Ok(ReportOutput::Leads(rows))
        }
        Report::RecentSessions => {
            let rows = sqlx::query_as::<_, SearchSession>(
                r"
                select
                    id, industry, cities, keywords, max_searches, queries_attempted,
                    accepted_count, duplicate_count, rejected_count, error_count,
                    started_at, finished_at
                from
                    search_session
                order by finished_at desc
                limit $1
                ",
            )
            .bind(limit)
            .fetch_all(pool)
            .await?;
            Ok(ReportOutput::Sessions(rows))
        }
    }
}
