use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::{
    dal::lead_db,
    domain::lead::{Lead, NewLead},
    error::LeadError,
};

/// The durable side of deduplication: lookup then insert.
#[async_trait]
pub trait LeadGateway: Send + Sync {
    async fn find_duplicate(&self, candidate: &NewLead) -> Result<Option<Lead>, sqlx::Error>;

    async fn save(&self, lead: &NewLead) -> Result<Lead, sqlx::Error>;
}

pub struct PgLeadGateway {
    pool: PgPool,
}

impl PgLeadGateway {
    pub fn new(pool: PgPool) -> Self {
        PgLeadGateway { pool }
    }
}

#[async_trait]
impl LeadGateway for PgLeadGateway {
    async fn find_duplicate(&self, candidate: &NewLead) -> Result<Option<Lead>, sqlx::Error> {
        lead_db::find_duplicate(&self.pool, candidate).await
    }

    async fn save(&self, lead: &NewLead) -> Result<Lead, sqlx::Error> {
        lead_db::insert_lead(&self.pool, lead).await
    }
}

#[derive(Debug)]
pub enum SaveOutcome {
    Saved(Lead),
    Duplicate(Lead),
}

/// Single entry point for lead writes. Every clone shares one write lock, so
/// the duplicate lookup and the insert of one candidate never interleave with
/// another writer in this process.
#[derive(Clone)]
pub struct LeadStore {
    gateway: Arc<dyn LeadGateway>,
    write_lock: Arc<Mutex<()>>,
}

impl LeadStore {
    pub fn new(gateway: Arc<dyn LeadGateway>) -> Self {
        LeadStore {
            gateway,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Normalizes the candidate, rejects it without a name, and inserts it only
    /// when no existing lead matches.
    pub async fn save_if_new(&self, candidate: NewLead) -> Result<SaveOutcome, LeadError> {
        let candidate = candidate.normalized();
        if candidate.name.is_empty() {
            return Err(LeadError::Validation("name is mandatory".to_string()));
        }
        if !candidate.has_contact_channel() {
            log::warn!("Lead {} has no contact channel", candidate.name);
        }

        let _guard = self.write_lock.lock().await;

        match self.gateway.find_duplicate(&candidate).await? {
            Some(lead) => Ok(SaveOutcome::Duplicate(lead)),
            None => Ok(SaveOutcome::Saved(self.gateway.save(&candidate).await?)),
        }
    }
}
