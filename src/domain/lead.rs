use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::contact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "LeadStatus", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    Pending,
    Contacted,
    Replied,
    Converted,
    Discarded,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Pending => "pending",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Replied => "replied",
            LeadStatus::Converted => "converted",
            LeadStatus::Discarded => "discarded",
        }
    }
}

impl TryFrom<&str> for LeadStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(LeadStatus::Pending),
            "contacted" => Ok(LeadStatus::Contacted),
            "replied" => Ok(LeadStatus::Replied),
            "converted" => Ok(LeadStatus::Converted),
            "discarded" => Ok(LeadStatus::Discarded),
            other => Err(format!("{} is not a valid lead status", other)),
        }
    }
}

/// Where a lead came from. Stored as text so that ROI reports can group on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadSource {
    Provider(String),
    Manual,
    Referral,
}

impl LeadSource {
    pub fn as_str(&self) -> &str {
        match self {
            LeadSource::Provider(name) => name,
            LeadSource::Manual => "Manual",
            LeadSource::Referral => "Referral",
        }
    }
}

impl From<String> for LeadSource {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Manual" => LeadSource::Manual,
            "Referral" => LeadSource::Referral,
            _ => LeadSource::Provider(value),
        }
    }
}

impl fmt::Display for LeadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LeadSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LeadSource {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(LeadSource::from)
    }
}

/// A lead candidate that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile_url: Option<String>,
    pub website: Option<String>,
    pub description: String,
    pub location: Option<String>,
    pub search_term: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
}

impl NewLead {
    /// Trims every field, lowercases the email, strips phone punctuation and
    /// drops fields left empty. Done before both duplicate lookup and insert so
    /// the two agree on what "equal" means.
    pub fn normalized(self) -> Self {
        NewLead {
            name: self.name.trim().to_string(),
            email: self.email.and_then(|e| contact::normalize_email(&e)),
            phone: self.phone.and_then(|p| contact::normalize_phone(&p)),
            profile_url: self.profile_url.and_then(|u| contact::normalize_url(&u)),
            website: self.website.and_then(|u| contact::normalize_url(&u)),
            description: self.description.trim().to_string(),
            location: non_blank(self.location),
            search_term: non_blank(self.search_term),
            source: self.source,
            status: self.status,
        }
    }

    pub fn has_contact_channel(&self) -> bool {
        self.email.is_some()
            || self.phone.is_some()
            || self.profile_url.is_some()
            || self.website.is_some()
    }

    pub fn name_key(&self) -> String {
        contact::name_key(&self.name)
    }

    /// Candidate URLs worth comparing, profile first.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        [self.profile_url.as_deref(), self.website.as_deref()]
            .into_iter()
            .flatten()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile_url: Option<String>,
    pub website: Option<String>,
    pub description: String,
    pub location: Option<String>,
    pub search_term: Option<String>,
    #[sqlx(try_from = "String")]
    pub source: LeadSource,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn has_contact_channel(&self) -> bool {
        self.email.is_some()
            || self.phone.is_some()
            || self.profile_url.is_some()
            || self.website.is_some()
    }

    /// Duplicate rule: same name key and at least one equal contact channel,
    /// where either candidate URL may equal either stored URL. A candidate
    /// without any channel matches a same-named lead that has none either.
    pub fn is_duplicate_of(&self, candidate: &NewLead) -> bool {
        if contact::name_key(&self.name) != candidate.name_key() {
            return false;
        }

        if !candidate.has_contact_channel() {
            return !self.has_contact_channel();
        }

        let email_matches = candidate.email.is_some() && self.email == candidate.email;
        let phone_matches = candidate.phone.is_some() && self.phone == candidate.phone;
        let url_matches = candidate.urls().any(|url| {
            self.profile_url.as_deref() == Some(url) || self.website.as_deref() == Some(url)
        });

        email_matches || phone_matches || url_matches
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub source: Option<String>,
}
