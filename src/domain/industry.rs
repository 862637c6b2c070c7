use serde::Serialize;

use super::{
    contact::{domain_matches, extract_domain},
    search_result::{QueryParams, RawResult},
};

pub const MEDICAL_AESTHETICS: &str = "medical_aesthetics";
pub const REAL_ESTATE: &str = "real_estate";

pub type Classifier = fn(&IndustryProfile, &RawResult) -> bool;
pub type QueryBuilder = fn(&IndustryProfile, &str, &str) -> QueryParams;

/// Context handed to the outreach email writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailContext {
    pub industry: String,
    pub products: Vec<String>,
    pub services: Vec<String>,
    pub target_audience: String,
    pub value_proposition: String,
    pub tone: String,
    pub language: String,
}

/// Keyword lists, target cities and the acceptance rule for one vertical.
/// Built once per run and never mutated.
#[derive(Clone)]
pub struct IndustryProfile {
    pub slug: String,
    pub name: String,
    pub keywords: Vec<String>,
    pub cities: Vec<String>,
    pub positive_indicators: Vec<String>,
    pub negative_indicators: Vec<String>,
    pub blocked_domains: Vec<String>,
    pub email_context: EmailContext,
    classifier: Classifier,
    query_builder: QueryBuilder,
}

impl IndustryProfile {
    pub fn classify(&self, result: &RawResult) -> bool {
        (self.classifier)(self, result)
    }

    pub fn build_query(&self, keyword: &str, city: &str) -> QueryParams {
        (self.query_builder)(self, keyword, city)
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }
}

impl std::fmt::Debug for IndustryProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndustryProfile")
            .field("slug", &self.slug)
            .field("name", &self.name)
            .field("keywords", &self.keywords)
            .field("cities", &self.cities)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
pub struct IndustryInfo {
    pub slug: String,
    pub name: String,
    pub keywords: Vec<String>,
    pub cities: Vec<String>,
    pub company_indicators: Vec<String>,
}

impl From<&IndustryProfile> for IndustryInfo {
    fn from(profile: &IndustryProfile) -> Self {
        IndustryInfo {
            slug: profile.slug.clone(),
            name: profile.name.clone(),
            keywords: profile.keywords.clone(),
            cities: profile.cities.clone(),
            company_indicators: profile.positive_indicators.clone(),
        }
    }
}

pub fn available_profiles() -> Vec<IndustryProfile> {
    vec![medical_aesthetics(), real_estate()]
}

pub fn profile_by_slug(slug: &str) -> Option<IndustryProfile> {
    available_profiles()
        .into_iter()
        .find(|profile| profile.slug == slug.trim().to_lowercase())
}

/// Accepts a result when it is not on a blocked domain, mentions at least one
/// industry indicator, and mentions more positive than negative indicators.
pub fn indicator_classifier(profile: &IndustryProfile, result: &RawResult) -> bool {
    let blocked = [Some(&result.link), result.website.as_ref()]
        .into_iter()
        .flatten()
        .filter_map(|url| extract_domain(url))
        .any(|domain| {
            profile
                .blocked_domains
                .iter()
                .any(|blocked| domain_matches(&domain, blocked))
        });
    if blocked {
        return false;
    }

    let text = format!(
        "{} {} {} {}",
        result.title,
        result.business_name.as_deref().unwrap_or(""),
        result.snippet,
        result.link
    )
    .to_lowercase();

    let positive_score = profile
        .positive_indicators
        .iter()
        .filter(|indicator| text.contains(indicator.as_str()))
        .count();
    let negative_score = profile
        .negative_indicators
        .iter()
        .filter(|indicator| text.contains(indicator.as_str()))
        .count();

    positive_score >= 1 && positive_score > negative_score
}

pub fn plain_query(_profile: &IndustryProfile, keyword: &str, city: &str) -> QueryParams {
    QueryParams {
        q: format!("{} {}", keyword, city),
        location: city.to_string(),
        hl: "es".to_string(),
        gl: "es".to_string(),
        google_domain: "google.es".to_string(),
        num: None,
        filter: None,
    }
}

fn medical_aesthetics_query(profile: &IndustryProfile, keyword: &str, city: &str) -> QueryParams {
    QueryParams {
        q: format!(
            r#""{}" "{}" (clinic OR aesthetic OR beauty OR medical OR supplies OR distributor)"#,
            keyword, city
        ),
        num: Some(10),
        filter: Some(1),
        ..plain_query(profile, keyword, city)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn medical_aesthetics() -> IndustryProfile {
    IndustryProfile {
        slug: MEDICAL_AESTHETICS.to_string(),
        name: "Medical Aesthetics".to_string(),
        keywords: strings(&[
            "botox",
            "dermal fillers",
            "hyaluronic acid",
            "restylane",
            "juvederm",
            "profhilo",
            "aesthetic medicine",
            "cosmetic treatments",
            "anti aging",
            "facial aesthetics",
            "injectable treatments",
            "aesthetic clinic",
            "cosmetic surgery",
            "beauty clinic",
            "medical spa",
            "dermatology clinic",
            "plastic surgery",
        ]),
        cities: strings(&["madrid", "barcelona", "valencia", "sevilla", "malaga"]),
        positive_indicators: strings(&[
            "aesthetic",
            "estética",
            "estetica",
            "beauty",
            "belleza",
            "cosmetic",
            "dermal",
            "botox",
            "filler",
            "clinic",
            "clínica",
            "clinica",
            "medical spa",
            "anti aging",
            "skin care",
            "facial",
            "injection",
            "treatment",
            "tratamiento",
            "restylane",
            "juvederm",
            "sculptra",
            "radiesse",
            "belotero",
            "teosyal",
            "profhilo",
            "distributor",
            "supplier",
            "training",
            "equipment",
        ]),
        negative_indicators: strings(&[
            "hospital",
            "university",
            "universidad",
            "school",
            "government",
            "insurance",
            "pharmacy chain",
            "drugstore",
        ]),
        blocked_domains: strings(&[
            "doctoralia.es",
            "topdoctors.es",
            "tripadvisor.com",
            "tripadvisor.es",
            "yelp.com",
            "yelp.es",
            "paginasamarillas.es",
            "groupon.es",
            "wikipedia.org",
            "youtube.com",
            "amazon.es",
            "amazon.com",
        ]),
        email_context: EmailContext {
            industry: "medicina estética".to_string(),
            products: strings(&["fillers dérmicos", "botox", "ácido hialurónico"]),
            services: strings(&["distribución", "formación", "soporte técnico"]),
            target_audience: "clínicas estéticas y profesionales médicos".to_string(),
            value_proposition: "productos premium con certificación médica".to_string(),
            tone: "profesional pero accesible".to_string(),
            language: "es".to_string(),
        },
        classifier: indicator_classifier,
        query_builder: medical_aesthetics_query,
    }
}

pub fn real_estate() -> IndustryProfile {
    IndustryProfile {
        slug: REAL_ESTATE.to_string(),
        name: "Real Estate".to_string(),
        keywords: strings(&[
            "inmobiliaria",
            "agencia inmobiliaria",
            "real estate agency",
            "property management",
            "gestión de alquileres",
        ]),
        cities: strings(&["madrid", "barcelona", "valencia", "sevilla", "malaga"]),
        positive_indicators: strings(&[
            "inmobiliaria",
            "real estate",
            "realty",
            "property",
            "properties",
            "viviendas",
            "pisos",
            "alquiler",
            "homes",
        ]),
        negative_indicators: strings(&["noticias", "news", "government", "ayuntamiento"]),
        blocked_domains: strings(&[
            "idealista.com",
            "fotocasa.es",
            "habitaclia.com",
            "pisos.com",
            "wikipedia.org",
            "youtube.com",
        ]),
        email_context: EmailContext {
            industry: "sector inmobiliario".to_string(),
            products: strings(&["captación de propietarios", "marketing inmobiliario"]),
            services: strings(&["generación de leads", "gestión de campañas"]),
            target_audience: "agencias inmobiliarias".to_string(),
            value_proposition: "más propietarios cualificados por mes".to_string(),
            tone: "profesional y directo".to_string(),
            language: "es".to_string(),
        },
        classifier: indicator_classifier,
        query_builder: plain_query,
    }
}
