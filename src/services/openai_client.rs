use anyhow::Context;
use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};

use crate::domain::{
    email::split_subject,
    industry::EmailContext,
    lead::Lead,
};

pub const EMAIL_MODEL: &str = "gpt-4o-mini";

pub struct OpenaiClient {
    client: Client<OpenAIConfig>,
}

impl Default for OpenaiClient {
    fn default() -> Self {
        OpenaiClient {
            client: Client::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutreachEmail {
    pub subject: String,
    pub body: String,
}

impl OpenaiClient {
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        OpenaiClient {
            client: Client::with_config(config),
        }
    }

    pub async fn generate_outreach_email(
        &self,
        lead: &Lead,
        context: &EmailContext,
    ) -> anyhow::Result<OutreachEmail> {
        let prompt = build_email_prompt(lead, context);

        let request = CreateChatCompletionRequestArgs::default()
            .model(EMAIL_MODEL)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .max_tokens(600_u32)
            .build()?;

        let response = self.client.chat().create(request).await?;
        log::debug!("Response: {:?}", response);

        let reply = response
            .choices
            .first()
            .context("No choices in Openai response")?
            .message
            .content
            .clone()
            .context("No content in Openai response")?;

        let fallback = format!("Colaboración con {}", lead.name);
        let (subject, body) = split_subject(&reply, &fallback);

        Ok(OutreachEmail { subject, body })
    }
}

pub fn build_email_prompt(lead: &Lead, context: &EmailContext) -> String {
    let location = lead
        .location
        .as_deref()
        .map(|city| format!(" en {}", city))
        .unwrap_or_default();

    format!(
        r#"Genera un email profesional y personalizado para contactar a la empresa "{name}"{location} del sector {industry}.

Contexto de la industria:
- Productos principales: {products}
- Servicios: {services}
- Audiencia objetivo: {audience}
- Propuesta de valor: {value}

Información de la empresa: {description}

El email debe:
1. Mencionar productos específicos de {industry}
2. Ofrecer valor inmediato
3. Incluir un call-to-action claro
4. Estar personalizado para "{name}"

Empieza con una línea "Asunto: ..." y después el cuerpo del email.
Longitud: máximo 150 palabras.
Idioma: {language}
Tono: {tone}"#,
        name = lead.name,
        location = location,
        industry = context.industry,
        products = context.products.join(", "),
        services = context.services.join(", "),
        audience = context.target_audience,
        value = context.value_proposition,
        description = match lead.description.is_empty() {
            true => "sin descripción",
            false => lead.description.as_str(),
        },
        language = context.language,
        tone = context.tone,
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::build_email_prompt;
    use crate::domain::{
        industry::medical_aesthetics,
        lead::{Lead, LeadSource, LeadStatus},
    };

    fn lead(description: &str) -> Lead {
        Lead {
            id: 7,
            name: "Clínica X".to_string(),
            email: Some("info@clinicax.es".to_string()),
            phone: None,
            profile_url: None,
            website: Some("https://clinicax.es".to_string()),
            description: description.to_string(),
            location: Some("madrid".to_string()),
            search_term: Some("botox madrid".to_string()),
            source: LeadSource::Provider("SerpApi".to_string()),
            status: LeadStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn prompt_carries_lead_and_industry_context() {
        let profile = medical_aesthetics();
        let prompt = build_email_prompt(&lead("Tratamientos de botox"), &profile.email_context);

        assert!(prompt.contains(r#"la empresa "Clínica X" en madrid"#));
        assert!(prompt.contains("medicina estética"));
        assert!(prompt.contains("fillers dérmicos, botox, ácido hialurónico"));
        assert!(prompt.contains("Tratamientos de botox"));
        assert!(prompt.contains("Tono: profesional pero accesible"));
    }

    #[test]
    fn empty_description_is_stated() {
        let profile = medical_aesthetics();
        let prompt = build_email_prompt(&lead(""), &profile.email_context);
        assert!(prompt.contains("sin descripción"));
    }
}
