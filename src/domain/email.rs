use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct GeneratedEmail {
    pub id: i64,
    pub lead_id: i64,
    pub subject: String,
    pub content: String,
    pub language: String,
    pub generated_by: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewGeneratedEmail {
    pub lead_id: i64,
    pub subject: String,
    pub content: String,
    pub language: String,
    pub generated_by: String,
}

/// Splits a model reply into subject and body. A first line starting with
/// `Subject:` or `Asunto:` becomes the subject, otherwise `fallback_subject`.
pub fn split_subject(reply: &str, fallback_subject: &str) -> (String, String) {
    let reply = reply.trim();
    let (first_line, rest) = reply.split_once('\n').unwrap_or((reply, ""));

    let subject = ["Subject:", "Asunto:"]
        .iter()
        .find_map(|prefix| first_line.trim().strip_prefix(prefix))
        .map(|s| s.trim().to_string());

    match subject {
        Some(subject) if !subject.is_empty() => (subject, rest.trim().to_string()),
        _ => (fallback_subject.to_string(), reply.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::split_subject;

    #[test]
    fn subject_line_is_extracted() {
        let (subject, body) = split_subject("Asunto: Hola Clínica X\n\nCuerpo del email", "x");
        assert_eq!(subject, "Hola Clínica X");
        assert_eq!(body, "Cuerpo del email");
    }

    #[test]
    fn fallback_subject_when_missing() {
        let (subject, body) = split_subject("Estimado equipo,\nGracias", "Propuesta");
        assert_eq!(subject, "Propuesta");
        assert_eq!(body, "Estimado equipo,\nGracias");
    }
}
