use url::Url;

const SOCIAL_PROFILE_HOSTS: [&str; 5] = [
    "linkedin.com",
    "instagram.com",
    "facebook.com",
    "tiktok.com",
    "x.com",
];

/// Lowercased host of a URL without the `www.` prefix.
pub fn extract_domain(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed_url) => match parsed_url.host_str() {
            Some("") | None => None,
            Some(host) => {
                let host = host.to_lowercase();
                match host.strip_prefix("www.") {
                    Some(h) => Some(h.to_string()),
                    None => Some(host),
                }
            }
        },
        Err(_) => None,
    }
}

/// True when the domain is `blocked` itself or one of its subdomains.
pub fn domain_matches(domain: &str, blocked: &str) -> bool {
    domain == blocked || domain.ends_with(&format!(".{}", blocked))
}

pub fn is_social_profile(url: &str) -> bool {
    match extract_domain(url) {
        Some(domain) => SOCIAL_PROFILE_HOSTS
            .iter()
            .any(|host| domain_matches(&domain, host)),
        None => false,
    }
}

pub fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    match looks_like_email(&email) {
        true => Some(email),
        false => None,
    }
}

/// Keeps digits and a leading `+`. Anything with fewer than six digits is noise.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 6 {
        return None;
    }

    match trimmed.starts_with('+') {
        true => Some(format!("+{}", digits)),
        false => Some(digits),
    }
}

pub fn normalize_url(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    match url.is_empty() {
        true => None,
        false => Some(url.to_string()),
    }
}

/// Case-folded name with inner whitespace collapsed. Stored next to the name so
/// duplicate lookups never depend on the database collation.
pub fn name_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// First e-mail looking token in free text, e.g. a search snippet.
pub fn find_email(text: &str) -> Option<String> {
    text.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '(' | ')' | '<' | '>'))
        .map(|token| token.trim_matches(|c: char| matches!(c, '.' | ':' | '"' | '\'')))
        .find(|token| looks_like_email(token))
        .map(|token| token.to_lowercase())
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_key_folds_case_and_spacing() {
        assert_eq!(name_key("  CLÍNICA   X "), "clínica x");
        assert_eq!(name_key("Clínica X"), name_key("clínica x"));
        assert_ne!(name_key("Clínica X"), name_key("Clinica X"));
    }

    #[test]
    fn extract_domains_valid() {
        let urls = [
            "https://www.clinicax.es/tratamientos/botox",
            "https://Esteticamadrid.com/?utm=1",
            "https://es.linkedin.com/company/clinica-x",
        ];
        let results: Vec<Option<String>> = urls.iter().map(|u| extract_domain(u)).collect();

        assert_eq!(
            results,
            vec![
                Some("clinicax.es".to_string()),
                Some("esteticamadrid.com".to_string()),
                Some("es.linkedin.com".to_string()),
            ]
        )
    }

    #[test]
    fn extract_domain_invalid() {
        assert_eq!(extract_domain("/search?q=botox"), None);
        assert_eq!(extract_domain("#"), None);
    }

    #[test]
    fn social_profiles_are_detected_on_subdomains() {
        assert!(is_social_profile("https://es.linkedin.com/company/clinica-x"));
        assert!(is_social_profile("https://www.instagram.com/clinicax"));
        assert!(!is_social_profile("https://clinicax.es"));
        assert!(!is_social_profile("https://notlinkedin.com"));
    }

    #[test]
    fn find_email_in_snippet() {
        let snippet = "Pide cita: info@ClinicaX.es o llama al 911 222 333.";
        assert_eq!(find_email(snippet), Some("info@clinicax.es".to_string()));
        assert_eq!(find_email("Sin contacto @ aquí"), None);
    }

    #[test]
    fn normalize_phone_keeps_plus_and_digits() {
        assert_eq!(normalize_phone("+34 911-222-333"), Some("+34911222333".to_string()));
        assert_eq!(normalize_phone("(91) 122 2333"), Some("911222333".to_string()));
        assert_eq!(normalize_phone("12"), None);
    }
}
