//! Normalisation of names, email addresses, and domains.
//!
//! Every comparison the engine makes happens on trimmed, lower-cased text.
//! These helpers are the single place that rule is applied.

use crate::error::{MalformedEmailReason, RecordError};

const SCHEMES: [&str; 2] = ["https://", "http://"];
const WWW_PREFIX: &str = "www.";

/// Trims surrounding whitespace and lower-cases a name part.
///
/// ```
/// use email_pattern::normalise_name;
///
/// assert_eq!(normalise_name("  Jane "), "jane");
/// ```
#[must_use]
pub fn normalise_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Cleans a domain or URL down to a bare host name.
///
/// A leading `http://` or `https://` and then a leading `www.` are removed,
/// and everything from the first `/` onwards is dropped. The result is
/// trimmed and lower-cased and may be empty.
///
/// ```
/// use email_pattern::clean_domain;
///
/// assert_eq!(clean_domain("https://www.Acme.com/contact"), "acme.com");
/// assert_eq!(clean_domain("acme.com"), "acme.com");
/// ```
#[must_use]
pub fn clean_domain(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let without_scheme = SCHEMES
        .iter()
        .find_map(|scheme| lowered.strip_prefix(scheme))
        .unwrap_or(&lowered);
    let without_www = without_scheme
        .strip_prefix(WWW_PREFIX)
        .unwrap_or(without_scheme);
    without_www
        .split('/')
        .next()
        .unwrap_or_default()
        .trim()
        .to_owned()
}

/// Cleans a domain and rejects values that are empty afterwards.
///
/// # Errors
///
/// Returns [`RecordError::UnparseableDomain`] if nothing remains after
/// cleaning.
pub fn parse_domain(raw: &str) -> Result<String, RecordError> {
    let domain = clean_domain(raw);
    if domain.is_empty() {
        return Err(RecordError::UnparseableDomain {
            value: raw.to_owned(),
        });
    }
    Ok(domain)
}

/// An observed email address split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitEmail {
    /// Lower-cased local part.
    pub username: String,
    /// Cleaned domain.
    pub domain: String,
}

/// Splits an observed email address into username and cleaned domain.
///
/// The address is trimmed and lower-cased. The username is the text before
/// the first `@`; the domain is the text between the first and any second
/// `@`, cleaned with [`clean_domain`].
///
/// # Errors
///
/// Returns [`RecordError::MalformedEmail`] if the address has no `@` or
/// either side of it is empty.
///
/// ```
/// use email_pattern::split_email;
///
/// let split = split_email("Jane.Doe@Acme.com").expect("well formed");
/// assert_eq!(split.username, "jane.doe");
/// assert_eq!(split.domain, "acme.com");
/// ```
pub fn split_email(raw: &str) -> Result<SplitEmail, RecordError> {
    let malformed = |reason| RecordError::MalformedEmail {
        email: raw.to_owned(),
        reason,
    };

    let email = raw.trim().to_lowercase();
    let mut parts = email.split('@');
    let username = parts.next().unwrap_or_default();
    let Some(domain_part) = parts.next() else {
        return Err(malformed(MalformedEmailReason::MissingSeparator));
    };
    if username.is_empty() {
        return Err(malformed(MalformedEmailReason::EmptyUsername));
    }
    let domain = clean_domain(domain_part);
    if domain.is_empty() {
        return Err(malformed(MalformedEmailReason::EmptyDomain));
    }

    Ok(SplitEmail {
        username: username.to_owned(),
        domain,
    })
}
