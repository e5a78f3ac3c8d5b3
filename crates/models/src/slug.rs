//! URL-safe slugs: lowercase ASCII alphanumerics joined by single dashes.

use deunicode::deunicode;
use uuid::Uuid;

use crate::errors::ModelError;

pub const MAX_SLUG_LEN: usize = 160;

/// Derive a slug from free text. Letters are transliterated to ASCII first
/// ("Đàn" becomes "dan"); anything that is then not an ASCII letter or digit
/// acts as a separator and runs of separators collapse to one dash.
pub fn slugify(input: &str) -> String {
    let ascii = deunicode(input);
    let mut out = String::with_capacity(ascii.len().min(MAX_SLUG_LEN));
    let mut pending_dash = false;
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
            if out.len() >= MAX_SLUG_LEN {
                break;
            }
        } else {
            pending_dash = true;
        }
    }
    out.truncate(MAX_SLUG_LEN);
    while out.ends_with('-') {
        out.pop();
    }
    out
}

pub fn validate_slug(slug: &str) -> Result<(), ModelError> {
    if slug.is_empty() {
        return Err(ModelError::required("Slug"));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(ModelError::Validation(format!("Slug must be at most {MAX_SLUG_LEN} characters")));
    }
    let well_formed = slug
        .split('-')
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
    if !well_formed {
        return Err(ModelError::Validation("Slug may only contain a-z, 0-9 and single dashes".into()));
    }
    // GET by key treats anything uuid-shaped as an id
    if Uuid::parse_str(slug).is_ok() {
        return Err(ModelError::Validation("Slug must not be a UUID".into()));
    }
    Ok(())
}

/// Normalise the caller's slug when given, otherwise derive it from `fallback`.
/// A derived slug that comes out empty (names made only of symbols) gets a
/// short random one instead.
pub fn resolve_slug(explicit: Option<&str>, fallback: &str) -> Result<String, ModelError> {
    let slug = match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => slugify(s),
        None => match slugify(fallback) {
            derived if derived.is_empty() => random_slug(),
            derived => derived,
        },
    };
    validate_slug(&slug)?;
    Ok(slug)
}

fn random_slug() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("item-{}", &id[..8])
}
