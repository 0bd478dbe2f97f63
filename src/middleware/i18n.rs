// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

// Extrator de idioma a partir do Accept-Language.
// O padrão é "ar": o público do sistema é árabe.
pub struct Locale(pub String);

pub fn locale_from_headers(headers: &HeaderMap) -> String {
    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|header_value| header_value.to_str().ok())
        .and_then(|header_str| {
            accept_language::parse(header_str)
                .first()
                .map(|tag_string| {
                    // "ar-SA" -> "ar"; "en" -> "en"
                    tag_string
                        .split('-')
                        .next()
                        .unwrap_or(tag_string)
                        .to_string()
                })
        })
        .unwrap_or_else(|| "ar".to_string())
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(Locale(locale_from_headers(&parts.headers)))
    }
}
