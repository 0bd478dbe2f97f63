pub mod auth;
pub mod clients;
pub mod companies;
pub mod dashboard;
pub mod distributors;
pub mod files;
pub mod invoices;
pub mod rbac;
pub mod reports;
pub mod tiers;

use validator::Validate;

use crate::common::error::{ApiError, AppError};
use crate::config::AppState;
use crate::middleware::i18n::Locale;

// Valida o payload na borda e já localiza a resposta de erro.
pub(crate) fn validate_payload<T: Validate>(
    payload: &T,
    locale: &Locale,
    app_state: &AppState,
) -> Result<(), ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::from(e).to_api_error(locale, &app_state.i18n_store))
}
