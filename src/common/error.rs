use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Nosso tipo de erro interno, com `thiserror` para melhor ergonomia.
// O core só produz códigos de mensagem; o texto localizado é resolvido
// na borda HTTP via `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Usuário da sessão não existe mais no banco: força re-autenticação,
    // distinto de uma negação genérica.
    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Sem permissão para esta ação")]
    NotAuthorized,

    // Também cobre registros fora do escopo do usuário: a resposta é a
    // mesma de um registro inexistente, para não vazar existência.
    #[error("Registro não encontrado")]
    NotFound,

    #[error("Etapa de pagamento desconhecida: {0}")]
    InvalidStage(String),

    #[error("Etapa já marcada como paga")]
    AlreadyPaid,

    #[error("Etapa anterior ainda não foi paga")]
    StageOrderViolation,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    // Código estável consumido pelo catálogo i18n.
    pub fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::UserNotFound => "user_not_found",
            AppError::NotAuthorized => "not_authorized",
            AppError::NotFound => "not_found",
            AppError::InvalidStage(_) => "invalid_stage",
            AppError::AlreadyPaid => "already_paid",
            AppError::StageOrderViolation => "stage_order",
            AppError::UniqueConstraintViolation(_) => "unique_violation",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidStage(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::UserNotFound => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotAuthorized => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::AlreadyPaid
            | AppError::StageOrderViolation
            | AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        // Validação devolve todos os detalhes por campo.
        if let AppError::ValidationError(errors) = self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                details.insert(field.to_string(), messages);
            }
            return ApiError {
                status: StatusCode::BAD_REQUEST,
                error: i18n.text(&locale.0, "validation"),
                details: serde_json::to_value(details).ok(),
            };
        }

        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O `tracing` loga a mensagem detalhada; o cliente recebe só o genérico.
            tracing::error!("Erro interno do servidor: {}", self);
        }

        ApiError {
            status,
            error: i18n.text(&locale.0, self.message_key()),
            details: None,
        }
    }
}

// O erro que efetivamente sai na resposta HTTP (status + texto localizado).
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => Json(json!({ "error": self.error, "details": details })),
            None => Json(json!({ "error": self.error })),
        };
        (self.status, body).into_response()
    }
}
