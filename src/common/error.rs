// src/common/error.rs

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;

// Erros das funções puras de análise (Curva ABC e Valorização).
// Ficam separados do AppError para que o núcleo não dependa do axum.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    #[error("Registro '{record_id}' inválido: campo '{field}' não pode ser negativo ({value})")]
    InvalidInput {
        record_id: String,
        field: &'static str,
        value: Decimal,
    },

    #[error("Limites ABC inválidos: A={a}, B={b} (esperado 0 < A <= B <= 100)")]
    InvalidThresholds { a: Decimal, b: Decimal },

    // Valores válidos, mas grandes demais para o Decimal (limite ~7.9e28)
    #[error("Registro '{record_id}': '{field}' excede o limite numérico")]
    Overflow {
        record_id: String,
        field: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error("Tabela desconhecida: {0}")]
    UnknownTable(String),

    #[error("Coluna desconhecida '{column}' na tabela '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("A tabela '{0}' é somente leitura")]
    ReadOnlyTable(String),

    #[error("Registro não encontrado em '{table}': {id}")]
    RowNotFound { table: String, id: String },

    #[error("Payload inválido: {0}")]
    InvalidPayload(String),

    // Linha vinda do banco que não bate com o modelo esperado
    #[error("Linha inválida em '{table}': {reason}")]
    InvalidRow { table: String, reason: String },

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

// A resposta de erro que os handlers devolvem.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn to_api_error(self) -> ApiError {
        match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: "Um ou mais campos são inválidos.".into(),
                    details: Some(json!(details)),
                }
            }
            AppError::Analytics(AnalyticsError::InvalidInput { record_id, field, value }) => {
                ApiError {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    error: format!("O registro '{}' possui '{}' negativo.", record_id, field),
                    details: Some(json!({
                        "recordId": record_id,
                        "field": field,
                        "value": value.to_string(),
                    })),
                }
            }
            AppError::Analytics(AnalyticsError::Overflow { record_id, field }) => ApiError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: format!("O registro '{}' excede o limite numérico em '{}'.", record_id, field),
                details: Some(json!({
                    "recordId": record_id,
                    "field": field,
                })),
            },
            AppError::Analytics(e @ AnalyticsError::InvalidThresholds { .. }) => ApiError {
                status: StatusCode::BAD_REQUEST,
                error: e.to_string(),
                details: None,
            },
            e @ (AppError::UnknownTable(_)
            | AppError::UnknownColumn { .. }
            | AppError::InvalidPayload(_)) => ApiError {
                status: StatusCode::BAD_REQUEST,
                error: e.to_string(),
                details: None,
            },
            e @ AppError::ReadOnlyTable(_) => ApiError {
                status: StatusCode::METHOD_NOT_ALLOWED,
                error: e.to_string(),
                details: None,
            },
            e @ AppError::RowNotFound { .. } => ApiError {
                status: StatusCode::NOT_FOUND,
                error: e.to_string(),
                details: None,
            },
            // Falhas do banco viram uma "falha de busca" genérica para o cliente.
            // O `tracing` loga o detalhe.
            AppError::DatabaseError(e) => {
                tracing::error!("Falha de acesso ao banco: {:?}", e);
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: "Falha ao buscar os dados.".into(),
                    details: None,
                }
            }
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: "Ocorreu um erro inesperado.".into(),
                    details: None,
                }
            }
        }
    }
}

// Query string malformada (ex: `limit=abc`) segue o mesmo formato JSON dos outros 400
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidPayload(rejection.body_text())
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        err.to_api_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error().into_response()
    }
}
