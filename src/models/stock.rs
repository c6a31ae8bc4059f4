// src/models/stock.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    Entry,
    Exit,
    Adjustment,
    Transfer,
    Return,
    Destruction,
}

impl MovementType {
    pub fn parse(value: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(value.to_string())).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentReason {
    Inventory,
    Breakage,
    Expiry,
    Correction,
}

// ---
// Metadados de uma movimentação de estoque.
// Cada tipo de movimentação tem os seus campos; o `type` bate com o `movement_type` da linha.
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockMovementMetadata {
    #[serde(rename_all = "camelCase")]
    Entry {
        supplier_id: Option<Uuid>,
        delivery_note: Option<String>,
        batch_number: Option<String>,
        expiration_date: Option<NaiveDate>,
    },
    #[serde(rename_all = "camelCase")]
    Exit {
        sale_id: Option<Uuid>,
        prescription_ref: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Adjustment {
        reason: AdjustmentReason,
        comment: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Transfer {
        from_location_id: Uuid,
        to_location_id: Uuid,
    },
    #[serde(rename_all = "camelCase")]
    Return {
        supplier_id: Option<Uuid>,
        return_ref: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Destruction {
        certificate_ref: Option<String>,
        witness: Option<String>,
    },
}

impl StockMovementMetadata {
    pub fn movement_type(&self) -> MovementType {
        match self {
            StockMovementMetadata::Entry { .. } => MovementType::Entry,
            StockMovementMetadata::Exit { .. } => MovementType::Exit,
            StockMovementMetadata::Adjustment { .. } => MovementType::Adjustment,
            StockMovementMetadata::Transfer { .. } => MovementType::Transfer,
            StockMovementMetadata::Return { .. } => MovementType::Return,
            StockMovementMetadata::Destruction { .. } => MovementType::Destruction,
        }
    }
}
