// src/db/table_registry.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        data::{MutationOperation, Row},
        stock::{MovementType, StockMovementMetadata},
    },
};

// Colunas preenchidas pelo servidor. Nunca aceitas no payload.
pub const TENANT_COLUMN: &str = "tenant_id";
const SERVER_MANAGED: &[&str] = &[TENANT_COLUMN, "created_at", "updated_at"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableAccess {
    ReadOnly,
    // Livro-razão: só INSERT
    AppendOnly,
    ReadWrite,
}

#[derive(Debug)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub access: TableAccess,
    // Colunas calculadas pelo banco (triggers), além das de SERVER_MANAGED
    pub computed: &'static [&'static str],
    pub payload_check: Option<fn(&Row) -> Result<(), AppError>>,
}

// ---
// O registro (allowlist) de tudo que a camada genérica pode tocar
// ---
pub static TABLES: &[TableSpec] = &[
    TableSpec {
        name: "product_families",
        columns: &["id", "tenant_id", "code", "name", "created_at", "updated_at"],
        access: TableAccess::ReadWrite,
        computed: &[],
        payload_check: None,
    },
    TableSpec {
        name: "dci",
        columns: &["id", "tenant_id", "name", "atc_code", "created_at", "updated_at"],
        access: TableAccess::ReadWrite,
        computed: &[],
        payload_check: None,
    },
    TableSpec {
        name: "pricing_categories",
        columns: &[
            "id", "tenant_id", "name", "markup_rate", "vat_rate", "created_at", "updated_at",
        ],
        access: TableAccess::ReadWrite,
        computed: &[],
        payload_check: None,
    },
    TableSpec {
        name: "products",
        columns: &[
            "id", "tenant_id", "name", "cip_code", "family_id", "dci_id", "pricing_category_id",
            "unit_cost", "sale_price", "is_active", "created_at", "updated_at",
        ],
        access: TableAccess::ReadWrite,
        computed: &[],
        payload_check: None,
    },
    TableSpec {
        name: "sales",
        columns: &["id", "tenant_id", "product_id", "quantity", "unit_price", "sold_at"],
        access: TableAccess::ReadWrite,
        computed: &[],
        payload_check: None,
    },
    TableSpec {
        name: "stock_levels",
        columns: &[
            "id", "tenant_id", "product_id", "quantity_on_hand", "unit_cost",
            "low_stock_threshold", "updated_at",
        ],
        access: TableAccess::ReadOnly,
        computed: &[],
        payload_check: None,
    },
    TableSpec {
        name: "stock_movements",
        columns: &[
            "id", "tenant_id", "product_id", "movement_type", "quantity", "quantity_before",
            "quantity_after", "metadata", "created_at",
        ],
        access: TableAccess::AppendOnly,
        computed: &["quantity_before", "quantity_after"],
        payload_check: Some(check_movement_metadata),
    },
    TableSpec {
        name: "product_sales_monthly",
        columns: &[
            "tenant_id", "period", "id", "name", "category", "revenue", "quantity_sold",
            "current_stock",
        ],
        access: TableAccess::ReadOnly,
        computed: &[],
        payload_check: None,
    },
    TableSpec {
        name: "stock_valuation",
        columns: &[
            "tenant_id", "id", "name", "quantity_on_hand", "unit_cost", "trend", "trend_delta",
        ],
        access: TableAccess::ReadOnly,
        computed: &[],
        payload_check: None,
    },
];

pub fn lookup(table: &str) -> Result<&'static TableSpec, AppError> {
    TABLES
        .iter()
        .find(|spec| spec.name == table)
        .ok_or_else(|| AppError::UnknownTable(table.to_string()))
}

// Uma mutação já validada contra o registro
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedMutation {
    pub id: Option<Uuid>,
    pub columns: Vec<&'static str>,
    pub values: Row,
}

impl TableSpec {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }

    pub fn column(&self, column: &str) -> Result<&'static str, AppError> {
        self.columns
            .iter()
            .copied()
            .find(|c| *c == column)
            .ok_or_else(|| AppError::UnknownColumn {
                table: self.name.to_string(),
                column: column.to_string(),
            })
    }

    /// "*" (ou vazio) seleciona todas as colunas do registro.
    pub fn select_columns(&self, columns: &str) -> Result<Vec<&'static str>, AppError> {
        let trimmed = columns.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return Ok(self.columns.to_vec());
        }
        let mut selected = Vec::new();
        for name in trimmed.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            let column = self.column(name)?;
            if !selected.contains(&column) {
                selected.push(column);
            }
        }
        Ok(selected)
    }

    pub fn allows(&self, operation: MutationOperation) -> bool {
        match self.access {
            TableAccess::ReadOnly => false,
            TableAccess::AppendOnly => operation == MutationOperation::Insert,
            TableAccess::ReadWrite => true,
        }
    }

    pub fn prepare(
        &self,
        operation: MutationOperation,
        mut payload: Row,
    ) -> Result<PreparedMutation, AppError> {
        if !self.allows(operation) {
            return Err(AppError::ReadOnlyTable(self.name.to_string()));
        }

        let id = match payload.remove("id") {
            Some(serde_json::Value::String(raw)) => Some(Uuid::parse_str(&raw).map_err(|_| {
                AppError::InvalidPayload(format!("'id' não é um UUID válido: {}", raw))
            })?),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => {
                return Err(AppError::InvalidPayload(format!("'id' inválido: {}", other)));
            }
        };

        match operation {
            MutationOperation::Update | MutationOperation::Delete if id.is_none() => {
                return Err(AppError::InvalidPayload("'id' é obrigatório".into()));
            }
            _ => {}
        }

        if operation == MutationOperation::Delete {
            return Ok(PreparedMutation { id, columns: Vec::new(), values: Row::new() });
        }

        if let Some(check) = self.payload_check {
            check(&payload)?;
        }

        let mut columns = Vec::with_capacity(payload.len());
        for key in payload.keys() {
            let column = self.column(key)?;
            if SERVER_MANAGED.contains(&column) || self.computed.contains(&column) {
                return Err(AppError::InvalidPayload(format!(
                    "A coluna '{}' é preenchida pelo servidor",
                    column
                )));
            }
            columns.push(column);
        }

        if columns.is_empty() {
            return Err(AppError::InvalidPayload("Nenhuma coluna informada".into()));
        }

        // O INSERT pode carregar o id escolhido pelo cliente
        if operation == MutationOperation::Insert {
            if let Some(id) = id {
                payload.insert("id".into(), serde_json::Value::String(id.to_string()));
                columns.insert(0, "id");
            }
        }

        Ok(PreparedMutation { id, columns, values: payload })
    }
}

// O `metadata` de uma movimentação precisa bater com o `movement_type`
fn check_movement_metadata(payload: &Row) -> Result<(), AppError> {
    let movement_type = payload
        .get("movement_type")
        .and_then(|v| v.as_str())
        .and_then(MovementType::parse)
        .ok_or_else(|| AppError::InvalidPayload("'movement_type' ausente ou desconhecido".into()))?;

    let Some(raw) = payload.get("metadata").filter(|v| !v.is_null()) else {
        return Ok(());
    };

    let metadata: StockMovementMetadata = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::InvalidPayload(format!("'metadata' inválido: {}", e)))?;

    if metadata.movement_type() != movement_type {
        return Err(AppError::InvalidPayload(format!(
            "'metadata' do tipo {:?} não corresponde a movement_type {:?}",
            metadata.movement_type(),
            movement_type
        )));
    }
    Ok(())
}
