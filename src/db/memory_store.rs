// src/db/memory_store.rs
//
// Implementação em memória da camada de dados, usada pelos testes de
// serviço e de rotas. Aplica o mesmo registro de tabelas do Postgres.

use std::{cmp::Ordering, collections::HashMap, sync::RwLock};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        data_access::{MutationService, TenantDataAccess},
        table_registry::{self, TENANT_COLUMN},
    },
    models::data::{Filters, MutationOperation, MutationResult, QueryOptions, Row, SortDirection},
};

#[derive(Default)]
pub struct InMemoryTenantStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl InMemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, tenant_id: Uuid, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.write().unwrap();
        let entry = tables.entry(table.to_string()).or_default();
        for value in rows {
            let mut row = value.as_object().cloned().expect("seed rows must be objects");
            row.insert(TENANT_COLUMN.into(), Value::String(tenant_id.to_string()));
            entry.push(row);
        }
    }
}

// Mesma regra do Postgres: filtro texto compara com a forma textual da coluna
fn matches_filter(value: Option<&Value>, filter: &Value) -> bool {
    match (value.unwrap_or(&Value::Null), filter) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(v), Value::String(f)) => v == f,
        (v, Value::String(f)) => v.to_string() == *f,
        (v, f) => v == f,
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None | Some(Value::Null), Some(_)) => Ordering::Greater,
        (Some(_), None | Some(Value::Null)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl TenantDataAccess for InMemoryTenantStore {
    async fn query(
        &self,
        tenant_id: Uuid,
        table: &str,
        columns: &str,
        filters: &Filters,
        options: &QueryOptions,
    ) -> Result<Vec<Row>, AppError> {
        let spec = table_registry::lookup(table)?;
        let selected = spec.select_columns(columns)?;
        for name in filters.keys() {
            spec.column(name)?;
        }

        let tenant = Value::String(tenant_id.to_string());
        let tables = self.tables.read().unwrap();
        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.get(TENANT_COLUMN) == Some(&tenant))
                    .filter(|row| {
                        filters
                            .iter()
                            .all(|(k, v)| matches_filter(row.get(k), v))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &options.order_by {
            let column = spec.column(&order.column)?;
            rows.sort_by(|a, b| {
                let ord = compare(a.get(column), b.get(column));
                match order.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        if let Some((limit, offset)) = options.limit_offset()? {
            rows = rows.into_iter().skip(offset as usize).take(limit as usize).collect();
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                selected
                    .iter()
                    .map(|c| (c.to_string(), row.get(*c).cloned().unwrap_or(Value::Null)))
                    .collect()
            })
            .collect())
    }
}

#[async_trait]
impl MutationService for InMemoryTenantStore {
    async fn mutate(
        &self,
        tenant_id: Uuid,
        table: &str,
        operation: MutationOperation,
        payload: Row,
    ) -> Result<MutationResult, AppError> {
        let spec = table_registry::lookup(table)?;
        let prepared = spec.prepare(operation, payload)?;
        let tenant = Value::String(tenant_id.to_string());

        let mut tables = self.tables.write().unwrap();
        let rows = tables.entry(table.to_string()).or_default();

        let not_found = || AppError::RowNotFound {
            table: table.to_string(),
            id: prepared.id.map(|id| id.to_string()).unwrap_or_default(),
        };
        let position = |rows: &[Row]| {
            let id = prepared.id.map(|id| Value::String(id.to_string()));
            rows.iter().position(|row| {
                row.get(TENANT_COLUMN) == Some(&tenant) && row.get("id") == id.as_ref()
            })
        };

        let row = match operation {
            MutationOperation::Insert => {
                let mut row = prepared.values.clone();
                row.entry("id")
                    .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
                row.insert(TENANT_COLUMN.into(), tenant.clone());
                rows.push(row.clone());
                row
            }
            MutationOperation::Update => {
                let index = position(rows.as_slice()).ok_or_else(not_found)?;
                for (k, v) in &prepared.values {
                    rows[index].insert(k.clone(), v.clone());
                }
                rows[index].clone()
            }
            MutationOperation::Delete => {
                let index = position(rows.as_slice()).ok_or_else(not_found)?;
                rows.remove(index)
            }
        };

        Ok(MutationResult { operation, table: table.to_string(), row })
    }
}
