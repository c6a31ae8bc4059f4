// src/db/sql_builder.rs
//
// Monta o SQL dinâmico da camada genérica. Identificadores vêm SEMPRE do
// registro (`TableSpec`); valores do cliente só entram como parâmetros.
// Convenção: $1 é sempre o tenant_id.

use serde_json::Value;

use crate::{
    common::error::AppError,
    db::table_registry::{PreparedMutation, TableSpec, TENANT_COLUMN},
    models::data::{Filters, QueryOptions, SortDirection, MAX_PAGE_SIZE},
};

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    // Parâmetros a partir de $2, na ordem
    pub json_params: Vec<Value>,
    // Usado por UPDATE / DELETE (vai no $2, antes dos JSON)
    pub uses_id_param: bool,
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

pub fn build_select(
    spec: &TableSpec,
    columns: &str,
    filters: &Filters,
    options: &QueryOptions,
) -> Result<BuiltQuery, AppError> {
    let selected = spec.select_columns(columns)?;

    let projection = selected
        .iter()
        .map(|c| format!("'{}', t.{}", c, quote(c)))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!(
        "SELECT jsonb_build_object({}) AS data FROM {} t WHERE t.{} = $1",
        projection,
        quote(spec.name),
        quote(TENANT_COLUMN)
    );

    let mut json_params = Vec::new();
    for (name, value) in filters {
        let column = spec.column(name)?;
        match value {
            Value::Null => sql.push_str(&format!(" AND t.{} IS NULL", quote(column))),
            // Texto compara com a forma textual da coluna (uuid, date, numeric...)
            Value::String(_) => {
                json_params.push(value.clone());
                sql.push_str(&format!(
                    " AND t.{}::text = (${}::jsonb #>> '{{}}')",
                    quote(column),
                    json_params.len() + 1
                ));
            }
            _ => {
                json_params.push(value.clone());
                sql.push_str(&format!(
                    " AND to_jsonb(t.{}) = ${}::jsonb",
                    quote(column),
                    json_params.len() + 1
                ));
            }
        }
    }

    if let Some(order) = &options.order_by {
        let column = spec.column(&order.column)?;
        let direction = match order.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        sql.push_str(&format!(" ORDER BY t.{} {}", quote(column), direction));
    }

    if let Some((limit, offset)) = options.limit_offset()? {
        if !(1..=MAX_PAGE_SIZE).contains(&limit) || offset < 0 {
            return Err(AppError::InvalidPayload(format!(
                "Paginação inválida (limit={}, offset={})",
                limit, offset
            )));
        }
        sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
    }

    Ok(BuiltQuery { sql, json_params, uses_id_param: false })
}

pub fn build_insert(spec: &TableSpec, prepared: &PreparedMutation) -> BuiltQuery {
    let target_columns = std::iter::once(TENANT_COLUMN)
        .chain(prepared.columns.iter().copied())
        .map(quote)
        .collect::<Vec<_>>()
        .join(", ");
    let source_columns = prepared
        .columns
        .iter()
        .map(|c| format!("r.{}", quote(c)))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "INSERT INTO {table} AS x ({target}) \
         SELECT $1, {source} FROM jsonb_populate_record(NULL::{table}, $2::jsonb) AS r \
         RETURNING to_jsonb(x) AS data",
        table = quote(spec.name),
        target = target_columns,
        source = source_columns,
    );

    BuiltQuery {
        sql,
        json_params: vec![Value::Object(prepared.values.clone())],
        uses_id_param: false,
    }
}

pub fn build_update(spec: &TableSpec, prepared: &PreparedMutation) -> BuiltQuery {
    let mut assignments: Vec<String> = prepared
        .columns
        .iter()
        .map(|c| format!("{} = r.{}", quote(c), quote(c)))
        .collect();
    if spec.has_column("updated_at") {
        assignments.push(format!("{} = NOW()", quote("updated_at")));
    }

    let sql = format!(
        "UPDATE {table} AS x SET {assignments} \
         FROM jsonb_populate_record(NULL::{table}, $3::jsonb) AS r \
         WHERE x.{id} = $2 AND x.{tenant} = $1 \
         RETURNING to_jsonb(x) AS data",
        table = quote(spec.name),
        assignments = assignments.join(", "),
        id = quote("id"),
        tenant = quote(TENANT_COLUMN),
    );

    BuiltQuery {
        sql,
        json_params: vec![Value::Object(prepared.values.clone())],
        uses_id_param: true,
    }
}

pub fn build_delete(spec: &TableSpec) -> BuiltQuery {
    let sql = format!(
        "DELETE FROM {table} AS x WHERE x.{id} = $2 AND x.{tenant} = $1 RETURNING to_jsonb(x) AS data",
        table = quote(spec.name),
        id = quote("id"),
        tenant = quote(TENANT_COLUMN),
    );

    BuiltQuery { sql, json_params: Vec::new(), uses_id_param: true }
}
