//! Single-source execution.
//!
//! Builds the plan, emits SQL for the root database's dialect, runs the
//! statement on that one connection, and maps physical result columns back
//! to logical property names through the reverse column maps of every
//! touched type. Columns with no mapping entry pass through under their raw
//! name, since ad hoc aliases such as aggregate outputs have no mapping.

use crate::ontology_catalog::OntologyCatalog;
use crate::query_model::QueryModel;
use crate::query_planner::build_plan;
use crate::sql_generator::{plan_to_sql, Dialect};

use super::driver::{Driver, ResultSet};
use super::errors::ExecuteError;
use super::touched::{collect_touched, TouchedTypes};
use super::{rows_to_maps, QueryOutcome};

pub async fn execute_single(
    query: &QueryModel,
    catalog: &OntologyCatalog,
    driver: &dyn Driver,
    fallback_dialect: Dialect,
) -> Result<QueryOutcome, ExecuteError> {
    let plan = build_plan(query, catalog)?;

    let touched = collect_touched(query, catalog)?;
    let database = touched.objects[0]
        .datasource
        .as_ref()
        .map(|m| m.database.clone())
        .filter(|db| !db.is_empty())
        .ok_or_else(|| ExecuteError::NoDatabase {
            object: query.object.clone(),
        })?;

    let dialect = driver.dialect(&database).unwrap_or(fallback_dialect);
    let sql = plan_to_sql(&plan, dialect)?;
    log::debug!("single-source query against `{}`: {}", database, sql);

    let mut connection = driver
        .connect(&database)
        .await
        .map_err(|e| ExecuteError::driver(e, sql.clone()))?;
    let result = connection.query(&sql).await;
    if let Err(e) = connection.close().await {
        log::warn!("failed to close connection to `{}`: {}", database, e);
    }
    let result_set = result.map_err(|e| ExecuteError::driver(e, sql.clone()))?;

    Ok(to_logical_outcome(result_set, &touched, sql))
}

/// Rename physical result columns to their logical names; unmapped columns
/// pass through unchanged.
fn to_logical_outcome(result: ResultSet, touched: &TouchedTypes<'_>, sql: String) -> QueryOutcome {
    let columns: Vec<String> = result
        .columns
        .iter()
        .map(|column| logical_name(column, touched))
        .collect();
    let rows = rows_to_maps(&columns, result.rows);
    QueryOutcome { rows, columns, sql }
}

fn logical_name(column: &str, touched: &TouchedTypes<'_>) -> String {
    for object in &touched.objects {
        if let Some(mapping) = &object.datasource {
            if mapping.id_column == column {
                return "id".to_string();
            }
            if let Some(logical) = mapping.logical_for(column) {
                return logical.to_string();
            }
        }
    }
    for link in &touched.links {
        if let Some(mapping) = &link.datasource {
            if mapping.from_column == column {
                return "source_id".to_string();
            }
            if mapping.to_column == column {
                return "target_id".to_string();
            }
            if let Some((logical, _)) = mapping
                .columns
                .iter()
                .find(|(_, physical)| physical.as_str() == column)
            {
                return logical.clone();
            }
        }
    }
    column.to_string()
}
