//! Federated execution.
//!
//! For a query spanning several physical databases: mount each involved
//! database under a namespaced alias on one virtual connection, generate a
//! view per touched object/link type that resolves physical names to
//! logical ones, then emit and run the same logical SQL a single-source
//! query would use; the views make the logical names resolve regardless of
//! which database backs them. Mounts and views are torn down on every exit
//! path; the per-request mount cost is the accepted price of correctness.

use uuid::Uuid;

use crate::ontology_catalog::OntologyCatalog;
use crate::query_model::QueryModel;
use crate::query_planner::{build_plan, PlanBuilderError};
use crate::sql_generator::{link_view_sql, object_view_sql, plan_to_sql, Dialect};

use super::driver::{Connection, Driver, ResultSet};
use super::errors::ExecuteError;
use super::touched::{collect_touched, TouchedTypes};
use super::{rows_to_maps, QueryOutcome};

pub async fn execute_federated(
    query: &QueryModel,
    catalog: &OntologyCatalog,
    driver: &dyn Driver,
    fallback_dialect: Dialect,
) -> Result<QueryOutcome, ExecuteError> {
    let touched = collect_touched(query, catalog)?;
    let mounts = plan_mounts(&touched)?;
    let dialect = driver.virtual_dialect().unwrap_or(fallback_dialect);

    let plan = build_plan(query, catalog)?;
    let sql = plan_to_sql(&plan, dialect)?;

    let mut connection = driver
        .connect_virtual()
        .await
        .map_err(|e| ExecuteError::driver(e, sql.clone()))?;

    // Track what actually got created so teardown only removes that much,
    // then run teardown on success and failure alike
    let mut attached: Vec<String> = Vec::new();
    let mut views: Vec<String> = Vec::new();
    let result = run(
        connection.as_mut(),
        &touched,
        &mounts,
        &sql,
        dialect,
        &mut attached,
        &mut views,
    )
    .await;
    teardown(connection.as_mut(), &attached, &views, dialect).await;
    if let Err(e) = connection.close().await {
        log::warn!("failed to close virtual connection: {}", e);
    }

    let result_set = result?;
    // The generated views and projection aliases already use logical names
    let columns = result_set.columns.clone();
    let rows = rows_to_maps(&columns, result_set.rows);
    Ok(QueryOutcome { rows, columns, sql })
}

/// One mount per distinct database, aliased by the sanitized identifier
/// plus a per-request suffix so concurrent federated queries never collide.
struct Mount {
    database: String,
    alias: String,
}

fn plan_mounts(touched: &TouchedTypes<'_>) -> Result<Vec<Mount>, ExecuteError> {
    let suffix = Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..8];

    let mut mounts: Vec<Mount> = Vec::new();
    let mut require = |type_name: &str, database: Option<&str>| -> Result<(), ExecuteError> {
        let database = database.filter(|db| !db.is_empty()).ok_or_else(|| {
            ExecuteError::Plan(PlanBuilderError::MappingNotConfigured {
                type_name: type_name.to_string(),
            })
        })?;
        if !mounts.iter().any(|m| m.database == database) {
            mounts.push(Mount {
                database: database.to_string(),
                alias: format!("{}_{}", sanitize(database), suffix),
            });
        }
        Ok(())
    };

    for object in &touched.objects {
        require(
            &object.name,
            object.datasource.as_ref().map(|m| m.database.as_str()),
        )?;
    }
    for link in &touched.links {
        require(
            &link.name,
            link.datasource.as_ref().map(|m| m.database.as_str()),
        )?;
    }
    Ok(mounts)
}

async fn run(
    connection: &mut dyn Connection,
    touched: &TouchedTypes<'_>,
    mounts: &[Mount],
    sql: &str,
    dialect: Dialect,
    attached: &mut Vec<String>,
    views: &mut Vec<String>,
) -> Result<ResultSet, ExecuteError> {
    for mount in mounts {
        let statement = format!(
            "ATTACH DATABASE '{}' AS {}",
            mount.database.replace('\'', "''"),
            mount.alias
        );
        log::debug!("federation mount: {}", statement);
        connection
            .execute(&statement)
            .await
            .map_err(|e| ExecuteError::driver(e, statement.clone()))?;
        attached.push(mount.alias.clone());
    }

    for &object in &touched.objects {
        let mapping = object.datasource.as_ref().expect("checked in plan_mounts");
        let view = object_view_sql(object, alias_for(mounts, &mapping.database), dialect)?;
        log::debug!("federation view: {}", view);
        connection
            .execute(&view)
            .await
            .map_err(|e| ExecuteError::driver(e, view.clone()))?;
        views.push(object.name.clone());
    }
    for &link in &touched.links {
        let mapping = link.datasource.as_ref().expect("checked in plan_mounts");
        let view = link_view_sql(link, alias_for(mounts, &mapping.database), dialect)?;
        log::debug!("federation view: {}", view);
        connection
            .execute(&view)
            .await
            .map_err(|e| ExecuteError::driver(e, view.clone()))?;
        views.push(link.name.clone());
    }

    log::debug!("federated query: {}", sql);
    connection
        .query(sql)
        .await
        .map_err(|e| ExecuteError::driver(e, sql.to_string()))
}

/// Best-effort cleanup; failures are logged, not propagated, so the query
/// outcome (or its original error) survives.
async fn teardown(
    connection: &mut dyn Connection,
    attached: &[String],
    views: &[String],
    dialect: Dialect,
) {
    for view in views {
        let statement = format!("DROP VIEW {}", dialect.identifier(view));
        if let Err(e) = connection.execute(&statement).await {
            log::warn!("federation teardown: {} failed: {}", statement, e);
        }
    }
    for alias in attached {
        let statement = format!("DETACH DATABASE {}", alias);
        if let Err(e) = connection.execute(&statement).await {
            log::warn!("federation teardown: {} failed: {}", statement, e);
        }
    }
}

fn alias_for<'a>(mounts: &'a [Mount], database: &str) -> &'a str {
    mounts
        .iter()
        .find(|m| m.database == database)
        .map(|m| m.alias.as_str())
        .expect("every touched database was mounted")
}

fn sanitize(database: &str) -> String {
    database
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
