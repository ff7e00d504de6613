//! The legacy `where` map and the richer `filter` list expressing the same
//! equality condition produce identical results.

use ontoql::sql_generator::Dialect;
use ontoql::{OntologyCatalog, QueryEngine, QueryModel};
use serde_json::json;

use super::fake_driver::ScriptedDriver;

fn catalog() -> OntologyCatalog {
    OntologyCatalog::from_yaml_str(
        r#"
objects:
  Vehicle:
    properties: [plate, owner]
    datasource:
      database: db_a
      table: vehicles
      id_column: vehicle_id
"#,
    )
    .unwrap()
}

fn driver() -> ScriptedDriver {
    let driver = ScriptedDriver::new();
    driver.set_dialect("db_a", Dialect::MySql);
    driver.respond(
        "WHERE (t1.owner = 'Wang')",
        &["plate"],
        vec![vec![json!("苏A11111")], vec![json!("苏B22222")]],
    );
    driver
}

#[tokio::test]
async fn where_map_and_filter_list_are_equivalent() {
    let legacy = QueryModel::from_json_value(json!({
        "object": "Vehicle",
        "select": ["plate"],
        "where": {"owner": "Wang"}
    }))
    .unwrap();
    let modern = QueryModel::from_json_value(json!({
        "object": "Vehicle",
        "select": ["plate"],
        "filter": [["=", "owner", "Wang"]]
    }))
    .unwrap();

    let driver = driver();
    let engine = QueryEngine::new(catalog(), driver.clone());

    let legacy_outcome = engine.execute_query(&legacy).await.unwrap();
    let modern_outcome = engine.execute_query(&modern).await.unwrap();

    // both normalize to the same statement, row count, and content
    assert_eq!(legacy_outcome.sql, modern_outcome.sql);
    assert_eq!(legacy_outcome.rows.len(), 2);
    assert_eq!(legacy_outcome.rows, modern_outcome.rows);
    assert_eq!(legacy_outcome.columns, modern_outcome.columns);
}
