//! Single-source execution: dialect selection, reverse column mapping,
//! non-ASCII literal round-trips, and error annotation.

use ontoql::executor::ExecuteError;
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
      columns:
        plate: plate_no
"#,
    )
    .unwrap()
}

#[tokio::test]
async fn physical_result_columns_map_back_to_logical_names() {
    let driver = ScriptedDriver::new();
    driver.set_dialect("db_a", Dialect::MySql);
    // the physical layer answers with raw column names plus an ad hoc alias
    driver.respond(
        "FROM Vehicle AS t1",
        &["vehicle_id", "plate_no", "total"],
        vec![vec![json!(7), json!("苏A12345"), json!(3)]],
    );

    let engine = QueryEngine::new(catalog(), driver.clone());
    let outcome = engine
        .execute_query(&QueryModel::from_json_value(json!({"object": "Vehicle"})).unwrap())
        .await
        .unwrap();

    // mapped columns take their logical names; unmapped ones pass through
    assert_eq!(outcome.columns, vec!["id", "plate", "total"]);
    assert_eq!(outcome.rows[0]["plate"], json!("苏A12345"));
    assert_eq!(outcome.rows[0]["total"], json!(3));

    assert_eq!(driver.connected(), vec!["db_a"]);
    assert_eq!(driver.closed(), 1);
}

#[tokio::test]
async fn non_ascii_literal_round_trips_through_emission_and_execution() {
    let driver = ScriptedDriver::new();
    driver.set_dialect("db_a", Dialect::MySql);
    driver.respond(
        "(t1.plate LIKE '江苏%')",
        &["plate_no"],
        vec![vec![json!("江苏A12345")]],
    );

    let engine = QueryEngine::new(catalog(), driver.clone());
    let outcome = engine
        .execute_query(
            &QueryModel::from_json_value(json!({
                "object": "Vehicle",
                "select": ["plate"],
                "filter": [["like", "plate", "江苏%"]]
            }))
            .unwrap(),
        )
        .await
        .unwrap();

    // the literal reached the driver byte-exact and the value came back
    // byte-exact
    assert!(outcome.sql.contains("'江苏%'"));
    assert_eq!(outcome.rows[0]["plate"], json!("江苏A12345"));
}

#[tokio::test]
async fn driver_errors_are_annotated_with_the_emitted_sql() {
    let driver = ScriptedDriver::new();
    driver.fail("FROM Vehicle AS t1", "table has gone missing");

    let engine = QueryEngine::new(catalog(), driver.clone());
    let err = engine
        .execute_query(&QueryModel::from_json_value(json!({"object": "Vehicle"})).unwrap())
        .await
        .unwrap_err();

    match err {
        ExecuteError::Driver { sql, source } => {
            assert!(sql.contains("SELECT *\nFROM Vehicle AS t1"));
            assert!(source.to_string().contains("table has gone missing"));
        }
        other => panic!("expected a driver error, got {:?}", other),
    }
    // the connection is released on the failure path too
    assert_eq!(driver.closed(), 1);
}

#[tokio::test]
async fn unknown_driver_dialect_falls_back_to_the_configured_default() {
    let driver = ScriptedDriver::new();
    // no dialect registered for db_a: the engine default (mysql) applies
    let engine = QueryEngine::new(catalog(), driver.clone());
    let outcome = engine
        .execute_query(
            &QueryModel::from_json_value(json!({"object": "Vehicle", "limit": 3})).unwrap(),
        )
        .await
        .unwrap();
    assert!(outcome.sql.ends_with("LIMIT 3"));
}
