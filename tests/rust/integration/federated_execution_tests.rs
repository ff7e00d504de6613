//! Federated execution end to end over the scripted driver: routing,
//! mounts, view generation, left-outer semantics, and teardown.

use ontoql::config::EngineConfig;
use ontoql::executor::{route, ExecuteError, Route};
use ontoql::sql_generator::Dialect;
use ontoql::{OntologyCatalog, QueryEngine, QueryModel};
use serde_json::json;

use super::fake_driver::ScriptedDriver;

fn catalog() -> OntologyCatalog {
    OntologyCatalog::from_yaml_str(
        r#"
objects:
  Vehicle:
    properties: [plate]
    datasource:
      database: db_a
      table: vehicles
      id_column: vehicle_id
      columns:
        plate: plate_no
  Media:
    properties: [code]
    datasource:
      database: db_b
      table: media
      id_column: media_id
links:
  hasMedia:
    from: Vehicle
    to: Media
    cardinality: one_to_many
    datasource:
      database: db_a
      table: vehicle_media
      from_column: vehicle_id
      to_column: media_id
"#,
    )
    .unwrap()
}

fn vehicle_media_query() -> QueryModel {
    QueryModel::from_json_value(json!({
        "object": "Vehicle",
        "select": ["plate"],
        "links": [{"name": "hasMedia", "select": ["code"]}]
    }))
    .unwrap()
}

#[test]
fn cross_database_query_routes_federated() {
    assert_eq!(
        route(&vehicle_media_query(), &catalog()),
        Route::Federated
    );
}

#[tokio::test]
async fn federated_join_preserves_vehicles_without_media() {
    super::init_logging();
    let driver = ScriptedDriver::new();
    driver.set_virtual_dialect(Dialect::PostgreSql);
    driver.respond(
        "FROM Vehicle AS t1",
        &["plate", "code"],
        vec![
            vec![json!("苏A11111"), json!("M-001")],
            vec![json!("苏B22222"), json!("M-002")],
            vec![json!("苏C33333"), json!(null)],
        ],
    );

    let engine = QueryEngine::new(catalog(), driver.clone());
    let outcome = engine.execute_query(&vehicle_media_query()).await.unwrap();

    // one row per vehicle; the unlinked vehicle appears with a null code
    assert_eq!(outcome.columns, vec!["plate", "code"]);
    assert_eq!(outcome.rows.len(), 3);
    assert_eq!(outcome.rows[0]["code"], json!("M-001"));
    assert!(outcome.rows[2]["code"].is_null());

    assert_eq!(
        outcome.sql,
        "SELECT t1.plate AS plate, t3.code AS code\n\
         FROM Vehicle AS t1\n\
         LEFT OUTER JOIN hasMedia AS t2 ON t1.id = t2.source_id\n\
         LEFT OUTER JOIN Media AS t3 ON t2.target_id = t3.id"
    );
}

#[tokio::test]
async fn federation_mounts_views_and_tears_down() {
    super::init_logging();
    let driver = ScriptedDriver::new();
    driver.set_virtual_dialect(Dialect::PostgreSql);
    driver.respond("FROM Vehicle AS t1", &["plate", "code"], vec![]);

    let engine = QueryEngine::new(catalog(), driver.clone());
    engine.execute_query(&vehicle_media_query()).await.unwrap();

    let statements = driver.statements();

    // one mount per distinct database
    let attaches: Vec<&String> = statements
        .iter()
        .filter(|s| s.starts_with("ATTACH DATABASE"))
        .collect();
    assert_eq!(attaches.len(), 2);
    assert!(attaches[0].contains("'db_a' AS db_a_"));
    assert!(attaches[1].contains("'db_b' AS db_b_"));

    // one view per foreign object plus the link table, resolving physical
    // columns to logical names
    let views: Vec<&String> = statements
        .iter()
        .filter(|s| s.starts_with("CREATE VIEW"))
        .collect();
    assert_eq!(views.len(), 3);
    assert!(views[0].starts_with("CREATE VIEW Vehicle AS SELECT vehicle_id AS id, plate_no AS plate FROM db_a_"));
    assert!(views[1].starts_with("CREATE VIEW Media AS SELECT media_id AS id, code AS code FROM db_b_"));
    assert!(views[2].starts_with(
        "CREATE VIEW hasMedia AS SELECT vehicle_id AS source_id, media_id AS target_id FROM db_a_"
    ));

    // teardown drops everything it created and detaches both mounts
    assert_eq!(
        statements
            .iter()
            .filter(|s| s.starts_with("DROP VIEW"))
            .count(),
        3
    );
    assert_eq!(
        statements
            .iter()
            .filter(|s| s.starts_with("DETACH DATABASE"))
            .count(),
        2
    );

    // the whole exchange runs on one virtual connection, closed at the end,
    // without the query author naming any physical database
    assert_eq!(driver.virtual_connections(), 1);
    assert_eq!(driver.closed(), 1);
    assert!(driver.connected().is_empty());
}

#[tokio::test]
async fn failed_federated_query_still_tears_down() {
    let driver = ScriptedDriver::new();
    driver.set_virtual_dialect(Dialect::PostgreSql);
    driver.fail("FROM Vehicle AS t1", "virtual namespace exploded");

    let engine = QueryEngine::new(catalog(), driver.clone());
    let err = engine
        .execute_query(&vehicle_media_query())
        .await
        .unwrap_err();

    match err {
        ExecuteError::Driver { sql, .. } => assert!(sql.contains("FROM Vehicle AS t1")),
        other => panic!("expected a driver error, got {:?}", other),
    }

    let statements = driver.statements();
    assert_eq!(
        statements
            .iter()
            .filter(|s| s.starts_with("DROP VIEW"))
            .count(),
        3
    );
    assert_eq!(
        statements
            .iter()
            .filter(|s| s.starts_with("DETACH DATABASE"))
            .count(),
        2
    );
    assert_eq!(driver.closed(), 1);
}

#[tokio::test]
async fn federation_can_be_disabled_by_configuration() {
    let driver = ScriptedDriver::new();
    let config = EngineConfig {
        federation_enabled: false,
        ..EngineConfig::default()
    };
    let engine = QueryEngine::with_config(catalog(), driver, config).unwrap();
    let err = engine
        .execute_query(&vehicle_media_query())
        .await
        .unwrap_err();
    assert!(matches!(err, ExecuteError::FederationDisabled));
}
