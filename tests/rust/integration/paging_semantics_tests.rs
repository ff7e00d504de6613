//! Paging: `limit=10, offset=5` against a 20-row result returns rows 6-15
//! in order-by order, for every supported paging rewrite.

use ontoql::sql_generator::Dialect;
use ontoql::{OntologyCatalog, QueryEngine, QueryModel};
use serde_json::{json, Value};

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
"#,
    )
    .unwrap()
}

fn window_rows() -> Vec<Vec<Value>> {
    // rows 6..=15 of the 20-row ordered set
    (6..=15).map(|n| vec![json!(format!("p{:02}", n))]).collect()
}

fn paged_query() -> QueryModel {
    QueryModel::from_json_value(json!({
        "object": "Vehicle",
        "select": ["plate"],
        "orderBy": [{"field": "plate", "direction": "ASC"}],
        "limit": 10,
        "offset": 5
    }))
    .unwrap()
}

#[tokio::test]
async fn paging_window_is_identical_across_dialects() {
    let cases = [
        (Dialect::MySql, "LIMIT 10 OFFSET 5"),
        (Dialect::PostgreSql, "LIMIT 10 OFFSET 5"),
        (Dialect::Oracle, "OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY"),
        (Dialect::SqlServer, "OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY"),
    ];

    let mut outcomes = Vec::new();
    for (dialect, paging_clause) in cases {
        let driver = ScriptedDriver::new();
        driver.set_dialect("db_a", dialect);
        driver.respond(paging_clause, &["plate"], window_rows());

        let engine = QueryEngine::new(catalog(), driver.clone());
        let outcome = engine.execute_query(&paged_query()).await.unwrap();

        assert!(
            outcome.sql.ends_with(paging_clause),
            "{:?} paging clause missing in: {}",
            dialect,
            outcome.sql
        );
        assert!(outcome.sql.contains("ORDER BY plate ASC"));
        outcomes.push(outcome.rows);
    }

    // rows 6-15, identical content and order everywhere
    for rows in &outcomes {
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0]["plate"], json!("p06"));
        assert_eq!(rows[9]["plate"], json!("p15"));
        assert_eq!(rows, &outcomes[0]);
    }
}
