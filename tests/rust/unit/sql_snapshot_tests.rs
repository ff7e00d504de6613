//! Full-pipeline SQL snapshots: wire query in, dialect-correct SQL out.

use ontoql::ontology_catalog::OntologyCatalog;
use ontoql::query_model::QueryModel;
use ontoql::query_planner::build_plan;
use ontoql::sql_generator::{plan_to_sql, Dialect};
use serde_json::json;

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
  Media:
    properties: [code]
    datasource:
      database: db_b
      table: media
      id_column: media_id
  Station:
    properties: [city]
    datasource:
      database: db_b
      table: stations
      id_column: station_id
  TollRecord:
    properties:
      - station
      - name: amount
        type: float
    datasource:
      database: db_a
      table: toll_records
      id_column: record_id
links:
  hasMedia:
    from: Vehicle
    to: Media
    datasource:
      database: db_a
      table: vehicle_media
      from_column: vehicle_id
      to_column: media_id
  capturedAt:
    from: Media
    to: Station
    datasource:
      database: db_b
      table: media_stations
      from_column: media_id
      to_column: station_id
  hasTollRecords:
    from: Vehicle
    to: TollRecord
    datasource:
      database: db_a
      table: vehicle_tolls
      from_column: vehicle_id
      to_column: record_id
"#,
    )
    .unwrap()
}

fn sql_for(query: serde_json::Value, dialect: Dialect) -> String {
    let query = QueryModel::from_json_value(query).unwrap();
    let plan = build_plan(&query, &catalog()).unwrap();
    plan_to_sql(&plan, dialect).unwrap()
}

#[test]
fn nested_traversal_chains_joins_hop_by_hop() {
    let sql = sql_for(
        json!({
            "object": "Vehicle",
            "select": ["plate", "hasMedia.capturedAt.city"],
            "links": [{"name": "hasMedia", "links": [{"name": "capturedAt"}]}]
        }),
        Dialect::MySql,
    );
    assert_eq!(
        sql,
        "SELECT t1.plate AS plate, t5.city AS city\n\
         FROM Vehicle AS t1\n\
         LEFT OUTER JOIN hasMedia AS t2 ON t1.id = t2.source_id\n\
         LEFT OUTER JOIN Media AS t3 ON t2.target_id = t3.id\n\
         LEFT OUTER JOIN capturedAt AS t4 ON t3.id = t4.source_id\n\
         LEFT OUTER JOIN Station AS t5 ON t4.target_id = t5.id"
    );
}

#[test]
fn aggregate_query_renders_identically_except_paging() {
    let query = json!({
        "object": "Vehicle",
        "links": [{"name": "hasTollRecords"}],
        "group_by": ["owner"],
        "metrics": [["sum", "hasTollRecords.amount", "total"], ["count", "*"]],
        "orderBy": [{"field": "owner"}],
        "limit": 10,
        "offset": 5
    });

    let body = "SELECT t1.owner AS owner, SUM(t3.amount) AS total, COUNT(*) AS count_all\n\
                FROM Vehicle AS t1\n\
                LEFT OUTER JOIN hasTollRecords AS t2 ON t1.id = t2.source_id\n\
                LEFT OUTER JOIN TollRecord AS t3 ON t2.target_id = t3.id\n\
                GROUP BY t1.owner\n\
                ORDER BY owner ASC\n";

    assert_eq!(
        sql_for(query.clone(), Dialect::MySql),
        format!("{}LIMIT 10 OFFSET 5", body)
    );
    assert_eq!(
        sql_for(query.clone(), Dialect::Oracle),
        format!("{}OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY", body)
    );
    assert_eq!(
        sql_for(query, Dialect::SqlServer),
        format!("{}OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY", body)
    );
}

#[test]
fn traversal_filter_preserves_left_outer_joins() {
    let sql = sql_for(
        json!({
            "object": "Vehicle",
            "select": ["plate"],
            "filter": [["=", "owner", "王强"]],
            "links": [{"name": "hasTollRecords", "filter": [[">", "amount", 100]], "select": ["amount"]}]
        }),
        Dialect::PostgreSql,
    );
    assert_eq!(
        sql,
        "SELECT t1.plate AS plate, t3.amount AS amount\n\
         FROM Vehicle AS t1\n\
         LEFT OUTER JOIN hasTollRecords AS t2 ON t1.id = t2.source_id\n\
         LEFT OUTER JOIN TollRecord AS t3 ON t2.target_id = t3.id\n\
         WHERE (t3.amount > 100) AND (t1.owner = '王强')"
    );
}
