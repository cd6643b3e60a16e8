//! E2E test: query execution and schema introspection against PostgreSQL

use serde_json::json;

use sql_agent::db::{QueryOutcome, SqlExecutor};
use sql_agent::schema::{format_for_prompt, SchemaReader};

use super::prerequisites::{connect, create_users_table, drop_table, table_name};

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_ping() {
    let db = connect().await;
    db.ping().await.expect("ping failed");
    db.ensure_connection().await.expect("ensure_connection failed");
    db.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_run_query_outcomes() {
    let db = connect().await;
    let table = table_name("outcomes");
    create_users_table(&db, &table).await;

    let outcome = db
        .run_query(&format!("UPDATE {} SET name = 'Grace' WHERE id = 2", table))
        .await
        .unwrap();
    assert_eq!(outcome, QueryOutcome::Affected(1));

    let rows = db
        .run_query(&format!("SELECT id, name FROM {} ORDER BY id", table))
        .await
        .unwrap()
        .into_rows()
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], json!(1));
    assert_eq!(rows[1]["name"], json!("Grace"));

    drop_table(&db, &table).await;
    db.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_dynamic_value_decoding() {
    let db = connect().await;

    let rows = db
        .run_query(
            "SELECT true AS flag, 2::int8 AS big, 1.5::float8 AS ratio, \
             12.50::numeric AS price, NULL::text AS missing, 'x'::text AS label",
        )
        .await
        .unwrap()
        .into_rows()
        .unwrap();

    let row = &rows[0];
    assert_eq!(row["flag"], json!(true));
    assert_eq!(row["big"], json!(2));
    assert_eq!(row["ratio"], json!(1.5));
    assert_eq!(row["price"], json!("12.50"));
    assert_eq!(row["missing"], json!(null));
    assert_eq!(row["label"], json!("x"));

    db.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_failed_statement_rolls_back() {
    let db = connect().await;
    let table = table_name("rollback");
    create_users_table(&db, &table).await;

    let result = db
        .run_query(&format!("INSERT INTO {} (id) VALUES (NULL)", table))
        .await;
    assert!(result.is_err());

    // connection is usable after the failed transaction
    let rows = db
        .run_query(&format!("SELECT * FROM {}", table))
        .await
        .unwrap()
        .into_rows()
        .unwrap();
    assert_eq!(rows.len(), 2);

    drop_table(&db, &table).await;
    db.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_read_schema_includes_table() {
    let db = connect().await;
    let table = table_name("schema");
    create_users_table(&db, &table).await;

    let reader = SchemaReader::new(std::sync::Arc::new(db.clone()));
    let snapshot = reader.read_schema().await.unwrap();

    let (_, columns) = snapshot
        .tables()
        .find(|(name, _)| *name == table)
        .expect("table missing from schema");
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].column, "id");
    assert!(!columns[0].nullable);
    assert!(columns[1].nullable);

    let text = format_for_prompt(&snapshot);
    assert!(text.contains(&format!(
        "Table: {}\n  - id (integer) NOT NULL\n  - name (character varying) NULL",
        table
    )));

    let sample = reader.sample_rows(&table, 1).await.unwrap();
    assert_eq!(sample.len(), 1);

    drop_table(&db, &table).await;
    db.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_reconnect_after_close() {
    let db = connect().await;
    db.close().await.unwrap();

    assert!(db.ping().await.is_err());
    db.ensure_connection().await.expect("reconnect failed");
    db.ping().await.expect("ping after reconnect failed");

    db.close().await.unwrap();
}
