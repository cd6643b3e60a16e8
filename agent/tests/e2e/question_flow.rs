//! E2E test: question to rows through the agent

use std::sync::Arc;

use sql_agent::agent::TextToSqlAgent;
use sql_agent::db::SqlExecutor;
use sql_agent::AgentError;

use super::prerequisites::{connect, create_users_table, drop_table, table_name, StaticLlm};

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_show_me_all_users() {
    let db = connect().await;
    let table = table_name("flow");
    create_users_table(&db, &table).await;

    let reply = format!("```sql\nSELECT * FROM {} ORDER BY id;\n```", table);
    let agent = TextToSqlAgent::new(Arc::new(db.clone()), Arc::new(StaticLlm(reply)));

    let answer = agent.execute_question("Show me all users").await.unwrap();
    assert_eq!(answer.sql_query, format!("SELECT * FROM {} ORDER BY id;", table));
    assert_eq!(answer.result.row_count, 2);

    drop_table(&db, &table).await;
    db.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_unsafe_reply_leaves_table_intact() {
    let db = connect().await;
    let table = table_name("unsafe");
    create_users_table(&db, &table).await;

    let reply = format!("DROP TABLE {};", table);
    let agent = TextToSqlAgent::new(Arc::new(db.clone()), Arc::new(StaticLlm(reply)));

    let err = agent.execute_question("drop it").await.unwrap_err();
    assert!(matches!(err, AgentError::UnsafeQuery(_)));

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
