//! Agent module - natural-language questions to executed SQL
//!
//! Per question:
//! 1. Read the current schema and render it for the prompt
//! 2. Ask the LLM for a query
//! 3. Strip markdown fences from the reply
//! 4. Run the query guard
//! 5. Execute the query and shape the rows
//!
//! Nothing is cached or retried; each call rebuilds the schema context.

mod types;

pub use types::{Answer, QueryResult};

use std::sync::Arc;

use crate::db::{QueryOutcome, SqlExecutor};
use crate::error::{AgentError, Result};
use crate::guard;
use crate::llm::Llm;
use crate::prompt::{GenerationRequest, PromptBuilder};
use crate::schema::SchemaReader;

/// Orchestrates schema lookup, generation, the query guard and execution
pub struct TextToSqlAgent {
    executor: Arc<dyn SqlExecutor>,
    llm: Arc<dyn Llm>,
    schema: SchemaReader,
    prompts: PromptBuilder,
}

impl TextToSqlAgent {
    /// Create a new agent
    pub fn new(executor: Arc<dyn SqlExecutor>, llm: Arc<dyn Llm>) -> Self {
        tracing::info!("TextToSqlAgent initialized with model {}", llm.model());
        Self {
            schema: SchemaReader::new(executor.clone()),
            executor,
            llm,
            prompts: PromptBuilder::new(),
        }
    }

    /// Replace the default prompt templates
    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    /// Schema reader sharing this agent's executor
    pub fn schema_reader(&self) -> &SchemaReader {
        &self.schema
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Generate a query for the question without running it
    pub async fn generate_sql(&self, question: &str) -> Result<String> {
        tracing::info!("Generating SQL for question: {}", question);

        let result = self.generate_inner(question).await;
        match &result {
            Ok(sql) => tracing::info!("Successfully generated SQL: {}", sql),
            Err(e) => tracing::error!("Failed to generate SQL: {}", e),
        }
        result
    }

    async fn generate_inner(&self, question: &str) -> Result<String> {
        let schema = self
            .schema
            .format_schema()
            .await
            .map_err(|e| {
                AgentError::Generation(format!("schema retrieval failed: {}", e))
            })?;

        let request = GenerationRequest::new(&self.prompts, &schema, question);
        let raw = self
            .llm
            .generate_with_system(&request.system_instruction, &request.user_instruction)
            .await
            .map_err(|e| AgentError::Generation(e.to_string()))?;

        let sql = clean_sql_query(&raw);
        if sql.is_empty() {
            return Err(AgentError::Generation(
                "model returned an empty query".to_string(),
            ));
        }
        Ok(sql)
    }

    /// Generate a query, check it, and run it
    pub async fn execute_question(&self, question: &str) -> Result<Answer> {
        let result = self.execute_inner(question).await;
        if let Err(e) = &result {
            tracing::error!("Failed to execute query: {}", e);
        }
        result
    }

    async fn execute_inner(&self, question: &str) -> Result<Answer> {
        let sql = self.generate_sql(question).await?;

        guard::check_query(&sql)?;

        tracing::info!("Executing generated SQL query");
        let rows = match self.executor.run_query(&sql).await? {
            QueryOutcome::Rows(rows) => rows,
            QueryOutcome::Affected(n) => {
                return Err(AgentError::DataAccess(format!(
                    "Generated query returned no rows ({} affected)",
                    n
                )))
            }
        };
        tracing::info!("Query returned {} rows", rows.len());

        Ok(Answer {
            sql_query: sql,
            result: QueryResult::from_rows(rows),
        })
    }
}

/// Strip markdown code fences from a model reply.
///
/// Each pass trims, removes a leading "```sql" (or else "```") and a trailing
/// "```", then trims again. Passes repeat until nothing changes, so cleaning
/// an already cleaned query is a no-op.
pub fn clean_sql_query(raw: &str) -> String {
    let mut sql = raw.trim();
    loop {
        let next = strip_fences(sql);
        if next == sql {
            return sql.to_string();
        }
        sql = next;
    }
}

fn strip_fences(sql: &str) -> &str {
    let mut sql = sql.trim();
    if let Some(rest) = sql.strip_prefix("```sql") {
        sql = rest;
    } else if let Some(rest) = sql.strip_prefix("```") {
        sql = rest;
    }

    if let Some(rest) = sql.strip_suffix("```") {
        sql = rest;
    }

    sql.trim()
}
