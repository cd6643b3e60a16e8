//! Prompt templates for SQL generation
//!
//! The guidelines below are requests to the model, not guarantees; the
//! [`crate::guard`] module enforces read-only queries.

/// System prompt with a `{schema}` placeholder
const SYSTEM_TEMPLATE: &str = "You are an expert SQL query generator for PostgreSQL databases.

Your task is to convert natural language questions into valid PostgreSQL SQL queries.

Guidelines:
1. Generate ONLY the SQL query, no explanations or markdown formatting
2. Use proper PostgreSQL syntax
3. Generate only SELECT queries (read-only)
4. Use appropriate JOINs when querying multiple tables
5. Include WHERE clauses for filtering when relevant
6. Use LIMIT when appropriate to avoid returning too many rows
7. Return the raw SQL query without ```sql``` markers or additional text

Database Schema:
{schema}";

/// System and user instructions for one generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub user_instruction: String,
}

impl GenerationRequest {
    pub fn new(builder: &PromptBuilder, schema: &str, question: &str) -> Self {
        Self {
            system_instruction: builder.build_system_message(schema),
            user_instruction: builder.build_user_message(question),
        }
    }
}

/// Builds prompts from a formatted schema and a user question
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_template: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            system_template: SYSTEM_TEMPLATE.to_string(),
        }
    }

    /// Use a custom system template; `{schema}` is replaced with the schema text
    pub fn with_system_template(template: impl Into<String>) -> Self {
        Self {
            system_template: template.into(),
        }
    }

    pub fn build_system_message(&self, schema: &str) -> String {
        self.system_template.replace("{schema}", schema)
    }

    pub fn build_user_message(&self, question: &str) -> String {
        format!("Generate a SQL query to answer: {}", question)
    }

    /// Single-string prompt for backends without a system role
    pub fn build_full_prompt(&self, schema: &str, question: &str) -> String {
        let system_msg = self.build_system_message(schema);
        let user_msg = self.build_user_message(question);
        format!("{}\n\nUser Question:\n{}", system_msg, user_msg)
    }
}
