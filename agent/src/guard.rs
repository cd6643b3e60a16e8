//! Query guard - the gate every generated query passes before execution
//!
//! This is a heuristic prefix/substring filter, not a SQL parser:
//!
//! - the trimmed, uppercased text must start with `SELECT`
//! - it must not contain any of [`FORBIDDEN_KEYWORDS`] anywhere, even inside
//!   identifiers or string literals
//!
//! Known gaps: it over-rejects (a column named `update_count` trips the
//! `UPDATE` check) and it does not look for `;`-chained statements, so
//! `SELECT 1; SELECT pg_sleep(10)` passes. Do not treat it as a security
//! boundary; run the agent with a read-only database role.

use thiserror::Error;

/// Keywords that reject a query wherever they appear, in check order
pub const FORBIDDEN_KEYWORDS: [&str; 7] = [
    "DROP", "DELETE", "UPDATE", "INSERT", "ALTER", "CREATE", "TRUNCATE",
];

/// Why a candidate query was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("query does not start with SELECT")]
    NotSelect,
    #[error("query contains forbidden keyword {0}")]
    ForbiddenKeyword(&'static str),
}

/// Check a candidate query, reporting the first rule it fails
pub fn check_query(sql: &str) -> Result<(), Rejection> {
    let normalized = sql.trim().to_uppercase();

    if !normalized.starts_with("SELECT") {
        tracing::warn!("Unsafe query detected: does not start with SELECT");
        return Err(Rejection::NotSelect);
    }

    if let Some(keyword) = FORBIDDEN_KEYWORDS
        .into_iter()
        .find(|keyword| normalized.contains(keyword))
    {
        tracing::warn!("Unsafe query detected: contains {}", keyword);
        return Err(Rejection::ForbiddenKeyword(keyword));
    }

    Ok(())
}

/// True if the query may be executed
pub fn is_query_safe(sql: &str) -> bool {
    check_query(sql).is_ok()
}
