//! Query decomposition types
//!
//! Splitting a question into sub-queries is not implemented yet: every query
//! decomposes into itself. Callers already consume the list form so real
//! splitting can land here without touching them.

use serde::{Deserialize, Serialize};

/// Sub-queries derived from one user query. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDecomposition {
    pub sub_queries: Vec<String>,
}

impl QueryDecomposition {
    /// The trivial decomposition: the query itself
    pub fn single(query: impl Into<String>) -> Self {
        Self {
            sub_queries: vec![query.into()],
        }
    }
}

/// Decompose a query into sub-queries.
///
/// TODO: replace the pass-through with LLM-driven splitting once downstream
/// retrieval can merge answers for multiple sub-queries.
pub fn decompose(query: &str) -> QueryDecomposition {
    QueryDecomposition::single(query)
}
