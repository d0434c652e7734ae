use std::sync::Arc;

use anyhow::{Context, Result, bail};
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GraphQL envelope
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GraphQLPayload<'a, V: Serialize> {
    query: &'static str,
    variables: &'a V,
}

#[derive(Deserialize)]
struct GraphQLResponse<D> {
    data: Option<D>,
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

/// `rateLimit { limit remaining cost }`, selectable in any query.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct RawRateLimit {
    pub limit: u32,
    pub remaining: u32,
    pub cost: u32,
}

impl RawRateLimit {
    pub(crate) fn log(self, operation: &str) {
        tracing::debug!(
            operation,
            limit = self.limit,
            remaining = self.remaining,
            cost = self.cost,
            "GraphQL rate limit"
        );
    }
}

/// Run a GraphQL document and return its `data`.
///
/// Any entry in `errors` fails the call, as does a missing `data` field.
pub(crate) async fn execute<V, D>(
    octocrab: &Arc<Octocrab>,
    operation: &str,
    query: &'static str,
    variables: &V,
) -> Result<D>
where
    V: Serialize + Sync,
    D: DeserializeOwned,
{
    tracing::debug!(operation, "GraphQL request");
    let payload = GraphQLPayload { query, variables };
    let response: GraphQLResponse<D> = octocrab
        .graphql(&payload)
        .await
        .with_context(|| format!("GraphQL {operation} request failed"))?;

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        bail!("GraphQL errors in {operation}: {}", messages.join("; "));
    }

    response
        .data
        .with_context(|| format!("GraphQL {operation} response missing data field"))
}
