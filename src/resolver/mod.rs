/// Search resolver: classification, ID short-circuit, and the fallback cascade
///
/// One resolver instance serves all requests; each call is an independent,
/// strictly sequential pipeline. Free-text queries walk an ordered stage list
/// (semantic → full-text → substring) and stop at the first non-empty success.
/// Stage errors degrade to the next stage; only the terminal substring stage
/// can surface a genuine search failure, and an ID-lookup failure never falls
/// through to text search — explicit lookups are definitionally precise, and a
/// keyword fallback would return effectively unrelated matches.

pub mod normalize;

pub use normalize::SearchResult;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::CascadeConfig;
use crate::errors::SearchError;
use crate::nlp::SemanticBackend;
use crate::query::{classify, QueryPlan};
use crate::store::ProductStore;

/// Which backend produced a result set. Exposed for logging and tests;
/// the HTTP response shape is identical regardless of origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    IdLookup,
    Semantic,
    Fulltext,
    Substring,
}

impl Origin {
    fn as_str(self) -> &'static str {
        match self {
            Origin::IdLookup => "id_lookup",
            Origin::Semantic => "semantic",
            Origin::Fulltext => "fulltext",
            Origin::Substring => "substring",
        }
    }
}

/// The text cascade's stage list, in fallthrough order. No backward
/// transitions; the last entry is terminal.
const TEXT_STAGES: [Origin; 3] = [Origin::Semantic, Origin::Fulltext, Origin::Substring];

/// Outcome of one search request.
///
/// `results` is always a list, possibly empty. `failed` is only set when the
/// terminal stage (or an ID lookup) hit a storage failure with no fallback
/// left; partial degradation is invisible here except as reduced relevance.
#[derive(Debug)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub origin: Option<Origin>,
    pub failed: bool,
}

impl SearchOutcome {
    fn empty() -> Self {
        SearchOutcome {
            results: Vec::new(),
            origin: None,
            failed: false,
        }
    }

    fn failure() -> Self {
        SearchOutcome {
            results: Vec::new(),
            origin: None,
            failed: true,
        }
    }

    fn from_stage(origin: Origin, results: Vec<SearchResult>) -> Self {
        SearchOutcome {
            results,
            origin: Some(origin),
            failed: false,
        }
    }
}

/// Request-scoped search pipeline over a product store and an optional
/// semantic collaborator.
pub struct SearchResolver {
    store: Arc<dyn ProductStore>,
    nlp: Option<Arc<dyn SemanticBackend>>,
    policy: CascadeConfig,
}

impl SearchResolver {
    pub fn new(
        store: Arc<dyn ProductStore>,
        nlp: Option<Arc<dyn SemanticBackend>>,
        policy: CascadeConfig,
    ) -> Self {
        SearchResolver { store, nlp, policy }
    }

    /// Resolve one search request.
    pub async fn resolve(&self, q: &str, id: Option<&str>, ids: Option<&str>) -> SearchOutcome {
        match classify(q, id, ids) {
            QueryPlan::Empty => SearchOutcome::empty(),
            QueryPlan::Ids(ids) => self.resolve_ids(&ids).await,
            QueryPlan::Text(text) => self.resolve_text(&text).await,
        }
    }

    /// Direct keyed fetch; never enters the text cascade.
    async fn resolve_ids(&self, ids: &[i64]) -> SearchOutcome {
        match self
            .with_store_timeout(self.store.fetch_by_ids(ids))
            .await
        {
            Ok(rows) => {
                let results: Vec<SearchResult> =
                    rows.into_iter().map(normalize::from_id_row).collect();
                tracing::debug!(count = results.len(), "ID lookup resolved");
                SearchOutcome::from_stage(Origin::IdLookup, results)
            }
            Err(e) => {
                tracing::error!(error = %e, "ID lookup failed; not falling through to text search");
                SearchOutcome::failure()
            }
        }
    }

    /// Walk the stage list; first non-empty success wins.
    async fn resolve_text(&self, text: &str) -> SearchOutcome {
        for stage in TEXT_STAGES {
            let terminal = stage == Origin::Substring;
            match self.run_stage(stage, text).await {
                Ok(results) if !results.is_empty() => {
                    tracing::debug!(stage = stage.as_str(), count = results.len(), "stage hit");
                    return SearchOutcome::from_stage(stage, results);
                }
                Ok(results) => {
                    if terminal {
                        // A genuinely empty substring result is still a success.
                        return SearchOutcome::from_stage(stage, results);
                    }
                    tracing::debug!(stage = stage.as_str(), "stage empty, falling through");
                }
                Err(e) => {
                    if terminal {
                        tracing::error!(error = %e, "substring stage failed with no further fallback");
                        return SearchOutcome::failure();
                    }
                    tracing::warn!(stage = stage.as_str(), error = %e, "stage unavailable, falling through");
                }
            }
        }

        // The substring arm above always returns.
        SearchOutcome::empty()
    }

    async fn run_stage(&self, stage: Origin, text: &str) -> Result<Vec<SearchResult>, SearchError> {
        match stage {
            Origin::Semantic => {
                let Some(nlp) = &self.nlp else {
                    return Ok(Vec::new());
                };
                let rows = nlp
                    .search(text)
                    .await
                    .map_err(|e| SearchError::Internal(e.to_string()))?;
                Ok(normalize::from_nlp_rows(&rows))
            }
            Origin::Fulltext => {
                let rows = self
                    .with_store_timeout(self.store.fulltext(text, self.policy.limit))
                    .await?;
                Ok(rows.into_iter().map(normalize::from_fts_row).collect())
            }
            Origin::Substring => {
                let rows = self
                    .with_store_timeout(self.store.substring(text, self.policy.limit))
                    .await?;
                Ok(rows
                    .into_iter()
                    .map(|r| normalize::from_substring_row(r, self.policy.fallback_score))
                    .collect())
            }
            // ID lookups are dispatched in resolve(), never through the stage list.
            Origin::IdLookup => Ok(Vec::new()),
        }
    }

    /// Bound each store query so a stuck connection cannot stall the cascade;
    /// worst-case request latency is the sum of per-stage timeouts.
    async fn with_store_timeout<T>(
        &self,
        fut: impl Future<Output = Result<T, SearchError>>,
    ) -> Result<T, SearchError> {
        let ms = self.policy.store_timeout_ms;
        match timeout(Duration::from_millis(ms), fut).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout(ms)),
        }
    }
}
