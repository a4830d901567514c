/// Scripted in-memory backends for driving the resolver without a live
/// Postgres or NLP service.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

use greensearch::errors::SearchError;
use greensearch::nlp::{NlpError, SemanticBackend};
use greensearch::store::{CatalogRow, ProductRow, ProductStore, RankedRow};

/// What the scripted NLP backend should do on every call.
pub enum NlpScript {
    Rows(Vec<Value>),
    Unavailable,
}

pub struct ScriptedNlp {
    pub script: NlpScript,
    pub calls: AtomicUsize,
}

impl ScriptedNlp {
    pub fn new(script: NlpScript) -> Self {
        ScriptedNlp {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SemanticBackend for ScriptedNlp {
    async fn search(&self, _query: &str) -> Result<Vec<Value>, NlpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            NlpScript::Rows(rows) => Ok(rows.clone()),
            NlpScript::Unavailable => Err(NlpError::Unavailable("connection refused".to_string())),
        }
    }

    async fn health(&self) -> bool {
        matches!(self.script, NlpScript::Rows(_))
    }
}

/// In-memory product store with per-query failure switches and call counters.
#[derive(Default)]
pub struct MockStore {
    pub products: Vec<ProductRow>,
    pub fts_rows: Vec<RankedRow>,
    pub ilike_rows: Vec<CatalogRow>,
    pub ids_fail: bool,
    pub fts_fail: bool,
    pub ilike_fail: bool,
    pub popular_fail: bool,
    pub ping_fail: bool,
    pub id_calls: AtomicUsize,
    pub fts_calls: AtomicUsize,
    pub ilike_calls: AtomicUsize,
}

impl MockStore {
    pub fn id_call_count(&self) -> usize {
        self.id_calls.load(Ordering::SeqCst)
    }

    pub fn fts_call_count(&self) -> usize {
        self.fts_calls.load(Ordering::SeqCst)
    }

    pub fn ilike_call_count(&self) -> usize {
        self.ilike_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductStore for MockStore {
    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<ProductRow>, SearchError> {
        self.id_calls.fetch_add(1, Ordering::SeqCst);
        if self.ids_fail {
            return Err(SearchError::Storage("connection reset".to_string()));
        }
        let mut rows: Vec<ProductRow> = self
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn fulltext(&self, _query: &str, limit: i64) -> Result<Vec<RankedRow>, SearchError> {
        self.fts_calls.fetch_add(1, Ordering::SeqCst);
        if self.fts_fail {
            return Err(SearchError::Storage("tsquery syntax error".to_string()));
        }
        Ok(self.fts_rows.iter().take(limit as usize).cloned().collect())
    }

    async fn substring(&self, _query: &str, limit: i64) -> Result<Vec<CatalogRow>, SearchError> {
        self.ilike_calls.fetch_add(1, Ordering::SeqCst);
        if self.ilike_fail {
            return Err(SearchError::Storage("connection reset".to_string()));
        }
        Ok(self
            .ilike_rows
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn popular(&self, limit: i64) -> Result<Vec<ProductRow>, SearchError> {
        if self.popular_fail {
            return Err(SearchError::Storage("connection reset".to_string()));
        }
        Ok(self.products.iter().take(limit as usize).cloned().collect())
    }

    async fn ping(&self) -> Result<(), SearchError> {
        if self.ping_fail {
            return Err(SearchError::Storage("connection reset".to_string()));
        }
        Ok(())
    }
}

pub fn product(id: i64, name: &str) -> ProductRow {
    ProductRow {
        id,
        name: name.to_string(),
        description: format!("{} description", name),
        category: "Home".to_string(),
        brand: "EcoWorks".to_string(),
        price: 9.99,
        image_url: "p.jpg".to_string(),
        eco_rating: Some(4.2),
    }
}

pub fn ranked(id: i64, name: &str, rank: f64) -> RankedRow {
    RankedRow {
        product: product(id, name),
        rank,
    }
}

pub fn catalog(id: i64, name: &str) -> CatalogRow {
    CatalogRow {
        id,
        name: name.to_string(),
        description: format!("{} description", name),
        price: 9.99,
        image_url: Some(vec!["p.jpg".to_string()]),
        eco_rating: Some(4.2),
    }
}
