mod common;

use std::sync::Arc;

use serde_json::json;

use common::{catalog, product, ranked, MockStore, NlpScript, ScriptedNlp};
use greensearch::config::CascadeConfig;
use greensearch::resolver::{Origin, SearchResolver};

fn resolver(
    store: Arc<MockStore>,
    nlp: Arc<ScriptedNlp>,
    policy: CascadeConfig,
) -> SearchResolver {
    SearchResolver::new(store, Some(nlp), policy)
}

#[tokio::test]
async fn id_lookup_bypasses_every_cascade_stage() {
    let store = Arc::new(MockStore {
        products: vec![product(42, "Solar charger")],
        ..Default::default()
    });
    let nlp = Arc::new(ScriptedNlp::new(NlpScript::Rows(vec![json!({"id": 1})])));
    let r = resolver(store.clone(), nlp.clone(), CascadeConfig::default());

    let outcome = r.resolve("id:42", None, None).await;

    assert!(!outcome.failed);
    assert_eq!(outcome.origin, Some(Origin::IdLookup));
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].id, 42);
    assert_eq!(outcome.results[0].score, 1.0);
    assert_eq!(nlp.call_count(), 0);
    assert_eq!(store.fts_call_count(), 0);
    assert_eq!(store.ilike_call_count(), 0);
}

#[tokio::test]
async fn id_lookup_failure_does_not_fall_through_to_text_search() {
    let store = Arc::new(MockStore {
        ids_fail: true,
        ..Default::default()
    });
    let nlp = Arc::new(ScriptedNlp::new(NlpScript::Rows(vec![json!({"id": 1})])));
    let r = resolver(store.clone(), nlp.clone(), CascadeConfig::default());

    let outcome = r.resolve("", Some("7"), None).await;

    assert!(outcome.failed);
    assert!(outcome.results.is_empty());
    assert_eq!(nlp.call_count(), 0);
    assert_eq!(store.fts_call_count(), 0);
    assert_eq!(store.ilike_call_count(), 0);
}

#[tokio::test]
async fn empty_query_makes_no_backend_calls() {
    let store = Arc::new(MockStore::default());
    let nlp = Arc::new(ScriptedNlp::new(NlpScript::Rows(vec![])));
    let r = resolver(store.clone(), nlp.clone(), CascadeConfig::default());

    let outcome = r.resolve("   ", None, None).await;

    assert!(!outcome.failed);
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.origin, None);
    assert_eq!(nlp.call_count(), 0);
    assert_eq!(store.id_call_count(), 0);
    assert_eq!(store.fts_call_count(), 0);
    assert_eq!(store.ilike_call_count(), 0);
}

#[tokio::test]
async fn semantic_hit_is_terminal() {
    let store = Arc::new(MockStore {
        fts_rows: vec![ranked(1, "should not surface", 0.9)],
        ..Default::default()
    });
    let nlp = Arc::new(ScriptedNlp::new(NlpScript::Rows(vec![
        json!({"id": 10, "name": "Bamboo toothbrush", "score": 0.95}),
    ])));
    let r = resolver(store.clone(), nlp, CascadeConfig::default());

    let outcome = r.resolve("bamboo toothbrush", None, None).await;

    assert_eq!(outcome.origin, Some(Origin::Semantic));
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].id, 10);
    assert_eq!(store.fts_call_count(), 0);
    assert_eq!(store.ilike_call_count(), 0);
}

#[tokio::test]
async fn semantic_empty_falls_through_to_fulltext_only() {
    let store = Arc::new(MockStore {
        fts_rows: vec![ranked(1, "Bamboo brush", 0.8), ranked(2, "Bamboo bowl", 0.3)],
        ilike_rows: vec![catalog(3, "should not surface")],
        ..Default::default()
    });
    let nlp = Arc::new(ScriptedNlp::new(NlpScript::Rows(vec![])));
    let r = resolver(store.clone(), nlp, CascadeConfig::default());

    let outcome = r.resolve("bamboo toothbrush", None, None).await;

    assert_eq!(outcome.origin, Some(Origin::Fulltext));
    assert_eq!(outcome.results.len(), 2);
    // Native rank order preserved, rank carried as score.
    assert_eq!(outcome.results[0].score, 0.8);
    assert_eq!(outcome.results[1].score, 0.3);
    // Substring stage must not also contribute.
    assert_eq!(store.ilike_call_count(), 0);
    assert!(outcome.results.iter().all(|r| r.id != 3));
}

#[tokio::test]
async fn nlp_and_fulltext_down_degrades_to_substring() {
    let store = Arc::new(MockStore {
        fts_fail: true,
        ilike_rows: vec![catalog(5, "Hemp tote")],
        ..Default::default()
    });
    let nlp = Arc::new(ScriptedNlp::new(NlpScript::Unavailable));
    let r = resolver(store.clone(), nlp, CascadeConfig::default());

    let outcome = r.resolve("hemp", None, None).await;

    assert!(!outcome.failed, "degradation must not surface as an error");
    assert_eq!(outcome.origin, Some(Origin::Substring));
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].score, 0.1);
}

#[tokio::test]
async fn substring_score_constant_is_configurable() {
    let store = Arc::new(MockStore {
        fts_fail: true,
        ilike_rows: vec![catalog(5, "Hemp tote")],
        ..Default::default()
    });
    let nlp = Arc::new(ScriptedNlp::new(NlpScript::Unavailable));
    let policy = CascadeConfig {
        fallback_score: 0.2,
        ..Default::default()
    };
    let r = resolver(store, nlp, policy);

    let outcome = r.resolve("hemp", None, None).await;

    assert_eq!(outcome.results[0].score, 0.2);
}

#[tokio::test]
async fn total_store_failure_surfaces_error_flag() {
    let store = Arc::new(MockStore {
        fts_fail: true,
        ilike_fail: true,
        ..Default::default()
    });
    let nlp = Arc::new(ScriptedNlp::new(NlpScript::Unavailable));
    let r = resolver(store, nlp, CascadeConfig::default());

    let outcome = r.resolve("anything", None, None).await;

    assert!(outcome.failed);
    assert!(outcome.results.is_empty());
}

#[tokio::test]
async fn empty_substring_result_is_success_not_failure() {
    let store = Arc::new(MockStore::default());
    let nlp = Arc::new(ScriptedNlp::new(NlpScript::Rows(vec![])));
    let r = resolver(store, nlp, CascadeConfig::default());

    let outcome = r.resolve("no such product anywhere", None, None).await;

    assert!(!outcome.failed);
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.origin, Some(Origin::Substring));
}

#[tokio::test]
async fn id_lookup_is_idempotent_and_ordered() {
    let store = Arc::new(MockStore {
        products: vec![product(3, "A"), product(11, "B"), product(7, "C")],
        ..Default::default()
    });
    let nlp = Arc::new(ScriptedNlp::new(NlpScript::Rows(vec![])));
    let r = resolver(store, nlp, CascadeConfig::default());

    let first = r.resolve("", None, Some("3,7,11")).await;
    let second = r.resolve("", None, Some("3,7,11")).await;

    let ids = |o: &greensearch::resolver::SearchOutcome| {
        o.results.iter().map(|r| r.id).collect::<Vec<_>>()
    };
    // Descending id order, stable across repeats.
    assert_eq!(ids(&first), vec![11, 7, 3]);
    assert_eq!(ids(&first), ids(&second));
}

#[tokio::test]
async fn missing_nlp_client_skips_straight_to_fulltext() {
    let store = Arc::new(MockStore {
        fts_rows: vec![ranked(1, "Bamboo brush", 0.6)],
        ..Default::default()
    });
    let r = SearchResolver::new(store.clone(), None, CascadeConfig::default());

    let outcome = r.resolve("bamboo", None, None).await;

    assert_eq!(outcome.origin, Some(Origin::Fulltext));
    assert_eq!(outcome.results.len(), 1);
}
