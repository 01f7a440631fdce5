use std::sync::Arc;

use helpdesk_service::RecommendMethod;
use helpdesk_testkit::{FailingEmbedding, ScriptedCompletion};

use super::{axis_cards, axis_embedding, bundled_service, cache_path, service, temp_dir};

const EPSILON: f32 = 1e-5;

#[tokio::test]
async fn lexical_ranks_symptom_match_first() {
	let dir = temp_dir();
	let cards = vec![
		helpdesk_testkit::card("x-1", "error", "Proxy config", &["vite proxy loops"], &["vite"]),
		helpdesk_testkit::card("c-1", "camera", "Camera issue", &["camera not detected"], &[]),
	];
	let service = service(
		helpdesk_testkit::test_config(cache_path(&dir)),
		cards,
		Arc::new(axis_embedding()),
		Arc::new(ScriptedCompletion::failing()),
	);
	let rec = service.recommend("", "my camera is not detected", 3).await;

	assert_eq!(rec.card_ids(), vec!["c-1".to_string()]);
	assert_eq!(rec.method, RecommendMethod::None);
	assert_eq!(rec.confidence, 0.0);
}

#[tokio::test]
async fn empty_query_returns_curated_camera_cards() {
	let dir = temp_dir();
	let service =
		bundled_service(helpdesk_testkit::test_config(cache_path(&dir)), ScriptedCompletion::failing());
	let rec = service.recommend("camera", "", 3).await;

	assert_eq!(rec.card_ids(), vec!["cam-001", "cam-004", "cam-005"]);
	assert_eq!(rec.confidence, 0.0);
	assert_eq!(rec.method, RecommendMethod::None);
}

#[tokio::test]
async fn unfiltered_empty_query_chains_curated_lists() {
	let dir = temp_dir();
	let service =
		bundled_service(helpdesk_testkit::test_config(cache_path(&dir)), ScriptedCompletion::failing());
	let rec = service.recommend("  ", "   ", 5).await;

	assert_eq!(rec.card_ids(), vec!["cam-001", "cam-004", "cam-005", "call-010", "call-001"]);
}

#[tokio::test]
async fn unmatched_query_falls_back_to_curated() {
	let dir = temp_dir();
	let service =
		bundled_service(helpdesk_testkit::test_config(cache_path(&dir)), ScriptedCompletion::failing());
	let rec = service.recommend("error", "zzqx", 3).await;

	assert_eq!(rec.card_ids(), vec!["err-001", "err-003", "err-008"]);
	assert_eq!(rec.method, RecommendMethod::None);
}

#[tokio::test]
async fn unknown_category_yields_no_cards() {
	let dir = temp_dir();
	let service =
		bundled_service(helpdesk_testkit::test_config(cache_path(&dir)), ScriptedCompletion::failing());

	assert!(service.recommend("billing", "", 3).await.cards.is_empty());
	assert!(service.recommend("billing", "camera", 3).await.cards.is_empty());
}

#[tokio::test]
async fn limit_is_clamped_to_configured_range() {
	let dir = temp_dir();
	let mut cfg = helpdesk_testkit::test_config(cache_path(&dir));

	cfg.recommend.max_limit = 4;

	let service = bundled_service(cfg, ScriptedCompletion::failing());

	assert_eq!(service.recommend("camera", "", 0).await.cards.len(), 1);
	assert_eq!(service.recommend("", "camera", 100).await.cards.len(), 4);
}

#[tokio::test]
async fn identical_vector_ranks_first_with_full_confidence() {
	let dir = temp_dir();
	let service = service(
		helpdesk_testkit::ready_config(cache_path(&dir)),
		axis_cards(),
		Arc::new(axis_embedding()),
		Arc::new(ScriptedCompletion::failing()),
	);

	service.rebuild_embeddings().await;

	let rec = service.recommend("", "alpha", 2).await;

	assert_eq!(rec.card_ids(), vec!["a-1", "b-1"]);
	assert_eq!(rec.method, RecommendMethod::Embeddings);
	assert!((rec.confidence - 1.0).abs() < EPSILON);

	let rec = service.recommend("", "beta", 1).await;

	assert_eq!(rec.card_ids(), vec!["b-1"]);
}

#[tokio::test]
async fn category_filter_applies_to_semantic_tier() {
	let dir = temp_dir();
	let mut cards = axis_cards();

	cards[1].category = "call".to_string();

	let service = service(
		helpdesk_testkit::ready_config(cache_path(&dir)),
		cards,
		Arc::new(axis_embedding()),
		Arc::new(ScriptedCompletion::failing()),
	);

	service.rebuild_embeddings().await;

	let rec = service.recommend("call", "alpha", 3).await;

	assert_eq!(rec.card_ids(), vec!["b-1"]);
	assert_eq!(rec.method, RecommendMethod::Embeddings);
	assert!(rec.confidence.abs() < EPSILON);
}

#[tokio::test]
async fn failing_embedder_never_reports_embeddings() {
	let dir = temp_dir();
	let cfg = helpdesk_testkit::ready_config(cache_path(&dir));
	let warm = service(
		cfg.clone(),
		axis_cards(),
		Arc::new(axis_embedding()),
		Arc::new(ScriptedCompletion::failing()),
	);

	assert_eq!(warm.rebuild_embeddings().await.created, 2);

	let failing = Arc::new(FailingEmbedding::always());
	let service =
		service(cfg, axis_cards(), failing.clone(), Arc::new(ScriptedCompletion::failing()));

	assert_eq!(service.index().len(), 2);

	for query in ["alpha", "beta symptom", "", "nothing matches"] {
		let rec = service.recommend("", query, 3).await;

		assert_eq!(rec.method, RecommendMethod::None, "query {query:?}");
		assert_eq!(rec.confidence, 0.0);
	}

	assert_eq!(failing.calls(), 3);
}

#[tokio::test]
async fn keyless_provider_skips_semantic_tier() {
	let dir = temp_dir();
	let warm = service(
		helpdesk_testkit::ready_config(cache_path(&dir)),
		axis_cards(),
		Arc::new(axis_embedding()),
		Arc::new(ScriptedCompletion::failing()),
	);

	warm.rebuild_embeddings().await;

	let embedding = Arc::new(axis_embedding());
	let service = service(
		helpdesk_testkit::test_config(cache_path(&dir)),
		axis_cards(),
		embedding.clone(),
		Arc::new(ScriptedCompletion::failing()),
	);
	let rec = service.recommend("", "beta", 3).await;

	assert_eq!(rec.card_ids(), vec!["b-1"]);
	assert_eq!(rec.method, RecommendMethod::None);
	assert_eq!(embedding.calls(), 0);
}
