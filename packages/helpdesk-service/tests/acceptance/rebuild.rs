use std::sync::Arc;

use helpdesk_domain::embedding_text::card_hash;
use helpdesk_service::RebuildReport;
use helpdesk_storage::{VectorCacheEntry, VectorCacheFile, VectorSnapshot};
use helpdesk_testkit::{FailingEmbedding, ScriptedCompletion};

use super::{axis_cards, axis_embedding, cache_path, service, temp_dir};

#[tokio::test]
async fn keyless_rebuild_is_skipped() {
	let dir = temp_dir();
	let embedding = Arc::new(axis_embedding());
	let service = service(
		helpdesk_testkit::test_config(cache_path(&dir)),
		axis_cards(),
		embedding.clone(),
		Arc::new(ScriptedCompletion::failing()),
	);
	let report = service.rebuild_embeddings().await;

	assert_eq!(report, RebuildReport { skipped: true, ..Default::default() });
	assert_eq!(embedding.calls(), 0);
	assert!(!cache_path(&dir).exists());
}

#[tokio::test]
async fn second_rebuild_reuses_every_vector() {
	let dir = temp_dir();
	let embedding = Arc::new(axis_embedding());
	let service = service(
		helpdesk_testkit::ready_config(cache_path(&dir)),
		axis_cards(),
		embedding.clone(),
		Arc::new(ScriptedCompletion::failing()),
	);
	let first = service.rebuild_embeddings().await;

	assert_eq!(first.created, 2);
	assert_eq!(first.total, 2);
	assert!(first.saved);

	let second = service.rebuild_embeddings().await;

	assert_eq!(second.reused, 2);
	assert_eq!(second.created, 0);
	assert_eq!(embedding.calls(), 2);
}

#[tokio::test]
async fn persisted_snapshot_carries_metadata() {
	let dir = temp_dir();
	let service = service(
		helpdesk_testkit::ready_config(cache_path(&dir)),
		axis_cards(),
		Arc::new(axis_embedding()),
		Arc::new(ScriptedCompletion::failing()),
	);

	service.rebuild_embeddings().await;

	let snapshot = VectorCacheFile::new(cache_path(&dir)).read().expect("Cache must be readable.");

	assert_eq!(snapshot.version, "test");
	assert!(snapshot.updated_at.is_some());
	assert_eq!(snapshot.embedding_model, "test:test-embedding");
	assert_eq!(snapshot.vectors["a-1"].vector, vec![1.0, 0.0]);
	assert_eq!(snapshot.vectors["b-1"].content_hash, card_hash(&axis_cards()[1]));
}

#[tokio::test]
async fn changed_card_text_is_re_embedded() {
	let dir = temp_dir();
	let cfg = helpdesk_testkit::ready_config(cache_path(&dir));
	let first = service(
		cfg.clone(),
		axis_cards(),
		Arc::new(axis_embedding()),
		Arc::new(ScriptedCompletion::failing()),
	);

	first.rebuild_embeddings().await;

	let mut cards = axis_cards();

	cards[0].quick_checks.push("Reload the alpha page.".to_string());

	assert_ne!(card_hash(&cards[0]), card_hash(&axis_cards()[0]));

	let embedding = Arc::new(axis_embedding());
	let second =
		service(cfg, cards, embedding.clone(), Arc::new(ScriptedCompletion::failing()));

	assert_eq!(second.index().len(), 1);
	assert!(second.index().get("a-1").is_none());

	let report = second.rebuild_embeddings().await;

	assert_eq!(report.reused, 1);
	assert_eq!(report.created, 1);
	assert_eq!(report.total, 2);
	assert_eq!(embedding.calls(), 1);
}

#[tokio::test]
async fn partial_progress_is_persisted() {
	let dir = temp_dir();
	let cfg = helpdesk_testkit::ready_config(cache_path(&dir));
	let flaky = Arc::new(FailingEmbedding::when_contains("beta", axis_embedding()));
	let first = service(cfg.clone(), axis_cards(), flaky, Arc::new(ScriptedCompletion::failing()));
	let report = first.rebuild_embeddings().await;

	assert_eq!(report.created, 1);
	assert_eq!(report.failed, 1);
	assert_eq!(report.total, 1);
	assert!(report.saved);

	let snapshot = VectorCacheFile::new(cache_path(&dir)).read().expect("Cache must be readable.");

	assert!(snapshot.vectors.contains_key("a-1"));
	assert!(!snapshot.vectors.contains_key("b-1"));

	let embedding = Arc::new(axis_embedding());
	let second = service(cfg, axis_cards(), embedding.clone(), Arc::new(ScriptedCompletion::failing()));
	let report = second.rebuild_embeddings().await;

	assert_eq!(report.reused, 1);
	assert_eq!(report.created, 1);
	assert_eq!(embedding.calls(), 1);
}

#[tokio::test]
async fn stale_and_unknown_cache_entries_are_not_indexed() {
	let dir = temp_dir();
	let cards = axis_cards();
	let mut snapshot = VectorSnapshot::default();

	snapshot.vectors.insert("a-1".to_string(), VectorCacheEntry {
		content_hash: "not-the-current-hash".to_string(),
		vector: vec![1.0, 0.0],
	});
	snapshot.vectors.insert("b-1".to_string(), VectorCacheEntry {
		content_hash: card_hash(&cards[1]),
		vector: vec![0.0, 1.0],
	});
	snapshot.vectors.insert("gone-1".to_string(), VectorCacheEntry {
		content_hash: "whatever".to_string(),
		vector: vec![0.5, 0.5],
	});

	assert!(VectorCacheFile::new(cache_path(&dir)).save(&snapshot));

	let service = service(
		helpdesk_testkit::ready_config(cache_path(&dir)),
		cards,
		Arc::new(axis_embedding()),
		Arc::new(ScriptedCompletion::failing()),
	);
	let index = service.index();

	assert_eq!(index.len(), 1);
	assert_eq!(index.get("b-1"), Some(&[0.0, 1.0][..]));
}

#[tokio::test]
async fn corrupt_cache_starts_empty_and_is_overwritten() {
	let dir = temp_dir();

	std::fs::write(cache_path(&dir), "not json").expect("Failed to write cache.");

	let service = service(
		helpdesk_testkit::ready_config(cache_path(&dir)),
		axis_cards(),
		Arc::new(axis_embedding()),
		Arc::new(ScriptedCompletion::failing()),
	);

	assert!(service.index().is_empty());

	let report = service.rebuild_embeddings().await;

	assert_eq!(report.created, 2);
	assert!(report.saved);
	assert_eq!(service.index().len(), 2);
}
