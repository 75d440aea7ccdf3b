//! End-to-end search scenarios, exercising the public surface directly
//! rather than unit-testing internals.

use zkim_core::metadata::Metadata;
use zkim_index::{IndexConfig, SearchableIndex};

fn metadata(user_id: &str, file_name: &str, tags: &[&str]) -> Metadata {
    let mut md = Metadata::new(file_name, "text/plain", user_id);
    md.tags = tags.iter().map(|t| t.to_string()).collect();
    md.access_control.read.push(user_id.to_string());
    md
}

fn quiet_config() -> IndexConfig {
    let mut config = IndexConfig::default();
    config.enable_result_padding = false;
    config.enable_privacy_enhancement = false;
    config
}

#[tokio::test]
async fn keyword_search_partitions_files_by_matching_tag() {
    let index = SearchableIndex::new(quiet_config());
    index
        .index_file("f1", "o1", &metadata("user-1", "doc-a.txt", &["cryptography", "security", "notes"]))
        .await
        .unwrap();
    index
        .index_file("f2", "o2", &metadata("user-1", "doc-b.txt", &["privacy", "zero-knowledge", "security"]))
        .await
        .unwrap();
    index
        .index_file("f3", "o3", &metadata("user-1", "doc-c.txt", &["blockchain", "distributed", "systems"]))
        .await
        .unwrap();

    let mut security_hits: Vec<String> = index
        .search("security", "user-1", None)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.file_id)
        .collect();
    security_hits.sort();
    assert_eq!(security_hits, vec!["f1".to_string(), "f2".to_string()]);

    let blockchain_hits = index.search("blockchain", "user-1", None).await.unwrap();
    assert_eq!(blockchain_hits.len(), 1);
    assert_eq!(blockchain_hits[0].file_id, "f3");
}

#[tokio::test]
async fn rate_limit_resets_after_epoch_advances() {
    let mut config = quiet_config();
    config.max_queries_per_epoch = 3;
    let index = SearchableIndex::new(config);

    for _ in 0..3 {
        index.search("anything", "user-1", None).await.unwrap();
    }
    let err = index.search("one-too-many", "user-1", None).await.unwrap_err();
    assert_eq!(err.error, zkim_core::error::ZkimError::RateLimitExceeded);

    index.advance_epoch();
    assert!(index.search("fresh-epoch", "user-1", None).await.is_ok());
}

#[tokio::test]
async fn remove_from_index_drops_future_matches() {
    let index = SearchableIndex::new(quiet_config());
    index.index_file("f1", "o1", &metadata("user-1", "doc.txt", &["security"])).await.unwrap();
    assert_eq!(index.search("security", "user-1", None).await.unwrap().len(), 1);

    index.remove_from_index("f1").await.unwrap();
    assert!(index.search("security", "user-1", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_index_reflects_new_tags_immediately() {
    let index = SearchableIndex::new(quiet_config());
    index.index_file("f1", "o1", &metadata("user-1", "doc.txt", &["draft"])).await.unwrap();
    assert!(index.search("final", "user-1", None).await.unwrap().is_empty());

    index.update_index("f1", &metadata("user-1", "doc.txt", &["final"])).await.unwrap();
    assert_eq!(index.search("final", "user-1", None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn result_padding_hides_the_true_match_count() {
    let mut config = IndexConfig::default();
    config.enable_privacy_enhancement = false;
    config.bucket_sizes = vec![4, 8, 16];
    let index = SearchableIndex::new(config);
    index.index_file("f1", "o1", &metadata("user-1", "doc.txt", &["security"])).await.unwrap();

    let hits = index.search("security", "user-1", None).await.unwrap();
    assert_eq!(hits.len(), 4);
    let real_hits = hits.iter().filter(|r| r.access_level == "full").count();
    assert_eq!(real_hits, 1);
    let padding_hits = hits.iter().filter(|r| r.access_level == "metadata").count();
    assert_eq!(padding_hits, 3);
}
