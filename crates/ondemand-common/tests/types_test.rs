//! Tests for shared type definitions in ondemand-common.
//!
//! This test suite covers:
//! - Bucket keys implementing the expected traits (Display, Hash, Ord, serde)
//! - Conversions into bucket keys
//! - Error helpers used across crate boundaries

use pretty_assertions::assert_eq;
use std::collections::{BTreeSet, HashMap};
use ondemand_common::{BucketKey, OnDemandError, TranslationMap};

#[test]
fn test_bucket_key_implements_expected_traits() {
    let key = BucketKey::new("en", "common");

    assert_eq!(format!("{key}"), "en.common");
    assert!(format!("{key:?}").contains("BucketKey"));

    let cloned = key.clone();
    assert_eq!(key, cloned);

    let mut map = HashMap::new();
    map.insert(key.clone(), 3);
    assert_eq!(map.get(&BucketKey::new("en", "common")), Some(&3));
}

#[test]
fn test_bucket_keys_order_by_language_then_namespace() {
    let keys: BTreeSet<BucketKey> = [
        BucketKey::new("fr", "common"),
        BucketKey::new("en", "errors"),
        BucketKey::new("en", "common"),
    ]
    .into_iter()
    .collect();

    let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["en.common", "en.errors", "fr.common"]);
}

#[test]
fn test_bucket_key_from_tuple() {
    let key: BucketKey = ("de", "admin").into();
    assert_eq!(key, BucketKey::new("de", "admin"));

    let owned: BucketKey = (String::from("pt-BR"), String::from("checkout")).into();
    assert_eq!(owned.to_string(), "pt-BR.checkout");
}

#[test]
fn test_bucket_key_serialization() {
    let key = BucketKey::new("en", "common");

    let serialized = serde_json::to_string(&key).unwrap();
    assert_eq!(serialized, r#"{"language":"en","namespace":"common"}"#);

    let deserialized: BucketKey = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, key);
}

#[test]
fn test_translation_map_is_plain_hash_map() {
    let mut map = TranslationMap::new();
    map.insert("greeting".to_string(), "Hello".to_string());
    map.insert("greeting".to_string(), "Hi".to_string());

    assert_eq!(map.len(), 1);
    assert_eq!(map["greeting"], "Hi");
}

#[test]
fn test_resolver_error_display() {
    let error = OnDemandError::resolver("timed out after 5s", BucketKey::new("en", "common").to_string());
    assert_eq!(
        error.to_string(),
        "Resolver error for en.common: timed out after 5s"
    );
}
