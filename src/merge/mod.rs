//! Content merge engine.
//!
//! Overlays a persisted, possibly partial, content document on the complete default
//! document. The default document defines the schema: only its keys survive, arrays
//! are replaced wholesale by a non-empty override array, and a null, missing or
//! differently-typed override leaf keeps the default.

use serde_json::{Map, Value};

use crate::models::SiteContent;

/// Merge `override_doc` over `base`, keeping exactly the shape of `base`.
pub fn merge(base: &Value, override_doc: Option<&Value>) -> Value {
    match base {
        Value::Array(_) => match override_doc {
            Some(Value::Array(items)) if !items.is_empty() => Value::Array(items.clone()),
            _ => base.clone(),
        },
        Value::Object(fields) => {
            let mut merged = Map::with_capacity(fields.len());
            for (key, base_value) in fields {
                let override_value = override_doc.and_then(|o| o.get(key));
                merged.insert(key.clone(), merge(base_value, override_value));
            }
            Value::Object(merged)
        }
        _ => match override_doc {
            Some(value) if std::mem::discriminant(value) == std::mem::discriminant(base) => {
                value.clone()
            }
            _ => base.clone(),
        },
    }
}

/// Reconcile a stored document with the built-in defaults.
///
/// A top-level section that no longer fits the typed content (for example an array
/// of numbers where the default holds stat cards) falls back to its default; the
/// other sections keep their overrides.
pub fn merge_site_content(stored: Option<&Value>) -> SiteContent {
    let defaults = SiteContent::default();
    let base = match serde_json::to_value(&defaults) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Failed to encode default content: {}", e);
            return defaults;
        }
    };

    let merged = merge(&base, stored);
    if let Ok(content) = serde_json::from_value(merged.clone()) {
        return content;
    }

    let (Value::Object(base_fields), Value::Object(merged_fields)) = (&base, merged) else {
        return defaults;
    };
    let mut repaired = base_fields.clone();
    for (key, section) in merged_fields {
        let mut candidate = base_fields.clone();
        candidate.insert(key.clone(), section.clone());
        match serde_json::from_value::<SiteContent>(Value::Object(candidate)) {
            Ok(_) => {
                repaired.insert(key, section);
            }
            Err(e) => {
                tracing::warn!("Stored site content section '{}' ignored: {}", key, e);
            }
        }
    }

    serde_json::from_value(Value::Object(repaired)).unwrap_or(defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> Value {
        serde_json::to_value(SiteContent::default()).unwrap()
    }

    /// Same keys at every object level, and no nulls anywhere.
    fn assert_same_shape(base: &Value, merged: &Value) {
        match (base, merged) {
            (Value::Object(b), Value::Object(m)) => {
                let mut bk: Vec<_> = b.keys().collect();
                let mut mk: Vec<_> = m.keys().collect();
                bk.sort();
                mk.sort();
                assert_eq!(bk, mk);
                for (key, value) in b {
                    assert_same_shape(value, &m[key]);
                }
            }
            (Value::Array(_), Value::Array(_)) => {}
            (_, Value::Null) => panic!("null leaf in merged document"),
            (Value::Object(_), other) | (Value::Array(_), other) => {
                panic!("container replaced by {:?}", other)
            }
            _ => {}
        }
    }

    #[test]
    fn test_empty_override_is_identity() {
        let base = defaults();
        assert_eq!(merge(&base, Some(&json!({}))), base);
        assert_eq!(merge(&base, None), base);
    }

    #[test]
    fn test_empty_array_override_keeps_defaults() {
        let base = defaults();
        let merged = merge(&base, Some(&json!({ "stats": [] })));
        assert_eq!(merged, base);
        assert_eq!(merged["stats"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_non_empty_array_replaces_wholesale() {
        let base = defaults();
        let merged = merge(&base, Some(&json!({ "stats": [{ "value": "1", "label": "x" }] })));
        assert_eq!(merged["stats"], json!([{ "value": "1", "label": "x" }]));
    }

    #[test]
    fn test_partial_nested_override() {
        let base = defaults();
        let merged = merge(
            &base,
            Some(&json!({
                "hero": { "title": "New title" },
                "contact": { "phone": "+91 98765 43210", "email": null }
            })),
        );

        assert_eq!(merged["hero"]["title"], "New title");
        assert_eq!(merged["hero"]["badge"], base["hero"]["badge"]);
        assert_eq!(merged["contact"]["phone"], "+91 98765 43210");
        assert_eq!(merged["contact"]["email"], base["contact"]["email"]);
        assert_same_shape(&base, &merged);
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let base = defaults();
        let merged = merge(
            &base,
            Some(&json!({ "legacyBanner": "sale", "hero": { "ribbon": "old" } })),
        );
        assert!(merged.get("legacyBanner").is_none());
        assert!(merged["hero"].get("ribbon").is_none());
        assert_same_shape(&base, &merged);
    }

    #[test]
    fn test_malformed_override_is_tolerated() {
        let base = defaults();
        for override_doc in [json!("text"), json!(42), json!([1, 2]), json!({ "hero": 5 })] {
            let merged = merge(&base, Some(&override_doc));
            assert_same_shape(&base, &merged);
        }
    }

    #[test]
    fn test_merging_output_again_is_stable() {
        let base = defaults();
        let once = merge(&base, Some(&json!({ "why": { "title": "Trust" } })));
        let twice = merge(&base, Some(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_site_content_applies_override() {
        let stored = json!({ "footer": { "supportItems": ["Only one"] } });
        let content = merge_site_content(Some(&stored));
        assert_eq!(content.footer.support_items, vec!["Only one".to_string()]);
        assert_eq!(content.hero, SiteContent::default().hero);
    }

    #[test]
    fn test_wrongly_typed_leaf_keeps_default_only_for_that_leaf() {
        let base = defaults();
        let merged = merge(
            &base,
            Some(&json!({
                "hero": { "badge": "Monsoon deals" },
                "contact": { "phone": 9876543210u64 }
            })),
        );
        assert_eq!(merged["hero"]["badge"], "Monsoon deals");
        assert_eq!(merged["contact"]["phone"], base["contact"]["phone"]);
        assert_same_shape(&base, &merged);
    }

    #[test]
    fn test_merge_site_content_keeps_valid_overrides_next_to_bad_ones() {
        let stored = json!({
            "hero": { "badge": "Monsoon deals" },
            "contact": { "phone": 9876543210u64 },
            "stats": [1, 2, 3]
        });
        let content = merge_site_content(Some(&stored));
        let defaults = SiteContent::default();
        assert_eq!(content.hero.badge, "Monsoon deals");
        assert_eq!(content.contact.phone, defaults.contact.phone);
        assert_eq!(content.stats, defaults.stats);
    }
}
