//! Filter sets and the cache keys derived from them.

use serde::{Deserialize, Serialize};

// == Filter Set ==
/// Recognized filter names mapped to their values.
///
/// Unknown query parameters are ignored on deserialization. Field order is
/// fixed by this declaration, which is what makes [`FilterSet::cache_key`]
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
}

impl FilterSet {
    /// Same filters with empty values (and the literal "undefined" some
    /// clients send) dropped, so `?make=` and no `make` share a key.
    pub fn normalized(&self) -> Self {
        fn clean(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .filter(|v| !v.is_empty() && *v != "undefined")
                .map(str::to_string)
        }

        Self {
            make: clean(&self.make),
            model: clean(&self.model),
            year: clean(&self.year),
            location: clean(&self.location),
            status: clean(&self.status),
            price_range: clean(&self.price_range),
            search: clean(&self.search),
            price_sort: clean(&self.price_sort),
            vehicle_type: clean(&self.vehicle_type),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized() == Self::default()
    }

    // == Cache Key ==
    /// JSON serialization of the normalized set. The empty set is `{}`.
    pub fn cache_key(&self) -> String {
        // A struct of optional strings always serializes.
        serde_json::to_string(&self.normalized()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_make(make: &str) -> FilterSet {
        FilterSet {
            make: Some(make.to_string()),
            ..FilterSet::default()
        }
    }

    #[test]
    fn test_empty_set_key() {
        assert_eq!(FilterSet::default().cache_key(), "{}");
        assert!(FilterSet::default().is_empty());
    }

    #[test]
    fn test_equal_sets_share_key() {
        let a = FilterSet {
            make: Some("Honda".into()),
            year: Some("2020".into()),
            ..FilterSet::default()
        };
        let b = a.clone();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_key_differs_by_make() {
        assert_ne!(with_make("Honda").cache_key(), with_make("Toyota").cache_key());
    }

    #[test]
    fn test_key_differs_by_price_bucket() {
        let a = FilterSet {
            price_range: Some("0-20000".into()),
            ..FilterSet::default()
        };
        let b = FilterSet {
            price_range: Some("50000+".into()),
            ..FilterSet::default()
        };
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_key_differs_empty_vs_non_empty() {
        assert_ne!(FilterSet::default().cache_key(), with_make("Honda").cache_key());
    }

    #[test]
    fn test_same_value_in_different_field_differs() {
        let a = with_make("2020");
        let b = FilterSet {
            year: Some("2020".into()),
            ..FilterSet::default()
        };
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_blank_values_normalize_away() {
        let blank = FilterSet {
            make: Some(String::new()),
            location: Some("undefined".into()),
            ..FilterSet::default()
        };
        assert_eq!(blank.cache_key(), FilterSet::default().cache_key());
    }

    #[test]
    fn test_unknown_parameters_ignored() {
        let parsed: FilterSet =
            serde_json::from_str(r#"{"make":"Honda","color":"red","page":"2"}"#).unwrap();
        assert_eq!(parsed, with_make("Honda"));
    }
}
