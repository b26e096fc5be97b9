use crate::core::json::JsonLike;

/// Fallback used for every field without a registered resolver: reads the
/// property named like the field off the parent value.
pub struct DefaultResolver;

impl DefaultResolver {
    #[inline(always)]
    pub fn resolve<Value: JsonLike>(parent: &Value, field_name: &str) -> Option<Value> {
        parent.get_key(field_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_value::ConstValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_present_property() {
        let parent = json!({"title": "Kind of Blue", "year": 1959});
        assert_eq!(
            DefaultResolver::resolve(&parent, "title"),
            Some(json!("Kind of Blue"))
        );
    }

    #[test]
    fn test_missing_property() {
        let parent = json!({"title": "Kind of Blue"});
        assert_eq!(DefaultResolver::resolve(&parent, "artist"), None);
        assert_eq!(DefaultResolver::resolve(&json!([1, 2]), "title"), None);
    }

    #[test]
    fn test_explicit_null_is_kept() {
        let parent = ConstValue::from_json(json!({"artist": null})).unwrap();
        assert_eq!(
            DefaultResolver::resolve(&parent, "artist"),
            Some(ConstValue::Null)
        );
    }
}
