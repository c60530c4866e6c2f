//! Tag Matching Module
//!
//! Query normalization and matching rules for tag-based bulk operations.
//!
//! A tag is either a scalar (matched by exact equality) or a JSON object
//! record (matched by field-subset containment: some tag on the entry must
//! carry every field of the query record with an equal value).

use serde_json::{Map, Value};

// == Query Normalization ==
/// Normalizes a tag query to a list of tags.
///
/// An array queries each of its elements; anything else is treated as a
/// single-tag query.
pub fn as_tag_list(query: &Value) -> &[Value] {
    match query {
        Value::Array(tags) => tags,
        single => std::slice::from_ref(single),
    }
}

// == Tag Matching ==
/// Checks whether an entry's tag list matches one queried tag.
///
/// Scalar queries match if the tag list contains an equal element. Record
/// queries match if some element is an object containing every field of the
/// query record.
pub fn matches(entry_tags: &[Value], query: &Value) -> bool {
    match query {
        Value::Object(record) => entry_tags
            .iter()
            .filter_map(Value::as_object)
            .any(|tag| record_contains(tag, record)),
        scalar => entry_tags.iter().any(|tag| tag == scalar),
    }
}

/// Subset containment: `tag` carries every field of `query` with equal value.
fn record_contains(tag: &Map<String, Value>, query: &Map<String, Value>) -> bool {
    query.iter().all(|(field, expected)| tag.get(field) == Some(expected))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_tag_list_wraps_single_tag() {
        let query = json!("tag1");
        let tags = as_tag_list(&query);
        assert_eq!(tags, &[json!("tag1")]);
    }

    #[test]
    fn test_as_tag_list_keeps_array() {
        let query = json!(["tag1", "tag2"]);
        let tags = as_tag_list(&query);
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_scalar_match_exact_equality() {
        let entry_tags = vec![json!("tag1"), json!("tag2")];

        assert!(matches(&entry_tags, &json!("tag1")));
        assert!(!matches(&entry_tags, &json!("tag3")));
    }

    #[test]
    fn test_scalar_match_is_not_substring() {
        let entry_tags = vec![json!("tag1")];

        assert!(!matches(&entry_tags, &json!("tag")));
    }

    #[test]
    fn test_numeric_tags_match() {
        let entry_tags = vec![json!(7), json!(42)];

        assert!(matches(&entry_tags, &json!(42)));
        assert!(!matches(&entry_tags, &json!(43)));
    }

    #[test]
    fn test_record_match_subset() {
        let entry_tags = vec![json!({"city": "Pune"}), json!({"country": "India"})];

        assert!(matches(&entry_tags, &json!({"city": "Pune"})));
        assert!(!matches(&entry_tags, &json!({"city": "Mumbai"})));
    }

    #[test]
    fn test_record_match_against_wider_record() {
        let entry_tags = vec![json!({"city": "Pune", "country": "India"})];

        // Query fields must all be present; extra fields on the tag are fine
        assert!(matches(&entry_tags, &json!({"city": "Pune"})));
        assert!(matches(&entry_tags, &json!({"city": "Pune", "country": "India"})));
        assert!(!matches(&entry_tags, &json!({"city": "Pune", "country": "Nepal"})));
    }

    #[test]
    fn test_record_query_ignores_scalar_tags() {
        let entry_tags = vec![json!("city")];

        assert!(!matches(&entry_tags, &json!({"city": "Pune"})));
    }

    #[test]
    fn test_scalar_query_ignores_record_tags() {
        let entry_tags = vec![json!({"city": "Pune"})];

        assert!(!matches(&entry_tags, &json!("Pune")));
    }

    #[test]
    fn test_empty_entry_tags_match_nothing() {
        let entry_tags: Vec<Value> = vec![];

        assert!(!matches(&entry_tags, &json!("tag1")));
        assert!(!matches(&entry_tags, &json!({"city": "Pune"})));
    }

    #[test]
    fn test_empty_record_query_matches_any_record_tag() {
        let entry_tags = vec![json!({"city": "Pune"})];

        // Vacuous subset: an empty record is contained in every record tag
        assert!(matches(&entry_tags, &json!({})));
    }
}
