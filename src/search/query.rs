//! Query DSL documents sent to the `_search` endpoint.

use serde_json::{Value, json};

/// Full-text match against the `subject` field, windowed by `from`/`size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectQuery {
    pub term: String,
    pub from: i64,
    pub size: i64,
}

impl SubjectQuery {
    /// Build the query for a one-based `page` of `limit` hits. `from`
    /// saturates rather than wrapping negative.
    pub fn for_page(term: impl Into<String>, page: i64, limit: i64) -> Self {
        Self {
            term: term.into(),
            from: (page.max(1) - 1).saturating_mul(limit),
            size: limit,
        }
    }

    pub fn to_dsl(&self) -> Value {
        json!({
            "query": {
                "match": {
                    "subject": self.term,
                }
            },
            "from": self.from,
            "size": self.size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offsets_are_zero_based() {
        let query = SubjectQuery::for_page("budget", 3, 10);
        assert_eq!(query.from, 20);
        assert_eq!(query.size, 10);
    }

    #[test]
    fn huge_pages_never_wrap_negative() {
        let query = SubjectQuery::for_page("budget", i64::MAX, 100);
        assert_eq!(query.from, i64::MAX);
        assert!(query.from >= 0);
    }

    #[test]
    fn dsl_matches_subject() {
        let dsl = SubjectQuery::for_page("quarterly report", 1, 25).to_dsl();
        assert_eq!(dsl["query"]["match"]["subject"], "quarterly report");
        assert_eq!(dsl["from"], 0);
        assert_eq!(dsl["size"], 25);
    }

    #[test]
    fn quotes_in_terms_stay_inside_the_string() {
        let term = r#"he said "hi"}, "size": 9999"#;
        let dsl = SubjectQuery::for_page(term, 1, 10).to_dsl();
        assert_eq!(dsl["query"]["match"]["subject"], term);
        assert_eq!(dsl["size"], 10);
    }
}
