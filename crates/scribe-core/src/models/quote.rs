use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Document;

/// A reader note appended to a quote's `comments` array.
///
/// `created_at` is stamped by the commenting client, not the server, so clock
/// skew across authors is possible; display order is insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub text: String,
    pub uid: String,
    pub username: String,
    pub created_at: i64,
}

/// View-ready record mapped from a quote document.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub id: String,
    pub text: String,
    pub author_id: String,
    pub author_name: String,
    pub theme_id: String,
    pub likes: Vec<String>,
    pub comments: Vec<Comment>,
    /// Server millis once confirmed; a local placeholder before that.
    pub created_at: i64,
}

impl Quote {
    /// Map a remote document to a `Quote`. Returns `None` if the document has
    /// no text; other fields are defaulted so one malformed write cannot blank
    /// the whole feed.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let text = doc.fields.get("text")?.as_str()?.to_string();
        let author_id = str_field(&doc.fields, "authorId");
        let author_name = match doc.fields.get("authorName").and_then(Value::as_str) {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => placeholder_author(&author_id),
        };
        let theme_id = doc
            .fields
            .get("themeId")
            .and_then(Value::as_str)
            .unwrap_or("classic")
            .to_string();

        let likes = doc
            .fields
            .get("likes")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let comments = doc
            .fields
            .get("comments")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        let created_at = doc
            .fields
            .get("createdAt")
            .and_then(Value::as_i64)
            .unwrap_or(0);

        Some(Quote {
            id: doc.id.clone(),
            text,
            author_id,
            author_name,
            theme_id,
            likes,
            comments,
            created_at,
        })
    }

    pub fn liked_by(&self, uid: &str) -> bool {
        self.likes.iter().any(|l| l == uid)
    }
}

fn str_field(fields: &Value, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn placeholder_author(author_id: &str) -> String {
    let prefix: String = author_id.chars().take(4).collect();
    format!("User {}", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(fields: Value) -> Document {
        Document {
            id: "q1".to_string(),
            fields,
        }
    }

    #[test]
    fn test_from_document_maps_all_fields() {
        let quote = Quote::from_document(&doc(json!({
            "text": "What you seek is seeking you.",
            "authorId": "u1",
            "authorName": "Rumi",
            "themeId": "parchment",
            "likes": ["u2", "u3"],
            "comments": [
                { "text": "lovely", "uid": "u2", "username": "User u2", "createdAt": 1700000000000i64 }
            ],
            "createdAt": 1700000000123i64,
        })))
        .unwrap();

        assert_eq!(quote.text, "What you seek is seeking you.");
        assert_eq!(quote.author_name, "Rumi");
        assert_eq!(quote.theme_id, "parchment");
        assert_eq!(quote.likes, vec!["u2", "u3"]);
        assert_eq!(quote.comments.len(), 1);
        assert_eq!(quote.comments[0].text, "lovely");
        assert_eq!(quote.created_at, 1700000000123);
        assert!(quote.liked_by("u2"));
        assert!(!quote.liked_by("u1"));
    }

    #[test]
    fn test_from_document_requires_text() {
        assert!(Quote::from_document(&doc(json!({ "authorId": "u1" }))).is_none());
    }

    #[test]
    fn test_missing_author_name_gets_placeholder() {
        let quote = Quote::from_document(&doc(json!({
            "text": "hello",
            "authorId": "abcd1234",
        })))
        .unwrap();
        assert_eq!(quote.author_name, "User abcd");
    }

    #[test]
    fn test_malformed_comments_are_skipped() {
        let quote = Quote::from_document(&doc(json!({
            "text": "hello",
            "comments": [
                { "text": "ok", "uid": "u1", "username": "User u1", "createdAt": 1 },
                "not-a-comment",
            ],
        })))
        .unwrap();
        assert_eq!(quote.comments.len(), 1);
    }

    #[test]
    fn test_defaults_for_sparse_document() {
        let quote = Quote::from_document(&doc(json!({ "text": "hi" }))).unwrap();
        assert_eq!(quote.theme_id, "classic");
        assert!(quote.likes.is_empty());
        assert!(quote.comments.is_empty());
        assert_eq!(quote.created_at, 0);
    }
}
