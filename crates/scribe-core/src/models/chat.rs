use serde_json::Value;

use crate::store::Document;

/// A message in the shared community chat log.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub uid: String,
    pub username: String,
    pub created_at: i64,
}

impl ChatMessage {
    pub fn from_document(doc: &Document) -> Option<Self> {
        let text = doc.fields.get("text")?.as_str()?.to_string();
        Some(ChatMessage {
            id: doc.id.clone(),
            text,
            uid: str_field(&doc.fields, "uid"),
            username: str_field(&doc.fields, "username"),
            created_at: doc
                .fields
                .get("createdAt")
                .and_then(Value::as_i64)
                .unwrap_or(0),
        })
    }
}

fn str_field(fields: &Value, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
