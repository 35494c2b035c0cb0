use serde_json::Value;

use crate::store::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Like,
    Comment,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "like" => Some(NotificationKind::Like),
            "comment" => Some(NotificationKind::Comment),
            _ => None,
        }
    }
}

/// A like/comment notification addressed to a quote's author.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub sender_name: String,
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
    pub created_at: i64,
}

impl Notification {
    /// Map a remote document to a `Notification`. Requires recipient and a
    /// recognized kind; everything else is defaulted.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let recipient_id = doc.fields.get("recipientId")?.as_str()?.to_string();
        let kind = NotificationKind::parse(doc.fields.get("type")?.as_str()?)?;

        Some(Notification {
            id: doc.id.clone(),
            recipient_id,
            sender_name: str_field(&doc.fields, "senderName"),
            kind,
            message: str_field(&doc.fields, "message"),
            read: doc
                .fields
                .get("read")
                .and_then(Value::as_bool)
                .unwrap_or(false),
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
