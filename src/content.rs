//! Default object bodies for a freshly provisioned namespace.
//!
//! Deterministic: the same identifier and timestamp always render
//! byte-identical output for a given kind.

use crate::identifier::Identifier;
use crate::namespace::FileKind;
use serde_json::json;

/// Render the default body for `kind`.
pub fn generate(kind: FileKind, identifier: &Identifier, now: &str) -> Vec<u8> {
    let doc = match kind {
        FileKind::Tasks => json!({
            "identifier": identifier.as_str(),
            "created_at": now,
            "tasks": [{
                "id": "welcome_task_1",
                "title": "Welcome! This is your first task",
                "description": "Tasks you add will appear here.",
                "status": "pending",
                "priority": "medium",
                "created_at": now,
            }],
        }),
        FileKind::Ideas => json!({
            "identifier": identifier.as_str(),
            "created_at": now,
            "ideas": [{
                "id": "welcome_idea_1",
                "title": "Capture your first idea",
                "description": "Ideas you save will appear here.",
                "category": "general",
                "created_at": now,
            }],
        }),
        FileKind::Notes => json!({
            "identifier": identifier.as_str(),
            "created_at": now,
            "notes": [{
                "id": "welcome_note_1",
                "title": "Getting started",
                "content": "Notes you write will appear here.",
                "tags": ["welcome", "getting-started"],
                "created_at": now,
            }],
        }),
    };
    // `Value`'s alternate Display is pretty-printed and cannot fail.
    format!("{doc:#}").into_bytes()
}

/// Body of the marker object. The attempt id lets a writer recognise its
/// own marker when the outcome of the conditional create is unknown.
pub fn marker_body(identifier: &Identifier, attempt_id: &str, now: &str) -> Vec<u8> {
    json!({
        "identifier": identifier.as_str(),
        "attempt_id": attempt_id,
        "created_at": now,
    })
    .to_string()
    .into_bytes()
}

/// Extract the attempt id from a marker body, if it parses.
pub fn marker_attempt_id(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("attempt_id")?.as_str().map(ToString::to_string)
}
