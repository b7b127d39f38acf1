#![forbid(unsafe_code)]

//! The internal clipboard slot.
//!
//! One slot per interaction, last write wins. The slot is authoritative for
//! paste; the host clipboard only receives a best-effort mirror through
//! [`Effect::ClipboardWrite`](zonekit_runtime::Effect).

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityTree};
use crate::id::ZoneId;

/// Where clipboard content came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardSource {
    /// Copied or cut from a collection zone.
    Zone(ZoneId),
    /// Plain text handed over by the host.
    Text,
}

/// Content of the clipboard slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    /// Origin, used for accept checks on paste.
    pub source: ClipboardSource,
    /// Copied subtrees in document order.
    pub items: Vec<EntityTree>,
    /// The items were removed from their source.
    pub is_cut: bool,
}

impl ClipboardEntry {
    /// Entry for copied items.
    #[must_use]
    pub fn copied(zone: ZoneId, items: Vec<EntityTree>) -> Self {
        Self {
            source: ClipboardSource::Zone(zone),
            items,
            is_cut: false,
        }
    }

    /// Entry for cut items.
    #[must_use]
    pub fn cut(zone: ZoneId, items: Vec<EntityTree>) -> Self {
        Self {
            is_cut: true,
            ..Self::copied(zone, items)
        }
    }

    /// Entry for host text: one `text` entity per non-empty line.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let items = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(n, line)| EntityTree::leaf(Entity::new(format!("text-{n}"), "text").with_field("text", line)))
            .collect();
        Self {
            source: ClipboardSource::Text,
            items,
            is_cut: false,
        }
    }

    /// Whether the entry came from `zone`.
    #[must_use]
    pub fn is_from(&self, zone: &ZoneId) -> bool {
        matches!(&self.source, ClipboardSource::Zone(z) if z == zone)
    }

    /// Plain-text rendering: one line per top-level item.
    pub fn to_text(&self, text: impl Fn(&Entity) -> String) -> String {
        self.items
            .iter()
            .map(|tree| text(&tree.entity))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// JSON rendering of the items.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_entry_skips_blank_lines() {
        let entry = ClipboardEntry::from_text("one\n\n  two  \n");
        assert_eq!(entry.items.len(), 2);
        assert_eq!(entry.items[1].entity.str_field("text"), Some("two"));
        assert_eq!(entry.source, ClipboardSource::Text);
    }

    #[test]
    fn renders_text_and_json() {
        let entry = ClipboardEntry::copied(
            ZoneId::from("todos"),
            vec![
                EntityTree::leaf(Entity::new("a", "task").with_field("title", "A")),
                EntityTree::leaf(Entity::new("b", "task").with_field("title", "B")),
            ],
        );
        assert!(entry.is_from(&ZoneId::from("todos")));
        assert_eq!(entry.to_text(|e| e.str_field("title").unwrap_or_default().to_string()), "A\nB");
        let json = entry.to_json().unwrap();
        assert!(json.starts_with("[{\"id\":\"a\""));
    }
}
