#![forbid(unsafe_code)]

//! Collection items.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::ItemId;

/// One collection item: an id, a type tag, and free-form domain fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique within the collection's whole tree.
    pub id: ItemId,
    /// Type tag consulted by paste and move acceptance.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Domain fields.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

impl Entity {
    /// Entity with no fields.
    pub fn new(id: impl Into<ItemId>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            fields: Map::new(),
        }
    }

    /// Set a field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// A field value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// A string field.
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Merge `fields` over the current ones. Returns whether anything changed.
    pub fn merge(&mut self, fields: &Map<String, Value>) -> bool {
        let mut changed = false;
        for (name, value) in fields {
            if self.fields.get(name) != Some(value) {
                self.fields.insert(name.clone(), value.clone());
                changed = true;
            }
        }
        changed
    }

    /// Same fields under another id.
    #[must_use]
    pub fn with_id(&self, id: ItemId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}

/// An entity together with its descendants, detached from any collection.
///
/// This is the unit of insertion, clipboard transfer, and removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTree {
    /// The root entity.
    #[serde(flatten)]
    pub entity: Entity,
    /// Ordered children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntityTree>,
}

impl From<Entity> for EntityTree {
    fn from(entity: Entity) -> Self {
        Self::leaf(entity)
    }
}

impl EntityTree {
    /// Tree with no children.
    #[must_use]
    pub fn leaf(entity: Entity) -> Self {
        Self {
            entity,
            children: Vec::new(),
        }
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<EntityTree>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Root id.
    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.entity.id
    }

    /// All ids, depth first, root first.
    #[must_use]
    pub fn ids(&self) -> Vec<ItemId> {
        let mut out = Vec::new();
        self.walk(&mut |tree| out.push(tree.entity.id.clone()));
        out
    }

    /// Number of entities in the tree.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }

    /// Visit every node depth first.
    pub fn walk(&self, visit: &mut impl FnMut(&EntityTree)) {
        visit(self);
        for child in &self.children {
            child.walk(&mut *visit);
        }
    }

    /// Rewrite every entity, depth first.
    #[must_use]
    pub fn map(self, f: &mut impl FnMut(Entity) -> Entity) -> Self {
        let entity = f(self.entity);
        let mut children = Vec::with_capacity(self.children.len());
        for child in self.children {
            children.push(child.map(&mut *f));
        }
        Self { entity, children }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_shape_is_flat() {
        let tree = EntityTree::leaf(Entity::new("a", "task").with_field("title", "Buy milk"))
            .with_child(Entity::new("b", "task"));
        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "a",
                "type": "task",
                "fields": { "title": "Buy milk" },
                "children": [{ "id": "b", "type": "task" }]
            })
        );
        let back: EntityTree = serde_json::from_value(value).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn merge_reports_changes() {
        let mut e = Entity::new("a", "task").with_field("done", false);
        let mut patch = Map::new();
        patch.insert("done".into(), json!(false));
        assert!(!e.merge(&patch));
        patch.insert("done".into(), json!(true));
        assert!(e.merge(&patch));
        assert_eq!(e.field("done"), Some(&json!(true)));
    }

    #[test]
    fn ids_and_count_are_depth_first() {
        let tree = EntityTree::leaf(Entity::new("r", "dir"))
            .with_child(EntityTree::leaf(Entity::new("x", "dir")).with_child(Entity::new("x1", "file")))
            .with_child(Entity::new("y", "file"));
        assert_eq!(tree.count(), 4);
        let ids: Vec<String> = tree.ids().into_iter().map(String::from).collect();
        assert_eq!(ids, ["r", "x", "x1", "y"]);
    }
}
