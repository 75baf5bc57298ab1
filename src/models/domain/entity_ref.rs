use serde::{Deserialize, Serialize};

/// An element of an association array.
///
/// Older documents embed a partial object instead of the bare id, so both
/// shapes are accepted on read.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EntityRef {
    Id(String),
    Embedded(EmbeddedRef),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmbeddedRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityRef {
    pub fn id(&self) -> &str {
        match self {
            EntityRef::Id(id) => id,
            EntityRef::Embedded(embedded) => &embedded.id,
        }
    }

    pub fn refers_to(&self, id: &str) -> bool {
        self.id() == id
    }
}

impl From<String> for EntityRef {
    fn from(id: String) -> Self {
        EntityRef::Id(id)
    }
}

impl From<&str> for EntityRef {
    fn from(id: &str) -> Self {
        EntityRef::Id(id.to_string())
    }
}

/// Ids of the referenced entities, first occurrence wins.
pub fn ref_ids(refs: &[EntityRef]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::with_capacity(refs.len());
    for r in refs {
        if !ids.iter().any(|id| id == r.id()) {
            ids.push(r.id().to_string());
        }
    }
    ids
}

pub fn contains_ref(refs: &[EntityRef], id: &str) -> bool {
    refs.iter().any(|r| r.refers_to(id))
}

/// Drops every reference to `id`, returning whether anything was removed.
pub fn remove_ref(refs: &mut Vec<EntityRef>, id: &str) -> bool {
    let before = refs.len();
    refs.retain(|r| !r.refers_to(id));
    refs.len() != before
}
