use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// An insertion-ordered set of record ids.
///
/// Liked, disliked and matched dogs are kept in these so the order in which the adopter
/// swiped is preserved end to end (AppState, the adopter row, and derived lists).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet {
    ids: Vec<Uuid>,
}

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` at the end. Returns `false` if it was already present (order unchanged).
    pub fn insert(&mut self, id: Uuid) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Returns `true` if `id` was present.
    pub fn remove(&mut self, id: &Uuid) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        before != self.ids.len()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uuid> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_slice(&self) -> &[Uuid] {
        &self.ids
    }
}

impl FromIterator<Uuid> for IdSet {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        let mut set = IdSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = &'a Uuid;
    type IntoIter = std::slice::Iter<'a, Uuid>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

impl Serialize for IdSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.ids.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for IdSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Postgres returns NULL for an empty uuid[] column.
        let ids = Option::<Vec<Uuid>>::deserialize(deserializer)?;
        Ok(ids.unwrap_or_default().into_iter().collect())
    }
}
