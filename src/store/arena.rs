//! Index-addressed entity storage with keyed find-or-create.
//!
//! Entities live in a `Vec` and are referenced by small copyable handles.
//! A [`Registry`] adds a unique key per entity so that "find existing by
//! key, else create" is a single call shared by every entity kind.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Handle type for an [`Arena`].
pub trait ArenaId: Copy + Eq + Hash + fmt::Debug {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

/// Declare a typed arena handle.
macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            #[must_use]
            pub const fn from_index(index: usize) -> Self {
                Self(index)
            }

            #[must_use]
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl $crate::store::ArenaId for $name {
            fn from_index(index: usize) -> Self {
                Self(index)
            }

            fn index(self) -> usize {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use arena_id;

/// Result of a keyed find-or-create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upserted<I> {
    pub id: I,
    /// `false` when an existing entity was found
    pub created: bool,
}

/// Vector-backed storage. Removed slots are tombstoned so handles stay
/// stable.
pub struct Arena<I, T> {
    slots: Vec<Option<T>>,
    live: usize,
    _id: PhantomData<I>,
}

impl<I: ArenaId, T> Arena<I, T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
            _id: PhantomData,
        }
    }

    pub fn push(&mut self, value: T) -> I {
        self.slots.push(Some(value));
        self.live += 1;
        I::from_index(self.slots.len() - 1)
    }

    #[must_use]
    pub fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, id: I) -> Option<T> {
        let removed = self.slots.get_mut(id.index()).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// Number of live entities.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (I::from_index(i), v)))
    }

    fn from_slots(slots: Vec<Option<T>>) -> Self {
        let live = slots.iter().filter(|s| s.is_some()).count();
        Self {
            slots,
            live,
            _id: PhantomData,
        }
    }
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, T: fmt::Debug> fmt::Debug for Arena<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("live", &self.live)
            .field("slots", &self.slots)
            .finish()
    }
}

impl<I, T: Serialize> Serialize for Arena<I, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.slots.serialize(serializer)
    }
}

impl<'de, I: ArenaId, T: Deserialize<'de>> Deserialize<'de> for Arena<I, T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Option<T>>::deserialize(deserializer).map(Self::from_slots)
    }
}

/// An entity with a unique lookup key.
///
/// The key must be derived from fields that never change after creation.
pub trait Keyed {
    type Key: Eq + Hash + Clone;

    fn key(&self) -> Self::Key;
}

/// An [`Arena`] plus a unique-key index.
pub struct Registry<I, T: Keyed> {
    arena: Arena<I, T>,
    index: HashMap<T::Key, I>,
}

impl<I: ArenaId, T: Keyed> Registry<I, T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            index: HashMap::new(),
        }
    }

    #[must_use]
    pub fn find(&self, key: &T::Key) -> Option<I> {
        self.index.get(key).copied()
    }

    /// Return the entity stored under `key`, creating it with `create` on a
    /// miss.
    pub fn upsert_with(&mut self, key: T::Key, create: impl FnOnce() -> T) -> Upserted<I> {
        if let Some(&id) = self.index.get(&key) {
            return Upserted { id, created: false };
        }
        let id = self.arena.push(create());
        self.index.insert(key, id);
        Upserted { id, created: true }
    }

    #[must_use]
    pub fn get(&self, id: I) -> Option<&T> {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.arena.get_mut(id)
    }

    pub fn remove(&mut self, id: I) -> Option<T> {
        let removed = self.arena.remove(id)?;
        self.index.remove(&removed.key());
        Some(removed)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.arena.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.arena.iter()
    }

    fn from_arena(arena: Arena<I, T>) -> Self {
        let index = arena.iter().map(|(id, value)| (value.key(), id)).collect();
        Self { arena, index }
    }
}

impl<I: ArenaId, T: Keyed> Default for Registry<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, T: Keyed + fmt::Debug> fmt::Debug for Registry<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("arena", &self.arena)
            .finish_non_exhaustive()
    }
}

impl<I, T: Keyed + Serialize> Serialize for Registry<I, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.arena.serialize(serializer)
    }
}

impl<'de, I: ArenaId, T: Keyed + Deserialize<'de>> Deserialize<'de> for Registry<I, T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Arena::<I, T>::deserialize(deserializer).map(Self::from_arena)
    }
}

/// Find-or-create for child collections keyed inside their owner.
///
/// Returns the entry and whether it was created.
pub fn upsert_entry<K: Hash + Eq, V>(
    map: &mut IndexMap<K, V>,
    key: K,
    create: impl FnOnce() -> V,
) -> (&mut V, bool) {
    match map.entry(key) {
        indexmap::map::Entry::Occupied(entry) => (entry.into_mut(), false),
        indexmap::map::Entry::Vacant(entry) => (entry.insert(create()), true),
    }
}
