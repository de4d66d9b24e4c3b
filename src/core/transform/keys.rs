//! Natural-key to surrogate-key maps
//!
//! Built from the `(natural key, surrogate key)` pairs read back from the
//! warehouse after a dimension load. Lookups never touch the database.

use crate::domain::source::NaturalId;
use crate::domain::{EtlError, Result, SurrogateKey};
use std::borrow::Borrow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

/// Lookup from a dimension's natural key to its surrogate key
#[derive(Debug, Clone)]
pub struct KeyMap<K> {
    table: &'static str,
    keys: HashMap<K, SurrogateKey>,
}

/// Key map for dimensions with an integer natural key
pub type IdKeyMap = KeyMap<NaturalId>;

/// Key map for dimensions keyed by name (encounter types)
pub type NameKeyMap = KeyMap<String>;

impl<K: Eq + Hash + Display> KeyMap<K> {
    /// Build a map from read-back pairs
    ///
    /// # Errors
    ///
    /// Returns `EtlError::Integrity` if one natural key maps to two different
    /// surrogate keys.
    pub fn from_pairs(
        table: &'static str,
        pairs: impl IntoIterator<Item = (K, SurrogateKey)>,
    ) -> Result<Self> {
        let mut keys = HashMap::new();
        for (natural, key) in pairs {
            match keys.entry(natural) {
                Entry::Vacant(slot) => {
                    slot.insert(key);
                }
                Entry::Occupied(existing) if *existing.get() != key => {
                    return Err(EtlError::Integrity(format!(
                        "{table}: natural key {} maps to surrogate keys {} and {key}",
                        existing.key(),
                        existing.get()
                    )));
                }
                Entry::Occupied(_) => {}
            }
        }
        Ok(Self { table, keys })
    }

    /// Surrogate key for a natural key, if the dimension holds it
    pub fn key_of<Q>(&self, natural: &Q) -> Option<SurrogateKey>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.keys.get(natural).copied()
    }

    /// Resolve an optional natural key; absent input resolves to `None`
    pub fn key_of_opt(&self, natural: Option<&K>) -> Option<SurrogateKey> {
        natural.and_then(|n| self.key_of(n))
    }
}

impl<K> KeyMap<K> {
    /// Dimension table this map was read from
    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
