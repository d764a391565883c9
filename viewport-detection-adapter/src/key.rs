#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(feature = "std")]
pub(crate) type NodeMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type NodeMap<K, V> = BTreeMap<K, V>;

#[cfg(feature = "std")]
pub(crate) use std::collections::hash_map::Entry;
#[cfg(not(feature = "std"))]
pub(crate) use alloc::collections::btree_map::Entry;

/// Identity of a host node, used to key per-node state.
#[cfg(feature = "std")]
pub trait NodeKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<T: core::hash::Hash + Eq> NodeKey for T {}

#[cfg(not(feature = "std"))]
pub trait NodeKey: Ord {}
#[cfg(not(feature = "std"))]
impl<T: Ord> NodeKey for T {}
