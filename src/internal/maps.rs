//! Hash map alias used for every container-internal table.

use std::collections::HashMap;

#[cfg(feature = "ahash")]
pub(crate) type FastHasher = ahash::RandomState;
#[cfg(not(feature = "ahash"))]
pub(crate) type FastHasher = std::collections::hash_map::RandomState;

pub(crate) type FastMap<K, V> = HashMap<K, V, FastHasher>;
