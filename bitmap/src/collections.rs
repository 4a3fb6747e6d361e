//! Internal collection type aliases.
//!
//! Shard maps are keyed by small integers, so `rustc_hash::FxHashMap` is used
//! throughout the crate.

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
