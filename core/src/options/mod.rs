//! Typed option cache
//!
//! Mirrors the host's string-keyed variables into a fixed set of entries and
//! tracks which of them changed since they were last looked at.
//!
//! # Change tracking
//!
//! Every entry carries one dirty flag consumed by [`OptionCache::is_updated`]:
//! a change is reported to exactly one caller. Components that need to react
//! to the same key independently subscribe as named listeners
//! ([`OptionCache::subscribe`]) and get their own flags, so one poll fans out to
//! every listener without them stealing each other's notifications.
//!
//! # Failure model
//!
//! Nothing here returns an error. Missing keys, unsupported host queries and
//! unparsable values all resolve to defaults.

mod definitions;
mod value;


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use hashbrown::HashMap;
use tracing::{debug, trace, warn};

use crate::environment::Environment;

pub use definitions::{DEFINITIONS, OptionDefinition, find as find_definition, keys, known_keys};
pub use value::{OptionValue, parse_float_prefix, parse_integer_prefix};

/// One cached option.
#[derive(Debug)]
struct OptionEntry {
    key: String,
    default: String,
    value: RwLock<String>,
    dirty: AtomicBool,
}

impl OptionEntry {
    fn current(&self) -> String {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Store `new` if it differs. Returns whether the value changed.
    fn replace_if_changed(&self, new: String) -> bool {
        let mut value = self.value.write().unwrap_or_else(PoisonError::into_inner);
        if *value == new {
            return false;
        }
        *value = new;
        true
    }
}

/// Dirty flags owned by one named listener.
#[derive(Debug, Default)]
struct Listener {
    flags: HashMap<usize, AtomicBool>,
}

/// Snapshot of host options with per-key change detection.
#[derive(Debug, Default)]
pub struct OptionCache {
    entries: Vec<OptionEntry>,
    index: HashMap<String, usize>,
    listeners: HashMap<String, Listener>,
}

impl OptionCache {
    /// Register every known key and read its initial value from the host.
    ///
    /// Keys the host has no value for start at their default. Duplicate keys
    /// keep the first registration.
    pub fn initialize<I, K, V>(env: &dyn Environment, known: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut cache = Self::default();

        for (key, default) in known {
            let key = key.into();
            if cache.index.contains_key(&key) {
                debug!("Option '{}' registered twice, keeping the first", key);
                continue;
            }

            let default = default.into();
            let value = env.get_variable(&key).unwrap_or_else(|| default.clone());
            trace!("Option '{}' = '{}' (default '{}')", key, value, default);

            cache.index.insert(key.clone(), cache.entries.len());
            cache.entries.push(OptionEntry {
                key,
                default,
                value: RwLock::new(value),
                dirty: AtomicBool::new(false),
            });
        }

        cache
    }

    /// Register the built-in option table, with `overrides` replacing defaults.
    ///
    /// Override keys that are not in the table are ignored.
    pub fn from_definitions(env: &dyn Environment, overrides: &HashMap<String, String>) -> Self {
        for key in overrides.keys() {
            if find_definition(key).is_none() {
                warn!("Ignoring default override for unknown option '{}'", key);
            }
        }

        Self::initialize(
            env,
            known_keys().map(|(key, default)| {
                let default = overrides
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| default.to_string());
                (key, default)
            }),
        )
    }

    /// Publish the built-in option table to the host.
    pub fn publish(env: &dyn Environment) -> bool {
        let accepted = env.set_variables(DEFINITIONS);
        if !accepted {
            debug!("Host rejected SET_VARIABLES, options stay at their defaults");
        }
        accepted
    }

    /// Re-read host values if the host reports a change.
    ///
    /// Returns the number of keys whose value changed. When the host reports
    /// no change this touches nothing. A host that cannot report changes is
    /// treated as "maybe changed" and every key is re-read.
    pub fn poll_for_changes(&self, env: &dyn Environment) -> usize {
        if env.variables_updated() == Some(false) {
            return 0;
        }

        let mut changed = 0;
        for (idx, entry) in self.entries.iter().enumerate() {
            // The host dropping a value keeps the cached one.
            let Some(new) = env.get_variable(&entry.key) else {
                continue;
            };

            if entry.replace_if_changed(new) {
                entry.dirty.store(true, Ordering::Relaxed);
                for listener in self.listeners.values() {
                    if let Some(flag) = listener.flags.get(&idx) {
                        flag.store(true, Ordering::Relaxed);
                    }
                }
                debug!("Option '{}' changed", entry.key);
                changed += 1;
            }
        }

        changed
    }

    /// Typed value of `key`, or `default` if the key is unknown or unparsable.
    pub fn get<T: OptionValue>(&self, key: &str, default: T) -> T {
        self.entry(key)
            .and_then(|entry| T::parse_option(&entry.current()))
            .unwrap_or(default)
    }

    /// Typed value of `key`, falling back to the registered default string.
    pub fn get_or_registered<T: OptionValue + Default>(&self, key: &str) -> T {
        let Some(entry) = self.entry(key) else {
            return T::default();
        };
        T::parse_option(&entry.current())
            .or_else(|| T::parse_option(&entry.default))
            .unwrap_or_default()
    }

    /// Raw cached string for `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entry(key).map(OptionEntry::current)
    }

    /// Registered default for `key`.
    pub fn default_of(&self, key: &str) -> Option<&str> {
        self.entry(key).map(|entry| entry.default.as_str())
    }

    /// Whether `key` changed since this was last called for it.
    ///
    /// Consumes the change: the next call returns `false` until another poll
    /// detects a new change.
    pub fn is_updated(&self, key: &str) -> bool {
        self.entry(key)
            .is_some_and(|entry| entry.dirty.swap(false, Ordering::Relaxed))
    }

    /// Give `listener` its own change flags for `keys`.
    ///
    /// Unknown keys are skipped. Subscribing again adds to the listener's set.
    pub fn subscribe(&mut self, listener: &str, keys: &[&str]) {
        let indices: Vec<usize> = keys
            .iter()
            .filter_map(|key| {
                let idx = self.index.get(*key).copied();
                if idx.is_none() {
                    warn!("Listener '{}' subscribed to unknown option '{}'", listener, key);
                }
                idx
            })
            .collect();

        let entry = self.listeners.entry(listener.to_string()).or_default();
        for idx in indices {
            entry.flags.entry(idx).or_insert_with(|| AtomicBool::new(false));
        }
    }

    /// Whether `key` changed since `listener` last checked it.
    pub fn is_updated_for(&self, listener: &str, key: &str) -> bool {
        let (Some(listener), Some(idx)) = (self.listeners.get(listener), self.index.get(key))
        else {
            return false;
        };
        listener
            .flags
            .get(idx)
            .is_some_and(|flag| flag.swap(false, Ordering::Relaxed))
    }

    /// Whether any of `keys` changed for `listener`. Every flag is consumed.
    pub fn any_updated_for(&self, listener: &str, keys: &[&str]) -> bool {
        keys.iter()
            .fold(false, |any, key| self.is_updated_for(listener, key) | any)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, key: &str) -> Option<&OptionEntry> {
        self.index.get(key).map(|&idx| &self.entries[idx])
    }
}
