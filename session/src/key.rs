//! Dotted key addressing over session mappings.
//!
//! Reads walk every `.`-separated segment. Writes and deletes address at most
//! two levels: `group.field` targets `field` inside the `group` object and any
//! further segments are ignored. A key whose first dot is at position 0
//! (`".hidden"`) is treated as a flat key.

use serde_json::{Map, Value};

/// A session's key/value mapping.
pub type SessionData = Map<String, Value>;

/// Write/delete target parsed from a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKey<'a> {
    /// Top-level key.
    Flat(&'a str),

    /// Second-level key inside a group object.
    Nested {
        /// First-level key.
        group: &'a str,
        /// Key inside the group.
        field: &'a str,
    },
}

impl<'a> SessionKey<'a> {
    /// Parse a key name.
    ///
    /// # Examples
    ///
    /// ```
    /// use composable_rust_session::SessionKey;
    ///
    /// assert_eq!(SessionKey::parse("user"), SessionKey::Flat("user"));
    /// assert_eq!(
    ///     SessionKey::parse("user.name"),
    ///     SessionKey::Nested { group: "user", field: "name" }
    /// );
    /// assert_eq!(
    ///     SessionKey::parse("a.b.c"),
    ///     SessionKey::Nested { group: "a", field: "b" }
    /// );
    /// assert_eq!(SessionKey::parse(".a"), SessionKey::Flat(".a"));
    /// ```
    #[must_use]
    pub fn parse(name: &'a str) -> Self {
        match name.split_once('.') {
            Some((group, rest)) if !group.is_empty() => Self::Nested {
                group,
                field: rest.split_once('.').map_or(rest, |(field, _)| field),
            },
            _ => Self::Flat(name),
        }
    }
}

/// Resolve a dotted key, walking every segment.
///
/// Returns `None` as soon as a segment is missing or an intermediate value is
/// not an object.
#[must_use]
pub fn lookup<'v>(data: &'v SessionData, name: &str) -> Option<&'v Value> {
    let mut segments = name.split('.');
    let first = segments.next()?;
    let mut current = data.get(first)?;

    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }

    Some(current)
}

/// Returns `true` if every segment of `name` is present.
///
/// Presence only: a stored `null` counts as present.
#[must_use]
pub fn contains(data: &SessionData, name: &str) -> bool {
    lookup(data, name).is_some()
}

/// Assign `value` at `key`.
///
/// A nested write creates the group object when missing and replaces a group
/// that currently holds a non-object value.
pub fn assign(data: &mut SessionData, key: SessionKey<'_>, value: Value) {
    match key {
        SessionKey::Flat(name) => {
            data.insert(name.to_string(), value);
        }
        SessionKey::Nested { group, field } => {
            let slot = data
                .entry(group.to_string())
                .or_insert_with(|| Value::Object(Map::new()));

            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }

            if let Value::Object(group) = slot {
                group.insert(field.to_string(), value);
            }
        }
    }
}

/// Remove the value at `key`, returning it if it existed.
pub fn remove(data: &mut SessionData, key: SessionKey<'_>) -> Option<Value> {
    match key {
        SessionKey::Flat(name) => data.remove(name),
        SessionKey::Nested { group, field } => data
            .get_mut(group)
            .and_then(Value::as_object_mut)
            .and_then(|group| group.remove(field)),
    }
}

/// One or more keys accepted by [`SessionStore::delete`](crate::SessionStore::delete).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionKeys(Vec<String>);

impl SessionKeys {
    /// Iterate over the key names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<&str> for SessionKeys {
    fn from(key: &str) -> Self {
        Self(vec![key.to_string()])
    }
}

impl From<String> for SessionKeys {
    fn from(key: String) -> Self {
        Self(vec![key])
    }
}

impl From<Vec<String>> for SessionKeys {
    fn from(keys: Vec<String>) -> Self {
        Self(keys)
    }
}

impl From<Vec<&str>> for SessionKeys {
    fn from(keys: Vec<&str>) -> Self {
        Self(keys.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for SessionKeys {
    fn from(keys: &[&str]) -> Self {
        Self(keys.iter().map(|key| (*key).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SessionKeys {
    fn from(keys: [&str; N]) -> Self {
        Self(keys.iter().map(|key| (*key).to_string()).collect())
    }
}
