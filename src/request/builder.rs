//! Request object construction
//!
//! Only explicitly supplied members end up in a request. A member that was
//! never set is absent from the serialized body, which the service reads as
//! "use the default"; an explicitly empty value is transmitted as-is.

use crate::types::{JsonObject, JsonValue};
use serde::Serialize;
use serde_json::Value;

/// A fully built request: wire member name -> value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Request {
    fields: JsonObject,
}

impl Request {
    /// Get a member by dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Check whether a member was set
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Top-level members
    pub fn fields(&self) -> &JsonObject {
        &self.fields
    }

    /// Consume into the top-level member map
    pub fn into_fields(self) -> JsonObject {
        self.fields
    }

    /// Number of top-level members
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no member was set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Take a member out by dotted path, dropping parents it leaves empty
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        remove_path(&mut self.fields, path)
    }

    /// Copy of this request with one more member set
    #[must_use]
    pub fn with(&self, path: &str, value: impl Into<JsonValue>) -> Self {
        let mut fields = self.fields.clone();
        insert_path(&mut fields, path, value.into());
        Self { fields }
    }
}

/// Builder that distinguishes "not provided" from "provided"
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    fields: JsonObject,
}

impl RequestBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a member unconditionally
    #[must_use]
    pub fn set(mut self, path: &str, value: impl Into<JsonValue>) -> Self {
        self.insert(path, value);
        self
    }

    /// Set a member only when a value was provided
    #[must_use]
    pub fn set_opt<V: Into<JsonValue>>(mut self, path: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(path, value);
        }
        self
    }

    /// Set a list member from a provided sequence, keeping element order
    #[must_use]
    pub fn set_list<I, V>(mut self, path: &str, items: Option<I>) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<JsonValue>,
    {
        if let Some(items) = items {
            let list: Vec<JsonValue> = items.into_iter().map(Into::into).collect();
            self.insert(path, Value::Array(list));
        }
        self
    }

    /// Set a map member from provided pairs; later duplicates win
    #[must_use]
    pub fn set_map<I, K, V>(mut self, path: &str, entries: Option<I>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<JsonValue>,
    {
        if let Some(entries) = entries {
            let map: JsonObject = entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect();
            self.insert(path, Value::Object(map));
        }
        self
    }

    /// Set a member in place
    pub fn insert(&mut self, path: &str, value: impl Into<JsonValue>) {
        insert_path(&mut self.fields, path, value.into());
    }

    /// Finish the request
    pub fn build(self) -> Request {
        Request {
            fields: self.fields,
        }
    }
}

/// Insert a value at a dotted path, creating intermediate objects on demand
fn insert_path(fields: &mut JsonObject, path: &str, value: JsonValue) {
    match path.split_once('.') {
        None => {
            fields.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = fields
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(JsonObject::new()));
            if !child.is_object() {
                *child = Value::Object(JsonObject::new());
            }
            if let Value::Object(map) = child {
                insert_path(map, rest, value);
            }
        }
    }
}

fn remove_path(fields: &mut JsonObject, path: &str) -> Option<JsonValue> {
    match path.split_once('.') {
        None => fields.remove(path),
        Some((head, rest)) => {
            let Value::Object(child) = fields.get_mut(head)? else {
                return None;
            };
            let removed = remove_path(child, rest);
            if removed.is_some() && child.is_empty() {
                fields.remove(head);
            }
            removed
        }
    }
}
