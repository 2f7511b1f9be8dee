//! # Records, Filters & Changes
//!
//! Plain data shapes exchanged with the directory:
//!
//! - [`RawRecord`]: the directory-native form of one entry. This is the only
//!   form the cache is allowed to hold.
//! - [`Record`]: a plain submitted data record (route params merged with a
//!   JSON body).
//! - [`Filter`], [`SearchScope`], [`SearchOptions`]: search inputs.
//! - [`Change`]: a single modification of an existing entry.

use crate::dn::Dn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A plain data record as submitted by a caller.
pub type Record = serde_json::Map<String, Value>;

/// The raw, directory-native representation of an entry: attribute name to
/// one or more string values. Attribute names are lower-cased on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    attrs: BTreeMap<String, Vec<String>>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value of `attr`, if any.
    pub fn first(&self, attr: &str) -> Option<&str> {
        self.attrs
            .get(&attr.to_ascii_lowercase())
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// All values of `attr` (empty when absent).
    pub fn values(&self, attr: &str) -> &[String] {
        self.attrs
            .get(&attr.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn set(&mut self, attr: &str, value: impl Into<String>) -> &mut Self {
        self.attrs
            .insert(attr.to_ascii_lowercase(), vec![value.into()]);
        self
    }

    /// Replaces all values of `attr`. An empty list removes the attribute.
    pub fn set_all<I, S>(&mut self, attr: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.attrs.remove(&attr.to_ascii_lowercase());
        } else {
            self.attrs.insert(attr.to_ascii_lowercase(), values);
        }
        self
    }

    pub fn remove(&mut self, attr: &str) -> Option<Vec<String>> {
        self.attrs.remove(&attr.to_ascii_lowercase())
    }

    pub fn contains(&self, attr: &str) -> bool {
        self.attrs.contains_key(&attr.to_ascii_lowercase())
    }

    pub fn has_objectclass(&self, objectclass: &str) -> bool {
        self.values("objectclass")
            .iter()
            .any(|v| v.eq_ignore_ascii_case(objectclass))
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Applies one modification in place.
    pub fn apply(&mut self, change: &Change) {
        match change {
            Change::Replace(attr, values) => {
                self.set_all(attr, values.iter().cloned());
            }
            Change::Add(attr, values) => {
                let entry = self.attrs.entry(attr.to_ascii_lowercase()).or_default();
                for v in values {
                    if !entry.contains(v) {
                        entry.push(v.clone());
                    }
                }
            }
            Change::Delete(attr) => {
                self.remove(attr);
            }
        }
    }

    /// Changes that turn `self` into `target`: replace every attribute of
    /// `target`, delete every attribute only `self` has.
    pub fn diff(&self, target: &RawRecord) -> Vec<Change> {
        let mut changes: Vec<Change> = target
            .attrs
            .iter()
            .filter(|(k, v)| self.attrs.get(*k) != Some(*v))
            .map(|(k, v)| Change::Replace(k.clone(), v.clone()))
            .collect();
        changes.extend(
            self.attrs
                .keys()
                .filter(|k| !target.attrs.contains_key(*k))
                .map(|k| Change::Delete(k.clone())),
        );
        changes
    }
}

impl From<&Record> for RawRecord {
    /// Flattens submitted JSON into directory form: strings are kept,
    /// numbers and booleans are stringified, arrays become multi-valued
    /// attributes, nulls are dropped and objects are stored as JSON text.
    fn from(data: &Record) -> Self {
        let mut raw = RawRecord::new();
        for (key, value) in data {
            let values: Vec<String> = match value {
                Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
                other => scalar_to_string(other).into_iter().collect(),
            };
            raw.set_all(key, values);
        }
        raw
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// One search result.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub dn: Dn,
    pub raw: RawRecord,
}

/// Search breadth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Exactly the entry at the base DN.
    Base,
    /// Immediate children of the base DN.
    One,
    /// The base DN and everything below it.
    Sub,
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchScope::Base => write!(f, "base"),
            SearchScope::One => write!(f, "one"),
            SearchScope::Sub => write!(f, "sub"),
        }
    }
}

/// An LDAP-style search filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Equal(String, String),
    Present(String),
    And(Vec<Filter>),
}

impl Filter {
    pub fn objectclass(objectclass: &str) -> Self {
        Filter::Equal("objectclass".to_string(), objectclass.to_string())
    }

    pub fn matches(&self, raw: &RawRecord) -> bool {
        match self {
            Filter::Equal(attr, value) => {
                raw.values(attr).iter().any(|v| v.eq_ignore_ascii_case(value))
            }
            Filter::Present(attr) => raw.contains(attr),
            Filter::And(filters) => filters.iter().all(|f| f.matches(raw)),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Equal(attr, value) => write!(f, "({attr}={value})"),
            Filter::Present(attr) => write!(f, "({attr}=*)"),
            Filter::And(filters) => {
                write!(f, "(&")?;
                for filter in filters {
                    write!(f, "{filter}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub scope: SearchScope,
    pub filter: Option<Filter>,
}

impl SearchOptions {
    pub fn base() -> Self {
        Self {
            scope: SearchScope::Base,
            filter: None,
        }
    }

    pub fn one(filter: Filter) -> Self {
        Self {
            scope: SearchScope::One,
            filter: Some(filter),
        }
    }
}

/// A modification applied to an existing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Replace(String, Vec<String>),
    Add(String, Vec<String>),
    Delete(String),
}
