//! # Distinguished Names
//!
//! A [`Dn`] is the hierarchical address of an entry in the directory, e.g.
//! `uuid=1234,ou=images,o=smartdc`. DNs are normalized on parse (whitespace
//! around components is dropped) so that `ou=images, o=smartdc` and
//! `ou=images,o=smartdc` name the same cache key.

use crate::error::{FieldError, ModelError};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dn {
    rdns: Vec<String>,
}

impl Dn {
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        let rdns: Vec<String> = split_unescaped(s)
            .into_iter()
            .map(|c| c.trim().to_string())
            .collect();
        if rdns.iter().any(|c| c.is_empty() || !c.contains('=')) {
            return Err(ModelError::invalid_parameter(
                format!("invalid dn: \"{s}\""),
                vec![FieldError::invalid("dn")],
            ));
        }
        Ok(Self { rdns })
    }

    /// Builds the DN `attr=value,<self>`.
    pub fn child(&self, attr: &str, value: &str) -> Dn {
        let mut rdns = Vec::with_capacity(self.rdns.len() + 1);
        rdns.push(format!("{attr}={}", escape_value(value)));
        rdns.extend(self.rdns.iter().cloned());
        Dn { rdns }
    }

    /// The DN one level up, or `None` for a single-component DN.
    pub fn parent(&self) -> Option<Dn> {
        if self.rdns.len() < 2 {
            return None;
        }
        Some(Dn {
            rdns: self.rdns[1..].to_vec(),
        })
    }

    /// The leftmost component, e.g. `uuid=1234`.
    pub fn rdn(&self) -> &str {
        &self.rdns[0]
    }

    pub fn depth(&self) -> usize {
        self.rdns.len()
    }

    /// True when `self` lies at or below `base`.
    pub fn is_under(&self, base: &Dn) -> bool {
        self.rdns.len() >= base.rdns.len()
            && self.rdns[self.rdns.len() - base.rdns.len()..]
                .iter()
                .zip(&base.rdns)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    /// True when both name the same entry, ignoring ASCII case.
    pub fn same_entry(&self, other: &Dn) -> bool {
        self.depth() == other.depth() && self.is_under(other)
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rdns.join(","))
    }
}

impl FromStr for Dn {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dn::parse(s)
    }
}

fn split_unescaped(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            ',' if !escaped => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => escaped = false,
        }
    }
    parts.push(&s[start..]);
    parts
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_whitespace() {
        let a = Dn::parse("uuid=1, ou=images, o=smartdc").unwrap();
        let b = Dn::parse("uuid=1,ou=images,o=smartdc").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "uuid=1,ou=images,o=smartdc");
    }

    #[test]
    fn test_parent_and_child() {
        let parent = Dn::parse("ou=widgets,o=test").unwrap();
        let child = parent.child("id", "W1");
        assert_eq!(child.to_string(), "id=W1,ou=widgets,o=test");
        assert_eq!(child.parent(), Some(parent.clone()));
        assert_eq!(child.rdn(), "id=W1");
        assert!(child.is_under(&parent));
        assert!(!parent.is_under(&child));
        assert_eq!(Dn::parse("o=test").unwrap().parent(), None);
    }

    #[test]
    fn test_same_entry_ignores_case() {
        let a = Dn::parse("uuid=1,ou=Images,o=smartdc").unwrap();
        let b = Dn::parse("UUID=1, ou=images, o=smartdc").unwrap();
        assert!(a.same_entry(&b));
        assert!(!a.same_entry(&a.parent().unwrap()));
        assert!(!a.same_entry(&Dn::parse("uuid=2,ou=images,o=smartdc").unwrap()));
    }

    #[test]
    fn test_escaped_comma_stays_in_component() {
        let parent = Dn::parse("o=test").unwrap();
        let child = parent.child("cn", "Smith, J");
        assert_eq!(child.depth(), 2);
        let reparsed = Dn::parse(&child.to_string()).unwrap();
        assert_eq!(reparsed, child);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Dn::parse("").is_err());
        assert!(Dn::parse("not a dn").is_err());
        assert!(Dn::parse("ou=a,,o=b").is_err());
    }
}
