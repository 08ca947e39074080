use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// An immutable, ordered sequence of catchment ids.
///
/// Every plural relation (contained, conjoined, receiving, contributing)
/// is stored as `Relations`. Order is the order the ids were supplied in;
/// duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Relations(Box<[String]>);

impl Relations {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.0.iter().any(|x| x == id)
    }
}

/// Normalize a one-or-many catchment argument into [`Relations`].
///
/// A single id becomes a length-1 sequence; ordered (`Vec`, slice) and
/// fixed (array) sequences are copied as-is.
pub fn normalize(value: impl Into<Relations>) -> Relations {
    value.into()
}

impl Deref for Relations {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Relations {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<&str> for Relations {
    fn from(id: &str) -> Self {
        Self(Box::new([id.to_string()]))
    }
}

impl From<String> for Relations {
    fn from(id: String) -> Self {
        Self(Box::new([id]))
    }
}

impl From<Vec<String>> for Relations {
    fn from(ids: Vec<String>) -> Self {
        Self(ids.into_boxed_slice())
    }
}

impl From<Vec<&str>> for Relations {
    fn from(ids: Vec<&str>) -> Self {
        ids.as_slice().into()
    }
}

impl From<&[&str]> for Relations {
    fn from(ids: &[&str]) -> Self {
        Self(ids.iter().map(|x| x.to_string()).collect())
    }
}

impl From<&[String]> for Relations {
    fn from(ids: &[String]) -> Self {
        Self(ids.into())
    }
}

impl<const N: usize> From<[&str; N]> for Relations {
    fn from(ids: [&str; N]) -> Self {
        ids.as_slice().into()
    }
}

impl<const N: usize> From<[String; N]> for Relations {
    fn from(ids: [String; N]) -> Self {
        Self(Box::new(ids))
    }
}

impl PartialEq<[&str]> for Relations {
    fn eq(&self, other: &[&str]) -> bool {
        self.0.len() == other.len() && self.0.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<const N: usize> PartialEq<[&str; N]> for Relations {
    fn eq(&self, other: &[&str; N]) -> bool {
        *self == other[..]
    }
}

impl FromIterator<String> for Relations {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_id_becomes_one_element() {
        let relations = normalize("cat-1");
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0], "cat-1");
    }

    #[test]
    fn test_sequences_keep_order_and_duplicates() {
        let from_vec = normalize(vec!["cat-3", "cat-1", "cat-3"]);
        assert_eq!(from_vec, ["cat-3", "cat-1", "cat-3"]);

        let from_array = normalize([String::from("b"), String::from("a")]);
        assert_eq!(from_array, ["b", "a"]);
    }

    #[test]
    fn test_empty_sequence() {
        let relations = normalize(Vec::<String>::new());
        assert!(relations.is_empty());
        assert_eq!(relations, Relations::empty());
    }

    #[test]
    fn test_contains_id() {
        let relations = normalize(["cat-1", "cat-2"]);
        assert!(relations.contains_id("cat-2"));
        assert!(!relations.contains_id("cat-3"));
    }
}
