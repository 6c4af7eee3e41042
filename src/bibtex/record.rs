//! Structured BibTeX record model.

/// One bibliographic entry.
///
/// A regular entry has a citation key and a non-empty [`Tags`] map. Directive
/// blocks (`@comment`, `@preamble`, `@string`) keep their body verbatim in
/// `raw_entry_body` and carry no tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Entry type as written after `@` (e.g. `article`).
    pub entry_type: String,
    /// Citation key, when the entry has one.
    pub citation_key: Option<String>,
    /// Verbatim body for blocks without parseable fields.
    pub raw_entry_body: Option<String>,
    /// Field name to value.
    pub tags: Tags,
}

impl Record {
    /// Creates a regular entry with the given type, key and fields.
    #[must_use]
    pub fn entry(entry_type: impl Into<String>, citation_key: Option<String>, tags: Tags) -> Self {
        Self {
            entry_type: entry_type.into(),
            citation_key,
            raw_entry_body: None,
            tags,
        }
    }

    /// Creates a directive block whose body is kept verbatim.
    #[must_use]
    pub fn raw(entry_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            citation_key: None,
            raw_entry_body: Some(body.into()),
            tags: Tags::new(),
        }
    }

    /// Returns true for regular entries, false for verbatim directive blocks.
    #[must_use]
    pub fn is_entry(&self) -> bool {
        self.raw_entry_body.is_none()
    }
}

/// Insertion-ordered field map.
///
/// Order only matters for output stability; two maps holding the same
/// name/value pairs compare equal regardless of order.
#[derive(Debug, Clone, Default, Eq)]
pub struct Tags {
    fields: Vec<(String, String)>,
}

impl Tags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.fields[i].1.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Sets `name` to `value`, replacing in place when it already exists.
    ///
    /// Returns the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => Some(std::mem::replace(&mut self.fields[i].1, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Removes `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.fields.remove(i).1)
    }

    /// Renames `from` to `to` in place, dropping any existing `to` field.
    ///
    /// Returns false when `from` is absent.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return self.contains(from);
        }
        let Some(value) = self.get(from).map(str::to_string) else {
            return false;
        };
        self.remove(to);
        if let Some(i) = self.position(from) {
            self.fields[i] = (to.to_string(), value);
        }
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(n, _)| n == name)
    }
}

impl PartialEq for Tags {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(name, value)| other.get(name) == Some(value))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for (name, value) in iter {
            tags.insert(name, value);
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_insert_replaces_in_place() {
        let mut tags: Tags = [("title", "A"), ("url", "http://old")].into_iter().collect();
        assert_eq!(tags.insert("title", "B"), Some("A".to_string()));
        let names: Vec<_> = tags.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["title", "url"]);
        assert_eq!(tags.get("title"), Some("B"));
    }

    #[test]
    fn test_tags_rename_keeps_position_and_drops_target() {
        let mut tags: Tags = [("url", "http://old"), ("year", "2020"), ("note", "x")]
            .into_iter()
            .collect();
        tags.insert("original_publication", "stale");
        assert!(tags.rename("url", "original_publication"));
        let names: Vec<_> = tags.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["original_publication", "year", "note"]);
        assert_eq!(tags.get("original_publication"), Some("http://old"));
        assert!(!tags.rename("url", "original_publication"));
    }

    #[test]
    fn test_tags_equality_ignores_order() {
        let a: Tags = [("a", "1"), ("b", "2")].into_iter().collect();
        let b: Tags = [("b", "2"), ("a", "1")].into_iter().collect();
        let c: Tags = [("a", "1"), ("b", "3")].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_record_kinds() {
        assert!(Record::entry("article", Some("k".into()), Tags::new()).is_entry());
        assert!(!Record::raw("comment", "jabref-meta").is_entry());
    }
}
