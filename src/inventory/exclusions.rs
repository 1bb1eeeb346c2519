//! Case-insensitive set of item names left out of valuations

use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    names: HashSet<String>,
}

impl ExclusionSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }

    /// Exact match on the lowercased name
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_exact_match() {
        let set = ExclusionSet::new(["ak-47 | redline"]);
        assert!(set.contains("AK-47 | Redline"));
        assert!(!set.contains("AK-47 | Redline (Field-Tested)"));
    }

    #[test]
    fn test_partial_name_does_not_match() {
        let set = ExclusionSet::new(["redline"]);
        assert!(!set.contains("AK-47 | Redline"));
    }

    #[test]
    fn test_blank_entries_dropped() {
        let set = ExclusionSet::new(["", "  ", "Sticker | Crown"]);
        assert_eq!(set.len(), 1);
        assert!(set.contains("sticker | crown"));
    }
}
