use serde::Serialize;
use std::collections::BTreeSet;
use std::io::{self, BufRead};

/// Unique, trimmed, non-empty dependency declarations of one project.
///
/// Declarations are compared by exact string equality after trimming, so
/// `flask==2.0` and `flask` are distinct entries. Iteration order is
/// sorted but carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencySet(BTreeSet<String>);

impl DependencySet {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = lines
            .into_iter()
            .filter_map(|line| {
                let line = line.as_ref().trim();
                (!line.is_empty()).then(|| line.to_string())
            })
            .collect();
        Self(set)
    }

    /// Reads one declaration per line.
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let lines = reader.lines().collect::<io::Result<Vec<_>>>()?;
        Ok(Self::from_lines(lines))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, declaration: &str) -> bool {
        self.0.contains(declaration)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
