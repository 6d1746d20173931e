//! Header normalization and the name -> column lookup built once per sheet.

use std::collections::HashMap;

/// Characters that render as nothing and must not take part in comparisons.
const INVISIBLE: [char; 4] = ['\u{200b}', '\u{200c}', '\u{200d}', '\u{feff}'];

/// Non-breaking spaces, compared as ordinary spaces.
const HARD_SPACES: [char; 3] = ['\u{a0}', '\u{202f}', '\u{2007}'];

/// Normalize a column name for lookup.
///
/// Non-breaking spaces become plain spaces, zero-width characters are
/// removed, surrounding whitespace is trimmed and the result is lowercased.
pub fn normalize_header(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !INVISIBLE.contains(c))
        .map(|c| if HARD_SPACES.contains(&c) { ' ' } else { c })
        .collect();
    cleaned.trim().to_lowercase()
}

/// Normalized column name -> column position (0-based).
#[derive(Clone, Debug, Default)]
pub struct HeaderMapping {
    positions: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl HeaderMapping {
    /// Build the mapping from a header row. Blank headers are skipped; when
    /// two headers normalize to the same name the leftmost one wins.
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mapping = HeaderMapping::default();
        for (idx, header) in headers.into_iter().enumerate() {
            let key = normalize_header(header.as_ref());
            if key.is_empty() {
                continue;
            }
            if mapping.positions.contains_key(&key) {
                mapping.duplicates.push(key);
                continue;
            }
            mapping.positions.insert(key, idx);
        }
        mapping
    }

    /// Look up a column by name. The name is normalized first.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(&normalize_header(name)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Normalized names that appeared more than once in the header row.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
