use std::collections::HashMap;

/// Outcome of resolving oracle-echoed text against known texts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Literal match.
    Exact(usize),
    /// Closest known text at or above the cutoff.
    Fuzzy { index: usize, similarity: f64 },
    /// Nothing close enough.
    Unresolved,
}

impl Resolution {
    /// Index of the resolved text, if any.
    pub fn index(self) -> Option<usize> {
        match self {
            Resolution::Exact(index) | Resolution::Fuzzy { index, .. } => Some(index),
            Resolution::Unresolved => None,
        }
    }
}

/// Maps text back to one of a fixed set of known texts.
///
/// Exact lookup first; otherwise the most similar known text by normalized Levenshtein
/// similarity, if it reaches `cutoff`. Ties keep the earliest known text.
#[derive(Debug)]
pub struct TextResolver<'a> {
    texts: Vec<&'a str>,
    exact: HashMap<&'a str, usize>,
    cutoff: Option<f64>,
}

impl<'a> TextResolver<'a> {
    /// Indexes `texts`. `cutoff: None` disables the fuzzy fallback.
    pub fn new(texts: impl IntoIterator<Item = &'a str>, cutoff: Option<f64>) -> Self {
        let texts: Vec<&'a str> = texts.into_iter().collect();
        let mut exact = HashMap::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            exact.entry(*text).or_insert(index);
        }
        Self {
            texts,
            exact,
            cutoff,
        }
    }

    pub fn resolve(&self, text: &str) -> Resolution {
        if let Some(&index) = self.exact.get(text) {
            return Resolution::Exact(index);
        }

        let Some(cutoff) = self.cutoff else {
            return Resolution::Unresolved;
        };

        let mut best: Option<(usize, f64)> = None;
        for (index, known) in self.texts.iter().enumerate() {
            let similarity = strsim::normalized_levenshtein(text, known);
            if similarity >= cutoff && best.is_none_or(|(_, s)| similarity > s) {
                best = Some((index, similarity));
            }
        }

        match best {
            Some((index, similarity)) => Resolution::Fuzzy { index, similarity },
            None => Resolution::Unresolved,
        }
    }

    /// Known text at `index`.
    pub fn text(&self, index: usize) -> Option<&'a str> {
        self.texts.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
