//! Label matchers
//!
//! Each matcher scores a normalised label against the vocabulary index and
//! proposes its best candidate. The [`Normalizer`](crate::Normalizer) tries
//! them in priority order and keeps the highest confidence.

use crate::label::normalize_label;
use crate::vocabulary::Vocabulary;
use std::collections::HashMap;
use std::fmt::Debug;

/// One vocabulary label, pre-normalised.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Normalised label
    pub key: String,
    /// Words of the normalised label
    pub words: Vec<String>,
    /// Tag the label belongs to
    pub tag: String,
}

/// Normalised vocabulary labels, in vocabulary order.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    entries: Vec<IndexEntry>,
    exact: HashMap<String, usize>,
}

impl LabelIndex {
    /// Indexes every label of every concept. Tags themselves are not
    /// labels: `tax` is only reachable through "Taxation" and the like.
    pub fn new(vocabulary: &Vocabulary) -> Self {
        let mut index = Self::default();
        for concept in &vocabulary.concepts {
            for label in &concept.labels {
                index.insert(label, &concept.tag);
            }
        }
        index
    }

    fn insert(&mut self, label: &str, tag: &str) {
        let key = normalize_label(label);
        if key.is_empty() || self.exact.contains_key(&key) {
            return;
        }
        self.exact.insert(key.clone(), self.entries.len());
        self.entries.push(IndexEntry {
            words: key.split(' ').map(str::to_string).collect(),
            key,
            tag: tag.to_string(),
        });
    }

    /// Entry whose key equals `key`.
    pub fn get(&self, key: &str) -> Option<&IndexEntry> {
        self.exact.get(key).map(|&idx| &self.entries[idx])
    }

    /// All entries.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Number of indexed labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A proposed mapping from a label to a tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'i> {
    /// Proposed tag
    pub tag: &'i str,
    /// Vocabulary label that matched (normalised)
    pub matched: &'i str,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
}

/// Scores a normalised label against the index.
pub trait LabelMatcher: Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Best candidate for `label`, which is already normalised and non-empty.
    fn best<'i>(&self, label: &str, index: &'i LabelIndex) -> Option<Candidate<'i>>;
}

/// Exact equality of normalised labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl LabelMatcher for ExactMatcher {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn best<'i>(&self, label: &str, index: &'i LabelIndex) -> Option<Candidate<'i>> {
        index.get(label).map(|entry| Candidate {
            tag: &entry.tag,
            matched: &entry.key,
            confidence: 1.0,
        })
    }
}

/// Whole-word containment in either direction.
///
/// The words of the longer phrase outside the contained run must all be
/// qualifiers such as "total", so "Total current assets" matches "current
/// assets" but "Deferred tax" does not match "tax". Confidence is
/// `0.7 + 0.3 * coverage`, where coverage is the word count of the shorter
/// phrase over that of the longer one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl SubstringMatcher {
    const BASE: f64 = 0.7;
    const SPAN: f64 = 0.3;

    /// Words that never change which metric a label denotes.
    pub const QUALIFIERS: &'static [&'static str] =
        &["total", "the", "for", "financial", "year", "period"];
}

impl LabelMatcher for SubstringMatcher {
    fn name(&self) -> &'static str {
        "substring"
    }

    fn best<'i>(&self, label: &str, index: &'i LabelIndex) -> Option<Candidate<'i>> {
        let words: Vec<&str> = label.split(' ').collect();
        let mut best: Option<Candidate<'i>> = None;

        for entry in index.entries() {
            let entry_words: Vec<&str> = entry.words.iter().map(String::as_str).collect();
            let (short, long) = if entry_words.len() <= words.len() {
                (&entry_words, &words)
            } else {
                (&words, &entry_words)
            };
            let Some(start) = find_run(long, short) else {
                continue;
            };
            let mut extras = long[..start].iter().chain(&long[start + short.len()..]);
            if !extras.all(|w| Self::QUALIFIERS.contains(w)) {
                continue;
            }

            let coverage = short.len() as f64 / long.len() as f64;
            let confidence = Self::BASE + Self::SPAN * coverage;
            if best.is_none_or(|b| confidence > b.confidence) {
                best = Some(Candidate {
                    tag: &entry.tag,
                    matched: &entry.key,
                    confidence,
                });
            }
        }

        best
    }
}

/// Start of the first contiguous run of `needle` words in `haystack`.
fn find_run(haystack: &[&str], needle: &[&str]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Word-by-word Jaro-Winkler similarity, discounted so a fuzzy hit never
/// outranks an exact or full-coverage substring one.
///
/// Only labels with the same number of words are compared, and the weakest
/// word pair sets the score. A typo in one word still matches, but a shared
/// prefix cannot carry an unrelated trailing word.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    weight: f64,
}

impl FuzzyMatcher {
    /// Default discount applied to the raw similarity.
    pub const DEFAULT_WEIGHT: f64 = 0.95;

    /// Creates a fuzzy matcher with the given discount.
    pub const fn with_weight(weight: f64) -> Self {
        Self { weight }
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::with_weight(Self::DEFAULT_WEIGHT)
    }
}

impl LabelMatcher for FuzzyMatcher {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn best<'i>(&self, label: &str, index: &'i LabelIndex) -> Option<Candidate<'i>> {
        let words: Vec<&str> = label.split(' ').collect();
        let mut best: Option<Candidate<'i>> = None;
        for entry in index.entries() {
            if entry.words.len() != words.len() {
                continue;
            }
            let similarity = words
                .iter()
                .zip(&entry.words)
                .map(|(word, known)| strsim::jaro_winkler(word, known))
                .fold(1.0, f64::min);
            let confidence = similarity * self.weight;
            if best.is_none_or(|b| confidence > b.confidence) {
                best = Some(Candidate {
                    tag: &entry.tag,
                    matched: &entry.key,
                    confidence,
                });
            }
        }
        best
    }
}

/// The default matcher chain: exact, then substring, then fuzzy.
pub fn default_matchers() -> Vec<Box<dyn LabelMatcher>> {
    vec![
        Box::new(ExactMatcher),
        Box::new(SubstringMatcher),
        Box::new(FuzzyMatcher::default()),
    ]
}
