//! Keyword frequency counting over titles, descriptions and tags.
//!
//! Tokenization policy, applied in this order:
//!
//! 1. Unicode lowercase.
//! 2. Split on every char that is not alphanumeric. Whitespace and
//!    punctuation are separators; Hangul, CJK and accented letters are kept.
//! 3. Drop tokens shorter than [`TokenPolicy::min_chars`] chars.
//! 4. Drop tokens present in the stopword set (also lowercased).

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tubelens_core::VideoRecord;

/// Built-in English stopwords plus URL fragments common in descriptions.
const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "before", "but", "by", "can", "could", "did", "do", "does", "for", "from",
    "get", "had", "has", "have", "he", "her", "here", "him", "his", "how", "if", "in", "into",
    "is", "it", "its", "just", "me", "more", "most", "my", "no", "not", "now", "of", "on", "one",
    "only", "or", "other", "our", "out", "over", "she", "so", "some", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "to", "too", "up", "us",
    "very", "was", "we", "were", "what", "when", "where", "which", "who", "why", "will", "with",
    "would", "you", "your", "http", "https", "www", "com",
];

/// Tunable part of the tokenization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    /// Tokens with fewer chars than this are discarded.
    pub min_chars: usize,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self { min_chars: 2 }
    }
}

/// A set of normalized stopwords.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stopwords(HashSet<String>);

impl Stopwords {
    /// No stopwords at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// The built-in English list.
    #[must_use]
    pub fn english() -> Self {
        ENGLISH_STOPWORDS.iter().copied().collect()
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    /// Adds more words, normalized the same way as tokens.
    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.0
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
    }
}

impl<S: AsRef<str>> FromIterator<S> for Stopwords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

/// Splits `text` into normalized tokens per the module-level policy, before
/// stopword removal.
pub fn tokenize<'a>(text: &'a str, policy: &TokenPolicy) -> impl Iterator<Item = String> + 'a {
    let min_chars = policy.min_chars;
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|raw| !raw.is_empty())
        .map(str::to_lowercase)
        .filter(move |token| token.chars().count() >= min_chars)
}

/// One keyword and its count, for ranked output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub token: String,
    pub count: u32,
}

/// Token → occurrence count. Every stored count is positive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordFrequency {
    counts: HashMap<String, u32>,
}

impl KeywordFrequency {
    #[must_use]
    pub fn get(&self, token: &str) -> Option<u32> {
        self.counts.get(token).copied()
    }

    /// Number of distinct tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total occurrences across all tokens.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    #[must_use]
    pub fn as_map(&self) -> &HashMap<String, u32> {
        &self.counts
    }

    /// All keywords ordered by count descending, then token ascending.
    #[must_use]
    pub fn ranked(&self) -> Vec<KeywordCount> {
        let mut out: Vec<KeywordCount> = self
            .counts
            .iter()
            .map(|(token, &count)| KeywordCount {
                token: token.clone(),
                count,
            })
            .collect();
        out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));
        out
    }

    /// The `n` highest-ranked keywords.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<KeywordCount> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

/// Counts keywords across `texts`.
///
/// The sum of the returned counts equals the number of tokens that survive
/// the policy and the stopword filter. Empty or all-stopword input yields an
/// empty frequency map.
pub fn extract_keywords<I, S>(
    texts: I,
    stopwords: &Stopwords,
    policy: &TokenPolicy,
) -> KeywordFrequency
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: HashMap<String, u32> = HashMap::new();
    for text in texts {
        for token in tokenize(text.as_ref(), policy) {
            if stopwords.contains(&token) {
                continue;
            }
            let entry = counts.entry(token).or_insert(0);
            *entry = entry.saturating_add(1);
        }
    }
    KeywordFrequency { counts }
}

/// Which record fields feed keyword extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordSource {
    #[default]
    Titles,
    Descriptions,
    Tags,
    All,
}

impl KeywordSource {
    /// Names the selected fields, e.g. for report and prompt headings.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            KeywordSource::Titles => "title",
            KeywordSource::Descriptions => "description",
            KeywordSource::Tags => "tag",
            KeywordSource::All => "title, description and tag",
        }
    }
}

/// Collects the text fields selected by `source` from `records`.
pub fn texts_for<'a, I>(records: I, source: KeywordSource) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a VideoRecord>,
{
    let mut texts = Vec::new();
    for record in records {
        if matches!(source, KeywordSource::Titles | KeywordSource::All) {
            texts.push(record.title.as_str());
        }
        if matches!(source, KeywordSource::Descriptions | KeywordSource::All) {
            texts.push(record.description.as_str());
        }
        if matches!(source, KeywordSource::Tags | KeywordSource::All) {
            texts.extend(record.tags.iter().map(String::as_str));
        }
    }
    texts
}
