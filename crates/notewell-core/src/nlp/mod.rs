//! Keyword tag extraction.
//!
//! ```text
//! text ──lowercase──► tokenize ──► PosTagger ──► common nouns ─┐
//!                 └──────────────► EntityRecognizer ──────────┤
//!                                   (minus dates/times)       ▼
//!                                          normalize + stopword filter
//!                                                    │
//!                                              FrequencyMap
//!                                                    │
//!                                   sort by count desc (stable), take N
//! ```
//!
//! Ties keep the order in which a word first entered the frequency map, and
//! the noun pass runs before the entity pass. Words are not stemmed.

mod entities;
mod pos;
mod stopwords;
mod tokenizer;

pub use entities::{is_date_or_time, Entity, EntityKind, EntityRecognizer};
pub use pos::{Pos, PosTagger};
pub use stopwords::Stopwords;
pub use tokenizer::{tokenize, Token, TokenShape};

pub(crate) use tokenizer::URL_PATTERN;

use std::collections::HashMap;

/// Occurrence counts that remember first-insertion order.
#[derive(Debug, Default)]
struct FrequencyMap {
    counts: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl FrequencyMap {
    fn add(&mut self, word: String) {
        match self.index.get(&word) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(word.clone(), self.counts.len());
                self.counts.push((word, 1));
            }
        }
    }

    fn top(mut self, n: usize) -> Vec<String> {
        // stable: equal counts stay in insertion order
        self.counts.sort_by(|a, b| b.1.cmp(&a.1));
        self.counts.into_iter().take(n).map(|(word, _)| word).collect()
    }
}

/// Derives ranked keyword tags from note text.
///
/// Built once per run and shared by reference; extraction does not mutate it.
#[derive(Debug, Clone)]
pub struct TagExtractor {
    tagger: PosTagger,
    entities: EntityRecognizer,
    stopwords: Stopwords,
}

impl TagExtractor {
    pub fn new() -> Self {
        Self {
            tagger: PosTagger::new(),
            entities: EntityRecognizer::new(),
            stopwords: Stopwords::english(),
        }
    }

    /// Up to `max_tags` tags, most frequent first.
    pub fn extract_tags(&self, text: &str, max_tags: usize) -> Vec<String> {
        if max_tags == 0 {
            return Vec::new();
        }

        let text = text.to_lowercase();
        let mut frequencies = FrequencyMap::default();

        let tokens = tokenize(&text);
        let tags = self.tagger.tag(&tokens);
        for (token, pos) in tokens.iter().zip(&tags) {
            if *pos != Pos::Noun {
                continue;
            }
            if let Some(word) = self.candidate(&token.text) {
                frequencies.add(word);
            }
        }

        for entity in self.entities.recognize(&text) {
            if is_date_or_time(&entity.text) {
                tracing::trace!(entity = %entity.text, "Skipping date/time entity");
                continue;
            }
            if let Some(word) = self.candidate(&entity.text) {
                frequencies.add(word);
            }
        }

        frequencies.top(max_tags)
    }

    /// Normalized form of a candidate word, or `None` when it is a stopword
    /// or too short.
    fn candidate(&self, raw: &str) -> Option<String> {
        if self.stopwords.contains(raw) {
            return None;
        }
        let word = normalize(raw);
        if word.chars().count() <= 1 || self.stopwords.contains(&word) {
            return None;
        }
        Some(word)
    }
}

impl Default for TagExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-fold and strip punctuation, keeping inner `-` and `_`.
pub fn normalize(raw: &str) -> String {
    let word: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    word.trim_matches(|c| c == '-' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_by_frequency() {
        let extractor = TagExtractor::new();
        let text = "The compiler reads the source. The compiler emits a binary. \
                    Source maps help. The compiler is fast.";

        let tags = extractor.extract_tags(text, 2);

        assert_eq!(tags, vec!["compiler", "source"]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let extractor = TagExtractor::new();

        let tags = extractor.extract_tags("Garden hose. Kitchen chair. Garden chair.", 3);

        assert_eq!(tags, vec!["garden", "chair", "hose"]);
    }

    #[test]
    fn test_is_deterministic() {
        let extractor = TagExtractor::new();
        let text = "Rust crates and cargo builds; #rust crates ship binaries to users @ferris";

        let first = extractor.extract_tags(text, 4);
        for _ in 0..10 {
            assert_eq!(extractor.extract_tags(text, 4), first);
        }
        assert_eq!(TagExtractor::new().extract_tags(text, 4), first);
    }

    #[test]
    fn test_never_exceeds_max_tags() {
        let extractor = TagExtractor::new();
        let text = "apple banana cherry grape lemon mango orange peach";

        assert_eq!(extractor.extract_tags(text, 3).len(), 3);
        assert!(extractor.extract_tags(text, 0).is_empty());
        assert!(extractor.extract_tags("", 5).is_empty());
    }

    #[test]
    fn test_excludes_stopwords_and_single_letters() {
        let extractor = TagExtractor::new();
        let stopwords = Stopwords::english();

        let tags = extractor.extract_tags("x y z ought ours yours the report x", 10);

        assert_eq!(tags, vec!["report"]);
        assert!(tags.iter().all(|t| !stopwords.contains(t)));
    }

    #[test]
    fn test_entities_counted_but_dates_excluded() {
        let extractor = TagExtractor::new();
        let text = "#release planning on 12/31/2024 at 10:30 am. \
                    #release checklist for march 5, 2025.";

        let tags = extractor.extract_tags(text, 10);

        assert_eq!(tags[0], "release");
        assert!(tags.iter().all(|t| !is_date_or_time(t)));
        assert!(!tags.iter().any(|t| t.chars().all(|c| c.is_ascii_digit())));
    }

    #[test]
    fn test_urls_do_not_become_tags() {
        let extractor = TagExtractor::new();

        let tags = extractor.extract_tags(
            "Visit [http://example.com](http://example.com) today",
            5,
        );

        assert_eq!(tags, vec!["today"]);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("#Release-Notes!"), "release-notes");
        assert_eq!(normalize("@Alice"), "alice");
        assert_eq!(normalize("--x--"), "x");
    }
}
