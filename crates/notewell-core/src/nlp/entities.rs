//! Pattern-based entity recognition over lower-cased text.

use std::sync::LazyLock;

use regex::Regex;

use super::tokenizer::URL_PATTERN;
use crate::compile_regex;

const MONTHS: &str =
    "january|february|march|april|may|june|july|august|september|october|november|december";

/// Date and clock-time forms treated as noise rather than topics.
static DATE_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex(&format!(
        r"(?i)\b(?:\d{{1,2}}/\d{{1,2}}/\d{{2,4}}|\d{{4}}-\d{{1,2}}-\d{{1,2}}|(?:{MONTHS})\s\d{{1,2}}(?:st|nd|rd|th)?,?\s\d{{4}}|\d{{1,2}}\s(?:{MONTHS})\s\d{{4}}|\d{{1,2}}:\d{{2}}(?::\d{{2}})?\s?(?:am|pm))\b"
    ))
});

static ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex(&format!(
        r"(?P<date>\b(?:\d{{1,2}}/\d{{1,2}}/\d{{2,4}}|\d{{4}}-\d{{1,2}}-\d{{1,2}}|(?:{MONTHS})\s\d{{1,2}}(?:st|nd|rd|th)?,?\s\d{{4}}|\d{{1,2}}\s(?:{MONTHS})\s\d{{4}})\b)|(?P<time>\b\d{{1,2}}:\d{{2}}(?::\d{{2}})?\s?(?:am|pm)\b)|(?P<hashtag>\B#[\p{{L}}_][\p{{L}}\p{{N}}_-]*)|(?P<mention>\B@[\p{{L}}_][\p{{L}}\p{{N}}_]*)"
    ))
});

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| compile_regex(URL_PATTERN));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Date,
    Time,
    Hashtag,
    Mention,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub kind: EntityKind,
}

/// Whether `text` is a date or clock time.
pub fn is_date_or_time(text: &str) -> bool {
    DATE_TIME_REGEX.is_match(text)
}

/// Finds dates, times, hashtags and mentions. Matches inside URLs are
/// ignored so link targets do not produce entities.
#[derive(Debug, Clone, Default)]
pub struct EntityRecognizer;

impl EntityRecognizer {
    pub fn new() -> Self {
        Self
    }

    /// Entities in order of appearance.
    pub fn recognize(&self, text: &str) -> Vec<Entity> {
        let url_spans: Vec<_> = URL_REGEX.find_iter(text).map(|m| m.range()).collect();

        ENTITY_REGEX
            .captures_iter(text)
            .filter_map(|caps| {
                let (kind, m) = [
                    ("date", EntityKind::Date),
                    ("time", EntityKind::Time),
                    ("hashtag", EntityKind::Hashtag),
                    ("mention", EntityKind::Mention),
                ]
                .into_iter()
                .find_map(|(name, kind)| caps.name(name).map(|m| (kind, m)))?;

                if url_spans.iter().any(|span| span.contains(&m.start())) {
                    return None;
                }

                Some(Entity {
                    text: m.as_str().to_string(),
                    kind,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(String, EntityKind)> {
        EntityRecognizer::new()
            .recognize(text)
            .into_iter()
            .map(|e| (e.text, e.kind))
            .collect()
    }

    #[test]
    fn test_recognize_dates_and_times() {
        let found = kinds("due 12/31/2024, moved to march 5, 2025 at 10:30 am or 2025-01-02");
        assert_eq!(
            found,
            vec![
                ("12/31/2024".to_string(), EntityKind::Date),
                ("march 5, 2025".to_string(), EntityKind::Date),
                ("10:30 am".to_string(), EntityKind::Time),
                ("2025-01-02".to_string(), EntityKind::Date),
            ]
        );
        assert!(found.iter().all(|(text, _)| is_date_or_time(text)));
    }

    #[test]
    fn test_recognize_hashtags_and_mentions() {
        let found = kinds("ping @alice about #release-notes, not bob@example.com");
        assert_eq!(
            found,
            vec![
                ("@alice".to_string(), EntityKind::Mention),
                ("#release-notes".to_string(), EntityKind::Hashtag),
            ]
        );
        assert!(!is_date_or_time("#release-notes"));
    }

    #[test]
    fn test_ignores_matches_inside_urls() {
        assert!(kinds("see http://example.com/#intro and www.site.org/@me").is_empty());
    }

    #[test]
    fn test_plain_clock_time_is_not_an_entity() {
        assert!(kinds("at 10:30 sharp").is_empty());
    }
}
