//! Body rewrites: bare URLs to markdown links, note titles to wikilinks.
//!
//! Both rewrites step over text that is already a markdown link or a
//! wikilink, so running them again over their own output changes nothing.

use std::sync::LazyLock;

use regex::{Captures, Regex, RegexBuilder};

use crate::compile_regex;
use crate::nlp::URL_PATTERN;

const WIKILINK_PATTERN: &str = r"\[\[[^\n]*?\]\]";
const MARKDOWN_LINK_PATTERN: &str = r"\[[^\]\n]*\]\([^)\n]*\)";

/// Compiled program budget per byte of the title pattern. The regex
/// crate's default limit is exceeded by batches of a few thousand titles.
const TITLE_REGEX_SIZE_FACTOR: usize = 256;
const MIN_TITLE_REGEX_SIZE: usize = 10 * (1 << 20);

/// Characters that end a sentence rather than a URL.
const URL_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"'];

static URL_REWRITE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex(&format!(
        r"(?P<wiki>{WIKILINK_PATTERN})|(?P<link>{MARKDOWN_LINK_PATTERN})|(?P<url>{URL_PATTERN})"
    ))
});

/// Wrap every bare URL in `[url](href)`. `www.` hosts get an `http://` href.
pub fn annotate_urls(text: &str) -> String {
    URL_REWRITE_REGEX
        .replace_all(text, |caps: &Captures| {
            let Some(url) = caps.name("url") else {
                return caps[0].to_string();
            };
            let raw = url.as_str();
            let trimmed = raw.trim_end_matches(URL_TRAILING);
            let tail = &raw[trimmed.len()..];
            if trimmed.ends_with("://") || trimmed == "www." {
                return raw.to_string();
            }

            let href = if trimmed.starts_with("www.") {
                format!("http://{trimmed}")
            } else {
                trimmed.to_string()
            };
            format!("[{trimmed}]({href}){tail}")
        })
        .into_owned()
}

/// Turns literal occurrences of known note titles into `[[title]]`.
///
/// Built once per run from every discovered title. Matching is
/// case-sensitive on word boundaries; longer titles win over titles they
/// contain.
#[derive(Debug, Clone)]
pub struct LinkAnnotator {
    regex: Option<Regex>,
}

impl LinkAnnotator {
    /// Compile the matcher for `titles`. Fails only when the batch is too
    /// large for the regex engine.
    pub fn new<I, S>(titles: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut titles: Vec<String> = titles
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        titles.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        titles.dedup();

        if titles.is_empty() {
            return Ok(Self { regex: None });
        }

        let alternation = titles
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(
            r"(?P<wiki>{WIKILINK_PATTERN})|(?P<link>{MARKDOWN_LINK_PATTERN})|(?P<url>{URL_PATTERN})|(?P<title>\b(?:{alternation})\b)"
        );
        let size_limit = pattern
            .len()
            .saturating_mul(TITLE_REGEX_SIZE_FACTOR)
            .max(MIN_TITLE_REGEX_SIZE);
        let regex = RegexBuilder::new(&pattern)
            .size_limit(size_limit)
            .dfa_size_limit(size_limit)
            .build()?;
        Ok(Self { regex: Some(regex) })
    }

    pub fn link_titles(&self, text: &str) -> String {
        let Some(regex) = &self.regex else {
            return text.to_string();
        };

        regex
            .replace_all(text, |caps: &Captures| match caps.name("title") {
                Some(title) => format!("[[{}]]", title.as_str()),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}
