//! Regex tokenizer producing shaped tokens for the tagger.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::compile_regex;

/// Bare URL, as written in prose or inside a markdown link.
pub(crate) const URL_PATTERN: &str = r"(?:https?://|www\.)[^\s<>\[\]()]+";

static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex(&format!(
        r"(?P<url>{URL_PATTERN})|(?P<email>[\w.%+-]+@[\w-]+(?:\.[\w-]+)+)|(?P<hashtag>#[\p{{L}}_][\p{{L}}\p{{N}}_-]*)|(?P<mention>@[\p{{L}}_][\p{{L}}\p{{N}}_]*)|(?P<number>\p{{N}}+(?:[.,:/-]\p{{N}}+)*)|(?P<word>\p{{L}}[\p{{L}}\p{{N}}]*(?:['’-][\p{{L}}\p{{N}}]+)*)|(?P<punct>[^\s\p{{L}}\p{{N}}])"
    ))
});

/// Surface shape of a token, decided before part-of-speech tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenShape {
    Word,
    Number,
    Url,
    Email,
    Hashtag,
    Mention,
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub shape: TokenShape,
    pub span: Range<usize>,
}

/// Split text into tokens. Curly apostrophes are folded to `'`.
pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let (shape, m) = [
                ("url", TokenShape::Url),
                ("email", TokenShape::Email),
                ("hashtag", TokenShape::Hashtag),
                ("mention", TokenShape::Mention),
                ("number", TokenShape::Number),
                ("word", TokenShape::Word),
                ("punct", TokenShape::Punct),
            ]
            .into_iter()
            .find_map(|(name, shape)| caps.name(name).map(|m| (shape, m)))?;

            Some(Token {
                text: m.as_str().replace('’', "'"),
                shape,
                span: m.range(),
            })
        })
        .collect()
}
