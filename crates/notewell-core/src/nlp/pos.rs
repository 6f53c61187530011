//! Lexicon and suffix-rule part-of-speech tagger.
//!
//! Closed-class words and a list of frequent verbs, adjectives and adverbs
//! are looked up; unknown words fall back to suffix rules and finally to
//! common noun. A single left-to-right pass then fixes a few
//! context-dependent cases (a `-ing` word after a determiner is a noun,
//! an unknown word after `to` or a modal is a verb).

use std::collections::HashMap;

use super::tokenizer::{Token, TokenShape};

/// Universal part-of-speech tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pos {
    Noun,
    Propn,
    Verb,
    Aux,
    Adj,
    Adv,
    Pron,
    Det,
    Adp,
    Cconj,
    Sconj,
    Part,
    Num,
    Punct,
    Sym,
    X,
}

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any", "no",
    "all", "both", "either", "neither", "another", "such", "what", "which", "whose", "my",
    "your", "his", "her", "its", "our", "their",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "you", "he", "him", "she", "it", "we", "us", "they", "them", "mine", "yours",
    "hers", "ours", "theirs", "myself", "yourself", "himself", "herself", "itself",
    "ourselves", "yourselves", "themselves", "who", "whom", "someone", "anyone", "everyone",
    "nobody", "something", "anything", "everything", "nothing", "i'm", "i've", "i'd", "i'll",
    "you're", "you've", "you'd", "you'll", "he's", "he'd", "he'll", "she's", "she'd",
    "she'll", "it's", "we're", "we've", "we'd", "we'll", "they're", "they've", "they'd",
    "they'll", "let's", "that's", "there's", "here's", "what's", "who's",
];

const ADPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "by", "for", "with", "about", "against", "between", "into",
    "through", "during", "before", "after", "above", "below", "from", "up", "down", "out",
    "off", "over", "under", "across", "along", "around", "behind", "beside", "beyond",
    "inside", "near", "onto", "outside", "toward", "towards", "upon", "within", "without",
    "via", "per", "among", "despite", "like",
];

const COORDINATORS: &[&str] = &["and", "or", "but", "nor", "yet", "plus"];

const SUBORDINATORS: &[&str] = &[
    "if", "because", "while", "although", "though", "unless", "since", "whether", "until",
    "once", "when", "where", "whereas", "than", "as",
];

const PARTICLES: &[&str] = &["to", "not", "n't"];

const AUXILIARIES: &[&str] = &[
    "be", "am", "is", "are", "was", "were", "been", "being", "have", "has", "had", "having",
    "do", "does", "did", "will", "would", "shall", "should", "can", "could", "may", "might",
    "must", "ought", "isn't", "aren't", "wasn't", "weren't", "hasn't", "haven't", "hadn't",
    "doesn't", "don't", "didn't", "won't", "wouldn't", "shan't", "shouldn't", "can't",
    "cannot", "couldn't", "mustn't",
];

const MODALS: &[&str] = &[
    "will", "would", "shall", "should", "can", "could", "may", "might", "must",
];

const VERBS: &[&str] = &[
    "go", "goes", "went", "gone", "get", "gets", "got", "make", "makes", "made", "see",
    "sees", "saw", "seen", "know", "knows", "knew", "known", "take", "takes", "took", "taken",
    "come", "comes", "came", "think", "thinks", "thought", "look", "looks", "want", "wants",
    "give", "gives", "gave", "given", "use", "uses", "find", "finds", "found", "tell",
    "tells", "told", "ask", "asks", "work", "works", "seem", "seems", "feel", "feels", "felt",
    "try", "tries", "leave", "leaves", "left", "call", "calls", "visit", "visits", "keep",
    "keeps", "kept", "let", "begin", "begins", "began", "help", "helps", "show", "shows",
    "hear", "hears", "heard", "play", "plays", "run", "runs", "ran", "move", "moves", "live",
    "lives", "believe", "believes", "bring", "brings", "brought", "happen", "happens",
    "write", "writes", "wrote", "written", "provide", "provides", "sit", "sits", "sat",
    "stand", "stands", "stood", "lose", "loses", "lost", "pay", "pays", "paid", "meet",
    "meets", "met", "include", "includes", "continue", "continues", "set", "sets", "learn",
    "learns", "change", "changes", "lead", "leads", "led", "understand", "understands",
    "understood", "follow", "follows", "stop", "stops", "create", "creates", "speak",
    "speaks", "spoke", "read", "reads", "allow", "allows", "add", "adds", "spend", "spends",
    "spent", "grow", "grows", "grew", "open", "opens", "walk", "walks", "win", "wins", "won",
    "offer", "offers", "remember", "remembers", "love", "loves", "consider", "considers",
    "appear", "appears", "buy", "buys", "bought", "wait", "waits", "serve", "serves", "die",
    "dies", "send", "sends", "sent", "expect", "expects", "build", "builds", "built", "stay",
    "stays", "fall", "falls", "fell", "cut", "cuts", "reach", "reaches", "kill", "kills",
    "remain", "remains", "suggest", "suggests", "raise", "raises", "pass", "passes", "sell",
    "sells", "sold", "require", "requires", "say", "says", "said", "need", "needs", "mean",
    "means", "meant", "put", "puts", "check", "checks", "compile", "compiles", "import",
    "imports", "export", "exports",
];

const ADJECTIVES: &[&str] = &[
    "good", "new", "first", "last", "long", "great", "little", "own", "other", "old", "right",
    "big", "high", "different", "small", "large", "next", "early", "young", "important",
    "few", "public", "bad", "same", "able", "late", "hard", "major", "better", "best",
    "free", "sure", "clear", "full", "simple", "real", "whole", "main", "open", "certain",
    "recent", "possible", "low", "true", "false", "easy", "strong", "quick", "fast", "slow",
    "many", "much", "more", "most", "less", "least", "several", "various", "own",
];

const ADVERBS: &[&str] = &[
    "not", "also", "very", "often", "however", "too", "usually", "really", "already",
    "always", "never", "sometimes", "here", "there", "now", "then", "still", "just",
    "again", "ever", "almost", "soon", "perhaps", "quite", "rather", "even", "only", "well",
    "together", "instead", "away", "back", "else", "yesterday", "tomorrow", "how", "why",
    "so",
];

const ADJ_SUFFIXES: &[&str] = &[
    "ous", "ful", "ive", "able", "ible", "less", "ical", "ish", "ary", "ic",
];

/// Part-of-speech tagger. Construct once and reuse; tagging does not mutate it.
#[derive(Debug, Clone)]
pub struct PosTagger {
    lexicon: HashMap<&'static str, Pos>,
}

impl PosTagger {
    pub fn new() -> Self {
        let mut lexicon = HashMap::new();
        // Later groups win, so the most specific closed class goes last.
        for (words, pos) in [
            (VERBS, Pos::Verb),
            (ADJECTIVES, Pos::Adj),
            (ADVERBS, Pos::Adv),
            (ADPOSITIONS, Pos::Adp),
            (SUBORDINATORS, Pos::Sconj),
            (COORDINATORS, Pos::Cconj),
            (PRONOUNS, Pos::Pron),
            (DETERMINERS, Pos::Det),
            (AUXILIARIES, Pos::Aux),
            (PARTICLES, Pos::Part),
        ] {
            for word in words {
                lexicon.insert(*word, pos);
            }
        }
        Self { lexicon }
    }

    /// Tag every token; the result is parallel to `tokens`.
    pub fn tag(&self, tokens: &[Token]) -> Vec<Pos> {
        let mut tags = Vec::with_capacity(tokens.len());

        for (i, token) in tokens.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| (&tokens[p], tags[p]));
            tags.push(self.tag_token(token, prev));
        }

        tags
    }

    fn tag_token(&self, token: &Token, prev: Option<(&Token, Pos)>) -> Pos {
        match token.shape {
            TokenShape::Number => return Pos::Num,
            TokenShape::Punct => return Pos::Punct,
            TokenShape::Url | TokenShape::Email => return Pos::X,
            TokenShape::Hashtag | TokenShape::Mention => return Pos::Propn,
            TokenShape::Word => {}
        }

        let word = token.text.as_str();
        if let Some(pos) = self.lexicon.get(word) {
            return *pos;
        }

        let guessed = guess_by_suffix(word);
        let Some((prev_token, prev_pos)) = prev else {
            return guessed;
        };

        match (prev_pos, guessed) {
            (Pos::Det | Pos::Adj, Pos::Verb) if word.ends_with("ing") => Pos::Noun,
            (Pos::Det, Pos::Verb) => Pos::Adj,
            (Pos::Part, Pos::Noun) if prev_token.text == "to" => Pos::Verb,
            (Pos::Aux, Pos::Noun) if MODALS.contains(&prev_token.text.as_str()) => Pos::Verb,
            _ => guessed,
        }
    }
}

impl Default for PosTagger {
    fn default() -> Self {
        Self::new()
    }
}

fn guess_by_suffix(word: &str) -> Pos {
    let len = word.chars().count();
    if len > 4 && word.ends_with("ly") {
        return Pos::Adv;
    }
    if len > 5 && word.ends_with("ing") {
        return Pos::Verb;
    }
    if len > 4 && word.ends_with("ed") {
        return Pos::Verb;
    }
    if len > 4 && ADJ_SUFFIXES.iter().any(|suffix| word.ends_with(suffix)) {
        return Pos::Adj;
    }
    Pos::Noun
}
