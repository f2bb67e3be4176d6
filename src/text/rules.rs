// Rule-based English analyzer, the default TextAnalyzer.
//
// Segments on UAX #29 word boundaries, splits clitics off contractions,
// tags tokens from closed-class lexicons plus suffix/context heuristics and
// marks runs of capitalised words as named-entity spans. No model files,
// fully deterministic, so every pipeline runs offline.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use anyhow::Result;
use stop_words::{get, LANGUAGE};
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use super::filter::{normalize_lemma, DEFAULT_CHUNK_CHARS};
use super::lemma::{is_irregular_verb_form, lemmatize};
use super::token::{AnalyzedToken, EntityLabel, PartOfSpeech};
use super::traits::TextAnalyzer;

static CLOSED_CLASS: LazyLock<HashMap<&'static str, PartOfSpeech>> = LazyLock::new(|| {
    let groups: &[(PartOfSpeech, &[&str])] = &[
        (
            PartOfSpeech::Determiner,
            &[
                "a", "an", "the", "this", "that", "these", "those", "my", "your", "his", "its",
                "our", "their", "some", "any", "no", "every", "each", "either", "neither",
                "another", "such", "what", "which", "whose", "all", "both", "few", "many", "much",
                "several", "whatever", "whichever",
            ],
        ),
        (
            PartOfSpeech::Pronoun,
            &[
                "i", "me", "you", "he", "him", "she", "her", "it", "we", "us", "they", "them",
                "myself", "yourself", "himself", "herself", "itself", "ourselves", "yourselves",
                "themselves", "mine", "yours", "hers", "ours", "theirs", "who", "whom", "someone",
                "somebody", "something", "anyone", "anybody", "anything", "everyone",
                "everybody", "everything", "nobody", "nothing", "none", "y'all", "ya", "thee",
                "thou",
            ],
        ),
        (
            PartOfSpeech::Adposition,
            &[
                "of", "in", "on", "at", "to", "for", "with", "by", "from", "about", "into",
                "onto", "upon", "over", "under", "above", "below", "between", "among", "through",
                "during", "before", "after", "against", "without", "within", "along", "across",
                "behind", "beyond", "near", "toward", "towards", "around", "since", "until",
                "till", "than", "via", "per", "despite", "except", "beneath", "beside",
                "besides", "inside", "outside", "off", "up", "down", "out",
            ],
        ),
        (
            PartOfSpeech::Conjunction,
            &[
                "and", "or", "but", "nor", "so", "yet", "because", "although", "though", "while",
                "if", "unless", "whether", "whereas",
            ],
        ),
        (
            PartOfSpeech::Aux,
            &[
                "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
                "having", "do", "does", "did", "done", "doing",
            ],
        ),
        (
            PartOfSpeech::Modal,
            &[
                "can", "could", "may", "might", "must", "shall", "should", "will", "would",
                "ought",
            ],
        ),
        (PartOfSpeech::Particle, &["not"]),
        (
            PartOfSpeech::Interjection,
            &[
                "oh", "ah", "ooh", "uh", "um", "hmm", "mm", "mmm", "hey", "yeah", "yes", "yep",
                "nope", "okay", "ok", "wow", "oops", "ouch", "hello", "hi", "bye", "whoa", "woah",
                "huh", "aw", "ha", "haha", "hah", "la", "na", "da", "oo", "yo",
            ],
        ),
    ];
    let mut map = HashMap::new();
    for (pos, words) in groups {
        for w in *words {
            map.insert(*w, *pos);
        }
    }
    map
});

const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    "hundred", "thousand", "million", "billion", "trillion", "dozen",
];

const SUBJECT_PRONOUNS: &[&str] = &["i", "you", "he", "she", "it", "we", "they"];

const DO_FORMS: &[&str] = &["do", "does", "did"];

/// Abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "st", "jr", "sr", "prof", "capt", "gen", "lt", "sgt", "mt",
];

const HONORIFICS: &[&str] = &[
    "mr", "mrs", "ms", "miss", "dr", "sir", "madam", "lady", "lord", "king", "queen", "prince",
    "princess", "captain", "capt", "professor", "prof", "uncle", "aunt", "father", "mother",
    "saint", "st", "sgt", "lt", "colonel", "general",
];

const ORG_SUFFIXES: &[&str] = &[
    "inc", "corp", "corporation", "ltd", "llc", "co", "company", "university", "college",
    "bank", "institute", "association", "society", "club", "party", "agency", "department",
];

const LOCATIVE_PREPOSITIONS: &[&str] = &[
    "in", "at", "from", "to", "near", "into", "across", "toward", "towards", "through",
];

const TEMPORAL_NAMES: &[&str] = &[
    "january", "february", "march", "april", "june", "july", "august", "september",
    "october", "november", "december", "monday", "tuesday", "wednesday", "thursday",
    "friday", "saturday", "sunday",
];

/// Contraction stems that are not words on their own ("ca" in "can't").
const NEGATION_STEMS: &[(&str, PartOfSpeech, &str)] = &[
    ("ca", PartOfSpeech::Modal, "can"),
    ("wo", PartOfSpeech::Modal, "will"),
    ("sha", PartOfSpeech::Modal, "shall"),
    ("ai", PartOfSpeech::Aux, "be"),
];

const SUFFIX_CLITICS: &[&str] = &["n't", "'s", "'re", "'ve", "'ll", "'d", "'m"];

static VERB_BASES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "know", "think", "go", "come", "want", "see", "look", "say", "tell", "get", "make",
        "take", "give", "feel", "love", "need", "like", "try", "leave", "call", "keep", "let",
        "put", "mean", "seem", "help", "talk", "turn", "start", "show", "hear", "play", "run",
        "move", "live", "believe", "hold", "bring", "happen", "write", "sit", "stand", "lose",
        "pay", "meet", "learn", "change", "lead", "understand", "watch", "follow", "stop",
        "speak", "read", "spend", "grow", "open", "walk", "win", "remember", "wait", "die",
        "kill", "send", "buy", "fall", "cut", "reach", "stay", "sing", "cry", "dance", "hate",
        "hope", "forget", "sleep", "eat", "drink", "fight", "laugh", "smile", "break", "wish",
        "drive", "arrive", "receive", "ask", "work", "use", "find", "become", "begin",
        "carry", "catch", "choose", "close", "decide", "explain", "hide", "hurt", "jump",
        "kiss", "marry", "miss", "pull", "push", "promise", "realize", "save", "sell", "shout",
        "steal", "swear", "teach", "throw", "touch", "travel", "trust", "wake", "wear",
        "worry", "listen", "answer", "agree", "allow", "appear", "belong", "breathe",
        "wonder", "pretend", "suppose", "guess", "care", "fly", "shine", "burn", "bleed",
    ]
    .into_iter()
    .collect()
});

static ADJECTIVES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "good", "bad", "big", "small", "little", "old", "new", "young", "long", "short",
        "high", "low", "great", "happy", "sad", "nice", "right", "wrong", "true", "false",
        "hot", "cold", "dark", "pretty", "real", "sure", "strong", "free", "full", "hard",
        "easy", "fine", "clear", "late", "black", "white", "red", "blue", "green", "rich",
        "poor", "dead", "alive", "ready", "sorry", "afraid", "tired", "crazy", "wild", "sweet",
        "soft", "deep", "lovely", "friendly", "lonely", "ugly", "silly", "holy", "early",
        "likely", "lively", "deadly", "elderly", "chilly", "jolly", "curly", "quiet", "strange",
        "better", "best", "worse", "worst", "whole", "certain", "simple", "huge", "tiny",
        "bright", "warm", "cool", "safe", "wide", "broken", "lost", "scared", "busy",
    ]
    .into_iter()
    .collect()
});

static ADVERBS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "very", "really", "just", "now", "then", "here", "there", "never", "always", "often",
        "still", "again", "already", "soon", "too", "also", "ever", "maybe", "perhaps", "away",
        "back", "together", "almost", "quite", "rather", "tonight", "today", "tomorrow",
        "yesterday", "forever", "anyway", "somewhere", "anywhere", "everywhere", "nowhere",
        "instead", "later", "once", "twice", "sometimes", "else", "how", "why", "when",
        "where", "well", "even", "only", "ago",
    ]
    .into_iter()
    .collect()
});

/// "-ly" words that are nouns, not adverbs.
const LY_NOUNS: &[&str] = &[
    "family", "reply", "supply", "belly", "jelly", "bully", "ally", "rally", "lily", "holly",
    "italy", "assembly", "anomaly", "monopoly",
];

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less", "al", "ic"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Word,
    Punct,
    Space,
}

/// A raw segment before tagging.
#[derive(Debug)]
struct Piece {
    text: String,
    /// Lowercase with straight apostrophes
    lower: String,
    kind: Kind,
    /// Suffix clitic split off a contraction ("n't", "'ll")
    clitic: bool,
    /// Contraction stem that is not a word on its own ("ca", "wo")
    fragment: bool,
    sentence_initial: bool,
}

impl Piece {
    fn new(text: &str, kind: Kind, sentence_initial: bool) -> Self {
        Self {
            text: text.to_string(),
            lower: normalize_lemma(text),
            kind,
            clitic: false,
            fragment: false,
            sentence_initial,
        }
    }

    fn is_name_candidate(&self) -> bool {
        self.kind == Kind::Word
            && !self.clitic
            && !self.fragment
            && is_capitalized(&self.text)
            && !CLOSED_CLASS.contains_key(self.lower.as_str())
            && !looks_like_number(&self.lower)
    }
}

/// Default analyzer: lexicon and heuristic based, no external models.
pub struct RuleAnalyzer {
    stopwords: HashSet<String>,
    max_input_chars: usize,
}

impl RuleAnalyzer {
    pub fn new() -> Self {
        let stopwords: Vec<String> = get(LANGUAGE::English);
        Self {
            stopwords: stopwords.into_iter().collect(),
            max_input_chars: DEFAULT_CHUNK_CHARS,
        }
    }

    /// Override the per-call input ceiling (`WORDPOOL_CHUNK_CHARS`).
    pub fn with_max_input_chars(mut self, chars: usize) -> Self {
        self.max_input_chars = chars.max(1);
        self
    }

    fn tag_word(
        &self,
        piece: &Piece,
        entity: Option<EntityLabel>,
        prev: Option<&AnalyzedToken>,
    ) -> AnalyzedToken {
        let mut entity = entity;
        let (pos, lemma) = if piece.clitic {
            clitic_tag(&piece.lower, prev)
        } else if piece.fragment {
            NEGATION_STEMS
                .iter()
                .find(|(stem, _, _)| *stem == piece.lower)
                .map(|(_, pos, lemma)| (*pos, lemma.to_string()))
                .unwrap_or((PartOfSpeech::Other, piece.lower.clone()))
        } else if looks_like_number(&piece.lower) {
            entity = Some(EntityLabel::Cardinal);
            (PartOfSpeech::Numeral, piece.lower.clone())
        } else if entity.is_some() {
            (PartOfSpeech::ProperNoun, piece.text.clone())
        } else if let Some(pos) = CLOSED_CLASS.get(piece.lower.as_str()) {
            (*pos, lemmatize(&piece.lower, *pos))
        } else {
            let pos = open_class(&piece.lower, prev);
            (pos, lemmatize(&piece.lower, pos))
        };

        AnalyzedToken {
            text: piece.text.clone(),
            lemma,
            pos,
            is_punct: false,
            is_space: false,
            like_num: pos == PartOfSpeech::Numeral,
            is_stop: self.stopwords.contains(&piece.lower),
            is_contraction_part: piece.clitic || piece.fragment,
            entity,
        }
    }
}

impl Default for RuleAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextAnalyzer for RuleAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>> {
        let text: String = text.nfc().collect();
        let pieces = segment(&text);
        let entities = find_entities(&pieces);

        let mut tokens: Vec<AnalyzedToken> = Vec::with_capacity(pieces.len());
        for (piece, entity) in pieces.iter().zip(entities) {
            let token = match piece.kind {
                Kind::Space => AnalyzedToken::word(&piece.text, &piece.text, PartOfSpeech::Space),
                Kind::Punct => {
                    AnalyzedToken::word(&piece.text, &piece.text, PartOfSpeech::Punctuation)
                }
                Kind::Word => {
                    let prev = tokens.last().filter(|t| !t.is_punct && !t.is_space);
                    self.tag_word(piece, entity, prev)
                }
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }
}

fn segment(text: &str) -> Vec<Piece> {
    let mut pieces: Vec<Piece> = Vec::new();
    let mut at_sentence_start = true;

    for seg in text.split_word_bounds() {
        if seg.chars().all(char::is_whitespace) {
            if seg.contains('\n') {
                pieces.push(Piece::new(seg, Kind::Space, false));
                at_sentence_start = true;
            }
            continue;
        }

        if !seg.chars().any(char::is_alphanumeric) {
            let after_abbreviation = pieces
                .last()
                .is_some_and(|p| p.kind == Kind::Word && ABBREVIATIONS.contains(&p.lower.as_str()));
            let terminal = seg.chars().any(|c| matches!(c, '.' | '?' | '!' | '\u{2026}'));
            if terminal && !after_abbreviation {
                at_sentence_start = true;
            }
            pieces.push(Piece::new(seg, Kind::Punct, false));
            continue;
        }

        for (i, (part, fragment)) in split_clitics(seg).into_iter().enumerate() {
            let mut piece = Piece::new(&part, Kind::Word, at_sentence_start && i == 0);
            piece.fragment = fragment;
            piece.clitic = i > 0;
            pieces.push(piece);
        }
        at_sentence_start = false;
    }

    pieces
}

/// Split a trailing clitic off a word: "don't" -> ["do", "n't"].
/// The bool marks stems that are only fragments ("ca" in "can't").
fn split_clitics(word: &str) -> Vec<(String, bool)> {
    let chars: Vec<char> = word.chars().collect();
    let norm: String = chars
        .iter()
        .map(|c| if *c == '\u{2019}' { '\'' } else { c.to_ascii_lowercase() })
        .collect();

    for clitic in SUFFIX_CLITICS {
        let k = clitic.chars().count();
        if chars.len() > k && norm.ends_with(clitic) {
            let split = chars.len() - k;
            let stem: String = chars[..split].iter().collect();
            let tail: String = chars[split..].iter().collect();
            let stem_lower = stem.to_lowercase();
            let fragment =
                *clitic == "n't" && NEGATION_STEMS.iter().any(|(s, _, _)| *s == stem_lower);
            return vec![(stem, fragment), (tail, false)];
        }
    }
    vec![(word.to_string(), false)]
}

fn clitic_tag(lower: &str, prev: Option<&AnalyzedToken>) -> (PartOfSpeech, String) {
    match lower {
        "n't" => (PartOfSpeech::Particle, "not".to_string()),
        "'re" | "'m" => (PartOfSpeech::Aux, "be".to_string()),
        "'ve" => (PartOfSpeech::Aux, "have".to_string()),
        "'ll" => (PartOfSpeech::Modal, "will".to_string()),
        "'d" => (PartOfSpeech::Modal, "would".to_string()),
        _ => {
            // "'s" is "is" after a pronoun or "there"/"here"/wh-word, otherwise possessive
            let copula = prev.is_some_and(|t| {
                matches!(t.pos, PartOfSpeech::Pronoun)
                    || matches!(
                        normalize_lemma(&t.text).as_str(),
                        "there" | "here" | "what" | "where" | "who" | "how" | "that"
                    )
            });
            if copula {
                (PartOfSpeech::Aux, "be".to_string())
            } else {
                (PartOfSpeech::Particle, lower.to_string())
            }
        }
    }
}

fn is_capitalized(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let rest: Vec<char> = chars.collect();
            // all-caps words are shouting, not names
            rest.is_empty() || rest.iter().any(|c| c.is_lowercase())
        }
        _ => false,
    }
}

fn looks_like_number(lower: &str) -> bool {
    let has_digit = lower.chars().any(|c| c.is_ascii_digit());
    if has_digit && lower.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | ',')) {
        return true;
    }
    NUMBER_WORDS.contains(&lower)
}

/// Label every piece that belongs to a named-entity span.
///
/// Evidence never crosses a line break, so a paragraph is labelled the same
/// whether it is analyzed alone or inside a larger chunk.
fn find_entities(pieces: &[Piece]) -> Vec<Option<EntityLabel>> {
    let paragraphs = paragraph_ids(pieces);

    // Capitalised forms seen mid-sentence are names anywhere in their paragraph
    let proper_forms: HashSet<(usize, &str)> = pieces
        .iter()
        .zip(&paragraphs)
        .filter(|(p, _)| p.is_name_candidate() && !p.sentence_initial)
        .map(|(p, para)| (*para, p.text.as_str()))
        .collect();

    let mut labels = vec![None; pieces.len()];
    let mut i = 0;
    while i < pieces.len() {
        if !pieces[i].is_name_candidate() {
            i += 1;
            continue;
        }
        let start = i;
        while i < pieces.len() && pieces[i].is_name_candidate() {
            i += 1;
        }
        let span = &pieces[start..i];
        let temporal = span.iter().all(|p| TEMPORAL_NAMES.contains(&p.lower.as_str()));
        let is_entity = temporal
            || span.len() > 1
            || !span[0].sentence_initial
            || proper_forms.contains(&(paragraphs[start], span[0].text.as_str()));
        if is_entity {
            let label = label_span(pieces, start, i);
            for slot in &mut labels[start..i] {
                *slot = Some(label);
            }
        }
    }
    labels
}

/// Paragraph index of each piece; line-break pieces open a new paragraph.
fn paragraph_ids(pieces: &[Piece]) -> Vec<usize> {
    let mut para = 0;
    pieces
        .iter()
        .map(|p| {
            if p.kind == Kind::Space {
                para += 1;
            }
            para
        })
        .collect()
}

fn label_span(pieces: &[Piece], start: usize, end: usize) -> EntityLabel {
    let span = &pieces[start..end];
    if span.iter().all(|p| TEMPORAL_NAMES.contains(&p.lower.as_str())) {
        return EntityLabel::Date;
    }

    let prev_word = pieces[..start]
        .iter()
        .rev()
        .take_while(|p| p.kind != Kind::Space)
        .find(|p| p.kind == Kind::Word)
        .map(|p| p.lower.as_str());

    if span.iter().any(|p| HONORIFICS.contains(&p.lower.as_str()))
        || prev_word.is_some_and(|w| HONORIFICS.contains(&w))
    {
        return EntityLabel::Person;
    }
    if span
        .last()
        .is_some_and(|p| ORG_SUFFIXES.contains(&p.lower.as_str()))
    {
        return EntityLabel::Org;
    }
    if prev_word.is_some_and(|w| LOCATIVE_PREPOSITIONS.contains(&w)) {
        return EntityLabel::Gpe;
    }
    if span.len() == 1 {
        let w = span[0].lower.as_str();
        if w.ends_with("ans") || w.ends_with("ese") || w.ends_with("ish") {
            return EntityLabel::Norp;
        }
    }
    EntityLabel::Person
}

fn has_adjective_suffix(lower: &str) -> bool {
    lower.len() > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

fn is_verb_form(lower: &str) -> bool {
    VERB_BASES.contains(lower)
        || is_irregular_verb_form(lower)
        || lower
            .strip_suffix('s')
            .is_some_and(|stem| VERB_BASES.contains(stem))
}

/// Tag an open-class word from its shape and the preceding token.
fn open_class(lower: &str, prev: Option<&AnalyzedToken>) -> PartOfSpeech {
    let prev_pos = prev.map(|t| t.pos);
    let prev_lower = prev.map(|t| normalize_lemma(&t.text));

    let after_determiner = matches!(
        prev_pos,
        Some(PartOfSpeech::Determiner) | Some(PartOfSpeech::Adj)
    );
    let verb_context = match (prev_pos, prev_lower.as_deref()) {
        (Some(PartOfSpeech::Modal), _) => true,
        (_, Some("to" | "n't" | "not")) => true,
        (Some(PartOfSpeech::Pronoun), Some(p)) => SUBJECT_PRONOUNS.contains(&p),
        (Some(PartOfSpeech::Aux), Some(a)) => DO_FORMS.contains(&a),
        _ => false,
    };

    if ADJECTIVES.contains(lower) {
        return PartOfSpeech::Adj;
    }
    if ADVERBS.contains(lower) {
        return PartOfSpeech::Adv;
    }
    if after_determiner {
        return if has_adjective_suffix(lower) {
            PartOfSpeech::Adj
        } else {
            PartOfSpeech::Noun
        };
    }
    if verb_context || is_verb_form(lower) {
        return PartOfSpeech::Verb;
    }
    if lower.len() > 4 && lower.ends_with("ly") && !LY_NOUNS.contains(&lower) {
        return PartOfSpeech::Adv;
    }
    if has_adjective_suffix(lower) {
        return PartOfSpeech::Adj;
    }
    if lower.len() > 4 && (lower.ends_with("ing") || lower.ends_with("ed")) {
        return PartOfSpeech::Verb;
    }
    PartOfSpeech::Noun
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> Vec<AnalyzedToken> {
        RuleAnalyzer::new().analyze(text).unwrap()
    }

    fn find<'a>(tokens: &'a [AnalyzedToken], text: &str) -> &'a AnalyzedToken {
        tokens
            .iter()
            .find(|t| t.text == text)
            .unwrap_or_else(|| panic!("no token {text:?}"))
    }

    #[test]
    fn test_contraction_split() {
        let tokens = analyze("I can't go");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["I", "ca", "n't", "go"]);
        assert!(find(&tokens, "ca").is_contraction_part);
        assert_eq!(find(&tokens, "ca").lemma, "can");
        assert!(find(&tokens, "n't").is_contraction_part);
    }

    #[test]
    fn test_curly_apostrophe_contraction() {
        let tokens = analyze("they\u{2019}ll win");
        assert!(find(&tokens, "they").pos == PartOfSpeech::Pronoun);
        let clitic = find(&tokens, "\u{2019}ll");
        assert!(clitic.is_contraction_part);
        assert_eq!(clitic.lemma, "will");
    }

    #[test]
    fn test_lemmas_and_pos() {
        let tokens = analyze("The cats were running quickly.");
        assert_eq!(find(&tokens, "cats").lemma, "cat");
        assert_eq!(find(&tokens, "cats").pos, PartOfSpeech::Noun);
        assert_eq!(find(&tokens, "were").pos, PartOfSpeech::Aux);
        assert_eq!(find(&tokens, "running").lemma, "run");
        assert_eq!(find(&tokens, "quickly").pos, PartOfSpeech::Adv);
        assert!(find(&tokens, ".").is_punct);
    }

    #[test]
    fn test_mid_sentence_capital_is_person_entity() {
        let tokens = analyze("Later that day Gatsby smiled at me.");
        let gatsby = find(&tokens, "Gatsby");
        assert_eq!(gatsby.pos, PartOfSpeech::ProperNoun);
        assert_eq!(gatsby.entity, Some(EntityLabel::Person));
    }

    #[test]
    fn test_sentence_initial_capital_is_not_entity() {
        let tokens = analyze("Cats sleep.");
        let cats = find(&tokens, "Cats");
        assert_eq!(cats.entity, None);
        assert_eq!(cats.lemma, "cat");
    }

    #[test]
    fn test_known_name_at_sentence_start_is_entity() {
        let tokens = analyze("I met Daisy. Daisy laughed.");
        assert!(tokens
            .iter()
            .filter(|t| t.text == "Daisy")
            .all(|t| t.entity == Some(EntityLabel::Person)));
    }

    #[test]
    fn test_name_evidence_stops_at_line_break() {
        let tokens = analyze("I met Daisy.\nDaisy laughed.");
        let daisy: Vec<&AnalyzedToken> = tokens.iter().filter(|t| t.text == "Daisy").collect();
        assert_eq!(daisy[0].entity, Some(EntityLabel::Person));
        assert_eq!(daisy[1].entity, None);
    }

    #[test]
    fn test_place_after_preposition() {
        let tokens = analyze("We moved to Chicago last year.");
        assert_eq!(find(&tokens, "Chicago").entity, Some(EntityLabel::Gpe));
    }

    #[test]
    fn test_honorific_abbreviation_does_not_end_sentence() {
        let tokens = analyze("I saw Mr. Darcy");
        assert_eq!(find(&tokens, "Darcy").entity, Some(EntityLabel::Person));
    }

    #[test]
    fn test_numbers_are_cardinal() {
        let tokens = analyze("I have 12 cats and twenty dogs");
        assert!(find(&tokens, "12").like_num);
        assert!(find(&tokens, "twenty").like_num);
        assert_eq!(find(&tokens, "12").entity, Some(EntityLabel::Cardinal));
    }

    #[test]
    fn test_newline_emits_space_and_resets_sentence() {
        let tokens = analyze("hello\nWorld");
        assert!(tokens.iter().any(|t| t.is_space));
        assert_eq!(find(&tokens, "World").entity, None);
    }

    #[test]
    fn test_all_caps_is_not_a_name() {
        let tokens = analyze("I LOVE dancing");
        assert_eq!(find(&tokens, "LOVE").entity, None);
    }
}
