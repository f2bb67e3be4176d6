// Token model shared by every TextAnalyzer implementation.
//
// An analyzer turns raw text into a flat sequence of tokens annotated with
// lemma, coarse part of speech, lexical flags and (optionally) the named
// entity span the token belongs to. The content-word filter only ever looks
// at these fields, so any analyzer that fills them in is interchangeable.

use std::fmt;

/// Coarse universal part-of-speech tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Verb,
    Aux,
    Modal,
    Adj,
    Adv,
    Pronoun,
    Determiner,
    Adposition,
    Conjunction,
    Particle,
    Interjection,
    Numeral,
    Punctuation,
    Space,
    Other,
}

impl PartOfSpeech {
    /// Short uppercase tag, as written to vocabulary CSVs.
    pub fn tag(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "NOUN",
            PartOfSpeech::ProperNoun => "PROPN",
            PartOfSpeech::Verb => "VERB",
            PartOfSpeech::Aux => "AUX",
            PartOfSpeech::Modal => "MD",
            PartOfSpeech::Adj => "ADJ",
            PartOfSpeech::Adv => "ADV",
            PartOfSpeech::Pronoun => "PRON",
            PartOfSpeech::Determiner => "DET",
            PartOfSpeech::Adposition => "ADP",
            PartOfSpeech::Conjunction => "CCONJ",
            PartOfSpeech::Particle => "PART",
            PartOfSpeech::Interjection => "INTJ",
            PartOfSpeech::Numeral => "NUM",
            PartOfSpeech::Punctuation => "PUNCT",
            PartOfSpeech::Space => "SPACE",
            PartOfSpeech::Other => "X",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Named-entity category attached to every token inside an entity span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityLabel {
    Person,
    Norp,
    Fac,
    Org,
    Gpe,
    Loc,
    Product,
    Event,
    WorkOfArt,
    Law,
    Language,
    Date,
    Time,
    Percent,
    Money,
    Quantity,
    Ordinal,
    Cardinal,
}

impl EntityLabel {
    /// Entity categories whose tokens never count as content words:
    /// people, places, organisations, groups, events and titled works.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            EntityLabel::Person
                | EntityLabel::Gpe
                | EntityLabel::Org
                | EntityLabel::Fac
                | EntityLabel::Norp
                | EntityLabel::Event
                | EntityLabel::WorkOfArt
                | EntityLabel::Loc
        )
    }
}

/// A single analyzed token.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedToken {
    /// Surface form exactly as it appeared in the text
    pub text: String,
    /// Dictionary form (case as produced by the analyzer)
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub is_punct: bool,
    pub is_space: bool,
    /// Digits or spelled-out numbers ("12", "3.5", "twenty")
    pub like_num: bool,
    /// Surface form is in the analyzer's stopword list
    pub is_stop: bool,
    /// Clitic fragment split off a contraction ("n't", "'ll", "ca")
    pub is_contraction_part: bool,
    /// Entity span this token belongs to, if any
    pub entity: Option<EntityLabel>,
}

impl AnalyzedToken {
    /// Build a plain word token with no flags set. Mostly useful for
    /// hand-built token streams in tests and stub analyzers.
    pub fn word(text: &str, lemma: &str, pos: PartOfSpeech) -> Self {
        Self {
            text: text.to_string(),
            lemma: lemma.to_string(),
            pos,
            is_punct: pos == PartOfSpeech::Punctuation,
            is_space: pos == PartOfSpeech::Space,
            like_num: pos == PartOfSpeech::Numeral,
            is_stop: false,
            is_contraction_part: false,
            entity: None,
        }
    }

    pub fn with_stop(mut self, is_stop: bool) -> Self {
        self.is_stop = is_stop;
        self
    }

    pub fn with_entity(mut self, label: EntityLabel) -> Self {
        self.entity = Some(label);
        self
    }

    pub fn with_contraction_part(mut self) -> Self {
        self.is_contraction_part = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_entity_labels() {
        assert!(EntityLabel::Person.is_rejected());
        assert!(EntityLabel::WorkOfArt.is_rejected());
        assert!(!EntityLabel::Date.is_rejected());
        assert!(!EntityLabel::Cardinal.is_rejected());
    }

    #[test]
    fn test_word_builder_sets_flags_from_pos() {
        let t = AnalyzedToken::word(",", ",", PartOfSpeech::Punctuation);
        assert!(t.is_punct);
        assert!(!t.like_num);
        let n = AnalyzedToken::word("12", "12", PartOfSpeech::Numeral);
        assert!(n.like_num);
    }
}
