// Rule-based English lemmatizer used by RuleAnalyzer.
//
// An irregular-form table covers the common strong verbs and irregular
// plurals; everything else goes through suffix rules chosen by part of
// speech. Input must already be lowercase.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::token::PartOfSpeech;

static IRREGULAR_VERBS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let pairs: &[(&str, &[&str])] = &[
        ("be", &["am", "is", "are", "was", "were", "been", "being", "'m", "'re"]),
        ("have", &["has", "had", "having", "'ve"]),
        ("do", &["does", "did", "done", "doing"]),
        ("go", &["goes", "went", "gone"]),
        ("say", &["says", "said"]),
        ("make", &["made"]),
        ("get", &["got", "gotten"]),
        ("know", &["knew", "known"]),
        ("think", &["thought"]),
        ("take", &["took", "taken"]),
        ("see", &["saw", "seen"]),
        ("come", &["came"]),
        ("become", &["became", "becoming"]),
        ("overcome", &["overcame", "overcoming"]),
        ("give", &["gave", "given"]),
        ("find", &["found"]),
        ("tell", &["told"]),
        ("leave", &["left"]),
        ("feel", &["felt"]),
        ("bring", &["brought"]),
        ("begin", &["began", "begun"]),
        ("keep", &["kept"]),
        ("hold", &["held"]),
        ("write", &["wrote", "written"]),
        ("stand", &["stood"]),
        ("understand", &["understood"]),
        ("hear", &["heard"]),
        ("mean", &["meant"]),
        ("meet", &["met"]),
        ("run", &["ran"]),
        ("pay", &["paid"]),
        ("sit", &["sat"]),
        ("speak", &["spoke", "spoken"]),
        ("lie", &["lay", "lain", "lying"]),
        ("die", &["dying"]),
        ("tie", &["tying"]),
        ("lead", &["led"]),
        ("grow", &["grew", "grown"]),
        ("lose", &["lost"]),
        ("fall", &["fell", "fallen"]),
        ("send", &["sent"]),
        ("build", &["built"]),
        ("draw", &["drew", "drawn"]),
        ("break", &["broke", "broken"]),
        ("spend", &["spent"]),
        ("rise", &["rose", "risen"]),
        ("drive", &["drove", "driven"]),
        ("buy", &["bought"]),
        ("wear", &["wore", "worn"]),
        ("choose", &["chose", "chosen"]),
        ("seek", &["sought"]),
        ("throw", &["threw", "thrown"]),
        ("catch", &["caught"]),
        ("deal", &["dealt"]),
        ("win", &["won"]),
        ("forget", &["forgot", "forgotten"]),
        ("forgive", &["forgave", "forgiven"]),
        ("sell", &["sold"]),
        ("fight", &["fought"]),
        ("teach", &["taught"]),
        ("eat", &["ate", "eaten"]),
        ("sing", &["sang", "sung"]),
        ("drink", &["drank", "drunk"]),
        ("fly", &["flew", "flown"]),
        ("swim", &["swam", "swum"]),
        ("ride", &["rode", "ridden"]),
        ("sleep", &["slept"]),
        ("shoot", &["shot"]),
        ("hide", &["hid", "hidden"]),
        ("shake", &["shook", "shaken"]),
        ("steal", &["stole", "stolen"]),
        ("bite", &["bitten"]),
        ("wake", &["woke", "woken"]),
        ("feed", &["fed"]),
        ("hang", &["hung"]),
        ("dig", &["dug"]),
        ("freeze", &["froze", "frozen"]),
        ("bear", &["bore", "borne"]),
        ("tear", &["tore", "torn"]),
        ("blow", &["blew", "blown"]),
        ("beat", &["beaten"]),
        ("agree", &["agreed"]),
        ("free", &["freed"]),
        ("see", &["sees"]),
        ("can", &["ca"]),
        ("will", &["wo", "'ll"]),
        ("shall", &["sha"]),
        ("would", &["'d"]),
        ("not", &["n't"]),
    ];
    let mut map = HashMap::new();
    for (lemma, forms) in pairs {
        for form in *forms {
            map.insert(*form, *lemma);
        }
    }
    map
});

static IRREGULAR_NOUNS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("men", "man"),
        ("women", "woman"),
        ("children", "child"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("geese", "goose"),
        ("mice", "mouse"),
        ("oxen", "ox"),
        ("lives", "life"),
        ("wives", "wife"),
        ("knives", "knife"),
        ("leaves", "leaf"),
        ("wolves", "wolf"),
        ("halves", "half"),
        ("selves", "self"),
        ("shelves", "shelf"),
        ("thieves", "thief"),
        ("loaves", "loaf"),
        ("heroes", "hero"),
        ("potatoes", "potato"),
        ("tomatoes", "tomato"),
        ("echoes", "echo"),
        ("criteria", "criterion"),
        ("phenomena", "phenomenon"),
    ]
    .into_iter()
    .collect()
});

static IRREGULAR_ADJS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("better", "good"),
        ("best", "good"),
        ("worse", "bad"),
        ("worst", "bad"),
        ("farther", "far"),
        ("further", "far"),
    ]
    .into_iter()
    .collect()
});

/// Nouns that look plural but are not.
const INVARIANT_NOUNS: &[&str] = &[
    "series", "species", "news", "means", "physics", "mathematics", "economics", "politics",
    "ethics", "lens", "always", "perhaps",
];

/// True for inflected forms listed in the irregular verb table ("went", "thought").
pub fn is_irregular_verb_form(lower: &str) -> bool {
    IRREGULAR_VERBS.contains_key(lower)
}

/// Lemmatize a lowercase word given its part of speech.
pub fn lemmatize(lower: &str, pos: PartOfSpeech) -> String {
    match pos {
        PartOfSpeech::Verb | PartOfSpeech::Aux | PartOfSpeech::Modal => {
            if let Some(lemma) = IRREGULAR_VERBS.get(lower) {
                return lemma.to_string();
            }
            if pos == PartOfSpeech::Modal {
                return lower.to_string();
            }
            verb_lemma(lower)
        }
        PartOfSpeech::Noun => {
            if let Some(lemma) = IRREGULAR_NOUNS.get(lower) {
                return lemma.to_string();
            }
            noun_lemma(lower)
        }
        PartOfSpeech::Adj => IRREGULAR_ADJS
            .get(lower)
            .map(|l| l.to_string())
            .unwrap_or_else(|| lower.to_string()),
        PartOfSpeech::Particle => IRREGULAR_VERBS
            .get(lower)
            .map(|l| l.to_string())
            .unwrap_or_else(|| lower.to_string()),
        _ => lower.to_string(),
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn has_vowel(s: &str) -> bool {
    s.chars().any(|c| is_vowel(c) || c == 'y')
}

fn noun_lemma(w: &str) -> String {
    if w.len() <= 3 || INVARIANT_NOUNS.contains(&w) {
        return w.to_string();
    }
    if let Some(stem) = w.strip_suffix("ies") {
        if w.len() > 4 {
            return format!("{stem}y");
        }
    }
    for suffix in ["sses", "xes", "ches", "shes", "zzes"] {
        if w.ends_with(suffix) {
            return w[..w.len() - 2].to_string();
        }
    }
    if w.ends_with("ss") || w.ends_with("us") || w.ends_with("is") || w.ends_with('\'') {
        return w.to_string();
    }
    match w.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => w.to_string(),
    }
}

fn verb_lemma(w: &str) -> String {
    if w.len() <= 3 {
        return w.to_string();
    }

    if let Some(stem) = w.strip_suffix("ied") {
        return format!("{stem}y");
    }
    if let Some(stem) = w.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if w.ends_with("eed") {
        return w.to_string();
    }
    if let Some(stem) = w.strip_suffix("ing") {
        return restore_stem(stem, w);
    }
    if let Some(stem) = w.strip_suffix("ed") {
        return restore_stem(stem, w);
    }
    for suffix in ["sses", "xes", "ches", "shes", "zzes"] {
        if w.ends_with(suffix) {
            return w[..w.len() - 2].to_string();
        }
    }
    if w.ends_with("ss") || w.ends_with("us") || w.ends_with("is") {
        return w.to_string();
    }
    match w.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => w.to_string(),
    }
}

/// Rebuild a verb base from the stem left after removing "-ing" / "-ed".
fn restore_stem(stem: &str, original: &str) -> String {
    if stem.len() < 2 || !has_vowel(stem) {
        return original.to_string();
    }
    if stem == "us" {
        return "use".to_string();
    }

    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    let last = chars[n - 1];
    let prev = chars[n - 2];

    // stopp -> stop, plann -> plan, occurr -> occur
    if last == prev && matches!(last, 'b' | 'd' | 'g' | 'm' | 'n' | 'p' | 'r' | 't') {
        return chars[..n - 1].iter().collect();
    }

    if needs_final_e(&chars) {
        return format!("{stem}e");
    }

    stem.to_string()
}

fn needs_final_e(chars: &[char]) -> bool {
    let n = chars.len();
    let last = chars[n - 1];
    let prev = chars[n - 2];

    // liv -> live, danc -> dance, argu -> argue, realiz -> realize
    if matches!(last, 'v' | 'c' | 'u' | 'z') {
        return true;
    }
    // judg -> judge, charg -> charge
    if last == 'g' && matches!(prev, 'd' | 'r') {
        return true;
    }
    // troubl -> trouble, settl -> settle
    if last == 'l' && matches!(prev, 'b' | 'p' | 't' | 'd' | 'g' | 'k' | 'f' | 'z') {
        return true;
    }
    // sens -> sense, nurs -> nurse, collaps -> collapse
    if last == 's' && matches!(prev, 'n' | 'r' | 'p' | 'l') {
        return true;
    }
    // rais -> raise, caus -> cause, pleas -> please
    if last == 's' && n >= 3 && is_vowel(prev) && is_vowel(chars[n - 3]) {
        return true;
    }
    // creat -> create, relat -> relate
    if n >= 4 && last == 't' && prev == 'a' && !is_vowel(chars[n - 3]) {
        return true;
    }

    // Single-vowel consonant-vowel-consonant stems: mak -> make, writ -> write
    if n >= 3 {
        let vowel_count = chars.iter().filter(|c| is_vowel(**c)).count();
        let cvc = !is_vowel(chars[n - 3]) && is_vowel(prev) && !is_vowel(last);
        if vowel_count == 1 && cvc && !matches!(last, 'w' | 'x' | 'y') {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verb(w: &str) -> String {
        lemmatize(w, PartOfSpeech::Verb)
    }

    fn noun(w: &str) -> String {
        lemmatize(w, PartOfSpeech::Noun)
    }

    #[test]
    fn test_irregular_verbs() {
        assert_eq!(verb("went"), "go");
        assert_eq!(verb("was"), "be");
        assert_eq!(verb("thought"), "think");
        assert_eq!(lemmatize("'re", PartOfSpeech::Aux), "be");
    }

    #[test]
    fn test_regular_verb_suffixes() {
        assert_eq!(verb("running"), "run");
        assert_eq!(verb("stopped"), "stop");
        assert_eq!(verb("making"), "make");
        assert_eq!(verb("living"), "live");
        assert_eq!(verb("tried"), "try");
        assert_eq!(verb("watches"), "watch");
        assert_eq!(verb("walked"), "walk");
        assert_eq!(verb("looking"), "look");
        assert_eq!(verb("created"), "create");
        assert_eq!(verb("used"), "use");
        assert_eq!(verb("raised"), "raise");
        assert_eq!(verb("opened"), "open");
        assert_eq!(verb("visiting"), "visit");
    }

    #[test]
    fn test_ing_words_without_vowel_stem_are_kept() {
        assert_eq!(verb("bring"), "bring");
        assert_eq!(verb("sing"), "sing");
    }

    #[test]
    fn test_noun_plurals() {
        assert_eq!(noun("cats"), "cat");
        assert_eq!(noun("cities"), "city");
        assert_eq!(noun("boxes"), "box");
        assert_eq!(noun("classes"), "class");
        assert_eq!(noun("children"), "child");
        assert_eq!(noun("glass"), "glass");
        assert_eq!(noun("crisis"), "crisis");
        assert_eq!(noun("news"), "news");
    }

    #[test]
    fn test_adjectives_and_others_untouched() {
        assert_eq!(lemmatize("better", PartOfSpeech::Adj), "good");
        assert_eq!(lemmatize("quickly", PartOfSpeech::Adv), "quickly");
        assert_eq!(lemmatize("happy", PartOfSpeech::Adj), "happy");
    }
}
