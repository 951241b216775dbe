//! Phrase mining over table cells.
//!
//! Data cells hold short clinical phrases separated by list punctuation.
//! Candidates are split out, scored on surface features (length, coded
//! shorthand like `22q11`, digits, multi-word shape) and kept when the
//! score clears the bar or the phrase looks like a coded finding. Known
//! single-word medical terms always pass. Adjacent candidates are also
//! recombined, since parenthetical splits often cut one finding in two.

use std::collections::BTreeSet;

use regex_lite::Regex;

use crate::lexicon::Lexicon;
use crate::table::Table;

const ACCEPT_SCORE: i32 = 3;
const RECOMBINED_MAX_WORDS: usize = 6;
const CODED_MAX_WORDS: usize = 8;

/// Extraction engine over a fixed lexicon. Construct once per run; the
/// regexes compile at construction time.
pub struct TermExtractor<'a> {
    lexicon: &'a Lexicon,
    /// Word-bounded shorthand worth an extra two points.
    shorthand: Regex,
    /// Looser shorthand for the coded-phrase test.
    coded: Regex,
    /// Function-word filler, matched against the phrase with spaces removed.
    junk: Regex,
    /// Splits a chunk into candidate phrases.
    candidate_split: Regex,
}

impl<'a> TermExtractor<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        TermExtractor {
            lexicon,
            shorthand: Regex::new(r"\b(c\d+|q\d+|p\d+|cd\d+|hba\d+|il-\d+|22q\d+)\b")
                .expect("valid pattern"),
            coded: Regex::new(r"c\d+|q\d+|hba\d|t\d+").expect("valid pattern"),
            junk: Regex::new(r"^(the|of|with|and|for|to|in|on|a)+$").expect("valid pattern"),
            candidate_split: Regex::new(r"[()]| - ").expect("valid pattern"),
        }
    }

    /// Accepted phrases from every data cell of one table, deduplicated.
    pub fn extract(&self, table: &Table) -> BTreeSet<String> {
        let mut terms = BTreeSet::new();
        for cell in table.cells() {
            if !cell.is_header() {
                self.extract_cell(&cell.text, &mut terms);
            }
        }
        terms
    }

    fn extract_cell(&self, raw: &str, terms: &mut BTreeSet<String>) {
        let text = normalize(raw);

        for chunk in text.split([';', '\u{2022}', '\u{00b7}', ',', '\n']) {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                continue;
            }

            let candidates: Vec<&str> = self.candidate_split.split(chunk).collect();
            for candidate in &candidates {
                let phrase = candidate.trim();
                if self.accepts(phrase) {
                    terms.insert(phrase.to_string());
                }
                // A coded finding often arrives with a vague noun tacked on:
                // "22q11.2 deletion syndrome" should also index as
                // "22q11.2 deletion".
                let trimmed = trim_vague_tail(phrase);
                if trimmed != phrase && self.accepts(trimmed) {
                    terms.insert(trimmed.to_string());
                }
            }

            for pair in candidates.windows(2) {
                let combined = format!("{} {}", pair[0].trim(), pair[1].trim());
                let combined = combined.trim();
                if self.accepts_recombined(combined) {
                    terms.insert(combined.to_string());
                }
            }
        }
    }

    /// The accept rule for a standalone candidate phrase.
    fn accepts(&self, phrase: &str) -> bool {
        if phrase.chars().count() < 4 {
            return false;
        }
        if self.lexicon.overused_words.contains(phrase)
            || self.lexicon.shared_row_labels.contains(phrase)
        {
            return false;
        }

        let words: Vec<&str> = phrase.split_whitespace().collect();
        if words.iter().all(|word| Lexicon::is_bad_word(word)) {
            return false;
        }
        if words.len() == 1 && self.lexicon.overused_words.contains(words[0]) {
            return false;
        }

        if (self.score(phrase) >= ACCEPT_SCORE || self.coded_phrase(phrase))
            && !self.is_junk(phrase)
        {
            return true;
        }
        words.len() == 1 && self.lexicon.is_medical_term(words[0])
    }

    /// Recombined pairs face a shorter rule: the word cap plus the score
    /// bar, without the single-word arms.
    fn accepts_recombined(&self, combined: &str) -> bool {
        if combined.is_empty()
            || self.lexicon.overused_words.contains(combined)
            || self.lexicon.shared_row_labels.contains(combined)
        {
            return false;
        }
        combined.split_whitespace().count() <= RECOMBINED_MAX_WORDS
            && (self.score(combined) >= ACCEPT_SCORE || self.coded_phrase(combined))
            && !self.is_junk(combined)
    }

    /// Surface-feature score, floored at zero.
    fn score(&self, phrase: &str) -> i32 {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        if words.is_empty() {
            return 0;
        }

        let mut score = 0;
        if phrase.chars().count() >= 15 {
            score += 1;
        }
        if self.shorthand.is_match(phrase) {
            score += 2;
        }
        if phrase.chars().any(|c| c.is_ascii_digit()) {
            score += 1;
        }
        if phrase.contains('-') || phrase.contains('/') || phrase.contains('(') {
            score += 1;
        }
        if words.len() >= 2 {
            score += 1;
        }
        let stopwords = words.iter().filter(|word| Lexicon::is_stopword(word)).count();
        if stopwords as f64 / words.len() as f64 > 0.5 {
            score -= 1;
        }
        if self.coded_phrase(phrase) {
            score += 2;
        }
        score.max(0)
    }

    /// Short phrase carrying a digit or coded shorthand.
    fn coded_phrase(&self, phrase: &str) -> bool {
        if phrase.split_whitespace().count() > CODED_MAX_WORDS {
            return false;
        }
        phrase.chars().any(|c| c.is_ascii_digit()) || self.coded.is_match(phrase)
    }

    /// Pure function-word filler, e.g. "of the" or "in a".
    fn is_junk(&self, phrase: &str) -> bool {
        self.junk.is_match(&phrase.replace(' ', ""))
    }
}

/// Lowercase, collapse whitespace, fold en-dash to hyphen.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .replace('\u{2013}', "-")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip trailing vague nouns ("syndrome", "disease", ...) off a phrase.
fn trim_vague_tail(phrase: &str) -> &str {
    let mut rest = phrase;
    while let Some((head, last)) = rest.rsplit_once(' ') {
        if !Lexicon::is_bad_word(last) {
            break;
        }
        rest = head.trim_end();
    }
    rest
}
