//! Vocabulary lookups backing term extraction.
//!
//! Three sources feed the lexicon: an ontology dump (`hpo_terms.json`), a plain
//! word list, and the data banks regenerated by the stats pass. All three are
//! optional at runtime. A missing or unreadable file degrades to an empty set
//! with a warning, so extraction still runs with reduced recall rather than
//! aborting the whole build.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::BuildConfig;

/// Vague diagnostic nouns that carry no search value on their own.
pub const BAD_WORDS: [&str; 7] = [
    "syndrome",
    "disease",
    "disorder",
    "defect",
    "condition",
    "abnormality",
    "problem",
];

/// English stopwords used for the stopword-ratio penalty during scoring.
///
/// Embedded so extraction never depends on a corpus download at runtime.
pub const STOPWORDS: [&str; 179] = [
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Corpus-derived word sets, regenerated from `table_stats.json` by the stats
/// pass and read back on the next build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataBanks {
    #[serde(default)]
    pub shared_row_labels: BTreeSet<String>,
    #[serde(default)]
    pub overused_words: BTreeSet<String>,
    #[serde(default)]
    pub genomic_keywords: BTreeSet<String>,
    #[serde(default)]
    pub potential_tag_roots: BTreeSet<String>,
}

impl DataBanks {
    /// Read the banks from disk, or fall back to empty sets.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "data banks unavailable, using empty sets");
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(banks) => banks,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "data banks unreadable, using empty sets");
                Self::default()
            }
        }
    }
}

/// Every lookup set the extraction engine consults, built once per run and
/// passed by reference. No hidden global state.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    /// Lowercased ontology labels, ontology synonyms, and word-list entries.
    medical_terms: BTreeSet<String>,
    /// Ontology label -> lowercased synonym values.
    synonyms: BTreeMap<String, BTreeSet<String>>,
    pub overused_words: BTreeSet<String>,
    pub shared_row_labels: BTreeSet<String>,
    pub tag_roots: BTreeSet<String>,
}

/// Shape of one ontology entry. Anything beyond the label and synonym values
/// is ignored.
#[derive(Debug, Deserialize)]
struct OntologyEntry {
    lbl: Option<String>,
    #[serde(default)]
    meta: OntologyMeta,
}

#[derive(Debug, Default, Deserialize)]
struct OntologyMeta {
    #[serde(default)]
    synonyms: Vec<OntologySynonym>,
}

#[derive(Debug, Deserialize)]
struct OntologySynonym {
    val: Option<String>,
}

impl Lexicon {
    /// Assemble the lexicon from the paths in `config`.
    pub fn load(config: &BuildConfig) -> Self {
        let mut lexicon = Self::default();
        lexicon.load_ontology(&config.ontology_path);
        lexicon.load_wordlist(&config.wordlist_path);

        let banks = DataBanks::load(&config.data_banks_path);
        lexicon.overused_words = banks.overused_words;
        lexicon.shared_row_labels = banks.shared_row_labels;
        lexicon.tag_roots = banks.potential_tag_roots;
        lexicon
    }

    fn load_ontology(&mut self, path: &Path) {
        let entries: Vec<OntologyEntry> = match fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|text| serde_json::from_str(&text).map_err(|err| err.to_string()))
        {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ontology unavailable, medical-term recall reduced");
                return;
            }
        };
        for entry in entries {
            let synonym_values: BTreeSet<String> = entry
                .meta
                .synonyms
                .iter()
                .filter_map(|syn| syn.val.as_deref())
                .map(str::to_lowercase)
                .collect();
            self.medical_terms.extend(synonym_values.iter().cloned());
            if let Some(label) = entry.lbl {
                let label = label.to_lowercase();
                self.medical_terms.insert(label.clone());
                if !synonym_values.is_empty() {
                    self.synonyms.entry(label).or_default().extend(synonym_values);
                }
            }
        }
    }

    fn load_wordlist(&mut self, path: &Path) {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "wordlist unavailable");
                return;
            }
        };
        self.medical_terms.extend(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_lowercase),
        );
    }

    pub fn is_medical_term(&self, word: &str) -> bool {
        self.medical_terms.contains(&word.to_lowercase())
    }

    /// True when any whitespace-separated word of `phrase` is a medical term.
    pub fn is_medical_phrase(&self, phrase: &str) -> bool {
        phrase.split_whitespace().any(|word| self.is_medical_term(word))
    }

    /// Synonyms recorded for an ontology label, if any.
    pub fn synonyms_of(&self, label: &str) -> Option<&BTreeSet<String>> {
        self.synonyms.get(label)
    }

    pub fn is_stopword(word: &str) -> bool {
        STOPWORDS.contains(&word)
    }

    pub fn is_bad_word(word: &str) -> bool {
        BAD_WORDS.contains(&word)
    }

    #[cfg(test)]
    pub(crate) fn with_terms<I: IntoIterator<Item = &'static str>>(terms: I) -> Self {
        Self {
            medical_terms: terms.into_iter().map(str::to_lowercase).collect(),
            ..Self::default()
        }
    }
}
