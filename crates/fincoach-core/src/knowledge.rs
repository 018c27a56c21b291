//! Financial terms knowledge base
//!
//! Terms are keyed by their display name. Lookup is by exact name first,
//! then by a normalized key shared by the name and its aliases; there is no
//! fuzzy matching.
//!
//! The default term list is embedded in the binary. A JSON file in the data
//! dir (~/.local/share/fincoach/financial_terms.json) replaces it when present.
//!
//! [`KnowledgeBase::ask`] answers free-text questions. The question is routed
//! by phrasing (comparison, calculation, recommendation, how-to, definition,
//! first match wins) and its subject resolved to terms: exact name or alias,
//! then names and aliases mentioned as whole words, then keyword scoring.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Embedded default knowledge base
const DEFAULT_TERMS: &str = include_str!("../../../data/financial_terms.json");

static GLOBAL: OnceLock<KnowledgeBase> = OnceLock::new();

/// Most terms suggested for a question resolved by keyword scoring
const MAX_SUGGESTIONS: usize = 3;

/// Words too common to say anything about a question's subject
const STOPWORDS: &[&str] = &[
    "about", "and", "are", "best", "can", "does", "for", "get", "how", "much", "many", "should",
    "tell", "that", "the", "this", "way", "what", "when", "which", "why", "will", "with", "would",
    "you", "your",
];

/// Question phrasings in routing order
const ROUTES: &[(QuestionKind, &str)] = &[
    (
        QuestionKind::Comparison,
        r"(?i)\b(?:difference between|compare)\s+(.+?)\s+(?:and|to|with|vs\.?|versus)\s+(.+)",
    ),
    (QuestionKind::Comparison, r"(?i)^(.+?)\s+(?:vs\.?|versus)\s+(.+)$"),
    (
        QuestionKind::Calculation,
        r"(?i)\b(?:how (?:much|many)|calculate|what percentage(?: of)?)\s+(.+)",
    ),
    (
        QuestionKind::Recommendation,
        r"(?i)\b(?:should i|is it (?:good|better|best|wise|advisable) to|what(?:'s| is) the best way to)\s+(.+)",
    ),
    (QuestionKind::HowTo, r"(?i)\b(?:how (?:do|can|should) i|how to|ways to)\s+(.+)"),
    (
        QuestionKind::Definition,
        r"(?i)\b(?:what(?:'s| is| are)|define|explain|tell me about|meaning of)\s+(?:(?:an?|the)\s+)?(.+)",
    ),
];

/// How a question is phrased, which decides what part of a term answers it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Definition,
    Comparison,
    HowTo,
    Recommendation,
    Calculation,
    /// No known phrasing; terms are found from the question's keywords
    General,
}

impl QuestionKind {
    /// Whether `term` has the field that answers this kind of question
    fn answered_by(&self, term: &FinancialTerm) -> bool {
        match self {
            QuestionKind::Comparison => term.comparison.is_some(),
            QuestionKind::HowTo => !term.how_to.is_empty(),
            QuestionKind::Recommendation => !term.student_advice.is_empty(),
            QuestionKind::Calculation => term.formula.is_some(),
            QuestionKind::Definition | QuestionKind::General => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Answer<'a> {
    pub kind: QuestionKind,
    /// What the question asks about, as written
    pub subject: String,
    /// Matching terms, best first; empty when nothing matched
    pub terms: Vec<&'a FinancialTerm>,
}

impl<'a> Answer<'a> {
    pub fn best(&self) -> Option<&'a FinancialTerm> {
        self.terms.first().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialTerm {
    /// Filled from the JSON key
    #[serde(skip)]
    pub name: String,
    pub category: String,
    pub definition: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub student_context: String,
    /// Ordered steps
    #[serde(default)]
    pub how_to: Vec<String>,
    #[serde(default)]
    pub student_advice: String,
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default)]
    pub comparison: Option<String>,
}

impl FinancialTerm {
    /// All prose fields, used to find mentions of other terms
    fn text(&self) -> String {
        let mut text = vec![
            self.definition.as_str(),
            self.student_context.as_str(),
            self.student_advice.as_str(),
        ];
        text.extend(self.how_to.iter().map(String::as_str));
        text.join(" ")
    }
}

/// Read-only term index
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    terms: BTreeMap<String, FinancialTerm>,
    /// Normalized name or alias -> term name
    keys: HashMap<String, String>,
    /// Whole-word, case-insensitive pattern per term name
    mentions: Vec<(String, Regex)>,
    routes: Vec<(QuestionKind, Regex)>,
}

/// Lowercase, punctuation to spaces, whitespace collapsed
pub fn normalize_key(s: &str) -> String {
    let spaced: String = s
        .chars()
        .filter(|c| *c != '\'')
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl KnowledgeBase {
    /// Parse a JSON object of `name -> term`
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, FinancialTerm> = serde_json::from_str(content)?;

        let mut keys = HashMap::new();
        let mut mentions = Vec::with_capacity(raw.len());
        let mut terms = BTreeMap::new();

        for (name, mut term) in raw {
            term.name = name.clone();
            for alias in std::iter::once(&name).chain(term.aliases.iter()) {
                let key = normalize_key(alias);
                if let Some(existing) = keys.get(&key) {
                    if existing != &name {
                        tracing::warn!(alias = %alias, term = %name, existing = %existing, "Duplicate alias ignored");
                    }
                    continue;
                }
                keys.insert(key, name.clone());
            }
            let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&name)))?;
            mentions.push((name.clone(), pattern));
            terms.insert(name, term);
        }

        let routes = ROUTES
            .iter()
            .map(|(kind, pattern)| Ok((*kind, Regex::new(pattern)?)))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(terms = terms.len(), aliases = keys.len(), "Loaded knowledge base");

        Ok(Self {
            terms,
            keys,
            mentions,
            routes,
        })
    }

    /// The embedded default terms
    pub fn embedded() -> Result<Self> {
        Self::from_json(DEFAULT_TERMS)
    }

    /// Load from an explicit file, the data-dir override, or the embedded default
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_json(&fs::read_to_string(path)?),
            None => match default_terms_path().filter(|p| p.exists()) {
                Some(override_path) => {
                    tracing::debug!(path = %override_path.display(), "Using knowledge base override");
                    Self::from_json(&fs::read_to_string(&override_path)?)
                }
                None => Self::embedded(),
            },
        }
    }

    /// Process-wide instance, loaded on first use and never modified
    ///
    /// A broken override file falls back to the embedded terms.
    pub fn global() -> &'static KnowledgeBase {
        GLOBAL.get_or_init(|| {
            Self::load(None).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to load knowledge base override, using defaults");
                Self::embedded().unwrap_or_default()
            })
        })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// All terms, by name
    pub fn terms(&self) -> impl Iterator<Item = &FinancialTerm> {
        self.terms.values()
    }

    /// Exact name, then normalized name or alias
    pub fn lookup(&self, name: &str) -> Option<&FinancialTerm> {
        self.terms.get(name).or_else(|| {
            self.keys
                .get(&normalize_key(name))
                .and_then(|canonical| self.terms.get(canonical))
        })
    }

    /// Terms whose name or an alias contains `keyword`
    pub fn search(&self, keyword: &str) -> Vec<&FinancialTerm> {
        let needle = normalize_key(keyword);
        if needle.is_empty() {
            return Vec::new();
        }
        self.terms
            .values()
            .filter(|t| {
                std::iter::once(&t.name)
                    .chain(t.aliases.iter())
                    .any(|k| normalize_key(k).contains(&needle))
            })
            .collect()
    }

    /// Distinct category names, sorted
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self.terms.values().map(|t| t.category.as_str()).collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    pub fn by_category(&self, category: &str) -> Vec<&FinancialTerm> {
        let wanted = normalize_key(category);
        self.terms
            .values()
            .filter(|t| normalize_key(&t.category) == wanted)
            .collect()
    }

    /// Other terms mentioned by name in this term's text
    pub fn related_terms(&self, name: &str) -> Vec<&FinancialTerm> {
        let Some(term) = self.lookup(name) else {
            return Vec::new();
        };
        let text = term.text();
        self.mentions
            .iter()
            .filter(|(other, pattern)| other != &term.name && pattern.is_match(&text))
            .filter_map(|(other, _)| self.terms.get(other))
            .collect()
    }

    /// Answer a free-text question with the terms that address it
    ///
    /// A comparison yields the best term for each side. Other kinds put the
    /// terms carrying the relevant field (formula, steps, advice) first.
    pub fn ask(&self, question: &str) -> Answer<'_> {
        let question = question
            .trim()
            .trim_end_matches(|c| matches!(c, '?' | '.' | '!'))
            .trim();

        for (kind, pattern) in &self.routes {
            let Some(caps) = pattern.captures(question) else {
                continue;
            };
            let sides: Vec<&str> = caps
                .iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str().trim())
                .collect();

            let mut terms: Vec<&FinancialTerm> = Vec::new();
            for side in &sides {
                let mut found = self.resolve(side);
                if *kind == QuestionKind::Comparison {
                    found.truncate(1);
                }
                for term in found {
                    if !terms.iter().any(|t| t.name == term.name) {
                        terms.push(term);
                    }
                }
            }
            terms.sort_by_key(|t| !kind.answered_by(t));

            tracing::debug!(kind = ?kind, matches = terms.len(), "Routed question");
            return Answer {
                kind: *kind,
                subject: sides.join(" vs "),
                terms,
            };
        }

        Answer {
            kind: QuestionKind::General,
            subject: question.to_string(),
            terms: self.resolve(question),
        }
    }

    /// Terms a piece of free text is about
    fn resolve(&self, text: &str) -> Vec<&FinancialTerm> {
        let key = normalize_key(text);
        if let Some(term) = self.lookup(&key) {
            return vec![term];
        }
        let mentioned = self.mentioned_in(&key);
        if !mentioned.is_empty() {
            return mentioned;
        }
        self.score_keywords(&key)
    }

    /// Terms whose name or alias appears as whole words, longest match first
    fn mentioned_in(&self, key: &str) -> Vec<&FinancialTerm> {
        let padded = format!(" {} ", key);
        let mut hits: Vec<(&String, &String)> = self
            .keys
            .iter()
            .filter(|(alias, _)| padded.contains(&format!(" {} ", alias)))
            .collect();
        hits.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.1.cmp(b.1)));

        let mut terms: Vec<&FinancialTerm> = Vec::new();
        for (_, name) in hits {
            if let Some(term) = self.terms.get(name) {
                if !terms.iter().any(|t| t.name == term.name) {
                    terms.push(term);
                }
            }
        }
        terms
    }

    /// Name hits score 3, alias hits 2, definition hits 1
    fn score_keywords(&self, key: &str) -> Vec<&FinancialTerm> {
        let words: Vec<&str> = key
            .split_whitespace()
            .filter(|w| w.len() >= 3 && !STOPWORDS.contains(w))
            .collect();
        if words.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(u32, &FinancialTerm)> = self
            .terms
            .values()
            .filter_map(|term| {
                let name = normalize_key(&term.name);
                let aliases: Vec<String> = term.aliases.iter().map(|a| normalize_key(a)).collect();
                let definition = normalize_key(&term.definition);
                let score: u32 = words
                    .iter()
                    .map(|w| {
                        let in_name = if name.contains(w) { 3 } else { 0 };
                        let in_aliases = 2 * aliases.iter().filter(|a| a.contains(w)).count() as u32;
                        let in_definition = u32::from(definition.contains(w));
                        in_name + in_aliases + in_definition
                    })
                    .sum();
                (score > 0).then_some((score, term))
            })
            .collect();
        // Stable: equal scores stay in name order
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, term)| term)
            .collect()
    }
}

/// Knowledge base override path
pub fn default_terms_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("fincoach").join("financial_terms.json"))
}
