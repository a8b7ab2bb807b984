//! Localized UI strings
//!
//! Message keys map to per-language strings. Tables are embedded from
//! `locales/<code>.json`; `en` is the default locale every other table is
//! checked against.

use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Embed)]
#[folder = "locales/"]
struct Locales;

/// Supported UI languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Ar];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ar" => Ok(Language::Ar),
            other => Err(I18nError::UnknownLanguage(other.to_string())),
        }
    }
}

/// How the catalog reacts to keys missing from a locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingKeyPolicy {
    /// Incomplete locales fail to load and strict lookups return errors
    Strict,
    /// Missing keys fall back to the default locale, then to the key itself
    Fallback,
}

impl Default for MissingKeyPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Strict
        } else {
            Self::Fallback
        }
    }
}

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
    #[error("Missing translation for '{key}' in {language}")]
    MissingKey { language: Language, key: String },
    #[error("Locale {language} is missing keys: {}", keys.join(", "))]
    MissingKeys { language: Language, keys: Vec<String> },
    #[error("Invalid locale table {language}: {reason}")]
    InvalidLocale { language: Language, reason: String },
}

/// Per-language string tables with an explicit fallback contract
#[derive(Debug, Clone)]
pub struct Catalog {
    tables: HashMap<Language, HashMap<String, String>>,
    policy: MissingKeyPolicy,
}

impl Catalog {
    /// Load the embedded locale tables
    pub fn load(policy: MissingKeyPolicy) -> Result<Self, I18nError> {
        let mut tables = HashMap::new();
        for language in Language::ALL {
            let file = Locales::get(&format!("{}.json", language.code())).ok_or_else(|| {
                I18nError::InvalidLocale {
                    language,
                    reason: "table not embedded".to_string(),
                }
            })?;
            let table: HashMap<String, String> =
                serde_json::from_slice(&file.data).map_err(|e| I18nError::InvalidLocale {
                    language,
                    reason: e.to_string(),
                })?;
            tables.insert(language, table);
        }
        Self::from_tables(tables, policy)
    }

    /// Build a catalog from in-memory tables, checking every locale against the default
    pub fn from_tables(
        tables: HashMap<Language, HashMap<String, String>>,
        policy: MissingKeyPolicy,
    ) -> Result<Self, I18nError> {
        let Some(default_table) = tables.get(&Language::default()) else {
            return Err(I18nError::InvalidLocale {
                language: Language::default(),
                reason: "default locale table is required".to_string(),
            });
        };

        for (language, table) in &tables {
            let mut missing: Vec<String> = default_table
                .keys()
                .filter(|key| !table.contains_key(*key))
                .cloned()
                .collect();
            if missing.is_empty() {
                continue;
            }
            missing.sort();
            match policy {
                MissingKeyPolicy::Strict => {
                    return Err(I18nError::MissingKeys {
                        language: *language,
                        keys: missing,
                    });
                }
                MissingKeyPolicy::Fallback => {
                    tracing::warn!(
                        language = %language,
                        missing = ?missing,
                        "Locale is incomplete, default strings will be used"
                    );
                }
            }
        }

        Ok(Self { tables, policy })
    }

    pub fn policy(&self) -> MissingKeyPolicy {
        self.policy
    }

    /// Strict lookup.
    ///
    /// Under `Strict` a key missing from `language` is an error. Under
    /// `Fallback` the default locale is consulted before giving up.
    pub fn lookup(&self, language: Language, key: &str) -> Result<&str, I18nError> {
        if let Some(text) = self.raw(language, key) {
            return Ok(text);
        }
        if self.policy == MissingKeyPolicy::Fallback {
            if let Some(text) = self.raw(Language::default(), key) {
                return Ok(text);
            }
        }
        Err(I18nError::MissingKey {
            language,
            key: key.to_string(),
        })
    }

    /// Lookup that never fails: language, then default locale, then the key itself
    pub fn text<'a>(&'a self, language: Language, key: &'a str) -> &'a str {
        match self.lookup(language, key) {
            Ok(text) => text,
            Err(e) => {
                match self.policy {
                    MissingKeyPolicy::Strict => tracing::error!(error = %e, "Translation lookup failed"),
                    MissingKeyPolicy::Fallback => tracing::warn!(error = %e, "Translation lookup failed"),
                }
                self.raw(Language::default(), key).unwrap_or(key)
            }
        }
    }

    /// Fully resolved table for a language (default strings fill any gaps)
    pub fn table(&self, language: Language) -> BTreeMap<String, String> {
        let mut resolved: BTreeMap<String, String> = self
            .tables
            .get(&Language::default())
            .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        if let Some(table) = self.tables.get(&language) {
            resolved.extend(table.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        resolved
    }

    fn raw(&self, language: Language, key: &str) -> Option<&str> {
        self.tables
            .get(&language)
            .and_then(|t| t.get(key))
            .map(String::as_str)
    }
}
