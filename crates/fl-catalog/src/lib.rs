// SPDX-License-Identifier: MIT OR Apache-2.0
//! Locale-aware message catalogs for faultline.
//!
//! The dispatcher resolves raw template strings through the [`MessageSource`]
//! seam: `lookup(code, locale)` returns the template to interpolate, or
//! nothing — a miss is a valid outcome, never an error.  [`MessageCatalog`]
//! is the shipped in-memory source with a deterministic locale fallback
//! chain (exact tag → language → root) and TOML loading.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// Locale
// ---------------------------------------------------------------------------

/// A language tag with an optional region, plus the distinguished root
/// locale used when a caller supplies none.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Locale {
    /// The root locale: matches catalog entries registered without a tag.
    #[must_use]
    pub fn root() -> Self {
        Self {
            language: String::new(),
            region: None,
        }
    }

    /// A language-only locale such as `en`.
    #[must_use]
    pub fn new(language: &str) -> Self {
        Self {
            language: language.trim().to_ascii_lowercase(),
            region: None,
        }
    }

    /// A language + region locale such as `en-US`.
    #[must_use]
    pub fn with_region(language: &str, region: &str) -> Self {
        Self {
            language: language.trim().to_ascii_lowercase(),
            region: Some(region.trim().to_ascii_uppercase()),
        }
    }

    /// Parse a tag tolerantly: `en`, `en-US`, and `en_us` all resolve.
    ///
    /// Returns `None` for tags with no language part or more than two
    /// segments.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }
        let mut parts = tag.split(['-', '_']);
        let language = parts.next().filter(|l| !l.is_empty())?;
        let region = parts.next();
        if parts.next().is_some() {
            return None;
        }
        Some(match region {
            Some(r) if !r.is_empty() => Self::with_region(language, r),
            _ => Self::new(language),
        })
    }

    /// Whether this is the root locale.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.language.is_empty()
    }

    /// The lowercased language part; empty for the root locale.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The uppercased region part, when present.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Lookup order for this locale: itself, the language-only form when a
    /// region is present, then root.  Deterministic and duplicate-free.
    #[must_use]
    pub fn fallback_chain(&self) -> Vec<Locale> {
        let mut chain = vec![self.clone()];
        if self.region.is_some() {
            chain.push(Self::new(&self.language));
        }
        if !self.is_root() {
            chain.push(Self::root());
        }
        chain
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("root");
        }
        match &self.region {
            Some(r) => write!(f, "{}-{}", self.language, r),
            None => f.write_str(&self.language),
        }
    }
}

// ---------------------------------------------------------------------------
// MessageSource
// ---------------------------------------------------------------------------

/// Resolves a raw message template for a `(code, locale)` pair.
///
/// A `None` result means "no template" and yields a `null` message in the
/// final report; implementations should not treat it as a failure.
pub trait MessageSource: Send + Sync {
    /// Look up the template registered for `code` under `locale`.
    fn lookup(&self, code: &str, locale: &Locale) -> Option<String>;
}

/// The default source: knows no templates, every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyMessageSource;

impl MessageSource for EmptyMessageSource {
    fn lookup(&self, _code: &str, _locale: &Locale) -> Option<String> {
        None
    }
}

// ---------------------------------------------------------------------------
// Errors / warnings
// ---------------------------------------------------------------------------

/// Errors raised while loading a catalog document.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The requested catalog file could not be read.
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        /// Path that was requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML or misses the expected tables.
    #[error("failed to parse catalog: {reason}")]
    Parse {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// A `[messages.<tag>]` table name is not a parsable locale tag.
    #[error("unrecognised locale tag in catalog: {tag}")]
    UnknownLocale {
        /// The offending table name.
        tag: String,
    },
}

/// Advisory issues found by [`MessageCatalog::lint`]; none prevent use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWarning {
    /// A registered template is empty.
    EmptyTemplate {
        /// Locale the template is registered under.
        locale: Locale,
        /// Code the template is registered for.
        code: String,
    },
    /// A template opens a placeholder it never closes.
    UnclosedPlaceholder {
        /// Locale the template is registered under.
        locale: Locale,
        /// Code the template is registered for.
        code: String,
    },
}

impl fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogWarning::EmptyTemplate { locale, code } => {
                write!(f, "empty template for '{code}' ({locale})")
            }
            CatalogWarning::UnclosedPlaceholder { locale, code } => {
                write!(f, "unclosed placeholder in template for '{code}' ({locale})")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MessageCatalog
// ---------------------------------------------------------------------------

/// On-disk catalog document shape: `[messages.<tag>]` tables of
/// `code = "template"` pairs, with `root` as the tag for the root locale.
#[derive(Debug, Deserialize)]
struct CatalogDoc {
    #[serde(default)]
    messages: BTreeMap<String, BTreeMap<String, String>>,
}

/// In-memory [`MessageSource`] with per-locale template tables.
///
/// Lookup walks the locale's fallback chain and returns the first hit, so a
/// region-specific template shadows the language-wide one, which shadows the
/// root entry.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: BTreeMap<Locale, BTreeMap<String, String>>,
}

impl MessageCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, replacing any previous entry for the pair.
    #[must_use]
    pub fn with_message(
        mut self,
        locale: Locale,
        code: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.insert(locale, code, template);
        self
    }

    /// Register a template in place.
    pub fn insert(
        &mut self,
        locale: Locale,
        code: impl Into<String>,
        template: impl Into<String>,
    ) {
        self.messages
            .entry(locale)
            .or_default()
            .insert(code.into(), template.into());
    }

    /// Total number of registered templates across all locales.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.values().map(BTreeMap::len).sum()
    }

    /// Whether no templates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.values().all(BTreeMap::is_empty)
    }

    /// Parse a catalog from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for invalid TOML and
    /// [`CatalogError::UnknownLocale`] when a table name is not `root` or a
    /// parsable locale tag.
    pub fn from_toml_str(doc: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDoc = toml::from_str(doc).map_err(|e| CatalogError::Parse {
            reason: e.to_string(),
        })?;
        let mut catalog = Self::new();
        for (tag, entries) in doc.messages {
            let locale = if tag == "root" {
                Locale::root()
            } else {
                Locale::parse(&tag).ok_or(CatalogError::UnknownLocale { tag })?
            };
            for (code, template) in entries {
                catalog.insert(locale.clone(), code, template);
            }
        }
        Ok(catalog)
    }

    /// Load a catalog from a TOML file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] when the file cannot be read, plus the
    /// parse errors of [`MessageCatalog::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let doc = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&doc)
    }

    /// Report advisory issues: empty templates and unclosed placeholders.
    #[must_use]
    pub fn lint(&self) -> Vec<CatalogWarning> {
        let mut warnings = Vec::new();
        for (locale, entries) in &self.messages {
            for (code, template) in entries {
                if template.is_empty() {
                    warnings.push(CatalogWarning::EmptyTemplate {
                        locale: locale.clone(),
                        code: code.clone(),
                    });
                } else if has_unclosed_placeholder(template) {
                    warnings.push(CatalogWarning::UnclosedPlaceholder {
                        locale: locale.clone(),
                        code: code.clone(),
                    });
                }
            }
        }
        warnings
    }
}

/// Whether an unescaped `{` in `template` is never closed.
fn has_unclosed_placeholder(template: &str) -> bool {
    let chars: Vec<char> = template.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' {
            i += 2;
            continue;
        }
        if chars[i] == '{' && !chars[i + 1..].contains(&'}') {
            return true;
        }
        i += 1;
    }
    false
}

impl MessageSource for MessageCatalog {
    fn lookup(&self, code: &str, locale: &Locale) -> Option<String> {
        for candidate in locale.fallback_chain() {
            if let Some(template) = self.messages.get(&candidate).and_then(|m| m.get(code)) {
                return Some(template.clone());
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
