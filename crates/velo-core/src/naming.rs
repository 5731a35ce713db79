//! Module name validation and derived naming conventions.
//!
//! A generation request starts from one user-supplied token (`products`,
//! `UserProfile`, `order_items`). This module validates it as a
//! [`ModuleToken`] and derives every casing and number variant the templates
//! need as a [`NameSet`].
//!
//! # Pluralization is a heuristic
//!
//! Singular and plural forms are produced by suffix rules on the last
//! underscore-separated word, not by a dictionary:
//!
//! | Rule | Example |
//! |------|---------|
//! | consonant + `y` → `ies` | `category` → `categories` |
//! | `s`, `x`, `z`, `ch`, `sh` → `+es` | `box` → `boxes` |
//! | otherwise `+s` | `invoice` → `invoices` |
//!
//! [`NamingConfig::irregular_plurals`] overrides the rules for specific
//! words. Generated files are meant to be edited, so a wrong guess costs a
//! rename, nothing more.

use camino::Utf8PathBuf;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::{NameForm, NamingConfig, is_identifier};
use crate::error::NameError;

/// A validated module name.
///
/// Guaranteed to match `^[a-zA-Z_][a-zA-Z0-9_]*$`.
///
/// # Examples
///
/// ```
/// use velo_core::ModuleToken;
///
/// assert!(ModuleToken::parse("order_items").is_ok());
/// assert!(ModuleToken::parse("").is_err());
/// assert!(ModuleToken::parse("2fast").is_err());
/// assert!(ModuleToken::parse("bad name").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleToken(String);

impl ModuleToken {
    /// Validates a raw token.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::InvalidModuleName`] if the token is empty, starts
    /// with a digit, or contains anything but ASCII letters, digits and `_`.
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        if raw.is_empty() {
            return Err(NameError::invalid(raw, "must not be empty"));
        }
        if raw.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(NameError::invalid(raw, "must not start with a digit"));
        }
        if !is_identifier(raw) {
            return Err(NameError::invalid(
                raw,
                "only ASCII letters, digits and '_' are allowed",
            ));
        }
        Ok(Self(raw.to_owned()))
    }

    /// Returns the token as given.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModuleToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every name variant derived from one module token.
///
/// Computed once per generation request and never mutated. It serializes
/// to the template context, so field names are the variables templates use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NameSet {
    /// The token exactly as the user typed it.
    pub raw: String,
    /// `snake_case` of the token; names the module folder and files.
    pub snake: String,
    /// Heuristic singular, `snake_case`.
    pub singular: String,
    /// Heuristic plural, `snake_case`.
    pub plural: String,
    /// `PascalCase` class/type name.
    pub type_name: String,
    /// REST collection path segment (`kebab-case`).
    pub path_segment: String,
    /// Router prefix, e.g. `/v1/invoices`.
    pub route_prefix: String,
    /// Document collection name.
    pub collection: String,
    /// Lower-case words separated by spaces, for docstrings and messages.
    pub human: String,
}

impl NameSet {
    /// Folder holding the module's artifacts, relative to the modules root.
    #[must_use]
    pub fn module_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(&self.snake)
    }
}

/// Derives [`NameSet`]s from module tokens.
///
/// Pure and deterministic: the same token and configuration always give an
/// identical result.
#[derive(Debug, Clone)]
pub struct NameTransformer {
    type_form: NameForm,
    route_form: NameForm,
    route_version: Option<String>,
    /// singular → plural
    plurals: FxHashMap<String, String>,
    /// plural → singular
    singulars: FxHashMap<String, String>,
}

impl NameTransformer {
    /// Creates a transformer from naming rules.
    #[must_use]
    pub fn new(config: &NamingConfig) -> Self {
        let mut plurals = FxHashMap::default();
        let mut singulars = FxHashMap::default();
        for (singular, plural) in &config.irregular_plurals {
            let singular = singular.to_ascii_lowercase();
            let plural = plural.to_ascii_lowercase();
            singulars.insert(plural.clone(), singular.clone());
            plurals.insert(singular, plural);
        }

        Self {
            type_form: config.type_form,
            route_form: config.route_form,
            route_version: config
                .route_version
                .clone()
                .filter(|version| !version.is_empty()),
            plurals,
            singulars,
        }
    }

    /// Validates `raw` and derives its names.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::InvalidModuleName`] if `raw` is not a valid token.
    pub fn transform(&self, raw: &str) -> Result<NameSet, NameError> {
        ModuleToken::parse(raw).map(|token| self.names_for(&token))
    }

    /// Derives the names of an already validated token.
    #[must_use]
    pub fn names_for(&self, token: &ModuleToken) -> NameSet {
        let snake = to_snake_case(token.as_str());
        let singular = map_last_word(&snake, |word| self.singularize_word(word));
        let plural = map_last_word(&singular, |word| self.pluralize_word(word));

        let pick = |form: NameForm| -> &str {
            match form {
                NameForm::Singular => &singular,
                NameForm::Plural => &plural,
                NameForm::AsGiven => &snake,
            }
        };

        let mut type_name = to_pascal_case(pick(self.type_form));
        // Class names cannot start with a digit (`_1x` → `_1x`, not `1x`).
        if type_name.starts_with(|c: char| c.is_ascii_digit()) {
            type_name.insert(0, '_');
        }
        let path_segment = match pick(self.route_form).trim_matches('_') {
            "" => snake.clone(),
            segment => segment.replace('_', "-"),
        };
        let route_prefix = match &self.route_version {
            Some(version) => format!("/{version}/{path_segment}"),
            None => format!("/{path_segment}"),
        };
        let human = words(&singular).collect::<Vec<_>>().join(" ");

        NameSet {
            raw: token.as_str().to_owned(),
            collection: plural.clone(),
            snake,
            singular,
            plural,
            type_name,
            path_segment,
            route_prefix,
            human,
        }
    }

    fn pluralize_word(&self, word: &str) -> String {
        if let Some(plural) = self.plurals.get(word) {
            return plural.clone();
        }
        if word.is_empty() || self.singulars.contains_key(word) {
            return word.to_owned();
        }

        if let Some(stem) = word.strip_suffix('y') {
            if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
                return format!("{stem}ies");
            }
        }

        if ["s", "x", "z", "ch", "sh"]
            .iter()
            .any(|suffix| word.ends_with(suffix))
        {
            return format!("{word}es");
        }

        format!("{word}s")
    }

    fn singularize_word(&self, word: &str) -> String {
        if self.plurals.contains_key(word) {
            return word.to_owned();
        }
        if let Some(singular) = self.singulars.get(word) {
            return singular.clone();
        }

        if let Some(stem) = word.strip_suffix("ies") {
            if !stem.is_empty() {
                return format!("{stem}y");
            }
        }

        for suffix in ["sses", "xes", "zes", "ches", "shes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_owned();
            }
        }

        if ["ss", "us", "is"].iter().any(|suffix| word.ends_with(suffix)) {
            return word.to_owned();
        }

        match word.strip_suffix('s') {
            Some(stem) if !stem.is_empty() => stem.to_owned(),
            _ => word.to_owned(),
        }
    }
}

impl Default for NameTransformer {
    fn default() -> Self {
        Self::new(&NamingConfig::default())
    }
}

/// Converts an identifier to `snake_case`.
///
/// Word boundaries are inserted before an upper-case letter that follows a
/// lower-case letter or digit, and before the last capital of an acronym
/// (`HTTPServer` → `http_server`). Existing underscores are kept.
#[must_use]
pub fn to_snake_case(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let mut out = String::with_capacity(token.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_uppercase() {
            out.push(c);
            continue;
        }

        let prev = i.checked_sub(1).map(|j| chars[j]);
        let next = chars.get(i + 1).copied();
        let boundary = match prev {
            Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
            Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
            _ => false,
        };

        if boundary && !out.ends_with('_') {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
    }

    out
}

/// Converts a `snake_case` name to `PascalCase`.
///
/// A name with no word characters (`_`) is returned unchanged.
#[must_use]
pub fn to_pascal_case(snake: &str) -> String {
    let pascal: String = words(snake)
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect();

    if pascal.is_empty() {
        snake.to_owned()
    } else {
        pascal
    }
}

fn words(snake: &str) -> impl Iterator<Item = &str> {
    snake.split('_').filter(|word| !word.is_empty())
}

/// Applies `f` to the last underscore-separated word of `snake`.
fn map_last_word(snake: &str, f: impl Fn(&str) -> String) -> String {
    match snake.rsplit_once('_') {
        Some((head, last)) if !last.is_empty() => format!("{head}_{}", f(last)),
        Some(_) => snake.to_owned(),
        None => f(snake),
    }
}

const fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}
