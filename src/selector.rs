//! # Selectors
//!
//! This module defines the `Selector` value type used to locate descendant
//! nodes. A selector is either built structurally (the engine's default
//! per-name selector `[attribute="name"]` is produced by [`Selector::attr_eq`]
//! and never goes through the parser) or parsed from a string supplied by a
//! caller through `select()`.
//!
//! The parsed grammar is a compound-selector subset: an optional tag name or
//! `*`, followed by any number of `#id`, `.class`, `[attr]` and
//! `[attr="value"]` predicates. Combinators (descendant, child, sibling,
//! selector lists) are rejected; narrowing the search root is what `scope()`
//! is for, and the parse error says so.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Full-selector shape: optional tag, then a run of predicates.
static SELECTOR_RE: OnceLock<Regex> = OnceLock::new();
/// Individual predicate extraction within the predicate run.
static PRED_RE: OnceLock<Regex> = OnceLock::new();

fn selector_re() -> &'static Regex {
    SELECTOR_RE.get_or_init(|| {
        Regex::new(
            r#"^(\*|[A-Za-z][A-Za-z0-9_-]*)?((?:#[A-Za-z0-9_-]+|\.[A-Za-z0-9_-]+|\[[A-Za-z_][A-Za-z0-9_-]*(?:="[^"]*")?\])*)$"#,
        )
        .expect("static selector pattern is valid")
    })
}

fn pred_re() -> &'static Regex {
    PRED_RE.get_or_init(|| {
        Regex::new(r#"#([A-Za-z0-9_-]+)|\.([A-Za-z0-9_-]+)|\[([A-Za-z_][A-Za-z0-9_-]*)(?:="([^"]*)")?\]"#)
            .expect("static predicate pattern is valid")
    })
}

/// A single predicate within a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pred {
    Id(String),
    Class(String),
    Attr { name: String, value: Option<String> },
}

/// A compiled selector: an optional tag name plus zero or more predicates,
/// all of which must hold for a node to match.
///
/// A selector with no tag and no predicates is the universal selector `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    preds: Vec<Pred>,
}

impl Selector {
    /// Build the attribute-equality selector `[attribute="value"]` without
    /// going through the parser.
    ///
    /// This is how the engine derives its default per-name selector, so name
    /// resolution cannot fail on selector syntax regardless of what
    /// characters the name contains.
    pub fn attr_eq(attribute: &str, value: &str) -> Selector {
        Selector {
            tag: None,
            preds: vec![Pred::Attr {
                name: attribute.to_string(),
                value: Some(value.to_string()),
            }],
        }
    }

    /// Parse a selector string.
    ///
    /// Accepts `*`, a tag name, `#id`, `.class`, `[attr]`, `[attr="value"]`
    /// and conjunctions of those (e.g. `input[kind="text"].wide`). Anything
    /// else is a misconfiguration and is reported as [`Error::Selector`].
    pub fn parse(input: &str) -> Result<Selector> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::Selector {
                input: input.to_string(),
                message: "empty selector".to_string(),
                hint: None,
            });
        }

        let caps = selector_re().captures(trimmed).ok_or_else(|| {
            let hint = if trimmed.contains(' ')
                || trimmed.contains('>')
                || trimmed.contains('+')
                || trimmed.contains('~')
                || trimmed.contains(',')
            {
                Some("combinators are not supported; narrow the search root with scope() instead".to_string())
            } else {
                None
            };
            Error::Selector {
                input: trimmed.to_string(),
                message: "unsupported selector syntax".to_string(),
                hint,
            }
        })?;

        let tag = caps
            .get(1)
            .map(|m| m.as_str())
            .filter(|t| *t != "*")
            .map(String::from);

        let mut preds = Vec::new();
        if let Some(rest) = caps.get(2) {
            for pred in pred_re().captures_iter(rest.as_str()) {
                if let Some(id) = pred.get(1) {
                    preds.push(Pred::Id(id.as_str().to_string()));
                } else if let Some(class) = pred.get(2) {
                    preds.push(Pred::Class(class.as_str().to_string()));
                } else if let Some(name) = pred.get(3) {
                    preds.push(Pred::Attr {
                        name: name.as_str().to_string(),
                        value: pred.get(4).map(|v| v.as_str().to_string()),
                    });
                }
            }
        }

        Ok(Selector { tag, preds })
    }

    /// Evaluate this selector against a node described by its tag and an
    /// attribute lookup callback.
    ///
    /// `Document` implementations call this from their query primitives so
    /// that matching semantics stay identical across tree backends:
    /// `#id` compares the `id` attribute, `.class` matches a whitespace-
    /// separated token of the `class` attribute, and `[attr]`/`[attr="v"]`
    /// test presence or exact equality.
    pub fn matches_with<F>(&self, tag: Option<&str>, attr: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(expected) = &self.tag {
            match tag {
                Some(actual) if actual == expected => {}
                _ => return false,
            }
        }
        self.preds.iter().all(|pred| match pred {
            Pred::Id(id) => attr("id").as_deref() == Some(id.as_str()),
            Pred::Class(class) => attr("class")
                .map(|value| value.split_whitespace().any(|token| token == class))
                .unwrap_or(false),
            Pred::Attr { name, value } => match value {
                Some(expected) => attr(name).as_deref() == Some(expected.as_str()),
                None => attr(name).is_some(),
            },
        })
    }

    /// True for the universal selector `*`.
    pub fn is_universal(&self) -> bool {
        self.tag.is_none() && self.preds.is_empty()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_universal() {
            return write!(f, "*");
        }
        if let Some(tag) = &self.tag {
            write!(f, "{}", tag)?;
        }
        for pred in &self.preds {
            match pred {
                Pred::Id(id) => write!(f, "#{}", id)?,
                Pred::Class(class) => write!(f, ".{}", class)?,
                Pred::Attr { name, value: Some(value) } => write!(f, "[{}=\"{}\"]", name, value)?,
                Pred::Attr { name, value: None } => write!(f, "[{}]", name)?,
            }
        }
        Ok(())
    }
}
