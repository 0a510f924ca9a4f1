//! Extraction strategy chains
//!
//! A chain is an ordered table of independent extraction attempts against one
//! fetched HTML document. Strategies run strictly in table order (most
//! structural first, raw text scans last) and the first candidate that passes
//! its strategy's validity predicate wins. A candidate that fails the
//! predicate is dropped and the next strategy runs.
//!
//! # Strategy kinds
//! - **Text** - text content of the first element matching a CSS selector
//! - **Attribute** - attribute of the first matching element, optionally
//!   narrowed by a regex capture
//! - **JsonLd** - JSON pointer lookup inside embedded
//!   `application/ld+json` scripts
//! - **BodyText** - regex over the visible body text
//! - **RawHtml** - regex over the unparsed document
//!
//! Tables are plain `const` data per site ([`imdb`], [`letterboxd`],
//! [`rotten_tomatoes`]), so adding a fallback tier never touches control flow.
//! Chains are pure: the same document always yields the same result.

pub mod imdb;
pub mod letterboxd;
pub mod rotten_tomatoes;

use crate::types::RatingValue;
use regex::Regex;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, trace};

// ============================================================================
// Strategy tables
// ============================================================================

/// Where a strategy looks for its candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Text {
        selector: &'static str,
    },
    Attribute {
        selector: &'static str,
        attribute: &'static str,
        /// First capture group (or whole match) narrows the attribute value
        pattern: Option<&'static str>,
    },
    JsonLd {
        /// RFC 6901 pointer, e.g. `/aggregateRating/ratingValue`
        pointer: &'static str,
    },
    BodyText {
        pattern: &'static str,
    },
    RawHtml {
        pattern: &'static str,
    },
}

/// Validity predicate applied to a trimmed candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    /// Starts with a parseable decimal number
    Numeric,
    /// Numeric and fewer than `n` characters long
    NumericShorterThan(usize),
    /// Numeric and carries a percent sign
    Percent,
}

impl Validity {
    pub fn accepts(&self, candidate: &str) -> bool {
        match self {
            Validity::Numeric => is_numeric(candidate),
            Validity::NumericShorterThan(max) => {
                is_numeric(candidate) && candidate.chars().count() < *max
            }
            Validity::Percent => is_numeric(candidate) && candidate.contains('%'),
        }
    }
}

/// Post-processing of an accepted candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Verbatim,
    AppendPercent,
}

impl Transform {
    fn apply(&self, candidate: String) -> String {
        match self {
            Transform::Verbatim => candidate,
            Transform::AppendPercent if candidate.ends_with('%') => candidate,
            Transform::AppendPercent => format!("{}%", candidate),
        }
    }
}

/// One row of a strategy table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategySpec {
    /// Name reported in logs when this strategy wins
    pub name: &'static str,
    pub probe: Probe,
    pub validity: Validity,
    pub transform: Transform,
}

/// True when the trimmed text starts with a decimal number ("8.7", "93%", ".5/10")
pub fn is_numeric(candidate: &str) -> bool {
    let s = candidate.trim_start();
    let s = s.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(s);
    let int_digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    let frac_digits = s[int_digits..]
        .strip_prefix('.')
        .map(|rest| rest.chars().take_while(|c| c.is_ascii_digit()).count())
        .unwrap_or(0);
    int_digits > 0 || frac_digits > 0
}

// ============================================================================
// Compiled chain
// ============================================================================

/// Strategy table compilation failure
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("strategy '{strategy}': invalid selector: {message}")]
    InvalidSelector {
        strategy: &'static str,
        message: String,
    },

    #[error("strategy '{strategy}': invalid pattern: {source}")]
    InvalidPattern {
        strategy: &'static str,
        #[source]
        source: regex::Error,
    },
}

enum CompiledProbe {
    Text(Selector),
    Attribute {
        selector: Selector,
        attribute: &'static str,
        pattern: Option<Regex>,
    },
    JsonLd {
        scripts: Selector,
        pointer: &'static str,
    },
    BodyText {
        body: Selector,
        pattern: Regex,
    },
    RawHtml(Regex),
}

struct Strategy {
    name: &'static str,
    probe: CompiledProbe,
    validity: Validity,
    transform: Transform,
}

/// Value produced by a chain, with the winning strategy's name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub value: String,
    pub strategy: &'static str,
}

/// Compiled, reusable strategy chain
pub struct StrategyChain {
    strategies: Vec<Strategy>,
}

impl StrategyChain {
    /// Compile a strategy table
    ///
    /// # Errors
    /// Returns `ChainError` if any selector or pattern in the table is invalid.
    pub fn compile(specs: &[StrategySpec]) -> Result<Self, ChainError> {
        let strategies = specs
            .iter()
            .map(|spec| {
                Ok(Strategy {
                    name: spec.name,
                    probe: compile_probe(spec.name, &spec.probe)?,
                    validity: spec.validity,
                    transform: spec.transform,
                })
            })
            .collect::<Result<Vec<_>, ChainError>>()?;

        Ok(Self { strategies })
    }

    /// Number of strategies in the chain
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run every strategy in order; first valid candidate wins
    pub fn extract(&self, html: &str) -> Option<Extraction> {
        let document = Html::parse_document(html);

        for strategy in &self.strategies {
            let Some(candidate) = strategy.probe(&document, html) else {
                trace!(strategy = strategy.name, "Strategy found no candidate");
                continue;
            };

            if strategy.validity.accepts(&candidate) {
                let value = strategy.transform.apply(candidate);
                debug!(strategy = strategy.name, value = %value, "Strategy matched");
                return Some(Extraction {
                    value,
                    strategy: strategy.name,
                });
            }

            trace!(
                strategy = strategy.name,
                candidate = %candidate,
                "Candidate rejected by validity predicate"
            );
        }

        None
    }

    /// Run the chain, collapsing a miss into the sentinel
    pub fn run(&self, html: &str) -> RatingValue {
        match self.extract(html) {
            Some(extraction) => RatingValue::Available(extraction.value),
            None => RatingValue::Unavailable,
        }
    }
}

fn parse_selector(strategy: &'static str, css: &str) -> Result<Selector, ChainError> {
    Selector::parse(css).map_err(|e| ChainError::InvalidSelector {
        strategy,
        message: e.to_string(),
    })
}

fn parse_pattern(strategy: &'static str, pattern: &str) -> Result<Regex, ChainError> {
    Regex::new(pattern).map_err(|source| ChainError::InvalidPattern { strategy, source })
}

fn compile_probe(name: &'static str, probe: &Probe) -> Result<CompiledProbe, ChainError> {
    Ok(match *probe {
        Probe::Text { selector } => CompiledProbe::Text(parse_selector(name, selector)?),
        Probe::Attribute {
            selector,
            attribute,
            pattern,
        } => CompiledProbe::Attribute {
            selector: parse_selector(name, selector)?,
            attribute,
            pattern: pattern.map(|p| parse_pattern(name, p)).transpose()?,
        },
        Probe::JsonLd { pointer } => CompiledProbe::JsonLd {
            scripts: parse_selector(name, r#"script[type="application/ld+json"]"#)?,
            pointer,
        },
        Probe::BodyText { pattern } => CompiledProbe::BodyText {
            body: parse_selector(name, "body")?,
            pattern: parse_pattern(name, pattern)?,
        },
        Probe::RawHtml { pattern } => CompiledProbe::RawHtml(parse_pattern(name, pattern)?),
    })
}

impl Strategy {
    fn probe(&self, document: &Html, raw: &str) -> Option<String> {
        let candidate = match &self.probe {
            CompiledProbe::Text(selector) => document
                .select(selector)
                .next()
                .map(|el| el.text().collect::<String>()),
            CompiledProbe::Attribute {
                selector,
                attribute,
                pattern,
            } => {
                let value = document
                    .select(selector)
                    .find_map(|el| el.value().attr(attribute))?;
                match pattern {
                    Some(pattern) => first_capture(pattern, value),
                    None => Some(value.to_string()),
                }
            }
            CompiledProbe::JsonLd { scripts, pointer } => document
                .select(scripts)
                .find_map(|el| json_ld_value(&el.text().collect::<String>(), pointer)),
            CompiledProbe::BodyText { body, pattern } => {
                let text: String = document
                    .select(body)
                    .next()
                    .map(|el| el.text().collect())
                    .unwrap_or_default();
                first_capture(pattern, &text)
            }
            CompiledProbe::RawHtml(pattern) => first_capture(pattern, raw),
        }?;

        let trimmed = candidate.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

fn first_capture(pattern: &Regex, haystack: &str) -> Option<String> {
    let captures = pattern.captures(haystack)?;
    captures
        .get(1)
        .or_else(|| captures.get(0))
        .map(|m| m.as_str().to_string())
}

/// Drop empty `/* */` comments left behind by removed CDATA markers
fn strip_block_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("/*") {
        let Some(len) = rest[open + 2..].find("*/") else {
            break;
        };
        let inner = &rest[open + 2..open + 2 + len];
        out.push_str(&rest[..open]);
        if !inner.trim().is_empty() {
            out.push_str(&rest[open..open + 2 + len + 2]);
        }
        rest = &rest[open + 2 + len + 2..];
    }
    out.push_str(rest);
    out
}

/// Read a pointer from an embedded JSON-LD script
///
/// Some sites wrap the object in `/* <![CDATA[ */ ... /* ]]> */`; the markers
/// are dropped before parsing. Top-level arrays are searched in order.
fn json_ld_value(script: &str, pointer: &str) -> Option<String> {
    let body = script.replace("<![CDATA[", "").replace("]]>", "");
    let body = strip_block_comments(&body);
    let body = body.trim();

    let (open, close) = if body.starts_with('[') { ('[', ']') } else { ('{', '}') };
    let start = body.find(open)?;
    let end = body.rfind(close)?;
    if end < start {
        return None;
    }

    let json: serde_json::Value = match serde_json::from_str(&body[start..=end]) {
        Ok(json) => json,
        Err(e) => {
            debug!(error = %e, "Embedded JSON-LD failed to parse");
            return None;
        }
    };

    let lookup = |node: &serde_json::Value| match node.pointer(pointer)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    };

    match &json {
        serde_json::Value::Array(items) => items.iter().find_map(lookup),
        node => lookup(node),
    }
}
