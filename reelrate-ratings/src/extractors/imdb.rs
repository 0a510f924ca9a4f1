//! IMDb title page strategies
//!
//! IMDb ships hashed class names that rotate with every frontend release, so
//! the table runs from the current hashed class through older layouts down to
//! the JSON-LD blob that every layout has carried.

use super::{ChainError, Probe, StrategyChain, StrategySpec, Transform, Validity};

pub const IMDB_STRATEGIES: &[StrategySpec] = &[
    StrategySpec {
        name: "hashed-rating-class",
        probe: Probe::Text {
            selector: ".sc-d541859f-1.imUuxf",
        },
        validity: Validity::Numeric,
        transform: Transform::Verbatim,
    },
    StrategySpec {
        name: "hero-rating-bar",
        probe: Probe::Text {
            selector: r#"[data-testid="hero-rating-bar__aggregate-rating__score"] span"#,
        },
        validity: Validity::Numeric,
        transform: Transform::Verbatim,
    },
    StrategySpec {
        name: "button-text",
        probe: Probe::Text {
            selector: ".ipc-button__text span",
        },
        // Button spans also hold labels like "8.7/10" or vote counts
        validity: Validity::NumericShorterThan(5),
        transform: Transform::Verbatim,
    },
    StrategySpec {
        name: "aggregate-rating-button",
        probe: Probe::Text {
            selector: ".AggregateRatingButton__RatingScore-sc-1ll29m0-1",
        },
        validity: Validity::Numeric,
        transform: Transform::Verbatim,
    },
    StrategySpec {
        name: "legacy-rating-value",
        probe: Probe::Text {
            selector: r#".ratingValue span[itemprop="ratingValue"]"#,
        },
        validity: Validity::Numeric,
        transform: Transform::Verbatim,
    },
    StrategySpec {
        name: "aggregate-rating-regex",
        probe: Probe::RawHtml {
            pattern: r#"aggregateRating"[^>]*"ratingValue":\s*"([^"]+)"#,
        },
        validity: Validity::Numeric,
        transform: Transform::Verbatim,
    },
];

/// Compile the IMDb chain
pub fn chain() -> Result<StrategyChain, ChainError> {
    StrategyChain::compile(IMDB_STRATEGIES)
}
