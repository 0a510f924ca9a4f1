//! Rotten Tomatoes movie page strategies
//!
//! Only used when the page fallback is enabled; the structured OMDb lookup is
//! the primary route to the Tomatometer. Candidates found as a bare number
//! (JSON-LD, "x out of 5" text) are reported with a percent sign.

use super::{ChainError, Probe, StrategyChain, StrategySpec, Transform, Validity};

pub const ROTTEN_TOMATOES_STRATEGIES: &[StrategySpec] = &[
    StrategySpec {
        name: "critics-score",
        probe: Probe::Text {
            selector: r#"rt-text[slot="criticsScore"]"#,
        },
        validity: Validity::Percent,
        transform: Transform::Verbatim,
    },
    StrategySpec {
        name: "twitter-meta",
        probe: Probe::Attribute {
            selector: r#"meta[name="twitter:data2"]"#,
            attribute: "content",
            pattern: Some(r"([0-9.]+) out of 5"),
        },
        validity: Validity::Numeric,
        transform: Transform::AppendPercent,
    },
    StrategySpec {
        name: "json-ld",
        probe: Probe::JsonLd {
            pointer: "/aggregateRating/ratingValue",
        },
        validity: Validity::Numeric,
        transform: Transform::AppendPercent,
    },
    StrategySpec {
        name: "body-out-of-five",
        probe: Probe::BodyText {
            pattern: r"([0-9]\.[0-9]) out of 5",
        },
        validity: Validity::Numeric,
        transform: Transform::AppendPercent,
    },
];

/// Compile the Rotten Tomatoes chain
pub fn chain() -> Result<StrategyChain, ChainError> {
    StrategyChain::compile(ROTTEN_TOMATOES_STRATEGIES)
}
