//! Letterboxd film page strategies

use super::{ChainError, Probe, StrategyChain, StrategySpec, Transform, Validity};

pub const LETTERBOXD_STRATEGIES: &[StrategySpec] = &[
    StrategySpec {
        name: "tooltip-display-rating",
        probe: Probe::Text {
            selector: "a.tooltip.display-rating",
        },
        validity: Validity::Numeric,
        transform: Transform::Verbatim,
    },
    StrategySpec {
        name: "display-rating",
        probe: Probe::Text {
            selector: ".display-rating",
        },
        validity: Validity::Numeric,
        transform: Transform::Verbatim,
    },
    StrategySpec {
        name: "ratings-link",
        probe: Probe::Text {
            selector: r#"a[href$="/ratings/"]"#,
        },
        validity: Validity::Numeric,
        transform: Transform::Verbatim,
    },
    StrategySpec {
        name: "average-rating",
        probe: Probe::Text {
            selector: ".average-rating",
        },
        validity: Validity::Numeric,
        transform: Transform::Verbatim,
    },
    StrategySpec {
        name: "histogram-average-rating",
        probe: Probe::Text {
            selector: ".rating-histogram-descriptor .average-rating",
        },
        validity: Validity::Numeric,
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
        transform: Transform::Verbatim,
    },
    StrategySpec {
        name: "json-ld",
        probe: Probe::JsonLd {
            pointer: "/aggregateRating/ratingValue",
        },
        validity: Validity::Numeric,
        transform: Transform::Verbatim,
    },
    StrategySpec {
        name: "body-out-of-five",
        probe: Probe::BodyText {
            pattern: r"([0-9]\.[0-9]) out of 5",
        },
        validity: Validity::Numeric,
        transform: Transform::Verbatim,
    },
];

/// Compile the Letterboxd chain
pub fn chain() -> Result<StrategyChain, ChainError> {
    StrategyChain::compile(LETTERBOXD_STRATEGIES)
}
