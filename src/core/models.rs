use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::RankError;

/// Smallest accepted result count for a ranking request.
pub const MIN_RESULT_COUNT: u32 = 1;
/// Largest accepted result count for a ranking request.
pub const MAX_RESULT_COUNT: u32 = 100;

/// The ranking field a request sorts by.
///
/// Wire names are snake_case (`market_cap`, `alt_rank`, ...). Anything the crate does not
/// recognize round-trips through [`Criterion::Other`] unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Criterion {
    /// Market capitalization.
    MarketCap,
    /// Current USD price.
    Price,
    /// 24 hour trading volume.
    Volume24h,
    /// Social sentiment percentage.
    Sentiment,
    /// Share of social volume.
    SocialDominance,
    /// Share of total market capitalization.
    MarketDominance,
    /// Overall performance ranking (lower is better).
    AltRank,
    /// Combined social and technical score.
    GalaxyScore,
    /// Social engagements.
    Interactions,
    /// Circulating token supply.
    CirculatingSupply,
    /// 1 hour price change.
    PercentChange1h,
    /// 24 hour price change.
    PercentChange24h,
    /// 7 day price change.
    PercentChange7d,
    /// A field this crate has no specific knowledge of.
    Other(String),
}

/// How values of a criterion are rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// `$` prefix, fixed decimals, optional thousands grouping.
    Currency {
        /// Digits after the decimal point.
        decimals: usize,
        /// Whether the integer part is grouped with commas.
        grouped: bool,
    },
    /// `%` suffix with fixed decimals.
    Percent {
        /// Digits after the decimal point.
        decimals: usize,
    },
    /// A bare rank integer.
    Rank,
    /// A bare number with fixed decimals, optionally grouped.
    Number {
        /// Digits after the decimal point.
        decimals: usize,
        /// Whether the integer part is grouped with commas.
        grouped: bool,
    },
}

/// Display priority the backend assigns to each metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Core metrics, shown first.
    High,
    /// Secondary metrics.
    Medium,
    /// Everything else.
    #[default]
    #[serde(other)]
    Low,
}

impl Criterion {
    /// Every criterion the crate knows by name, in catalog order.
    pub const KNOWN: [Criterion; 13] = [
        Criterion::MarketCap,
        Criterion::AltRank,
        Criterion::Price,
        Criterion::Volume24h,
        Criterion::Interactions,
        Criterion::PercentChange1h,
        Criterion::PercentChange24h,
        Criterion::PercentChange7d,
        Criterion::SocialDominance,
        Criterion::CirculatingSupply,
        Criterion::MarketDominance,
        Criterion::Sentiment,
        Criterion::GalaxyScore,
    ];

    /// The snake_case name used on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Criterion::MarketCap => "market_cap",
            Criterion::Price => "price",
            Criterion::Volume24h => "volume_24h",
            Criterion::Sentiment => "sentiment",
            Criterion::SocialDominance => "social_dominance",
            Criterion::MarketDominance => "market_dominance",
            Criterion::AltRank => "alt_rank",
            Criterion::GalaxyScore => "galaxy_score",
            Criterion::Interactions => "interactions",
            Criterion::CirculatingSupply => "circulating_supply",
            Criterion::PercentChange1h => "percent_change_1h",
            Criterion::PercentChange24h => "percent_change_24h",
            Criterion::PercentChange7d => "percent_change_7d",
            Criterion::Other(name) => name,
        }
    }

    /// Human-readable column label.
    pub fn label(&self) -> &str {
        match self {
            Criterion::MarketCap => "Market Cap",
            Criterion::Price => "Price",
            Criterion::Volume24h => "24h Volume",
            Criterion::Sentiment => "Sentiment",
            Criterion::SocialDominance => "Social Dominance",
            Criterion::MarketDominance => "Market Dominance",
            Criterion::AltRank => "AltRank",
            Criterion::GalaxyScore => "Galaxy Score",
            Criterion::Interactions => "Social Interactions",
            Criterion::CirculatingSupply => "Circulating Supply",
            Criterion::PercentChange1h => "1h Change",
            Criterion::PercentChange24h => "24h Change",
            Criterion::PercentChange7d => "7d Change",
            Criterion::Other(name) => name,
        }
    }

    /// Priority used when the backend does not report one.
    pub fn default_priority(&self) -> Priority {
        match self {
            Criterion::MarketCap
            | Criterion::AltRank
            | Criterion::Price
            | Criterion::Volume24h
            | Criterion::Interactions
            | Criterion::PercentChange1h
            | Criterion::PercentChange24h
            | Criterion::PercentChange7d => Priority::High,
            Criterion::SocialDominance
            | Criterion::CirculatingSupply
            | Criterion::MarketDominance => Priority::Medium,
            Criterion::Sentiment | Criterion::GalaxyScore | Criterion::Other(_) => Priority::Low,
        }
    }

    /// Rendering rule for values of this criterion.
    pub fn value_format(&self) -> ValueFormat {
        match self {
            Criterion::MarketCap | Criterion::Volume24h => ValueFormat::Currency {
                decimals: 0,
                grouped: true,
            },
            Criterion::Price => ValueFormat::Currency {
                decimals: 2,
                grouped: false,
            },
            Criterion::Sentiment | Criterion::SocialDominance | Criterion::MarketDominance => {
                ValueFormat::Percent { decimals: 1 }
            }
            Criterion::PercentChange1h
            | Criterion::PercentChange24h
            | Criterion::PercentChange7d => ValueFormat::Percent { decimals: 2 },
            Criterion::AltRank => ValueFormat::Rank,
            Criterion::GalaxyScore => ValueFormat::Number {
                decimals: 1,
                grouped: false,
            },
            Criterion::Interactions | Criterion::CirculatingSupply => ValueFormat::Number {
                decimals: 0,
                grouped: true,
            },
            Criterion::Other(_) => ValueFormat::Number {
                decimals: 2,
                grouped: false,
            },
        }
    }

    /// Half-open range placeholder values are sampled from.
    ///
    /// Ranks are not sampled; they are assigned by position.
    pub fn synthetic_range(&self) -> (f64, f64) {
        match self {
            Criterion::MarketCap => (0.0, 1_000_000_000_000.0),
            Criterion::Price => (0.0, 100_000.0),
            Criterion::Volume24h => (0.0, 50_000_000_000.0),
            Criterion::Sentiment
            | Criterion::SocialDominance
            | Criterion::MarketDominance
            | Criterion::GalaxyScore => (0.0, 100.0),
            Criterion::PercentChange1h => (-5.0, 5.0),
            Criterion::PercentChange24h => (-20.0, 20.0),
            Criterion::PercentChange7d => (-40.0, 40.0),
            Criterion::Interactions => (0.0, 50_000_000.0),
            Criterion::CirculatingSupply => (0.0, 500_000_000_000.0),
            Criterion::AltRank => (1.0, 2.0),
            Criterion::Other(_) => (0.0, 1000.0),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Ok(Criterion::KNOWN
            .iter()
            .find(|c| c.as_str() == name)
            .cloned()
            .unwrap_or_else(|| Criterion::Other(name.to_string())))
    }
}

impl From<&str> for Criterion {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(c) => c,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Criterion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Criterion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Criterion::from(s.as_str()))
    }
}

/// One user action's worth of ranking parameters. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RankingRequest {
    criterion: Criterion,
    result_count: u32,
}

impl RankingRequest {
    /// Builds a request, rejecting result counts outside `1..=100`.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::InvalidRequest`] when `result_count` is out of bounds.
    pub fn new(criterion: impl Into<Criterion>, result_count: u32) -> Result<Self, RankError> {
        if !(MIN_RESULT_COUNT..=MAX_RESULT_COUNT).contains(&result_count) {
            return Err(RankError::InvalidRequest(format!(
                "result count must be between {MIN_RESULT_COUNT} and {MAX_RESULT_COUNT}, got {result_count}"
            )));
        }
        Ok(Self {
            criterion: criterion.into(),
            result_count,
        })
    }

    /// The ranking field.
    pub fn criterion(&self) -> &Criterion {
        &self.criterion
    }

    /// How many records were asked for.
    pub fn result_count(&self) -> u32 {
        self.result_count
    }
}

/// One row of a ranking. Rank is the record's position in its sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedRecord {
    /// Asset name, e.g. `Bitcoin`.
    pub display_name: String,
    /// Ticker symbol, e.g. `BTC`.
    pub symbol: String,
    /// Value already rendered for display.
    pub formatted_value: String,
    /// The criterion this record was ranked by.
    pub criterion: Criterion,
}

/// Opaque handle for a triggered background job.
///
/// Carries the request it was created for, so a poll loop can synthesize placeholder
/// data of the right shape without consulting anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    id: String,
    request: RankingRequest,
}

impl JobHandle {
    /// Wraps a backend job id.
    pub fn new(id: impl Into<String>, request: RankingRequest) -> Self {
        Self {
            id: id.into(),
            request,
        }
    }

    /// The backend's job identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The request this job was triggered for.
    pub fn request(&self) -> &RankingRequest {
        &self.request
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
