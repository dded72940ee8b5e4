/*!
 * Chunk planning and duration-budget selection.
 *
 * The media timeline is cut into contiguous, fixed-length work units;
 * only the last one may be shorter. A duration budget keeps a prefix of
 * that list so a user can transcribe just the first N minutes.
 */

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One bounded time slice of the source media
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSpec {
    /// 0-based position in the plan
    pub index: usize,
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
}

impl ChunkSpec {
    /// Length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// How much of the media to process
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "BudgetRepr", into = "BudgetRepr")]
pub enum DurationBudget {
    /// Every chunk
    #[default]
    All,
    /// Only enough leading chunks to cover this many minutes
    Minutes(f64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BudgetRepr {
    Minutes(f64),
    Keyword(String),
}

impl TryFrom<BudgetRepr> for DurationBudget {
    type Error = String;

    fn try_from(repr: BudgetRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            BudgetRepr::Minutes(minutes) => Ok(Self::Minutes(minutes)),
            BudgetRepr::Keyword(word) => word.parse().map_err(|e: anyhow::Error| e.to_string()),
        }
    }
}

impl From<DurationBudget> for BudgetRepr {
    fn from(budget: DurationBudget) -> Self {
        match budget {
            DurationBudget::All => BudgetRepr::Keyword("all".to_string()),
            DurationBudget::Minutes(minutes) => BudgetRepr::Minutes(minutes),
        }
    }
}

impl FromStr for DurationBudget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed
            .parse::<f64>()
            .map(Self::Minutes)
            .map_err(|_| anyhow!("Invalid duration budget: {}", s))
    }
}

impl fmt::Display for DurationBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Minutes(minutes) => write!(f, "{} min", minutes),
        }
    }
}

/// Cut `[0, total_duration_secs)` into contiguous chunks of `chunk_duration_secs`.
///
/// An empty or negative duration yields no chunks.
pub fn plan_chunks(total_duration_secs: f64, chunk_duration_secs: f64) -> Result<Vec<ChunkSpec>> {
    if !(chunk_duration_secs > 0.0) {
        return Err(anyhow!("Chunk duration must be positive, got {}", chunk_duration_secs));
    }
    if !(total_duration_secs > 0.0) {
        return Ok(Vec::new());
    }

    let count = (total_duration_secs / chunk_duration_secs).ceil() as usize;
    Ok((0..count)
        .map(|index| {
            let start = index as f64 * chunk_duration_secs;
            ChunkSpec {
                index,
                start,
                end: (start + chunk_duration_secs).min(total_duration_secs),
            }
        })
        .collect())
}

/// Keep the leading chunks needed to cover `budget`.
///
/// `All` returns the list unchanged. Otherwise `ceil(budget / chunk length)`
/// chunks are kept from the front, so any positive budget keeps at least
/// one chunk; a zero or negative budget keeps none.
pub fn select_chunks_by_duration(
    chunks: &[ChunkSpec],
    budget: DurationBudget,
    chunk_duration_secs: f64,
) -> Vec<ChunkSpec> {
    let minutes = match budget {
        DurationBudget::All => return chunks.to_vec(),
        DurationBudget::Minutes(minutes) => minutes,
    };

    let budget_secs = minutes * 60.0;
    let needed = (budget_secs / chunk_duration_secs).ceil().max(0.0) as usize;
    if needed >= chunks.len() {
        return chunks.to_vec();
    }

    chunks[..needed].to_vec()
}
