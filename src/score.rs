//! Adjusted scores + weighting profile → ranked schemes.
//!
//! ```text
//! final[s] = Σ_c adjusted[s, c] * weight[c] * direction(c)
//! ```
//!
//! with `direction = +1` for positive criteria and `-1` for the complexity
//! criteria, so lower complexity contributes more.
//!
//! Ranking is descending by final score. Exactly equal scores keep scheme
//! declaration order (`f64::total_cmp` on the score, then the declaration
//! index).

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{InputError, Result};
use crate::tables::{ConfigTables, ScoreTable, WeightingProfile};

/// The user's importance rank for each criterion.
///
/// Ranks run `1..=n` over the `n` criteria, each used exactly once; higher
/// means more important. The ranking is validated and recorded with a result
/// but does not enter the final-score arithmetic: the weighting profile
/// carries the weights.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CriteriaRanking {
    ranks: BTreeMap<String, u8>,
}

impl CriteriaRanking {
    pub fn new(ranks: BTreeMap<String, u8>) -> Self {
        Self { ranks }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, u8)>) -> Self {
        Self {
            ranks: pairs
                .into_iter()
                .map(|(c, r)| (c.to_string(), r))
                .collect(),
        }
    }

    /// Ranks in criterion declaration order, `1..=n`.
    pub fn identity(tables: &ConfigTables) -> Self {
        Self::from_pairs(tables.criteria().iter().map(|c| c.code.as_str()).zip(1u8..))
    }

    pub fn rank(&self, criterion: &str) -> Option<u8> {
        self.ranks.get(criterion).copied()
    }

    pub fn ranks(&self) -> &BTreeMap<String, u8> {
        &self.ranks
    }

    /// Criterion codes, most important first.
    pub fn by_importance(&self) -> Vec<&str> {
        let mut v: Vec<(&str, u8)> = self.ranks.iter().map(|(c, &r)| (c.as_str(), r)).collect();
        v.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        v.into_iter().map(|(c, _)| c).collect()
    }

    /// Check that the ranks are a permutation of `1..=n` over exactly the
    /// criteria in `tables`.
    pub fn check(&self, tables: &ConfigTables) -> std::result::Result<(), InputError> {
        let criteria = tables.criteria();
        if let Some(unknown) = self
            .ranks
            .keys()
            .find(|code| tables.criterion_index(code).is_none())
        {
            return Err(InputError::UnknownCriterion(unknown.clone()));
        }
        let max = criteria.len() as u8;
        let mut used = BTreeSet::new();
        for c in criteria {
            let rank = self
                .rank(&c.code)
                .ok_or_else(|| InputError::MissingRank(c.code.clone()))?;
            if rank == 0 || rank > max {
                return Err(InputError::RankOutOfRange {
                    criterion: c.code.clone(),
                    rank,
                    max,
                });
            }
            if !used.insert(rank) {
                return Err(InputError::DuplicateRank(rank));
            }
        }
        Ok(())
    }
}

/// One scheme's place in a [`RankedResult`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedScheme {
    pub scheme: String,
    pub name: String,
    pub score: f64,
    /// Signed weighted contribution of each criterion (declaration order).
    pub contributions: Vec<f64>,
    /// Declaration index in the tables; the tie-break key.
    pub index: usize,
}

/// Schemes ordered best first.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedResult {
    /// Id of the weighting profile used.
    pub profile: String,
    pub entries: Vec<RankedScheme>,
}

impl RankedResult {
    /// The recommended scheme.
    pub fn top(&self) -> Option<&RankedScheme> {
        self.entries.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedScheme> {
        self.entries.iter()
    }

    /// Scheme ids, best first.
    pub fn order(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.scheme.as_str()).collect()
    }

    pub fn score_of(&self, scheme: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.scheme == scheme).map(|e| e.score)
    }

    /// 1-based position of `scheme`.
    pub fn position(&self, scheme: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.scheme == scheme).map(|p| p + 1)
    }

    /// `scheme id → final score`, safe to serialize as a JSON object.
    pub fn scores(&self) -> BTreeMap<String, f64> {
        self.entries
            .iter()
            .map(|e| (e.scheme.clone(), e.score))
            .collect()
    }
}

/// Rank the schemes of `tables` using `adjusted` scores and `profile`.
///
/// Fails with [`InputError`] if `ranking` is not a permutation of `1..=5`
/// over the defined criteria, or if `profile` lacks a usable weight for some
/// criterion. Neither `adjusted` nor `profile` is modified, so the same table
/// can be re-scored under any number of profiles.
pub fn score(
    tables: &ConfigTables,
    adjusted: &ScoreTable,
    ranking: &CriteriaRanking,
    profile: &WeightingProfile,
) -> Result<RankedResult> {
    ranking.check(tables)?;
    profile.check(tables.criteria())?;
    Ok(rank_unchecked(tables, adjusted, profile))
}

/// [`score`] without input validation, for callers that validated already.
pub(crate) fn rank_unchecked(
    tables: &ConfigTables,
    adjusted: &ScoreTable,
    profile: &WeightingProfile,
) -> RankedResult {
    // `profile.check` passed, so every criterion has a weight.
    let weights: Vec<f64> = tables
        .criteria()
        .iter()
        .map(|c| profile.weight(&c.code).unwrap_or(0.0) * c.polarity.direction())
        .collect();

    let mut entries: Vec<RankedScheme> = tables
        .schemes()
        .iter()
        .enumerate()
        .map(|(si, s)| {
            let contributions: Vec<f64> = adjusted
                .row(si)
                .iter()
                .zip(&weights)
                .map(|(&v, &w)| f64::from(v) * w)
                .collect();
            // Fold from +0.0 so an all-zero row never produces -0.0.
            let score = contributions.iter().fold(0.0, |acc, x| acc + x);
            RankedScheme {
                scheme: s.id.clone(),
                name: s.name.clone(),
                score,
                contributions,
                index: si,
            }
        })
        .collect();

    entries.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));

    RankedResult {
        profile: profile.id.clone(),
        entries,
    }
}
