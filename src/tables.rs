//! Reference tables: schemes, criteria, weighting profiles, baseline scores,
//! and clarifying questions.
//!
//! [`ConfigTables`] is built once, validated at construction, and then only
//! ever borrowed. There is no `&mut` API: engines receive `&ConfigTables` and
//! every derived value (adjusted scores, rankings, reports) is a fresh value.
//!
//! Tables arrive either from [`ConfigTables::builtin`] or from an external
//! loader that fills a [`TableSource`] (with the `serde` feature, a
//! `ConfigTables` deserializes straight from that shape and validates on the
//! way in).

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ConfigError, InputError, Result};

/// Number of candidate schemes.
pub const SCHEME_COUNT: usize = 6;
/// Number of criteria.
pub const CRITERION_COUNT: usize = 5;
/// Number of weighting profiles.
pub const PROFILE_COUNT: usize = 4;
/// Number of clarifying questions.
pub const QUESTION_COUNT: usize = 9;
/// Lowest legal (baseline or adjusted) score.
pub const SCORE_MIN: u8 = 1;
/// Highest legal (baseline or adjusted) score.
pub const SCORE_MAX: u8 = 6;

/// Whether high raw values of a criterion are desirable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Polarity {
    /// Higher is better (security, performance, maturity).
    Positive,
    /// Higher is worse (the complexity criteria).
    Negative,
}

impl Polarity {
    /// `+1` for positive criteria, `-1` for negative ones.
    pub fn direction(self) -> f64 {
        match self {
            Polarity::Positive => 1.0,
            Polarity::Negative => -1.0,
        }
    }
}

/// A candidate key-infrastructure scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scheme {
    pub id: String,
    pub name: String,
}

/// A decision criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Criterion {
    /// Short code (`"A"` .. `"E"` in the built-in tables).
    pub code: String,
    pub name: String,
    pub polarity: Polarity,
}

/// A named set of per-criterion weights.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightingProfile {
    pub id: String,
    pub name: String,
    /// Criterion code → weight.
    pub weights: BTreeMap<String, f64>,
}

impl WeightingProfile {
    /// Weight for `criterion`, if the profile supplies one.
    pub fn weight(&self, criterion: &str) -> Option<f64> {
        self.weights.get(criterion).copied()
    }

    /// Check that the profile gives every criterion a finite, non-negative weight.
    ///
    /// Extra weights for criteria that do not exist are ignored.
    pub fn check(&self, criteria: &[Criterion]) -> std::result::Result<(), InputError> {
        for c in criteria {
            let Some(w) = self.weight(&c.code) else {
                return Err(InputError::MissingWeight {
                    profile: self.id.clone(),
                    criterion: c.code.clone(),
                });
            };
            if !w.is_finite() || w < 0.0 {
                return Err(InputError::InvalidWeight {
                    profile: self.id.clone(),
                    criterion: c.code.clone(),
                    weight: w,
                });
            }
        }
        Ok(())
    }
}

/// One score nudge: `delta` added to `(scheme, criterion)`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreDelta {
    pub scheme: String,
    pub criterion: String,
    pub delta: i32,
}

impl ScoreDelta {
    pub fn new(scheme: &str, criterion: &str, delta: i32) -> Self {
        Self {
            scheme: scheme.to_string(),
            criterion: criterion.to_string(),
            delta,
        }
    }
}

/// A yes/no/unsure probe whose answer nudges baseline scores.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClarifyingQuestion {
    /// 1-based question number; the identifier answers refer to.
    pub number: u32,
    pub text: String,
    /// Applied when answered "yes".
    pub yes: Vec<ScoreDelta>,
    /// Applied when answered "no". Usually empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub no: Vec<ScoreDelta>,
}

/// Dense `scheme × criterion` grid of scores, aligned with the declaration
/// order of [`ConfigTables::schemes`] and [`ConfigTables::criteria`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreTable {
    rows: Vec<Vec<u8>>,
}

impl ScoreTable {
    pub(crate) fn from_rows(rows: Vec<Vec<u8>>) -> Self {
        Self { rows }
    }

    /// Score at `(scheme_idx, criterion_idx)`.
    ///
    /// Panics if either index is out of range.
    pub fn get(&self, scheme_idx: usize, criterion_idx: usize) -> u8 {
        self.rows[scheme_idx][criterion_idx]
    }

    /// All criterion scores of one scheme.
    pub fn row(&self, scheme_idx: usize) -> &[u8] {
        &self.rows[scheme_idx]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn scheme_count(&self) -> usize {
        self.rows.len()
    }
}

/// Delta resolved to table indices at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IndexedDelta {
    pub scheme: usize,
    pub criterion: usize,
    pub delta: i32,
}

/// Raw, unvalidated table contents as an external loader would produce them.
///
/// `baseline` is keyed `scheme id → criterion code → score`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableSource {
    pub schemes: Vec<Scheme>,
    pub criteria: Vec<Criterion>,
    pub profiles: Vec<WeightingProfile>,
    pub baseline: BTreeMap<String, BTreeMap<String, u8>>,
    pub questions: Vec<ClarifyingQuestion>,
}

/// Validated, immutable reference data.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "TableSource", into = "TableSource")
)]
pub struct ConfigTables {
    schemes: Vec<Scheme>,
    criteria: Vec<Criterion>,
    profiles: Vec<WeightingProfile>,
    baseline: ScoreTable,
    questions: Vec<ClarifyingQuestion>,
    // Per question, (yes, no) deltas resolved to indices.
    resolved: Vec<(Vec<IndexedDelta>, Vec<IndexedDelta>)>,
}

impl ConfigTables {
    /// Validate `source` and freeze it.
    ///
    /// Fails with [`ConfigError`] on wrong cardinality, duplicate identifiers,
    /// missing or out-of-range baseline scores, unusable profiles, or question
    /// deltas that reference unknown schemes/criteria.
    pub fn new(source: TableSource) -> Result<Self> {
        let TableSource {
            schemes,
            criteria,
            profiles,
            baseline,
            questions,
        } = source;

        expect_len("schemes", SCHEME_COUNT, schemes.len())?;
        expect_len("criteria", CRITERION_COUNT, criteria.len())?;
        expect_len("profiles", PROFILE_COUNT, profiles.len())?;
        expect_len("questions", QUESTION_COUNT, questions.len())?;

        expect_unique("schemes", schemes.iter().map(|s| s.id.clone()))?;
        expect_unique("criteria", criteria.iter().map(|c| c.code.clone()))?;
        expect_unique("profiles", profiles.iter().map(|p| p.id.clone()))?;
        expect_unique("questions", questions.iter().map(|q| q.number.to_string()))?;

        for p in &profiles {
            p.check(&criteria).map_err(|source| ConfigError::Profile {
                profile: p.id.clone(),
                source,
            })?;
        }

        let mut rows = Vec::with_capacity(schemes.len());
        for s in &schemes {
            let mut row = Vec::with_capacity(criteria.len());
            for c in &criteria {
                let score = baseline
                    .get(&s.id)
                    .and_then(|m| m.get(&c.code))
                    .copied()
                    .ok_or_else(|| ConfigError::MissingBaseline {
                        scheme: s.id.clone(),
                        criterion: c.code.clone(),
                    })?;
                if !(SCORE_MIN..=SCORE_MAX).contains(&score) {
                    return Err(ConfigError::BaselineOutOfRange {
                        scheme: s.id.clone(),
                        criterion: c.code.clone(),
                        score,
                    }
                    .into());
                }
                row.push(score);
            }
            rows.push(row);
        }

        let resolve = |q: &ClarifyingQuestion, deltas: &[ScoreDelta]| {
            deltas
                .iter()
                .map(|d| {
                    let scheme = schemes.iter().position(|s| s.id == d.scheme).ok_or_else(|| {
                        ConfigError::UnknownReference {
                            question: q.number,
                            kind: "scheme",
                            id: d.scheme.clone(),
                        }
                    })?;
                    let criterion = criteria
                        .iter()
                        .position(|c| c.code == d.criterion)
                        .ok_or_else(|| ConfigError::UnknownReference {
                            question: q.number,
                            kind: "criterion",
                            id: d.criterion.clone(),
                        })?;
                    Ok(IndexedDelta {
                        scheme,
                        criterion,
                        delta: d.delta,
                    })
                })
                .collect::<std::result::Result<Vec<_>, ConfigError>>()
        };
        let mut resolved = Vec::with_capacity(questions.len());
        for q in &questions {
            resolved.push((resolve(q, &q.yes)?, resolve(q, &q.no)?));
        }

        tracing::debug!(
            schemes = schemes.len(),
            criteria = criteria.len(),
            profiles = profiles.len(),
            questions = questions.len(),
            "reference tables validated"
        );

        Ok(Self {
            schemes,
            criteria,
            profiles,
            baseline: ScoreTable::from_rows(rows),
            questions,
            resolved,
        })
    }

    pub fn schemes(&self) -> &[Scheme] {
        &self.schemes
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn profiles(&self) -> &[WeightingProfile] {
        &self.profiles
    }

    pub fn questions(&self) -> &[ClarifyingQuestion] {
        &self.questions
    }

    /// Baseline scores, before any clarifying answers.
    pub fn baseline(&self) -> &ScoreTable {
        &self.baseline
    }

    pub fn scheme_index(&self, id: &str) -> Option<usize> {
        self.schemes.iter().position(|s| s.id == id)
    }

    pub fn criterion_index(&self, code: &str) -> Option<usize> {
        self.criteria.iter().position(|c| c.code == code)
    }

    pub fn question_index(&self, number: u32) -> Option<usize> {
        self.questions.iter().position(|q| q.number == number)
    }

    /// Look up a profile by id.
    pub fn profile(&self, id: &str) -> std::result::Result<&WeightingProfile, InputError> {
        self.profiles
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| InputError::UnknownProfile(id.to_string()))
    }

    pub(crate) fn resolved_deltas(
        &self,
        question_idx: usize,
    ) -> &(Vec<IndexedDelta>, Vec<IndexedDelta>) {
        &self.resolved[question_idx]
    }

    /// The raw source shape (for export / round-tripping through a loader).
    pub fn to_source(&self) -> TableSource {
        let baseline = self
            .schemes
            .iter()
            .enumerate()
            .map(|(si, s)| {
                let row = self
                    .criteria
                    .iter()
                    .enumerate()
                    .map(|(ci, c)| (c.code.clone(), self.baseline.get(si, ci)))
                    .collect();
                (s.id.clone(), row)
            })
            .collect();
        TableSource {
            schemes: self.schemes.clone(),
            criteria: self.criteria.clone(),
            profiles: self.profiles.clone(),
            baseline,
            questions: self.questions.clone(),
        }
    }
}

impl TryFrom<TableSource> for ConfigTables {
    type Error = crate::Error;

    fn try_from(source: TableSource) -> Result<Self> {
        ConfigTables::new(source)
    }
}

impl From<ConfigTables> for TableSource {
    fn from(tables: ConfigTables) -> Self {
        tables.to_source()
    }
}

fn expect_len(table: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(ConfigError::Cardinality {
            table,
            expected,
            found,
        }
        .into());
    }
    Ok(())
}

fn expect_unique(table: &'static str, ids: impl Iterator<Item = String>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            return Err(ConfigError::DuplicateId { table, id }.into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn source() -> TableSource {
        ConfigTables::builtin().unwrap().to_source()
    }

    #[test]
    fn builtin_tables_validate() {
        let t = ConfigTables::builtin().unwrap();
        assert_eq!(t.schemes().len(), SCHEME_COUNT);
        assert_eq!(t.criteria().len(), CRITERION_COUNT);
        assert_eq!(t.profiles().len(), PROFILE_COUNT);
        assert_eq!(t.questions().len(), QUESTION_COUNT);
        for row in t.baseline().rows() {
            assert!(row.iter().all(|s| (SCORE_MIN..=SCORE_MAX).contains(s)));
        }
    }

    #[test]
    fn source_round_trips_through_new() {
        let t = ConfigTables::builtin().unwrap();
        let again = ConfigTables::new(t.to_source()).unwrap();
        assert_eq!(t, again);
    }

    #[test]
    fn fewer_than_six_schemes_is_fatal() {
        let mut s = source();
        s.schemes.pop();
        let err = ConfigTables::new(s).unwrap_err();
        assert_eq!(
            err,
            Error::Configuration(ConfigError::Cardinality {
                table: "schemes",
                expected: 6,
                found: 5
            })
        );
    }

    #[test]
    fn duplicate_criterion_code_is_fatal() {
        let mut s = source();
        s.criteria[4].code = "A".to_string();
        let err = ConfigTables::new(s).unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigError::DuplicateId { table: "criteria", .. })
        ));
    }

    #[test]
    fn missing_baseline_cell_is_fatal() {
        let mut s = source();
        s.baseline.get_mut("scheme3").unwrap().remove("D");
        let err = ConfigTables::new(s).unwrap_err();
        assert_eq!(
            err,
            Error::Configuration(ConfigError::MissingBaseline {
                scheme: "scheme3".to_string(),
                criterion: "D".to_string()
            })
        );
    }

    #[test]
    fn baseline_out_of_range_is_fatal() {
        let mut s = source();
        s.baseline.get_mut("scheme1").unwrap().insert("A".to_string(), 7);
        assert!(matches!(
            ConfigTables::new(s).unwrap_err(),
            Error::Configuration(ConfigError::BaselineOutOfRange { score: 7, .. })
        ));
    }

    #[test]
    fn profile_missing_a_weight_is_fatal() {
        let mut s = source();
        s.profiles[2].weights.remove("B");
        let err = ConfigTables::new(s).unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigError::Profile {
                source: InputError::MissingWeight { .. },
                ..
            })
        ));
    }

    #[test]
    fn negative_weight_is_fatal() {
        let mut s = source();
        s.profiles[0].weights.insert("A".to_string(), -0.5);
        assert!(ConfigTables::new(s).unwrap_err().is_configuration());
    }

    #[test]
    fn delta_to_unknown_scheme_is_fatal() {
        let mut s = source();
        s.questions[0].yes.push(ScoreDelta::new("scheme9", "A", 1));
        assert_eq!(
            ConfigTables::new(s).unwrap_err(),
            Error::Configuration(ConfigError::UnknownReference {
                question: 1,
                kind: "scheme",
                id: "scheme9".to_string()
            })
        );
    }

    #[test]
    fn lookups_follow_declaration_order() {
        let t = ConfigTables::builtin().unwrap();
        assert_eq!(t.scheme_index("scheme1"), Some(0));
        assert_eq!(t.scheme_index("scheme6"), Some(5));
        assert_eq!(t.criterion_index("E"), Some(4));
        assert_eq!(t.question_index(9), Some(8));
        assert!(t.profile("weighting3").is_ok());
        assert_eq!(
            t.profile("weighting7").unwrap_err(),
            InputError::UnknownProfile("weighting7".to_string())
        );
    }

    #[test]
    fn polarity_direction() {
        assert_eq!(Polarity::Positive.direction(), 1.0);
        assert_eq!(Polarity::Negative.direction(), -1.0);
    }
}
