//! Monte Carlo balance check for the scoring pipeline.
//!
//! Each trial draws a synthetic respondent and runs the real pipeline:
//!
//! 1. a random importance ranking (a shuffled `1..=5`),
//! 2. three organizational-context coins → weighting profile,
//! 3. one yes/no/unsure answer per clarifying question, capped at
//!    `max_unsure` "unsure" answers,
//! 4. adjust → score → record the winning scheme.
//!
//! The draws happen in that order from a single seeded `StdRng`, so a seed
//! reproduces the whole run bit-for-bit. Trials share nothing but the RNG
//! stream and a [`SelectionTally`]; tallies from independent runs combine with
//! [`SelectionTally::merge`].
//!
//! With fair context coins the profile usage is 12.5% / 12.5% / 25% / 50%
//! (see [`crate::expected_profile_usage`]).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::adjust::{adjust_sheet, Answer, AnswerSheet, MAX_UNSURE};
use crate::context::{expected_profile_usage, OrganizationContext};
use crate::error::{ConfigError, InputError, Result};
use crate::score::{rank_unchecked, CriteriaRanking};
use crate::stats::{fraction, wilson_bounds};
use crate::tables::{ConfigTables, PROFILE_COUNT};

/// Default number of trials.
pub const DEFAULT_TRIALS: u64 = 1000;

/// z used for the Wilson interval around observed profile usage.
const USAGE_Z: f64 = 1.96;

/// Per-question answer probabilities.
///
/// Questions are answered independently. The three weights need not sum to
/// one; they are normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnswerModel {
    pub p_yes: f64,
    pub p_no: f64,
    pub p_unsure: f64,
}

impl Default for AnswerModel {
    fn default() -> Self {
        Self {
            p_yes: 0.45,
            p_no: 0.45,
            p_unsure: 0.10,
        }
    }
}

impl AnswerModel {
    /// Only definite answers, yes and no equally likely.
    pub fn definite() -> Self {
        Self {
            p_yes: 0.5,
            p_no: 0.5,
            p_unsure: 0.0,
        }
    }

    fn check(&self) -> std::result::Result<(), InputError> {
        for (name, value) in [
            ("p_yes", self.p_yes),
            ("p_no", self.p_no),
            ("p_unsure", self.p_unsure),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(InputError::InvalidProbability { name, value });
            }
        }
        // Clamping an over-cap "unsure" needs some mass on yes/no.
        let definite = self.p_yes + self.p_no;
        if !definite.is_finite() || definite <= 0.0 {
            return Err(InputError::InvalidProbability {
                name: "p_yes + p_no",
                value: definite,
            });
        }
        let total = definite + self.p_unsure;
        if !total.is_finite() {
            return Err(InputError::InvalidProbability {
                name: "p_yes + p_no + p_unsure",
                value: total,
            });
        }
        Ok(())
    }

    /// `(P(yes), P(yes or no))` after normalizing, plus `P(yes | definite)`.
    fn thresholds(&self) -> (f64, f64, f64) {
        let total = self.p_yes + self.p_no + self.p_unsure;
        let yes = self.p_yes / total;
        let definite = (self.p_yes + self.p_no) / total;
        let yes_given_definite = self.p_yes / (self.p_yes + self.p_no);
        (yes, definite, yes_given_definite.clamp(0.0, 1.0))
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R, unsure_left: &mut usize) -> Answer {
        let (yes, definite, yes_given_definite) = self.thresholds();
        let x: f64 = rng.random();
        let drawn = if x < yes {
            Answer::Yes
        } else if x < definite {
            Answer::No
        } else {
            Answer::Unsure
        };
        if drawn != Answer::Unsure {
            return drawn;
        }
        if *unsure_left > 0 {
            *unsure_left -= 1;
            return Answer::Unsure;
        }
        // Over the cap: clamp to a definite answer.
        if rng.random_bool(yes_given_definite) {
            Answer::Yes
        } else {
            Answer::No
        }
    }
}

/// Monte Carlo run parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonteCarloConfig {
    /// Number of trials to run.
    pub trials: u64,
    /// Seed for the whole run. `None` draws one from OS entropy; the seed
    /// actually used is recorded in the report either way.
    pub seed: Option<u64>,
    pub answers: AnswerModel,
    /// `P(yes)` for each organizational-context fact.
    pub context_yes_probability: f64,
    /// Cap on "unsure" answers per trial.
    pub max_unsure: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: None,
            answers: AnswerModel::default(),
            context_yes_probability: 0.5,
            max_unsure: MAX_UNSURE,
        }
    }
}

impl MonteCarloConfig {
    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_answer_model(mut self, answers: AnswerModel) -> Self {
        self.answers = answers;
        self
    }

    pub fn with_context_yes_probability(mut self, p: f64) -> Self {
        self.context_yes_probability = p;
        self
    }

    pub fn with_max_unsure(mut self, max_unsure: usize) -> Self {
        self.max_unsure = max_unsure;
        self
    }
}

/// One synthetic respondent and the scheme the pipeline picked for them.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    pub ranking: CriteriaRanking,
    pub context: OrganizationContext,
    pub profile_index: usize,
    pub answers: AnswerSheet,
    /// Declaration index of the winning scheme.
    pub winner: usize,
    pub winning_score: f64,
}

/// Aggregate counters. The only state shared across trials.
///
/// Counter lengths are fixed at construction; [`SelectionTally::record`] and
/// [`SelectionTally::merge`] refuse anything that does not fit them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionTally {
    trials: u64,
    /// Wins per scheme, declaration order.
    scheme_wins: Vec<u64>,
    /// Uses per weighting profile, declaration order.
    profile_uses: Vec<u64>,
}

impl SelectionTally {
    pub fn new(schemes: usize, profiles: usize) -> Self {
        Self {
            trials: 0,
            scheme_wins: vec![0; schemes],
            profile_uses: vec![0; profiles],
        }
    }

    /// An empty tally sized for `tables`.
    pub fn for_tables(tables: &ConfigTables) -> Self {
        Self::new(tables.schemes().len(), tables.profiles().len())
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn scheme_wins(&self) -> &[u64] {
        &self.scheme_wins
    }

    pub fn profile_uses(&self) -> &[u64] {
        &self.profile_uses
    }

    /// Count one trial.
    ///
    /// Fails, leaving the tally untouched, if the trial's winner or profile
    /// index has no counter.
    pub fn record(&mut self, trial: &TrialOutcome) -> std::result::Result<(), ConfigError> {
        check_index("scheme_wins", trial.winner, self.scheme_wins.len())?;
        check_index("profile_uses", trial.profile_index, self.profile_uses.len())?;
        self.bump(trial);
        Ok(())
    }

    // Caller guarantees both indices are in range.
    fn bump(&mut self, trial: &TrialOutcome) {
        self.trials += 1;
        self.scheme_wins[trial.winner] += 1;
        self.profile_uses[trial.profile_index] += 1;
    }

    /// Sum another tally into this one.
    ///
    /// Both tallies must have the same counter lengths; otherwise this fails
    /// with [`ConfigError::Cardinality`] and `self` is unchanged.
    pub fn merge(&mut self, other: &SelectionTally) -> std::result::Result<(), ConfigError> {
        expect_counters("scheme_wins", self.scheme_wins.len(), other.scheme_wins.len())?;
        expect_counters("profile_uses", self.profile_uses.len(), other.profile_uses.len())?;
        self.trials += other.trials;
        for (a, b) in self.scheme_wins.iter_mut().zip(&other.scheme_wins) {
            *a += b;
        }
        for (a, b) in self.profile_uses.iter_mut().zip(&other.profile_uses) {
            *a += b;
        }
        Ok(())
    }
}

fn expect_counters(
    table: &'static str,
    expected: usize,
    found: usize,
) -> std::result::Result<(), ConfigError> {
    if expected == found {
        Ok(())
    } else {
        Err(ConfigError::Cardinality {
            table,
            expected,
            found,
        })
    }
}

fn check_index(
    table: &'static str,
    index: usize,
    len: usize,
) -> std::result::Result<(), ConfigError> {
    if index < len {
        Ok(())
    } else {
        Err(ConfigError::IndexOutOfRange { table, index, len })
    }
}

/// Wins for one scheme.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemeCount {
    pub scheme: String,
    pub name: String,
    pub count: u64,
    /// `count / completed_trials`.
    pub share: f64,
}

/// Observed vs expected usage of one weighting profile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileUsage {
    pub profile: String,
    pub count: u64,
    pub observed: f64,
    pub expected: f64,
    /// 95% Wilson interval around `observed`.
    pub wilson_lo: f64,
    pub wilson_hi: f64,
}

impl ProfileUsage {
    /// `|observed - expected|`.
    pub fn deviation(&self) -> f64 {
        (self.observed - self.expected).abs()
    }

    /// Whether `expected` lies inside the Wilson interval.
    pub fn expected_within_interval(&self) -> bool {
        self.wilson_lo <= self.expected && self.expected <= self.wilson_hi
    }
}

/// Aggregate result of a Monte Carlo run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationReport {
    /// Seed that reproduces this run.
    pub seed: u64,
    pub requested_trials: u64,
    /// Trials actually run (less than requested if the run was stopped early).
    pub completed_trials: u64,
    /// Declaration order.
    pub scheme_counts: Vec<SchemeCount>,
    /// Declaration order.
    pub profile_usage: Vec<ProfileUsage>,
    /// Names of schemes that never won.
    pub never_selected: Vec<String>,
    /// True when every scheme won at least one trial.
    pub all_schemes_selected: bool,
}

impl SimulationReport {
    /// Build a report from raw counters.
    ///
    /// Fails with [`ConfigError::Cardinality`] if the tally was not sized for
    /// `tables`.
    pub fn from_tally(
        tables: &ConfigTables,
        tally: &SelectionTally,
        seed: u64,
        requested_trials: u64,
        expected_usage: [f64; PROFILE_COUNT],
    ) -> Result<Self> {
        expect_counters("scheme_wins", tables.schemes().len(), tally.scheme_wins.len())?;
        expect_counters("profile_uses", tables.profiles().len(), tally.profile_uses.len())?;
        Ok(Self::build(tables, tally, seed, requested_trials, expected_usage))
    }

    // Tally lengths must match `tables`.
    fn build(
        tables: &ConfigTables,
        tally: &SelectionTally,
        seed: u64,
        requested_trials: u64,
        expected_usage: [f64; PROFILE_COUNT],
    ) -> Self {
        let n = tally.trials;
        let scheme_counts: Vec<SchemeCount> = tables
            .schemes()
            .iter()
            .zip(&tally.scheme_wins)
            .map(|(s, &count)| SchemeCount {
                scheme: s.id.clone(),
                name: s.name.clone(),
                count,
                share: fraction(count, n),
            })
            .collect();
        let profile_usage = tables
            .profiles()
            .iter()
            .zip(&tally.profile_uses)
            .zip(expected_usage)
            .map(|((p, &count), expected)| {
                let (wilson_lo, wilson_hi, _) = wilson_bounds(count, n, USAGE_Z);
                ProfileUsage {
                    profile: p.id.clone(),
                    count,
                    observed: fraction(count, n),
                    expected,
                    wilson_lo,
                    wilson_hi,
                }
            })
            .collect();
        let never_selected: Vec<String> = scheme_counts
            .iter()
            .filter(|c| c.count == 0)
            .map(|c| c.name.clone())
            .collect();

        Self {
            seed,
            requested_trials,
            completed_trials: n,
            all_schemes_selected: n > 0 && never_selected.is_empty(),
            scheme_counts,
            profile_usage,
            never_selected,
        }
    }

    /// Wins for the scheme with id `scheme`.
    pub fn count_for(&self, scheme: &str) -> Option<u64> {
        self.scheme_counts
            .iter()
            .find(|c| c.scheme == scheme)
            .map(|c| c.count)
    }

    /// Largest `|observed - expected|` over all profiles.
    pub fn max_profile_deviation(&self) -> f64 {
        self.profile_usage
            .iter()
            .map(ProfileUsage::deviation)
            .fold(0.0, f64::max)
    }

    /// Whether every profile's observed usage is within `tolerance` (absolute
    /// frequency) of its expected usage.
    pub fn profiles_within(&self, tolerance: f64) -> bool {
        self.max_profile_deviation() <= tolerance
    }

    /// Scheme with the most wins (first in declaration order on ties).
    pub fn most_selected(&self) -> Option<&SchemeCount> {
        self.scheme_counts
            .iter()
            .reduce(|best, c| if c.count > best.count { c } else { best })
    }
}

/// Monte Carlo harness over one set of tables.
#[derive(Debug, Clone)]
pub struct MonteCarlo<'t> {
    tables: &'t ConfigTables,
    cfg: MonteCarloConfig,
    expected_usage: [f64; PROFILE_COUNT],
}

impl<'t> MonteCarlo<'t> {
    /// Validate `cfg` against `tables`.
    pub fn new(tables: &'t ConfigTables, cfg: MonteCarloConfig) -> Result<Self> {
        cfg.answers.check()?;
        let expected_usage = expected_profile_usage(cfg.context_yes_probability)?;
        Ok(Self {
            tables,
            cfg,
            expected_usage,
        })
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.cfg
    }

    /// Run all configured trials.
    pub fn run(&self) -> SimulationReport {
        self.run_while(|_| true)
    }

    /// Run trials while `keep_going(completed)` returns true.
    ///
    /// The predicate is checked before each trial. Stopping early yields a
    /// report over the completed trials only; nothing is half-recorded.
    pub fn run_while<F>(&self, mut keep_going: F) -> SimulationReport
    where
        F: FnMut(u64) -> bool,
    {
        let seed = self.cfg.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tally = SelectionTally::for_tables(self.tables);
        let trials = self.cfg.trials;
        let progress_every = (trials / 10).max(1);

        tracing::info!(trials, seed, "starting Monte Carlo simulation");

        for i in 0..trials {
            if !keep_going(i) {
                tracing::info!(completed = i, requested = trials, "simulation stopped early");
                break;
            }
            let outcome = self.sample_trial(&mut rng);
            tally.bump(&outcome);

            let done = i + 1;
            if done % progress_every == 0 {
                tracing::debug!(
                    done,
                    trials,
                    percent = 100.0 * done as f64 / trials as f64,
                    "simulation progress"
                );
            }
        }

        let report =
            SimulationReport::build(self.tables, &tally, seed, trials, self.expected_usage);
        for name in &report.never_selected {
            tracing::warn!(scheme = %name, "scheme was never selected");
        }
        tracing::info!(
            completed = report.completed_trials,
            all_schemes_selected = report.all_schemes_selected,
            max_profile_deviation = report.max_profile_deviation(),
            "simulation finished"
        );
        report
    }

    /// Draw one synthetic respondent from `rng` and score it.
    pub fn sample_trial<R: Rng + ?Sized>(&self, rng: &mut R) -> TrialOutcome {
        let tables = self.tables;

        let mut ranks: Vec<u8> = (1..=tables.criteria().len() as u8).collect();
        ranks.shuffle(rng);
        let ranking = CriteriaRanking::from_pairs(
            tables
                .criteria()
                .iter()
                .map(|c| c.code.as_str())
                .zip(ranks),
        );

        let p = self.cfg.context_yes_probability;
        let context = OrganizationContext {
            dedicated_it_staff: rng.random_bool(p),
            large_scale: rng.random_bool(p),
            regulated: rng.random_bool(p),
        };
        let profile_index = context.profile_index();

        let mut unsure_left = self.cfg.max_unsure;
        let answers = AnswerSheet::from_ordered(
            tables
                .questions()
                .iter()
                .map(|_| self.cfg.answers.sample(rng, &mut unsure_left))
                .collect(),
        );

        let adjusted = adjust_sheet(tables, &answers);
        let result = rank_unchecked(tables, &adjusted, &tables.profiles()[profile_index]);
        // Six schemes are guaranteed by `ConfigTables`, so `entries` is non-empty.
        let (winner, winning_score) = result
            .top()
            .map(|e| (e.index, e.score))
            .unwrap_or((0, f64::NAN));

        TrialOutcome {
            ranking,
            context,
            profile_index,
            answers,
            winner,
            winning_score,
        }
    }
}

/// Run `trials` trials with the default answer model.
///
/// `seed = Some(s)` makes the run reproducible.
pub fn simulate(tables: &ConfigTables, trials: u64, seed: Option<u64>) -> Result<SimulationReport> {
    let cfg = MonteCarloConfig {
        trials,
        seed,
        ..MonteCarloConfig::default()
    };
    Ok(MonteCarlo::new(tables, cfg)?.run())
}
