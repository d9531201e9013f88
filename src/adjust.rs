//! Clarifying answers → adjusted scores.
//!
//! For every (scheme, criterion) cell, the deltas of all applicable answers
//! are summed first, then the result is clamped once:
//!
//! ```text
//! adjusted[s, c] = clamp(baseline[s, c] + Σ delta, 1, 6)
//! ```
//!
//! "yes" applies a question's `yes` deltas, "no" its `no` deltas (usually
//! none), "unsure" nothing. Pure: the tables are only read.

use crate::error::{InputError, Result};
use crate::tables::{ConfigTables, ScoreTable, SCORE_MAX, SCORE_MIN};

/// Answer to one clarifying question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Answer {
    Yes,
    No,
    /// "Not sure": contributes no adjustment.
    Unsure,
}

impl Answer {
    pub fn is_definite(self) -> bool {
        !matches!(self, Answer::Unsure)
    }
}

/// Default cap on "unsure" answers per assessment.
pub const MAX_UNSURE: usize = 2;

/// A complete, validated answer set, stored in question declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: Vec<Answer>,
}

impl AnswerSheet {
    /// Validate `(question number, answer)` pairs against `tables`.
    ///
    /// Every question must be answered exactly once and at most `max_unsure`
    /// answers may be [`Answer::Unsure`]. Order of the input does not matter.
    pub fn new(
        tables: &ConfigTables,
        answers: &[(u32, Answer)],
        max_unsure: usize,
    ) -> std::result::Result<Self, InputError> {
        let mut slots: Vec<Option<Answer>> = vec![None; tables.questions().len()];
        for &(number, answer) in answers {
            let idx = tables
                .question_index(number)
                .ok_or(InputError::UnknownQuestion(number))?;
            if slots[idx].replace(answer).is_some() {
                return Err(InputError::DuplicateAnswer(number));
            }
        }

        let mut out = Vec::with_capacity(slots.len());
        for (slot, q) in slots.into_iter().zip(tables.questions()) {
            out.push(slot.ok_or(InputError::MissingAnswer(q.number))?);
        }

        let unsure = out.iter().filter(|a| !a.is_definite()).count();
        if unsure > max_unsure {
            return Err(InputError::TooManyUnsure {
                count: unsure,
                max: max_unsure,
            });
        }
        Ok(Self { answers: out })
    }

    /// Build from answers already in question declaration order.
    ///
    /// Callers (the Monte Carlo harness) are responsible for the length.
    pub(crate) fn from_ordered(answers: Vec<Answer>) -> Self {
        Self { answers }
    }

    /// Every question answered "unsure".
    pub fn all_unsure(tables: &ConfigTables) -> Self {
        Self {
            answers: vec![Answer::Unsure; tables.questions().len()],
        }
    }

    /// Answers in question declaration order.
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// `(question number, answer)` pairs.
    pub fn pairs(&self, tables: &ConfigTables) -> Vec<(u32, Answer)> {
        tables
            .questions()
            .iter()
            .zip(&self.answers)
            .map(|(q, &a)| (q.number, a))
            .collect()
    }

    pub fn unsure_count(&self) -> usize {
        self.answers.iter().filter(|a| !a.is_definite()).count()
    }

    /// Fraction of definite (yes/no) answers.
    pub fn definite_ratio(&self) -> f64 {
        if self.answers.is_empty() {
            return 1.0;
        }
        (self.answers.len() - self.unsure_count()) as f64 / self.answers.len() as f64
    }
}

/// Adjust the baseline scores of `tables` by `answers`.
///
/// `answers` must cover every clarifying question exactly once; an unknown
/// question number is rejected with [`InputError::UnknownQuestion`]. Any
/// number of "unsure" answers is accepted here (capping them is the job of
/// whoever collects the answers; see [`AnswerSheet::new`]).
pub fn adjust(tables: &ConfigTables, answers: &[(u32, Answer)]) -> Result<ScoreTable> {
    let sheet = AnswerSheet::new(tables, answers, usize::MAX)?;
    Ok(adjust_sheet(tables, &sheet))
}

/// Adjust with an already-validated [`AnswerSheet`].
pub fn adjust_sheet(tables: &ConfigTables, sheet: &AnswerSheet) -> ScoreTable {
    let n_criteria = tables.criteria().len();
    let mut totals = vec![vec![0i32; n_criteria]; tables.schemes().len()];

    for (qi, answer) in sheet.answers().iter().enumerate() {
        let (yes, no) = tables.resolved_deltas(qi);
        let deltas = match answer {
            Answer::Yes => yes.as_slice(),
            Answer::No => no.as_slice(),
            Answer::Unsure => continue,
        };
        for d in deltas {
            totals[d.scheme][d.criterion] += d.delta;
        }
    }

    let baseline = tables.baseline();
    let rows = totals
        .into_iter()
        .enumerate()
        .map(|(si, row)| {
            row.into_iter()
                .enumerate()
                .map(|(ci, total)| clamp_score(i32::from(baseline.get(si, ci)) + total))
                .collect()
        })
        .collect();
    ScoreTable::from_rows(rows)
}

fn clamp_score(raw: i32) -> u8 {
    // Clamped into 1..=6, so the cast is lossless.
    raw.clamp(i32::from(SCORE_MIN), i32::from(SCORE_MAX)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::ScoreDelta;
    use crate::Error;

    fn answers(all: Answer) -> Vec<(u32, Answer)> {
        (1..=9).map(|n| (n, all)).collect()
    }

    fn cell(t: &ConfigTables, table: &ScoreTable, scheme: &str, crit: &str) -> u8 {
        table.get(
            t.scheme_index(scheme).unwrap(),
            t.criterion_index(crit).unwrap(),
        )
    }

    #[test]
    fn all_unsure_leaves_baseline_untouched() {
        let t = ConfigTables::builtin().unwrap();
        let adjusted = adjust(&t, &answers(Answer::Unsure)).unwrap();
        assert_eq!(&adjusted, t.baseline());
    }

    #[test]
    fn yes_applies_yes_deltas() {
        let t = ConfigTables::builtin().unwrap();
        let mut a = answers(Answer::Unsure);
        a[4] = (5, Answer::Yes); // escrow acceptable
        let adjusted = adjust(&t, &a).unwrap();
        assert_eq!(cell(&t, &adjusted, "scheme3", "A"), 5); // 3 + 2
        assert_eq!(cell(&t, &adjusted, "scheme4", "A"), 6); // 5 + 1
        assert_eq!(cell(&t, &adjusted, "scheme1", "A"), 5);
    }

    #[test]
    fn no_applies_no_deltas_only() {
        let t = ConfigTables::builtin().unwrap();
        let adjusted = adjust(&t, &answers(Answer::No)).unwrap();
        // Only the ledger question has a "no" nudge: Blockchain PKI infra +1.
        assert_eq!(cell(&t, &adjusted, "scheme5", "D"), 6);
        let expected = ScoreTable::from_rows(
            t.baseline()
                .rows()
                .enumerate()
                .map(|(si, r)| {
                    let mut r = r.to_vec();
                    if si == 4 {
                        r[3] = 6;
                    }
                    r
                })
                .collect(),
        );
        assert_eq!(adjusted, expected);
    }

    #[test]
    fn deltas_are_summed_before_clamping() {
        // scheme1 Security: baseline 5, Q3 yes -2, Q6 yes +1 → 4.
        let t = ConfigTables::builtin().unwrap();
        let mut a = answers(Answer::Unsure);
        a[2] = (3, Answer::Yes);
        a[5] = (6, Answer::Yes);
        let adjusted = adjust(&t, &a).unwrap();
        assert_eq!(cell(&t, &adjusted, "scheme1", "A"), 4);

        // scheme1 Maturity: baseline 6, Q2 yes +1, Q3 yes -1. Clamping after
        // each question would give 6 → 6 → 5; summing first gives 6.
        let mut src = t.to_source();
        src.questions[2].yes.push(ScoreDelta::new("scheme1", "C", -1));
        let t = ConfigTables::new(src).unwrap();
        let mut a = answers(Answer::Unsure);
        a[1] = (2, Answer::Yes);
        a[2] = (3, Answer::Yes);
        let adjusted = adjust(&t, &a).unwrap();
        assert_eq!(cell(&t, &adjusted, "scheme1", "C"), 6);
    }

    #[test]
    fn large_deltas_are_clamped() {
        let mut src = ConfigTables::builtin().unwrap().to_source();
        src.questions[0].yes.push(ScoreDelta::new("scheme2", "B", 40));
        src.questions[1].yes.push(ScoreDelta::new("scheme2", "D", -40));
        let t = ConfigTables::new(src).unwrap();
        let adjusted = adjust(&t, &answers(Answer::Yes)).unwrap();
        assert_eq!(cell(&t, &adjusted, "scheme2", "B"), SCORE_MAX);
        assert_eq!(cell(&t, &adjusted, "scheme2", "D"), SCORE_MIN);
    }

    #[test]
    fn unknown_question_is_rejected() {
        let t = ConfigTables::builtin().unwrap();
        let mut a = answers(Answer::Yes);
        a.push((10, Answer::Yes));
        assert_eq!(
            adjust(&t, &a).unwrap_err(),
            Error::InvalidInput(InputError::UnknownQuestion(10))
        );
    }

    #[test]
    fn missing_and_duplicate_answers_are_rejected() {
        let t = ConfigTables::builtin().unwrap();
        let mut a = answers(Answer::Yes);
        a.pop();
        assert_eq!(
            adjust(&t, &a).unwrap_err(),
            Error::InvalidInput(InputError::MissingAnswer(9))
        );
        a.push((1, Answer::No));
        assert_eq!(
            adjust(&t, &a).unwrap_err(),
            Error::InvalidInput(InputError::DuplicateAnswer(1))
        );
    }

    #[test]
    fn adjust_accepts_any_number_of_unsure() {
        let t = ConfigTables::builtin().unwrap();
        assert!(adjust(&t, &answers(Answer::Unsure)).is_ok());
    }

    #[test]
    fn sheet_caps_unsure_answers() {
        let t = ConfigTables::builtin().unwrap();
        let mut a = answers(Answer::Yes);
        a[0].1 = Answer::Unsure;
        a[1].1 = Answer::Unsure;
        let sheet = AnswerSheet::new(&t, &a, MAX_UNSURE).unwrap();
        assert_eq!(sheet.unsure_count(), 2);
        assert!(sheet.definite_ratio() >= 0.77);

        a[2].1 = Answer::Unsure;
        assert_eq!(
            AnswerSheet::new(&t, &a, MAX_UNSURE).unwrap_err(),
            InputError::TooManyUnsure { count: 3, max: 2 }
        );
    }

    #[test]
    fn sheet_ignores_input_order() {
        let t = ConfigTables::builtin().unwrap();
        let mut a = answers(Answer::No);
        a[3].1 = Answer::Yes;
        let mut reversed = a.clone();
        reversed.reverse();
        let s1 = AnswerSheet::new(&t, &a, MAX_UNSURE).unwrap();
        let s2 = AnswerSheet::new(&t, &reversed, MAX_UNSURE).unwrap();
        assert_eq!(s1, s2);
        assert_eq!(s1.pairs(&t), a);
    }
}
