//! End-to-end assessment: ranking + profile choice + answers → recommendation.
//!
//! This is the typed call an interactive front-end makes once it has
//! collected everything from the user. It validates the whole input up front,
//! then runs adjustment and scoring.

use std::collections::BTreeMap;

use crate::adjust::{adjust_sheet, Answer, AnswerSheet, MAX_UNSURE};
use crate::context::OrganizationContext;
use crate::error::Result;
use crate::score::{rank_unchecked, CriteriaRanking, RankedResult, RankedScheme};
use crate::tables::{ConfigTables, ScoreTable, WeightingProfile};

/// How the weighting profile is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProfileChoice {
    /// Derive it from organizational context.
    Context(OrganizationContext),
    /// Use the profile with this id.
    Explicit(String),
}

/// Everything collected from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssessmentInput {
    pub ranking: CriteriaRanking,
    pub profile: ProfileChoice,
    pub answers: Vec<(u32, Answer)>,
}

/// Runs assessments against one set of tables.
#[derive(Debug, Clone, Copy)]
pub struct Assessment<'t> {
    tables: &'t ConfigTables,
    max_unsure: usize,
}

impl<'t> Assessment<'t> {
    /// Assessment with the default "unsure" cap ([`MAX_UNSURE`]).
    pub fn new(tables: &'t ConfigTables) -> Self {
        Self {
            tables,
            max_unsure: MAX_UNSURE,
        }
    }

    /// Override the "unsure" cap.
    pub fn with_max_unsure(mut self, max_unsure: usize) -> Self {
        self.max_unsure = max_unsure;
        self
    }

    pub fn tables(&self) -> &'t ConfigTables {
        self.tables
    }

    /// Resolve `choice` to a profile in the tables.
    pub fn resolve_profile(&self, choice: &ProfileChoice) -> Result<&'t WeightingProfile> {
        match choice {
            ProfileChoice::Context(ctx) => Ok(ctx.select_profile(self.tables)),
            ProfileChoice::Explicit(id) => Ok(self.tables.profile(id)?),
        }
    }

    /// Validate `input` and produce the ranked recommendation.
    pub fn evaluate(&self, input: &AssessmentInput) -> Result<AssessmentOutcome> {
        input.ranking.check(self.tables)?;
        let profile = self.resolve_profile(&input.profile)?;
        let sheet = AnswerSheet::new(self.tables, &input.answers, self.max_unsure)?;

        let adjusted = adjust_sheet(self.tables, &sheet);
        let result = rank_unchecked(self.tables, &adjusted, profile);

        if let Some(top) = result.top() {
            tracing::debug!(
                profile = %profile.id,
                recommended = %top.scheme,
                score = top.score,
                unsure = sheet.unsure_count(),
                "assessment evaluated"
            );
        }

        let context = match input.profile {
            ProfileChoice::Context(ctx) => Some(ctx),
            ProfileChoice::Explicit(_) => None,
        };
        Ok(AssessmentOutcome {
            ranking: input.ranking.clone(),
            context,
            answers: sheet,
            adjusted,
            result,
        })
    }
}

/// Result of one assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentOutcome {
    pub ranking: CriteriaRanking,
    /// Set when the profile came from organizational context.
    pub context: Option<OrganizationContext>,
    pub answers: AnswerSheet,
    pub adjusted: ScoreTable,
    pub result: RankedResult,
}

impl AssessmentOutcome {
    /// The top-ranked scheme.
    pub fn recommended(&self) -> Option<&RankedScheme> {
        self.result.top()
    }

    /// Id of the weighting profile that was used.
    pub fn profile(&self) -> &str {
        &self.result.profile
    }

    /// Flatten into a serializable record.
    pub fn export(&self, tables: &ConfigTables) -> AssessmentExport {
        let final_scores = self
            .result
            .iter()
            .map(|e| {
                let adjusted_scores = tables
                    .criteria()
                    .iter()
                    .zip(self.adjusted.row(e.index))
                    .map(|(c, &s)| (c.code.clone(), s))
                    .collect();
                (
                    e.scheme.clone(),
                    SchemeExport {
                        name: e.name.clone(),
                        adjusted_scores,
                        weighted_score: e.score,
                    },
                )
            })
            .collect();

        AssessmentExport {
            criteria_rankings: self.ranking.ranks().clone(),
            selected_weighting: self.result.profile.clone(),
            context: self.context,
            answers: self.answers.pairs(tables).into_iter().collect(),
            final_scores,
            ranking: self.result.order().into_iter().map(str::to_string).collect(),
            recommended: self.recommended().map(|e| e.scheme.clone()),
        }
    }
}

/// Per-scheme part of an [`AssessmentExport`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemeExport {
    pub name: String,
    pub adjusted_scores: BTreeMap<String, u8>,
    pub weighted_score: f64,
}

/// Serializable record of an assessment (plain maps, strings and numbers).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssessmentExport {
    pub criteria_rankings: BTreeMap<String, u8>,
    pub selected_weighting: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub context: Option<OrganizationContext>,
    pub answers: BTreeMap<u32, Answer>,
    /// Scheme id → scores.
    pub final_scores: BTreeMap<String, SchemeExport>,
    /// Scheme ids, best first.
    pub ranking: Vec<String>,
    pub recommended: Option<String>,
}
