//! `dki_mcda`: a multi-criteria decision aid for choosing a digital key
//! infrastructure (dKI) scheme.
//!
//! Six candidate schemes (CA-based PKI, web of trust, identity-based
//! encryption, certificateless PKC, blockchain PKI, self-sovereign identity)
//! are ranked over five criteria. Three criteria are desirable (security,
//! performance, maturity) and two are complexity costs. This crate is a
//! recommendation calculator over static metadata; it implements none of the
//! schemes.
//!
//! **Pipeline:**
//! - [`ConfigTables`]: validated, immutable reference data, built once
//!   ([`ConfigTables::builtin`] or [`ConfigTables::new`]) and passed by `&`.
//! - [`adjust`] / [`adjust_sheet`]: yes/no/unsure answers to nine clarifying
//!   questions nudge the baseline scores; deltas are summed, then clamped to `[1, 6]`.
//! - [`score`]: `Σ adjusted × weight × direction` per scheme, sorted descending,
//!   ties in scheme declaration order.
//! - [`OrganizationContext`]: three yes/no facts pick one of four weighting profiles.
//! - [`Assessment`]: validates a full user input and runs the pipeline, with a
//!   serializable [`AssessmentExport`].
//! - [`MonteCarlo`] / [`simulate`]: seeded synthetic respondents through the
//!   same pipeline, aggregated into a [`SimulationReport`] (wins per scheme,
//!   observed vs expected profile usage, every-scheme-selected flag).
//!
//! **Goals:**
//! - **Pure**: no I/O and no shared mutable state on the scoring path.
//! - **Deterministic**: same tables + inputs → same ranking; same seed → same report.
//! - **Loud on bad input**: [`Error::InvalidInput`] for malformed caller data,
//!   [`Error::Configuration`] for inconsistent tables.
//!
//! **Non-goals:**
//! - No prompting, HTML front-end, or file loading. Those wrap this crate.
//!
//! ```rust
//! use dki_mcda::{adjust, score, Answer, ConfigTables, CriteriaRanking};
//!
//! let tables = ConfigTables::builtin().unwrap();
//! let answers: Vec<(u32, Answer)> = (1..=9).map(|q| (q, Answer::Unsure)).collect();
//! let adjusted = adjust(&tables, &answers).unwrap();
//! let ranking = CriteriaRanking::identity(&tables);
//! let profile = tables.profile("weighting3").unwrap();
//! let result = score(&tables, &adjusted, &ranking, profile).unwrap();
//! assert_eq!(result.top().unwrap().name, "PKI-CA");
//! ```

#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod tables;
pub use tables::*;

mod builtin;
pub use builtin::builtin_source;

mod context;
pub use context::*;

mod adjust;
pub use adjust::*;

mod score;
pub use score::*;

mod stats;
pub use stats::*;

mod assessment;
pub use assessment::*;

mod montecarlo;
pub use montecarlo::*;
