//! Built-in reference data for the dKI assessment.
//!
//! Six schemes, five criteria (three positive, two complexity criteria that
//! are negative), four weighting profiles keyed to organizational context, and
//! nine clarifying questions.
//!
//! The numbers are a synthetic reference set, not published ratings. They were
//! tuned so that, under the default Monte Carlo answer model, every scheme
//! wins a non-trivial share of trials (the smallest share is roughly 5%).

use std::collections::BTreeMap;

use crate::error::Result;
use crate::tables::{
    ClarifyingQuestion, ConfigTables, Criterion, Polarity, ScoreDelta, Scheme, TableSource,
    WeightingProfile,
};

const SCHEMES: [(&str, &str); 6] = [
    ("scheme1", "PKI-CA"),
    ("scheme2", "Web of Trust"),
    ("scheme3", "Identity-Based Encryption"),
    ("scheme4", "Certificateless PKC"),
    ("scheme5", "Blockchain PKI"),
    ("scheme6", "Self-Sovereign Identity"),
];

const CRITERIA: [(&str, &str, Polarity); 5] = [
    ("A", "Security", Polarity::Positive),
    ("B", "Performance and scalability", Polarity::Positive),
    ("C", "Maturity and standardization", Polarity::Positive),
    ("D", "Infrastructure complexity", Polarity::Negative),
    ("E", "Operations and maintenance complexity", Polarity::Negative),
];

// Columns follow CRITERIA order.
const BASELINE: [[u8; 5]; 6] = [
    [5, 4, 6, 5, 5],
    [3, 3, 4, 2, 3],
    [3, 5, 3, 3, 3],
    [5, 4, 2, 3, 3],
    [5, 3, 2, 5, 4],
    [4, 3, 2, 4, 3],
];

const PROFILES: [(&str, &str, [f64; 5]); 4] = [
    ("weighting0", "Limited in-house capability", [1.0, 1.0, 1.0, 3.0, 3.0]),
    ("weighting1", "Dedicated IT staff", [2.0, 1.0, 1.0, 1.0, 1.0]),
    ("weighting2", "High scale", [1.0, 3.0, 1.0, 1.0, 1.0]),
    ("weighting3", "Regulated industry", [3.0, 1.0, 2.0, 1.0, 1.0]),
];

type Nudge = (&'static str, &'static str, i32);

const QUESTIONS: [(&str, &[Nudge], &[Nudge]); 9] = [
    (
        "Relying parties must be able to verify keys offline, without contacting a central service.",
        &[("scheme1", "B", 1), ("scheme4", "B", -1), ("scheme5", "B", -1), ("scheme6", "B", -1)],
        &[],
    ),
    (
        "The system must interoperate with existing X.509 / TLS tooling.",
        &[("scheme1", "C", 1), ("scheme2", "C", -1), ("scheme5", "C", -1), ("scheme6", "C", -1)],
        &[],
    ),
    (
        "There is no single party that every participant is willing to trust.",
        &[
            ("scheme2", "A", 1),
            ("scheme5", "A", 1),
            ("scheme6", "A", 1),
            ("scheme1", "A", -2),
            ("scheme3", "A", -1),
            ("scheme4", "A", -1),
        ],
        &[],
    ),
    (
        "Senders must be able to encrypt to recipients who have not yet enrolled.",
        &[("scheme3", "B", 1), ("scheme4", "B", 1), ("scheme3", "E", -1)],
        &[],
    ),
    (
        "A trusted authority holding (or able to recover) private keys is acceptable.",
        &[("scheme3", "A", 2), ("scheme4", "A", 1)],
        &[],
    ),
    (
        "Compromised keys must be revocable immediately and globally.",
        &[("scheme1", "A", 1), ("scheme5", "A", 1), ("scheme2", "A", -2), ("scheme3", "A", -1)],
        &[],
    ),
    (
        "Participants will hold their own credentials in user-controlled wallets.",
        &[("scheme6", "C", 2), ("scheme6", "E", -1)],
        &[],
    ),
    (
        "Many participants are resource-constrained devices (IoT, smart cards).",
        &[("scheme3", "B", 1), ("scheme4", "B", 2), ("scheme5", "B", -2), ("scheme1", "B", -1)],
        &[],
    ),
    (
        "The participating organizations already operate a shared distributed ledger.",
        &[("scheme5", "D", -3), ("scheme5", "E", -2), ("scheme6", "D", -1)],
        &[("scheme5", "D", 1)],
    ),
];

fn deltas(nudges: &[Nudge]) -> Vec<ScoreDelta> {
    nudges
        .iter()
        .map(|&(scheme, criterion, delta)| ScoreDelta::new(scheme, criterion, delta))
        .collect()
}

/// Raw built-in tables, before validation.
pub fn builtin_source() -> TableSource {
    let schemes = SCHEMES
        .iter()
        .map(|&(id, name)| Scheme {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect();
    let criteria = CRITERIA
        .iter()
        .map(|&(code, name, polarity)| Criterion {
            code: code.to_string(),
            name: name.to_string(),
            polarity,
        })
        .collect();
    let profiles = PROFILES
        .iter()
        .map(|&(id, name, w)| WeightingProfile {
            id: id.to_string(),
            name: name.to_string(),
            weights: CRITERIA
                .iter()
                .zip(w)
                .map(|(&(code, _, _), w)| (code.to_string(), w))
                .collect(),
        })
        .collect();
    let baseline = SCHEMES
        .iter()
        .zip(BASELINE)
        .map(|(&(id, _), row)| {
            let row: BTreeMap<String, u8> = CRITERIA
                .iter()
                .zip(row)
                .map(|(&(code, _, _), s)| (code.to_string(), s))
                .collect();
            (id.to_string(), row)
        })
        .collect();
    let questions = QUESTIONS
        .iter()
        .zip(1u32..)
        .map(|(&(text, yes, no), number)| ClarifyingQuestion {
            number,
            text: text.to_string(),
            yes: deltas(yes),
            no: deltas(no),
        })
        .collect();

    TableSource {
        schemes,
        criteria,
        profiles,
        baseline,
        questions,
    }
}

impl ConfigTables {
    /// The built-in dKI tables, validated like any loaded set.
    pub fn builtin() -> Result<Self> {
        ConfigTables::new(builtin_source())
    }
}
