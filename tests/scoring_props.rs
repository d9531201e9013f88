//! Property tests for the adjustment and scoring contracts.
//!
//! 1. All-"unsure" answers leave every baseline score untouched.
//! 2. Adjusted scores stay in `[1, 6]` however large the summed deltas are.
//! 3. Final scores do not depend on the order criteria are declared in.
//! 4. Re-scoring under different profiles never changes the adjusted table.
//! 5. A scheme that dominates another on every criterion never scores lower.

use dki_mcda::{
    adjust, builtin_source, score, Answer, ConfigTables, CriteriaRanking, Polarity, ScoreDelta,
    TableSource, WeightingProfile, SCORE_MAX, SCORE_MIN,
};
use proptest::prelude::*;

const SCHEMES: [&str; 6] = ["scheme1", "scheme2", "scheme3", "scheme4", "scheme5", "scheme6"];
const CRITERIA: [&str; 5] = ["A", "B", "C", "D", "E"];

fn with_baseline(mut src: TableSource, cells: &[u8]) -> TableSource {
    for (si, scheme) in SCHEMES.iter().enumerate() {
        let row = src.baseline.get_mut(*scheme).unwrap();
        for (ci, crit) in CRITERIA.iter().enumerate() {
            row.insert(crit.to_string(), cells[si * 5 + ci]);
        }
    }
    src
}

fn profile(id: &str, weights: &[f64]) -> WeightingProfile {
    WeightingProfile {
        id: id.to_string(),
        name: id.to_string(),
        weights: CRITERIA
            .iter()
            .zip(weights)
            .map(|(c, &w)| (c.to_string(), w))
            .collect(),
    }
}

fn arb_answer() -> impl Strategy<Value = Answer> {
    prop_oneof![Just(Answer::Yes), Just(Answer::No), Just(Answer::Unsure)]
}

fn arb_answers() -> impl Strategy<Value = Vec<(u32, Answer)>> {
    prop::collection::vec(arb_answer(), 9)
        .prop_map(|v| v.into_iter().zip(1u32..).map(|(a, n)| (n, a)).collect())
}

fn arb_baseline() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(SCORE_MIN..=SCORE_MAX, 30)
}

fn arb_weights() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0u8..10).prop_map(f64::from), 5)
}

/// Extra (question, scheme, criterion, delta, on_yes) nudges, some huge.
fn arb_extra_deltas() -> impl Strategy<Value = Vec<(usize, usize, usize, i32, bool)>> {
    prop::collection::vec(
        (0usize..9, 0usize..6, 0usize..5, -25i32..=25, any::<bool>()),
        0..40,
    )
}

fn all_unsure() -> Vec<(u32, Answer)> {
    (1..=9).map(|n| (n, Answer::Unsure)).collect()
}

proptest! {
    #[test]
    fn all_unsure_is_the_identity(cells in arb_baseline()) {
        let t = ConfigTables::new(with_baseline(builtin_source(), &cells)).unwrap();
        let adjusted = adjust(&t, &all_unsure()).unwrap();
        prop_assert_eq!(&adjusted, t.baseline());
    }

    #[test]
    fn adjusted_scores_stay_in_range(
        cells in arb_baseline(),
        extra in arb_extra_deltas(),
        answers in arb_answers(),
    ) {
        let mut src = with_baseline(builtin_source(), &cells);
        for (q, s, c, d, on_yes) in extra {
            let delta = ScoreDelta::new(SCHEMES[s], CRITERIA[c], d);
            if on_yes {
                src.questions[q].yes.push(delta);
            } else {
                src.questions[q].no.push(delta);
            }
        }
        let t = ConfigTables::new(src).unwrap();
        let adjusted = adjust(&t, &answers).unwrap();
        for row in adjusted.rows() {
            for &v in row {
                prop_assert!((SCORE_MIN..=SCORE_MAX).contains(&v), "score {} out of range", v);
            }
        }
    }

    #[test]
    fn criterion_order_does_not_change_scores(
        cells in arb_baseline(),
        answers in arb_answers(),
        weights in arb_weights(),
        perm in Just((0usize..5).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let src = with_baseline(builtin_source(), &cells);
        let mut permuted = src.clone();
        permuted.criteria = perm.iter().map(|&i| src.criteria[i].clone()).collect();

        let t1 = ConfigTables::new(src).unwrap();
        let t2 = ConfigTables::new(permuted).unwrap();
        let p = profile("custom", &weights);

        let a1 = adjust(&t1, &answers).unwrap();
        let a2 = adjust(&t2, &answers).unwrap();
        let r1 = score(&t1, &a1, &CriteriaRanking::identity(&t1), &p).unwrap();
        let r2 = score(&t2, &a2, &CriteriaRanking::identity(&t2), &p).unwrap();
        prop_assert_eq!(r1.scores(), r2.scores());
        prop_assert_eq!(r1.order(), r2.order());
    }

    #[test]
    fn rescoring_does_not_mutate_adjusted(
        answers in arb_answers(),
        w1 in arb_weights(),
        w2 in arb_weights(),
    ) {
        let t = ConfigTables::builtin().unwrap();
        let adjusted = adjust(&t, &answers).unwrap();
        let snapshot = adjusted.clone();
        let ranking = CriteriaRanking::identity(&t);

        let a = score(&t, &adjusted, &ranking, &profile("p1", &w1)).unwrap();
        let _ = score(&t, &adjusted, &ranking, &profile("p2", &w2)).unwrap();
        let again = score(&t, &adjusted, &ranking, &profile("p1", &w1)).unwrap();

        prop_assert_eq!(&adjusted, &snapshot);
        prop_assert_eq!(a, again);
    }

    #[test]
    fn dominating_scheme_never_scores_lower(
        a_row in prop::collection::vec(SCORE_MIN..=SCORE_MAX, 5),
        gaps in prop::collection::vec(0u8..6, 5),
        weights in prop::collection::vec(0.0f64..10.0, 5),
    ) {
        // Build B from A: worse on positive criteria, more complex on negative ones.
        let mut src = builtin_source();
        let polarities: Vec<Polarity> = src.criteria.iter().map(|c| c.polarity).collect();
        let b_row: Vec<u8> = a_row
            .iter()
            .zip(&gaps)
            .zip(&polarities)
            .map(|((&a, &g), p)| match p {
                Polarity::Positive => a.saturating_sub(g).max(SCORE_MIN),
                Polarity::Negative => a.saturating_add(g).min(SCORE_MAX),
            })
            .collect();
        for (ci, crit) in CRITERIA.iter().enumerate() {
            src.baseline.get_mut("scheme1").unwrap().insert(crit.to_string(), a_row[ci]);
            src.baseline.get_mut("scheme2").unwrap().insert(crit.to_string(), b_row[ci]);
        }
        let t = ConfigTables::new(src).unwrap();
        let adjusted = adjust(&t, &all_unsure()).unwrap();
        let ranking = CriteriaRanking::identity(&t);
        let r = score(&t, &adjusted, &ranking, &profile("w", &weights)).unwrap();

        let a = r.score_of("scheme1").unwrap();
        let b = r.score_of("scheme2").unwrap();
        prop_assert!(a >= b - 1e-9, "A={} B={}", a, b);
        if a == b {
            // Equal scores: declaration order puts scheme1 first.
            prop_assert!(r.position("scheme1") < r.position("scheme2"));
        }
    }

    #[test]
    fn any_valid_permutation_is_accepted(
        perm in Just(vec![1u8, 2, 3, 4, 5]).prop_shuffle(),
    ) {
        let t = ConfigTables::builtin().unwrap();
        let ranking = CriteriaRanking::from_pairs(CRITERIA.iter().copied().zip(perm));
        prop_assert!(score(&t, t.baseline(), &ranking, &t.profiles()[0]).is_ok());
    }
}

#[test]
fn pki_ca_worked_example_scores_sixteen() {
    // Security 5, Performance 4, Maturity 6, infrastructure 2, O&M 2,
    // weights Security 2, others 1: 5*2 + 4 + 6 - 2 - 2 = 16.
    let mut src = builtin_source();
    let row = src.baseline.get_mut("scheme1").unwrap();
    for (crit, v) in CRITERIA.iter().zip([5u8, 4, 6, 2, 2]) {
        row.insert(crit.to_string(), v);
    }
    let t = ConfigTables::new(src).unwrap();
    let adjusted = adjust(&t, &all_unsure()).unwrap();
    let p = profile("example", &[2.0, 1.0, 1.0, 1.0, 1.0]);
    let r = score(&t, &adjusted, &CriteriaRanking::identity(&t), &p).unwrap();

    assert_eq!(r.score_of("scheme1"), Some(16.0));
    assert_eq!(r.top().unwrap().name, "PKI-CA");
}
