//! Organizational context → weighting profile.
//!
//! Three yes/no facts about the organization pick exactly one of the four
//! weighting profiles:
//!
//! | staff | scale | regulated | profile |
//! |-------|-------|-----------|---------|
//! | no    | no    | no        | 0       |
//! | yes   | no    | no        | 1       |
//! | any   | yes   | no        | 2       |
//! | any   | any   | yes       | 3       |
//!
//! Regulation dominates, then scale. If each fact is an independent coin with
//! `P(yes) = p`, profile usage is `(1-p)^3`, `p(1-p)^2`, `p(1-p)`, `p`, which
//! for a fair coin is 12.5% / 12.5% / 25% / 50%.

use crate::error::InputError;
use crate::tables::{ConfigTables, WeightingProfile, PROFILE_COUNT};

/// Yes/no answers about the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrganizationContext {
    /// Dedicated IT personnel can operate and maintain a complex key infrastructure.
    pub dedicated_it_staff: bool,
    /// Must support more than 10,000 users or 10,000 authorizations per minute.
    pub large_scale: bool,
    /// Highly-regulated industry with statutory information-processing requirements.
    pub regulated: bool,
}

impl OrganizationContext {
    /// Index (into [`ConfigTables::profiles`]) of the profile this context selects.
    pub fn profile_index(self) -> usize {
        if self.regulated {
            3
        } else if self.large_scale {
            2
        } else if self.dedicated_it_staff {
            1
        } else {
            0
        }
    }

    /// The profile this context selects from `tables`.
    pub fn select_profile(self, tables: &ConfigTables) -> &WeightingProfile {
        // `ConfigTables` guarantees exactly PROFILE_COUNT profiles.
        &tables.profiles()[self.profile_index()]
    }
}

/// Expected profile-usage frequencies when every context fact is an
/// independent coin with `P(yes) = p_yes`.
pub fn expected_profile_usage(p_yes: f64) -> Result<[f64; PROFILE_COUNT], InputError> {
    if !p_yes.is_finite() || !(0.0..=1.0).contains(&p_yes) {
        return Err(InputError::InvalidProbability {
            name: "context_yes_probability",
            value: p_yes,
        });
    }
    let q = 1.0 - p_yes;
    Ok([q * q * q, p_yes * q * q, p_yes * q, p_yes])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(staff: bool, scale: bool, regulated: bool) -> OrganizationContext {
        OrganizationContext {
            dedicated_it_staff: staff,
            large_scale: scale,
            regulated,
        }
    }

    #[test]
    fn mapping_covers_all_eight_contexts() {
        let mut counts = [0usize; PROFILE_COUNT];
        for bits in 0u8..8 {
            let c = ctx(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0);
            counts[c.profile_index()] += 1;
        }
        assert_eq!(counts, [1, 1, 2, 4]);
    }

    #[test]
    fn specific_rows() {
        assert_eq!(ctx(false, false, false).profile_index(), 0);
        assert_eq!(ctx(true, false, false).profile_index(), 1);
        assert_eq!(ctx(false, true, false).profile_index(), 2);
        assert_eq!(ctx(true, true, false).profile_index(), 2);
        assert_eq!(ctx(false, false, true).profile_index(), 3);
        assert_eq!(ctx(true, true, true).profile_index(), 3);
    }

    #[test]
    fn fair_coin_usage_is_documented_split() {
        let u = expected_profile_usage(0.5).unwrap();
        assert_eq!(u, [0.125, 0.125, 0.25, 0.5]);
    }

    #[test]
    fn usage_is_a_distribution() {
        for p in [0.0, 0.1, 0.33, 0.9, 1.0] {
            let s: f64 = expected_profile_usage(p).unwrap().iter().sum();
            assert!((s - 1.0).abs() < 1e-12, "p={p} sum={s}");
        }
        assert!(expected_profile_usage(1.5).is_err());
        assert!(expected_profile_usage(f64::NAN).is_err());
    }

    #[test]
    fn select_profile_reads_from_tables() {
        let t = ConfigTables::builtin().unwrap();
        assert_eq!(ctx(true, false, true).select_profile(&t).id, "weighting3");
        assert_eq!(OrganizationContext::default().select_profile(&t).id, "weighting0");
    }
}
