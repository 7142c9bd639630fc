//! Year-indexed premine activation schedule.

use crate::is_forked;
use std::collections::BTreeMap;

/// Block heights at which each premine year begins, plus the block at which premine
/// allocation stops for good.
///
/// The schedule is carried as chain configuration. Block finalization does not consult it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PremineSchedule {
    /// Start block per calendar year.
    pub starts: BTreeMap<u16, u64>,
    /// Block from which no premine year is active anymore.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub end: Option<u64>,
}

impl PremineSchedule {
    /// Returns the configured start block of `year`, if any.
    pub fn start_of(&self, year: u16) -> Option<u64> {
        self.starts.get(&year).copied()
    }

    /// Returns whether the premine period of `year` has started at block `number`.
    pub fn is_started(&self, year: u16, number: u64) -> bool {
        is_forked(self.start_of(year), number)
    }

    /// Returns whether premine allocation has ended at block `number`.
    pub const fn is_ended(&self, number: u64) -> bool {
        is_forked(self.end, number)
    }

    /// Returns the premine year in effect at block `number`: the started year with the
    /// highest start block, or `None` before the first year or once the schedule ended.
    pub fn active_year(&self, number: u64) -> Option<u16> {
        if self.is_ended(number) {
            return None;
        }
        self.starts
            .iter()
            .filter(|(_, start)| **start <= number)
            .max_by_key(|(_, start)| **start)
            .map(|(year, _)| *year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn schedule() -> PremineSchedule {
        PremineSchedule {
            starts: BTreeMap::from([(2019, 50), (2020, 613_788), (2021, 2_788_684)]),
            end: Some(3_000_000),
        }
    }

    #[rstest]
    #[case(0, None)]
    #[case(49, None)]
    #[case(50, Some(2019))]
    #[case(613_787, Some(2019))]
    #[case(613_788, Some(2020))]
    #[case(2_999_999, Some(2021))]
    #[case(3_000_000, None)]
    fn test_active_year(#[case] number: u64, #[case] expected: Option<u16>) {
        assert_eq!(schedule().active_year(number), expected);
    }

    #[test]
    fn test_is_started() {
        let schedule = schedule();
        assert!(schedule.is_started(2019, 50));
        assert!(!schedule.is_started(2020, 50));
        assert!(!schedule.is_started(2030, u64::MAX));
    }
}
