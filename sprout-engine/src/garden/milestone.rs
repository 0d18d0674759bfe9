//! Streak milestones eligible for a celebration.
//!
//! The set is fixed. A milestone fires only when the streak lands on the
//! value exactly — a streak jumping past one (via external state edits)
//! celebrates nothing, and callers only consult [`just_reached`] after a
//! genuine increment, so each value fires at most once per calendar day.

pub const MILESTONES: [u32; 4] = [7, 30, 100, 365];

/// The milestone the streak just landed on, if any.
pub fn just_reached(streak: u32) -> Option<u32> {
    MILESTONES.iter().copied().find(|&m| m == streak)
}

/// The smallest milestone strictly ahead of the streak. `None` once the
/// last one is reached.
pub fn next_after(streak: u32) -> Option<u32> {
    MILESTONES.iter().copied().find(|&m| m > streak)
}

/// Every milestone the longest streak has covered, ascending.
pub fn achieved(longest_streak: u32) -> Vec<u32> {
    MILESTONES
        .iter()
        .copied()
        .filter(|&m| m <= longest_streak)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(6, None)]
    #[test_case(7, Some(7))]
    #[test_case(8, None)]
    #[test_case(29, None; "one short is not a milestone")]
    #[test_case(30, Some(30))]
    #[test_case(100, Some(100))]
    #[test_case(365, Some(365))]
    #[test_case(366, None)]
    fn landing_exactly_on_a_value(streak: u32, expected: Option<u32>) {
        assert_eq!(just_reached(streak), expected);
    }

    #[test_case(0, Some(7))]
    #[test_case(7, Some(30); "at a milestone the next one is ahead")]
    #[test_case(29, Some(30))]
    #[test_case(364, Some(365))]
    #[test_case(365, None)]
    #[test_case(1_000, None)]
    fn next_upcoming(streak: u32, expected: Option<u32>) {
        assert_eq!(next_after(streak), expected);
    }

    #[test]
    fn achieved_is_ascending_and_inclusive() {
        assert_eq!(achieved(0), Vec::<u32>::new());
        assert_eq!(achieved(7), vec![7]);
        assert_eq!(achieved(99), vec![7, 30]);
        assert_eq!(achieved(365), vec![7, 30, 100, 365]);
    }
}
