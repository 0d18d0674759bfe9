//! The fixed growth-stage table.
//!
//! Ten stages with strictly increasing task thresholds; the first
//! threshold is zero so every count maps to a stage. The garden's stage
//! is always derived from the cumulative completed-task count through
//! this table, never stored independently.

/// One entry of the growth table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthStage {
    /// Position in the table, 0 through 9.
    pub index: u8,
    pub name: &'static str,
    /// Cumulative completed tasks needed to reach this stage.
    pub tasks_required: u32,
}

const STAGES: [GrowthStage; 10] = [
    GrowthStage { index: 0, name: "Seed", tasks_required: 0 },
    GrowthStage { index: 1, name: "Sprout", tasks_required: 5 },
    GrowthStage { index: 2, name: "Seedling", tasks_required: 15 },
    GrowthStage { index: 3, name: "Sapling", tasks_required: 30 },
    GrowthStage { index: 4, name: "Young Tree", tasks_required: 50 },
    GrowthStage { index: 5, name: "Mature Tree", tasks_required: 100 },
    GrowthStage { index: 6, name: "Flowering", tasks_required: 150 },
    GrowthStage { index: 7, name: "Fruiting", tasks_required: 250 },
    GrowthStage { index: 8, name: "Flourishing", tasks_required: 365 },
    GrowthStage { index: 9, name: "Ancient", tasks_required: 500 },
];

/// The full table, ascending.
pub fn table() -> &'static [GrowthStage] {
    &STAGES
}

/// The highest stage whose threshold is at or below `task_count`.
pub fn from_task_count(task_count: u32) -> GrowthStage {
    STAGES
        .iter()
        .rev()
        .find(|stage| stage.tasks_required <= task_count)
        .copied()
        // Stage 0 has threshold 0, so the search always succeeds.
        .unwrap_or(STAGES[0])
}

/// Percentage progress from the current stage toward the next, 0-100.
/// The final stage reports 100: there is nothing left to grow toward.
pub fn progress_to_next(task_count: u32) -> u8 {
    let current = from_task_count(task_count);
    let Some(next) = STAGES.get(usize::from(current.index) + 1) else {
        return 100;
    };
    let span = next.tasks_required - current.tasks_required;
    let done = task_count - current.tasks_required;
    ((u64::from(done) * 100) / u64::from(span)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn table_is_strictly_increasing_from_zero() {
        assert_eq!(STAGES.len(), 10);
        assert_eq!(STAGES[0].tasks_required, 0);
        for pair in STAGES.windows(2) {
            assert!(pair[0].tasks_required < pair[1].tasks_required);
        }
        for (position, stage) in STAGES.iter().enumerate() {
            assert_eq!(usize::from(stage.index), position);
        }
    }

    #[test_case(0, 0; "empty garden")]
    #[test_case(4, 0; "one short of sprouting")]
    #[test_case(5, 1; "exactly at a threshold")]
    #[test_case(14, 1)]
    #[test_case(100, 5)]
    #[test_case(499, 8)]
    #[test_case(500, 9)]
    #[test_case(u32::MAX, 9; "far past the table")]
    fn stage_lookup(task_count: u32, expected_index: u8) {
        assert_eq!(from_task_count(task_count).index, expected_index);
    }

    #[test]
    fn stage_is_monotonic_in_task_count() {
        let mut previous = 0u8;
        for count in 0..600 {
            let index = from_task_count(count).index;
            assert!(index >= previous, "stage regressed at count {count}");
            previous = index;
        }
    }

    #[test_case(0, 0; "at a threshold")]
    #[test_case(1, 20; "one fifth toward sprout")]
    #[test_case(4, 80)]
    #[test_case(5, 0; "fresh stage starts at zero")]
    #[test_case(10, 50; "halfway from 5 to 15")]
    #[test_case(500, 100; "final stage is complete")]
    #[test_case(1_000, 100)]
    fn progress_interpolates_linearly(task_count: u32, expected: u8) {
        assert_eq!(progress_to_next(task_count), expected);
    }
}
