#![allow(dead_code)]

use proptest::prelude::*;

use super::mock_driver::Script;

/// Outcome scripted for one step in a generated plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Complete,
    Fail,
    Error,
    DropHandle,
}

impl StepOutcome {
    pub fn script(self, usage: u64) -> Script {
        match self {
            Self::Complete => Script::complete(usage, usage),
            Self::Fail => Script::fail("generated failure"),
            Self::Error => Script::error("generated dispatch error"),
            Self::DropHandle => Script::DropHandle,
        }
    }

    pub fn is_failure(self) -> bool {
        !matches!(self, Self::Complete)
    }
}

/// Completions dominate so that multi-sequence runs actually happen.
pub fn step_outcome_strategy() -> impl Strategy<Value = StepOutcome> {
    prop_oneof![
        6 => Just(StepOutcome::Complete),
        1 => Just(StepOutcome::Fail),
        1 => Just(StepOutcome::Error),
        1 => Just(StepOutcome::DropHandle),
    ]
}

/// Plans of up to five sequences with up to four steps each, including empty
/// sequences.
pub fn plan_strategy() -> impl Strategy<Value = Vec<Vec<StepOutcome>>> {
    prop::collection::vec(prop::collection::vec(step_outcome_strategy(), 0..=4), 0..=5)
}

/// Random dotted/bracketed paths, some of them hostile.
pub fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-z]{1,8}",
            Just("__proto__".to_string()),
            Just("constructor".to_string()),
            (0usize..4).prop_map(|i| format!("[{i}]")),
        ],
        1..5,
    )
    .prop_map(|parts| {
        let mut path = String::new();
        for part in parts {
            if part.starts_with('[') || path.is_empty() {
                path.push_str(&part);
            } else {
                path.push('.');
                path.push_str(&part);
            }
        }
        path
    })
}
