//! Resource usage counters and the budget they are checked against.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Non-negative usage counters tracked per [`crate::Session`] over its
/// lifetime. Every field is monotonically non-decreasing from the
/// Session's point of view; arithmetic here is just vector add/sub, the
/// monotonicity guarantee is enforced by the caller (the Session guard
/// logic), not by this type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub num_case_gen: u64,
    pub num_case_eval: u64,
    pub execution_time_case_eval: f64,
    pub num_call_public_eval: u64,
    pub num_call_private_eval: u64,
}

impl ResourceUsage {
    pub const ZERO: ResourceUsage = ResourceUsage {
        num_case_gen: 0,
        num_case_eval: 0,
        execution_time_case_eval: 0.0,
        num_call_public_eval: 0,
        num_call_private_eval: 0,
    };

    /// True iff `self` is component-wise `<=` `other`. Used for the
    /// post-action budget check (§4.F "Resource budget").
    pub fn le(&self, other: &ResourceUsage) -> bool {
        self.num_case_gen <= other.num_case_gen
            && self.num_case_eval <= other.num_case_eval
            && self.execution_time_case_eval <= other.execution_time_case_eval
            && self.num_call_public_eval <= other.num_call_public_eval
            && self.num_call_private_eval <= other.num_call_private_eval
    }

    /// True iff `self` is component-wise strictly `<` `other` on every
    /// field named in `fields`. Used for the pre-action budget check;
    /// fields not named in `fields` are ignored.
    pub fn lt_on(&self, other: &ResourceUsage, fields: &[ResourceField]) -> bool {
        fields.iter().all(|f| f.get(self) < f.get(other))
    }
}

impl Add for ResourceUsage {
    type Output = ResourceUsage;
    fn add(self, rhs: ResourceUsage) -> ResourceUsage {
        ResourceUsage {
            num_case_gen: self.num_case_gen + rhs.num_case_gen,
            num_case_eval: self.num_case_eval + rhs.num_case_eval,
            execution_time_case_eval: self.execution_time_case_eval + rhs.execution_time_case_eval,
            num_call_public_eval: self.num_call_public_eval + rhs.num_call_public_eval,
            num_call_private_eval: self.num_call_private_eval + rhs.num_call_private_eval,
        }
    }
}

impl Sub for ResourceUsage {
    type Output = ResourceUsage;
    fn sub(self, rhs: ResourceUsage) -> ResourceUsage {
        ResourceUsage {
            num_case_gen: self.num_case_gen.saturating_sub(rhs.num_case_gen),
            num_case_eval: self.num_case_eval.saturating_sub(rhs.num_case_eval),
            execution_time_case_eval: (self.execution_time_case_eval
                - rhs.execution_time_case_eval)
                .max(0.0),
            num_call_public_eval: self.num_call_public_eval.saturating_sub(rhs.num_call_public_eval),
            num_call_private_eval: self
                .num_call_private_eval
                .saturating_sub(rhs.num_call_private_eval),
        }
    }
}

/// Named selector for one [`ResourceUsage`] field, used to express the
/// per-action guarded-field table in §4.F without repeating field-access
/// match arms at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceField {
    NumCaseGen,
    NumCaseEval,
    ExecutionTimeCaseEval,
    NumCallPublicEval,
    NumCallPrivateEval,
}

impl ResourceField {
    fn get(self, usage: &ResourceUsage) -> f64 {
        match self {
            ResourceField::NumCaseGen => usage.num_case_gen as f64,
            ResourceField::NumCaseEval => usage.num_case_eval as f64,
            ResourceField::ExecutionTimeCaseEval => usage.execution_time_case_eval,
            ResourceField::NumCallPublicEval => usage.num_call_public_eval as f64,
            ResourceField::NumCallPrivateEval => usage.num_call_private_eval as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_sub_are_componentwise() {
        let a = ResourceUsage {
            num_case_gen: 2,
            num_case_eval: 3,
            execution_time_case_eval: 1.5,
            num_call_public_eval: 0,
            num_call_private_eval: 0,
        };
        let b = ResourceUsage {
            num_case_gen: 1,
            num_case_eval: 1,
            execution_time_case_eval: 0.5,
            num_call_public_eval: 1,
            num_call_private_eval: 0,
        };
        let sum = a + b;
        assert_eq!(sum.num_case_gen, 3);
        assert_eq!(sum.num_case_eval, 4);
        assert!((sum.execution_time_case_eval - 2.0).abs() < 1e-9);

        let diff = sum - b;
        assert_eq!(diff, a);
    }

    #[test]
    fn le_is_componentwise() {
        let small = ResourceUsage {
            num_case_gen: 1,
            ..ResourceUsage::ZERO
        };
        let big = ResourceUsage {
            num_case_gen: 2,
            ..ResourceUsage::ZERO
        };
        assert!(small.le(&big));
        assert!(!big.le(&small));
        assert!(small.le(&small));
    }

    #[test]
    fn lt_on_only_checks_named_fields() {
        let usage = ResourceUsage {
            num_case_gen: 5,
            num_case_eval: 999,
            ..ResourceUsage::ZERO
        };
        let max = ResourceUsage {
            num_case_gen: 10,
            num_case_eval: 0,
            ..ResourceUsage::ZERO
        };
        assert!(usage.lt_on(&max, &[ResourceField::NumCaseGen]));
        assert!(!usage.lt_on(&max, &[ResourceField::NumCaseEval]));
    }
}
