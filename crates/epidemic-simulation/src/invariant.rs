// Purpose: Defines the invariant checking system for monitoring compartment states and reporting violations
//
// Checkers look at consecutive states of a trajectory. The observer fans each state out to its
// checkers and counts violations; the runner turns the first violation into a fatal error.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{json, Value};

use crate::state::SimulationState;

/// Type of invariant being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvariantType {
    /// Every compartment is a finite number
    FiniteCompartments,
    /// S + E + I + R + D equals the population size
    PopulationConservation,
    /// No compartment drops below zero
    NonNegativeCompartments,
    /// R and D never decrease from one day to the next
    MonotoneRemovals,
}

impl fmt::Display for InvariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FiniteCompartments => write!(f, "FiniteCompartments"),
            Self::PopulationConservation => write!(f, "PopulationConservation"),
            Self::NonNegativeCompartments => write!(f, "NonNegativeCompartments"),
            Self::MonotoneRemovals => write!(f, "MonotoneRemovals"),
        }
    }
}

/// Result of an invariant check
#[derive(Debug, Clone, PartialEq)]
pub enum InvariantResult {
    /// Invariant was satisfied
    Satisfied,
    /// Invariant was violated
    Violated {
        /// Type of invariant that was violated
        invariant_type: InvariantType,
        /// Description of the violation
        message: String,
        /// Day of the offending state
        day: usize,
        /// Additional context data for debugging
        context: HashMap<String, Value>,
    },
}

impl InvariantResult {
    pub fn is_violated(&self) -> bool {
        matches!(self, Self::Violated { .. })
    }
}

/// Trait defining an invariant checker
pub trait InvariantChecker: Send + Sync + fmt::Debug {
    /// Get the type of this invariant
    fn invariant_type(&self) -> InvariantType;

    /// Check `current`, given the state of the day before when there is one.
    fn check(&self, previous: Option<&SimulationState>, current: &SimulationState) -> InvariantResult;
}

//-----------------------------------------------------------------------------
// Observer
//-----------------------------------------------------------------------------

/// Runs a set of checkers over each state of a trajectory.
pub struct InvariantObserver {
    checkers: Vec<Box<dyn InvariantChecker>>,
    violation_count: AtomicUsize,
}

impl fmt::Debug for InvariantObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvariantObserver")
            .field("checkers", &self.checkers)
            .field("violation_count", &self.violation_count())
            .finish()
    }
}

impl Default for InvariantObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantObserver {
    /// Create an observer with no checkers
    pub fn new() -> Self {
        Self {
            checkers: Vec::new(),
            violation_count: AtomicUsize::new(0),
        }
    }

    /// Observer carrying every compartment invariant for a population of `size`.
    pub fn with_defaults(size: f64, tolerance: f64) -> Self {
        let mut observer = Self::new();
        observer
            .add_checker(Box::new(FiniteCompartmentsChecker))
            .add_checker(Box::new(PopulationConservationChecker::new(size, tolerance)))
            .add_checker(Box::new(NonNegativeChecker))
            .add_checker(Box::new(MonotoneRemovalsChecker));
        observer
    }

    /// Add an invariant checker
    pub fn add_checker(&mut self, checker: Box<dyn InvariantChecker>) -> &mut Self {
        self.checkers.push(checker);
        self
    }

    /// Get the number of violations detected
    pub fn violation_count(&self) -> usize {
        self.violation_count.load(Ordering::Relaxed)
    }

    /// Check one state against every checker and return the violations found.
    pub fn observe(&self, previous: Option<&SimulationState>, current: &SimulationState) -> Vec<InvariantResult> {
        let violations: Vec<InvariantResult> = self
            .checkers
            .iter()
            .map(|checker| checker.check(previous, current))
            .filter(InvariantResult::is_violated)
            .collect();
        self.violation_count.fetch_add(violations.len(), Ordering::Relaxed);
        violations
    }
}

//-----------------------------------------------------------------------------
// Checkers
//-----------------------------------------------------------------------------

/// Checker that no compartment overflowed to infinity or NaN
#[derive(Debug, Clone, Copy)]
pub struct FiniteCompartmentsChecker;

impl InvariantChecker for FiniteCompartmentsChecker {
    fn invariant_type(&self) -> InvariantType {
        InvariantType::FiniteCompartments
    }

    fn check(&self, _previous: Option<&SimulationState>, current: &SimulationState) -> InvariantResult {
        if current.is_finite() {
            return InvariantResult::Satisfied;
        }

        let names = ["S", "E", "I", "R", "D"];
        let context: HashMap<String, Value> = names
            .iter()
            .zip(current.compartments())
            .filter(|(_, value)| !value.is_finite())
            .map(|(name, value)| (name.to_string(), json!(value.to_string())))
            .collect();
        let mut keys: Vec<&String> = context.keys().collect();
        keys.sort();
        InvariantResult::Violated {
            invariant_type: self.invariant_type(),
            message: format!("non-finite compartment(s): {:?}", keys),
            day: current.day,
            context,
        }
    }
}

/// Checker for population conservation, with a tolerance relative to the population size
#[derive(Debug, Clone)]
pub struct PopulationConservationChecker {
    size: f64,
    tolerance: f64,
}

impl PopulationConservationChecker {
    pub fn new(size: f64, tolerance: f64) -> Self {
        Self { size, tolerance }
    }
}

impl InvariantChecker for PopulationConservationChecker {
    fn invariant_type(&self) -> InvariantType {
        InvariantType::PopulationConservation
    }

    fn check(&self, _previous: Option<&SimulationState>, current: &SimulationState) -> InvariantResult {
        let total = current.total();
        let drift = (total - self.size).abs();
        if drift <= self.tolerance * self.size.max(1.0) {
            return InvariantResult::Satisfied;
        }

        let mut context = HashMap::new();
        context.insert("total".to_string(), json!(total));
        context.insert("size".to_string(), json!(self.size));
        context.insert("drift".to_string(), json!(drift));
        InvariantResult::Violated {
            invariant_type: self.invariant_type(),
            message: format!("compartments sum to {} but population is {}", total, self.size),
            day: current.day,
            context,
        }
    }
}

/// Checker for non-negative compartments
#[derive(Debug, Clone, Copy)]
pub struct NonNegativeChecker;

impl InvariantChecker for NonNegativeChecker {
    fn invariant_type(&self) -> InvariantType {
        InvariantType::NonNegativeCompartments
    }

    fn check(&self, _previous: Option<&SimulationState>, current: &SimulationState) -> InvariantResult {
        let names = ["S", "E", "I", "R", "D"];
        let negative: HashMap<String, Value> = names
            .iter()
            .zip(current.compartments())
            .filter(|(_, value)| !(*value >= 0.0))
            .map(|(name, value)| (name.to_string(), json!(value)))
            .collect();

        if negative.is_empty() {
            InvariantResult::Satisfied
        } else {
            let mut keys: Vec<&String> = negative.keys().collect();
            keys.sort();
            InvariantResult::Violated {
                invariant_type: self.invariant_type(),
                message: format!("negative compartment(s): {:?}", keys),
                day: current.day,
                context: negative,
            }
        }
    }
}

/// Checker that R and D are non-decreasing
#[derive(Debug, Clone, Copy)]
pub struct MonotoneRemovalsChecker;

impl InvariantChecker for MonotoneRemovalsChecker {
    fn invariant_type(&self) -> InvariantType {
        InvariantType::MonotoneRemovals
    }

    fn check(&self, previous: Option<&SimulationState>, current: &SimulationState) -> InvariantResult {
        let Some(previous) = previous else {
            return InvariantResult::Satisfied;
        };

        let mut context = HashMap::new();
        if current.recovered < previous.recovered {
            context.insert("R".to_string(), json!([previous.recovered, current.recovered]));
        }
        if current.dead < previous.dead {
            context.insert("D".to_string(), json!([previous.dead, current.dead]));
        }

        if context.is_empty() {
            InvariantResult::Satisfied
        } else {
            InvariantResult::Violated {
                invariant_type: self.invariant_type(),
                message: format!("removals decreased between day {} and day {}", previous.day, current.day),
                day: current.day,
                context,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(day: usize, s: f64, i: f64, r: f64, d: f64) -> SimulationState {
        SimulationState {
            day,
            susceptible: s,
            exposed: 0.0,
            infected: i,
            recovered: r,
            dead: d,
        }
    }

    #[test]
    fn test_conservation_within_tolerance() {
        let checker = PopulationConservationChecker::new(1_000.0, 1e-6);
        let ok = state(0, 900.0, 50.0, 49.9999999, 0.0);
        assert_eq!(checker.check(None, &ok), InvariantResult::Satisfied);

        let drifted = state(1, 900.0, 50.0, 40.0, 0.0);
        match checker.check(None, &drifted) {
            InvariantResult::Violated { invariant_type, day, context, .. } => {
                assert_eq!(invariant_type, InvariantType::PopulationConservation);
                assert_eq!(day, 1);
                assert!(context.contains_key("drift"));
            }
            other => panic!("expected violation, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_compartment_detected() {
        let result = NonNegativeChecker.check(None, &state(2, 1_001.0, -1.0, 0.0, 0.0));
        assert!(result.is_violated());
        let result = NonNegativeChecker.check(None, &state(2, f64::NAN, 0.0, 0.0, 0.0));
        assert!(result.is_violated());
    }

    #[test]
    fn test_monotone_removals() {
        let a = state(0, 900.0, 50.0, 40.0, 10.0);
        let b = state(1, 905.0, 50.0, 35.0, 10.0);
        assert_eq!(MonotoneRemovalsChecker.check(None, &a), InvariantResult::Satisfied);
        assert!(MonotoneRemovalsChecker.check(Some(&a), &b).is_violated());
        assert!(!MonotoneRemovalsChecker.check(Some(&b), &a).is_violated());
    }

    #[test]
    fn test_observer_counts_violations() {
        let observer = InvariantObserver::with_defaults(1_000.0, 1e-6);
        let trajectory = vec![
            state(0, 900.0, 50.0, 50.0, 0.0),
            state(1, 880.0, 60.0, 55.0, 5.0),
            state(2, 890.0, 60.0, 45.0, 5.0),
        ];
        let mut violations = Vec::new();
        let mut previous = None;
        for current in &trajectory {
            violations.extend(observer.observe(previous, current));
            previous = Some(current);
        }
        assert_eq!(violations.len(), 1);
        assert_eq!(observer.violation_count(), 1);
    }

    #[test]
    fn test_non_finite_compartment_detected() {
        let finite = state(3, 900.0, 50.0, 50.0, 0.0);
        assert_eq!(FiniteCompartmentsChecker.check(None, &finite), InvariantResult::Satisfied);

        match FiniteCompartmentsChecker.check(None, &state(3, f64::NAN, f64::INFINITY, 0.0, 0.0)) {
            InvariantResult::Violated { invariant_type, day, context, .. } => {
                assert_eq!(invariant_type, InvariantType::FiniteCompartments);
                assert_eq!(day, 3);
                assert!(context.contains_key("S"));
                assert!(context.contains_key("I"));
            }
            other => panic!("expected violation, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_report_non_finite_first() {
        let observer = InvariantObserver::with_defaults(1_000.0, 1e-6);
        let violations = observer.observe(None, &state(0, f64::NAN, 0.0, 0.0, 0.0));
        match violations.first() {
            Some(InvariantResult::Violated { invariant_type, .. }) => {
                assert_eq!(*invariant_type, InvariantType::FiniteCompartments)
            }
            other => panic!("expected violation, got {:?}", other),
        }
    }
}
