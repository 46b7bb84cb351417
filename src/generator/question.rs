//! Question Generation
//!
//! Builds one solvable multiple-choice question per pass:
//!
//! 1. Normalize the parameters.
//! 2. Build `term_count` terms (variable terms first), shuffle them.
//! 3. Join terms with `+`/`-` per the allowed operator set.
//! 4. Draw distinct options, sort, take the two extremes.
//! 5. Evaluate the expression at both extremes and pick the correct
//!    option by the expected comparison.
//! 6. Shuffle the options so sort order leaks nothing.
//!
//! The selection rule in step 5 compares the expression at the two
//! extreme options only. For non-monotonic expressions (division
//! terms) this is not a proof that the extreme is the true optimum
//! over all options, but it does guarantee the designated correct
//! answer is always present among the options. A NaN evaluation makes
//! the comparison false, so `x_max` is treated as not-greater. Both
//! behaviors are intentional and observable; do not "fix" them.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generator::expression::{Expression, JoinOp, Term};
use crate::generator::params::{Comparison, EquationParams, NumberRange, Operation};

/// A generated multiple-choice question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique question id.
    pub id: Uuid,
    /// Rendered equation text, e.g. `y = 3x - 7`.
    pub text: String,
    /// Candidate values for `x`. Contains the correct value exactly once.
    pub options: Vec<i64>,
    /// The designated correct option.
    pub correct: i64,
    /// Advisory time allotted in seconds (client-enforced).
    pub time_seconds: u32,
}

/// Generate `count` independent questions. Never returns an empty list.
pub fn generate(params: &EquationParams, count: usize) -> Vec<Question> {
    let params = params.normalized();
    let count = count.max(1);
    let mut rng = rand::thread_rng();
    (0..count).map(|_| generate_one(&params, &mut rng)).collect()
}

/// Build a single question from already-normalized parameters.
fn generate_one(params: &EquationParams, rng: &mut impl Rng) -> Question {
    let expression = build_expression(params, rng);

    let mut options = draw_distinct(params.option_range, params.options_count, rng);
    options.sort_unstable();
    let x_min = options[0];
    let x_max = options[options.len() - 1];

    let correct = select_correct(&expression, x_min, x_max, params.expected);

    options.shuffle(rng);

    Question {
        id: Uuid::new_v4(),
        text: expression.render(),
        options,
        correct,
        time_seconds: params.time_seconds,
    }
}

/// Build the right-hand side: variable terms first, then constants,
/// order shuffled, joins drawn from the allowed `+`/`-` subset.
fn build_expression(params: &EquationParams, rng: &mut impl Rng) -> Expression {
    let mut terms = Vec::with_capacity(params.term_count);
    for _ in 0..params.variable_count {
        terms.push(variable_term(params, rng));
    }
    for _ in params.variable_count..params.term_count {
        terms.push(Term::Constant(nonzero_in(params.number_range, rng)));
    }
    terms.shuffle(rng);

    let add = params.allows(Operation::Add);
    let sub = params.allows(Operation::Subtract);

    let head = terms[0];
    let tail = terms[1..]
        .iter()
        .map(|term| {
            let op = match (add, sub) {
                (true, true) => {
                    if rng.gen_bool(0.5) {
                        JoinOp::Add
                    } else {
                        JoinOp::Subtract
                    }
                }
                (false, true) => JoinOp::Subtract,
                // Add-only, or neither additive operator allowed.
                _ => JoinOp::Add,
            };
            (op, *term)
        })
        .collect();

    Expression { head, tail }
}

/// Combine a nonzero coefficient with `x` using whichever of `*`/`/`
/// is allowed, falling back to bare `x` or `-x` when neither is.
fn variable_term(params: &EquationParams, rng: &mut impl Rng) -> Term {
    let coeff = nonzero_in(params.number_range, rng);
    let mult = params.allows(Operation::Multiply);
    let div = params.allows(Operation::Divide);

    match (mult, div) {
        (true, true) => {
            if rng.gen_bool(0.5) {
                Term::Scaled(coeff)
            } else {
                Term::DividedByX(coeff)
            }
        }
        (true, false) => Term::Scaled(coeff),
        (false, true) => Term::DividedByX(coeff),
        (false, false) => Term::Bare {
            negated: rng.gen_bool(0.5),
        },
    }
}

/// Uniform nonzero integer within the range.
fn nonzero_in(range: NumberRange, rng: &mut impl Rng) -> i64 {
    loop {
        let value = rng.gen_range(range.min..=range.max);
        if value != 0 {
            return value;
        }
    }
}

/// Draw `count` distinct uniform integers from the range. The caller
/// guarantees `count` does not exceed the range cardinality.
fn draw_distinct(range: NumberRange, count: usize, rng: &mut impl Rng) -> Vec<i64> {
    let mut values = Vec::with_capacity(count);
    while values.len() < count {
        let value = rng.gen_range(range.min..=range.max);
        if !values.contains(&value) {
            values.push(value);
        }
    }
    values
}

/// Pick the correct option from the two sorted extremes.
///
/// `Greater` picks whichever extreme evaluates larger, `Less` the
/// smaller. A NaN result makes `y_max > y_min` false, so `x_max` is
/// treated as not-greater.
pub(crate) fn select_correct(
    expression: &Expression,
    x_min: i64,
    x_max: i64,
    expected: Comparison,
) -> i64 {
    let y_min = expression.eval(x_min as f64);
    let y_max = expression.eval(x_max as f64);
    let max_is_greater = y_max > y_min;

    match expected {
        Comparison::Greater => {
            if max_is_greater {
                x_max
            } else {
                x_min
            }
        }
        Comparison::Less => {
            if max_is_greater {
                x_min
            } else {
                x_max
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base_params() -> EquationParams {
        EquationParams {
            term_count: 2,
            variable_count: 1,
            operations: vec![Operation::Add, Operation::Subtract],
            options_count: 4,
            option_range: NumberRange::new(-10, 10),
            number_range: NumberRange::new(-10, 10),
            expected: Comparison::Greater,
            time_seconds: 30,
        }
    }

    #[test]
    fn test_generate_never_empty() {
        let questions = generate(&base_params(), 0);
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn test_generate_requested_count() {
        let questions = generate(&base_params(), 10);
        assert_eq!(questions.len(), 10);
    }

    #[test]
    fn test_correct_option_present_exactly_once() {
        for question in generate(&base_params(), 50) {
            let hits = question
                .options
                .iter()
                .filter(|o| **o == question.correct)
                .count();
            assert_eq!(hits, 1, "question {:?}", question);
        }
    }

    #[test]
    fn test_options_distinct_and_in_range() {
        for question in generate(&base_params(), 50) {
            assert_eq!(question.options.len(), 4);
            for (i, a) in question.options.iter().enumerate() {
                assert!((-10..=10).contains(a));
                for b in &question.options[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_greater_rule_matches_extreme_evaluation() {
        // Monotonic expression: y = 3x - 7, larger x always wins GREATER.
        let expression = Expression {
            head: Term::Scaled(3),
            tail: vec![(JoinOp::Subtract, Term::Constant(7))],
        };
        assert_eq!(select_correct(&expression, -5, 8, Comparison::Greater), 8);
        assert_eq!(select_correct(&expression, -5, 8, Comparison::Less), -5);
    }

    #[test]
    fn test_nan_evaluation_treats_x_max_as_not_greater() {
        // x_max = 0 makes 3/x non-finite; 0/0 would be NaN. Either way
        // the comparison is false and GREATER resolves to x_min.
        let expression = Expression {
            head: Term::DividedByX(3),
            tail: vec![(
                JoinOp::Subtract,
                Term::DividedByX(3),
            )],
        };
        // At x = 0: 3/0 - 3/0 = inf - inf = NaN.
        assert_eq!(select_correct(&expression, -4, 0, Comparison::Greater), -4);
        assert_eq!(select_correct(&expression, -4, 0, Comparison::Less), 0);
    }

    #[test]
    fn test_division_only_variable_terms() {
        let params = EquationParams {
            operations: vec![Operation::Divide],
            ..base_params()
        };
        for question in generate(&params, 20) {
            assert!(question.text.contains("/x"), "text: {}", question.text);
            let hits = question
                .options
                .iter()
                .filter(|o| **o == question.correct)
                .count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn test_bare_variable_when_no_scaling_operator() {
        let params = EquationParams {
            term_count: 2,
            variable_count: 2,
            operations: vec![Operation::Add],
            ..base_params()
        };
        for question in generate(&params, 20) {
            assert!(question.text.contains('x'));
            assert!(!question.text.contains("/x"));
            // No coefficient may be glued to x: every 'x' follows
            // either a space, '(', '-', or the "y = " prefix.
            let bytes = question.text.as_bytes();
            for (i, b) in bytes.iter().enumerate() {
                if *b == b'x' {
                    assert!(!bytes[i - 1].is_ascii_digit(), "text: {}", question.text);
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_generated_question_is_well_formed(
            term_count in 0usize..6,
            variable_count in 0usize..6,
            options_count in 0usize..12,
            op_mask in 0u8..16,
            min in -20i64..20,
            span in 0i64..15,
            greater in proptest::bool::ANY,
        ) {
            let all = [
                Operation::Add,
                Operation::Subtract,
                Operation::Multiply,
                Operation::Divide,
            ];
            let operations: Vec<Operation> = all
                .iter()
                .enumerate()
                .filter(|(i, _)| op_mask & (1 << i) != 0)
                .map(|(_, op)| *op)
                .collect();

            let params = EquationParams {
                term_count,
                variable_count,
                operations,
                options_count,
                number_range: NumberRange::new(min, min + span),
                option_range: NumberRange::new(min, min + span),
                expected: if greater { Comparison::Greater } else { Comparison::Less },
                time_seconds: 20,
            };
            let normalized = params.normalized();

            let questions = generate(&params, 3);
            prop_assert_eq!(questions.len(), 3);

            for question in questions {
                prop_assert_eq!(question.options.len(), normalized.options_count);
                let hits = question
                    .options
                    .iter()
                    .filter(|o| **o == question.correct)
                    .count();
                prop_assert_eq!(hits, 1);
                for option in &question.options {
                    prop_assert!(*option >= normalized.option_range.min);
                    prop_assert!(*option <= normalized.option_range.max);
                }
            }
        }
    }
}
