//! Expression Model
//!
//! The right-hand side of a generated equation `y = ...` is a sequence
//! of terms joined by `+`/`-`. Evaluation substitutes a candidate `x`
//! and runs IEEE-754 arithmetic: a division term evaluated at `x = 0`
//! yields an infinity (or NaN), which the selection rule in
//! [`crate::generator::question`] tolerates rather than treating as a
//! fatal error.

use serde::{Deserialize, Serialize};

/// One term of the right-hand side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Term {
    /// Plain integer coefficient.
    Constant(i64),
    /// `c * x` with a nonzero coefficient.
    Scaled(i64),
    /// `c / x` with a nonzero coefficient. `x = 0` is not special-cased.
    DividedByX(i64),
    /// Bare `x` or `-x`, used when neither `*` nor `/` is allowed.
    Bare { negated: bool },
}

impl Term {
    /// Evaluate this term at `x`.
    pub fn eval(self, x: f64) -> f64 {
        match self {
            Term::Constant(c) => c as f64,
            Term::Scaled(c) => c as f64 * x,
            Term::DividedByX(c) => c as f64 / x,
            Term::Bare { negated } => {
                if negated {
                    -x
                } else {
                    x
                }
            }
        }
    }

    /// Render this term as equation text.
    pub fn render(self) -> String {
        match self {
            Term::Constant(c) if c < 0 => format!("({})", c),
            Term::Constant(c) => c.to_string(),
            Term::Scaled(c) if c < 0 => format!("({})x", c),
            Term::Scaled(c) => format!("{}x", c),
            Term::DividedByX(c) if c < 0 => format!("({})/x", c),
            Term::DividedByX(c) => format!("{}/x", c),
            Term::Bare { negated: true } => "(-x)".to_string(),
            Term::Bare { negated: false } => "x".to_string(),
        }
    }
}

/// How two adjacent terms are joined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinOp {
    /// `+`
    Add,
    /// `-`
    Subtract,
}

impl JoinOp {
    fn symbol(self) -> char {
        match self {
            JoinOp::Add => '+',
            JoinOp::Subtract => '-',
        }
    }
}

/// Right-hand side of `y = ...`: a head term plus joined tail terms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    /// First term.
    pub head: Term,
    /// Remaining terms with their join operators.
    pub tail: Vec<(JoinOp, Term)>,
}

impl Expression {
    /// Evaluate the whole expression at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let mut acc = self.head.eval(x);
        for (op, term) in &self.tail {
            match op {
                JoinOp::Add => acc += term.eval(x),
                JoinOp::Subtract => acc -= term.eval(x),
            }
        }
        acc
    }

    /// Render as full equation text, e.g. `y = 3x - 7 + 2/x`.
    pub fn render(&self) -> String {
        let mut text = format!("y = {}", self.head.render());
        for (op, term) in &self.tail {
            text.push(' ');
            text.push(op.symbol());
            text.push(' ');
            text.push_str(&term.render());
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(head: Term, tail: Vec<(JoinOp, Term)>) -> Expression {
        Expression { head, tail }
    }

    #[test]
    fn test_term_eval() {
        assert_eq!(Term::Constant(7).eval(99.0), 7.0);
        assert_eq!(Term::Scaled(3).eval(2.0), 6.0);
        assert_eq!(Term::DividedByX(8).eval(4.0), 2.0);
        assert_eq!(Term::Bare { negated: true }.eval(5.0), -5.0);
    }

    #[test]
    fn test_division_by_zero_is_nonfinite() {
        let y = Term::DividedByX(3).eval(0.0);
        assert!(!y.is_finite());
    }

    #[test]
    fn test_expression_eval() {
        // y = 3x - 7 + 2/x, at x = 2: 6 - 7 + 1 = 0
        let e = expr(
            Term::Scaled(3),
            vec![
                (JoinOp::Subtract, Term::Constant(7)),
                (JoinOp::Add, Term::DividedByX(2)),
            ],
        );
        assert_eq!(e.eval(2.0), 0.0);
    }

    #[test]
    fn test_render() {
        let e = expr(
            Term::Scaled(3),
            vec![
                (JoinOp::Subtract, Term::Constant(7)),
                (JoinOp::Add, Term::DividedByX(2)),
            ],
        );
        assert_eq!(e.render(), "y = 3x - 7 + 2/x");
    }

    #[test]
    fn test_render_negative_coefficients_parenthesized() {
        let e = expr(Term::Scaled(-3), vec![(JoinOp::Subtract, Term::Constant(-7))]);
        assert_eq!(e.render(), "y = (-3)x - (-7)");
    }
}
