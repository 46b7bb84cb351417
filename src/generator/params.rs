//! Generation Constraints
//!
//! Caller-supplied parameters for question generation. Invalid values
//! are clamped to safe defaults rather than rejected, so any request
//! produces a well-formed question.

use serde::{Deserialize, Serialize};

/// Arithmetic operators the generator may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
}

impl Operation {
    /// Symbol used in rendered equation text.
    pub fn symbol(self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Subtract => '-',
            Operation::Multiply => '*',
            Operation::Divide => '/',
        }
    }
}

/// Expected comparison outcome for the correct option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// The correct option makes `y` the larger of the two extremes.
    Greater,
    /// The correct option makes `y` the smaller of the two extremes.
    Less,
}

/// Inclusive integer range for coefficients or answer options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberRange {
    /// Lower bound (inclusive).
    pub min: i64,
    /// Upper bound (inclusive).
    pub max: i64,
}

impl NumberRange {
    /// Default range used when a caller-supplied range is degenerate.
    pub const DEFAULT: NumberRange = NumberRange { min: -10, max: 10 };

    /// Create a new range.
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// A range is usable only when min < max.
    pub fn is_valid(&self) -> bool {
        self.min < self.max
    }

    /// Number of distinct integers the range can produce. Saturates at
    /// `u64::MAX` for the full-width range; extreme bounds must not
    /// panic a clamping path.
    pub fn cardinality(&self) -> u64 {
        (self.max.wrapping_sub(self.min) as u64).saturating_add(1)
    }
}

impl Default for NumberRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Constraints for one generation request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EquationParams {
    /// Number of terms on the right-hand side (min 2).
    pub term_count: usize,

    /// Number of terms carrying the free variable `x` (min 1, max `term_count`).
    pub variable_count: usize,

    /// Allowed operator set; defaults to `{+, -}` when empty.
    pub operations: Vec<Operation>,

    /// Number of answer options per question (min 2).
    pub options_count: usize,

    /// Range for term coefficients.
    pub number_range: NumberRange,

    /// Range for answer options.
    pub option_range: NumberRange,

    /// Which extreme the correct option must produce.
    pub expected: Comparison,

    /// Advisory time allotted per question, in seconds.
    pub time_seconds: u32,
}

impl Default for EquationParams {
    fn default() -> Self {
        Self {
            term_count: 2,
            variable_count: 1,
            operations: vec![Operation::Add, Operation::Subtract],
            options_count: 4,
            number_range: NumberRange::DEFAULT,
            option_range: NumberRange::DEFAULT,
            expected: Comparison::Greater,
            time_seconds: 30,
        }
    }
}

impl EquationParams {
    /// Clamp every field to a safe value.
    ///
    /// The generator never rejects parameters: a degenerate range falls
    /// back to [`NumberRange::DEFAULT`], an empty operator set falls
    /// back to `{+, -}`, and counts are floored to their minimums. The
    /// options count is additionally capped at the option range
    /// cardinality so the distinct-option draw always terminates.
    pub fn normalized(&self) -> EquationParams {
        let term_count = self.term_count.max(2);
        let variable_count = self.variable_count.clamp(1, term_count);

        let mut operations: Vec<Operation> = Vec::new();
        for op in &self.operations {
            if !operations.contains(op) {
                operations.push(*op);
            }
        }
        if operations.is_empty() {
            operations = vec![Operation::Add, Operation::Subtract];
        }

        let number_range = if self.number_range.is_valid() {
            self.number_range
        } else {
            NumberRange::DEFAULT
        };
        let option_range = if self.option_range.is_valid() {
            self.option_range
        } else {
            NumberRange::DEFAULT
        };

        let options_count = self
            .options_count
            .max(2)
            .min(option_range.cardinality() as usize);

        EquationParams {
            term_count,
            variable_count,
            operations,
            options_count,
            number_range,
            option_range,
            expected: self.expected,
            time_seconds: self.time_seconds,
        }
    }

    /// Whether the normalized operator set contains `op`.
    pub fn allows(&self, op: Operation) -> bool {
        self.operations.contains(&op)
    }
}
