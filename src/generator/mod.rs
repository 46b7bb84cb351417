//! Equation Generation
//!
//! Procedural generator for solvable multiple-choice equation questions.
//! Pure and stateless: each call draws fresh randomness, so repeated
//! calls with the same parameters yield different but equally valid
//! questions.
//!
//! ## Module Structure
//!
//! - `params`: Generation constraints and their normalization
//! - `expression`: Term model, text rendering, numeric evaluation
//! - `question`: Per-question algorithm and option drawing

pub mod expression;
pub mod params;
pub mod question;

// Re-export key types
pub use params::{Comparison, EquationParams, NumberRange, Operation};
pub use question::{generate, Question};
