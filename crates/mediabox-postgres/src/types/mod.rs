//! Contains constraints and other custom types.

mod constraint;

pub use constraint::{
    ConstraintCategory, ConstraintViolation, MediaBoxConstraints, MediaContentConstraints,
};
