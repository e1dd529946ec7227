//! The six-dimensional resource lattice: bin tables, rounding, and the
//! `ResourceClass` matching/ordering predicates.

pub mod bins;
pub mod class;

pub use class::{ResourceClass, ResourceMap, DIMENSIONS};
