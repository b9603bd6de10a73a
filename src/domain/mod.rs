//! # Domain
//!
//! Trade inputs, per-attempt transactions and the pure computations on
//! them. Nothing in here performs I/O.

pub mod entities;
pub mod value_objects;
