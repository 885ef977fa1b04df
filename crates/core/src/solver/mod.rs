//! Coupled leaf solver

pub mod stability;

pub use stability::{check_pathway, solve_leaf, LeafSolution, LoopExit};
