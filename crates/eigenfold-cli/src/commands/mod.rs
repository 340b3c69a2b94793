//! CLI command implementations.

pub mod common;
pub mod fold;
pub mod hamiltonian;
pub mod sweep;
