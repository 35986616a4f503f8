//! Analyses over compiled function scripts.
//!
//! - [`cfg`] - Basic blocks and ordered successor lists
//! - [`pseudocode`] - Statement rendering per block
//!
//! Both work on one function at a time and share nothing between functions, which is what lets
//! [`crate::analyze_asset`] run them in parallel.

pub mod cfg;
pub mod pseudocode;

pub use cfg::{BasicBlock, BlockId, ControlFlowGraph, EdgeKind, Successor};
pub use pseudocode::Renderer;
