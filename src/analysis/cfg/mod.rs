//! Control flow graph construction for function scripts.
//!
//! A function script is a flat sequence of top-level expressions. Control moves between them
//! through jumps, conditional jumps, switches and the execution flow stack, all of which name
//! their destination as a byte offset. This module cuts the sequence into basic blocks and links
//! them with ordered successor lists.
//!
//! # Key Components
//!
//! - [`ControlFlowGraph`] - Blocks, successors, predecessors and exits of one function
//! - [`BasicBlock`] - A straight-line run of instructions
//! - [`Successor`] / [`EdgeKind`] - Classified successor entries
//!
//! # Successor Order
//!
//! Successor lists are ordered and consumers may rely on it:
//!
//! | Terminator | Successors |
//! |------------|------------|
//! | jump | target |
//! | conditional jump | target, fall-through |
//! | switch | each case in case order, then the switch end |
//! | push flow | fall-through, pushed offset |
//! | pop flow | every offset pushed in the function |
//! | conditional pop | pushed offsets, then fall-through |
//! | computed jump | unresolved |
//! | return / end of script | none |
//!
//! Targets outside the function become [`Successor::Unresolved`] and raise a diagnostic. Targets
//! landing inside an instruction are snapped to the start of that instruction.
//!
//! # Examples
//!
//! ```rust
//! use kismetscope::analysis::{ControlFlowGraph, Successor};
//! use kismetscope::bytecode::{Expr, ExprKind, ScriptAssembler, ScriptLayout};
//!
//! let mut asm = ScriptAssembler::new(ScriptLayout::default());
//! asm.define_label("top")?;
//! asm.emit(ExprKind::IntOne)?;
//! asm.jump("top")?;
//! let body = asm.finish()?;
//!
//! let cfg = ControlFlowGraph::from_script(&body.script, ScriptLayout::default(), body.script_size)?;
//! assert!(cfg.blocks()[0].loop_target);
//! # Ok::<(), kismetscope::Error>(())
//! ```

mod block;
mod builder;
mod edge;
mod graph;
mod loops;

pub use block::{BasicBlock, BlockId};
pub use edge::{EdgeKind, Successor};
pub use graph::ControlFlowGraph;
