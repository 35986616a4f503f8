//! Instruction addressing for decoded Kismet scripts.
//!
//! # Key Types
//! - [`OffsetIndex`] - Instruction index ↔ byte offset map of one function
//!
//! # Example
//! ```rust
//! use kismetscope::bytecode::{Expr, ExprKind, ScriptLayout};
//! use kismetscope::disassembler::OffsetIndex;
//!
//! let script = vec![Expr::new(ExprKind::IntOne), Expr::new(ExprKind::EndOfScript)];
//! let index = OffsetIndex::build(&script, ScriptLayout::default(), None)?;
//! assert_eq!(index.len(), 2);
//! # Ok::<(), kismetscope::Error>(())
//! ```

mod offsets;

pub use offsets::OffsetIndex;
