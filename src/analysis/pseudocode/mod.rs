//! Pseudocode rendering of function scripts.
//!
//! Each top-level expression of a block renders to at most one statement. Instrumentation
//! records (breakpoints, tracepoints, instrumentation events and script markers) produce no
//! statement but keep their position in the script, so block boundaries are unaffected.
//!
//! # Statement Forms
//!
//! | Expression | Rendering |
//! |------------|-----------|
//! | assignment | `Target = Value` |
//! | call | `Name(args)`, `Object.Name(args)`, `Library.Name(args)` |
//! | conditional jump | `if not (Cond) goto block_N` |
//! | jump | `goto block_N` |
//! | switch | `switch (i) { case v: r goto block_a; default: d goto block_z }` |
//! | return | `return` or `return Value` |
//! | cast | `(Type)Value`, `(class<Type>)Value` |
//! | delegate | `D.BindUFunction(obj, "F")`, `D.AddDelegate(x)`, `D.Clear()` |
//!
//! # Examples
//!
//! ```rust
//! use kismetscope::analysis::{ControlFlowGraph, Renderer};
//! use kismetscope::bytecode::{Expr, ExprKind, ScriptAssembler, ScriptLayout};
//! use kismetscope::Asset;
//!
//! let asset = Asset::new("BP_Empty");
//! let mut asm = ScriptAssembler::new(ScriptLayout::default());
//! asm.emit(ExprKind::Return(Box::new(Expr::new(ExprKind::IntOne))))?;
//! asm.emit(ExprKind::EndOfScript)?;
//! let body = asm.finish()?;
//!
//! let cfg = ControlFlowGraph::from_script(&body.script, ScriptLayout::default(), body.script_size)?;
//! let mut renderer = Renderer::new(&asset, &cfg);
//! assert_eq!(renderer.render_blocks(&body.script), vec![vec!["return 1".to_string()]]);
//! # Ok::<(), kismetscope::Error>(())
//! ```

mod renderer;

pub use renderer::Renderer;
