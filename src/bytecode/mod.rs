//! Kismet bytecode model.
//!
//! Blueprint functions are compiled to a stack-free tree bytecode: every top-level instruction
//! is a complete expression whose operands are nested expressions. This module defines that
//! tree ([`Expr`], [`ExprKind`]), the opcode table ([`Opcode`]), the symbolic operands
//! instructions refer to ([`PropertyRef`], [`ScriptName`]) and the size model
//! ([`ScriptLayout`]) used to recover byte offsets. [`ScriptAssembler`] builds scripts with
//! label-resolved jump targets.
//!
//! # Examples
//!
//! ```rust
//! use kismetscope::bytecode::{BytecodeOffset, Expr, ExprKind, ScriptLayout};
//!
//! let jump = Expr::new(ExprKind::Jump { target: BytecodeOffset(12) });
//! assert_eq!(jump.serialized_size(ScriptLayout::default())?, 5);
//! # Ok::<(), kismetscope::Error>(())
//! ```

mod assembler;
mod expr;
mod opcode;
mod refs;
mod size;

pub use assembler::{ScriptAssembler, SwitchArm};
pub use expr::{BytecodeOffset, Expr, ExprKind, SwitchCase, TextLiteral, Transform, Vec3};
pub use opcode::{CastKind, Opcode};
pub use refs::{ObjectRef, PropertyRef, ScriptName};
pub use size::ScriptLayout;
