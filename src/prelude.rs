//! # kismetscope Prelude
//!
//! Convenient re-exports of the types needed to describe an asset and analyze it.
//!
//! ```rust
//! use kismetscope::prelude::*;
//!
//! let asset = Asset::new("BP_Empty");
//! let report = analyze_asset(&asset, &AnalysisOptions::default())?;
//! assert!(report.functions.is_empty());
//! # Ok::<(), kismetscope::Error>(())
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type
pub use crate::Error;

/// The result type used throughout kismetscope
pub use crate::Result;

/// Non-fatal findings
pub use crate::diagnostics::{Diagnostic, DiagnosticKind, Severity};

// ================================================================================================
// Input Model
// ================================================================================================

/// Package model and name lookup
pub use crate::asset::{
    Asset, EnumDef, Export, FunctionBody, FunctionFlags, Import, PackageIndex, PropertyBag,
    PropertyValue, SymbolTable,
};

/// Expression model
pub use crate::bytecode::{
    BytecodeOffset, Expr, ExprKind, Opcode, PropertyRef, ScriptAssembler, ScriptLayout,
    ScriptName, SwitchArm,
};

/// Pin layout version
pub use crate::pins::PinVersion;

// ================================================================================================
// Analysis
// ================================================================================================

/// Control flow and pseudocode
pub use crate::analysis::{BasicBlock, BlockId, ControlFlowGraph, EdgeKind, Renderer, Successor};

/// Instruction offsets
pub use crate::disassembler::OffsetIndex;

/// Node graphs
pub use crate::pins::{build_node_graph, GraphNode, NodeGraph, Pin, PinDirection, PinLink};

/// Driver and reports
pub use crate::engine::{
    analyze_asset, analyze_function, AnalysisOptions, AssetReport, BlockReport, FunctionReport,
};
