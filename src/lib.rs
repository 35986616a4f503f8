// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # kismetscope
//!
//! Structure recovery for compiled Unreal Engine blueprints.
//!
//! Blueprints ship in two shapes inside a cooked package: the compiled Kismet bytecode of every
//! function, and (in editor builds) the node graphs the bytecode was generated from. `kismetscope`
//! takes an already deserialized package and reconstructs both:
//!
//! - per function, a control flow graph whose blocks carry readable pseudocode statements;
//! - per graph, the nodes with their typed pins and resolved pin-to-pin links.
//!
//! Reading the package container itself is left to an upstream deserializer; the expected input
//! is described by [`Asset`].
//!
//! ## Quick Start
//!
//! ```rust
//! use kismetscope::prelude::*;
//!
//! let mut asm = ScriptAssembler::new(ScriptLayout::default());
//! asm.jump_if_not(Expr::new(ExprKind::True), "done")?;
//! asm.emit(ExprKind::IntOne)?;
//! asm.define_label("done")?;
//! asm.emit(ExprKind::Return(Box::new(Expr::new(ExprKind::Nothing))))?;
//!
//! let mut asset = Asset::new("BP_Switch");
//! asset.add_export(Export::new("Flip", "Function").with_function(asm.finish()?));
//!
//! let report = analyze_asset(&asset, &AnalysisOptions::default())?;
//! for block in &report.functions[0].blocks {
//!     println!("{} {:?}", block.id, block.statements);
//! }
//! # Ok::<(), kismetscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`bytecode`] - Expression model, opcodes, serialized sizes and a label assembler
//! - [`disassembler`] - Byte offset index over a function script
//! - [`analysis`] - Control flow graphs and pseudocode rendering
//! - [`pins`] - Pin blob decoding and node graph construction
//! - [`asset`] - Package model and the [`SymbolTable`] lookup service
//! - [`engine`] - Per-asset driver producing serializable reports
//!
//! ## Error Handling
//!
//! Fatal problems are returned as [`Error`]. Problems confined to one function or node are
//! recorded as [`Diagnostic`] values in the reports, so one broken function never hides the
//! rest of the asset.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

pub mod analysis;
pub mod asset;
pub mod bytecode;
pub mod diagnostics;
pub mod disassembler;
pub mod engine;
pub mod file;
pub mod pins;
pub mod prelude;
pub(crate) mod utils;

pub use analysis::{ControlFlowGraph, Renderer};
pub use asset::{
    Asset, EnumDef, Export, FunctionBody, FunctionFlags, Import, PackageIndex, PropertyBag,
    PropertyValue, SymbolTable,
};
pub use bytecode::ScriptLayout;
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use disassembler::OffsetIndex;
pub use engine::{
    analyze_asset, analyze_function, AnalysisOptions, AssetReport, BlockReport, FunctionReport,
};
pub use error::Error;
pub use file::parser::Parser;
pub use pins::{NodeGraph, PinVersion};

/// The result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
