//! Serializable analysis results.
//!
//! Reports own all of their data, so they outlive the asset they were built from and serialize
//! straight to JSON.

use serde::Serialize;

use crate::{
    analysis::{BlockId, Successor},
    asset::FunctionFlags,
    bytecode::BytecodeOffset,
    diagnostics::{Diagnostic, Severity},
    pins::NodeGraph,
};

/// One block of a function report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockReport {
    /// Block identifier
    pub id: BlockId,
    /// Offset of the first instruction
    pub start_offset: BytecodeOffset,
    /// Ordered successor list
    pub successors: Vec<Successor>,
    /// Reached by a backward or self edge
    pub loop_target: bool,
    /// Pseudocode, one entry per rendered instruction
    pub statements: Vec<String>,
}

impl BlockReport {
    /// Resolved successor identifiers, in successor order.
    pub fn successor_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.successors.iter().filter_map(|s| s.block())
    }
}

/// Analysis result for one function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionReport {
    /// Function name
    pub name: String,
    /// Function flags
    pub flags: FunctionFlags,
    /// Readable flag summary such as `public static`
    pub flag_summary: String,
    /// Blocks in offset order; empty when the function failed
    pub blocks: Vec<BlockReport>,
    /// Findings that did not stop the analysis
    pub diagnostics: Vec<Diagnostic>,
    /// Why the function could not be analyzed
    pub error: Option<String>,
    /// The function was skipped because analysis was cancelled
    pub cancelled: bool,
}

impl FunctionReport {
    pub(crate) fn new(name: &str, flags: FunctionFlags) -> Self {
        FunctionReport {
            name: name.to_string(),
            flags,
            flag_summary: flags.summary(),
            blocks: Vec::new(),
            diagnostics: Vec::new(),
            error: None,
            cancelled: false,
        }
    }

    /// Returns `true` if blocks were produced without a fatal error.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Number of loop target blocks.
    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.loop_target).count()
    }
}

/// Analysis result for a whole asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetReport {
    /// Asset name
    pub name: String,
    /// One report per function export, in export order
    pub functions: Vec<FunctionReport>,
    /// Node graphs built from the pin blobs
    pub nodes: NodeGraph,
}

impl AssetReport {
    /// Report of the function called `name`.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionReport> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Functions that failed or were cancelled.
    pub fn failed_functions(&self) -> impl Iterator<Item = &FunctionReport> {
        self.functions.iter().filter(|f| !f.is_ok())
    }

    /// All diagnostics of the asset: function findings in export order, then node findings.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.functions
            .iter()
            .flat_map(|f| f.diagnostics.iter())
            .chain(self.nodes.diagnostics.iter())
    }

    /// Number of diagnostics with error severity.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }
}
