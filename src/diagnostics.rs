//! Non-fatal findings collected while analyzing an asset.
//!
//! A single unsupported opcode or a corrupt pin blob should not cost the caller the rest of
//! the function or graph. Such problems are recorded as [`Diagnostic`] values, logged through
//! `tracing` at the point they are found, and returned alongside the produced report.

use std::fmt;

use serde::Serialize;

use crate::bytecode::BytecodeOffset;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    /// Output is complete but may be approximate
    Warning,
    /// Part of the output had to be dropped or replaced by a placeholder
    Error,
}

/// Category of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// An opcode without known semantics
    UnsupportedOpcode,
    /// Input that could not be decoded
    MalformedInput,
    /// A reference to an object, name or pin that does not exist
    DanglingReference,
    /// A control transfer whose destination cannot be determined statically
    UnresolvedControlFlow,
    /// A jump target that does not start an instruction
    MisalignedTarget,
}

/// A single finding with optional bytecode location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Seriousness
    pub severity: Severity,
    /// Category
    pub kind: DiagnosticKind,
    /// Human readable description
    pub message: String,
    /// Offset of the instruction concerned, for bytecode findings
    pub offset: Option<BytecodeOffset>,
}

impl Diagnostic {
    /// Create a warning.
    #[must_use]
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            offset: None,
        }
    }

    /// Create an error.
    #[must_use]
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            kind,
            message: message.into(),
            offset: None,
        }
    }

    /// Attach a bytecode location.
    #[must_use]
    pub fn at(mut self, offset: BytecodeOffset) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match self.offset {
            Some(offset) => write!(f, "{level} at {offset}: {}", self.message),
            None => write!(f, "{level}: {}", self.message),
        }
    }
}
