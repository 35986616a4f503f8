//! Byte offset index over a function's top-level instructions.
//!
//! Control transfer instructions name their destination as a byte offset, while the analyses
//! work on instruction sequence indices. [`OffsetIndex`] bridges the two: it records where each
//! instruction starts, checks that against any offsets the deserializer recorded, and answers
//! offset → index queries in both exact and containing form.

use crate::{
    bytecode::{BytecodeOffset, Expr, ScriptLayout},
    Result,
};

/// Monotonic map between instruction indices and their byte offsets.
///
/// # Examples
///
/// ```rust
/// use kismetscope::bytecode::{BytecodeOffset, Expr, ExprKind, ScriptLayout};
/// use kismetscope::OffsetIndex;
///
/// let script = vec![
///     Expr::new(ExprKind::Jump { target: BytecodeOffset(5) }), // 5 bytes
///     Expr::new(ExprKind::Return(Box::new(Expr::new(ExprKind::Nothing)))), // 2 bytes
///     Expr::new(ExprKind::EndOfScript), // 1 byte
/// ];
/// let index = OffsetIndex::build(&script, ScriptLayout::default(), Some(8))?;
///
/// assert_eq!(index.offset_of(1), Some(BytecodeOffset(5)));
/// assert_eq!(index.index_of(BytecodeOffset(7)), Some(2));
/// assert_eq!(index.index_containing(BytecodeOffset(6)), Some(1));
/// assert_eq!(index.end_offset(), BytecodeOffset(8));
/// # Ok::<(), kismetscope::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetIndex {
    starts: Vec<BytecodeOffset>,
    end: BytecodeOffset,
}

impl OffsetIndex {
    /// Compute the start offset of every instruction in `script`.
    ///
    /// `declared_size`, when the package provides it, must equal the computed end of the last
    /// instruction.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a recorded instruction offset disagrees with the
    /// computed one, if the declared size disagrees with the computed total, or if the script
    /// does not fit in 32-bit offsets.
    pub fn build(
        script: &[Expr],
        layout: ScriptLayout,
        declared_size: Option<u32>,
    ) -> Result<Self> {
        let mut starts = Vec::with_capacity(script.len());
        let mut position: u32 = 0;

        for (index, expr) in script.iter().enumerate() {
            if let Some(recorded) = expr.offset {
                if recorded.0 != position {
                    return Err(malformed_error!(
                        "Instruction {} recorded at {} but computed at {}",
                        index,
                        recorded,
                        BytecodeOffset(position)
                    ));
                }
            }

            starts.push(BytecodeOffset(position));

            let size = u32::try_from(expr.serialized_size(layout)?)
                .map_err(|_| malformed_error!("Instruction {} exceeds the offset range", index))?;
            position = position
                .checked_add(size)
                .ok_or_else(|| malformed_error!("Script exceeds the offset range"))?;
        }

        if let Some(declared) = declared_size {
            if declared != position {
                return Err(malformed_error!(
                    "Declared script size {} differs from computed size {}",
                    declared,
                    position
                ));
            }
        }

        Ok(OffsetIndex {
            starts,
            end: BytecodeOffset(position),
        })
    }

    /// Number of indexed instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// Returns `true` if the script has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Start offset of instruction `index`.
    #[must_use]
    pub fn offset_of(&self, index: usize) -> Option<BytecodeOffset> {
        self.starts.get(index).copied()
    }

    /// Offset directly after instruction `index`.
    #[must_use]
    pub fn next_offset(&self, index: usize) -> Option<BytecodeOffset> {
        if index >= self.starts.len() {
            return None;
        }
        Some(self.starts.get(index + 1).copied().unwrap_or(self.end))
    }

    /// Index of the instruction starting exactly at `offset`.
    #[must_use]
    pub fn index_of(&self, offset: BytecodeOffset) -> Option<usize> {
        self.starts.binary_search(&offset).ok()
    }

    /// Index of the instruction whose byte range contains `offset`.
    #[must_use]
    pub fn index_containing(&self, offset: BytecodeOffset) -> Option<usize> {
        if offset >= self.end {
            return None;
        }
        match self.starts.binary_search(&offset) {
            Ok(index) => Some(index),
            Err(0) => None,
            Err(insert) => Some(insert - 1),
        }
    }

    /// Offset one past the last instruction, i.e. the script size.
    #[must_use]
    pub fn end_offset(&self) -> BytecodeOffset {
        self.end
    }

    /// Start offsets in instruction order.
    #[must_use]
    pub fn offsets(&self) -> &[BytecodeOffset] {
        &self.starts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        asset::PackageIndex,
        bytecode::{ExprKind, PropertyRef},
        Error,
    };

    fn local(name: &str) -> Expr {
        Expr::new(ExprKind::LocalVariable(PropertyRef::field(
            name,
            PackageIndex::from_export(0),
        )))
    }

    fn script() -> Vec<Expr> {
        vec![
            Expr::new(ExprKind::JumpIfNot {
                target: BytecodeOffset(24),
                condition: Box::new(local("Cond")),
            }),
            Expr::new(ExprKind::Let {
                property: None,
                variable: Box::new(local("A")),
                value: Box::new(Expr::new(ExprKind::IntOne)),
            }),
            Expr::new(ExprKind::Return(Box::new(Expr::new(ExprKind::Nothing)))),
            Expr::new(ExprKind::EndOfScript),
        ]
    }

    #[test]
    fn test_build_offsets() {
        let index = OffsetIndex::build(&script(), ScriptLayout::default(), None).unwrap();
        assert_eq!(
            index.offsets(),
            &[
                BytecodeOffset(0),
                BytecodeOffset(14),
                BytecodeOffset(33),
                BytecodeOffset(35)
            ]
        );
        assert_eq!(index.end_offset(), BytecodeOffset(36));
        assert_eq!(index.next_offset(3), Some(BytecodeOffset(36)));
        assert_eq!(index.next_offset(4), None);
    }

    #[test]
    fn test_lookups() {
        let index = OffsetIndex::build(&script(), ScriptLayout::default(), None).unwrap();
        assert_eq!(index.index_of(BytecodeOffset(14)), Some(1));
        assert_eq!(index.index_of(BytecodeOffset(15)), None);
        assert_eq!(index.index_containing(BytecodeOffset(15)), Some(1));
        assert_eq!(index.index_containing(BytecodeOffset(0)), Some(0));
        assert_eq!(index.index_containing(BytecodeOffset(36)), None);
    }

    #[test]
    fn test_recorded_offsets_match() {
        let mut exprs = script();
        exprs[1].offset = Some(BytecodeOffset(14));
        exprs[3].offset = Some(BytecodeOffset(35));
        assert!(OffsetIndex::build(&exprs, ScriptLayout::default(), Some(36)).is_ok());
    }

    #[test]
    fn test_recorded_offset_mismatch() {
        let mut exprs = script();
        exprs[2].offset = Some(BytecodeOffset(30));
        let result = OffsetIndex::build(&exprs, ScriptLayout::default(), None);
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_declared_size_mismatch() {
        let result = OffsetIndex::build(&script(), ScriptLayout::default(), Some(40));
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_empty_script() {
        let index = OffsetIndex::build(&[], ScriptLayout::default(), None).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.end_offset(), BytecodeOffset(0));
        assert_eq!(index.index_containing(BytecodeOffset(0)), None);
    }
}
