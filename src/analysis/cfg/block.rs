use std::{fmt, ops::Range};

use serde::Serialize;

use crate::{
    analysis::cfg::Successor,
    bytecode::BytecodeOffset,
};

/// Identifier of a basic block: its position in block order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BlockId(usize);

impl BlockId {
    /// Create a block identifier.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        BlockId(index)
    }

    /// Position in block order.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block_{}", self.0)
    }
}

impl From<usize> for BlockId {
    #[inline]
    fn from(index: usize) -> Self {
        BlockId(index)
    }
}

/// A maximal straight-line run of instructions.
///
/// Blocks partition the function: every instruction belongs to exactly one block and the
/// instruction ranges of consecutive blocks are adjacent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    /// Identifier, equal to the block's position
    pub id: BlockId,
    /// Byte offset of the first instruction
    pub start_offset: BytecodeOffset,
    /// Sequence indices of the instructions in this block
    pub instructions: Range<usize>,
    /// Ordered successor list
    pub successors: Vec<Successor>,
    /// Some edge reaches this block from a block at the same or a later offset
    pub loop_target: bool,
    /// At least one successor could not be resolved
    pub unresolved: bool,
}

impl BasicBlock {
    /// Number of instructions in this block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the block holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Sequence index of the terminating instruction.
    #[must_use]
    pub fn last_instruction(&self) -> Option<usize> {
        self.instructions.clone().last()
    }

    /// Resolved successor block identifiers, in successor order.
    pub fn successor_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.successors.iter().filter_map(|s| s.block())
    }
}
