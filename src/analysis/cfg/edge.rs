//! Control flow edges between basic blocks.

use serde::Serialize;

use crate::analysis::cfg::BlockId;

/// The kind of control flow represented by an edge.
///
/// # Examples
///
/// ```rust
/// use kismetscope::analysis::EdgeKind;
///
/// assert!(EdgeKind::JumpTarget.is_conditional());
/// assert!(!EdgeKind::Unconditional.is_conditional());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EdgeKind {
    /// Direct jump, or the single fall-through of a block without a branch
    Unconditional,
    /// Destination of a conditional jump, taken when the condition is false
    JumpTarget,
    /// Fall-through of a conditional or flow-stack instruction
    FallThrough,
    /// Switch arm at the given case position
    SwitchCase(usize),
    /// Switch end, reached when no case matched
    SwitchDefault,
    /// Offset pushed onto the execution flow stack
    FlowPush,
    /// Possible resumption point of a pop from the execution flow stack
    FlowPop,
}

impl EdgeKind {
    /// Returns `true` for edges that are only taken under a runtime condition.
    #[must_use]
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            EdgeKind::JumpTarget
                | EdgeKind::FallThrough
                | EdgeKind::SwitchCase(_)
                | EdgeKind::SwitchDefault
        )
    }

    /// Label used when drawing the edge.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            EdgeKind::Unconditional => String::new(),
            EdgeKind::JumpTarget => "false".to_string(),
            EdgeKind::FallThrough => "fallthrough".to_string(),
            EdgeKind::SwitchCase(index) => format!("case {index}"),
            EdgeKind::SwitchDefault => "default".to_string(),
            EdgeKind::FlowPush => "push".to_string(),
            EdgeKind::FlowPop => "pop".to_string(),
        }
    }
}

/// One entry of a block's ordered successor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Successor {
    /// Control continues at the given block
    Block(BlockId, EdgeKind),
    /// The destination could not be determined statically, or lies outside the function
    Unresolved,
}

impl Successor {
    /// The destination block, if resolved.
    #[must_use]
    pub fn block(self) -> Option<BlockId> {
        match self {
            Successor::Block(id, _) => Some(id),
            Successor::Unresolved => None,
        }
    }

    /// The edge kind, if resolved.
    #[must_use]
    pub fn kind(self) -> Option<EdgeKind> {
        match self {
            Successor::Block(_, kind) => Some(kind),
            Successor::Unresolved => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successor_accessors() {
        let resolved = Successor::Block(BlockId::new(3), EdgeKind::FlowPop);
        assert_eq!(resolved.block(), Some(BlockId::new(3)));
        assert_eq!(resolved.kind(), Some(EdgeKind::FlowPop));
        assert_eq!(Successor::Unresolved.block(), None);
    }

    #[test]
    fn test_edge_labels() {
        assert_eq!(EdgeKind::SwitchCase(2).label(), "case 2");
        assert_eq!(EdgeKind::Unconditional.label(), "");
        assert!(EdgeKind::SwitchDefault.is_conditional());
        assert!(!EdgeKind::FlowPush.is_conditional());
    }
}
