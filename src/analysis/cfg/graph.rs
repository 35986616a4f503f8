//! Control flow graph of one function.

use std::fmt::Write;

use crate::{
    analysis::cfg::{
        builder::CfgBuilder, loops::mark_loop_targets, BasicBlock, BlockId, Successor,
    },
    bytecode::{BytecodeOffset, Expr, ScriptLayout},
    diagnostics::Diagnostic,
    disassembler::OffsetIndex,
    utils::escape_dot,
    Error, Result,
};

/// Basic blocks of a function with their ordered successor lists.
///
/// The graph is immutable once built. Block identifiers are dense and follow offset order; block
/// `0` is the entry. The per-instruction block table is kept beside the expressions, which stay
/// untouched.
///
/// # Examples
///
/// ```rust
/// use kismetscope::analysis::ControlFlowGraph;
/// use kismetscope::bytecode::{Expr, ExprKind, ScriptAssembler, ScriptLayout};
///
/// let mut asm = ScriptAssembler::new(ScriptLayout::default());
/// asm.jump_if_not(Expr::new(ExprKind::True), "else")?;
/// asm.emit(ExprKind::Return(Box::new(Expr::new(ExprKind::Nothing))))?;
/// asm.define_label("else")?;
/// asm.emit(ExprKind::EndOfScript)?;
/// let body = asm.finish()?;
///
/// let cfg = ControlFlowGraph::from_script(&body.script, ScriptLayout::default(), body.script_size)?;
/// assert_eq!(cfg.block_count(), 3);
/// let successors: Vec<usize> = cfg.successors(cfg.entry()).map(|b| b.index()).collect();
/// assert_eq!(successors, vec![2, 1]);
/// # Ok::<(), kismetscope::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    blocks: Vec<BasicBlock>,
    block_of: Vec<BlockId>,
    predecessors: Vec<Vec<BlockId>>,
    exits: Vec<BlockId>,
    offsets: OffsetIndex,
    diagnostics: Vec<Diagnostic>,
}

impl ControlFlowGraph {
    /// Index `script` and build its graph.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for an empty script and [`crate::Error::Malformed`] if the
    /// script offsets are inconsistent (see [`OffsetIndex::build`]).
    pub fn from_script(
        script: &[Expr],
        layout: ScriptLayout,
        declared_size: Option<u32>,
    ) -> Result<Self> {
        let offsets = OffsetIndex::build(script, layout, declared_size)?;
        ControlFlowGraph::build(script, offsets)
    }

    /// Build the graph of `script` using a prepared offset index.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for an empty script and [`crate::Error::GraphError`] if
    /// `offsets` does not index `script`.
    pub fn build(script: &[Expr], offsets: OffsetIndex) -> Result<Self> {
        if script.is_empty() {
            return Err(Error::Empty);
        }
        if offsets.len() != script.len() {
            return Err(Error::GraphError(format!(
                "Offset index covers {} instructions, script has {}",
                offsets.len(),
                script.len()
            )));
        }

        let partition = CfgBuilder::new(script, &offsets).build();
        let mut blocks = partition.blocks;
        mark_loop_targets(&mut blocks);

        let mut predecessors = vec![Vec::new(); blocks.len()];
        let mut exits = Vec::new();
        for block in &blocks {
            if block.successors.is_empty() {
                exits.push(block.id);
            }
            for target in block.successor_ids() {
                let preds: &mut Vec<BlockId> = &mut predecessors[target.index()];
                if !preds.contains(&block.id) {
                    preds.push(block.id);
                }
            }
        }

        Ok(ControlFlowGraph {
            blocks,
            block_of: partition.block_of,
            predecessors,
            exits,
            offsets,
            diagnostics: partition.diagnostics,
        })
    }

    /// The entry block.
    #[must_use]
    pub fn entry(&self) -> BlockId {
        BlockId::new(0)
    }

    /// All blocks in offset order.
    #[must_use]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Block with the given identifier.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index())
    }

    /// Block containing the instruction at sequence index `index`.
    #[must_use]
    pub fn block_of_instruction(&self, index: usize) -> Option<BlockId> {
        self.block_of.get(index).copied()
    }

    /// Block containing the byte at `offset`.
    #[must_use]
    pub fn block_at_offset(&self, offset: BytecodeOffset) -> Option<BlockId> {
        self.offsets
            .index_containing(offset)
            .and_then(|index| self.block_of_instruction(index))
    }

    /// Resolved successors of `id`, in successor order.
    pub fn successors(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.block(id)
            .into_iter()
            .flat_map(|block| block.successor_ids())
    }

    /// Distinct predecessors of `id`, in block order of first discovery.
    #[must_use]
    pub fn predecessors(&self, id: BlockId) -> &[BlockId] {
        self.predecessors
            .get(id.index())
            .map_or(&[], Vec::as_slice)
    }

    /// Blocks without successors.
    #[must_use]
    pub fn exits(&self) -> &[BlockId] {
        &self.exits
    }

    /// Blocks flagged as loop targets.
    pub fn loop_targets(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks
            .iter()
            .filter(|block| block.loop_target)
            .map(|block| block.id)
    }

    /// Returns `true` if any block is a loop target.
    #[must_use]
    pub fn has_loops(&self) -> bool {
        self.blocks.iter().any(|block| block.loop_target)
    }

    /// The offset index the graph was built from.
    #[must_use]
    pub fn offsets(&self) -> &OffsetIndex {
        &self.offsets
    }

    /// Warnings recorded during construction.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Render the graph in DOT format.
    ///
    /// When `statements` is given, entry `i` is printed as the body of block `i`.
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>, statements: Option<&[Vec<String>]>) -> String {
        let mut dot = String::new();

        dot.push_str("digraph CFG {\n");
        if let Some(name) = title {
            let _ = writeln!(dot, "    label=\"CFG: {}\";", escape_dot(name));
        }
        dot.push_str("    labelloc=t;\n");
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n");
        dot.push_str("    edge [fontname=\"Courier\", fontsize=9];\n\n");

        for block in &self.blocks {
            let is_entry = block.id == self.entry();
            let is_exit = self.exits.contains(&block.id);

            let mut label = format!("{} @ {}", block.id, block.start_offset);
            if is_entry {
                label.push_str(" (entry)");
            }
            if block.loop_target {
                label.push_str(" (loop)");
            }
            label.push_str("\\l");
            if let Some(lines) = statements.and_then(|s| s.get(block.id.index())) {
                for line in lines {
                    label.push_str(&escape_dot(line));
                    label.push_str("\\l");
                }
            }

            let style = if is_entry {
                ", style=filled, fillcolor=lightgreen"
            } else if is_exit {
                ", style=filled, fillcolor=lightcoral"
            } else {
                ""
            };

            let _ = writeln!(dot, "    B{} [label=\"{label}\"{style}];", block.id.index());
        }

        dot.push('\n');

        for block in &self.blocks {
            for successor in &block.successors {
                match successor {
                    Successor::Block(target, kind) => {
                        let color = if kind.is_conditional() { "blue" } else { "black" };
                        let _ = writeln!(
                            dot,
                            "    B{} -> B{} [label=\"{}\", color={color}];",
                            block.id.index(),
                            target.index(),
                            escape_dot(&kind.label())
                        );
                    }
                    Successor::Unresolved => {
                        let _ = writeln!(
                            dot,
                            "    B{}_unresolved [label=\"?\", shape=plaintext];",
                            block.id.index()
                        );
                        let _ = writeln!(
                            dot,
                            "    B{0} -> B{0}_unresolved [style=dashed, color=red];",
                            block.id.index()
                        );
                    }
                }
            }
        }

        dot.push_str("}\n");
        dot
    }
}
