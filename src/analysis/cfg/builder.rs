//! Partitioning of a function script into basic blocks.
//!
//! Construction runs in four passes over the top-level instructions:
//!
//! 1. classify how every instruction transfers control;
//! 2. collect block leaders: the entry, every resolvable control transfer target and the
//!    instruction after every jump-like instruction;
//! 3. cut the instruction sequence at the leaders and record block membership in a side table;
//! 4. derive each block's ordered successor list from its terminating instruction.
//!
//! Loop targets are marked afterwards by [`super::loops`].

use std::collections::BTreeSet;

use tracing::warn;

use crate::{
    analysis::cfg::{BasicBlock, BlockId, EdgeKind, Successor},
    bytecode::{BytecodeOffset, Expr, ExprKind},
    diagnostics::{Diagnostic, DiagnosticKind},
    disassembler::OffsetIndex,
};

/// How an instruction hands over control.
#[derive(Debug, Clone)]
pub(crate) enum Flow {
    /// Continue with the next instruction
    Next,
    Jump(BytecodeOffset),
    JumpIfNot(BytecodeOffset),
    Switch {
        cases: Vec<BytecodeOffset>,
        end: BytecodeOffset,
    },
    Return,
    EndOfScript,
    Push(BytecodeOffset),
    Pop,
    PopIfNot,
    Computed,
    Unknown(u8),
}

impl Flow {
    pub(crate) fn of(expr: &Expr) -> Flow {
        match &expr.kind {
            ExprKind::Jump { target } => Flow::Jump(*target),
            ExprKind::JumpIfNot { target, .. } => Flow::JumpIfNot(*target),
            ExprKind::SwitchValue {
                cases, end_offset, ..
            } => Flow::Switch {
                cases: cases.iter().map(|case| case.next_offset).collect(),
                end: *end_offset,
            },
            ExprKind::Return(_) => Flow::Return,
            ExprKind::EndOfScript => Flow::EndOfScript,
            ExprKind::PushExecutionFlow { push_offset } => Flow::Push(*push_offset),
            ExprKind::PopExecutionFlow => Flow::Pop,
            ExprKind::PopExecutionFlowIfNot { .. } => Flow::PopIfNot,
            ExprKind::ComputedJump { .. } => Flow::Computed,
            ExprKind::Unknown { opcode, .. } => Flow::Unknown(*opcode),
            _ => Flow::Next,
        }
    }

    /// Returns `true` if the instruction after this one must start a new block.
    fn ends_block(&self) -> bool {
        !matches!(self, Flow::Next | Flow::Return | Flow::EndOfScript)
    }

    /// Destinations named by this instruction.
    fn targets(&self) -> Vec<BytecodeOffset> {
        match self {
            Flow::Jump(target) | Flow::JumpIfNot(target) | Flow::Push(target) => vec![*target],
            Flow::Switch { cases, end } => cases.iter().copied().chain([*end]).collect(),
            _ => Vec::new(),
        }
    }
}

/// Result of resolving a byte offset against the instruction index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolved {
    Exact(usize),
    Inside(usize),
    Dangling,
}

pub(crate) struct Partition {
    pub(crate) blocks: Vec<BasicBlock>,
    pub(crate) block_of: Vec<BlockId>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

pub(crate) struct CfgBuilder<'a> {
    script: &'a [Expr],
    offsets: &'a OffsetIndex,
    flows: Vec<Flow>,
    pushed: Vec<BytecodeOffset>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> CfgBuilder<'a> {
    pub(crate) fn new(script: &'a [Expr], offsets: &'a OffsetIndex) -> Self {
        let flows: Vec<Flow> = script.iter().map(Flow::of).collect();

        let mut pushed = Vec::new();
        for flow in &flows {
            if let Flow::Push(target) = flow {
                if !pushed.contains(target) {
                    pushed.push(*target);
                }
            }
        }

        CfgBuilder {
            script,
            offsets,
            flows,
            pushed,
            diagnostics: Vec::new(),
        }
    }

    fn resolve(&self, target: BytecodeOffset) -> Resolved {
        if let Some(index) = self.offsets.index_of(target) {
            return Resolved::Exact(index);
        }
        match self.offsets.index_containing(target) {
            Some(index) => Resolved::Inside(index),
            None => Resolved::Dangling,
        }
    }

    fn offset_of(&self, index: usize) -> BytecodeOffset {
        self.offsets.offset_of(index).unwrap_or_default()
    }

    fn leaders(&mut self) -> BTreeSet<usize> {
        let count = self.script.len();
        let mut leaders = BTreeSet::new();
        leaders.insert(0);

        for index in 0..count {
            let flow = self.flows[index].clone();

            if let Flow::Unknown(opcode) = flow {
                let offset = self.offset_of(index);
                warn!(opcode, %offset, "unsupported opcode isolated in its own block");
                self.diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::UnsupportedOpcode,
                        format!("Unsupported opcode 0x{opcode:02X}"),
                    )
                    .at(offset),
                );
                leaders.insert(index);
            }

            if flow.ends_block() && index + 1 < count {
                leaders.insert(index + 1);
            }

            // A trailing end-of-script marker stays with its return.
            if matches!(flow, Flow::Return)
                && self.script[index + 1..].iter().any(|expr| !expr.is_noise())
            {
                leaders.insert(index + 1);
            }

            for target in flow.targets() {
                match self.resolve(target) {
                    Resolved::Exact(leader) => {
                        leaders.insert(leader);
                    }
                    Resolved::Inside(leader) => {
                        let source = self.offset_of(index);
                        warn!(%source, %target, "jump target inside an instruction");
                        self.diagnostics.push(
                            Diagnostic::warning(
                                DiagnosticKind::MisalignedTarget,
                                format!(
                                    "Target {target} lies inside the instruction at {}",
                                    self.offset_of(leader)
                                ),
                            )
                            .at(source),
                        );
                        leaders.insert(leader);
                    }
                    Resolved::Dangling => {
                        let source = self.offset_of(index);
                        warn!(%source, %target, "jump target outside the function");
                        self.diagnostics.push(
                            Diagnostic::warning(
                                DiagnosticKind::DanglingReference,
                                format!("Target {target} lies outside the function"),
                            )
                            .at(source),
                        );
                    }
                }
            }
        }

        leaders
    }

    pub(crate) fn build(mut self) -> Partition {
        let count = self.script.len();
        let leaders: Vec<usize> = self.leaders().into_iter().collect();

        let mut blocks = Vec::with_capacity(leaders.len());
        let mut block_of = vec![BlockId::new(0); count];
        for (position, &start) in leaders.iter().enumerate() {
            let end = leaders.get(position + 1).copied().unwrap_or(count);
            let id = BlockId::new(position);
            for slot in &mut block_of[start..end] {
                *slot = id;
            }
            blocks.push(BasicBlock {
                id,
                start_offset: self.offset_of(start),
                instructions: start..end,
                successors: Vec::new(),
                loop_target: false,
                unresolved: false,
            });
        }

        for block in &mut blocks {
            let Some(last) = block.last_instruction() else {
                continue;
            };
            let successors = self.successors(last, &block_of);
            block.unresolved = successors.contains(&Successor::Unresolved);
            block.successors = successors;
        }

        Partition {
            blocks,
            block_of,
            diagnostics: self.diagnostics,
        }
    }

    fn edge(&self, target: BytecodeOffset, kind: EdgeKind, block_of: &[BlockId]) -> Successor {
        match self.resolve(target) {
            Resolved::Exact(index) | Resolved::Inside(index) => {
                Successor::Block(block_of[index], kind)
            }
            Resolved::Dangling => Successor::Unresolved,
        }
    }

    fn fall_through(
        &self,
        index: usize,
        kind: EdgeKind,
        block_of: &[BlockId],
    ) -> Option<Successor> {
        block_of
            .get(index + 1)
            .map(|&block| Successor::Block(block, kind))
    }

    fn successors(&mut self, index: usize, block_of: &[BlockId]) -> Vec<Successor> {
        let offset = self.offset_of(index);
        match self.flows[index].clone() {
            Flow::Jump(target) => vec![self.edge(target, EdgeKind::Unconditional, block_of)],
            Flow::JumpIfNot(target) => {
                let taken = self.edge(target, EdgeKind::JumpTarget, block_of);
                let next = self
                    .fall_through(index, EdgeKind::FallThrough, block_of)
                    .unwrap_or_else(|| {
                        self.unresolved(offset, "Conditional jump falls off the end of the script")
                    });
                vec![taken, next]
            }
            Flow::Switch { cases, end } => cases
                .iter()
                .enumerate()
                .map(|(position, &target)| {
                    self.edge(target, EdgeKind::SwitchCase(position), block_of)
                })
                .chain([self.edge(end, EdgeKind::SwitchDefault, block_of)])
                .collect(),
            Flow::Return | Flow::EndOfScript => Vec::new(),
            Flow::Push(target) => {
                let mut successors = Vec::with_capacity(2);
                successors.extend(self.fall_through(index, EdgeKind::FallThrough, block_of));
                successors.push(self.edge(target, EdgeKind::FlowPush, block_of));
                successors
            }
            Flow::Pop => {
                if self.pushed.is_empty() {
                    warn!(%offset, "execution flow pop without any push in the function");
                    return vec![self.unresolved(offset, "Pop without any pushed offset")];
                }
                self.pop_targets(block_of)
            }
            Flow::PopIfNot => {
                let mut successors = self.pop_targets(block_of);
                if successors.is_empty() {
                    warn!(%offset, "execution flow pop without any push in the function");
                    successors.push(self.unresolved(offset, "Pop without any pushed offset"));
                }
                successors.extend(self.fall_through(index, EdgeKind::FallThrough, block_of));
                successors
            }
            Flow::Computed => {
                warn!(%offset, "computed jump left unresolved");
                vec![self.unresolved(offset, "Computed jump target is not statically known")]
            }
            Flow::Next | Flow::Unknown(_) => self
                .fall_through(index, EdgeKind::Unconditional, block_of)
                .into_iter()
                .collect(),
        }
    }

    fn pop_targets(&self, block_of: &[BlockId]) -> Vec<Successor> {
        let mut successors: Vec<Successor> = Vec::with_capacity(self.pushed.len());
        for &target in &self.pushed {
            let successor = self.edge(target, EdgeKind::FlowPop, block_of);
            if !successors.contains(&successor) {
                successors.push(successor);
            }
        }
        successors
    }

    fn unresolved(&mut self, offset: BytecodeOffset, message: &str) -> Successor {
        self.diagnostics.push(
            Diagnostic::warning(DiagnosticKind::UnresolvedControlFlow, message).at(offset),
        );
        Successor::Unresolved
    }
}
