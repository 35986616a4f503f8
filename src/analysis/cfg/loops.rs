//! Loop target detection.
//!
//! Kismet scripts carry no structured loop information. A block is flagged as a loop target when
//! at least one edge reaches it from a block that starts at the same or a later offset, which
//! covers both self loops and ordinary back edges.

use crate::analysis::cfg::BasicBlock;

/// Set [`BasicBlock::loop_target`] on every block reached by a backward or self edge.
pub(crate) fn mark_loop_targets(blocks: &mut [BasicBlock]) {
    let mut targets = vec![false; blocks.len()];

    for source in blocks.iter() {
        for target in source.successor_ids() {
            let Some(block) = blocks.get(target.index()) else {
                continue;
            };
            if block.start_offset <= source.start_offset {
                targets[target.index()] = true;
            }
        }
    }

    for (block, is_target) in blocks.iter_mut().zip(targets) {
        block.loop_target = is_target;
    }
}
