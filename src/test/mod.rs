//! Fixtures shared by unit tests.

use crate::{
    analysis::ControlFlowGraph,
    asset::{FunctionBody, PackageIndex},
    bytecode::{Expr, ExprKind, PropertyRef, ScriptAssembler, ScriptLayout},
};

/// Local variable named `name`, owned by the first export.
pub fn local(name: &str) -> Expr {
    Expr::new(ExprKind::LocalVariable(PropertyRef::field(
        name,
        PackageIndex::from_export(0),
    )))
}

/// `return` without a value.
pub fn ret() -> ExprKind {
    ExprKind::Return(Box::new(Expr::new(ExprKind::Nothing)))
}

/// Finish `asm` and build the graph of the resulting body.
pub fn assemble(asm: ScriptAssembler) -> (FunctionBody, ControlFlowGraph) {
    let body = asm.finish().unwrap();
    let cfg = ControlFlowGraph::from_script(&body.script, ScriptLayout::default(), body.script_size)
        .unwrap();
    (body, cfg)
}
