//! Per-asset analysis driver.
//!
//! [`analyze_asset`] runs two independent passes over an [`Asset`]:
//!
//! - the function pass builds the control flow graph and pseudocode of every function export;
//! - the pin pass builds the node graphs from the pin blobs of graph node exports.
//!
//! The passes run concurrently, and functions are analyzed in parallel unless
//! [`AnalysisOptions::parallel`] is off. A function that cannot be analyzed is reported with its
//! error; it never affects its siblings.
//!
//! # Examples
//!
//! ```rust
//! use kismetscope::bytecode::{Expr, ExprKind, ScriptAssembler, ScriptLayout};
//! use kismetscope::{analyze_asset, AnalysisOptions, Asset, Export};
//!
//! let mut asm = ScriptAssembler::new(ScriptLayout::default());
//! asm.emit(ExprKind::Return(Box::new(Expr::new(ExprKind::Nothing))))?;
//! asm.emit(ExprKind::EndOfScript)?;
//!
//! let mut asset = Asset::new("BP_Lamp");
//! asset.add_export(Export::new("Toggle", "Function").with_function(asm.finish()?));
//!
//! let report = analyze_asset(&asset, &AnalysisOptions::default())?;
//! let toggle = report.function("Toggle").unwrap();
//! assert_eq!(toggle.blocks.len(), 1);
//! assert_eq!(toggle.blocks[0].statements, vec!["return"]);
//! # Ok::<(), kismetscope::Error>(())
//! ```

mod options;
mod report;

pub use options::{AnalysisOptions, DEFAULT_NODE_CLASS_PREFIX};
pub use report::{AssetReport, BlockReport, FunctionReport};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    analysis::{ControlFlowGraph, Renderer},
    asset::{Asset, Export, FunctionBody, SymbolTable},
    bytecode::ScriptLayout,
    pins::build_node_graph,
    Error, Result,
};

/// Analyze one function body.
///
/// Never fails: offset or graph construction errors are stored in
/// [`FunctionReport::error`]. An empty script yields a report without blocks.
#[must_use]
pub fn analyze_function(
    name: &str,
    body: &FunctionBody,
    layout: ScriptLayout,
    symbols: &dyn SymbolTable,
    options: &AnalysisOptions,
) -> FunctionReport {
    let mut report = FunctionReport::new(name, body.flags);
    if body.script.is_empty() {
        return report;
    }

    let cfg = match ControlFlowGraph::from_script(&body.script, layout, body.script_size) {
        Ok(cfg) => cfg,
        Err(error) => {
            warn!(function = name, %error, "function skipped");
            report.error = Some(error.to_string());
            return report;
        }
    };

    let mut renderer = Renderer::new(symbols, &cfg).with_noise(options.keep_noise);
    let statements = renderer.render_blocks(&body.script);

    report.blocks = cfg
        .blocks()
        .iter()
        .zip(statements)
        .map(|(block, statements)| BlockReport {
            id: block.id,
            start_offset: block.start_offset,
            successors: block.successors.clone(),
            loop_target: block.loop_target,
            statements,
        })
        .collect();
    report.diagnostics = cfg.diagnostics().to_vec();
    report.diagnostics.extend(renderer.into_diagnostics());

    debug!(
        function = name,
        blocks = report.blocks.len(),
        loops = report.loop_count(),
        diagnostics = report.diagnostics.len(),
        "analyzed function"
    );

    report
}

fn function_pass(asset: &Asset, options: &AnalysisOptions) -> Vec<FunctionReport> {
    let run = |(_, export, body): (_, &Export, &FunctionBody)| {
        if options.is_cancelled() {
            let mut report = FunctionReport::new(&export.object_name, body.flags);
            report.error = Some(Error::Cancelled.to_string());
            report.cancelled = true;
            return report;
        }
        analyze_function(&export.object_name, body, asset.layout, asset, options)
    };

    if options.parallel {
        let functions: Vec<_> = asset.functions().collect();
        functions.into_par_iter().map(run).collect()
    } else {
        asset.functions().map(run).collect()
    }
}

/// Analyze every function and node graph of `asset`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the asset tables fail [`Asset::validate`]. Problems
/// local to a function or node are recorded in the report instead.
pub fn analyze_asset(asset: &Asset, options: &AnalysisOptions) -> Result<AssetReport> {
    asset.validate()?;

    let (functions, nodes) = rayon::join(
        || function_pass(asset, options),
        || build_node_graph(asset, options),
    );

    let report = AssetReport {
        name: asset.name.clone(),
        functions,
        nodes,
    };

    debug!(
        asset = %asset.name,
        functions = report.functions.len(),
        failed = report.failed_functions().count(),
        nodes = report.nodes.node_count(),
        "analyzed asset"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::{atomic::AtomicBool, Arc};

    use super::*;
    use crate::{
        asset::PackageIndex,
        bytecode::{BytecodeOffset, Expr, ExprKind, ScriptAssembler},
        test::{local, ret},
    };

    fn body() -> FunctionBody {
        let mut asm = ScriptAssembler::new(ScriptLayout::default());
        asm.jump_if_not(local("Cond"), "end").unwrap();
        asm.emit(ExprKind::Breakpoint).unwrap();
        asm.define_label("end").unwrap();
        asm.emit(ret()).unwrap();
        asm.finish().unwrap()
    }

    fn asset() -> Asset {
        let mut asset = Asset::new("BP_Test");
        asset.add_export(Export::new("BP_Test_C", "BlueprintGeneratedClass"));
        asset.add_export(Export::new("Good", "Function").with_function(body()));
        let bad = FunctionBody::new(vec![Expr::at(4, ExprKind::IntOne)]);
        asset.add_export(Export::new("Bad", "Function").with_function(bad));
        asset.add_export(Export::new("Empty", "Function").with_function(FunctionBody::new(vec![])));
        asset
    }

    #[test]
    fn test_failed_function_isolated() {
        for options in [AnalysisOptions::default(), AnalysisOptions::sequential()] {
            let report = analyze_asset(&asset(), &options).unwrap();
            assert_eq!(report.functions.len(), 3);

            let good = report.function("Good").unwrap();
            assert!(good.is_ok());
            assert_eq!(good.blocks.len(), 3);
            assert!(good.blocks[1].statements.is_empty());

            let bad = report.function("Bad").unwrap();
            assert!(bad.error.is_some());
            assert!(bad.blocks.is_empty());

            let empty = report.function("Empty").unwrap();
            assert!(empty.is_ok());
            assert!(empty.blocks.is_empty());
        }
    }

    #[test]
    fn test_keep_noise() {
        let symbols = asset();
        let report = analyze_function(
            "Good",
            &body(),
            ScriptLayout::default(),
            &symbols,
            &AnalysisOptions::default().with_noise(true),
        );
        assert_eq!(report.blocks[1].statements, vec!["// Breakpoint"]);
    }

    #[test]
    fn test_cancelled_before_start() {
        let flag = Arc::new(AtomicBool::new(true));
        let options = AnalysisOptions::sequential().with_cancel(flag);
        let report = analyze_asset(&asset(), &options).unwrap();
        assert!(report.functions.iter().all(|f| f.cancelled));
    }

    #[test]
    fn test_invalid_asset_rejected() {
        let mut asset = asset();
        asset.exports[1].outer = PackageIndex::from_export(1);
        assert!(matches!(
            analyze_asset(&asset, &AnalysisOptions::default()),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_jump_targets_in_report() {
        let report = analyze_function(
            "Good",
            &body(),
            ScriptLayout::default(),
            &asset(),
            &AnalysisOptions::default(),
        );
        assert_eq!(report.blocks[0].start_offset, BytecodeOffset(0));
        assert_eq!(
            report.blocks[0].successor_ids().map(|b| b.index()).collect::<Vec<_>>(),
            vec![2, 1]
        );
        assert_eq!(
            report.blocks[0].statements,
            vec!["if not (Cond) goto block_2"]
        );
    }
}
