//! Benchmarks for control flow graph construction and pseudocode rendering.
//!
//! The input is a synthetic script of chained conditionals, each guarding a local assignment,
//! which is the dominant shape of compiled event graphs.

extern crate kismetscope;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kismetscope::prelude::*;
use std::hint::black_box;

fn local(name: &str) -> Expr {
    Expr::new(ExprKind::LocalVariable(PropertyRef::field(
        name,
        PackageIndex::from_export(0),
    )))
}

/// Build a script with `branches` conditional blocks.
fn chained_branches(branches: usize) -> FunctionBody {
    let mut asm = ScriptAssembler::new(ScriptLayout::default());
    for i in 0..branches {
        let skip = format!("skip_{i}");
        asm.jump_if_not(local("Enabled"), &skip).unwrap();
        asm.emit(ExprKind::Let {
            property: None,
            variable: Box::new(local("Counter")),
            value: Box::new(Expr::new(ExprKind::IntConst(i as i32))),
        })
        .unwrap();
        asm.define_label(&skip).unwrap();
    }
    asm.emit(ExprKind::Return(Box::new(Expr::new(ExprKind::Nothing))))
        .unwrap();
    asm.emit(ExprKind::EndOfScript).unwrap();
    asm.finish().unwrap()
}

fn bench_cfg_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("cfg_build");
    for branches in [16, 256, 4096] {
        let body = chained_branches(branches);
        group.throughput(Throughput::Elements(body.script.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(branches), &body, |b, body| {
            b.iter(|| {
                let cfg = ControlFlowGraph::from_script(
                    black_box(&body.script),
                    ScriptLayout::default(),
                    body.script_size,
                )
                .unwrap();
                black_box(cfg)
            });
        });
    }
    group.finish();
}

fn bench_analyze_function(c: &mut Criterion) {
    let mut asset = Asset::new("BP_Bench");
    asset.add_export(Export::new("BP_Bench_C", "BlueprintGeneratedClass"));
    let body = chained_branches(1024);
    let options = AnalysisOptions::default();

    let mut group = c.benchmark_group("analyze_function");
    group.throughput(Throughput::Elements(body.script.len() as u64));
    group.bench_function("chained_1024", |b| {
        b.iter(|| {
            let report = analyze_function(
                "Tick",
                black_box(&body),
                asset.layout,
                &asset,
                &options,
            );
            black_box(report)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_cfg_build, bench_analyze_function);
criterion_main!(benches);
