//! Integration tests for the analysis driver and its serializable reports.

use std::sync::{atomic::AtomicBool, Arc};

use kismetscope::pins::write_pins;
use kismetscope::prelude::*;
use uguid::guid;

fn ret() -> ExprKind {
    ExprKind::Return(Box::new(Expr::new(ExprKind::Nothing)))
}

fn sample_asset() -> Result<Asset> {
    let mut asset = Asset::new("BP_Lamp");
    asset.add_export(Export::new("BP_Lamp_C", "BlueprintGeneratedClass"));

    let mut asm = ScriptAssembler::new(asset.layout);
    asm.jump_if_not(Expr::new(ExprKind::True), "off")?;
    asm.emit(ExprKind::Tracepoint)?;
    asm.define_label("off")?;
    asm.emit(ret())?;
    asm.emit(ExprKind::EndOfScript)?;
    asset.add_export(
        Export::new("Toggle", "Function").with_function(
            asm.finish()?
                .with_flags(FunctionFlags::PUBLIC | FunctionFlags::BLUEPRINT_CALLABLE),
        ),
    );

    // Jump into the middle of nowhere.
    let broken = FunctionBody::new(vec![Expr::at(
        0,
        ExprKind::Jump {
            target: BytecodeOffset(400),
        },
    )]);
    asset.add_export(Export::new("Broken", "Function").with_function(broken));

    let graph = asset.add_export(Export::new("EventGraph", "EdGraph"));
    let pin = Pin::new(
        guid!("11111111-2222-3333-4444-555555555555"),
        "then",
        PinDirection::Output,
    )
    .linked(guid!("11111111-2222-3333-4444-666666666666"));
    let blob = write_pins(&[pin], asset.pin_version);
    asset.add_export(
        Export::new("K2Node_Event_0", "K2Node_Event")
            .with_outer(graph)
            .with_extra(blob),
    );
    Ok(asset)
}

#[test]
fn report_serializes_to_json() -> Result<()> {
    let report = analyze_asset(&sample_asset()?, &AnalysisOptions::default())?;
    let json = serde_json::to_value(&report).expect("report serializes");

    assert_eq!(json["name"], "BP_Lamp");
    let toggle = &json["functions"][0];
    assert_eq!(toggle["name"], "Toggle");
    assert_eq!(toggle["blocks"][0]["start_offset"], 0);
    assert_eq!(
        toggle["blocks"][0]["statements"][0],
        "if not (true) goto block_2"
    );
    assert_eq!(toggle["blocks"][2]["statements"][0], "return");
    assert!(toggle["error"].is_null());
    assert_eq!(json["nodes"]["dangling"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[test]
fn dangling_jump_reported_as_diagnostic() -> Result<()> {
    let report = analyze_asset(&sample_asset()?, &AnalysisOptions::sequential())?;

    let broken = report.function("Broken").expect("function report");
    assert!(broken.is_ok());
    assert_eq!(broken.blocks.len(), 1);
    assert_eq!(broken.blocks[0].successors, vec![Successor::Unresolved]);
    assert!(broken
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::DanglingReference));

    assert!(report.diagnostics().count() >= 2);
    Ok(())
}

#[test]
fn flags_and_noise() -> Result<()> {
    let asset = sample_asset()?;

    let quiet = analyze_asset(&asset, &AnalysisOptions::default())?;
    let toggle = quiet.function("Toggle").expect("function report");
    assert_eq!(toggle.flag_summary, "public");
    assert!(toggle.blocks[1].statements.is_empty());

    let noisy = analyze_asset(&asset, &AnalysisOptions::default().with_noise(true))?;
    let toggle = noisy.function("Toggle").expect("function report");
    assert_eq!(toggle.blocks[1].statements, vec!["// Tracepoint"]);
    Ok(())
}

#[test]
fn cancelled_analysis_marks_functions() -> Result<()> {
    let options = AnalysisOptions::default().with_cancel(Arc::new(AtomicBool::new(true)));
    let report = analyze_asset(&sample_asset()?, &options)?;

    assert_eq!(report.functions.len(), 2);
    assert!(report.functions.iter().all(|f| f.cancelled && f.blocks.is_empty()));
    assert_eq!(report.failed_functions().count(), 2);
    Ok(())
}

#[test]
fn parallel_and_sequential_agree() -> Result<()> {
    let asset = sample_asset()?;
    let parallel = analyze_asset(&asset, &AnalysisOptions::default())?;
    let sequential = analyze_asset(&asset, &AnalysisOptions::sequential())?;
    assert_eq!(parallel, sequential);
    Ok(())
}
