//! Label-based construction of function scripts.
//!
//! Writing jump targets by hand means recomputing byte offsets every time an instruction
//! changes. [`ScriptAssembler`] tracks the running offset, lets control transfers name a label
//! instead of an offset, and patches every label reference when the script is finished.

use std::collections::HashMap;

use crate::{
    asset::FunctionBody,
    bytecode::{BytecodeOffset, Expr, ExprKind, ScriptLayout, SwitchCase},
    Error, Result,
};

/// Operand slot of an emitted instruction that refers to a label.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Target,
    SwitchEnd,
    SwitchCase(usize),
}

#[derive(Debug)]
struct Fixup {
    instruction: usize,
    slot: Slot,
    label: String,
}

/// One arm of a switch emitted through [`ScriptAssembler::switch_value`].
#[derive(Debug, Clone)]
pub struct SwitchArm {
    /// Compared value
    pub value: Expr,
    /// Label control continues at when the value does not match
    pub next: String,
    /// Result when the value matches
    pub result: Expr,
}

/// Incremental script builder with label fixups.
///
/// # Examples
///
/// ```rust
/// use kismetscope::bytecode::{Expr, ExprKind, ScriptAssembler, ScriptLayout};
///
/// let mut asm = ScriptAssembler::new(ScriptLayout::default());
/// asm.jump_if_not(Expr::new(ExprKind::False), "skip")?;
/// asm.emit(ExprKind::IntOne)?;
/// asm.define_label("skip")?;
/// asm.emit(ExprKind::EndOfScript)?;
///
/// let body = asm.finish()?;
/// assert_eq!(body.script.len(), 3);
/// assert_eq!(body.script_size, Some(8));
/// # Ok::<(), kismetscope::Error>(())
/// ```
#[derive(Debug)]
pub struct ScriptAssembler {
    layout: ScriptLayout,
    script: Vec<Expr>,
    position: u32,
    labels: HashMap<String, u32>,
    fixups: Vec<Fixup>,
}

impl ScriptAssembler {
    /// Create an empty assembler for the given operand layout.
    #[must_use]
    pub fn new(layout: ScriptLayout) -> Self {
        ScriptAssembler {
            layout,
            script: Vec::new(),
            position: 0,
            labels: HashMap::new(),
            fixups: Vec::new(),
        }
    }

    /// Offset the next instruction will start at.
    #[must_use]
    pub fn current_position(&self) -> BytecodeOffset {
        BytecodeOffset(self.position)
    }

    /// Offset of a defined label.
    #[must_use]
    pub fn label_offset(&self, name: &str) -> Option<BytecodeOffset> {
        self.labels.get(name).copied().map(BytecodeOffset)
    }

    /// Bind `name` to the current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the label is already defined.
    pub fn define_label(&mut self, name: &str) -> Result<()> {
        if self.labels.contains_key(name) {
            return Err(malformed_error!("Label '{}' is defined twice", name));
        }
        self.labels.insert(name.to_string(), self.position);
        Ok(())
    }

    /// Append an instruction and return its start offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the instruction has no valid size or the script
    /// outgrows 32-bit offsets.
    pub fn emit(&mut self, kind: ExprKind) -> Result<BytecodeOffset> {
        let start = self.position;
        let expr = Expr::at(start, kind);
        let size = u32::try_from(expr.serialized_size(self.layout)?)
            .map_err(|_| malformed_error!("Instruction exceeds the offset range"))?;
        self.position = start
            .checked_add(size)
            .ok_or_else(|| malformed_error!("Script exceeds the offset range"))?;
        self.script.push(expr);
        Ok(BytecodeOffset(start))
    }

    fn emit_with_fixups(&mut self, kind: ExprKind, fixups: Vec<(Slot, &str)>) -> Result<()> {
        let instruction = self.script.len();
        self.emit(kind)?;
        self.fixups
            .extend(fixups.into_iter().map(|(slot, label)| Fixup {
                instruction,
                slot,
                label: label.to_string(),
            }));
        Ok(())
    }

    /// Append an unconditional jump to `label`.
    ///
    /// # Errors
    /// See [`ScriptAssembler::emit`].
    pub fn jump(&mut self, label: &str) -> Result<()> {
        self.emit_with_fixups(
            ExprKind::Jump {
                target: BytecodeOffset(0),
            },
            vec![(Slot::Target, label)],
        )
    }

    /// Append a jump to `label` taken when `condition` is false.
    ///
    /// # Errors
    /// See [`ScriptAssembler::emit`].
    pub fn jump_if_not(&mut self, condition: Expr, label: &str) -> Result<()> {
        self.emit_with_fixups(
            ExprKind::JumpIfNot {
                target: BytecodeOffset(0),
                condition: Box::new(condition),
            },
            vec![(Slot::Target, label)],
        )
    }

    /// Append a push of `label` onto the execution flow stack.
    ///
    /// # Errors
    /// See [`ScriptAssembler::emit`].
    pub fn push_flow(&mut self, label: &str) -> Result<()> {
        self.emit_with_fixups(
            ExprKind::PushExecutionFlow {
                push_offset: BytecodeOffset(0),
            },
            vec![(Slot::Target, label)],
        )
    }

    /// Append a switch-value instruction whose arms and end refer to labels.
    ///
    /// # Errors
    /// See [`ScriptAssembler::emit`].
    pub fn switch_value(
        &mut self,
        index: Expr,
        arms: Vec<SwitchArm>,
        default: Expr,
        end: &str,
    ) -> Result<()> {
        let labels: Vec<String> = arms.iter().map(|arm| arm.next.clone()).collect();
        let cases = arms
            .into_iter()
            .map(|arm| SwitchCase {
                value: arm.value,
                next_offset: BytecodeOffset(0),
                result: arm.result,
            })
            .collect();

        let mut fixups = vec![(Slot::SwitchEnd, end)];
        fixups.extend(
            labels
                .iter()
                .enumerate()
                .map(|(i, label)| (Slot::SwitchCase(i), label.as_str())),
        );

        self.emit_with_fixups(
            ExprKind::SwitchValue {
                index: Box::new(index),
                end_offset: BytecodeOffset(0),
                cases,
                default: Box::new(default),
            },
            fixups,
        )
    }

    /// Resolve all label references and produce the function body.
    ///
    /// Every instruction carries its recorded offset and the body declares the final script
    /// size.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if an instruction refers to an undefined label.
    pub fn finish(mut self) -> Result<FunctionBody> {
        for fixup in std::mem::take(&mut self.fixups) {
            let target = self
                .labels
                .get(&fixup.label)
                .copied()
                .map(BytecodeOffset)
                .ok_or_else(|| malformed_error!("Undefined label '{}'", fixup.label))?;

            let expr = self
                .script
                .get_mut(fixup.instruction)
                .ok_or_else(|| {
                    Error::GraphError(format!(
                        "Fixup refers to missing instruction {}",
                        fixup.instruction
                    ))
                })?;

            match (&mut expr.kind, fixup.slot) {
                (ExprKind::Jump { target: slot }, Slot::Target)
                | (ExprKind::JumpIfNot { target: slot, .. }, Slot::Target)
                | (ExprKind::PushExecutionFlow { push_offset: slot }, Slot::Target)
                | (ExprKind::SwitchValue { end_offset: slot, .. }, Slot::SwitchEnd) => {
                    *slot = target;
                }
                (ExprKind::SwitchValue { cases, .. }, Slot::SwitchCase(i)) => {
                    if let Some(case) = cases.get_mut(i) {
                        case.next_offset = target;
                    }
                }
                _ => {
                    return Err(malformed_error!(
                        "Label '{}' patched into an instruction without a target",
                        fixup.label
                    ))
                }
            }
        }

        Ok(FunctionBody::new(self.script).with_script_size(self.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backward_and_forward_labels() {
        let mut asm = ScriptAssembler::new(ScriptLayout::default());
        asm.define_label("top").unwrap();
        asm.emit(ExprKind::IntOne).unwrap();
        asm.jump_if_not(Expr::new(ExprKind::True), "out").unwrap();
        asm.jump("top").unwrap();
        asm.define_label("out").unwrap();
        asm.emit(ExprKind::EndOfScript).unwrap();

        let body = asm.finish().unwrap();
        assert_eq!(
            body.script[1].kind,
            ExprKind::JumpIfNot {
                target: BytecodeOffset(12),
                condition: Box::new(Expr::new(ExprKind::True)),
            }
        );
        assert_eq!(
            body.script[2].kind,
            ExprKind::Jump {
                target: BytecodeOffset(0)
            }
        );
        assert_eq!(body.script_size, Some(13));
        assert_eq!(body.script[3].offset, Some(BytecodeOffset(12)));
    }

    #[test]
    fn test_undefined_label() {
        let mut asm = ScriptAssembler::new(ScriptLayout::default());
        asm.jump("nowhere").unwrap();
        assert!(matches!(asm.finish(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_duplicate_label() {
        let mut asm = ScriptAssembler::new(ScriptLayout::default());
        asm.define_label("a").unwrap();
        assert!(asm.define_label("a").is_err());
    }

    #[test]
    fn test_switch_fixups() {
        let mut asm = ScriptAssembler::new(ScriptLayout::default());
        asm.switch_value(
            Expr::new(ExprKind::IntZero),
            vec![SwitchArm {
                value: Expr::new(ExprKind::IntZero),
                next: "case1".into(),
                result: Expr::new(ExprKind::True),
            }],
            Expr::new(ExprKind::False),
            "end",
        )
        .unwrap();
        asm.define_label("case1").unwrap();
        asm.emit(ExprKind::IntOne).unwrap();
        asm.define_label("end").unwrap();
        asm.emit(ExprKind::EndOfScript).unwrap();

        let body = asm.finish().unwrap();
        let ExprKind::SwitchValue {
            end_offset, cases, ..
        } = &body.script[0].kind
        else {
            panic!("expected switch");
        };
        // 1 + 2 + 4 + index 1 + (1 + 4 + 1) + default 1
        assert_eq!(cases[0].next_offset, BytecodeOffset(15));
        assert_eq!(*end_offset, BytecodeOffset(16));
    }
}
