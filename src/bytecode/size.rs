//! Serialized size of expressions.
//!
//! Jump targets inside Kismet bytecode are byte offsets into the *in-memory* script, where
//! object and property references are pointer sized and names use the 12-byte script name
//! layout. The deserializer hands us typed expressions without those byte positions, so the
//! offset of every record has to be recomputed by summing the sizes below.

use crate::{
    bytecode::expr::{Expr, ExprKind, TextLiteral},
    Result,
};

/// Opcode byte.
const OPCODE: usize = 1;
/// Object, class, struct and property pointers.
const POINTER: usize = 8;
/// `FScriptName`: comparison index, display index, number.
const SCRIPT_NAME: usize = 12;
/// Skip counts, jump targets and code offsets.
const CODE_SKIP: usize = 4;
/// List terminators (`EX_EndFunctionParms`, `EX_EndArray`, ...).
const TERMINATOR: usize = 1;

/// Layout switches that change operand widths between engine versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScriptLayout {
    /// Vector, rotator and transform constants store doubles instead of floats
    pub large_world_coordinates: bool,
}

impl ScriptLayout {
    /// Layout of assets saved with large world coordinates.
    #[must_use]
    pub fn large_world() -> Self {
        ScriptLayout {
            large_world_coordinates: true,
        }
    }

    fn real(self) -> usize {
        if self.large_world_coordinates {
            8
        } else {
            4
        }
    }
}

impl Expr {
    /// Number of bytes this expression occupies in the serialized script, children included.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if an [`ExprKind::Unknown`] record declares a size
    /// of zero, which would leave its successor at the same offset.
    pub fn serialized_size(&self, layout: ScriptLayout) -> Result<usize> {
        let mut size = self.operand_size(layout)?;
        let mut failure = None;
        self.for_each_child(&mut |child| {
            if failure.is_some() {
                return;
            }
            match child.serialized_size(layout) {
                Ok(child_size) => size += child_size,
                Err(error) => failure = Some(error),
            }
        });

        match failure {
            Some(error) => Err(error),
            None => Ok(size),
        }
    }

    /// Bytes owned by this record itself: opcode, inline operands and list terminators.
    fn operand_size(&self, layout: ScriptLayout) -> Result<usize> {
        let real = layout.real();
        let operands = match &self.kind {
            ExprKind::Unknown { opcode, size } => {
                if *size == 0 {
                    return Err(malformed_error!(
                        "Unknown opcode 0x{:02X} declares a zero size",
                        opcode
                    ));
                }
                return Ok(*size as usize);
            }

            ExprKind::LocalVariable(_)
            | ExprKind::InstanceVariable(_)
            | ExprKind::DefaultVariable(_)
            | ExprKind::LocalOutVariable(_)
            | ExprKind::ClassSparseDataVariable(_)
            | ExprKind::ObjectConst(_)
            | ExprKind::PropertyConst(_)
            | ExprKind::StructMemberContext { .. }
            | ExprKind::DynamicCast { .. }
            | ExprKind::MetaCast { .. }
            | ExprKind::ObjToInterfaceCast { .. }
            | ExprKind::InterfaceToObjCast { .. }
            | ExprKind::CrossInterfaceCast { .. }
            | ExprKind::LetValueOnPersistentFrame { .. }
            | ExprKind::Let { .. } => POINTER,

            ExprKind::IntConst(_) | ExprKind::FloatConst(_) | ExprKind::NothingInt32 => 4,
            ExprKind::Int64Const(_) | ExprKind::UInt64Const(_) | ExprKind::DoubleConst(_) => 8,
            ExprKind::ByteConst(_) | ExprKind::IntConstByte(_) => 1,
            ExprKind::PrimitiveCast { .. } => 1,

            ExprKind::StringConst(text) => text.chars().count() + 1,
            ExprKind::UnicodeStringConst(text) => 2 * (text.encode_utf16().count() + 1),
            ExprKind::NameConst(_) | ExprKind::InstanceDelegate(_) => SCRIPT_NAME,

            ExprKind::VectorConst(_) | ExprKind::RotationConst(_) => 3 * real,
            ExprKind::TransformConst(_) => 10 * real,

            ExprKind::TextConst(text) => {
                1 + match text {
                    TextLiteral::StringTableEntry { .. } => POINTER,
                    _ => 0,
                }
            }

            ExprKind::SkipOffsetConst(_)
            | ExprKind::Jump { .. }
            | ExprKind::JumpIfNot { .. }
            | ExprKind::PushExecutionFlow { .. }
            | ExprKind::Skip { .. } => CODE_SKIP,

            ExprKind::Context { .. } | ExprKind::ClassContext { .. } => CODE_SKIP + POINTER,

            ExprKind::VirtualFunction { .. } | ExprKind::LocalVirtualFunction { .. } => {
                SCRIPT_NAME + TERMINATOR
            }
            ExprKind::FinalFunction { .. }
            | ExprKind::LocalFinalFunction { .. }
            | ExprKind::CallMath { .. }
            | ExprKind::CallMulticastDelegate { .. } => POINTER + TERMINATOR,

            ExprKind::ArrayConst { .. } | ExprKind::SetConst { .. } => {
                POINTER + 4 + TERMINATOR
            }
            ExprKind::MapConst { .. } => POINTER + POINTER + 4 + TERMINATOR,
            ExprKind::StructConst { .. } => POINTER + 4 + TERMINATOR,
            ExprKind::SetArray { .. } => TERMINATOR,
            ExprKind::SetSet { .. } | ExprKind::SetMap { .. } => 4 + TERMINATOR,

            ExprKind::BindDelegate { .. } => SCRIPT_NAME,

            ExprKind::SwitchValue { cases, .. } => 2 + CODE_SKIP + cases.len() * CODE_SKIP,

            ExprKind::Assert { .. } => 2 + 1,
            ExprKind::InstrumentationEvent { event_type, .. } => {
                1 + if *event_type == 0 { SCRIPT_NAME } else { 0 }
            }
            ExprKind::BitFieldConst { .. } => POINTER + 1,

            ExprKind::IntZero
            | ExprKind::IntOne
            | ExprKind::True
            | ExprKind::False
            | ExprKind::NoObject
            | ExprKind::NoInterface
            | ExprKind::SelfRef
            | ExprKind::Nothing
            | ExprKind::SoftObjectConst(_)
            | ExprKind::FieldPathConst(_)
            | ExprKind::InterfaceContext(_)
            | ExprKind::ArrayGetByRef { .. }
            | ExprKind::LetObj { .. }
            | ExprKind::LetWeakObjPtr { .. }
            | ExprKind::LetBool { .. }
            | ExprKind::LetDelegate { .. }
            | ExprKind::LetMulticastDelegate { .. }
            | ExprKind::AddMulticastDelegate { .. }
            | ExprKind::RemoveMulticastDelegate { .. }
            | ExprKind::ClearMulticastDelegate(_)
            | ExprKind::Return(_)
            | ExprKind::ComputedJump { .. }
            | ExprKind::PopExecutionFlow
            | ExprKind::PopExecutionFlowIfNot { .. }
            | ExprKind::Breakpoint
            | ExprKind::Tracepoint
            | ExprKind::WireTracepoint
            | ExprKind::DeprecatedOp4A
            | ExprKind::EndOfScript
            | ExprKind::EndParmValue => 0,
        };

        Ok(OPCODE + operands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        asset::PackageIndex,
        bytecode::{
            expr::{BytecodeOffset, SwitchCase, Vec3},
            refs::{PropertyRef, ScriptName},
        },
    };

    fn local(name: &str) -> Expr {
        Expr::new(ExprKind::LocalVariable(PropertyRef::field(
            name,
            PackageIndex::from_export(0),
        )))
    }

    fn size(expr: &Expr) -> usize {
        expr.serialized_size(ScriptLayout::default()).unwrap()
    }

    #[test]
    fn test_simple_sizes() {
        assert_eq!(size(&local("A")), 9);
        assert_eq!(size(&Expr::new(ExprKind::IntConst(7))), 5);
        assert_eq!(size(&Expr::new(ExprKind::True)), 1);
        assert_eq!(
            size(&Expr::new(ExprKind::NameConst(ScriptName::new("X")))),
            13
        );
        assert_eq!(
            size(&Expr::new(ExprKind::Jump {
                target: BytecodeOffset(0)
            })),
            5
        );
    }

    #[test]
    fn test_nothing_sizes() {
        assert_eq!(size(&Expr::new(ExprKind::Nothing)), 1);
        // The int32 operand is read and discarded by the VM.
        assert_eq!(size(&Expr::new(ExprKind::NothingInt32)), 5);
    }

    #[test]
    fn test_string_sizes() {
        assert_eq!(size(&Expr::new(ExprKind::StringConst("abc".into()))), 5);
        assert_eq!(
            size(&Expr::new(ExprKind::UnicodeStringConst("ab".into()))),
            7
        );
    }

    #[test]
    fn test_call_sizes() {
        let call = Expr::new(ExprKind::FinalFunction {
            func: PackageIndex::from_import(0),
            params: vec![local("A"), local("B")],
        });
        // opcode + pointer + 2 * 9 + end params
        assert_eq!(size(&call), 1 + 8 + 18 + 1);

        let virtual_call = Expr::new(ExprKind::VirtualFunction {
            func: ScriptName::new("Tick"),
            params: vec![],
        });
        assert_eq!(size(&virtual_call), 1 + 12 + 1);
    }

    #[test]
    fn test_let_and_jump_if_not() {
        let assign = Expr::new(ExprKind::Let {
            property: None,
            variable: Box::new(local("A")),
            value: Box::new(Expr::new(ExprKind::IntZero)),
        });
        assert_eq!(size(&assign), 1 + 8 + 9 + 1);

        let branch = Expr::new(ExprKind::JumpIfNot {
            target: BytecodeOffset(100),
            condition: Box::new(local("Cond")),
        });
        assert_eq!(size(&branch), 1 + 4 + 9);
    }

    #[test]
    fn test_vector_size_depends_on_layout() {
        let vector = Expr::new(ExprKind::VectorConst(Vec3(1.0, 2.0, 3.0)));
        assert_eq!(vector.serialized_size(ScriptLayout::default()).unwrap(), 13);
        assert_eq!(
            vector.serialized_size(ScriptLayout::large_world()).unwrap(),
            25
        );
    }

    #[test]
    fn test_switch_size() {
        let switch = Expr::new(ExprKind::SwitchValue {
            index: Box::new(local("I")),
            end_offset: BytecodeOffset(0),
            cases: vec![
                SwitchCase {
                    value: Expr::new(ExprKind::IntZero),
                    next_offset: BytecodeOffset(0),
                    result: Expr::new(ExprKind::True),
                },
                SwitchCase {
                    value: Expr::new(ExprKind::IntOne),
                    next_offset: BytecodeOffset(0),
                    result: Expr::new(ExprKind::False),
                },
            ],
            default: Box::new(Expr::new(ExprKind::NoObject)),
        });
        // opcode + count + end + index + 2 * (value + next + result) + default
        assert_eq!(size(&switch), 1 + 2 + 4 + 9 + 2 * (1 + 4 + 1) + 1);
    }

    #[test]
    fn test_unknown_size() {
        let unknown = Expr::new(ExprKind::Unknown {
            opcode: 0x70,
            size: 6,
        });
        assert_eq!(size(&unknown), 6);

        let broken = Expr::new(ExprKind::Unknown {
            opcode: 0x70,
            size: 0,
        });
        assert!(broken.serialized_size(ScriptLayout::default()).is_err());
    }
}
