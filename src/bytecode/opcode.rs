//! Kismet opcode byte values.

use strum::{AsRefStr, Display, EnumIter, FromRepr};

/// One byte Kismet instruction tag (`EX_*` in the engine).
///
/// Only the values emitted by shipping engine versions are listed; gaps in the numbering are
/// reserved or removed opcodes.
///
/// # Examples
///
/// ```rust
/// use kismetscope::bytecode::Opcode;
///
/// assert_eq!(Opcode::from_repr(0x07), Some(Opcode::JumpIfNot));
/// assert_eq!(Opcode::JumpIfNot.as_ref(), "JumpIfNot");
/// assert_eq!(Opcode::from_repr(0x03), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, AsRefStr, Display, EnumIter)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    LocalVariable = 0x00,
    InstanceVariable = 0x01,
    DefaultVariable = 0x02,
    Return = 0x04,
    Jump = 0x06,
    JumpIfNot = 0x07,
    Assert = 0x09,
    Nothing = 0x0B,
    NothingInt32 = 0x0C,
    Let = 0x0F,
    BitFieldConst = 0x11,
    ClassContext = 0x12,
    MetaCast = 0x13,
    LetBool = 0x14,
    EndParmValue = 0x15,
    EndFunctionParms = 0x16,
    SelfRef = 0x17,
    Skip = 0x18,
    Context = 0x19,
    ContextFailSilent = 0x1A,
    VirtualFunction = 0x1B,
    FinalFunction = 0x1C,
    IntConst = 0x1D,
    FloatConst = 0x1E,
    StringConst = 0x1F,
    ObjectConst = 0x20,
    NameConst = 0x21,
    RotationConst = 0x22,
    VectorConst = 0x23,
    ByteConst = 0x24,
    IntZero = 0x25,
    IntOne = 0x26,
    True = 0x27,
    False = 0x28,
    TextConst = 0x29,
    NoObject = 0x2A,
    TransformConst = 0x2B,
    IntConstByte = 0x2C,
    NoInterface = 0x2D,
    DynamicCast = 0x2E,
    StructConst = 0x2F,
    EndStructConst = 0x30,
    SetArray = 0x31,
    EndArray = 0x32,
    PropertyConst = 0x33,
    UnicodeStringConst = 0x34,
    Int64Const = 0x35,
    UInt64Const = 0x36,
    DoubleConst = 0x37,
    PrimitiveCast = 0x38,
    SetSet = 0x39,
    EndSet = 0x3A,
    SetMap = 0x3B,
    EndMap = 0x3C,
    SetConst = 0x3D,
    EndSetConst = 0x3E,
    MapConst = 0x3F,
    EndMapConst = 0x40,
    StructMemberContext = 0x42,
    LetMulticastDelegate = 0x43,
    LetDelegate = 0x44,
    LocalVirtualFunction = 0x45,
    LocalFinalFunction = 0x46,
    LocalOutVariable = 0x48,
    DeprecatedOp4A = 0x4A,
    InstanceDelegate = 0x4B,
    PushExecutionFlow = 0x4C,
    PopExecutionFlow = 0x4D,
    ComputedJump = 0x4E,
    PopExecutionFlowIfNot = 0x4F,
    Breakpoint = 0x50,
    InterfaceContext = 0x51,
    ObjToInterfaceCast = 0x52,
    EndOfScript = 0x53,
    CrossInterfaceCast = 0x54,
    InterfaceToObjCast = 0x55,
    WireTracepoint = 0x5A,
    SkipOffsetConst = 0x5B,
    AddMulticastDelegate = 0x5C,
    ClearMulticastDelegate = 0x5D,
    Tracepoint = 0x5E,
    LetObj = 0x5F,
    LetWeakObjPtr = 0x60,
    BindDelegate = 0x61,
    RemoveMulticastDelegate = 0x62,
    CallMulticastDelegate = 0x63,
    LetValueOnPersistentFrame = 0x64,
    ArrayConst = 0x65,
    EndArrayConst = 0x66,
    SoftObjectConst = 0x67,
    CallMath = 0x68,
    SwitchValue = 0x69,
    InstrumentationEvent = 0x6A,
    ArrayGetByRef = 0x6B,
    ClassSparseDataVariable = 0x6C,
    FieldPathConst = 0x6D,
}

impl Opcode {
    /// The raw byte value.
    #[must_use]
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Returns `true` for opcodes that only terminate a list of operands and never start an
    /// instruction of their own.
    #[must_use]
    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            Opcode::EndFunctionParms
                | Opcode::EndStructConst
                | Opcode::EndArray
                | Opcode::EndArrayConst
                | Opcode::EndSet
                | Opcode::EndSetConst
                | Opcode::EndMap
                | Opcode::EndMapConst
        )
    }
}

/// Conversion performed by a primitive cast instruction (`ECastToken`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, AsRefStr)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum CastKind {
    ObjectToInterface = 0x46,
    ObjectToBool = 0x47,
    InterfaceToBool = 0x49,
    DoubleToFloat = 0x4A,
    FloatToDouble = 0x4B,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_opcode_round_trip_through_repr() {
        for opcode in Opcode::iter() {
            assert_eq!(Opcode::from_repr(opcode.byte()), Some(opcode));
        }
    }

    #[test]
    fn test_opcode_gaps() {
        assert_eq!(Opcode::from_repr(0x03), None);
        assert_eq!(Opcode::from_repr(0x41), None);
        assert_eq!(Opcode::from_repr(0xFF), None);
    }

    #[test]
    fn test_terminators() {
        assert!(Opcode::EndFunctionParms.is_terminator());
        assert!(Opcode::EndMapConst.is_terminator());
        assert!(!Opcode::Return.is_terminator());
    }

    #[test]
    fn test_cast_kind_names() {
        assert_eq!(CastKind::from_repr(0x47), Some(CastKind::ObjectToBool));
        assert_eq!(CastKind::DoubleToFloat.as_ref(), "DoubleToFloat");
    }
}
