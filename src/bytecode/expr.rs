//! Expression tree for decoded Kismet bytecode.
//!
//! A function body is a flat sequence of top-level [`Expr`] records, one per instruction. Each
//! record owns its operands: nested expressions are boxed children, never shared. Annotations
//! computed by later passes (block membership, rendered text) live in side tables keyed by the
//! record's sequence index, so an expression tree is immutable once the upstream deserializer
//! hands it over.

use std::fmt;

use serde::Serialize;

use crate::bytecode::{
    opcode::Opcode,
    refs::{ObjectRef, PropertyRef, ScriptName},
};

/// Byte position inside a function's script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct BytecodeOffset(pub u32);

impl BytecodeOffset {
    /// Offset as a `usize`, for indexing.
    #[must_use]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BytecodeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl From<u32> for BytecodeOffset {
    fn from(value: u32) -> Self {
        BytecodeOffset(value)
    }
}

/// One decoded instruction or operand.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// Position recorded by the deserializer, if it recorded one
    pub offset: Option<BytecodeOffset>,
    /// The operation and its operands
    pub kind: ExprKind,
}

impl Expr {
    /// Create an expression without a recorded offset.
    #[must_use]
    pub fn new(kind: ExprKind) -> Self {
        Expr { offset: None, kind }
    }

    /// Create an expression with a recorded offset.
    #[must_use]
    pub fn at(offset: u32, kind: ExprKind) -> Self {
        Expr {
            offset: Some(BytecodeOffset(offset)),
            kind,
        }
    }

    /// The opcode of this expression, `None` for [`ExprKind::Unknown`] records whose byte is not
    /// a known opcode.
    #[must_use]
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_repr(self.opcode_byte())
    }

    /// The raw opcode byte of this expression.
    #[must_use]
    pub fn opcode_byte(&self) -> u8 {
        self.kind.opcode_byte()
    }

    /// Calls `f` once for every direct child expression, in serialization order.
    pub fn for_each_child<F>(&self, f: &mut F)
    where
        F: FnMut(&Expr),
    {
        match &self.kind {
            ExprKind::Let {
                variable, value, ..
            }
            | ExprKind::LetObj { variable, value }
            | ExprKind::LetWeakObjPtr { variable, value }
            | ExprKind::LetBool { variable, value }
            | ExprKind::LetDelegate { variable, value }
            | ExprKind::LetMulticastDelegate { variable, value } => {
                f(variable);
                f(value);
            }
            ExprKind::LetValueOnPersistentFrame { value, .. } => f(value),

            ExprKind::Return(expr)
            | ExprKind::SoftObjectConst(expr)
            | ExprKind::FieldPathConst(expr)
            | ExprKind::InterfaceContext(expr)
            | ExprKind::ClearMulticastDelegate(expr)
            | ExprKind::ComputedJump { offset_expr: expr }
            | ExprKind::JumpIfNot {
                condition: expr, ..
            }
            | ExprKind::PopExecutionFlowIfNot { condition: expr }
            | ExprKind::Assert {
                condition: expr, ..
            }
            | ExprKind::Skip { expr, .. }
            | ExprKind::StructMemberContext {
                struct_expr: expr, ..
            }
            | ExprKind::DynamicCast { expr, .. }
            | ExprKind::MetaCast { expr, .. }
            | ExprKind::PrimitiveCast { expr, .. }
            | ExprKind::ObjToInterfaceCast { expr, .. }
            | ExprKind::InterfaceToObjCast { expr, .. }
            | ExprKind::CrossInterfaceCast { expr, .. } => f(expr),

            ExprKind::Context {
                object, context, ..
            }
            | ExprKind::ClassContext {
                object, context, ..
            } => {
                f(object);
                f(context);
            }

            ExprKind::VirtualFunction { params, .. }
            | ExprKind::LocalVirtualFunction { params, .. }
            | ExprKind::FinalFunction { params, .. }
            | ExprKind::LocalFinalFunction { params, .. }
            | ExprKind::CallMath { params, .. } => params.iter().for_each(|p| f(p)),
            ExprKind::CallMulticastDelegate {
                delegate, params, ..
            } => {
                f(delegate);
                params.iter().for_each(|p| f(p));
            }

            ExprKind::ArrayConst { elements, .. }
            | ExprKind::StructConst { elements, .. }
            | ExprKind::SetConst { elements, .. }
            | ExprKind::MapConst { elements, .. } => elements.iter().for_each(|e| f(e)),
            ExprKind::SetArray { array, elements } => {
                f(array);
                elements.iter().for_each(|e| f(e));
            }
            ExprKind::SetSet { set, elements } => {
                f(set);
                elements.iter().for_each(|e| f(e));
            }
            ExprKind::SetMap { map, elements } => {
                f(map);
                elements.iter().for_each(|e| f(e));
            }
            ExprKind::ArrayGetByRef { array, index } => {
                f(array);
                f(index);
            }

            ExprKind::BindDelegate {
                delegate, object, ..
            } => {
                f(delegate);
                f(object);
            }
            ExprKind::AddMulticastDelegate { delegate, other }
            | ExprKind::RemoveMulticastDelegate { delegate, other } => {
                f(delegate);
                f(other);
            }

            ExprKind::SwitchValue {
                index,
                cases,
                default,
                ..
            } => {
                f(index);
                for case in cases {
                    f(&case.value);
                    f(&case.result);
                }
                f(default);
            }

            ExprKind::TextConst(text) => text.for_each_child(f),

            ExprKind::LocalVariable(_)
            | ExprKind::InstanceVariable(_)
            | ExprKind::DefaultVariable(_)
            | ExprKind::LocalOutVariable(_)
            | ExprKind::ClassSparseDataVariable(_)
            | ExprKind::IntConst(_)
            | ExprKind::Int64Const(_)
            | ExprKind::UInt64Const(_)
            | ExprKind::IntZero
            | ExprKind::IntOne
            | ExprKind::ByteConst(_)
            | ExprKind::IntConstByte(_)
            | ExprKind::FloatConst(_)
            | ExprKind::DoubleConst(_)
            | ExprKind::StringConst(_)
            | ExprKind::UnicodeStringConst(_)
            | ExprKind::NameConst(_)
            | ExprKind::VectorConst(_)
            | ExprKind::RotationConst(_)
            | ExprKind::TransformConst(_)
            | ExprKind::True
            | ExprKind::False
            | ExprKind::NoObject
            | ExprKind::NoInterface
            | ExprKind::SelfRef
            | ExprKind::Nothing
            | ExprKind::NothingInt32
            | ExprKind::ObjectConst(_)
            | ExprKind::PropertyConst(_)
            | ExprKind::SkipOffsetConst(_)
            | ExprKind::InstanceDelegate(_)
            | ExprKind::Jump { .. }
            | ExprKind::PushExecutionFlow { .. }
            | ExprKind::PopExecutionFlow
            | ExprKind::Breakpoint
            | ExprKind::Tracepoint
            | ExprKind::WireTracepoint
            | ExprKind::InstrumentationEvent { .. }
            | ExprKind::BitFieldConst { .. }
            | ExprKind::DeprecatedOp4A
            | ExprKind::EndOfScript
            | ExprKind::EndParmValue
            | ExprKind::Unknown { .. } => {}
        }
    }

    /// Walk the expression tree depth-first, calling `visitor` on this node before its children.
    pub fn walk<F>(&self, visitor: &mut F)
    where
        F: FnMut(&Expr),
    {
        visitor(self);
        self.for_each_child(&mut |child| child.walk(visitor));
    }

    /// Returns `true` for instrumentation and marker records that carry no program semantics.
    #[must_use]
    pub fn is_noise(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Breakpoint
                | ExprKind::Tracepoint
                | ExprKind::WireTracepoint
                | ExprKind::InstrumentationEvent { .. }
                | ExprKind::Nothing
                | ExprKind::NothingInt32
                | ExprKind::EndOfScript
                | ExprKind::EndParmValue
                | ExprKind::DeprecatedOp4A
        )
    }
}

impl From<ExprKind> for Expr {
    fn from(kind: ExprKind) -> Self {
        Expr::new(kind)
    }
}

/// Three-component vector or rotator constant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3(pub f64, pub f64, pub f64);

/// Transform constant: rotation quaternion, translation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    /// Rotation quaternion `(x, y, z, w)`
    pub rotation: [f64; 4],
    /// Translation
    pub translation: Vec3,
    /// Scale
    pub scale: Vec3,
}

/// One arm of a switch-value expression.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// Value compared against the switch index
    pub value: Expr,
    /// Offset control continues at when this case does not match
    pub next_offset: BytecodeOffset,
    /// Result produced when this case matches
    pub result: Expr,
}

/// Payload of a text constant (`EBlueprintTextLiteralType`).
#[derive(Debug, Clone, PartialEq)]
pub enum TextLiteral {
    /// `FText::GetEmpty()`
    Empty,
    /// Localized text with namespace and key
    LocalizedText {
        /// Source string
        source: Box<Expr>,
        /// Localization key
        key: Box<Expr>,
        /// Localization namespace
        namespace: Box<Expr>,
    },
    /// Culture invariant text
    InvariantText {
        /// Source string
        source: Box<Expr>,
    },
    /// Text built from a plain string
    LiteralString {
        /// Source string
        source: Box<Expr>,
    },
    /// Entry of a string table asset
    StringTableEntry {
        /// String table asset, kept for reference gathering
        table: ObjectRef,
        /// Table identifier
        table_id: Box<Expr>,
        /// Entry key
        key: Box<Expr>,
    },
}

impl TextLiteral {
    /// Calls `f` once for every embedded expression, in serialization order.
    pub fn for_each_child<F>(&self, f: &mut F)
    where
        F: FnMut(&Expr),
    {
        match self {
            TextLiteral::Empty => {}
            TextLiteral::LocalizedText {
                source,
                key,
                namespace,
            } => {
                f(source);
                f(key);
                f(namespace);
            }
            TextLiteral::InvariantText { source } | TextLiteral::LiteralString { source } => {
                f(source);
            }
            TextLiteral::StringTableEntry { table_id, key, .. } => {
                f(table_id);
                f(key);
            }
        }
    }
}

/// All expression kinds that can appear in Kismet bytecode.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ExprKind {
    // Variables
    LocalVariable(PropertyRef),
    InstanceVariable(PropertyRef),
    DefaultVariable(PropertyRef),
    LocalOutVariable(PropertyRef),
    ClassSparseDataVariable(PropertyRef),

    // Integer constants
    IntConst(i32),
    Int64Const(i64),
    UInt64Const(u64),
    IntZero,
    IntOne,
    ByteConst(u8),
    IntConstByte(u8),

    // Floating point constants
    FloatConst(f32),
    DoubleConst(f64),

    // String and name constants
    StringConst(String),
    UnicodeStringConst(String),
    NameConst(ScriptName),

    // Math constants
    VectorConst(Vec3),
    RotationConst(Vec3),
    TransformConst(Transform),

    // Special values
    True,
    False,
    NoObject,
    NoInterface,
    SelfRef,
    Nothing,
    /// A no-op followed by an ignored int32 operand.
    NothingInt32,

    // Object constants
    ObjectConst(ObjectRef),
    SoftObjectConst(Box<Expr>),
    PropertyConst(PropertyRef),
    SkipOffsetConst(BytecodeOffset),
    FieldPathConst(Box<Expr>),
    TextConst(TextLiteral),

    // Calls
    VirtualFunction {
        func: ScriptName,
        params: Vec<Expr>,
    },
    LocalVirtualFunction {
        func: ScriptName,
        params: Vec<Expr>,
    },
    FinalFunction {
        func: ObjectRef,
        params: Vec<Expr>,
    },
    LocalFinalFunction {
        func: ObjectRef,
        params: Vec<Expr>,
    },
    CallMath {
        func: ObjectRef,
        params: Vec<Expr>,
    },
    CallMulticastDelegate {
        signature: ObjectRef,
        delegate: Box<Expr>,
        params: Vec<Expr>,
    },

    // Context
    Context {
        object: Box<Expr>,
        skip_offset: u32,
        field: Option<PropertyRef>,
        context: Box<Expr>,
        fail_silent: bool,
    },
    ClassContext {
        object: Box<Expr>,
        skip_offset: u32,
        field: Option<PropertyRef>,
        context: Box<Expr>,
    },
    StructMemberContext {
        member: PropertyRef,
        struct_expr: Box<Expr>,
    },
    InterfaceContext(Box<Expr>),

    // Casts
    DynamicCast {
        class: ObjectRef,
        expr: Box<Expr>,
    },
    MetaCast {
        class: ObjectRef,
        expr: Box<Expr>,
    },
    PrimitiveCast {
        conversion: u8,
        expr: Box<Expr>,
    },
    ObjToInterfaceCast {
        class: ObjectRef,
        expr: Box<Expr>,
    },
    InterfaceToObjCast {
        class: ObjectRef,
        expr: Box<Expr>,
    },
    CrossInterfaceCast {
        class: ObjectRef,
        expr: Box<Expr>,
    },

    // Collection constants
    ArrayConst {
        element_type: PropertyRef,
        elements: Vec<Expr>,
    },
    StructConst {
        struct_type: ObjectRef,
        serialized_size: i32,
        elements: Vec<Expr>,
    },
    SetConst {
        element_type: PropertyRef,
        elements: Vec<Expr>,
    },
    /// Elements alternate key, value
    MapConst {
        key_type: PropertyRef,
        value_type: PropertyRef,
        elements: Vec<Expr>,
    },

    // Collection assignment and access
    SetArray {
        array: Box<Expr>,
        elements: Vec<Expr>,
    },
    SetSet {
        set: Box<Expr>,
        elements: Vec<Expr>,
    },
    /// Elements alternate key, value
    SetMap {
        map: Box<Expr>,
        elements: Vec<Expr>,
    },
    ArrayGetByRef {
        array: Box<Expr>,
        index: Box<Expr>,
    },

    // Assignment
    Let {
        property: Option<PropertyRef>,
        variable: Box<Expr>,
        value: Box<Expr>,
    },
    LetObj {
        variable: Box<Expr>,
        value: Box<Expr>,
    },
    LetWeakObjPtr {
        variable: Box<Expr>,
        value: Box<Expr>,
    },
    LetBool {
        variable: Box<Expr>,
        value: Box<Expr>,
    },
    LetDelegate {
        variable: Box<Expr>,
        value: Box<Expr>,
    },
    LetMulticastDelegate {
        variable: Box<Expr>,
        value: Box<Expr>,
    },
    LetValueOnPersistentFrame {
        property: PropertyRef,
        value: Box<Expr>,
    },

    // Delegates
    InstanceDelegate(ScriptName),
    BindDelegate {
        func_name: ScriptName,
        delegate: Box<Expr>,
        object: Box<Expr>,
    },
    AddMulticastDelegate {
        delegate: Box<Expr>,
        other: Box<Expr>,
    },
    RemoveMulticastDelegate {
        delegate: Box<Expr>,
        other: Box<Expr>,
    },
    ClearMulticastDelegate(Box<Expr>),

    // Control flow
    Return(Box<Expr>),
    Jump {
        target: BytecodeOffset,
    },
    JumpIfNot {
        target: BytecodeOffset,
        condition: Box<Expr>,
    },
    ComputedJump {
        offset_expr: Box<Expr>,
    },
    SwitchValue {
        index: Box<Expr>,
        end_offset: BytecodeOffset,
        cases: Vec<SwitchCase>,
        default: Box<Expr>,
    },
    PushExecutionFlow {
        push_offset: BytecodeOffset,
    },
    PopExecutionFlow,
    PopExecutionFlowIfNot {
        condition: Box<Expr>,
    },

    // Instrumentation
    Assert {
        line: u16,
        in_debug: bool,
        condition: Box<Expr>,
    },
    Skip {
        skip_count: u32,
        expr: Box<Expr>,
    },
    Breakpoint,
    Tracepoint,
    WireTracepoint,
    /// The event name is only serialized for inline events (`event_type == 0`)
    InstrumentationEvent {
        event_type: u8,
        event_name: Option<ScriptName>,
    },

    // Markers
    BitFieldConst {
        property: PropertyRef,
        value: u8,
    },
    DeprecatedOp4A,
    EndOfScript,
    EndParmValue,

    /// An opcode the deserializer could not type; `size` is the full serialized size it
    /// declared for the record, opcode byte included.
    Unknown {
        opcode: u8,
        size: u32,
    },
}

impl ExprKind {
    /// The raw opcode byte of this kind.
    #[must_use]
    pub fn opcode_byte(&self) -> u8 {
        let opcode = match self {
            ExprKind::Unknown { opcode, .. } => return *opcode,
            ExprKind::LocalVariable(_) => Opcode::LocalVariable,
            ExprKind::InstanceVariable(_) => Opcode::InstanceVariable,
            ExprKind::DefaultVariable(_) => Opcode::DefaultVariable,
            ExprKind::LocalOutVariable(_) => Opcode::LocalOutVariable,
            ExprKind::ClassSparseDataVariable(_) => Opcode::ClassSparseDataVariable,
            ExprKind::IntConst(_) => Opcode::IntConst,
            ExprKind::Int64Const(_) => Opcode::Int64Const,
            ExprKind::UInt64Const(_) => Opcode::UInt64Const,
            ExprKind::IntZero => Opcode::IntZero,
            ExprKind::IntOne => Opcode::IntOne,
            ExprKind::ByteConst(_) => Opcode::ByteConst,
            ExprKind::IntConstByte(_) => Opcode::IntConstByte,
            ExprKind::FloatConst(_) => Opcode::FloatConst,
            ExprKind::DoubleConst(_) => Opcode::DoubleConst,
            ExprKind::StringConst(_) => Opcode::StringConst,
            ExprKind::UnicodeStringConst(_) => Opcode::UnicodeStringConst,
            ExprKind::NameConst(_) => Opcode::NameConst,
            ExprKind::VectorConst(_) => Opcode::VectorConst,
            ExprKind::RotationConst(_) => Opcode::RotationConst,
            ExprKind::TransformConst(_) => Opcode::TransformConst,
            ExprKind::True => Opcode::True,
            ExprKind::False => Opcode::False,
            ExprKind::NoObject => Opcode::NoObject,
            ExprKind::NoInterface => Opcode::NoInterface,
            ExprKind::SelfRef => Opcode::SelfRef,
            ExprKind::Nothing => Opcode::Nothing,
            ExprKind::NothingInt32 => Opcode::NothingInt32,
            ExprKind::ObjectConst(_) => Opcode::ObjectConst,
            ExprKind::SoftObjectConst(_) => Opcode::SoftObjectConst,
            ExprKind::PropertyConst(_) => Opcode::PropertyConst,
            ExprKind::SkipOffsetConst(_) => Opcode::SkipOffsetConst,
            ExprKind::FieldPathConst(_) => Opcode::FieldPathConst,
            ExprKind::TextConst(_) => Opcode::TextConst,
            ExprKind::VirtualFunction { .. } => Opcode::VirtualFunction,
            ExprKind::LocalVirtualFunction { .. } => Opcode::LocalVirtualFunction,
            ExprKind::FinalFunction { .. } => Opcode::FinalFunction,
            ExprKind::LocalFinalFunction { .. } => Opcode::LocalFinalFunction,
            ExprKind::CallMath { .. } => Opcode::CallMath,
            ExprKind::CallMulticastDelegate { .. } => Opcode::CallMulticastDelegate,
            ExprKind::Context { fail_silent, .. } => {
                if *fail_silent {
                    Opcode::ContextFailSilent
                } else {
                    Opcode::Context
                }
            }
            ExprKind::ClassContext { .. } => Opcode::ClassContext,
            ExprKind::StructMemberContext { .. } => Opcode::StructMemberContext,
            ExprKind::InterfaceContext(_) => Opcode::InterfaceContext,
            ExprKind::DynamicCast { .. } => Opcode::DynamicCast,
            ExprKind::MetaCast { .. } => Opcode::MetaCast,
            ExprKind::PrimitiveCast { .. } => Opcode::PrimitiveCast,
            ExprKind::ObjToInterfaceCast { .. } => Opcode::ObjToInterfaceCast,
            ExprKind::InterfaceToObjCast { .. } => Opcode::InterfaceToObjCast,
            ExprKind::CrossInterfaceCast { .. } => Opcode::CrossInterfaceCast,
            ExprKind::ArrayConst { .. } => Opcode::ArrayConst,
            ExprKind::StructConst { .. } => Opcode::StructConst,
            ExprKind::SetConst { .. } => Opcode::SetConst,
            ExprKind::MapConst { .. } => Opcode::MapConst,
            ExprKind::SetArray { .. } => Opcode::SetArray,
            ExprKind::SetSet { .. } => Opcode::SetSet,
            ExprKind::SetMap { .. } => Opcode::SetMap,
            ExprKind::ArrayGetByRef { .. } => Opcode::ArrayGetByRef,
            ExprKind::Let { .. } => Opcode::Let,
            ExprKind::LetObj { .. } => Opcode::LetObj,
            ExprKind::LetWeakObjPtr { .. } => Opcode::LetWeakObjPtr,
            ExprKind::LetBool { .. } => Opcode::LetBool,
            ExprKind::LetDelegate { .. } => Opcode::LetDelegate,
            ExprKind::LetMulticastDelegate { .. } => Opcode::LetMulticastDelegate,
            ExprKind::LetValueOnPersistentFrame { .. } => Opcode::LetValueOnPersistentFrame,
            ExprKind::InstanceDelegate(_) => Opcode::InstanceDelegate,
            ExprKind::BindDelegate { .. } => Opcode::BindDelegate,
            ExprKind::AddMulticastDelegate { .. } => Opcode::AddMulticastDelegate,
            ExprKind::RemoveMulticastDelegate { .. } => Opcode::RemoveMulticastDelegate,
            ExprKind::ClearMulticastDelegate(_) => Opcode::ClearMulticastDelegate,
            ExprKind::Return(_) => Opcode::Return,
            ExprKind::Jump { .. } => Opcode::Jump,
            ExprKind::JumpIfNot { .. } => Opcode::JumpIfNot,
            ExprKind::ComputedJump { .. } => Opcode::ComputedJump,
            ExprKind::SwitchValue { .. } => Opcode::SwitchValue,
            ExprKind::PushExecutionFlow { .. } => Opcode::PushExecutionFlow,
            ExprKind::PopExecutionFlow => Opcode::PopExecutionFlow,
            ExprKind::PopExecutionFlowIfNot { .. } => Opcode::PopExecutionFlowIfNot,
            ExprKind::Assert { .. } => Opcode::Assert,
            ExprKind::Skip { .. } => Opcode::Skip,
            ExprKind::Breakpoint => Opcode::Breakpoint,
            ExprKind::Tracepoint => Opcode::Tracepoint,
            ExprKind::WireTracepoint => Opcode::WireTracepoint,
            ExprKind::InstrumentationEvent { .. } => Opcode::InstrumentationEvent,
            ExprKind::BitFieldConst { .. } => Opcode::BitFieldConst,
            ExprKind::DeprecatedOp4A => Opcode::DeprecatedOp4A,
            ExprKind::EndOfScript => Opcode::EndOfScript,
            ExprKind::EndParmValue => Opcode::EndParmValue,
        };
        opcode.byte()
    }
}
