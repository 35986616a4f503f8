//! Statement rendering for decoded scripts.
//!
//! The [`Renderer`] walks each block of a [`ControlFlowGraph`] and prints one line of
//! pseudocode per executable record. Jumps become `goto block_N` against the graph's labels,
//! switches print inline, and instrumentation records are dropped unless asked for.

use std::fmt::Write;

use tracing::warn;

use crate::{
    analysis::cfg::ControlFlowGraph,
    asset::{PackageIndex, SymbolTable},
    bytecode::{
        BytecodeOffset, CastKind, Expr, ExprKind, PropertyRef, SwitchCase, TextLiteral, Vec3,
    },
    diagnostics::{Diagnostic, DiagnosticKind},
};

/// Turns expressions of one function into pseudocode statements.
///
/// Names are resolved through the [`SymbolTable`]; control transfer targets are resolved to
/// block labels through the function's [`ControlFlowGraph`]. Lookups that fail render as
/// `<unresolved:N>` and are recorded as diagnostics, which [`Renderer::diagnostics`] exposes
/// once rendering is done.
pub struct Renderer<'a> {
    symbols: &'a dyn SymbolTable,
    cfg: &'a ControlFlowGraph,
    keep_noise: bool,
    max_depth: usize,
    depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Renderer<'a> {
    /// Nesting depth past which sub-expressions render as `<too deep>`.
    pub const DEFAULT_MAX_DEPTH: usize = 128;

    /// Create a renderer for the function whose graph is `cfg`.
    #[must_use]
    pub fn new(symbols: &'a dyn SymbolTable, cfg: &'a ControlFlowGraph) -> Self {
        Renderer {
            symbols,
            cfg,
            keep_noise: false,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            depth: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Render instrumentation records as `// Opcode` comments instead of dropping them.
    #[must_use]
    pub fn with_noise(mut self, keep_noise: bool) -> Self {
        self.keep_noise = keep_noise;
        self
    }

    /// Limit how deeply nested an expression may be before rendering stops descending.
    ///
    /// Subtrees below the limit render as `<too deep>` and record a
    /// [`DiagnosticKind::MalformedInput`] diagnostic at the expression where rendering stopped.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Diagnostics recorded so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the renderer, returning its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Render the statements of every block, in block order.
    ///
    /// `script` must be the script `cfg` was built from.
    pub fn render_blocks(&mut self, script: &[Expr]) -> Vec<Vec<String>> {
        let cfg = self.cfg;
        cfg.blocks()
            .iter()
            .map(|block| {
                script
                    .get(block.instructions.clone())
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|expr| self.render_statement(expr))
                    .collect()
            })
            .collect()
    }

    /// Render one top-level expression.
    ///
    /// Returns `None` for instrumentation records that carry no executable effect.
    pub fn render_statement(&mut self, expr: &Expr) -> Option<String> {
        if expr.is_noise() {
            return self.keep_noise.then(|| format!("// {}", opcode_name(expr)));
        }
        self.depth = 0;
        Some(self.guarded(expr, true))
    }

    fn guarded(&mut self, expr: &Expr, top_level: bool) -> String {
        if self.depth >= self.max_depth {
            warn!(offset = ?expr.offset, depth = self.depth, "expression nested too deeply");
            let diagnostic = self.diagnostic_at(
                expr,
                DiagnosticKind::MalformedInput,
                &format!("Expression nesting exceeds {} levels", self.max_depth),
            );
            self.diagnostics.push(diagnostic);
            return "<too deep>".to_string();
        }

        self.depth += 1;
        let text = self.render(expr, top_level);
        self.depth -= 1;
        text
    }

    fn expr(&mut self, expr: &Expr) -> String {
        self.guarded(expr, false)
    }

    fn list(&mut self, exprs: &[Expr]) -> String {
        exprs
            .iter()
            .map(|e| self.expr(e))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn pairs(&mut self, exprs: &[Expr]) -> String {
        exprs
            .chunks(2)
            .map(|pair| match pair {
                [key, value] => format!("{}: {}", self.expr(key), self.expr(value)),
                [key] => self.expr(key),
                _ => String::new(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn diagnostic_at(&self, expr: &Expr, kind: DiagnosticKind, message: &str) -> Diagnostic {
        let diagnostic = Diagnostic::warning(kind, message);
        match expr.offset {
            Some(offset) => diagnostic.at(offset),
            None => diagnostic,
        }
    }

    fn unresolved(&mut self, index: PackageIndex) -> String {
        warn!(%index, "name lookup failed");
        self.diagnostics.push(Diagnostic::warning(
            DiagnosticKind::DanglingReference,
            format!("No name for {index}"),
        ));
        format!("<unresolved:{}>", index.raw())
    }

    fn object(&mut self, index: PackageIndex) -> String {
        if index.is_null() {
            return "None".to_string();
        }
        match self.symbols.object_name(index) {
            Some(name) => name.to_string(),
            None => self.unresolved(index),
        }
    }

    fn property(&mut self, property: &PropertyRef) -> String {
        match self.symbols.property_name(property) {
            Some(name) => name,
            None => self.unresolved(property.anchor()),
        }
    }

    fn math_call(&mut self, func: PackageIndex) -> String {
        let name = self.object(func);
        match self.symbols.outer_name(func) {
            Some(library) => format!("{library}.{name}"),
            None => name,
        }
    }

    fn label(&self, target: BytecodeOffset) -> String {
        let offsets = self.cfg.offsets();
        offsets
            .index_of(target)
            .or_else(|| offsets.index_containing(target))
            .and_then(|index| self.cfg.block_of_instruction(index))
            .map_or_else(|| format!("unresolved_{target}"), |block| block.to_string())
    }

    fn assigned_property<'e>(
        variable: &'e Expr,
        declared: Option<&'e PropertyRef>,
    ) -> Option<&'e PropertyRef> {
        match &variable.kind {
            ExprKind::LocalVariable(p)
            | ExprKind::InstanceVariable(p)
            | ExprKind::DefaultVariable(p)
            | ExprKind::LocalOutVariable(p)
            | ExprKind::ClassSparseDataVariable(p) => Some(p),
            ExprKind::Context { field, .. } | ExprKind::ClassContext { field, .. } => {
                field.as_ref().or(declared)
            }
            ExprKind::StructMemberContext { member, .. } => Some(member),
            _ => declared,
        }
    }

    fn assignment(
        &mut self,
        variable: &Expr,
        value: &Expr,
        declared: Option<&PropertyRef>,
    ) -> String {
        let target = self.expr(variable);
        let enum_name = match (&value.kind, Self::assigned_property(variable, declared)) {
            (ExprKind::ByteConst(v) | ExprKind::IntConstByte(v), Some(property)) => {
                self.symbols.enum_value(property, *v)
            }
            _ => None,
        };
        let rhs = match enum_name {
            Some(name) => name,
            None => self.expr(value),
        };
        format!("{target} = {rhs}")
    }

    fn switch(
        &mut self,
        index: &Expr,
        cases: &[SwitchCase],
        default: &Expr,
        end: BytecodeOffset,
        top_level: bool,
    ) -> String {
        let mut text = format!("switch ({}) {{ ", self.expr(index));
        for case in cases {
            let value = self.expr(&case.value);
            let result = self.expr(&case.result);
            if top_level {
                let _ = write!(
                    text,
                    "case {value}: {result} goto {}; ",
                    self.label(case.next_offset)
                );
            } else {
                let _ = write!(text, "case {value}: {result}; ");
            }
        }
        let default = self.expr(default);
        if top_level {
            let _ = write!(text, "default: {default} goto {} }}", self.label(end));
        } else {
            let _ = write!(text, "default: {default} }}");
        }
        text
    }

    fn text(&mut self, literal: &TextLiteral) -> String {
        match literal {
            TextLiteral::Empty => "FText()".to_string(),
            TextLiteral::LocalizedText {
                source,
                key,
                namespace,
            } => format!(
                "NSLOCTEXT({}, {}, {})",
                self.expr(namespace),
                self.expr(key),
                self.expr(source)
            ),
            TextLiteral::InvariantText { source } => format!("INVTEXT({})", self.expr(source)),
            TextLiteral::LiteralString { source } => self.expr(source),
            TextLiteral::StringTableEntry { table_id, key, .. } => {
                format!("LOCTABLE({}, {})", self.expr(table_id), self.expr(key))
            }
        }
    }

    fn render(&mut self, expr: &Expr, top_level: bool) -> String {
        match &expr.kind {
            ExprKind::LocalVariable(p)
            | ExprKind::InstanceVariable(p)
            | ExprKind::DefaultVariable(p)
            | ExprKind::LocalOutVariable(p)
            | ExprKind::ClassSparseDataVariable(p)
            | ExprKind::PropertyConst(p) => self.property(p),

            ExprKind::IntConst(v) => v.to_string(),
            ExprKind::Int64Const(v) => v.to_string(),
            ExprKind::UInt64Const(v) => v.to_string(),
            ExprKind::IntZero => "0".to_string(),
            ExprKind::IntOne => "1".to_string(),
            ExprKind::ByteConst(v) | ExprKind::IntConstByte(v) => v.to_string(),
            ExprKind::FloatConst(v) => format!("{v:?}"),
            ExprKind::DoubleConst(v) => format!("{v:?}"),
            ExprKind::StringConst(s) | ExprKind::UnicodeStringConst(s) => format!("{s:?}"),
            ExprKind::NameConst(name) => format!("'{name}'"),
            ExprKind::VectorConst(v) => format!("Vector{}", vec3(*v)),
            ExprKind::RotationConst(v) => format!("Rotator{}", vec3(*v)),
            ExprKind::TransformConst(t) => {
                let [x, y, z, w] = t.rotation;
                format!(
                    "Transform(Quat({x:?}, {y:?}, {z:?}, {w:?}), Vector{}, Vector{})",
                    vec3(t.translation),
                    vec3(t.scale)
                )
            }

            ExprKind::True => "true".to_string(),
            ExprKind::False => "false".to_string(),
            ExprKind::NoObject | ExprKind::NoInterface => "None".to_string(),
            ExprKind::SelfRef => "self".to_string(),
            ExprKind::Nothing | ExprKind::NothingInt32 => "nothing".to_string(),

            ExprKind::ObjectConst(o) => self.object(*o),
            ExprKind::SoftObjectConst(e) => format!("SoftObject({})", self.expr(e)),
            ExprKind::SkipOffsetConst(offset) => self.label(*offset),
            ExprKind::FieldPathConst(e) => format!("FieldPath({})", self.expr(e)),
            ExprKind::TextConst(literal) => self.text(literal),

            ExprKind::VirtualFunction { func, params }
            | ExprKind::LocalVirtualFunction { func, params } => {
                format!("{func}({})", self.list(params))
            }
            ExprKind::FinalFunction { func, params }
            | ExprKind::LocalFinalFunction { func, params } => {
                let name = self.object(*func);
                format!("{name}({})", self.list(params))
            }
            ExprKind::CallMath { func, params } => {
                let name = self.math_call(*func);
                format!("{name}({})", self.list(params))
            }
            ExprKind::CallMulticastDelegate {
                delegate, params, ..
            } => {
                let delegate = self.expr(delegate);
                format!("{delegate}.Broadcast({})", self.list(params))
            }

            ExprKind::Context {
                object, context, ..
            }
            | ExprKind::ClassContext {
                object, context, ..
            } => {
                let object = self.expr(object);
                format!("{object}.{}", self.expr(context))
            }
            ExprKind::StructMemberContext {
                member,
                struct_expr,
            } => {
                let owner = self.expr(struct_expr);
                format!("{owner}.{}", self.property(member))
            }
            ExprKind::InterfaceContext(e) => self.expr(e),

            ExprKind::DynamicCast { class, expr: inner }
            | ExprKind::ObjToInterfaceCast { class, expr: inner }
            | ExprKind::InterfaceToObjCast { class, expr: inner }
            | ExprKind::CrossInterfaceCast { class, expr: inner } => {
                let class = self.object(*class);
                format!("({class}){}", self.expr(inner))
            }
            ExprKind::MetaCast { class, expr: inner } => {
                let class = self.object(*class);
                format!("(class<{class}>){}", self.expr(inner))
            }
            ExprKind::PrimitiveCast {
                conversion,
                expr: inner,
            } => {
                let kind = CastKind::from_repr(*conversion).map_or_else(
                    || format!("cast_0x{conversion:02X}"),
                    |kind| kind.as_ref().to_string(),
                );
                format!("({kind}){}", self.expr(inner))
            }

            ExprKind::ArrayConst { elements, .. } => format!("[{}]", self.list(elements)),
            ExprKind::SetConst { elements, .. } => format!("{{{}}}", self.list(elements)),
            ExprKind::MapConst { elements, .. } => format!("{{{}}}", self.pairs(elements)),
            ExprKind::StructConst {
                struct_type,
                elements,
                ..
            } => {
                let name = self.object(*struct_type);
                format!("{name}{{{}}}", self.list(elements))
            }
            ExprKind::SetArray { array, elements } => {
                let target = self.expr(array);
                format!("{target} = [{}]", self.list(elements))
            }
            ExprKind::SetSet { set, elements } => {
                let target = self.expr(set);
                format!("{target} = {{{}}}", self.list(elements))
            }
            ExprKind::SetMap { map, elements } => {
                let target = self.expr(map);
                format!("{target} = {{{}}}", self.pairs(elements))
            }
            ExprKind::ArrayGetByRef { array, index } => {
                let array = self.expr(array);
                format!("{array}[{}]", self.expr(index))
            }

            ExprKind::Let {
                property,
                variable,
                value,
            } => self.assignment(variable, value, property.as_ref()),
            ExprKind::LetObj { variable, value }
            | ExprKind::LetWeakObjPtr { variable, value }
            | ExprKind::LetBool { variable, value }
            | ExprKind::LetDelegate { variable, value }
            | ExprKind::LetMulticastDelegate { variable, value } => {
                self.assignment(variable, value, None)
            }
            ExprKind::LetValueOnPersistentFrame { property, value } => {
                let target = self.property(property);
                format!("{target} = {}", self.expr(value))
            }

            ExprKind::InstanceDelegate(name) => name.to_string(),
            ExprKind::BindDelegate {
                func_name,
                delegate,
                object,
            } => {
                let delegate = self.expr(delegate);
                let object = self.expr(object);
                format!("{delegate}.BindUFunction({object}, \"{func_name}\")")
            }
            ExprKind::AddMulticastDelegate { delegate, other } => {
                let delegate = self.expr(delegate);
                format!("{delegate}.AddDelegate({})", self.expr(other))
            }
            ExprKind::RemoveMulticastDelegate { delegate, other } => {
                let delegate = self.expr(delegate);
                format!("{delegate}.RemoveDelegate({})", self.expr(other))
            }
            ExprKind::ClearMulticastDelegate(delegate) => {
                format!("{}.Clear()", self.expr(delegate))
            }

            ExprKind::Return(value) => match value.kind {
                ExprKind::Nothing | ExprKind::NothingInt32 => "return".to_string(),
                _ => format!("return {}", self.expr(value)),
            },
            ExprKind::Jump { target } => format!("goto {}", self.label(*target)),
            ExprKind::JumpIfNot { target, condition } => {
                let condition = self.expr(condition);
                format!("if not ({condition}) goto {}", self.label(*target))
            }
            ExprKind::ComputedJump { offset_expr } => format!("goto *({})", self.expr(offset_expr)),
            ExprKind::SwitchValue {
                index,
                end_offset,
                cases,
                default,
            } => self.switch(index, cases, default, *end_offset, top_level),
            ExprKind::PushExecutionFlow { push_offset } => {
                format!("push_flow {}", self.label(*push_offset))
            }
            ExprKind::PopExecutionFlow => "pop_flow".to_string(),
            ExprKind::PopExecutionFlowIfNot { condition } => {
                format!("pop_flow_if_not ({})", self.expr(condition))
            }

            ExprKind::Assert { condition, .. } => format!("assert({})", self.expr(condition)),
            ExprKind::Skip { expr: inner, .. } => self.expr(inner),
            ExprKind::BitFieldConst { value, .. } => (*value != 0).to_string(),

            ExprKind::Breakpoint
            | ExprKind::Tracepoint
            | ExprKind::WireTracepoint
            | ExprKind::InstrumentationEvent { .. }
            | ExprKind::DeprecatedOp4A
            | ExprKind::EndOfScript
            | ExprKind::EndParmValue => format!("/* {} */", opcode_name(expr)),

            ExprKind::Unknown { opcode, .. } => format!("<unsupported 0x{opcode:02X}>"),
        }
    }
}

fn vec3(v: Vec3) -> String {
    format!("({:?}, {:?}, {:?})", v.0, v.1, v.2)
}

fn opcode_name(expr: &Expr) -> String {
    expr.opcode().map_or_else(
        || format!("0x{:02X}", expr.opcode_byte()),
        |opcode| opcode.to_string(),
    )
}
