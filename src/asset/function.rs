//! Function exports and their compiled scripts.

use bitflags::bitflags;
use serde::Serialize;

use crate::bytecode::Expr;

bitflags! {
    /// Function flags (`EFunctionFlags`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    #[serde(transparent)]
    pub struct FunctionFlags: u32 {
        /// Function is final (prebindable, non-overridable function)
        const FINAL = 0x0000_0001;
        /// Function may only be called on the server
        const BLUEPRINT_AUTHORITY_ONLY = 0x0000_0004;
        /// Function is cosmetic in nature and should not be invoked on dedicated servers
        const BLUEPRINT_COSMETIC = 0x0000_0008;
        /// Function is network-replicated
        const NET = 0x0000_0040;
        /// Function should be sent reliably on the network
        const NET_RELIABLE = 0x0000_0080;
        /// Function is an exec function
        const EXEC = 0x0000_0200;
        /// Function is native
        const NATIVE = 0x0000_0400;
        /// Function is an event
        const EVENT = 0x0000_0800;
        /// Function is static
        const STATIC = 0x0000_2000;
        /// Function is replicated to all clients
        const NET_MULTICAST = 0x0000_4000;
        /// Function is the event graph of its class
        const UBERGRAPH_FUNCTION = 0x0000_8000;
        /// Function is a multi-cast delegate signature
        const MULTICAST_DELEGATE = 0x0001_0000;
        /// Function is accessible in all classes
        const PUBLIC = 0x0002_0000;
        /// Function is accessible only in the class it is defined in
        const PRIVATE = 0x0004_0000;
        /// Function is accessible only in the class and its subclasses
        const PROTECTED = 0x0008_0000;
        /// Function is a delegate signature
        const DELEGATE = 0x0010_0000;
        /// Function is executed on servers
        const NET_SERVER = 0x0020_0000;
        /// Function has out (pass by reference) parameters
        const HAS_OUT_PARMS = 0x0040_0000;
        /// Function has structs that contain defaults
        const HAS_DEFAULTS = 0x0080_0000;
        /// Function is executed on clients
        const NET_CLIENT = 0x0100_0000;
        /// Function can be called from blueprint code
        const BLUEPRINT_CALLABLE = 0x0400_0000;
        /// Function can be overridden in blueprints
        const BLUEPRINT_EVENT = 0x0800_0000;
        /// Function has no side effects
        const BLUEPRINT_PURE = 0x1000_0000;
        /// Function is editor only
        const EDITOR_ONLY = 0x2000_0000;
        /// Function does not modify its owner
        const CONST = 0x4000_0000;
        /// Function must supply a validation routine
        const NET_VALIDATE = 0x8000_0000;
    }
}

impl FunctionFlags {
    /// Short, space separated summary of the flags relevant to a reader.
    ///
    /// ```rust
    /// use kismetscope::FunctionFlags;
    ///
    /// let flags = FunctionFlags::PUBLIC | FunctionFlags::STATIC | FunctionFlags::BLUEPRINT_PURE;
    /// assert_eq!(flags.summary(), "public static pure");
    /// ```
    #[must_use]
    pub fn summary(self) -> String {
        const LABELS: &[(FunctionFlags, &str)] = &[
            (FunctionFlags::PUBLIC, "public"),
            (FunctionFlags::PROTECTED, "protected"),
            (FunctionFlags::PRIVATE, "private"),
            (FunctionFlags::STATIC, "static"),
            (FunctionFlags::FINAL, "final"),
            (FunctionFlags::NATIVE, "native"),
            (FunctionFlags::EVENT, "event"),
            (FunctionFlags::UBERGRAPH_FUNCTION, "ubergraph"),
            (FunctionFlags::BLUEPRINT_PURE, "pure"),
            (FunctionFlags::CONST, "const"),
            (FunctionFlags::NET, "net"),
        ];

        LABELS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, label)| *label)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Compiled body of a function export.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionBody {
    /// Function flags
    pub flags: FunctionFlags,
    /// Top-level instructions in execution order
    pub script: Vec<Expr>,
    /// In-memory script size the package declared, if it declared one
    pub script_size: Option<u32>,
}

impl FunctionBody {
    /// Create a body from its script.
    #[must_use]
    pub fn new(script: Vec<Expr>) -> Self {
        FunctionBody {
            flags: FunctionFlags::empty(),
            script,
            script_size: None,
        }
    }

    /// Builder-style flag setter.
    #[must_use]
    pub fn with_flags(mut self, flags: FunctionFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Builder-style declared script size.
    #[must_use]
    pub fn with_script_size(mut self, size: u32) -> Self {
        self.script_size = Some(size);
        self
    }
}
