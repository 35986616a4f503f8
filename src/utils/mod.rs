//! Small helpers shared across modules.

mod dot;

pub(crate) use dot::escape_dot;
