//! Blueprint graph nodes and their pins.
//!
//! Before compilation a blueprint is a set of graphs whose nodes exchange data and execution
//! through pins. Each node export stores its pins as a binary blob whose layout depends on the
//! asset's [`PinVersion`]; links between pins are stored as pin identifiers on both ends.
//!
//! # Key Components
//!
//! - [`read_pins`] / [`write_pins`] - Blob decoding and encoding
//! - [`build_node_graph`] - Link resolution, filtering and grouping into a [`NodeGraph`]

mod graph;
mod reader;
mod types;
mod version;
mod writer;

pub use graph::{build_node_graph, DanglingLink, GraphNode, NodeGraph, PinLink, PinView};
pub use reader::read_pins;
pub use types::{ContainerKind, Pin, PinDirection, PinType};
pub use version::PinVersion;
pub use writer::write_pins;
