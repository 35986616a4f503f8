//! Byte-level reading of serialized blueprint data.
//!
//! The analysis passes mostly consume already-decoded expression trees and property bags.
//! The one place raw bytes still have to be interpreted is the pin blob that graph node exports
//! carry; this module holds the primitives for that.
//!
//! - [`parser::Parser`] - bounds-checked cursor with `FString` and identifier support
//! - [`io::KismetIO`] - little-endian primitive decoding

pub mod io;
pub mod parser;
