use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Only conditions that make a whole unit of work unusable are expressed as an [`Error`]. Problems
/// that leave the rest of a function or graph intact (an unsupported opcode, a corrupt pin blob,
/// a link to a node that no longer exists) are collected as
/// [`Diagnostic`](crate::Diagnostic) values instead and travel with the produced report.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Malformed`] - Inconsistent expression sequence, asset table or pin blob
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a byte buffer
/// - [`Error::Empty`] - Empty input provided
///
/// ## Analysis Errors
/// - [`Error::GraphError`] - Control-flow or pin graph construction failure
/// - [`Error::Cancelled`] - Work was abandoned through the cancellation flag
///
/// # Examples
///
/// ```rust
/// use kismetscope::{Error, OffsetIndex, ScriptLayout};
///
/// match OffsetIndex::build(&[], ScriptLayout::default(), None) {
///     Ok(index) => println!("{} instructions", index.len()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed script: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input is damaged and could not be analyzed.
    ///
    /// Raised when a recorded bytecode offset disagrees with the computed one, when an asset
    /// table references itself inconsistently, or when a pin blob cannot be decoded.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading a byte buffer.
    #[error("Out of Bound read would have occurred - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// Graph construction failed.
    #[error("{0}")]
    GraphError(String),

    /// The cancellation flag was raised before the work item started.
    #[error("Analysis was cancelled")]
    Cancelled,
}
