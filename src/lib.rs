//! Debug info for compiled bytecode.
//!
//! The debug info records, per function, which source location produced each instruction, the
//! names of the function's variables and its lexical parent, and readable names for callees of
//! call instructions. None of it is needed to execute the bytecode; it is consumed by debuggers,
//! stack trace formatters and profilers.
//!
//! A [`DebugInfoGenerator`] is fed by the compiler in function emission order, and then
//! consumed into an immutable [`DebugInfo`] that answers queries:
//!
//! ```
//! use bytecode_debuginfo::{DebugInfoGenerator, DebugSourceLocation, FilenameTable};
//!
//! let mut filenames = FilenameTable::new();
//! let file = filenames.add_filename("main.js");
//!
//! let mut generator = DebugInfoGenerator::new(filenames);
//! let offset = generator.append_source_locations(
//!     &DebugSourceLocation::new(0, file, 1, 1, 1),
//!     0,
//!     &[DebugSourceLocation::new(10, file, 2, 5, 2)],
//! );
//! let debug_info = generator.serialize_with_move();
//!
//! let location = debug_info.get_location_for_address(offset, 12).unwrap();
//! assert_eq!((location.line, location.column), (2, 5));
//! ```

#![warn(missing_docs)]

mod debuginfo;
pub mod error;
pub mod format;
mod generator;
pub mod leb128;
pub mod strings;
mod types;

pub use debuginfo::{DebugInfo, FunctionIter, SourceLocationIter, SourceMapSink, SourceMapping};
pub use error::Error;
pub use generator::{DebugInfoGenerator, MOST_COMMON_ENTRY_OFFSET};
pub use strings::{FilenameTable, Identifier};
pub use types::*;
