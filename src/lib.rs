//! Build-time validation and aggregation for physics interface metadata.
//!
//! Physics parameterizations describe their interfaces twice: once in a
//! machine-readable metadata table and once in the routine's real declared
//! signature. Before any interface ("cap") code may be generated, the two
//! descriptions must be proven exactly consistent, otherwise the generated
//! glue would silently pass wrong data.
//!
//! The crate reconciles the two descriptions per file, then folds the
//! validated headers into the canonical host/scheme collections consumed
//! by the later generation stages.

pub mod core;
pub mod driver;
pub mod codegen;
pub mod input;

pub use crate::core::aggregate::{HostModel, KnownDdts, SchemeLibrary};
pub use crate::core::compare::{HeaderAssociation, compare_headers, pair_headers, validate_batch};
pub use crate::core::error::{CapgenError, CapgenResult};
