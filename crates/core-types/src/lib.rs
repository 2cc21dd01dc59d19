pub mod calendar;
pub mod enums;
pub mod error;
pub mod operations;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{GroupBy, Operation, Timeframe};
pub use error::ValidationError;
pub use operations::{DEFAULT_TIMEZONE, OPERATION_SPECS, find_spec};
pub use chrono_tz::Tz;
pub use structs::{OperationSpec, ParamKind, ParamSpec, RangeRule, ResolvedTimeRange};
