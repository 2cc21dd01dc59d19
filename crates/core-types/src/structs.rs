use crate::calendar;
use crate::enums::Operation;
use crate::error::ValidationError;
use chrono::NaiveDate;
use std::fmt;

/// The value shape a tool parameter must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// `YYYY-MM-DD`.
    Date,
    /// One of a fixed, case-sensitive set.
    Enum(&'static [&'static str]),
    Text,
    /// Comma-separated string or array of strings, sent as one comma-joined value.
    List,
    /// Whole number within an inclusive range.
    Integer { min: i64, max: i64 },
    /// `UTC` or an `Area/Location` style zone name.
    Timezone,
}

/// One entry of an operation's parameter schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub required: bool,
    pub kind: ParamKind,
    pub description: &'static str,
    /// Advertised default, applied by the request builder when the field is absent.
    pub default: Option<&'static str>,
}

/// How an operation's date window is derived from its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRule {
    /// `timeframe` or an explicit `start_date`/`end_date` pair, never both.
    NamedOrExplicit,
    /// Explicit `start_date`/`end_date` covering whole calendar months.
    MonthAligned,
    /// A single `month` given as the first day of that month.
    SingleMonth,
    /// A single calendar `year`.
    CalendarYear,
}

/// Static descriptor of a supported export operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationSpec {
    pub operation: Operation,
    /// Path below the API base URL.
    pub endpoint: &'static str,
    pub description: &'static str,
    pub range: RangeRule,
    pub params: &'static [ParamSpec],
}

impl OperationSpec {
    pub fn name(&self) -> &'static str {
        self.operation.tool_name()
    }

    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn required_params(&self) -> impl Iterator<Item = &'static ParamSpec> {
        let params: &'static [ParamSpec] = self.params;
        params.iter().filter(|p| p.required)
    }
}

/// A validated, inclusive date window. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTimeRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl ResolvedTimeRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedRange {
                start: calendar::format_date(start),
                end: calendar::format_date(end),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Start date in query form (`YYYY-MM-DD`).
    pub fn start_date(&self) -> String {
        calendar::format_date(self.start)
    }

    /// End date in query form (`YYYY-MM-DD`).
    pub fn end_date(&self) -> String {
        calendar::format_date(self.end)
    }
}

impl fmt::Display for ResolvedTimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_date(), self.end_date())
    }
}
