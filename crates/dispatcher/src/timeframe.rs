//! Turns validated arguments into one canonical date window.
//!
//! Named timeframes are inclusive of today: `last_7_days` on 2024-03-10 is
//! 2024-03-04..2024-03-10. "Today" is the caller's date in the request zone.

use crate::validator::ValidatedArgs;
use chrono::NaiveDate;
use core_types::{
    OperationSpec, RangeRule, ResolvedTimeRange, Timeframe, ValidationError, calendar,
};

pub fn resolve(
    spec: &OperationSpec,
    args: &ValidatedArgs,
    today: NaiveDate,
    default_timeframe: Option<Timeframe>,
) -> Result<ResolvedTimeRange, ValidationError> {
    match spec.range {
        RangeRule::NamedOrExplicit => resolve_named_or_explicit(args, today, default_timeframe),
        RangeRule::MonthAligned => resolve_month_aligned(args),
        RangeRule::SingleMonth => resolve_single_month(args),
        RangeRule::CalendarYear => resolve_calendar_year(args),
    }
}

/// The window a named timeframe covers when evaluated on `today`.
pub fn named_range(timeframe: Timeframe, today: NaiveDate) -> Result<ResolvedTimeRange, ValidationError> {
    ResolvedTimeRange::new(calendar::window_start(today, timeframe.days()), today)
}

fn resolve_named_or_explicit(
    args: &ValidatedArgs,
    today: NaiveDate,
    default_timeframe: Option<Timeframe>,
) -> Result<ResolvedTimeRange, ValidationError> {
    let named = args.choice("timeframe");
    let start = args.date("start_date");
    let end = args.date("end_date");

    match (named, start, end) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(ValidationError::ConflictingTimeframe),
        (Some(name), None, None) => {
            let timeframe = name.parse::<Timeframe>().map_err(|_| ValidationError::InvalidEnum {
                field: "timeframe".to_string(),
                allowed: Timeframe::NAMES.to_vec(),
            })?;
            named_range(timeframe, today)
        }
        (None, Some(start), Some(end)) => ResolvedTimeRange::new(start, end),
        (None, Some(_), None) => Err(ValidationError::IncompleteRange {
            present: "start_date".to_string(),
            missing: "end_date".to_string(),
        }),
        (None, None, Some(_)) => Err(ValidationError::IncompleteRange {
            present: "end_date".to_string(),
            missing: "start_date".to_string(),
        }),
        (None, None, None) => match default_timeframe {
            Some(timeframe) => named_range(timeframe, today),
            None => Err(ValidationError::MissingTimeframe),
        },
    }
}

fn resolve_month_aligned(args: &ValidatedArgs) -> Result<ResolvedTimeRange, ValidationError> {
    let start = args
        .date("start_date")
        .ok_or_else(|| ValidationError::missing("start_date"))?;
    let end = args
        .date("end_date")
        .ok_or_else(|| ValidationError::missing("end_date"))?;

    let range = ResolvedTimeRange::new(start, end)?;
    if !calendar::is_first_of_month(start) {
        return Err(ValidationError::NotMonthAligned {
            field: "start_date".to_string(),
            reason: format!(
                "{} is not the first day of its month (expected {})",
                calendar::format_date(start),
                calendar::format_date(calendar::first_of_month(start))
            ),
        });
    }
    if !calendar::is_last_of_month(end) {
        return Err(ValidationError::NotMonthAligned {
            field: "end_date".to_string(),
            reason: format!(
                "{} is not the last day of its month (expected {})",
                calendar::format_date(end),
                calendar::format_date(calendar::last_of_month(end))
            ),
        });
    }
    Ok(range)
}

fn resolve_single_month(args: &ValidatedArgs) -> Result<ResolvedTimeRange, ValidationError> {
    let month = args
        .date("month")
        .ok_or_else(|| ValidationError::missing("month"))?;
    if !calendar::is_first_of_month(month) {
        return Err(ValidationError::NotMonthAligned {
            field: "month".to_string(),
            reason: format!(
                "{} is not the first day of its month (expected {})",
                calendar::format_date(month),
                calendar::format_date(calendar::first_of_month(month))
            ),
        });
    }
    ResolvedTimeRange::new(month, calendar::last_of_month(month))
}

fn resolve_calendar_year(args: &ValidatedArgs) -> Result<ResolvedTimeRange, ValidationError> {
    let year = args
        .integer("year")
        .ok_or_else(|| ValidationError::missing("year"))?;
    let invalid = || ValidationError::invalid_format("year", "a calendar year");
    let year = i32::try_from(year).map_err(|_| invalid())?;
    let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
    ResolvedTimeRange::new(start, end)
}
