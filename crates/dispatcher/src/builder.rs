//! Assembles the outbound request for a validated, resolved invocation.
//!
//! Query order is fixed: date fields, operation filters, `timezone`, then the
//! token (appended by [`OutboundRequest::new`]).

use crate::validator::{ArgValue, ValidatedArgs};
use api_client::error::ApiError;
use api_client::{ApiToken, OutboundRequest};
use chrono::Datelike;
use core_types::{OperationSpec, RangeRule, ResolvedTimeRange, Tz};

/// Tool field name to export API query key, for the operation filters.
const FILTER_KEYS: &[(&str, &str)] = &[
    ("app", "app"),
    ("environment", "environment"),
    ("custom_field", "customField"),
    ("group_by", "groupBy"),
];

pub fn build_request(
    spec: &OperationSpec,
    args: &ValidatedArgs,
    range: &ResolvedTimeRange,
    token: &ApiToken,
    default_timezone: Tz,
) -> Result<OutboundRequest, ApiError> {
    let mut params: Vec<(&'static str, String)> = Vec::with_capacity(6);

    match spec.range {
        RangeRule::NamedOrExplicit | RangeRule::MonthAligned => {
            params.push(("startDate", range.start_date()));
            params.push(("endDate", range.end_date()));
        }
        RangeRule::SingleMonth => params.push(("month", range.start_date())),
        RangeRule::CalendarYear => params.push(("year", range.start().year().to_string())),
    }

    // Filters follow the schema's declaration order.
    for param in spec.params {
        let Some(key) = filter_key(param.name) else {
            continue;
        };
        let value = match args.get(param.name) {
            Some(value) => Some(render(value)),
            None => param.default.map(str::to_string),
        };
        if let Some(value) = value {
            params.push((key, value));
        }
    }

    let timezone = args.timezone("timezone").unwrap_or(default_timezone);
    params.push(("timezone", timezone.name().to_string()));

    OutboundRequest::new(spec.endpoint, params, token)
}

fn filter_key(name: &str) -> Option<&'static str> {
    FILTER_KEYS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, key)| *key)
}

/// Query form of a value. Lists become one comma-joined value, never repeated keys.
fn render(value: &ArgValue) -> String {
    match value {
        ArgValue::Date(d) => core_types::calendar::format_date(*d),
        ArgValue::Integer(n) => n.to_string(),
        ArgValue::Text(s) => s.clone(),
        ArgValue::List(items) => items.join(","),
        ArgValue::Choice(c) => (*c).to_string(),
        ArgValue::Zone(tz) => tz.name().to_string(),
    }
}
