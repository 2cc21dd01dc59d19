use crate::enums::{GroupBy, Operation, Timeframe};
use crate::structs::{OperationSpec, ParamKind, ParamSpec, RangeRule};

pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const MIN_YEAR: i64 = 2000;
pub const MAX_YEAR: i64 = 2100;

// --- Shared parameter definitions ---

const TIMEZONE: ParamSpec = ParamSpec {
    name: "timezone",
    required: false,
    kind: ParamKind::Timezone,
    description: "Timezone for data aggregation (e.g., America/New_York)",
    default: Some(DEFAULT_TIMEZONE),
};

const TIMEFRAME: ParamSpec = ParamSpec {
    name: "timeframe",
    required: false,
    kind: ParamKind::Enum(Timeframe::NAMES),
    description: "Predefined timeframe ending today (alternative to start_date/end_date; defaults to last_7_days)",
    default: None,
};

const RANGE_START: ParamSpec = ParamSpec {
    name: "start_date",
    required: false,
    kind: ParamKind::Date,
    description: "Start date in YYYY-MM-DD format (alternative to timeframe)",
    default: None,
};

const RANGE_END: ParamSpec = ParamSpec {
    name: "end_date",
    required: false,
    kind: ParamKind::Date,
    description: "End date in YYYY-MM-DD format (alternative to timeframe)",
    default: None,
};

const MONTH_START: ParamSpec = ParamSpec {
    name: "start_date",
    required: true,
    kind: ParamKind::Date,
    description: "First day of the start month in YYYY-MM-DD format",
    default: None,
};

const MONTH_END: ParamSpec = ParamSpec {
    name: "end_date",
    required: true,
    kind: ParamKind::Date,
    description: "Last day of the end month in YYYY-MM-DD format",
    default: None,
};

/// The complete, immutable operation table.
pub static OPERATION_SPECS: [OperationSpec; 6] = [
    OperationSpec {
        operation: Operation::PullRequestMetrics,
        endpoint: "/reports/pullRequests",
        description: "Get pull request metrics for the organization including cycle time, review rate, merge time, etc.",
        range: RangeRule::NamedOrExplicit,
        params: &[TIMEFRAME, RANGE_START, RANGE_END, TIMEZONE],
    },
    OperationSpec {
        operation: Operation::DoraMetrics,
        endpoint: "/reports/dora",
        description: "Get DORA metrics including deployment frequency, change lead time, change failure rate, etc.",
        range: RangeRule::NamedOrExplicit,
        params: &[
            TIMEFRAME,
            RANGE_START,
            RANGE_END,
            TIMEZONE,
            ParamSpec {
                name: "app",
                required: false,
                kind: ParamKind::List,
                description: "Deployment application name(s), separated by commas if more than one",
                default: None,
            },
            ParamSpec {
                name: "environment",
                required: false,
                kind: ParamKind::List,
                description: "Deployment environment(s), separated by commas if more than one",
                default: None,
            },
        ],
    },
    OperationSpec {
        operation: Operation::InvestmentBalance,
        endpoint: "/reports/investment",
        description: "Get investment balance statistics using the Effort model (monthly FTE data)",
        range: RangeRule::MonthAligned,
        params: &[MONTH_START, MONTH_END, TIMEZONE],
    },
    OperationSpec {
        operation: Operation::SoftwareCapitalizationReport,
        endpoint: "/reports/capex",
        description: "Get software capitalization report with employee contributions to capitalizable work",
        range: RangeRule::MonthAligned,
        params: &[MONTH_START, MONTH_END, TIMEZONE],
    },
    OperationSpec {
        operation: Operation::SoftwareCapitalizationEmployees,
        endpoint: "/reports/capex/employees",
        description: "Get list of employees with FTE effort breakdown for each month of the year",
        range: RangeRule::CalendarYear,
        params: &[
            ParamSpec {
                name: "year",
                required: true,
                kind: ParamKind::Integer {
                    min: MIN_YEAR,
                    max: MAX_YEAR,
                },
                description: "Year for the report (e.g., 2024)",
                default: None,
            },
            TIMEZONE,
        ],
    },
    OperationSpec {
        operation: Operation::EffortReporting,
        endpoint: "/reports/fte",
        description: "Get effort reporting showing authors and their FTE for each issue in a given month",
        range: RangeRule::SingleMonth,
        params: &[
            ParamSpec {
                name: "month",
                required: true,
                kind: ParamKind::Date,
                description: "Month in YYYY-MM-DD format (first day of the month)",
                default: None,
            },
            TIMEZONE,
            ParamSpec {
                name: "custom_field",
                required: false,
                kind: ParamKind::Text,
                description: "Jira field ID to be included as Custom field column",
                default: None,
            },
            ParamSpec {
                name: "group_by",
                required: false,
                kind: ParamKind::Enum(GroupBy::NAMES),
                description: "How FTE rows should be grouped",
                default: Some(GroupBy::HighestLevelIssue.as_str()),
            },
        ],
    },
];

impl Operation {
    /// The static descriptor for this operation.
    pub fn spec(&self) -> &'static OperationSpec {
        let index = Operation::ALL
            .iter()
            .position(|op| op == self)
            .unwrap_or_default();
        &OPERATION_SPECS[index]
    }
}

/// Looks up an operation descriptor by its tool name.
pub fn find_spec(tool_name: &str) -> Option<&'static OperationSpec> {
    Operation::from_tool_name(tool_name).map(|op| op.spec())
}
