use std::fmt;
use std::str::FromStr;

/// The six export queries this server knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    PullRequestMetrics,
    DoraMetrics,
    InvestmentBalance,
    SoftwareCapitalizationReport,
    SoftwareCapitalizationEmployees,
    EffortReporting,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::PullRequestMetrics,
        Operation::DoraMetrics,
        Operation::InvestmentBalance,
        Operation::SoftwareCapitalizationReport,
        Operation::SoftwareCapitalizationEmployees,
        Operation::EffortReporting,
    ];

    /// The tool name a caller uses to invoke this operation.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Operation::PullRequestMetrics => "get_pull_request_metrics",
            Operation::DoraMetrics => "get_dora_metrics",
            Operation::InvestmentBalance => "get_investment_balance",
            Operation::SoftwareCapitalizationReport => "get_software_capitalization_report",
            Operation::SoftwareCapitalizationEmployees => "get_software_capitalization_employees",
            Operation::EffortReporting => "get_effort_reporting",
        }
    }

    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.tool_name() == name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tool_name())
    }
}

/// A named, relative date range ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Last7Days,
    Last14Days,
    Last30Days,
    Last60Days,
    Last90Days,
    Last180Days,
    Last365Days,
}

impl Timeframe {
    /// Accepted wire names, shortest span first.
    pub const NAMES: &'static [&'static str] = &[
        "last_7_days",
        "last_14_days",
        "last_30_days",
        "last_60_days",
        "last_90_days",
        "last_180_days",
        "last_365_days",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Last7Days => "last_7_days",
            Timeframe::Last14Days => "last_14_days",
            Timeframe::Last30Days => "last_30_days",
            Timeframe::Last60Days => "last_60_days",
            Timeframe::Last90Days => "last_90_days",
            Timeframe::Last180Days => "last_180_days",
            Timeframe::Last365Days => "last_365_days",
        }
    }

    /// Number of calendar days covered, today included.
    pub fn days(&self) -> u32 {
        match self {
            Timeframe::Last7Days => 7,
            Timeframe::Last14Days => 14,
            Timeframe::Last30Days => 30,
            Timeframe::Last60Days => 60,
            Timeframe::Last90Days => 90,
            Timeframe::Last180Days => 180,
            Timeframe::Last365Days => 365,
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last_7_days" => Ok(Timeframe::Last7Days),
            "last_14_days" => Ok(Timeframe::Last14Days),
            "last_30_days" => Ok(Timeframe::Last30Days),
            "last_60_days" => Ok(Timeframe::Last60Days),
            "last_90_days" => Ok(Timeframe::Last90Days),
            "last_180_days" => Ok(Timeframe::Last180Days),
            "last_365_days" => Ok(Timeframe::Last365Days),
            other => Err(format!("unknown timeframe '{}'", other)),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How effort-reporting rows are grouped by the export API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    HighestLevelIssue,
    LowestLevelIssue,
    CustomField,
}

impl GroupBy {
    pub const NAMES: &'static [&'static str] =
        &["highestLevelIssue", "lowestLevelIssue", "customField"];

    pub const fn as_str(&self) -> &'static str {
        match self {
            GroupBy::HighestLevelIssue => "highestLevelIssue",
            GroupBy::LowestLevelIssue => "lowestLevelIssue",
            GroupBy::CustomField => "customField",
        }
    }
}
