use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub name: String,
    pub allocation: f64,
}

impl Allocation {
    pub fn new(name: impl Into<String>, allocation: f64) -> Self {
        Self {
            name: name.into(),
            allocation,
        }
    }

    pub fn fraction(&self) -> f64 {
        self.allocation / 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub year: u32,
    pub month: u32,
    pub value: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Rebalancing {
    None,
    Monthly,
    Yearly,
    Threshold,
}

impl Rebalancing {
    // Unknown text resolves to Threshold; `str::parse` is the strict form.
    pub fn parse(text: &str) -> Self {
        match text {
            "none" => Rebalancing::None,
            "monthly" => Rebalancing::Monthly,
            "yearly" => Rebalancing::Yearly,
            _ => Rebalancing::Threshold,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rebalancing::None => "none",
            Rebalancing::Monthly => "monthly",
            Rebalancing::Yearly => "yearly",
            Rebalancing::Threshold => "threshold",
        }
    }
}

impl FromStr for Rebalancing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "monthly" | "yearly" | "threshold" => Ok(Rebalancing::parse(s)),
            other => Err(format!(
                "unknown rebalancing '{other}', expected none, monthly, yearly or threshold"
            )),
        }
    }
}

impl fmt::Display for Rebalancing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebalanceFees {
    pub monthly: f64,
    pub yearly: f64,
    pub threshold: f64,
}

impl RebalanceFees {
    pub const STANDARD: RebalanceFees = RebalanceFees {
        monthly: 0.005,
        yearly: 0.01,
        threshold: 0.01,
    };
}

/// Scalar inputs of one engine invocation.
///
/// `withdrawal_rate` is an annual percentage (4.0 = 4%), but `threshold` is a
/// raw fraction compared against allocation fractions: 0.05 means five
/// percentage points of drift, not 0.05%.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub years: u32,
    pub withdrawal_rate: f64,
    pub start_year: u32,
    pub end_year: u32,
    pub monthly_withdrawal: bool,
    pub rebalance: Rebalancing,
    pub threshold: f64,
}

impl SimulationParams {
    pub fn last_start_year(&self) -> Option<u32> {
        self.end_year
            .checked_sub(self.years)
            .filter(|last| *last >= self.start_year)
    }

    pub fn window_count(&self) -> usize {
        self.last_start_year()
            .map(|last| (last - self.start_year + 1) as usize * 12)
            .unwrap_or(0)
    }
}
