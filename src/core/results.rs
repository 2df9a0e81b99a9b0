use serde::Serialize;

use super::error::SimulationError;

/// Offset from `n / 2` at which the median is read out of the sorted terminal
/// values. Zero selects the conventional upper-middle element.
pub const MEDIAN_INDEX_OFFSET: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalStats {
    pub median: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub average: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    pub successes: usize,
    pub failures: usize,
    pub success_rate: f64,
    pub tv_median: f64,
    pub tv_minimum: f64,
    pub tv_maximum: f64,
    pub tv_average: f64,
}

impl Results {
    /// A window succeeds when anything is left at the end.
    pub fn record(&mut self, terminal_value: f64) {
        if terminal_value > 0.0 {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
    }

    pub fn windows(&self) -> usize {
        self.successes + self.failures
    }

    pub fn finish(&mut self, terminal_values: &mut [f64]) -> Result<(), SimulationError> {
        let stats = compute_terminal_values(terminal_values)?;
        self.success_rate = 100.0 * self.successes as f64 / self.windows() as f64;
        self.tv_median = stats.median;
        self.tv_minimum = stats.minimum;
        self.tv_maximum = stats.maximum;
        self.tv_average = stats.average;
        Ok(())
    }
}

/// Sorts `terminal_values` in place and summarizes them.
///
/// The median is read at `n / 2 + MEDIAN_INDEX_OFFSET`, clamped to the last
/// element for lists too short to hold that index.
pub fn compute_terminal_values(
    terminal_values: &mut [f64],
) -> Result<TerminalStats, SimulationError> {
    if terminal_values.is_empty() {
        return Err(SimulationError::EmptyTerminalValues);
    }

    terminal_values.sort_by(|a, b| a.total_cmp(b));

    let n = terminal_values.len();
    let median_index = (n / 2 + MEDIAN_INDEX_OFFSET).min(n - 1);

    Ok(TerminalStats {
        median: terminal_values[median_index],
        minimum: terminal_values[0],
        maximum: terminal_values[n - 1],
        average: terminal_values.iter().sum::<f64>() / n as f64,
    })
}
