mod counter;
mod engine;
mod error;
mod results;
mod series;
mod types;

pub use counter::RunCounter;
pub use engine::{START_VALUE, simulate};
pub use error::{SeriesError, SimulationError};
pub use results::{MEDIAN_INDEX_OFFSET, Results, TerminalStats, compute_terminal_values};
pub use series::{DataSeries, SeriesCursor};
pub use types::{Allocation, MonthlyRecord, RebalanceFees, Rebalancing, SimulationParams};
