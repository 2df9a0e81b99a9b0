use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("invalid month {month} in record for year {year}")]
    InvalidMonth { year: u32, month: u32 },

    #[error("series is not contiguous: {year}-{month:02} follows {prev_year}-{prev_month:02}")]
    Gap {
        prev_year: u32,
        prev_month: u32,
        year: u32,
        month: u32,
    },

    #[error("series has no record for {year}-{month:02}")]
    MissingMonth { year: u32, month: u32 },

    #[error("series exhausted after {len} records")]
    Exhausted { len: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("portfolio has {portfolio} assets but {series} asset series were supplied")]
    AssetCountMismatch { portfolio: usize, series: usize },

    #[error("simulation duration must be at least one year")]
    ZeroDuration,

    #[error("simulation duration of {years} years is too long")]
    DurationTooLong { years: u32 },

    #[error("no {years}-year window fits between {start_year} and {end_year}")]
    NoWindows {
        years: u32,
        start_year: u32,
        end_year: u32,
    },

    #[error("no terminal values to aggregate")]
    EmptyTerminalValues,

    #[error(transparent)]
    Series(#[from] SeriesError),
}
