use super::counter::RunCounter;
use super::error::SimulationError;
use super::results::Results;
use super::series::{DataSeries, SeriesCursor};
use super::types::{Allocation, RebalanceFees, Rebalancing, SimulationParams};

pub const START_VALUE: f64 = 1000.0;

struct Market<'a> {
    portfolio: &'a [Allocation],
    inflation: &'a DataSeries,
    assets: &'a [DataSeries],
}

pub fn simulate(
    portfolio: &[Allocation],
    inflation: &DataSeries,
    assets: &[DataSeries],
    params: &SimulationParams,
    counter: &RunCounter,
) -> Result<Results, SimulationError> {
    simulate_with_fees(
        portfolio,
        inflation,
        assets,
        params,
        &RebalanceFees::STANDARD,
        counter,
    )
}

pub(crate) fn simulate_with_fees(
    portfolio: &[Allocation],
    inflation: &DataSeries,
    assets: &[DataSeries],
    params: &SimulationParams,
    fees: &RebalanceFees,
    counter: &RunCounter,
) -> Result<Results, SimulationError> {
    if assets.len() != portfolio.len() {
        return Err(SimulationError::AssetCountMismatch {
            portfolio: portfolio.len(),
            series: assets.len(),
        });
    }
    if params.years == 0 {
        return Err(SimulationError::ZeroDuration);
    }
    let months = params
        .years
        .checked_mul(12)
        .ok_or(SimulationError::DurationTooLong { years: params.years })?;
    let last_start_year = params.last_start_year().ok_or(SimulationError::NoWindows {
        years: params.years,
        start_year: params.start_year,
        end_year: params.end_year,
    })?;

    // The last window starts in December and ends in November.
    let last_end_year = last_start_year + params.years;
    for series in assets.iter().chain(std::iter::once(inflation)) {
        series.position(params.start_year, 1)?;
        series.position(last_end_year, 11)?;
    }

    let market = Market {
        portfolio,
        inflation,
        assets,
    };
    let mut results = Results::default();
    let mut terminal_values = Vec::new();

    for current_year in params.start_year..=last_start_year {
        for current_month in 1..=12 {
            let terminal_value =
                simulate_window(&market, params, fees, months, current_year, current_month)?;
            results.record(terminal_value);
            terminal_values.push(terminal_value);
        }
    }

    results.finish(&mut terminal_values)?;
    counter.add(terminal_values.len());

    log::debug!(
        "simulated {} windows of {} years at {}% ({} rebalancing): {:.2}% success",
        terminal_values.len(),
        params.years,
        params.withdrawal_rate,
        params.rebalance,
        results.success_rate
    );

    Ok(results)
}

fn simulate_window(
    market: &Market<'_>,
    params: &SimulationParams,
    fees: &RebalanceFees,
    months: u32,
    start_year: u32,
    start_month: u32,
) -> Result<f64, SimulationError> {
    // last_offset / 12 <= years, so end_year never passes params.end_year.
    let last_offset = u64::from(start_month - 1) + u64::from(months - 1);
    let end_year = start_year + (last_offset / 12) as u32;
    let end_month = 1 + (last_offset % 12) as u32;

    let mut withdrawal = START_VALUE * params.withdrawal_rate / 100.0;
    let mut values = market
        .portfolio
        .iter()
        .map(|asset| START_VALUE * asset.fraction())
        .collect::<Vec<_>>();

    let mut returns = market
        .assets
        .iter()
        .map(|series| series.cursor(start_year, start_month))
        .collect::<Result<Vec<SeriesCursor<'_>>, _>>()?;
    let mut inflation = market.inflation.cursor(start_year, start_month)?;

    for year in start_year..=end_year {
        let first_month = if year == start_year { start_month } else { 1 };
        let last_month = if year == end_year { end_month } else { 12 };

        for _ in first_month..=last_month {
            for (value, cursor) in values.iter_mut().zip(returns.iter_mut()) {
                *value *= cursor.next_value()?;
            }

            match params.rebalance {
                Rebalancing::Monthly => rebalance(&mut values, market.portfolio, fees.monthly),
                Rebalancing::Threshold
                    if exceeds_threshold(&values, market.portfolio, params.threshold) =>
                {
                    rebalance(&mut values, market.portfolio, fees.threshold)
                }
                _ => {}
            }

            // Inflation compounds monthly whatever the withdrawal cadence.
            withdrawal *= inflation.next_value()?;

            if params.monthly_withdrawal {
                withdraw(&mut values, withdrawal / 12.0);
            }
        }

        if params.rebalance == Rebalancing::Yearly {
            rebalance(&mut values, market.portfolio, fees.yearly);
        }
        if !params.monthly_withdrawal {
            withdraw(&mut values, withdrawal);
        }
    }

    Ok(values.iter().sum())
}

fn rebalance(values: &mut [f64], portfolio: &[Allocation], fee_percent: f64) {
    for value in values.iter_mut() {
        *value *= 1.0 - fee_percent / 100.0;
    }

    let total = values.iter().sum::<f64>();
    for (value, asset) in values.iter_mut().zip(portfolio) {
        *value = total * asset.fraction();
    }
}

fn exceeds_threshold(values: &[f64], portfolio: &[Allocation], threshold: f64) -> bool {
    let total = values.iter().sum::<f64>();
    if total <= 0.0 {
        return false;
    }

    values
        .iter()
        .zip(portfolio)
        .any(|(value, asset)| (asset.fraction() - value / total).abs() >= threshold)
}

fn withdraw(values: &mut [f64], amount: f64) {
    let total = values.iter().sum::<f64>();
    // Nothing left to take from.
    if total <= 0.0 {
        return;
    }

    for value in values.iter_mut() {
        *value = (*value - (*value / total) * amount).max(0.0);
    }
}
