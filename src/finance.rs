//! Economic formulas for baseload delivery: cost, break-even price and VWAP.
//!
//! All per-MWh results divide by the contracted baseload energy of the year,
//! which callers must ensure is positive.

/// Rounds `value` to the given number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Volume-weighted average price over `(energy, price)` pairs, rounded to 4 decimals.
///
/// Only pairs with positive, finite energy and a finite price take part.
/// Returns 0.0 when no pair qualifies.
pub fn vwap(pairs: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let (weighted, volume) = pairs
        .into_iter()
        .filter(|(energy, price)| *energy > 0.0 && energy.is_finite() && price.is_finite())
        .fold((0.0, 0.0), |(weighted, volume), (energy, price)| {
            (weighted + energy * price, volume + energy)
        });

    if volume > 0.0 {
        round_to(weighted / volume, 4)
    } else {
        0.0
    }
}

/// Energy paid for at pay-as-produced prices plus fixed storage payments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionCost {
    /// Wind energy paid for (MWh).
    pub wind_mwh: f64,
    /// Wind pay-as-produced price (EUR/MWh).
    pub wind_price: f64,
    /// Solar energy paid for (MWh).
    pub solar_mwh: f64,
    /// Solar pay-as-produced price (EUR/MWh).
    pub solar_price: f64,
    /// Sum of yearly storage payments (EUR).
    pub storage_payments: f64,
}

impl ProductionCost {
    /// Total cost in EUR.
    pub fn total(&self) -> f64 {
        self.wind_mwh * self.wind_price + self.solar_mwh * self.solar_price + self.storage_payments
    }
}

/// Cost per delivered baseload MWh.
///
/// `cost` should carry only the energy that went into the baseload.
pub fn baseload_delivered_cost(
    cost: &ProductionCost,
    missing_mwh: f64,
    missing_price: f64,
    baseload_energy_mwh: f64,
) -> f64 {
    (cost.total() + missing_mwh * missing_price) / baseload_energy_mwh
}

/// Revenue from exported excess energy (EUR).
pub fn excess_revenue(
    excess_wind_mwh: f64,
    wind_excess_price: f64,
    excess_solar_mwh: f64,
    solar_excess_price: f64,
) -> f64 {
    excess_wind_mwh * wind_excess_price + excess_solar_mwh * solar_excess_price
}

/// Baseload price at which yearly revenue covers yearly cost.
///
/// `cost` should carry total production, not just the baseload share.
pub fn break_even_price(
    cost: &ProductionCost,
    excess_revenue: f64,
    missing_mwh: f64,
    missing_price: f64,
    baseload_energy_mwh: f64,
) -> f64 {
    (cost.total() - excess_revenue + missing_mwh * missing_price) / baseload_energy_mwh
}

/// Excess energy as a percentage of total production, rounded to 2 decimals.
///
/// Returns 0.0 when nothing was produced.
pub fn overproduction_share(excess_mwh: f64, total_wind_mwh: f64, total_solar_mwh: f64) -> f64 {
    let produced = total_wind_mwh + total_solar_mwh;
    if produced > 0.0 {
        round_to(excess_mwh / produced * 100.0, 2)
    } else {
        0.0
    }
}
