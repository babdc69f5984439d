// src/math.rs
//
// Financial math used by the valuation methods. Pure functions over f64,
// no I/O. Undefined results are reported as NaN sentinels rather than
// errors; callers are expected to check before using them in arithmetic.

/// Compound annual growth rate: `(end/begin)^(1/periods) - 1`.
///
/// Returns NaN when `begin` or `periods` is zero — there is no meaningful
/// growth rate in either case and silently returning 0 would hide bad input.
pub fn cagr(beginning_value: f64, ending_value: f64, periods: f64) -> f64 {
    if beginning_value == 0.0 || periods == 0.0 {
        return f64::NAN;
    }
    (ending_value / beginning_value).powf(1.0 / periods) - 1.0
}

/// Arithmetic average of year-over-year growth rates.
///
/// Each step is `(v[i] - v[i-1]) / |v[i-1]|` so a recovery from a negative
/// value still counts as growth. Returns NaN for series shorter than two
/// points; callers must guard.
pub fn aagr(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let periods = (values.len() - 1) as f64;
    let mut total = 0.0;
    for i in 1..values.len() {
        total += (values[i] - values[i - 1]) / values[i - 1].abs();
    }
    total / periods
}

/// Weighted average cost of capital.
///
/// Returns zero when both debt and equity are zero, which callers treat as
/// "undetermined, fall back to CAPM". Degenerates to the single remaining
/// rate when one side of the capital structure is empty.
pub fn wacc(debt: f64, debt_rate: f64, equity: f64, equity_rate: f64, corporate_tax: f64) -> f64 {
    let v = debt + equity;
    if v == 0.0 {
        return 0.0;
    }
    if debt == 0.0 {
        return equity_rate;
    }
    if equity == 0.0 {
        return debt_rate;
    }
    (equity / v * equity_rate) + (debt / v * debt_rate * (1.0 - corporate_tax))
}

/// Capital asset pricing model: cost of equity from the risk-free rate,
/// beta and the expected market return.
pub fn capm(risk_free_rate: f64, beta: f64, market_return: f64) -> f64 {
    risk_free_rate + beta * (market_return - risk_free_rate)
}

/// Discounted cash flow over a series of periodic cash flows.
///
/// Convention: the first element is discounted one full period, i.e. cash
/// flow `t` (zero-based) is divided by `(1+rate)^(t+1)` — period 0 is the
/// end of year one, not "now".
pub fn dcf(cash_flows: &[f64], rate: f64) -> f64 {
    let mut sum = 0.0;
    for (period, fcf) in cash_flows.iter().enumerate() {
        sum += present_value(*fcf, rate, period as i32 + 1);
    }
    sum
}

/// Gordon-growth terminal value: `last_fcf * (1+g) / (rate - g)`.
///
/// Returns NaN whenever `growth_rate >= rate` (inclusive) — the perpetuity
/// is undefined and must not be silently zeroed.
pub fn terminal_value(last_fcf: f64, rate: f64, growth_rate: f64) -> f64 {
    if growth_rate >= rate {
        return f64::NAN;
    }
    (last_fcf * (1.0 + growth_rate)) / (rate - growth_rate)
}

/// Present value of a future amount discounted over whole periods.
pub fn present_value(future_value: f64, rate: f64, periods: i32) -> f64 {
    future_value / (1.0 + rate).powi(periods)
}

/// Converts a coefficient to a percentage with two-digit precision,
/// e.g. `0.12345 -> 12.35`.
pub fn to_percent(coefficient: f64) -> f64 {
    (coefficient * 10000.0).round() / 100.0
}
