use crate::batch::{AgentMatrix, ModelError};

/// Sentinel for a series that never breaks even within its lifetime.
pub const NO_PAYBACK_YEARS: f64 = 30.0;

/// Interpolated payback period of each row, in years, rounded to 0.1.
///
/// `tech_lifetime` is the analysis horizon in years and must agree with the
/// matrix width (`tech_lifetime + 1` columns, year 0 included).
///
/// Per row: if the cumulative cash flow ends non-positive the series never
/// pays back (sentinel 30); if it is positive in every year, payback is
/// instant (0); otherwise the payback year is the *last* non-positive to
/// positive crossing of the cumulative series, plus a linear fraction of
/// the breakeven year. A series that dips negative again after an early
/// break-even has not paid back at the earlier point.
pub fn calc_payback(cfs: &AgentMatrix, tech_lifetime: usize) -> Result<Vec<f64>, ModelError> {
    if tech_lifetime + 1 != cfs.n_years() {
        return Err(ModelError::ShapeMismatch {
            msg: format!(
                "matrix has {} columns, expected tech_lifetime + 1 = {}",
                cfs.n_years(),
                tech_lifetime + 1
            ),
        });
    }

    let pp = cfs
        .rows()
        .map(|row| {
            let mut cum = Vec::with_capacity(row.len());
            let mut acc = 0.0;
            for v in row {
                acc += v;
                cum.push(acc);
            }
            round_tenth(payback_of_cumulative(&cum))
        })
        .collect();
    Ok(pp)
}

fn payback_of_cumulative(cum: &[f64]) -> f64 {
    let last = match cum.last() {
        Some(v) => *v,
        None => return NO_PAYBACK_YEARS,
    };
    if last <= 0.0 {
        return NO_PAYBACK_YEARS;
    }
    if cum.iter().all(|v| *v > 0.0) {
        return 0.0;
    }

    // Latest year whose sign steps up across the boundary (-1 -> 0 counts:
    // the series touches breakeven exactly at the following year).
    let mut base_year = None;
    for i in 0..cum.len() - 1 {
        if sign(cum[i + 1]) > sign(cum[i]) {
            base_year = Some(i);
        }
    }
    match base_year {
        Some(i) => {
            let frac = cum[i] / (cum[i] - cum[i + 1]);
            i as f64 + frac
        }
        None => NO_PAYBACK_YEARS,
    }
}

#[inline(always)]
fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

// Ties go to the even tenth, not away from zero.
fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round_ties_even() / 10.0
}
