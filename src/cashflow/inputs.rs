use crate::batch::{AgentMatrix, ModelError, PerAgent};
use serde::{Deserialize, Serialize};

/// Customer sector. Only the residential / non-residential distinction is
/// load-bearing: non-residential agents treat avoided electricity purchases
/// as forgone deductible expense and may deduct loan interest from state tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Res,
    Com,
    Ind,
}

impl Sector {
    #[inline(always)]
    pub fn is_residential(&self) -> bool {
        matches!(self, Sector::Res)
    }
}

/// Financial assumptions for one batch of agents.
///
/// `bill_savings` is the annual bill savings over the lifetime of the
/// system, per agent, in present-year dollars, with degradation and any
/// price/structure changes already applied by the caller. Every other
/// per-agent parameter is either a shared scalar or a series matching the
/// batch size inferred from `bill_savings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowInputs {
    /// Shape (n_agents, analysis_years + 1); column 0 is the investment year.
    pub bill_savings: AgentMatrix,

    // Technology sizes and unit prices.
    /// PV capacity, kW.
    pub pv_size: PerAgent<f64>,
    /// $/kW. Assumed to include the initial inverter purchase.
    pub pv_price: PerAgent<f64>,
    /// $/kW, charged once at the year-10 inverter replacement.
    pub inverter_price: PerAgent<f64>,
    /// $/kW-yr fixed PV O&M.
    pub pv_om: PerAgent<f64>,
    /// Battery energy capacity, kWh.
    pub batt_cap: PerAgent<f64>,
    /// Battery power capacity, kW.
    pub batt_power: PerAgent<f64>,
    /// $/kW.
    pub batt_power_price: PerAgent<f64>,
    /// $/kWh.
    pub batt_cap_price: PerAgent<f64>,
    /// Fraction of the battery's energy charged from co-hosted PV.
    /// Gates battery ITC eligibility.
    pub batt_chg_frac: PerAgent<f64>,
    /// Years (column indices) in which the battery is replaced.
    pub batt_replacement_sch: Vec<usize>,
    /// $/kWh-yr fixed battery O&M.
    pub batt_om: PerAgent<f64>,

    pub sector: PerAgent<Sector>,

    // Tax policy.
    /// Investment tax credit rate, fraction of eligible cost.
    pub itc: PerAgent<f64>,
    /// Depreciation schedule fractions applied to the depreciable basis
    /// starting in year 1.
    pub deprec_sched: PerAgent<Vec<f64>>,
    pub fed_tax_rate: PerAgent<f64>,
    pub state_tax_rate: PerAgent<f64>,

    // Financing.
    /// Real discount rate (excludes inflation).
    pub real_d: PerAgent<f64>,
    /// Fraction of the net installed cost financed by debt.
    pub debt_fraction: PerAgent<f64>,
    pub loan_rate: PerAgent<f64>,
    /// Loan term in years, shared across the batch.
    pub loan_term: usize,

    // Horizon.
    pub analysis_years: usize,
    pub inflation: f64,

    // Incentives, all defaulting to zero.
    #[serde(default)]
    pub cash_incentives: PerAgent<f64>,
    /// Up-front investment-based incentive. Excluded from taxable income.
    #[serde(default)]
    pub ibi: PerAgent<f64>,
    /// Up-front capacity-based incentive. Taxable in year 1.
    #[serde(default)]
    pub cbi: PerAgent<f64>,
    /// Annual production-based incentive. Taxable from year 1 on.
    #[serde(default)]
    pub pbi: PerAgent<f64>,
}

impl CashflowInputs {
    /// Resolves the per-agent depreciation schedules, enforcing a consistent
    /// column count across the batch.
    pub(crate) fn resolve_deprec_sched(&self, n_agents: usize) -> Result<Vec<Vec<f64>>, ModelError> {
        let rows = self.deprec_sched.resolve(n_agents, "deprec_sched")?;
        let width = rows[0].len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(ModelError::ShapeMismatch {
                    msg: format!(
                        "deprec_sched row {} has {} fractions, row 0 has {}",
                        i, row.len(), width
                    ),
                });
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_json_names() {
        let s: Vec<Sector> = serde_json::from_str(r#"["res", "com", "ind"]"#).unwrap();
        assert_eq!(s, vec![Sector::Res, Sector::Com, Sector::Ind]);
        assert!(Sector::Res.is_residential());
        assert!(!Sector::Com.is_residential());
    }

    #[test]
    fn test_ragged_deprec_sched_rejected() {
        let inputs = CashflowInputs {
            bill_savings: AgentMatrix::zeros(2, 3),
            pv_size: 0.0.into(),
            pv_price: 0.0.into(),
            inverter_price: 0.0.into(),
            pv_om: 0.0.into(),
            batt_cap: 0.0.into(),
            batt_power: 0.0.into(),
            batt_power_price: 0.0.into(),
            batt_cap_price: 0.0.into(),
            batt_chg_frac: 0.0.into(),
            batt_replacement_sch: vec![],
            batt_om: 0.0.into(),
            sector: PerAgent::Scalar(Sector::Com),
            itc: 0.0.into(),
            deprec_sched: PerAgent::Series(vec![vec![0.5, 0.5], vec![1.0]]),
            fed_tax_rate: 0.0.into(),
            state_tax_rate: 0.0.into(),
            real_d: 0.0.into(),
            debt_fraction: 0.0.into(),
            loan_rate: 0.0.into(),
            loan_term: 1,
            analysis_years: 2,
            inflation: 0.0,
            cash_incentives: PerAgent::default(),
            ibi: PerAgent::default(),
            cbi: PerAgent::default(),
            pbi: PerAgent::default(),
        };
        assert!(matches!(
            inputs.resolve_deprec_sched(2),
            Err(ModelError::ShapeMismatch { .. })
        ));
    }
}
