use crate::batch::{AgentMatrix, ModelError};
use crate::cashflow::inputs::CashflowInputs;
use crate::cashflow::results::CashflowResults;

/// A single inverter replacement is assumed at this year.
const INVERTER_REPLACEMENT_YEAR: usize = 10;

/// Battery replacement unit prices, independent of the original purchase
/// price ($/kW and $/kWh).
const BATT_POWER_PRICE_REPLACE: f64 = 200.0;
const BATT_CAP_PRICE_REPLACE: f64 = 200.0;

/// A battery charged mostly from non-solar sources is ITC-ineligible.
const BATT_ITC_MIN_CHG_FRAC: f64 = 0.75;

/// 7-year MACRS schedule applied to each battery replacement.
const MACRS_7_YR_SCH: [f64; 8] = [0.1429, 0.2449, 0.1749, 0.1249, 0.0893, 0.0892, 0.0893, 0.0446];

/// Builds the full annual after-tax cash-flow matrix for one batch of agents.
///
/// The stage order is semantically required, not stylistic: the ITC value
/// feeds the depreciable basis, the debt schedule feeds both tax ledgers,
/// and the state liability is itself a federal deduction.
pub fn cashflow_constructor(inputs: &CashflowInputs) -> Result<CashflowResults, ModelError> {
    // 1. Shape & rate setup
    // The batch size is inferred from the bill-savings input; every other
    // per-agent parameter must broadcast from a scalar or match it exactly.
    let n_agents = inputs.bill_savings.n_agents();
    let n_years = inputs.analysis_years + 1;
    if n_agents == 0 {
        return Err(ModelError::DegenerateInput { msg: "bill_savings has no agent rows".into() });
    }
    if inputs.bill_savings.n_years() != n_years {
        return Err(ModelError::ShapeMismatch {
            msg: format!(
                "bill_savings has {} columns, expected analysis_years + 1 = {}",
                inputs.bill_savings.n_years(),
                n_years
            ),
        });
    }

    let pv_size = inputs.pv_size.resolve(n_agents, "pv_size")?;
    let pv_price = inputs.pv_price.resolve(n_agents, "pv_price")?;
    let inverter_price = inputs.inverter_price.resolve(n_agents, "inverter_price")?;
    let pv_om = inputs.pv_om.resolve(n_agents, "pv_om")?;
    let batt_cap = inputs.batt_cap.resolve(n_agents, "batt_cap")?;
    let batt_power = inputs.batt_power.resolve(n_agents, "batt_power")?;
    let batt_power_price = inputs.batt_power_price.resolve(n_agents, "batt_power_price")?;
    let batt_cap_price = inputs.batt_cap_price.resolve(n_agents, "batt_cap_price")?;
    let batt_chg_frac = inputs.batt_chg_frac.resolve(n_agents, "batt_chg_frac")?;
    let batt_om = inputs.batt_om.resolve(n_agents, "batt_om")?;
    let sector = inputs.sector.resolve(n_agents, "sector")?;
    let itc = inputs.itc.resolve(n_agents, "itc")?;
    let deprec_sched = inputs.resolve_deprec_sched(n_agents)?;
    let fed_tax_rate = inputs.fed_tax_rate.resolve(n_agents, "fed_tax_rate")?;
    let state_tax_rate = inputs.state_tax_rate.resolve(n_agents, "state_tax_rate")?;
    let real_d = inputs.real_d.resolve(n_agents, "real_d")?;
    let debt_fraction = inputs.debt_fraction.resolve(n_agents, "debt_fraction")?;
    let loan_rate = inputs.loan_rate.resolve(n_agents, "loan_rate")?;
    let cash_incentives = inputs.cash_incentives.resolve(n_agents, "cash_incentives")?;
    let ibi = inputs.ibi.resolve(n_agents, "ibi")?;
    let cbi = inputs.cbi.resolve(n_agents, "cbi")?;
    let pbi = inputs.pbi.resolve(n_agents, "pbi")?;

    // State tax is deducted before federal, so the blended rate is less
    // than the simple sum.
    let effective_tax_rate: Vec<f64> = fed_tax_rate
        .iter()
        .zip(&state_tax_rate)
        .map(|(f, s)| f * (1.0 - s) + s)
        .collect();

    // Fisher relation: nominal rate from real rate and inflation.
    let nom_d: Vec<f64> = real_d
        .iter()
        .map(|r| (1.0 + r) * (1.0 + inputs.inflation) - 1.0)
        .collect();

    let inflation_adjustment: Vec<f64> = (0..n_years)
        .map(|k| (1.0 + inputs.inflation).powi(k as i32))
        .collect();

    let mut cf = AgentMatrix::zeros(n_agents, n_years);

    // 2. Bill savings
    // The input series is in present-year dollars and is adjusted for
    // inflation here. Non-residential agents lose part of the savings:
    // electricity they no longer buy would otherwise have been a
    // deductible operating expense.
    let mut bill_savings = inputs.bill_savings.clone();
    bill_savings.scale_columns(&inflation_adjustment);

    let savings_retention: Vec<f64> = sector
        .iter()
        .zip(&effective_tax_rate)
        .map(|(s, etr)| if s.is_residential() { 1.0 } else { 1.0 - etr })
        .collect();
    let mut after_tax_bill_savings = bill_savings.clone();
    after_tax_bill_savings.scale_rows(&savings_retention);

    cf.add_assign(&after_tax_bill_savings);

    // 3. Installed costs & up-front cash
    // Cash incentives, IBIs, and CBIs are monetized in year 0, reducing the
    // up-front cost that determines debt levels.
    let pv_cost: Vec<f64> = pv_size.iter().zip(&pv_price).map(|(s, p)| s * p).collect();
    let batt_cost: Vec<f64> = (0..n_agents)
        .map(|a| batt_power[a] * batt_power_price[a] + batt_cap[a] * batt_cap_price[a])
        .collect();
    let installed_cost: Vec<f64> = pv_cost.iter().zip(&batt_cost).map(|(p, b)| p + b).collect();
    let net_installed_cost: Vec<f64> = (0..n_agents)
        .map(|a| installed_cost[a] - cash_incentives[a] - ibi[a] - cbi[a])
        .collect();
    let up_front_cost: Vec<f64> = net_installed_cost
        .iter()
        .zip(&debt_fraction)
        .map(|(c, d)| c * (1.0 - d))
        .collect();
    for a in 0..n_agents {
        cf.sub_at(a, 0, up_front_cost[a]);
    }

    // 4. Replacements
    let mut inv_replacement_cf = AgentMatrix::zeros(n_agents, n_years);
    let mut batt_replacement_cf = AgentMatrix::zeros(n_agents, n_years);
    let mut deprec_deductions = AgentMatrix::zeros(n_agents, n_years);

    // A horizon shorter than the replacement year simply never reaches it.
    if INVERTER_REPLACEMENT_YEAR < n_years {
        for a in 0..n_agents {
            inv_replacement_cf.sub_at(a, INVERTER_REPLACEMENT_YEAR, pv_size[a] * inverter_price[a]);
        }
    }

    // Battery replacements are caller configuration and must land between
    // year 1 and the horizon; year 0 is the investment year and carries only
    // the up-front cost. Each replacement opens a fresh 7-year MACRS
    // schedule the year after it occurs; deduction years past the horizon
    // have no modeled tax effect and are discarded.
    for &yr in &inputs.batt_replacement_sch {
        if yr == 0 {
            return Err(ModelError::DegenerateInput {
                msg: "battery replacement scheduled in year 0, the investment year".into(),
            });
        }
        if yr >= n_years {
            return Err(ModelError::ScheduleOutOfRange { year: yr, horizon: inputs.analysis_years });
        }
        for a in 0..n_agents {
            batt_replacement_cf.sub_at(
                a,
                yr,
                batt_power[a] * BATT_POWER_PRICE_REPLACE + batt_cap[a] * BATT_CAP_PRICE_REPLACE,
            );
        }
        // No ITC or basis-reducing incentives for replacements; a later
        // replacement overwrites any overlapping tail of an earlier one.
        for (j, frac) in MACRS_7_YR_SCH.iter().enumerate() {
            let k = yr + 1 + j;
            if k >= n_years {
                break;
            }
            for a in 0..n_agents {
                deprec_deductions.set(a, k, batt_cost[a] * frac);
            }
        }
    }

    inv_replacement_cf.scale_columns(&inflation_adjustment);
    batt_replacement_cf.scale_columns(&inflation_adjustment);
    deprec_deductions.scale_columns(&inflation_adjustment);

    cf.add_assign(&inv_replacement_cf);
    cf.add_assign(&batt_replacement_cf);

    // 5. Operating expenses
    // Nominally O&M, fuel, insurance, and property tax; currently O&M only.
    let mut operating_expenses_cf = AgentMatrix::zeros(n_agents, n_years);
    for a in 0..n_agents {
        let annual_om = pv_om[a] * pv_size[a] + batt_om[a] * batt_cap[a];
        for k in 1..n_years {
            operating_expenses_cf.set(a, k, annual_om);
        }
    }
    operating_expenses_cf.scale_columns(&inflation_adjustment);
    cf.sub_assign(&operating_expenses_cf);

    // 6. Federal ITC
    // The battery credit requires majority charging from the co-hosted PV.
    let pv_itc_value: Vec<f64> = pv_cost.iter().zip(&itc).map(|(c, i)| c * i).collect();
    let batt_itc_value: Vec<f64> = (0..n_agents)
        .map(|a| {
            if batt_chg_frac[a] >= BATT_ITC_MIN_CHG_FRAC {
                batt_cost[a] * itc[a] * batt_chg_frac[a]
            } else {
                0.0
            }
        })
        .collect();
    let itc_value: Vec<f64> = pv_itc_value.iter().zip(&batt_itc_value).map(|(p, b)| p + b).collect();
    // The credit itself is applied to the cash flow in stage 10.

    // 7. Depreciation
    // Statutory basis reduction: the depreciable basis is the installed
    // cost less half the ITC value. The primary schedule starts in year 1
    // and overwrites any replacement deduction in the same column.
    let deprec_basis: Vec<f64> = installed_cost
        .iter()
        .zip(&itc_value)
        .map(|(c, v)| c - v * 0.5)
        .collect();
    for a in 0..n_agents {
        for (j, frac) in deprec_sched[a].iter().enumerate() {
            let k = j + 1;
            if k >= n_years {
                break;
            }
            deprec_deductions.set(a, k, deprec_basis[a] * frac);
        }
    }

    // 8. Debt cash flow
    // Level-payment amortization. Interest is deductible from state tax for
    // non-residential agents and from federal tax for everyone.
    let initial_debt: Vec<f64> = net_installed_cost
        .iter()
        .zip(&up_front_cost)
        .map(|(n, u)| n - u)
        .collect();
    let loan_term = inputs.loan_term;
    let annual_principal_and_interest_payment: Vec<f64> = (0..n_agents)
        .map(|a| {
            if loan_term == 0 {
                0.0
            } else if loan_rate[a] == 0.0 {
                // Zero-rate limit of the annuity formula.
                initial_debt[a] / loan_term as f64
            } else {
                let growth = (1.0 + loan_rate[a]).powi(loan_term as i32);
                initial_debt[a] * (loan_rate[a] * growth) / (growth - 1.0)
            }
        })
        .collect();

    let mut debt_balance = AgentMatrix::zeros(n_agents, n_years);
    let mut interest_payments = AgentMatrix::zeros(n_agents, n_years);
    let mut principal_and_interest_payments = AgentMatrix::zeros(n_agents, n_years);

    for a in 0..n_agents {
        let rate = loan_rate[a];
        let payment = annual_principal_and_interest_payment[a];
        for k in 0..loan_term.min(n_years) {
            let balance = if rate == 0.0 {
                initial_debt[a] - payment * k as f64
            } else {
                let growth = (1.0 + rate).powi(k as i32);
                initial_debt[a] * growth - payment * ((growth - 1.0) / rate)
            };
            debt_balance.set(a, k, balance);
        }
        for k in 1..n_years {
            interest_payments.set(a, k, debt_balance.get(a, k - 1) * rate);
        }
        for k in 1..n_years.min(loan_term + 1) {
            principal_and_interest_payments.set(a, k, payment);
        }
    }

    cf.sub_assign(&principal_and_interest_payments);

    // 9. State income tax
    // Taxable income is CBIs and PBIs, but not IBIs. CBI is taxed in year 1;
    // PBI accrues from year 1 on, keeping year 0 free of tax effects.
    // Assumes no state depreciation, and that DG revenue is not taxable.
    let mut total_taxable_income = AgentMatrix::zeros(n_agents, n_years);
    for a in 0..n_agents {
        if n_years > 1 {
            total_taxable_income.add_at(a, 1, cbi[a]);
        }
        for k in 1..n_years {
            total_taxable_income.add_at(a, k, pbi[a]);
        }
    }

    let mut state_deductions = AgentMatrix::zeros(n_agents, n_years);
    {
        let mut business_interest = interest_payments.clone();
        let non_res: Vec<f64> = sector
            .iter()
            .map(|s| if s.is_residential() { 0.0 } else { 1.0 })
            .collect();
        business_interest.scale_rows(&non_res);
        state_deductions.add_assign(&business_interest);
    }
    state_deductions.add_assign(&operating_expenses_cf);

    let mut total_taxable_state_income_less_deductions = total_taxable_income.clone();
    total_taxable_state_income_less_deductions.sub_assign(&state_deductions);
    let mut state_income_taxes = total_taxable_state_income_less_deductions.clone();
    state_income_taxes.scale_rows(&state_tax_rate);

    // A negative liability is a net benefit and flows into cash as savings.
    cf.sub_assign(&state_income_taxes);

    // 10. Federal income tax
    // All deductions are federal; the state liability itself deducts. The
    // ITC is a credit, not a deduction, and lands directly in year-1 cash.
    let mut fed_deductions = interest_payments.clone();
    fed_deductions.add_assign(&deprec_deductions);
    fed_deductions.add_assign(&state_income_taxes);
    fed_deductions.add_assign(&operating_expenses_cf);

    let mut total_taxable_fed_income_less_deductions = total_taxable_income.clone();
    total_taxable_fed_income_less_deductions.sub_assign(&fed_deductions);
    let mut fed_income_taxes = total_taxable_fed_income_less_deductions.clone();
    fed_income_taxes.scale_rows(&fed_tax_rate);

    cf.sub_assign(&fed_income_taxes);
    if n_years > 1 {
        for a in 0..n_agents {
            cf.add_at(a, 1, itc_value[a]);
        }
    }

    // 11. Post-processing
    let mut cf_discounted = cf.clone();
    for a in 0..n_agents {
        let mut factor = 1.0;
        for k in 0..n_years {
            if k > 0 {
                factor /= 1.0 + nom_d[a];
            }
            cf_discounted.set(a, k, cf_discounted.get(a, k) * factor);
        }
    }
    let npv = cf_discounted.total();

    Ok(CashflowResults {
        cf,
        cf_discounted,
        npv,
        bill_savings,
        after_tax_bill_savings,
        pv_cost,
        batt_cost,
        installed_cost,
        up_front_cost,
        inv_replacement: inv_replacement_cf,
        batt_replacement: batt_replacement_cf,
        operating_expenses: operating_expenses_cf,
        pv_itc_value,
        batt_itc_value,
        itc_value,
        deprec_basis,
        deprec_deductions,
        initial_debt,
        annual_principal_and_interest_payment,
        debt_balance,
        interest_payments,
        principal_and_interest_payments,
        total_taxable_income,
        state_deductions,
        total_taxable_state_income_less_deductions,
        state_income_taxes,
        fed_deductions,
        total_taxable_fed_income_less_deductions,
        fed_income_taxes,
    })
}
