use crate::cashflow::CashflowResults;
use std::fmt::Write;

/// Formats one agent's annual cash-flow line items as a plain-text audit
/// table, with the up-front accounting and summary metrics around it.
pub fn format_trace(results: &CashflowResults, agent: usize) -> String {
    let mut output = String::new();

    if agent >= results.cf.n_agents() {
        let _ = writeln!(output, "Error: Invalid agent index {}", agent);
        return output;
    }

    let _ = writeln!(output, "CASH FLOW TRACE for agent {}:", agent);
    let _ = writeln!(output, "--------------------------------------------------");
    let _ = writeln!(output, "Installed cost:  {:>14.2}", results.installed_cost[agent]);
    let _ = writeln!(output, "Up-front cost:   {:>14.2}", results.up_front_cost[agent]);
    let _ = writeln!(output, "Initial debt:    {:>14.2}", results.initial_debt[agent]);
    let _ = writeln!(output, "ITC value:       {:>14.2}", results.itc_value[agent]);
    let _ = writeln!(output, "Deprec. basis:   {:>14.2}", results.deprec_basis[agent]);
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "{:>4} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "year", "savings", "replace", "opex", "debt_svc", "state_tax", "fed_tax", "net_cf"
    );

    for k in 0..results.cf.n_years() {
        let replace =
            results.inv_replacement.get(agent, k) + results.batt_replacement.get(agent, k);
        let _ = writeln!(
            output,
            "{:>4} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
            k,
            results.after_tax_bill_savings.get(agent, k),
            replace,
            -results.operating_expenses.get(agent, k),
            -results.principal_and_interest_payments.get(agent, k),
            -results.state_income_taxes.get(agent, k),
            -results.fed_income_taxes.get(agent, k),
            results.cf.get(agent, k),
        );
    }

    let _ = writeln!(output, "--------------------------------------------------");
    let _ = writeln!(
        output,
        "Discounted sum:  {:>14.2}",
        results.cf_discounted.row(agent).iter().sum::<f64>()
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::AgentMatrix;
    use crate::cashflow::{cashflow_constructor, CashflowInputs, Sector};
    use crate::batch::PerAgent;

    fn sample_results() -> CashflowResults {
        let inputs = CashflowInputs {
            bill_savings: AgentMatrix::from_series(vec![0.0, 100.0, 100.0]),
            pv_size: 1.0.into(),
            pv_price: 500.0.into(),
            inverter_price: 0.0.into(),
            pv_om: 5.0.into(),
            batt_cap: 0.0.into(),
            batt_power: 0.0.into(),
            batt_power_price: 0.0.into(),
            batt_cap_price: 0.0.into(),
            batt_chg_frac: 1.0.into(),
            batt_replacement_sch: vec![],
            batt_om: 0.0.into(),
            sector: PerAgent::Scalar(Sector::Res),
            itc: 0.3.into(),
            deprec_sched: PerAgent::Scalar(vec![1.0]),
            fed_tax_rate: 0.2.into(),
            state_tax_rate: 0.0.into(),
            real_d: 0.05.into(),
            debt_fraction: 0.0.into(),
            loan_rate: 0.0.into(),
            loan_term: 0,
            analysis_years: 2,
            inflation: 0.0,
            cash_incentives: PerAgent::default(),
            ibi: PerAgent::default(),
            cbi: PerAgent::default(),
            pbi: PerAgent::default(),
        };
        cashflow_constructor(&inputs).unwrap()
    }

    #[test]
    fn test_trace_contains_header_and_every_year() {
        let trace = format_trace(&sample_results(), 0);
        assert!(trace.contains("CASH FLOW TRACE for agent 0:"));
        assert!(trace.contains("Installed cost:"));
        for k in 0..=2 {
            assert!(trace.lines().any(|l| l.trim_start().starts_with(&k.to_string())));
        }
    }

    #[test]
    fn test_trace_rejects_bad_agent_index() {
        let trace = format_trace(&sample_results(), 7);
        assert!(trace.contains("Invalid agent index 7"));
    }
}
