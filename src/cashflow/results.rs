use crate::batch::AgentMatrix;
use serde::{Deserialize, Serialize};

/// Everything the constructor computes, packaged for downstream inspection.
///
/// `cf` is the headline after-tax cash-flow matrix; `npv` is the scalar sum
/// of `cf_discounted` across agents and years. Callers needing per-agent
/// NPVs should apply `metrics::calc_npv` to `cf` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowResults {
    pub cf: AgentMatrix,
    pub cf_discounted: AgentMatrix,
    pub npv: f64,

    pub bill_savings: AgentMatrix,
    pub after_tax_bill_savings: AgentMatrix,

    pub pv_cost: Vec<f64>,
    pub batt_cost: Vec<f64>,
    pub installed_cost: Vec<f64>,
    pub up_front_cost: Vec<f64>,

    pub inv_replacement: AgentMatrix,
    pub batt_replacement: AgentMatrix,
    pub operating_expenses: AgentMatrix,

    pub pv_itc_value: Vec<f64>,
    pub batt_itc_value: Vec<f64>,
    pub itc_value: Vec<f64>,
    pub deprec_basis: Vec<f64>,
    pub deprec_deductions: AgentMatrix,

    pub initial_debt: Vec<f64>,
    pub annual_principal_and_interest_payment: Vec<f64>,
    pub debt_balance: AgentMatrix,
    pub interest_payments: AgentMatrix,
    pub principal_and_interest_payments: AgentMatrix,

    pub total_taxable_income: AgentMatrix,
    pub state_deductions: AgentMatrix,
    pub total_taxable_state_income_less_deductions: AgentMatrix,
    pub state_income_taxes: AgentMatrix,
    pub fed_deductions: AgentMatrix,
    pub total_taxable_fed_income_less_deductions: AgentMatrix,
    pub fed_income_taxes: AgentMatrix,
}

impl CashflowResults {
    /// Looks up an annual matrix by its published name.
    pub fn matrix_by_name(&self, name: &str) -> Option<&AgentMatrix> {
        match name {
            "cf" => Some(&self.cf),
            "cf_discounted" => Some(&self.cf_discounted),
            "bill_savings" => Some(&self.bill_savings),
            "after_tax_bill_savings" => Some(&self.after_tax_bill_savings),
            "inv_replacement" => Some(&self.inv_replacement),
            "batt_replacement" => Some(&self.batt_replacement),
            "operating_expenses" => Some(&self.operating_expenses),
            "deprec_deductions" => Some(&self.deprec_deductions),
            "debt_balance" => Some(&self.debt_balance),
            "interest_payments" => Some(&self.interest_payments),
            "principal_and_interest_payments" => Some(&self.principal_and_interest_payments),
            "total_taxable_income" => Some(&self.total_taxable_income),
            "state_deductions" => Some(&self.state_deductions),
            "total_taxable_state_income_less_deductions" => {
                Some(&self.total_taxable_state_income_less_deductions)
            }
            "state_income_taxes" => Some(&self.state_income_taxes),
            "fed_deductions" => Some(&self.fed_deductions),
            "total_taxable_fed_income_less_deductions" => {
                Some(&self.total_taxable_fed_income_less_deductions)
            }
            "fed_income_taxes" => Some(&self.fed_income_taxes),
            _ => None,
        }
    }

    /// Looks up a per-agent vector by its published name.
    pub fn vector_by_name(&self, name: &str) -> Option<&[f64]> {
        match name {
            "pv_cost" => Some(&self.pv_cost),
            "batt_cost" => Some(&self.batt_cost),
            "installed_cost" => Some(&self.installed_cost),
            "up_front_cost" => Some(&self.up_front_cost),
            "pv_itc_value" => Some(&self.pv_itc_value),
            "batt_itc_value" => Some(&self.batt_itc_value),
            "itc_value" => Some(&self.itc_value),
            "deprec_basis" => Some(&self.deprec_basis),
            "initial_debt" => Some(&self.initial_debt),
            "annual_principal_and_interest_payment" => {
                Some(&self.annual_principal_and_interest_payment)
            }
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
