use crate::batch::{AgentMatrix, ModelError};

/// Net present value of each row of `cfs`, discounted at that row's rate.
///
/// Column 0 is undiscounted; column `k` is discounted by the running
/// product of `1 / (1 + dr)` factors. This is the only component that
/// accepts a distinct discount rate per agent.
pub fn calc_npv(cfs: &AgentMatrix, dr: &[f64]) -> Result<Vec<f64>, ModelError> {
    if dr.len() != cfs.n_agents() {
        return Err(ModelError::ShapeMismatch {
            msg: format!(
                "discount rate vector has {} entries, matrix has {} agents",
                dr.len(),
                cfs.n_agents()
            ),
        });
    }

    let npv = cfs
        .rows()
        .zip(dr)
        .map(|(row, rate)| {
            let mut factor = 1.0;
            let mut acc = 0.0;
            for (k, v) in row.iter().enumerate() {
                if k > 0 {
                    factor /= 1.0 + rate;
                }
                acc += factor * v;
            }
            acc
        })
        .collect();
    Ok(npv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_returns_undiscounted_sum() {
        let cfs = AgentMatrix::from_rows(vec![vec![-100.0, 60.0, 60.0], vec![5.0, -2.0, 1.0]]).unwrap();
        let npv = calc_npv(&cfs, &[0.0, 0.0]).unwrap();
        assert_eq!(npv, vec![20.0, 4.0]);
    }

    #[test]
    fn test_per_agent_rates_are_independent() {
        let cfs = AgentMatrix::from_rows(vec![vec![-100.0, 110.0], vec![-100.0, 110.0]]).unwrap();
        let npv = calc_npv(&cfs, &[0.10, 0.05]).unwrap();
        assert!((npv[0] - 0.0).abs() < 1e-12);
        assert!((npv[1] - (110.0 / 1.05 - 100.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rate_vector_length_must_match() {
        let cfs = AgentMatrix::from_rows(vec![vec![1.0, 2.0]]).unwrap();
        assert!(matches!(
            calc_npv(&cfs, &[0.1, 0.2]),
            Err(ModelError::ShapeMismatch { .. })
        ));
    }
}
