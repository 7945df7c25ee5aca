use crate::batch::ModelError;
use serde::{Deserialize, Serialize};

/// A dense row-major matrix of per-agent annual values.
///
/// Rows are agents, columns are calendar years. The backing storage is a
/// single flat `Vec<f64>` so that row access is one contiguous slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMatrix {
    data: Vec<f64>,
    n_agents: usize,
    n_years: usize,
}

impl AgentMatrix {
    pub fn zeros(n_agents: usize, n_years: usize) -> Self {
        Self { data: vec![0.0; n_agents * n_years], n_agents, n_years }
    }

    /// Builds a matrix from explicit rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ModelError> {
        let n_agents = rows.len();
        if n_agents == 0 {
            return Err(ModelError::ShapeMismatch { msg: "matrix has no rows".into() });
        }
        let n_years = rows[0].len();
        let mut data = Vec::with_capacity(n_agents * n_years);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_years {
                return Err(ModelError::ShapeMismatch {
                    msg: format!("row {} has {} columns, row 0 has {}", i, row.len(), n_years),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { data, n_agents, n_years })
    }

    /// Promotes a single series to a batch of one.
    pub fn from_series(series: Vec<f64>) -> Self {
        let n_years = series.len();
        Self { data: series, n_agents: 1, n_years }
    }

    pub fn n_agents(&self) -> usize { self.n_agents }
    pub fn n_years(&self) -> usize { self.n_years }

    #[inline(always)]
    fn idx(&self, agent: usize, year: usize) -> usize {
        agent * self.n_years + year
    }

    #[inline(always)]
    pub fn get(&self, agent: usize, year: usize) -> f64 {
        self.data[self.idx(agent, year)]
    }

    #[inline(always)]
    pub fn set(&mut self, agent: usize, year: usize, value: f64) {
        let i = self.idx(agent, year);
        self.data[i] = value;
    }

    #[inline(always)]
    pub fn add_at(&mut self, agent: usize, year: usize, value: f64) {
        let i = self.idx(agent, year);
        self.data[i] += value;
    }

    #[inline(always)]
    pub fn sub_at(&mut self, agent: usize, year: usize, value: f64) {
        let i = self.idx(agent, year);
        self.data[i] -= value;
    }

    pub fn row(&self, agent: usize) -> &[f64] {
        let start = agent * self.n_years;
        &self.data[start..start + self.n_years]
    }

    pub fn rows(&self) -> std::slice::ChunksExact<'_, f64> {
        self.data.chunks_exact(self.n_years)
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    /// Multiplies each column `k` by `factors[k]`. This is the year-indexed
    /// broadcast (e.g. the inflation-adjustment vector).
    pub fn scale_columns(&mut self, factors: &[f64]) {
        assert_eq!(factors.len(), self.n_years, "BUG: column factors must match year count");
        for row in self.data.chunks_exact_mut(self.n_years) {
            for (v, f) in row.iter_mut().zip(factors) {
                *v *= f;
            }
        }
    }

    /// Multiplies each row `a` by `factors[a]`. This is the per-agent
    /// broadcast (the `reshape(n_agents, 1)` idiom, defined once).
    pub fn scale_rows(&mut self, factors: &[f64]) {
        assert_eq!(factors.len(), self.n_agents, "BUG: row factors must match agent count");
        for (row, f) in self.data.chunks_exact_mut(self.n_years).zip(factors) {
            for v in row.iter_mut() {
                *v *= f;
            }
        }
    }

    pub fn add_assign(&mut self, other: &AgentMatrix) {
        assert_eq!(self.shape(), other.shape(), "BUG: matrix shapes must match");
        for (v, o) in self.data.iter_mut().zip(&other.data) {
            *v += o;
        }
    }

    pub fn sub_assign(&mut self, other: &AgentMatrix) {
        assert_eq!(self.shape(), other.shape(), "BUG: matrix shapes must match");
        for (v, o) in self.data.iter_mut().zip(&other.data) {
            *v -= o;
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_agents, self.n_years)
    }

    /// Sum over all agents and years.
    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let result = AgentMatrix::from_rows(vec![vec![1.0, 2.0], vec![1.0]]);
        match result.unwrap_err() {
            ModelError::ShapeMismatch { msg } => assert!(msg.contains("row 1")),
            other => panic!("wrong error: {:?}", other),
        }
    }

    #[test]
    fn test_from_series_is_batch_of_one() {
        let m = AgentMatrix::from_series(vec![1.0, 2.0, 3.0]);
        assert_eq!(m.shape(), (1, 3));
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_scale_columns_and_rows() {
        let mut m = AgentMatrix::from_rows(vec![vec![1.0, 1.0, 1.0], vec![2.0, 2.0, 2.0]]).unwrap();
        m.scale_columns(&[1.0, 10.0, 100.0]);
        assert_eq!(m.row(0), &[1.0, 10.0, 100.0]);
        m.scale_rows(&[1.0, 0.5]);
        assert_eq!(m.row(1), &[1.0, 10.0, 100.0]);
    }

    #[test]
    fn test_add_sub_and_total() {
        let mut a = AgentMatrix::zeros(2, 2);
        a.add_at(0, 1, 5.0);
        let mut b = a.clone();
        b.add_assign(&a);
        assert_eq!(b.get(0, 1), 10.0);
        b.sub_assign(&a);
        assert_eq!(b, a);
        assert_eq!(b.total(), 5.0);
    }
}
