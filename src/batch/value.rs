use crate::batch::ModelError;
use serde::{Deserialize, Serialize};

/// A per-agent input parameter: either one value shared by the whole batch,
/// or an explicit series with one entry per agent.
///
/// A series whose length disagrees with the batch size is a configuration
/// error, never a silent broadcast. Only a true scalar broadcasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerAgent<T> {
    Scalar(T),
    Series(Vec<T>),
}

impl<T: Clone> PerAgent<T> {
    /// Materializes one value per agent, validating series lengths.
    pub fn resolve(&self, n_agents: usize, name: &str) -> Result<Vec<T>, ModelError> {
        match self {
            PerAgent::Scalar(v) => Ok(vec![v.clone(); n_agents]),
            PerAgent::Series(vs) if vs.len() == n_agents => Ok(vs.clone()),
            PerAgent::Series(vs) => Err(ModelError::ShapeMismatch {
                msg: format!("'{}' has {} entries, batch has {} agents", name, vs.len(), n_agents),
            }),
        }
    }
}

impl<T: Default> Default for PerAgent<T> {
    fn default() -> Self {
        PerAgent::Scalar(T::default())
    }
}

impl<T> From<Vec<T>> for PerAgent<T> {
    fn from(vs: Vec<T>) -> Self {
        PerAgent::Series(vs)
    }
}

impl From<f64> for PerAgent<f64> {
    fn from(v: f64) -> Self {
        PerAgent::Scalar(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_broadcasts() {
        let p = PerAgent::Scalar(0.3);
        assert_eq!(p.resolve(3, "itc").unwrap(), vec![0.3, 0.3, 0.3]);
    }

    #[test]
    fn test_series_must_match_batch_size() {
        let p = PerAgent::Series(vec![0.1, 0.2]);
        assert_eq!(p.resolve(2, "rate").unwrap(), vec![0.1, 0.2]);
        let err = p.resolve(3, "rate").unwrap_err();
        match err {
            ModelError::ShapeMismatch { msg } => {
                assert!(msg.contains("'rate'"));
                assert!(msg.contains("3 agents"));
            }
            other => panic!("wrong error: {:?}", other),
        }
    }

    #[test]
    fn test_untagged_json_forms() {
        let scalar: PerAgent<f64> = serde_json::from_str("0.35").unwrap();
        assert_eq!(scalar, PerAgent::Scalar(0.35));
        let series: PerAgent<f64> = serde_json::from_str("[0.35, 0.0]").unwrap();
        assert_eq!(series, PerAgent::Series(vec![0.35, 0.0]));
    }
}
