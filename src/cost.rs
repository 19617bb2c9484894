use std::str::FromStr;

use ndarray::Zip;
use serde::{Deserialize, Serialize};

use crate::err::NetError;
use crate::util::{DataVec, Float};

/// Per-output error measure of the network.
///
/// Only the quadratic variant defines a derivative, so only quadratic
/// networks can be trained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cost {
    Quadratic,
    Exponential,
}

impl Default for Cost {
    fn default() -> Self {
        Cost::Quadratic
    }
}

impl Cost {
    /// Element-wise error magnitude between actual and expected output.
    pub fn calc(&self, actual: &DataVec, expected: &DataVec) -> Result<DataVec, NetError> {
        if actual.len() != expected.len() {
            return Err(NetError::SizeMismatch {
                expected: expected.len(),
                got: actual.len(),
            });
        }

        match self {
            Cost::Quadratic => {
                Ok(Zip::from(actual)
                    .and(expected)
                    .map_collect(|a, e| (a - e) * (a - e)))
            }
            Cost::Exponential => {
                Ok(Zip::from(actual)
                    .and(expected)
                    .map_collect(|a, e| (a.exp() - e.exp()) * (a.exp() - e.exp())))
            }
        }
    }

    /// Error derivative with respect to one actual output value.
    pub fn derivative(&self, actual: Float, expected: Float) -> Result<Float, NetError> {
        match self {
            Cost::Quadratic => Ok(2.0 * (actual - expected)),
            Cost::Exponential => Err(NetError::NotImplemented("exponential cost derivative")),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cost::Quadratic => "quadratic",
            Cost::Exponential => "exponential",
        }
    }
}

impl FromStr for Cost {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quadratic" => Ok(Cost::Quadratic),
            "exponential" => Ok(Cost::Exponential),
            other => Err(NetError::InvalidCfg(format!("unknown cost : {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn quadratic_calc_is_squared_difference() {
        let actual: DataVec = array![0.5, 0.0, 1.0];
        let expected: DataVec = array![1.0, 0.0, 0.0];

        let err = Cost::Quadratic.calc(&actual, &expected).unwrap();

        assert!((err[0] - 0.25).abs() < 1e-12);
        assert!((err[1] - 0.0).abs() < 1e-12);
        assert!((err[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn quadratic_calc_is_zero_at_equality() {
        let v: DataVec = array![0.3, 0.7];
        let err = Cost::Quadratic.calc(&v, &v).unwrap();
        assert_eq!(err.sum(), 0.0);
    }

    #[test]
    fn exponential_calc_matches_formula() {
        let actual: DataVec = array![1.0];
        let expected: DataVec = array![0.0];

        let err = Cost::Exponential.calc(&actual, &expected).unwrap();
        let want = (1.0f64.exp() - 1.0) * (1.0f64.exp() - 1.0);

        assert!((err[0] - want).abs() < 1e-12);
    }

    #[test]
    fn quadratic_derivative() {
        let d = Cost::Quadratic.derivative(0.75, 1.0).unwrap();
        assert!((d - -0.5).abs() < 1e-12);
    }

    #[test]
    fn exponential_derivative_is_not_implemented() {
        let res = Cost::Exponential.derivative(0.5, 1.0);
        assert!(matches!(res, Err(NetError::NotImplemented(_))));
    }

    #[test]
    fn calc_rejects_length_mismatch() {
        let actual: DataVec = array![0.5, 0.5];
        let expected: DataVec = array![1.0];

        let res = Cost::Quadratic.calc(&actual, &expected);
        assert!(matches!(res, Err(NetError::SizeMismatch { .. })));
    }

    #[test]
    fn parse_cost_names() {
        assert_eq!(Cost::from_str("quadratic").unwrap(), Cost::Quadratic);
        assert_eq!(Cost::from_str("exponential").unwrap(), Cost::Exponential);
        assert!(Cost::from_str("hinge").is_err());
    }
}
