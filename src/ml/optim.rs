// ============================================================
// ML Layer — Learning-rate Introspection
// ============================================================
// Reads the learning rate of the first parameter group from
// either a typed optimizer state or its plain mapping form:
//
//   {"param_groups": [{"lr": 0.01, "betas": [0.9, 0.999]}, ...]}
//
// The plain form is what a saved optimizer state looks like
// once it is loaded back as JSON.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, UtilError};

/// One set of parameters sharing hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGroup {
    pub lr: f64,

    /// Every other hyperparameter of the group, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ParamGroup {
    pub fn new(lr: f64) -> Self {
        Self { lr, extra: Map::new() }
    }
}

/// The serialisable state of an optimizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizerState {
    pub param_groups: Vec<ParamGroup>,
}

impl OptimizerState {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Anything that exposes an ordered list of parameter groups.
pub trait ParamGroups {
    fn group_count(&self) -> Result<usize>;

    /// Learning rate of group `index`; callers check `group_count` first.
    fn group_lr(&self, index: usize) -> Result<f64>;
}

impl ParamGroups for OptimizerState {
    fn group_count(&self) -> Result<usize> {
        Ok(self.param_groups.len())
    }

    fn group_lr(&self, index: usize) -> Result<f64> {
        self.param_groups
            .get(index)
            .map(|g| g.lr)
            .ok_or(UtilError::MissingLearningRate { index })
    }
}

impl ParamGroups for Value {
    fn group_count(&self) -> Result<usize> {
        groups(self).map(<[Value]>::len)
    }

    fn group_lr(&self, index: usize) -> Result<f64> {
        groups(self)?
            .get(index)
            .and_then(|g| g.get("lr"))
            .and_then(Value::as_f64)
            .ok_or(UtilError::MissingLearningRate { index })
    }
}

fn groups(value: &Value) -> Result<&[Value]> {
    value
        .get("param_groups")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or(UtilError::MissingParamGroups)
}

/// Learning rate of the first parameter group.
pub fn get_lr<O: ParamGroups + ?Sized>(optimizer: &O) -> Result<f64> {
    if optimizer.group_count()? == 0 {
        return Err(UtilError::EmptyParamGroups);
    }
    optimizer.group_lr(0)
}
