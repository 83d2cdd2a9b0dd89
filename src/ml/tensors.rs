// ============================================================
// ML Layer — Tensor Leaves in Nested Containers
// ============================================================
// Batches, metrics and model outputs travel as nested maps and
// lists whose leaves are a mix of tensors and plain values:
//
//   {"loss": Tensor[1], "preds": [Tensor[8, 2], 0.93], "step": 10}
//
// Two transforms are built on the generic leaf mapper:
//
//   iter_to_host    — every tensor → detached host array
//   iter_to_device  — every tensor → moved to a target device
//
// Non-tensor leaves pass through both unchanged.
//
// Burn tensors carry their rank as a const generic, so a
// mixed-rank leaf is stored as one of four ranked variants.

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::nested::{map_leaves, try_map_leaves, Nested};
use crate::error::{Result, UtilError};

// ─── DynTensor ────────────────────────────────────────────────────────────────
/// A float tensor of rank 1 to 4.
#[derive(Debug, Clone)]
pub enum DynTensor<B: Backend> {
    D1(Tensor<B, 1>),
    D2(Tensor<B, 2>),
    D3(Tensor<B, 3>),
    D4(Tensor<B, 4>),
}

/// Evaluate `$body` with `$t` bound to the ranked tensor inside.
macro_rules! with_rank {
    ($value:expr, $t:ident => $body:expr) => {
        match $value {
            DynTensor::D1($t) => $body,
            DynTensor::D2($t) => $body,
            DynTensor::D3($t) => $body,
            DynTensor::D4($t) => $body,
        }
    };
}

/// Like `with_rank!`, rewrapping the result in the same variant.
macro_rules! map_rank {
    ($value:expr, $t:ident => $body:expr) => {
        match $value {
            DynTensor::D1($t) => DynTensor::D1($body),
            DynTensor::D2($t) => DynTensor::D2($body),
            DynTensor::D3($t) => DynTensor::D3($body),
            DynTensor::D4($t) => DynTensor::D4($body),
        }
    };
}

macro_rules! impl_from_ranked {
    ($($d:literal => $variant:ident),*) => {
        $(
            impl<B: Backend> From<Tensor<B, $d>> for DynTensor<B> {
                fn from(t: Tensor<B, $d>) -> Self {
                    DynTensor::$variant(t)
                }
            }

            impl<B: Backend> From<Tensor<B, $d>> for Item<B> {
                fn from(t: Tensor<B, $d>) -> Self {
                    Item::Tensor(DynTensor::$variant(t))
                }
            }
        )*
    };
}

impl_from_ranked!(1 => D1, 2 => D2, 3 => D3, 4 => D4);

impl<B: Backend> DynTensor<B> {
    pub fn dims(&self) -> Vec<usize> {
        with_rank!(self, t => t.dims().to_vec())
    }

    pub fn device(&self) -> B::Device {
        with_rank!(self, t => t.device())
    }

    pub fn to_device(self, device: &B::Device) -> Self {
        map_rank!(self, t => t.to_device(device))
    }

    /// Detach from autodiff and copy the values into host memory.
    pub fn into_host(self) -> Result<HostArray> {
        with_rank!(self, t => ranked_to_host(t))
    }
}

fn ranked_to_host<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<HostArray> {
    let shape = tensor.dims().to_vec();
    let values = tensor
        .detach()
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| UtilError::TensorData(format!("{e:?}")))?;
    Ok(HostArray { shape, values })
}

// ─── HostArray ────────────────────────────────────────────────────────────────
/// A dense row-major `f32` array living in host memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostArray {
    pub shape:  Vec<usize>,
    pub values: Vec<f32>,
}

impl HostArray {
    pub fn new(shape: Vec<usize>, values: Vec<f32>) -> Self {
        Self { shape, values }
    }
}

// ─── Item ─────────────────────────────────────────────────────────────────────
/// A leaf of a nested batch/output structure.
#[derive(Debug, Clone)]
pub enum Item<B: Backend> {
    Tensor(DynTensor<B>),
    Array(HostArray),
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
}

impl<B: Backend> Item<B> {
    pub fn is_tensor(&self) -> bool {
        matches!(self, Item::Tensor(_))
    }

    pub fn as_array(&self) -> Option<&HostArray> {
        match self {
            Item::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl<B: Backend> From<HostArray> for Item<B> {
    fn from(a: HostArray) -> Self {
        Item::Array(a)
    }
}

impl<B: Backend> From<f64> for Item<B> {
    fn from(v: f64) -> Self {
        Item::Float(v)
    }
}

impl<B: Backend> From<i64> for Item<B> {
    fn from(v: i64) -> Self {
        Item::Int(v)
    }
}

impl<B: Backend> From<bool> for Item<B> {
    fn from(v: bool) -> Self {
        Item::Bool(v)
    }
}

impl<B: Backend> From<&str> for Item<B> {
    fn from(v: &str) -> Self {
        Item::Text(v.to_string())
    }
}

// ─── Transforms ───────────────────────────────────────────────────────────────
/// Replace every tensor leaf with its detached host-memory array.
pub fn iter_to_host<B: Backend>(value: Nested<Item<B>>) -> Result<Nested<Item<B>>> {
    try_map_leaves(value, |item| match item {
        Item::Tensor(t) => t.into_host().map(Item::Array),
        other => Ok(other),
    })
}

/// Move every tensor leaf to `device`.
pub fn iter_to_device<B: Backend>(value: Nested<Item<B>>, device: &B::Device) -> Nested<Item<B>> {
    map_leaves(value, |item| match item {
        Item::Tensor(t) => Item::Tensor(t.to_device(device)),
        other => other,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use std::collections::BTreeMap;

    type TestBackend = NdArray;

    fn leaf<B: Backend>(item: impl Into<Item<B>>) -> Nested<Item<B>> {
        Nested::Leaf(item.into())
    }

    fn expect_array<B: Backend>(n: &Nested<Item<B>>) -> &HostArray {
        n.as_leaf()
            .and_then(Item::as_array)
            .unwrap_or_else(|| panic!("expected a host array, got {n:?}"))
    }

    #[test]
    fn test_tensors_become_host_arrays() {
        let device = Default::default();
        let input: Nested<Item<TestBackend>> = Nested::Map(BTreeMap::from([
            (
                "a".to_string(),
                leaf(Tensor::<TestBackend, 1>::from_floats([1.0f32, 2.0, 3.0], &device)),
            ),
            (
                "b".to_string(),
                Nested::Seq(vec![
                    leaf(Tensor::<TestBackend, 1>::from_floats([4.0f32], &device)),
                    leaf(5i64),
                ]),
            ),
        ]));

        let out = iter_to_host(input).unwrap();
        let Nested::Map(m) = &out else {
            panic!("root changed kind");
        };

        assert_eq!(expect_array(&m["a"]), &HostArray::new(vec![3], vec![1.0, 2.0, 3.0]));

        let Nested::Seq(b) = &m["b"] else {
            panic!("'b' changed kind");
        };
        assert_eq!(b.len(), 2);
        assert_eq!(expect_array(&b[0]), &HostArray::new(vec![1], vec![4.0]));
        assert!(matches!(b[1].as_leaf(), Some(Item::Int(5))));
    }

    #[test]
    fn test_host_array_keeps_shape() {
        let device = Default::default();
        let t = Tensor::<TestBackend, 2>::from_floats([[1.0f32, 2.0], [3.0, 4.0], [5.0, 6.0]], &device);
        let out = iter_to_host(leaf(t)).unwrap();
        assert_eq!(
            expect_array(&out),
            &HostArray::new(vec![3, 2], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        );
    }

    #[test]
    fn test_autodiff_tensors_are_detached() {
        type AdBackend = Autodiff<NdArray>;
        let device = Default::default();
        let t = Tensor::<AdBackend, 1>::from_floats([0.5f32, -0.5], &device).require_grad();
        let out = iter_to_host(Nested::Seq(vec![leaf(t), leaf("tag")])).unwrap();

        let Nested::Seq(items) = out else {
            panic!("root changed kind");
        };
        assert_eq!(expect_array(&items[0]).values, vec![0.5, -0.5]);
        assert!(matches!(items[1].as_leaf(), Some(Item::Text(s)) if s == "tag"));
    }

    #[test]
    fn test_non_tensor_leaves_untouched_by_device_move() {
        let device = Default::default();
        let input: Nested<Item<TestBackend>> = Nested::Seq(vec![
            leaf(Tensor::<TestBackend, 3>::zeros([2, 1, 3], &device)),
            leaf(0.25f64),
            leaf(true),
        ]);

        let out = iter_to_device(input, &device);
        let Nested::Seq(items) = out else {
            panic!("root changed kind");
        };

        match items[0].as_leaf() {
            Some(Item::Tensor(t)) => {
                assert_eq!(t.dims(), vec![2, 1, 3]);
                assert_eq!(t.device(), device);
            }
            other => panic!("expected a tensor, got {other:?}"),
        }
        assert!(matches!(items[1].as_leaf(), Some(Item::Float(v)) if *v == 0.25));
        assert!(matches!(items[2].as_leaf(), Some(Item::Bool(true))));
    }
}
