// ============================================================
// ML Layer — Weight Initialisation
// ============================================================
// Resets a layer's parameters according to its kind:
//
//   Linear     weight ~ N(0, 1), bias = 0
//   Embedding  weight ~ N(0, 1), padding row = 0
//   LayerNorm  gamma = 1, beta = 0
//   other      untouched
//
// Normal samples are drawn on the host from the seeded tensor
// generator in `infra::seed`, so `set_seed` makes a fresh init
// reproducible regardless of backend.
//
// Burn's nn::Linear / nn::Embedding / nn::LayerNorm are handled
// through `init_linear` / `init_embedding` / `init_layer_norm`.
// They go through `Layer` and write the new tensors back into
// the existing parameters, so each keeps its ParamId and any
// optimizer state recorded against it.

use burn::{
    module::Param,
    nn::{Embedding, LayerNorm, Linear},
    prelude::*,
};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{Result, UtilError};
use crate::infra::seed::with_tensor_rng;

/// The parameters of one layer, tagged by layer kind.
#[derive(Debug, Clone)]
pub enum Layer<B: Backend> {
    Linear {
        weight: Tensor<B, 2>,
        bias:   Option<Tensor<B, 1>>,
    },
    Embedding {
        weight:      Tensor<B, 2>,
        padding_idx: Option<usize>,
    },
    LayerNorm {
        gamma: Tensor<B, 1>,
        beta:  Option<Tensor<B, 1>>,
    },
    /// Any layer kind without an initialisation rule
    Other,
}

impl<B: Backend> Layer<B> {
    pub fn from_linear(linear: &Linear<B>) -> Self {
        Layer::Linear {
            weight: linear.weight.val(),
            bias:   linear.bias.as_ref().map(Param::val),
        }
    }

    /// Burn's embedding has no notion of a padding row, so it is passed in.
    pub fn from_embedding(embedding: &Embedding<B>, padding_idx: Option<usize>) -> Self {
        Layer::Embedding {
            weight: embedding.weight.val(),
            padding_idx,
        }
    }

    pub fn from_layer_norm(norm: &LayerNorm<B>) -> Self {
        Layer::LayerNorm {
            gamma: norm.gamma.val(),
            beta:  norm.beta.as_ref().map(Param::val),
        }
    }
}

/// Re-initialise `layer` according to its kind.
pub fn init_weights<B: Backend>(layer: Layer<B>) -> Result<Layer<B>> {
    match layer {
        Layer::Linear { weight, bias } => Ok(Layer::Linear {
            weight: standard_normal_like(&weight, None)?,
            bias:   bias.map(|b| b.zeros_like()),
        }),
        Layer::Embedding { weight, padding_idx } => Ok(Layer::Embedding {
            weight: standard_normal_like(&weight, padding_idx)?,
            padding_idx,
        }),
        Layer::LayerNorm { gamma, beta } => Ok(Layer::LayerNorm {
            gamma: gamma.ones_like(),
            beta:  beta.map(|b| b.zeros_like()),
        }),
        Layer::Other => Ok(Layer::Other),
    }
}

/// Re-initialise a burn `Linear` in place of the old one.
pub fn init_linear<B: Backend>(mut linear: Linear<B>) -> Result<Linear<B>> {
    if let Layer::Linear { weight, bias } = init_weights(Layer::from_linear(&linear))? {
        linear.weight = replace_value(linear.weight, weight);
        linear.bias = replace_optional(linear.bias, bias);
    }
    Ok(linear)
}

/// Re-initialise a burn `Embedding`, zeroing `padding_idx` if given.
pub fn init_embedding<B: Backend>(
    mut embedding: Embedding<B>,
    padding_idx:   Option<usize>,
) -> Result<Embedding<B>> {
    if let Layer::Embedding { weight, .. } =
        init_weights(Layer::from_embedding(&embedding, padding_idx))?
    {
        embedding.weight = replace_value(embedding.weight, weight);
    }
    Ok(embedding)
}

/// Reset a burn `LayerNorm` to gamma = 1 and, if it has one, beta = 0.
pub fn init_layer_norm<B: Backend>(mut norm: LayerNorm<B>) -> Result<LayerNorm<B>> {
    if let Layer::LayerNorm { gamma, beta } = init_weights(Layer::from_layer_norm(&norm))? {
        norm.gamma = replace_value(norm.gamma, gamma);
        norm.beta = replace_optional(norm.beta, beta);
    }
    Ok(norm)
}

/// Swap the tensor held by `param`, keeping its id and gradient flag.
fn replace_value<B: Backend, const D: usize>(
    param: Param<Tensor<B, D>>,
    value: Tensor<B, D>,
) -> Param<Tensor<B, D>> {
    param.map(|old| value.set_require_grad(old.is_require_grad()))
}

fn replace_optional<B: Backend, const D: usize>(
    param: Option<Param<Tensor<B, D>>>,
    value: Option<Tensor<B, D>>,
) -> Option<Param<Tensor<B, D>>> {
    match (param, value) {
        (Some(param), Some(value)) => Some(replace_value(param, value)),
        (param, _) => param,
    }
}

/// A tensor shaped like `like`, filled from N(0, 1), with `zero_row`
/// (if any) set to zero.
fn standard_normal_like<B: Backend>(like: &Tensor<B, 2>, zero_row: Option<usize>) -> Result<Tensor<B, 2>> {
    let [rows, cols] = like.dims();
    if let Some(index) = zero_row {
        if index >= rows {
            return Err(UtilError::PaddingIndex { index, rows });
        }
    }

    let mut values: Vec<f32> = with_tensor_rng(|rng| {
        (0..rows * cols).map(|_| rng.sample(StandardNormal)).collect()
    });
    if let Some(index) = zero_row {
        values[index * cols..(index + 1) * cols].fill(0.0);
    }

    Ok(Tensor::<B, 1>::from_floats(values.as_slice(), &like.device()).reshape([rows, cols]))
}
