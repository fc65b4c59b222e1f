//! Utilities.
use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarMap;
use log::trace;
use qtrade_core::{error::QtradeError, Encoder};
use serde::{Deserialize, Serialize};

/// Critic loss type.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub enum CriticLoss {
    /// Mean squared error.
    #[default]
    Mse,

    /// Smooth L1 loss.
    SmoothL1,
}

/// Copies the variables of `src` into `dest`.
///
/// Variables are identified by their names. Every variable of `dest` is overwritten,
/// so both maps must have been built from the same model configuration.
pub fn copy_vars(dest: &VarMap, src: &VarMap) -> Result<()> {
    trace!("dest");
    let dest = dest
        .data()
        .lock()
        .map_err(|_| anyhow!("variables of the destination are poisoned"))?;
    trace!("src");
    let src = src
        .data()
        .lock()
        .map_err(|_| anyhow!("variables of the source are poisoned"))?;

    for (k, v_dest) in dest.iter() {
        let v_src = src
            .get(k)
            .ok_or_else(|| anyhow!("variable {} is not found in the source", k))?;
        v_dest.set(v_src.as_tensor())?;
    }

    Ok(())
}

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> usize;

    /// Sets the  output dimension.
    fn set_out_dim(&mut self, v: usize);
}

/// See <https://pytorch.org/docs/stable/generated/torch.nn.SmoothL1Loss.html>.
pub fn smooth_l1_loss(x: &Tensor, y: &Tensor) -> Result<Tensor, candle_core::Error> {
    let d = x.sub(y)?.abs()?;
    let m1 = d.lt(1.0)?.to_dtype(DType::F32)?;
    let m2 = m1.affine(-1.0, 1.0)?;
    let quadratic = m1.mul(&d.sqr()?.affine(0.5, 0.0)?)?;
    let linear = m2.mul(&d.affine(1.0, -0.5)?)?;
    quadratic.add(&linear)?.mean_all()
}

/// Encodes a batch of observations into a tensor of shape `[batch, encoder.dim()]`.
///
/// Missing observations are encoded as zero vectors.
/// Fails with [`QtradeError::Configuration`] if the encoder has no feature.
pub fn encode_batch<'a, O, C, I>(encoder: &C, batch: I, device: &Device) -> Result<Tensor>
where
    O: 'a,
    C: Encoder<O>,
    I: IntoIterator<Item = Option<&'a O>>,
{
    let buf = encoder.encode_batch(batch);
    let dim = encoder.dim();
    if dim == 0 {
        return Err(
            QtradeError::Configuration("the encoder width must be positive".into()).into(),
        );
    }
    let n = buf.len() / dim;
    Ok(Tensor::from_vec(buf, (n, dim), device)?)
}

/// Returns the index of the maximum value, the first one among ties.
pub fn argmax_first(values: &[f32]) -> usize {
    let mut ix = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[ix] {
            ix = i;
        }
    }
    ix
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_nn::Init;

    #[test]
    fn test_copy_vars() -> Result<()> {
        let t_src = Tensor::from_slice(&[1.0f32, 2.0, 3.0], (3,), &Device::Cpu)?;

        let vm_src = VarMap::new();
        vm_src
            .get((3,), "var1", Init::Const(0.0), DType::F32, &Device::Cpu)?;
        vm_src.data().lock().unwrap().get("var1").unwrap().set(&t_src)?;

        let vm_dest = VarMap::new();
        vm_dest
            .get((3,), "var1", Init::Const(4.0), DType::F32, &Device::Cpu)?;

        copy_vars(&vm_dest, &vm_src)?;

        let t = vm_dest
            .data()
            .lock()
            .unwrap()
            .get("var1")
            .unwrap()
            .as_tensor()
            .to_vec1::<f32>()?;
        assert_eq!(t, vec![1.0, 2.0, 3.0]);

        // the source is left untouched by later updates of the destination
        vm_dest.data().lock().unwrap().get("var1").unwrap().set(
            &Tensor::zeros((3,), DType::F32, &Device::Cpu)?,
        )?;
        let t = vm_src.data().lock().unwrap()["var1"].as_tensor().to_vec1::<f32>()?;
        assert_eq!(t, vec![1.0, 2.0, 3.0]);

        Ok(())
    }

    #[test]
    fn test_copy_vars_missing() -> Result<()> {
        let vm_src = VarMap::new();
        let vm_dest = VarMap::new();
        vm_dest.get((1,), "w", Init::Const(0.0), DType::F32, &Device::Cpu)?;
        assert!(copy_vars(&vm_dest, &vm_src).is_err());
        Ok(())
    }

    #[test]
    fn test_smooth_l1_loss() -> Result<()> {
        let x = Tensor::new(&[0f32, 3.0], &Device::Cpu)?;
        let y = Tensor::new(&[0.5f32, 0.0], &Device::Cpu)?;
        // (0.5 * 0.5^2 + (3 - 0.5)) / 2
        let loss = smooth_l1_loss(&x, &y)?.to_scalar::<f32>()?;
        assert!((loss - 1.3125).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_argmax_first() {
        assert_eq!(argmax_first(&[1.0, 3.0, 2.0]), 1);
        assert_eq!(argmax_first(&[2.0, 5.0, 5.0]), 1);
        assert_eq!(argmax_first(&[0.0, 0.0, 0.0]), 0);
        assert_eq!(argmax_first(&[-1.0]), 0);
    }

    struct Pair;

    impl Encoder<(f32, f32)> for Pair {
        fn dim(&self) -> usize {
            2
        }

        fn encode_into(&self, obs: &(f32, f32), buf: &mut Vec<f32>) {
            buf.extend([obs.0, obs.1]);
        }
    }

    #[test]
    fn test_encode_batch() -> Result<()> {
        let obs: [(f32, f32); 2] = [(1.0, 2.0), (3.0, 4.0)];
        let xs = encode_batch(&Pair, [Some(&obs[0]), None, Some(&obs[1])], &Device::Cpu)?;
        assert_eq!(
            xs.to_vec2::<f32>()?,
            vec![vec![1.0, 2.0], vec![0.0, 0.0], vec![3.0, 4.0]]
        );
        Ok(())
    }

    struct Nothing;

    impl Encoder<(f32, f32)> for Nothing {
        fn dim(&self) -> usize {
            0
        }

        fn encode_into(&self, _obs: &(f32, f32), _buf: &mut Vec<f32>) {}
    }

    #[test]
    fn test_encode_batch_zero_width() {
        let obs = (1.0f32, 2.0f32);
        assert!(encode_batch(&Nothing, [Some(&obs)], &Device::Cpu).is_err());
    }
}
