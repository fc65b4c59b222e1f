use crate::{
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    util::{copy_vars, OutDim},
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor, Var};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`DqnModel`].
pub struct DqnModelConfig<Q>
where
    Q: OutDim,
{
    pub(super) q_config: Option<Q>,
    pub(super) opt_config: OptimizerConfig,
}

impl<Q> Default for DqnModelConfig<Q>
where
    Q: OutDim,
{
    fn default() -> Self {
        Self {
            q_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<Q> DqnModelConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets configurations for action-value function.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = Some(v);
        self
    }

    /// Sets output dimension of the model.
    pub fn out_dim(mut self, v: usize) -> Self {
        if let Some(q_config) = &mut self.q_config {
            q_config.set_out_dim(v);
        }
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`DqnModelConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnModelConfig`] to as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Action-value function of DQN with its own [`VarMap`].
pub struct DqnModel<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim,
{
    varmap: VarMap,

    // Dimension of the output vector (equal to the number of actions).
    pub(super) out_dim: usize,

    // Action-value function
    q: Q,

    opt_config: OptimizerConfig,
}

impl<Q> DqnModel<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Constructs [`DqnModel`].
    pub fn build(config: DqnModelConfig<Q::Config>, device: Device) -> Result<Self> {
        let q_config = config.q_config.context("q_config is not set.")?;
        let out_dim = q_config.get_out_dim();
        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            Q::build(vb, q_config)?
        };

        Ok(Self {
            varmap,
            out_dim,
            q,
            opt_config: config.opt_config,
        })
    }

    /// Outputs the action-values given observations, tracking gradients.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        self.q.forward(xs)
    }

    /// Outputs the action-values given observations, detached from the
    /// computation graph.
    pub fn predict(&self, xs: &Tensor) -> Result<Tensor> {
        Ok(self.q.forward(xs)?.detach())
    }

    /// Returns the trainable variables.
    pub fn vars(&self) -> Vec<Var> {
        self.varmap.all_vars()
    }

    /// Builds an optimizer over the variables of this model.
    pub fn build_optimizer(&self) -> Result<Optimizer> {
        self.opt_config.build(self.vars())
    }

    /// Overwrites the parameters of this model with those of `src`.
    pub fn copy_from(&self, src: &Self) -> Result<()> {
        copy_vars(&self.varmap, &src.varmap)
    }

    /// Saves the parameters in safetensors format.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save dqnmodel to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads parameters saved with [`DqnModel::save`].
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load dqnmodel from {:?}", path.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::{Mlp, MlpConfig};
    use tempdir::TempDir;

    fn config() -> DqnModelConfig<MlpConfig> {
        DqnModelConfig::default()
            .q_config(MlpConfig::new(4, vec![8], 0, false))
            .out_dim(3)
    }

    fn input() -> Result<Tensor> {
        Ok(Tensor::new(
            &[[1f32, 0.5, -0.2, 2.0], [0.0, 1.0, 1.0, -1.0]],
            &Device::Cpu,
        )?)
    }

    #[test]
    fn test_copy_from() -> Result<()> {
        let src = DqnModel::<Mlp>::build(config(), Device::Cpu)?;
        let dest = DqnModel::<Mlp>::build(config(), Device::Cpu)?;
        let xs = input()?;
        assert_eq!(src.out_dim, 3);
        assert_ne!(
            src.predict(&xs)?.to_vec2::<f32>()?,
            dest.predict(&xs)?.to_vec2::<f32>()?
        );

        dest.copy_from(&src)?;
        assert_eq!(
            src.predict(&xs)?.to_vec2::<f32>()?,
            dest.predict(&xs)?.to_vec2::<f32>()?
        );
        Ok(())
    }

    #[test]
    fn test_save_load() -> Result<()> {
        let tmp = TempDir::new("dqn_model")?;
        let path = tmp.path().join("qnet.safetensors");
        let model = DqnModel::<Mlp>::build(config(), Device::Cpu)?;
        model.save(&path)?;

        let mut loaded = DqnModel::<Mlp>::build(config(), Device::Cpu)?;
        loaded.load(&path)?;

        let xs = input()?;
        assert_eq!(
            model.predict(&xs)?.to_vec2::<f32>()?,
            loaded.predict(&xs)?.to_vec2::<f32>()?
        );
        Ok(())
    }

    #[test]
    fn test_missing_q_config() {
        let config = DqnModelConfig::<MlpConfig>::default();
        assert!(DqnModel::<Mlp>::build(config, Device::Cpu).is_err());
    }

    #[test]
    fn test_config_yaml() -> Result<()> {
        let tmp = TempDir::new("dqn_model_config")?;
        let path = tmp.path().join("model.yaml");
        let config = config().opt_config(OptimizerConfig::Adam { lr: 0.01 });
        config.save(&path)?;
        assert_eq!(DqnModelConfig::<MlpConfig>::load(&path)?, config);
        Ok(())
    }
}
