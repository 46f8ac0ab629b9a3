//! Name-keyed registry of metric, kernel and interpolation strategies.
//!
//! Built-ins and caller-supplied implementations are stored the same way,
//! so a [`Grassmann`](crate::Grassmann) toolkit can be configured by name
//! with either.

use crate::{
    interpolation::{Interpolator, KrigingInterpolation, LinearInterpolation},
    kernel::{BinetCauchyKernel, GrassmannKernel, ProjectionKernel},
    metric::{ChordalDistance, GrassmannDistance, GrassmannMetric, ProcrustesDistance, ProjectionDistance},
    surrogate::{KrigingConfig, SurrogateFactory},
};
use manifoldkit_core::{
    error::{ManifoldError, Result},
    types::Scalar,
};
use std::{collections::HashMap, sync::Arc};

/// Strategies available to the toolkit, keyed by name.
#[derive(Debug, Clone)]
pub struct StrategyRegistry<T: Scalar> {
    metrics: HashMap<String, Arc<dyn GrassmannMetric<T>>>,
    kernels: HashMap<String, Arc<dyn GrassmannKernel<T>>>,
    interpolators: HashMap<String, Arc<dyn Interpolator<T>>>,
}

impl<T: Scalar> Default for StrategyRegistry<T> {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl<T: Scalar> StrategyRegistry<T> {
    /// A registry with no strategies.
    pub fn empty() -> Self {
        Self {
            metrics: HashMap::new(),
            kernels: HashMap::new(),
            interpolators: HashMap::new(),
        }
    }

    /// A registry holding the four distances, the two kernels and
    /// `linear_interp`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register_metric(Arc::new(GrassmannDistance));
        registry.register_metric(Arc::new(ChordalDistance));
        registry.register_metric(Arc::new(ProcrustesDistance));
        registry.register_metric(Arc::new(ProjectionDistance));
        registry.register_kernel(Arc::new(ProjectionKernel));
        registry.register_kernel(Arc::new(BinetCauchyKernel));
        registry.register_interpolator(Arc::new(LinearInterpolation::default()));
        registry
    }

    /// Registers a metric under its own name, replacing any previous entry.
    pub fn register_metric(&mut self, metric: Arc<dyn GrassmannMetric<T>>) -> &mut Self {
        self.metrics.insert(metric.name().to_string(), metric);
        self
    }

    /// Registers a kernel under its own name, replacing any previous entry.
    pub fn register_kernel(&mut self, kernel: Arc<dyn GrassmannKernel<T>>) -> &mut Self {
        self.kernels.insert(kernel.name().to_string(), kernel);
        self
    }

    /// Registers an interpolator under its own name, replacing any previous
    /// entry.
    pub fn register_interpolator(&mut self, interpolator: Arc<dyn Interpolator<T>>) -> &mut Self {
        self.interpolators
            .insert(interpolator.name().to_string(), interpolator);
        self
    }

    /// Registers `kriging_interp` backed by `factory`.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `config` fails validation.
    pub fn register_kriging(
        &mut self,
        factory: Arc<dyn SurrogateFactory<T>>,
        config: KrigingConfig,
    ) -> Result<&mut Self> {
        let kriging = KrigingInterpolation::new(factory, config)?;
        Ok(self.register_interpolator(Arc::new(kriging)))
    }

    /// Looks up a metric.
    pub fn metric(&self, name: &str) -> Result<Arc<dyn GrassmannMetric<T>>> {
        self.metrics
            .get(name)
            .cloned()
            .ok_or_else(|| ManifoldError::unknown_strategy("metric", name))
    }

    /// Looks up a kernel.
    pub fn kernel(&self, name: &str) -> Result<Arc<dyn GrassmannKernel<T>>> {
        self.kernels
            .get(name)
            .cloned()
            .ok_or_else(|| ManifoldError::unknown_strategy("kernel", name))
    }

    /// Looks up an interpolator.
    pub fn interpolator(&self, name: &str) -> Result<Arc<dyn Interpolator<T>>> {
        self.interpolators
            .get(name)
            .cloned()
            .ok_or_else(|| ManifoldError::unknown_strategy("interpolator", name))
    }

    /// Registered metric names, sorted.
    pub fn metric_names(&self) -> Vec<&str> {
        sorted_keys(&self.metrics)
    }

    /// Registered kernel names, sorted.
    pub fn kernel_names(&self) -> Vec<&str> {
        sorted_keys(&self.kernels)
    }

    /// Registered interpolator names, sorted.
    pub fn interpolator_names(&self) -> Vec<&str> {
        sorted_keys(&self.interpolators)
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
    let mut names: Vec<&str> = map.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}
