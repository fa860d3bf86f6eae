use std::sync::Arc;

/// Lifecycle hooks every stateful model exposes to the simulator that owns it.
pub trait ModuleBehaviors {
    /// Drop all simulated state and start a fresh lifetime with the same configuration.
    fn reset(&mut self);
}

pub trait Parameterizable {
    type ConfigType;

    fn conf(&self) -> &Self::ConfigType;

    fn init_conf(&mut self, conf: Arc<Self::ConfigType>);
}
