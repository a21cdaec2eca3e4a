use tracing::{debug, trace};

use crate::core::config::CoreConfig;
use crate::core::decoder::{decode_control, decode_stimulus, encode_outputs};
use crate::core::signals::{Observation, PinInputs, PinOutputs};
use crate::neuro::loader::{LoaderEvent, ParamStore};
use crate::neuro::neuron::{Neuron, NeuronParams};

/// One LIF core: parameter store, loader and neuron behind a single clock.
#[derive(Clone, Debug)]
pub struct LifCircuit {
    store: ParamStore,
    neuron: Neuron,
    pub t: u64,
}

impl LifCircuit {
    pub fn new(config: &CoreConfig) -> Self {
        Self::with_defaults(config.defaults)
    }

    pub fn with_defaults(defaults: NeuronParams) -> Self {
        Self {
            store: ParamStore::new(defaults),
            neuron: Neuron::new(),
            t: 0,
        }
    }

    pub fn params(&self) -> &NeuronParams {
        self.store.active()
    }

    pub fn store(&self) -> &ParamStore {
        &self.store
    }

    pub fn neuron(&self) -> &Neuron {
        &self.neuron
    }

    pub fn params_ready(&self) -> bool {
        self.store.params_ready()
    }

    pub fn reset(&mut self) {
        self.neuron.reset();
        self.store.reset();
        self.t = 0;
    }

    pub fn observe(&self) -> Observation {
        Observation {
            potential: self.neuron.v,
            spike: self.neuron.spike(),
            params_ready: self.store.params_ready(),
        }
    }

    pub fn outputs(&self) -> PinOutputs {
        encode_outputs(self.observe())
    }

    /// Evaluates one rising clock edge with the given pin levels.
    ///
    /// Reset wins over every other input, enable included. With enable low
    /// nothing moves. The neuron sees the parameter set that was active
    /// before this edge, so a commit takes effect from the next edge on.
    pub fn tick(&mut self, inputs: &PinInputs) -> PinOutputs {
        if !inputs.rst_n {
            self.reset();
            return self.outputs();
        }

        if !inputs.ena {
            return self.outputs();
        }

        let stimulus = decode_stimulus(inputs.ui_in);
        let control = decode_control(inputs.uio_in);

        let params = *self.store.active();
        let fired = self
            .neuron
            .step(stimulus.channel_a, stimulus.channel_b, &params);

        let event = self.store.tick(control.load_mode, control.serial_data);

        if fired {
            debug!(t = self.t, ?stimulus, "spike");
        }
        if event == LoaderEvent::Committed {
            debug!(
                t = self.t,
                params = ?self.store.active(),
                "new parameters active from next edge"
            );
        }
        trace!(
            t = self.t,
            v = self.neuron.v,
            spike = fired,
            params_ready = self.store.params_ready(),
            "tick"
        );

        self.t += 1;
        self.outputs()
    }
}
