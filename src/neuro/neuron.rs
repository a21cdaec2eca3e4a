use serde::{Deserialize, Serialize};

/// Largest value the 7-bit membrane potential register can hold.
pub const POTENTIAL_MAX: u8 = 127;

/// Largest level a 3-bit stimulus channel can carry.
pub const CHANNEL_MAX: u8 = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NeuronParams {
    pub weight_a: u8,
    pub weight_b: u8,
    pub leak: u8,
    pub threshold: u8,
}

impl Default for NeuronParams {
    fn default() -> Self {
        Self {
            weight_a: 2,   // Channel A synaptic weight
            weight_b: 2,   // Channel B synaptic weight
            leak: 1,       // Potential lost per cycle
            threshold: 64, // Firing threshold, compared against V
        }
    }
}

impl NeuronParams {
    pub const fn zeroed() -> Self {
        Self {
            weight_a: 0,
            weight_b: 0,
            leak: 0,
            threshold: 0,
        }
    }

    /// A threshold above the potential ceiling can never be reached.
    pub fn can_fire(&self) -> bool {
        self.threshold <= POTENTIAL_MAX
    }

    /// Weighted sum of both channels, clamped to the potential range.
    pub fn synaptic_input(&self, channel_a: u8, channel_b: u8) -> u8 {
        let a = u16::from(channel_a.min(CHANNEL_MAX)) * u16::from(self.weight_a);
        let b = u16::from(channel_b.min(CHANNEL_MAX)) * u16::from(self.weight_b);

        clamp_potential(a + b)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    AtRest,
    Firing,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Neuron {
    pub v: u8,
    pub phase: Phase,
}

impl Neuron {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spike(&self) -> bool {
        self.phase == Phase::Firing
    }

    pub fn reset(&mut self) {
        self.v = 0;
        self.phase = Phase::AtRest;
    }

    /// Advances one clock edge. Leak is applied before integration and a
    /// crossing resets the potential to zero on the same edge.
    pub fn step(&mut self, channel_a: u8, channel_b: u8, params: &NeuronParams) -> bool {
        let input = params.synaptic_input(channel_a, channel_b);
        let leaked = apply_leak(self.v, params.leak);
        let integrated = integrate(leaked, input);

        if integrated >= params.threshold {
            self.v = 0;
            self.phase = Phase::Firing;
            true
        } else {
            self.v = integrated;
            self.phase = Phase::AtRest;
            false
        }
    }
}

fn clamp_potential(value: u16) -> u8 {
    value.min(u16::from(POTENTIAL_MAX)) as u8
}

fn apply_leak(v: u8, leak: u8) -> u8 {
    (i16::from(v) - i16::from(leak)).max(0) as u8
}

fn integrate(v: u8, input: u8) -> u8 {
    clamp_potential(u16::from(v) + u16::from(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(weight_a: u8, weight_b: u8, leak: u8, threshold: u8) -> NeuronParams {
        NeuronParams {
            weight_a,
            weight_b,
            leak,
            threshold,
        }
    }

    #[test]
    fn leak_is_applied_before_integration() {
        let mut neuron = Neuron::new();
        let cfg = params(3, 0, 5, 100);

        neuron.step(1, 0, &cfg);

        // 0 - 5 floors at 0, then + 3
        assert_eq!(neuron.v, 3);
    }

    #[test]
    fn potential_saturates_at_ceiling() {
        let mut neuron = Neuron::new();
        let cfg = params(255, 255, 0, 200);

        for _ in 0..4 {
            assert!(!neuron.step(7, 7, &cfg));
            assert_eq!(neuron.v, POTENTIAL_MAX);
        }
    }

    #[test]
    fn synaptic_input_is_clamped() {
        let cfg = params(255, 255, 0, 0);
        assert_eq!(cfg.synaptic_input(7, 7), POTENTIAL_MAX);
        assert_eq!(params(2, 3, 0, 0).synaptic_input(4, 5), 23);
    }

    #[test]
    fn out_of_range_channels_are_capped() {
        let cfg = params(1, 1, 0, 0);
        assert_eq!(cfg.synaptic_input(200, 9), 14);
    }

    #[test]
    fn crossing_fires_and_resets() {
        let mut neuron = Neuron::new();
        let cfg = params(5, 5, 0, 20);

        assert!(!neuron.step(1, 1, &cfg));
        assert_eq!(neuron.v, 10);
        assert!(neuron.step(1, 1, &cfg));
        assert_eq!(neuron.v, 0);
        assert!(neuron.spike());

        assert!(!neuron.step(0, 0, &cfg));
        assert_eq!(neuron.phase, Phase::AtRest);
    }

    #[test]
    fn threshold_equal_to_potential_fires() {
        let mut neuron = Neuron::new();
        let cfg = params(4, 0, 0, 28);

        assert!(neuron.step(7, 0, &cfg));
    }

    #[test]
    fn threshold_above_ceiling_never_fires() {
        let mut neuron = Neuron::new();
        let cfg = params(255, 255, 0, 128);
        assert!(!cfg.can_fire());

        for _ in 0..50 {
            assert!(!neuron.step(7, 7, &cfg));
        }
    }

    #[test]
    fn zero_threshold_fires_every_cycle() {
        let mut neuron = Neuron::new();
        let cfg = params(0, 0, 0, 0);

        for _ in 0..5 {
            assert!(neuron.step(0, 0, &cfg));
        }
    }

    #[test]
    fn reset_returns_to_rest() {
        let mut neuron = Neuron {
            v: 90,
            phase: Phase::Firing,
        };
        neuron.reset();
        assert_eq!(neuron, Neuron::new());
    }
}
