use serde::{Deserialize, Serialize};

/// Raw pin levels sampled on a clock edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinInputs {
    pub ui_in: u8,
    pub uio_in: u8,
    pub ena: bool,
    pub rst_n: bool,
}

impl Default for PinInputs {
    fn default() -> Self {
        Self {
            ui_in: 0,
            uio_in: 0,
            ena: true,
            rst_n: true,
        }
    }
}

/// Raw pin levels driven by the core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PinOutputs {
    pub uo_out: u8,
    pub uio_out: u8,
    pub uio_oe: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stimulus {
    pub channel_a: u8,
    pub channel_b: u8,
}

impl Stimulus {
    pub const fn new(channel_a: u8, channel_b: u8) -> Self {
        Self {
            channel_a,
            channel_b,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Control {
    pub load_mode: bool,
    pub serial_data: bool,
}

/// Decoded view of the output pins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Observation {
    pub potential: u8,
    pub spike: bool,
    pub params_ready: bool,
}
