use tracing::{debug, info};

use crate::neuro::neuron::NeuronParams;

/// Bits per serial field.
pub const FIELD_WIDTH: u8 = 8;

/// Bits in one complete configuration frame.
pub const FRAME_BITS: usize = ParamField::ORDER.len() * FIELD_WIDTH as usize;

/// Serial fields in transmission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamField {
    WeightA,
    WeightB,
    Leak,
    Threshold,
}

impl ParamField {
    pub const ORDER: [ParamField; 4] = [
        ParamField::WeightA,
        ParamField::WeightB,
        ParamField::Leak,
        ParamField::Threshold,
    ];

    pub fn next(self) -> Option<Self> {
        match self {
            ParamField::WeightA => Some(ParamField::WeightB),
            ParamField::WeightB => Some(ParamField::Leak),
            ParamField::Leak => Some(ParamField::Threshold),
            ParamField::Threshold => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamField::WeightA => "weight_a",
            ParamField::WeightB => "weight_b",
            ParamField::Leak => "leak",
            ParamField::Threshold => "threshold",
        }
    }

    pub fn get(self, params: &NeuronParams) -> u8 {
        match self {
            ParamField::WeightA => params.weight_a,
            ParamField::WeightB => params.weight_b,
            ParamField::Leak => params.leak,
            ParamField::Threshold => params.threshold,
        }
    }

    fn slot(self, params: &mut NeuronParams) -> &mut u8 {
        match self {
            ParamField::WeightA => &mut params.weight_a,
            ParamField::WeightB => &mut params.weight_b,
            ParamField::Leak => &mut params.leak,
            ParamField::Threshold => &mut params.threshold,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoaderState {
    #[default]
    Idle,
    /// Next incoming bit lands at `bit` (0 = MSB) of `field`.
    Loading { field: ParamField, bit: u8 },
    /// Frame committed while `load_mode` is still held.
    Committed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoaderEvent {
    None,
    Armed,
    Shifted,
    Committed,
    Aborted,
}

/// Pure loader transition for one clock edge.
///
/// Returns the next state, the next shadow register and what happened. The
/// caller owns the active register and copies the shadow into it on
/// [`LoaderEvent::Committed`].
pub fn transition(
    state: LoaderState,
    shadow: NeuronParams,
    load_mode: bool,
    serial_data: bool,
) -> (LoaderState, NeuronParams, LoaderEvent) {
    if !load_mode {
        let event = match state {
            LoaderState::Loading { .. } => LoaderEvent::Aborted,
            _ => LoaderEvent::None,
        };
        return (LoaderState::Idle, shadow, event);
    }

    match state {
        LoaderState::Idle => (
            LoaderState::Loading {
                field: ParamField::WeightA,
                bit: 0,
            },
            NeuronParams::zeroed(),
            LoaderEvent::Armed,
        ),
        LoaderState::Loading { field, bit } => {
            let mut shadow = shadow;
            let slot = field.slot(&mut shadow);
            *slot = (*slot << 1) | u8::from(serial_data);

            if bit + 1 < FIELD_WIDTH {
                let next = LoaderState::Loading {
                    field,
                    bit: bit + 1,
                };
                return (next, shadow, LoaderEvent::Shifted);
            }

            match field.next() {
                Some(field) => (
                    LoaderState::Loading { field, bit: 0 },
                    shadow,
                    LoaderEvent::Shifted,
                ),
                None => (LoaderState::Committed, shadow, LoaderEvent::Committed),
            }
        }
        // Overrun: extra bits open a fresh frame.
        LoaderState::Committed => transition(
            LoaderState::Loading {
                field: ParamField::WeightA,
                bit: 0,
            },
            NeuronParams::zeroed(),
            true,
            serial_data,
        ),
    }
}

/// Serial bit sequence for a full frame, MSB first per field.
pub fn encode_frame(params: &NeuronParams) -> Vec<bool> {
    ParamField::ORDER
        .iter()
        .flat_map(|field| {
            let value = field.get(params);
            (0..FIELD_WIDTH).map(move |i| (value >> (FIELD_WIDTH - 1 - i)) & 1 == 1)
        })
        .collect()
}

/// Frame as a single word, `weight_a` in the most significant byte.
pub fn frame_word(params: &NeuronParams) -> u32 {
    u32::from_be_bytes([
        params.weight_a,
        params.weight_b,
        params.leak,
        params.threshold,
    ])
}

pub fn params_from_word(word: u32) -> NeuronParams {
    let [weight_a, weight_b, leak, threshold] = word.to_be_bytes();
    NeuronParams {
        weight_a,
        weight_b,
        leak,
        threshold,
    }
}

/// Active/shadow register pair plus the serial loader driving it.
#[derive(Clone, Debug)]
pub struct ParamStore {
    defaults: NeuronParams,
    active: NeuronParams,
    shadow: NeuronParams,
    state: LoaderState,
}

impl ParamStore {
    pub fn new(defaults: NeuronParams) -> Self {
        Self {
            defaults,
            active: defaults,
            shadow: NeuronParams::zeroed(),
            state: LoaderState::Idle,
        }
    }

    pub fn active(&self) -> &NeuronParams {
        &self.active
    }

    pub fn shadow(&self) -> &NeuronParams {
        &self.shadow
    }

    pub fn defaults(&self) -> &NeuronParams {
        &self.defaults
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn params_ready(&self) -> bool {
        !matches!(self.state, LoaderState::Loading { .. })
    }

    pub fn reset(&mut self) {
        self.active = self.defaults;
        self.shadow = NeuronParams::zeroed();
        self.state = LoaderState::Idle;
    }

    pub fn tick(&mut self, load_mode: bool, serial_data: bool) -> LoaderEvent {
        let (state, shadow, event) = transition(self.state, self.shadow, load_mode, serial_data);
        self.state = state;
        self.shadow = shadow;

        match event {
            LoaderEvent::Armed => info!("parameter load armed"),
            LoaderEvent::Committed => {
                self.active = shadow;
                info!(params = ?self.active, "parameter frame committed");
            }
            LoaderEvent::Aborted => {
                info!(params = ?self.active, "parameter load aborted, keeping active set");
            }
            LoaderEvent::Shifted => {
                debug!(bit = serial_data, state = ?self.state, "shifted serial bit");
            }
            LoaderEvent::None => {}
        }

        event
    }
}
