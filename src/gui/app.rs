use std::collections::VecDeque;

use egui_plot::{HLine, Line, Plot, PlotPoints, Points};
use lifcore::core::config::CoreConfig;
use lifcore::core::decoder::{encode_control, encode_stimulus};
use lifcore::core::signals::{Control, PinInputs, Stimulus};
use lifcore::core::templates::{PRESET_NAMES, preset};
use lifcore::neuro::circuit::LifCircuit;
use lifcore::neuro::loader::encode_frame;
use lifcore::neuro::neuron::{CHANNEL_MAX, NeuronParams, POTENTIAL_MAX};
use tracing::{info, warn};

use crate::gui::layout::{
    POTENTIAL_COLOR, SPIKE_COLOR, THRESHOLD_COLOR, loader_label, param_row, ready_color,
};

const HISTORY_LEN: usize = 600;

struct PlotSample {
    cycle: u64,
    potential: u8,
    spike: bool,
}

/// Control pin values waiting to be clocked in, one per edge.
#[derive(Default)]
struct SerialQueue {
    pending: VecDeque<Control>,
}

impl SerialQueue {
    /// Queues the arming edge, the frame and the release edge.
    fn load(&mut self, params: &NeuronParams) {
        self.pending.clear();
        self.pending.push_back(Control {
            load_mode: true,
            serial_data: false,
        });
        self.pending
            .extend(encode_frame(params).into_iter().map(|bit| Control {
                load_mode: true,
                serial_data: bit,
            }));
        self.pending.push_back(Control::default());
    }

    fn abort(&mut self) {
        self.pending.clear();
        self.pending.push_back(Control::default());
    }

    fn clear(&mut self) {
        self.pending.clear();
    }

    fn len(&self) -> usize {
        self.pending.len()
    }

    fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Control pins for the next edge. A disabled core ignores the edge, so nothing is consumed.
    fn next(&mut self, enabled: bool) -> Control {
        let control = if enabled {
            self.pending.pop_front()
        } else {
            self.pending.front().copied()
        };
        control.unwrap_or_default()
    }
}

pub struct App {
    circuit: LifCircuit,
    inputs: PinInputs,
    stimulus: Stimulus,
    history: VecDeque<PlotSample>,
    clock: u64,
    running: bool,
    steps_per_frame: u32,

    draft: NeuronParams,
    serial: SerialQueue,
}

impl App {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: CoreConfig) -> Self {
        Self {
            circuit: LifCircuit::new(&config),
            inputs: PinInputs::default(),
            stimulus: Stimulus::default(),
            history: VecDeque::with_capacity(HISTORY_LEN),
            clock: 0,
            running: false,
            steps_per_frame: 1,

            draft: config.defaults,
            serial: SerialQueue::default(),
        }
    }

    fn tick(&mut self) {
        match encode_stimulus(self.stimulus) {
            Ok(byte) => self.inputs.ui_in = byte,
            Err(err) => warn!("ignoring stimulus: {err}"),
        }
        let control = self.serial.next(self.inputs.ena);
        self.inputs.uio_in = encode_control(control);

        self.circuit.tick(&self.inputs);
        let obs = self.circuit.observe();

        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(PlotSample {
            cycle: self.clock,
            potential: obs.potential,
            spike: obs.spike,
        });
        self.clock += 1;
    }

    fn pulse_reset(&mut self) {
        self.serial.clear();
        self.inputs.rst_n = false;
        self.tick();
        self.inputs.rst_n = true;
    }

    fn queue_load(&mut self, params: NeuronParams) {
        info!(?params, "queueing serial load");
        if !self.inputs.ena {
            warn!("core disabled, serial load waits for enable");
        }
        self.serial.load(&params);
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Stimulus");
        ui.add(egui::Slider::new(&mut self.stimulus.channel_a, 0..=CHANNEL_MAX).text("channel A"));
        ui.add(egui::Slider::new(&mut self.stimulus.channel_b, 0..=CHANNEL_MAX).text("channel B"));
        ui.separator();

        ui.heading("Clock");
        ui.checkbox(&mut self.inputs.ena, "enable");
        ui.add(egui::Slider::new(&mut self.steps_per_frame, 1..=20).text("cycles / frame"));
        ui.horizontal(|ui| {
            if self.running {
                if ui.button("Pause").clicked() {
                    self.running = false;
                }
            } else if ui.button("Start").clicked() {
                self.running = true;
            }
            if ui.button("Step").clicked() {
                self.tick();
            }
            if ui.button("Reset").clicked() {
                self.pulse_reset();
            }
        });
        ui.separator();

        ui.heading("Parameters");
        param_row(ui, "weight_a", &mut self.draft.weight_a);
        param_row(ui, "weight_b", &mut self.draft.weight_b);
        param_row(ui, "leak", &mut self.draft.leak);
        param_row(ui, "threshold", &mut self.draft.threshold);
        if !self.draft.can_fire() {
            ui.colored_label(SPIKE_COLOR, "threshold above ceiling, will never fire");
        }

        ui.horizontal_wrapped(|ui| {
            for name in PRESET_NAMES {
                if ui.small_button(name).clicked() {
                    if let Ok(params) = preset(name) {
                        self.draft = params;
                    }
                }
            }
        });

        let loading = !self.serial.is_empty();
        if ui
            .add_enabled(!loading, egui::Button::new("Load serially"))
            .clicked()
        {
            self.queue_load(self.draft);
        }
        if loading {
            ui.label(format!("{} edges queued", self.serial.len()));
            if !self.inputs.ena {
                ui.colored_label(SPIKE_COLOR, "enable is off, load paused");
            }
            if ui.button("Abort").clicked() {
                self.serial.abort();
            }
        }
        ui.separator();

        let ready = self.circuit.params_ready();
        ui.colored_label(ready_color(ready), format!("params_ready = {}", u8::from(ready)));
        ui.label(format!("loader: {}", loader_label(self.circuit.store().state())));
        let active = self.circuit.params();
        ui.label(format!(
            "active: wa={} wb={} leak={} th={}",
            active.weight_a, active.weight_b, active.leak, active.threshold
        ));
        let outputs = self.circuit.outputs();
        ui.monospace(format!(
            "uo_out={:08b} uio_out={:08b}",
            outputs.uo_out, outputs.uio_out
        ));
    }

    fn plot(&self, ui: &mut egui::Ui) {
        let potential: PlotPoints = self
            .history
            .iter()
            .map(|p| [p.cycle as f64, f64::from(p.potential)])
            .collect();
        let spikes: PlotPoints = self
            .history
            .iter()
            .filter(|p| p.spike)
            .map(|p| [p.cycle as f64, f64::from(POTENTIAL_MAX)])
            .collect();
        let threshold = f64::from(self.circuit.params().threshold);

        Plot::new("potential_plot")
            .include_y(0.0)
            .include_y(f64::from(POTENTIAL_MAX) + 4.0)
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new("membrane potential", potential).color(POTENTIAL_COLOR));
                plot_ui.hline(HLine::new("threshold", threshold).color(THRESHOLD_COLOR));
                plot_ui.points(Points::new("spike", spikes).color(SPIKE_COLOR).radius(3.0));
            });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        if self.running {
            for _ in 0..self.steps_per_frame {
                self.tick();
            }
            ctx.request_repaint();
        } else if self.inputs.ena && !self.serial.is_empty() {
            self.tick();
            ctx.request_repaint();
        }

        egui::SidePanel::left("controls").show(ctx, |ui| self.controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Membrane potential");
            self.plot(ui);
        });
    }
}
