use egui::Color32;

use lifcore::neuro::loader::LoaderState;

pub const POTENTIAL_COLOR: Color32 = Color32::from_rgb(100, 149, 237);
pub const THRESHOLD_COLOR: Color32 = Color32::from_rgb(255, 165, 0);
pub const SPIKE_COLOR: Color32 = Color32::from_rgb(220, 20, 60);

pub fn ready_color(ready: bool) -> Color32 {
    if ready {
        Color32::from_rgb(50, 205, 50)
    } else {
        Color32::from_rgb(220, 20, 60)
    }
}

pub fn loader_label(state: LoaderState) -> String {
    match state {
        LoaderState::Idle => "idle".to_string(),
        LoaderState::Loading { field, bit } => format!("loading {} bit {}", field.name(), bit),
        LoaderState::Committed => "committed (load_mode still high)".to_string(),
    }
}

pub fn param_row(ui: &mut egui::Ui, label: &str, value: &mut u8) -> bool {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(egui::DragValue::new(value).range(0..=255).speed(0.2))
            .changed()
    })
    .inner
}
