use egui::Ui;

use crate::core::mode::InteractionMode;
use crate::rendering::viewport::ViewportState;
use crate::viewer::ControllerSettings;

// ── action returned to the app ──────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ControlAction {
    pub open_file: bool,
    pub mode: Option<InteractionMode>,
    pub sticky_engage: Option<bool>,
    pub reset_view: bool,
}

// ── panel rendering ─────────────────────────────────────────

pub fn show_control_panel(
    ui: &mut Ui,
    settings: &ControllerSettings,
    viewport: &ViewportState,
    image_size: Option<[u32; 2]>,
) -> ControlAction {
    let mut action = ControlAction::default();
    let mode = settings.mode;

    ui.heading("控制面板");
    ui.separator();

    if ui.button("📂 打开图片…").clicked() {
        action.open_file = true;
    }
    ui.label("也可以直接把图片拖进窗口");

    ui.separator();

    // ── interaction mode ──
    ui.label("交互模式");
    let mut selected = mode;
    for candidate in InteractionMode::all() {
        ui.radio_value(&mut selected, *candidate, candidate.label());
    }
    if selected != mode {
        action.mode = Some(selected);
    }
    ui.label(egui::RichText::new(selected.hint()).weak());

    if mode == InteractionMode::CenterOnClick {
        let mut sticky = settings.sticky_engage;
        if ui.checkbox(&mut sticky, "松开后保持按下状态").changed() {
            action.sticky_engage = Some(sticky);
        }
    }

    ui.separator();

    // ── zoom ──
    ui.label(format!("缩放: {:.0}%", viewport.zoom * 100.0));
    ui.label(
        egui::RichText::new(format!(
            "范围: {:.0}% – {:.0}%",
            settings.limits.min() * 100.0,
            settings.limits.max() * 100.0
        ))
        .weak(),
    );
    ui.label(format!(
        "偏移: ({:.1}, {:.1})",
        viewport.offset.x, viewport.offset.y
    ));
    if let Some([w, h]) = image_size {
        ui.label(format!("尺寸: {w} x {h}"));
    }
    if ui.button("重置视图").clicked() {
        action.reset_view = true;
    }

    action
}
