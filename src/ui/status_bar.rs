use egui::{Color32, Ui};

use crate::viewer::LoadState;

pub fn show_status_bar(
    ui: &mut Ui,
    load_state: &LoadState,
    hover: Option<([u32; 2], Color32)>,
    message: &str,
) {
    ui.horizontal_wrapped(|ui| {
        match load_state {
            LoadState::Empty => ui.label("未加载图片"),
            LoadState::Loading { source, .. } => ui.label(format!("加载中: {source}")),
            LoadState::Ready { source } => ui.label(format!("图片: {source}")),
            LoadState::Failed { source, error } => ui.colored_label(
                Color32::from_rgb(230, 110, 110),
                format!("加载失败: {source} ({error})"),
            ),
        };
        ui.separator();
        if let Some(([x, y], color)) = hover {
            let [r, g, b, a] = color.to_srgba_unmultiplied();
            ui.label(format!("像素: ({x}, {y}) RGBA({r}, {g}, {b}, {a})"));
            ui.separator();
        }
        ui.label(format!("状态: {message}"));
    });
}
