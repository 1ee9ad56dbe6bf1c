use eframe::egui;

use crate::core::bitmap::ImageSource;
use crate::core::mode::InteractionMode;
use crate::rendering::painted::PaintedSurface;
use crate::storage::runtime::RuntimeStore;
use crate::storage::viewer_config::ViewerConfig;
use crate::ui::canvas_view::{show_canvas, CanvasTexture};
use crate::ui::control_panel::show_control_panel;
use crate::ui::status_bar::show_status_bar;
use crate::viewer::{BitmapLoader, LoadState, ViewportController};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff", "tif", "ico"];

pub struct ZoomViewerApp {
    config: ViewerConfig,
    store: RuntimeStore,
    controller: ViewportController<PaintedSurface>,
    loader: BitmapLoader,
    texture: CanvasTexture,
    hover: Option<[u32; 2]>,
    last_status: String,
}

impl ZoomViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: ViewerConfig,
        store: RuntimeStore,
        initial: Option<ImageSource>,
    ) -> Self {
        let controller = ViewportController::new(config.controller_settings(), PaintedSurface::default());
        let loader = BitmapLoader::new().with_repaint(cc.egui_ctx.clone());

        let mut app = Self {
            config,
            store,
            controller,
            loader,
            texture: CanvasTexture::default(),
            hover: None,
            last_status: "就绪".to_string(),
        };
        if let Some(source) = initial {
            app.open(source);
        }
        app
    }

    fn open(&mut self, source: ImageSource) {
        let name = source.display_name();
        let request_id = self.loader.request(source.clone());
        self.controller.begin_load(request_id, name.clone());
        self.last_status = format!("正在加载 {name}");

        if let Some(path) = source.path() {
            self.config.last_image = Some(path.to_path_buf());
            self.persist_config();
        }
    }

    fn open_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("图片", IMAGE_EXTENSIONS)
            .pick_file();
        if let Some(path) = picked {
            self.open(ImageSource::Path(path));
        }
    }

    fn poll_loader(&mut self) {
        for outcome in self.loader.poll() {
            if !self.controller.finish_load(outcome) {
                continue;
            }
            self.last_status = match (self.controller.load_state(), self.controller.bitmap()) {
                (LoadState::Ready { .. }, Some(bitmap)) => {
                    format!("已加载 ({}x{})", bitmap.width(), bitmap.height())
                }
                _ => "加载失败".to_string(),
            };
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
        let Some(file) = dropped else {
            return;
        };

        let source = if let Some(path) = file.path {
            Some(ImageSource::Path(path))
        } else {
            file.bytes.map(|bytes| ImageSource::Bytes {
                name: file.name.clone(),
                bytes,
            })
        };

        match source {
            Some(source) => self.open(source),
            None => {
                log::warn!("拖入的文件没有路径也没有内容: {}", file.name);
                self.last_status = "无法读取拖入的文件".to_string();
            }
        }
    }

    fn set_mode(&mut self, mode: InteractionMode) {
        self.config.mode = mode;
        self.controller.apply_settings(self.config.controller_settings());
        self.last_status = format!("模式: {}", mode.label());
        self.persist_config();
    }

    fn persist_config(&mut self) {
        if let Err(error) = self.config.save(&self.store) {
            log::warn!("配置保存失败: {error}");
            self.last_status = format!("配置保存失败: {error}");
        }
    }
}

impl eframe::App for ZoomViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader();
        self.handle_dropped_files(ctx);

        egui::SidePanel::left("control_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                let action = show_control_panel(
                    ui,
                    self.controller.settings(),
                    self.controller.state(),
                    self.controller.bitmap().map(|b| b.size()),
                );
                if action.open_file {
                    self.open_dialog();
                }
                if let Some(mode) = action.mode {
                    self.set_mode(mode);
                }
                if let Some(sticky) = action.sticky_engage {
                    self.config.sticky_engage = sticky;
                    self.controller.set_sticky_engage(sticky);
                    self.persist_config();
                }
                if action.reset_view {
                    self.controller.reset_view();
                }
            });

        egui::TopBottomPanel::bottom("status_bar")
            .resizable(false)
            .min_height(28.0)
            .show(ctx, |ui| {
                let hover = self.hover.and_then(|[x, y]| {
                    let color = self.controller.bitmap()?.pixel(x, y)?;
                    Some(([x, y], color))
                });
                show_status_bar(ui, self.controller.load_state(), hover, &self.last_status);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let response = show_canvas(ui, &mut self.controller, &mut self.texture);
            self.hover = response.hover;
        });
    }
}
