mod config;
mod core;
mod rendering;
mod storage;
mod ui;
mod viewer;

use crate::config::cli::{LaunchOptions, HELP};
use crate::core::bitmap::ImageSource;
use crate::storage::runtime::RuntimeStore;
use crate::storage::viewer_config::ViewerConfig;
use crate::ui::app::ZoomViewerApp;

fn main() {
    let options = match LaunchOptions::from_env() {
        Ok(options) => options,
        Err(error) => {
            eprintln!("{error}\n\n{HELP}");
            std::process::exit(2);
        }
    };
    if options.help {
        print!("{HELP}");
        return;
    }

    let store = RuntimeStore::open_default();
    let mut config = ViewerConfig::load(&store);

    let level = options
        .log_level
        .unwrap_or_else(|| config.log_level.to_level_filter());
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
    log::debug!("配置文件: {}", store.path().display());

    if let Some(mode) = options.mode {
        config.mode = mode;
    }

    // 命令行指定的图片优先，其次是上次打开的图片
    let initial = match options.image.as_deref().map(ImageSource::parse) {
        Some(Ok(source)) => Some(source),
        Some(Err(error)) => {
            log::error!("{error}");
            None
        }
        None => config
            .last_image
            .clone()
            .filter(|path| path.exists())
            .map(ImageSource::Path),
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Lian Zoom Viewer")
            .with_inner_size([1200.0, 800.0])
            .with_drag_and_drop(true)
            .with_app_id("lian-zoom-viewer"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Lian Zoom Viewer",
        native_options,
        Box::new(move |cc| Box::new(ZoomViewerApp::new(cc, config, store, initial))),
    );
    if let Err(error) = result {
        log::error!("窗口启动失败: {error}");
        std::process::exit(1);
    }
}
