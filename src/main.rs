// src/main.rs
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn pick_renderer() -> eframe::Renderer {
    match env::var("CINELIST_RENDERER").as_deref() {
        Ok("glow") => eframe::Renderer::Glow,
        Ok("wgpu") => eframe::Renderer::Wgpu,
        _ => {
            // Default: Windows = WGPU (DX12), Others = Glow (GL)
            #[cfg(target_os = "windows")]
            { eframe::Renderer::Wgpu }
            #[cfg(not(target_os = "windows"))]
            { eframe::Renderer::Glow }
        }
    }
}

fn main() -> eframe::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let cfg = cinelist::config::load_config();
    info!(
        "data dir {}, {} poster workers",
        cfg.data_dir().display(),
        cfg.poster_workers
    );

    let options = eframe::NativeOptions {
        renderer: pick_renderer(),
        viewport: egui::ViewportBuilder::default()
            .with_title("Cinelist")
            .with_inner_size([1100.0, 760.0]),
        multisampling: 0,
        ..Default::default()
    };

    match eframe::run_native(
        "Cinelist",
        options,
        Box::new(|_cc| Ok(Box::new(cinelist::app::CinelistApp::new(cfg)?))),
    ) {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("eframe failed to start: {e:?}");
            error!("Hint: try CINELIST_RENDERER=wgpu or glow.");
            Err(e)
        }
    }
}
