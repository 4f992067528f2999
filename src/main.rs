use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use lantern::{Application, Camera, Scene, Settings};
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Lantern: Ray Tracer", long_about = None)]
struct Options {
    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 360)]
    height: u32,

    /// 몇 프레임을 누적할지
    #[arg(short, long, default_value_t = 32)]
    frames: u32,

    /// 최대 반사 횟수 (0~16)
    #[arg(short, long, default_value_t = 5)]
    bounces: u32,

    /// 매 프레임 새로 그림
    #[arg(long)]
    no_accumulate: bool,

    /// 세로 시야각 (도)
    #[arg(long, default_value_t = 45.0)]
    fov: f32,

    /// JSON 장면 파일. 없으면 기본 장면
    #[arg(short, long, value_name = "FILE")]
    scene: Option<PathBuf>,

    #[arg(short, long, value_name = "FILE", default_value = "lantern.png")]
    output: PathBuf,

    /// 렌더링 스레드 수. 0이면 rayon 기본값
    #[arg(short = 't', long, default_value_t = 0)]
    threads: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let options = Options::parse();

    if options.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build_global()?;
    }

    let scene = match &options.scene {
        Some(path) => {
            info!("loading scene from {}", path.display());
            Scene::from_path(path)?
        }
        None => Scene::showcase(),
    };
    info!(
        "{} spheres, {} materials",
        scene.spheres.len(),
        scene.materials.len()
    );

    let mut settings = Settings {
        accumulate: !options.no_accumulate,
        ..Default::default()
    };
    settings.set_bounces(options.bounces);

    let camera = Camera::new(options.fov, 0.1, 100.0);
    let mut app = Application::new(scene, camera, settings);
    app.resize(options.width, options.height);

    let mut total_time = 0.0;
    for _ in 0..options.frames {
        app.frame();
        total_time += app.last_frame_time();
    }

    if options.frames > 0 {
        info!(
            "rendered {} frames, {:.3}ms per frame",
            options.frames,
            total_time / options.frames as f32
        );
    }

    app.final_image().save(&options.output)?;
    info!("saved {}", options.output.display());

    Ok(())
}
