// src/main.rs
use anyhow::{bail, Context, Result};
use clap::Parser;
use holomesh::{
    camera::Camera,
    config::Calibration,
    renderer::{context::GpuContext, MeshRenderer},
    scene::{JsonMaterialLibrary, SharedMaterial},
    session::{
        synthetic::{ScriptedAnchors, ScriptedHands, WaveScript},
        Controller, Session,
    },
};
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "holomesh", version)]
struct Args {
    /// JSON file overriding any subset of the calibration
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of shader material definitions
    #[arg(long)]
    material_library: Option<PathBuf>,

    /// Material to bind to reconstructed surfaces
    #[arg(long, default_value = "/Root/SuperStarMaterial")]
    material_name: String,

    /// Override: wrist displacement per update that maps to intensity 0
    #[arg(long)]
    min_speed: Option<f32>,

    /// Override: wrist displacement per update that maps to intensity 1
    #[arg(long)]
    max_speed: Option<f32>,

    /// Override: hysteresis half-width around the charged threshold
    #[arg(long)]
    dead_band: Option<f32>,

    /// Stop after this many seconds
    #[arg(long, default_value_t = 10)]
    duration_secs: u64,

    /// Hand tracker update rate
    #[arg(long, default_value_t = 30.0)]
    hand_rate_hz: f32,

    /// Mirror the reconstructed scene into an offscreen wgpu target
    #[arg(long, default_value_t = false)]
    gpu: bool,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

/// Defaults, then the config file, then individual flags.
fn calibration(args: &Args) -> Result<Calibration> {
    let mut cal = match &args.config {
        Some(path) => Calibration::from_json_file(path)?,
        None => Calibration::default(),
    };
    if let Some(v) = args.min_speed {
        cal.min_speed = v;
    }
    if let Some(v) = args.max_speed {
        cal.max_speed = v;
    }
    if let Some(v) = args.dead_band {
        cal.gradient_dead_band = v;
    }
    cal.validate().context("invalid calibration after applying flags")?;
    Ok(cal)
}

/// Tracker tick for a rate in Hz. Never shorter than 1 ms.
fn hand_period(rate_hz: f32) -> Result<Duration> {
    if !rate_hz.is_finite() || rate_hz <= 0.0 {
        bail!("--hand-rate-hz must be a positive finite number, got {rate_hz}");
    }
    Ok(Duration::from_secs_f32(1.0 / rate_hz).max(Duration::from_millis(1)))
}

async fn run(args: Args, cal: Calibration) -> Result<()> {
    let material = match &args.material_library {
        Some(path) => SharedMaterial::load(&JsonMaterialLibrary::new(path), &args.material_name).await,
        None => {
            warn!("No material library given; reconstructed surfaces use the fallback material");
            SharedMaterial::Unavailable
        }
    };

    let mut renderer = if args.gpu {
        let context = GpuContext::new_headless()
            .await
            .context("failed to create headless GPU context")?;
        info!("GPU mirror on {} ({}x{})", context.adapter_name, args.width, args.height);
        Some(MeshRenderer::new(context, args.width, args.height, cal.intensity_parameter.clone()))
    } else {
        None
    };

    let mut anchors = ScriptedAnchors::new(Duration::from_millis(500))
        .context("failed to build scripted anchors")?;
    let mut hands = ScriptedHands::new(hand_period(args.hand_rate_hz)?, WaveScript::default());
    let mut session =
        Session::start(&mut anchors, &mut hands).context("failed to start sensor session")?;

    let mut controller = Controller::new(&cal, material);
    let duration = Duration::from_secs(args.duration_secs);

    match renderer.as_mut() {
        None => {
            if tokio::time::timeout(duration, controller.run(&mut session.events))
                .await
                .is_err()
            {
                info!("Run time of {}s reached", args.duration_secs);
            }
        }
        Some(renderer) => {
            let camera = Camera::standing_viewer();
            let view_proj = camera.view_proj(renderer.targets.aspect_ratio());
            let deadline = tokio::time::sleep(duration);
            tokio::pin!(deadline);
            let mut frame = tokio::time::interval(Duration::from_millis(16));

            loop {
                tokio::select! {
                    _ = &mut deadline => break,
                    event = session.events.recv() => match event {
                        Some(event) => controller.handle(event),
                        None => break,
                    },
                    _ = frame.tick() => {
                        renderer.sync(controller.store(), view_proj);
                        renderer.render();
                    }
                }
            }
            info!("GPU mirror: {} frames, {} meshes", renderer.frames(), renderer.mesh_count());
        }
    }
    session.shutdown();

    let stats = controller.stats();
    let effect_rate = controller.effect().map_or(0.0, |e| e.particles.birth_rate);
    info!(
        "Done: {} meshes created, {} moves, {} skipped, {} removals ignored, {} hand updates, intensity {:.3}, birth rate {:.1}/s",
        stats.meshes_created,
        stats.meshes_moved,
        stats.meshes_skipped,
        stats.removals_ignored,
        stats.hand_updates,
        controller.intensity(),
        effect_rate,
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let cal = calibration(&args)?;
    hand_period(args.hand_rate_hz)?;

    let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    rt.block_on(run(args, cal))
}
