use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "sozi-camera", version)]
struct Cli {
    /// Log diagnostics to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the camera state that frames one SVG element.
    Fit(FitArgs),
    /// Print the camera transforms of a transition between two frames, one JSON line per tick.
    Sample(SampleArgs),
}

#[derive(Parser, Debug)]
struct ViewportArgs {
    /// Viewport width in pixels.
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 600.0)]
    height: f64,
}

#[derive(Parser, Debug)]
struct FitArgs {
    /// Input SVG document.
    #[arg(long)]
    svg: PathBuf,

    /// Id of the element to frame.
    #[arg(long)]
    element: String,

    #[command(flatten)]
    viewport: ViewportArgs,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Input SVG document.
    #[arg(long)]
    svg: PathBuf,

    /// Presentation JSON (layers and frames).
    #[arg(long)]
    presentation: PathBuf,

    /// Frame index (0-based) the transition starts from.
    #[arg(long)]
    from: usize,

    /// Frame index (0-based) the transition moves to.
    #[arg(long)]
    to: usize,

    /// Number of ticks after the initial one.
    #[arg(long, default_value_t = 10)]
    steps: u32,

    #[command(flatten)]
    viewport: ViewportArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }
    match cli.cmd {
        Command::Fit(args) => cmd_fit(args),
        Command::Sample(args) => cmd_sample(args),
    }
}

fn read_svg(path: &Path) -> anyhow::Result<sozi_camera::SvgDocument> {
    let bytes = std::fs::read(path).with_context(|| format!("read svg '{}'", path.display()))?;
    let doc = sozi_camera::SvgDocument::parse(&bytes)
        .with_context(|| format!("parse svg '{}'", path.display()))?;
    Ok(doc)
}

fn viewport_size(args: &ViewportArgs) -> anyhow::Result<sozi_camera::ViewportSize> {
    Ok(sozi_camera::ViewportSize::new(args.width, args.height)?)
}

fn cmd_fit(args: FitArgs) -> anyhow::Result<()> {
    use sozi_camera::GeometryProvider as _;

    let doc = read_svg(&args.svg)?;
    let size = viewport_size(&args.viewport)?;

    let node = doc
        .find(&args.element)
        .with_context(|| format!("no element with id '{}'", args.element))?;
    let mut state = sozi_camera::CameraState::default();
    state.set_at_element(&doc, &node, sozi_camera::ElementOffset::default())?;

    let layer_id = node
        .layer()
        .and_then(|l| doc.element_id(&l))
        .unwrap_or_else(|| args.element.clone());
    let mut camera =
        sozi_camera::Camera::new(sozi_camera::Layer::single(layer_id), size, state);
    camera.restore_aspect_ratio();
    camera.update();

    let out = json!({
        "element": args.element,
        "layer": camera.layer().key,
        "state": camera.state.to_storable(),
        "transform": camera.transform_attribute(),
        "clip": camera.rendered_clip_rect(),
    });
    println!("{}", serde_json::to_string(&out)?);
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let doc = read_svg(&args.svg)?;
    let size = viewport_size(&args.viewport)?;

    let text = std::fs::read_to_string(&args.presentation)
        .with_context(|| format!("read presentation '{}'", args.presentation.display()))?;
    let presentation = sozi_camera::Presentation::from_json(&text)
        .with_context(|| "parse presentation JSON")?;

    let mut player = sozi_camera::Player::new(
        presentation,
        &doc,
        size,
        sozi_camera::PlayerSettings::default(),
    )?;
    player.jump_to_frame(args.from)?;
    player.move_to_frame(args.to, 0.0)?;

    let steps = args.steps.max(1);
    let duration_ms = player.transition_duration_ms();
    print_tick(&player, 0, 0.0)?;
    for i in 1..=steps {
        let now_ms = duration_ms * f64::from(i) / f64::from(steps);
        player.tick(now_ms);
        print_tick(&player, i, now_ms)?;
    }
    Ok(())
}

fn print_tick(player: &sozi_camera::Player, tick: u32, now_ms: f64) -> anyhow::Result<()> {
    let layers: Vec<_> = player
        .viewport()
        .cameras()
        .iter()
        .map(|c| {
            json!({
                "key": c.layer().key,
                "transform": c.transform_attribute(),
                "clip": c.rendered_clip_rect(),
            })
        })
        .collect();
    let out = json!({
        "tick": tick,
        "timeMs": now_ms,
        "frame": player.current_frame_index(),
        "layers": layers,
    });
    println!("{}", serde_json::to_string(&out)?);
    Ok(())
}
