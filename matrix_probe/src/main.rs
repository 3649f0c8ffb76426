//! Matrix probe
//!
//! Renders one frame of a scene through the scope stack and logs every matrix
//! the shaders would receive.
//!
//! ```text
//! matrix_probe                      # built-in scene
//! matrix_probe scene.ron            # scene from a RON or TOML file
//! matrix_probe --dump-scene out.ron # write the built-in scene as a template
//! ```

mod passes;
mod scene;

use render_matrices::foundation::logging;
use render_matrices::{Config, ConfigError, MatrixError, ScopeStack};
use thiserror::Error;

use crate::scene::SceneDescription;

#[derive(Error, Debug)]
enum ProbeError {
    #[error("scene could not be loaded: {0}")]
    Config(#[from] ConfigError),

    #[error("frame failed: {0}")]
    Matrices(#[from] MatrixError),

    #[error("usage: {0}")]
    Usage(String),
}

enum Command {
    Render(Option<String>),
    DumpScene(String),
}

fn parse_args(args: &[String]) -> Result<Command, ProbeError> {
    match args {
        [] => Ok(Command::Render(None)),
        [flag, path] if flag == "--dump-scene" => Ok(Command::DumpScene(path.clone())),
        [path] if !path.starts_with('-') => Ok(Command::Render(Some(path.clone()))),
        _ => Err(ProbeError::Usage(
            "matrix_probe [scene.ron|scene.toml] | matrix_probe --dump-scene <path>".to_string(),
        )),
    }
}

fn run(command: Command) -> Result<(), ProbeError> {
    let scene = match command {
        Command::DumpScene(path) => {
            SceneDescription::default().save_to_file(&path)?;
            log::info!("Wrote built-in scene to {}", path);
            return Ok(());
        }
        Command::Render(Some(path)) => {
            log::info!("Loading scene from {}", path);
            SceneDescription::load_from_file(&path)?
        }
        Command::Render(None) => {
            log::info!("Using built-in scene");
            SceneDescription::default()
        }
    };

    log::info!(
        "Scene: {} instances, {} projective lights, depth range {:?}",
        scene.instances.len(),
        scene.projective_lights.len(),
        scene.config.depth_range
    );

    let stack = ScopeStack::with_config(scene.config);
    let report = passes::render_frame(&stack, &scene)?;

    log::info!(
        "Frame done: {} opaque, {} lights, {} projected, {} skipped, {} uniform bytes",
        report.opaque_instances,
        report.projective_lights,
        report.projected_instances,
        report.skipped,
        report.uniform_bytes
    );
    Ok(())
}

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = parse_args(&args).and_then(run);

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
