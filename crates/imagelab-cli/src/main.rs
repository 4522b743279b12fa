//! imagelab-cli: run an operator recipe against an image file.
//!
//! Drives the same controller the workspace UI drives: the recipe's
//! blocks are added, arranged and configured, the input image becomes
//! the source, and the processed image is written out.
//!
//! # Usage
//!
//! ```text
//! imagelab-cli photo.png --recipe recipe.json --output out.png
//! imagelab-cli photo.png --recipe '{"blocks":["read_image","median_blur"]}' -o out.png
//! imagelab-cli --list
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default
//! `info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use imagelab_pipeline::{Controller, Recipe};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Run an imagelab operator recipe against an image.
#[derive(Parser)]
#[command(name = "imagelab-cli", version)]
struct Cli {
    /// Input image (PNG, JPEG, BMP, WebP).
    #[arg(required_unless_present = "list")]
    input: Option<PathBuf>,

    /// Recipe file, or inline recipe JSON.
    #[arg(long, short, required_unless_present = "list")]
    recipe: Option<String>,

    /// Where to write the processed image. The format follows the
    /// extension.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print every operation with its parameters and exit.
    #[arg(long)]
    list: bool,

    /// Print the applied recipe, with every parameter value, as JSON.
    #[arg(long)]
    dump_recipe: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.list {
        list_operations();
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let (Some(input), Some(recipe_arg)) = (&cli.input, &cli.recipe) else {
        return Err("an input image and --recipe are required".to_owned());
    };

    let recipe = load_recipe(recipe_arg)?;
    let mut controller = Controller::new();
    controller
        .apply_recipe(&recipe)
        .map_err(|e| format!("Error applying recipe: {e}"))?;

    if cli.dump_recipe {
        let json = controller
            .recipe()
            .to_json()
            .map_err(|e| format!("Error serializing recipe: {e}"))?;
        println!("{json}");
    }

    let image =
        image::open(input).map_err(|e| format!("Error reading {}: {e}", input.display()))?;
    info!(
        path = %input.display(),
        width = image.width(),
        height = image.height(),
        blocks = controller.blocks().len(),
        "running pipeline"
    );
    controller.set_original_image(image);
    controller
        .compute_all()
        .map_err(|e| format!("Pipeline error: {e}"))?;

    let Some(processed) = controller.processed_image() else {
        return Err("Pipeline produced no image".to_owned());
    };
    match &cli.output {
        Some(path) => {
            processed
                .save(path)
                .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
            info!(path = %path.display(), "processed image written");
        }
        None => eprintln!(
            "Processed image: {}x{} (use --output to save it)",
            processed.width(),
            processed.height(),
        ),
    }
    Ok(())
}

/// Inline JSON when the argument looks like an object, otherwise a path.
fn load_recipe(arg: &str) -> Result<Recipe, String> {
    let text = if arg.trim_start().starts_with('{') {
        arg.to_owned()
    } else {
        let path = Path::new(arg);
        std::fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {e}", path.display()))?
    };
    Recipe::from_json(&text).map_err(|e| format!("Error parsing recipe: {e}"))
}

fn list_operations() {
    let controller = Controller::new();
    let registry = controller.registry();
    for kind in registry.kinds() {
        println!("{kind}");
        let Some(block) = registry.create(kind) else {
            continue;
        };
        for spec in block.params().specs() {
            println!("    {}: {}", spec.name, spec.kind);
        }
    }
}
