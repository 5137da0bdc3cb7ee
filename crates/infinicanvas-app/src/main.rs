//! InfiniCanvas headless shell.
//!
//! Loads a scene, replays an input script against it through the gesture controller and
//! prints the resulting scene as JSON.
//!
//! Run `infinicanvas --help` for the options.

mod script;

use clap::Parser;
use infinicanvas_core::shortcuts::ShortcutRegistry;
use infinicanvas_core::storage::{AutoSaveManager, FileStorage, create_default_storage};
use infinicanvas_core::{EngineConfig, GestureController, SceneStore, export_json, import_json};
use script::Script;
use std::error::Error;
use std::path::PathBuf;

/// Command line options.
#[derive(Parser, Debug)]
#[command(name = "infinicanvas", about = "Replay input scripts against an InfiniCanvas scene")]
struct Args {
    /// Engine configuration (JSON).
    #[arg(long, env = "INFINICANVAS_CONFIG")]
    config: Option<PathBuf>,

    /// Exported scene to import before replaying.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Write the resulting scene here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Restore the last autosaved scene and keep saving while replaying.
    #[arg(long)]
    autosave: bool,

    /// Print the keyboard shortcuts and exit.
    #[arg(long)]
    shortcuts: bool,

    /// Input script to replay.
    script: Option<PathBuf>,
}

fn print_shortcuts() {
    println!("\n=== Keyboard Shortcuts ===");
    for shortcut in ShortcutRegistry::all() {
        println!("  {:24} {}", shortcut.keys, shortcut.description);
    }
    println!();
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if args.shortcuts {
        print_shortcuts();
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let mut store = SceneStore::new();
    store.set_history_limit(config.undo_history);

    let mut autosave: Option<AutoSaveManager<FileStorage>> = if args.autosave {
        let mut manager = AutoSaveManager::new(create_default_storage()?);
        manager.set_interval(config.autosave_interval());
        if args.scene.is_none() {
            if let Some(scene) = pollster::block_on(manager.load_last()) {
                log::info!("Restored autosaved scene ({} elements)", scene.len());
                store.replace_scene(scene);
            }
        }
        Some(manager)
    } else {
        None
    };

    if let Some(path) = &args.scene {
        let json = std::fs::read_to_string(path)?;
        import_json(&mut store, &json)?;
    }

    store.subscribe(|change, scene| {
        log::debug!("{:?} ({} elements, {} selected)", change, scene.len(), scene.selected_ids().len());
    });

    let mut controller = GestureController::new(config);
    if let Some(path) = &args.script {
        let script = Script::load(path)?;
        let summary = script.replay(&mut controller, &mut store, |store| {
            if let Some(manager) = autosave.as_mut() {
                if let Err(err) = pollster::block_on(manager.maybe_save(store)) {
                    log::warn!("Autosave failed: {}", err);
                }
            }
        });
        log::info!(
            "Replayed {} steps ({} images placed, {} dropped)",
            summary.steps,
            summary.images_placed,
            summary.images_dropped
        );
    }

    if let Some(manager) = autosave.as_mut() {
        pollster::block_on(manager.save(&store))?;
    }

    let json = export_json(store.scene())?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Starting InfiniCanvas");

    let args = Args::parse();
    if let Err(err) = run(args) {
        log::error!("{}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
