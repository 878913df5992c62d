//! `tictac-cli` – Playground Command Line Interface
//!
//! The `tictac` binary runs the playground until it is stopped:
//!
//! 1. Initialises tracing (console, optional JSON `--log-file`, optional OTLP).
//! 2. Loads `~/.tictac/config.toml` (defaults when absent) and the value table.
//! 3. Builds the simulated playground and puts the robot in its rest pose.
//! 4. Plays games forever.  A stalled camera logs the fault, runs the
//!    configured reboot command and exits with a failure status.

mod config;

use std::convert::Infallible;
use std::path::PathBuf;
use std::process::{Command, ExitCode};
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use tictac_hal::SimPlayground;
use tictac_perception::{CellLayout, ShadeClassifier, VisionObserver};
use tictac_runtime::{ActionValueTable, GameController, init_tracing};
use tictac_types::PlaygroundError;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "tictac", version, about = "Robot tic-tac-toe playground")]
struct Cli {
    /// Also write JSON log lines to this file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Write the effective configuration to ~/.tictac/config.toml and exit.
    #[arg(long)]
    init_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    print_banner();

    // Held until exit so pending spans are flushed.
    let _guard = match init_tracing("tictac", cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}: {e}", "Logging error".red());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = ctrlc::set_handler(|| {
        println!();
        println!("{}", "⚠  Ctrl-C received – leaving the playground.".yellow().bold());
        std::process::exit(130);
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler");
    }

    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("{}: {e}", "Config error".red());
            return ExitCode::FAILURE;
        }
    };

    if cli.init_config {
        return match config::save(&cfg) {
            Ok(()) => {
                println!(
                    "  {} Config saved to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                println!("{}: {e}", "Error saving config".red());
                ExitCode::FAILURE
            }
        };
    }

    match run(&cfg) {
        Ok(never) => match never {},
        Err(e) => {
            error!(error = %e, fatal = e.is_fatal(), "playground stopped");
            if matches!(e, PlaygroundError::CameraStalled { .. }) {
                request_reboot(cfg.reboot_command.as_deref());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cfg: &config::Config) -> Result<Infallible, PlaygroundError> {
    let controller_cfg = cfg.controller()?;
    let table = Arc::new(ActionValueTable::load(&cfg.value_table)?);

    let sim = SimPlayground::new(cfg.simulation());
    let mut observer = VisionObserver::new(sim.camera(), ShadeClassifier, CellLayout::grid(1, 1))
        .with_gaze(sim.head(), cfg.gaze_settle());
    observer.verify_layout()?;
    let mut controller = GameController::new(sim.robot(), Box::new(observer), table, controller_cfg);

    controller.setup()?;
    info!(value_table = %cfg.value_table.display(), "playground ready");
    println!("  {}\n", "Clear the board to start a game.".bold());
    controller.run_forever()
}

/// Hand the robot over to the configured reboot command.
fn request_reboot(command: Option<&str>) {
    let Some(command) = command else {
        warn!("camera stalled and no reboot command is configured");
        return;
    };
    warn!(command, "camera stalled; requesting a reboot");
    match Command::new("sh").arg("-c").arg(command).status() {
        Ok(status) if status.success() => info!("reboot command accepted"),
        Ok(status) => error!(%status, "reboot command failed"),
        Err(e) => error!(error = %e, "could not run the reboot command"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   _   _      _               _             "#.bold().cyan());
    println!("{}", r#"  | |_(_) ___| |_ __ _  ___  | |_ ___   ___ "#.bold().cyan());
    println!("{}", r#"  | __| |/ __| __/ _` |/ __| | __/ _ \ / _ \"#.bold().cyan());
    println!("{}", r#"  | |_| | (__| || (_| | (__  | || (_) |  __/"#.bold().cyan());
    println!("{}", r#"   \__|_|\___|\__\__,_|\___|  \__\___/ \___|"#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "tictac".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Robot tic-tac-toe playground");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn log_file_flag_parses() {
        let cli = Cli::try_parse_from(["tictac", "--log-file", "/tmp/games.log"]).unwrap();
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/games.log")));
        assert!(!cli.init_config);
    }

    #[test]
    fn missing_value_table_fails_before_playing() {
        let cfg = config::Config {
            value_table: PathBuf::from("/nonexistent/q_values.json"),
            ..config::Config::default()
        };
        assert!(matches!(run(&cfg), Err(PlaygroundError::ValueTable(_))));
    }

    #[test]
    fn reboot_without_command_is_a_noop() {
        request_reboot(None);
        request_reboot(Some("true"));
    }
}
