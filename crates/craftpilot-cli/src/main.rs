//! `craftpilot` – run the model-driven control loop headlessly.
//!
//! 1. Loads `~/.craftpilot/config.toml`, writing defaults on first run.
//! 2. Probes the inference endpoint and lists its models.
//! 3. Drives an [`AgentLoop`] over a simulated world at the configured tick
//!    rate until Ctrl-C.

mod config;
mod driver;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use craftpilot_perception::SimWorld;
use craftpilot_runtime::{AgentLoop, InferenceClient};
use tracing::{error, warn};

fn main() {
    let _telemetry = craftpilot_runtime::init_tracing("craftpilot");

    print_banner();

    // ── Ctrl-C ────────────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping the tick driver …".yellow().bold());
        shutdown_flag.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler");
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    };

    // ── Runtime + inference client ────────────────────────────────────────
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("craftpilot-io")
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "Failed to start tokio runtime");
            std::process::exit(1);
        }
    };

    let client = match cfg.request_timeout() {
        Some(timeout) => InferenceClient::with_timeout(&cfg.inference_url, &cfg.model, timeout),
        None => Ok(InferenceClient::new(&cfg.inference_url, &cfg.model)),
    };
    let client = match client {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build inference client");
            std::process::exit(1);
        }
    };

    print!("\n  Probing {} … ", cfg.inference_url.dimmed());
    match runtime.block_on(client.list_models()) {
        Ok(models) => {
            println!("{} ({} model(s) available)", "online".green(), models.len());
            for m in &models {
                println!("    • {}", m.name.bold());
            }
            if !models.iter().any(|m| m.name.split(':').next() == Some(cfg.model.as_str())) {
                warn!(model = %cfg.model, "configured model not listed by the endpoint");
            }
        }
        Err(e) => {
            println!("{}", "offline".yellow());
            warn!(error = %e, "inference endpoint unreachable; cycles will fail until it is up");
        }
    }

    // ── Tick driver ───────────────────────────────────────────────────────
    let world = Arc::new(SimWorld::new());
    let effector = Arc::new(driver::WorldEffector::new(world.clone()));
    let mut agent = AgentLoop::new(
        cfg.loop_config(),
        Arc::new(client),
        effector,
        runtime.handle().clone(),
    );

    println!(
        "\n  Driving at {} Hz with model {}.  Press {} to stop.\n",
        cfg.tick_rate_hz,
        cfg.model.bold(),
        "Ctrl-C".bold().cyan()
    );
    let stats = driver::run(&mut agent, &world, cfg.tick_rate_hz, &shutdown, None);

    let pos = world.pose().position;
    println!(
        "  {} {} ticks, {} cycles; player at x={:.2}, y={:.2}, z={:.2}",
        "✓".green().bold(),
        stats.ticks,
        stats.cycles_started,
        pos.x,
        pos.y,
        pos.z
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ___           __ _         _ _     _   "#.bold().green());
    println!("{}", r#"  / __|_ _ __ _ / _| |_ _ __ (_) |___| |_ "#.bold().green());
    println!("{}", r#" | (__| '_/ _` |  _|  _| '_ \| | / _ \  _|"#.bold().green());
    println!("{}", r#"  \___|_| \__,_|_|  \__| .__/|_|_\___/\__|"#.bold().green());
    println!("{}", r#"                       |_|                "#.bold().green());
    println!();
    println!(
        "  {} {}",
        "craftpilot".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  A language model at the controls of a Minecraft player");
    println!();
}
