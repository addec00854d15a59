// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! CatGuard - Home Security Status Engine
//!
//! Command-line front end. Each invocation loads the persisted state, applies
//! one command and exits; `watch` keeps the engine alive and polls a camera.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use catguard::core::{EventPayload, SharedEngine};
use catguard::{
    ArmingStatus, CameraImage, CameraMonitor, Config, Database, EventBus, FakeImageClassifier,
    SecurityEngine, SecurityRepository, Sensor, SensorType, VERSION,
};

/// CatGuard - Home Security Status Engine
#[derive(Parser, Debug)]
#[command(name = "catguard")]
#[command(version = VERSION)]
#[command(about = "Alarm status engine driven by sensors, arming mode and a cat-spotting camera")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Data output directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show alarm status, arming status and sensors
    Status,

    /// Set the arming mode: disarmed, home or away
    Arm {
        mode: ArmingStatus,
    },

    /// Manage sensors
    Sensor {
        #[command(subcommand)]
        action: SensorAction,
    },

    /// Classify an image file and apply the result
    Camera {
        image: PathBuf,
    },

    /// Apply a classifier result directly
    CameraResult {
        #[arg(action = clap::ArgAction::Set)]
        cat_detected: bool,
    },

    /// Keep running, scanning the camera periodically
    Watch,
}

#[derive(Subcommand, Debug)]
enum SensorAction {
    /// Add a sensor
    Add {
        name: String,
        sensor_type: SensorType,
    },
    /// Remove a sensor
    Remove {
        name: String,
    },
    /// Mark a sensor active
    Activate {
        name: String,
    },
    /// Mark a sensor inactive
    Deactivate {
        name: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Configuration first: it carries the default log level
    let config_path = args.config.unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;
    if let Some(data_dir) = args.data_dir {
        config.set_data_dir(data_dir);
    }

    // Initialize logging
    let requested = config.log_filter(args.debug, args.trace);
    let (filter, filter_error) = match EnvFilter::try_new(requested) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new("info"), Some(e)),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(e) = filter_error {
        warn!("Invalid log level '{}' ({}), using info", requested, e);
    }
    info!("Configuration loaded from {:?}", config_path);

    let db = Database::open(&config.database_path())?;
    if config.demo_mode {
        seed_demo_sensors(&db)?;
    }

    let engine = SharedEngine::new(SecurityEngine::new(Arc::new(db))?);

    match args.command {
        Command::Status => print_status(&engine),
        Command::Arm { mode } => {
            engine.set_arming_status(mode);
            print_status(&engine);
        }
        Command::Sensor { action } => {
            run_sensor_action(&engine, action)?;
            print_status(&engine);
        }
        Command::Camera { image } => {
            let monitor = camera_monitor(&config);
            let frame = CameraImage::load(&image)?;
            let cat = monitor.scan(&engine, &frame);
            println!("Cat detected: {}", cat);
            print_status(&engine);
        }
        Command::CameraResult { cat_detected } => {
            engine.process_image_result(cat_detected);
            print_status(&engine);
        }
        Command::Watch => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_watch(engine, config))?;
        }
    }

    Ok(())
}

fn camera_monitor(config: &Config) -> CameraMonitor {
    CameraMonitor::new(
        Box::new(FakeImageClassifier::new()),
        config.camera.confidence_threshold,
    )
}

fn seed_demo_sensors(db: &Database) -> Result<()> {
    if !db.sensors()?.is_empty() {
        return Ok(());
    }

    info!("Adding demo sensors...");
    let demo_sensors = [
        ("Front door", SensorType::Door),
        ("Living room window", SensorType::Window),
        ("Hallway motion", SensorType::Motion),
    ];
    for (name, sensor_type) in demo_sensors {
        db.add_sensor(&Sensor::new(name, sensor_type))?;
    }
    Ok(())
}

fn run_sensor_action(engine: &SharedEngine, action: SensorAction) -> Result<()> {
    let find = |name: &str| -> Result<Sensor> {
        engine
            .lock()
            .find_sensor_by_name(name)
            .cloned()
            .ok_or_else(|| anyhow!("no sensor named '{}'", name))
    };

    match action {
        SensorAction::Add { name, sensor_type } => engine.add_sensor(Sensor::new(name, sensor_type)),
        SensorAction::Remove { name } => {
            let sensor = find(&name)?;
            engine.remove_sensor(&sensor);
        }
        SensorAction::Activate { name } => engine.change_sensor_activation(find(&name)?.id(), true)?,
        SensorAction::Deactivate { name } => engine.change_sensor_activation(find(&name)?.id(), false)?,
    }
    Ok(())
}

fn print_status(engine: &SharedEngine) {
    let engine = engine.lock();
    let alarm = engine.alarm_status();
    let arming = engine.arming_status();

    println!("Alarm:  {} ({})", alarm, alarm.description());
    println!("Arming: {} ({})", arming, arming.description());
    println!("Sensors:");
    for sensor in engine.sensors() {
        let state = if sensor.is_active() { "Active" } else { "Inactive" };
        println!("  {:<24} {:<8} {}", sensor.name(), sensor.sensor_type(), state);
    }
}

/// Poll the camera until Ctrl+C, logging every engine event
async fn run_watch(engine: SharedEngine, config: Config) -> Result<()> {
    let bus = Arc::new(EventBus::new(256));
    engine.add_status_listener(bus.clone());

    let mut events = bus.subscribe();
    let logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match event.payload {
                    EventPayload::AlarmStatus(status) => {
                        info!("Alarm status: {} - {}", status, status.description())
                    }
                    EventPayload::SensorsChanged => info!("Sensors reset"),
                    EventPayload::CatDetected(true) => info!("Cat spotted on camera"),
                    EventPayload::CatDetected(false) => info!("No cat on camera"),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Event logger lagged, skipped {} events", n)
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let monitor = camera_monitor(&config);
    let mut scan_interval = tokio::time::interval(Duration::from_secs(config.camera.scan_interval_secs.max(1)));

    info!("🐈 CatGuard v{} watching (threshold {:.0}%)", VERSION, monitor.confidence_threshold());
    info!("   Press Ctrl+C to shutdown");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = scan_interval.tick() => {
                // Synthetic frame; the fake classifier ignores pixel data
                let frame = CameraImage::new(vec![0u8; 64]);
                monitor.scan(&engine, &frame);
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    logger.abort();
    info!("CatGuard shutdown complete");
    Ok(())
}
