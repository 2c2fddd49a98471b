//! # Semi HAL Binary
//!
//! Runs the robot program against the simulation driver layer: one match of
//! disabled, autonomous, teleop and disabled periods. Autonomous drives the
//! delivery route for the chosen starting position; teleop drives from a
//! scripted gamepad.
//!
//! # Usage
//!
//! ```bash
//! # Defaults (missing config file falls back to built-in ports)
//! semi_hal
//!
//! # Custom config, short periods, verbose
//! semi_hal --config config/robot.toml --cycles 10 --period-ms 5 -v
//!
//! # Start on the left with the near switch lit on the left
//! semi_hal --alliance left --plates LLR
//!
//! # Print the bound ports as JSON at exit
//! semi_hal --dump-ports --json
//! ```

use clap::Parser;
use semi_common::collab::{Command, DriverStation, GamepadState, TelemetryStore};
use semi_common::config::RobotConfig;
use semi_common::consts::{DEFAULT_CONFIG_PATH, DEFAULT_PERIOD_MS};
use semi_hal::dashboard::keys;
use semi_hal::drivers::simulation::{
    CommandScheduler, DrivePhysics, MemoryTelemetry, SimCamera, SimDriverStation, SimGamepad,
};
use semi_hal::util::ValueGradient;
use semi_hal::{
    AllianceSide, AutoDeliver, CameraSetup, Dashboard, Drivetrain, HardwareContext, OperatorControl, Ramp, Robot,
    RobotMode, SensorFeed, Sensors,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Semi HAL - robot program on the simulated hardware layer
#[derive(Parser, Debug)]
#[command(name = "semi_hal")]
#[command(version)]
#[command(about = "Robot program running a simulated match")]
#[command(long_about = None)]
struct Args {
    /// Path to robot configuration file (robot.toml)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Periodic cycles to run in each mode
    #[arg(long, default_value_t = 50)]
    cycles: u32,

    /// Control period in milliseconds
    #[arg(long, default_value_t = DEFAULT_PERIOD_MS)]
    period_ms: u64,

    /// Starting position picked on the autonomous chooser (left, centre, right)
    #[arg(long, default_value = "centre")]
    alliance: AllianceSide,

    /// FMS plate assignment sent before autonomous
    #[arg(long, default_value = "LRL")]
    plates: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    /// Log the bound ports as JSON before exiting
    #[arg(long)]
    dump_ports: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("Robot startup failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logging is up before a configuration error is returned.
    let loaded = RobotConfig::load_or_default(&args.config);
    let level = loaded
        .as_ref()
        .map_or(Level::INFO, |config| config.shared.log_level.into());
    setup_tracing(&args, level);
    let config = loaded?;

    info!("Semi HAL v{} starting...", env!("CARGO_PKG_VERSION"));
    config.validate()?;
    info!("Configuration loaded from {:?}", args.config);

    let period = Duration::from_millis(args.period_ms);

    // Hardware and external services.
    let hw = Arc::new(HardwareContext::new(config.limits));
    let telemetry = Arc::new(MemoryTelemetry::new());
    let dashboard = Dashboard::new(telemetry.clone());
    let driver_station = Arc::new(SimDriverStation::new());
    let gamepad = Arc::new(SimGamepad::new());
    let scheduler = Arc::new(CommandScheduler::with_period(period));

    // Subsystems share the context; a port conflict here is fatal.
    let drivetrain = Arc::new(Drivetrain::new(&hw, &config.ports)?);
    let ramp = Arc::new(Ramp::new(&hw, &config.ports)?);
    let sensors = Sensors::new();
    let gyro = Arc::clone(sensors.gyro());
    let physics = DrivePhysics::default();

    telemetry.put_string(keys::CHOOSER_AUTONOMOUS, args.alliance.chooser_label());
    dashboard.put_string(0, &format!("Auto: {}", args.alliance))?;
    let turn_gradient = ValueGradient::new(0.6, 0.3, 45.0, 5.0)?;

    let autonomous = {
        let telemetry = telemetry.clone();
        let (drivetrain, gyro, ramp) = (drivetrain.clone(), gyro.clone(), ramp.clone());
        move |plates: &semi_hal::game::PlateAssignment| -> Box<dyn Command> {
            let side = telemetry
                .get_string(keys::CHOOSER_AUTONOMOUS, None)
                .and_then(|label| AllianceSide::from_chooser(&label))
                .unwrap_or_default();
            Box::new(
                AutoDeliver::new(side)
                    .with_turn_gradient(turn_gradient)
                    .build(plates, &drivetrain, &gyro, &ramp),
            )
        }
    };

    let mut robot = Robot::new(
        scheduler.clone(),
        CameraSetup::new(Arc::new(SimCamera::new())),
        config.camera.clone(),
        driver_station.clone(),
    )
    .with_telemetry(telemetry.clone())
    .with_autonomous(autonomous)
    .with_operator_control(OperatorControl::new(
        gamepad.clone(),
        drivetrain.clone(),
        ramp.clone(),
        gyro.clone(),
        telemetry.clone(),
    ))
    .with_sensor_feed(SensorFeed::new(telemetry.clone(), drivetrain.clone(), gyro.clone()));

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            running.store(false, Ordering::SeqCst);
        })?;
    }

    robot.robot_init();

    let phases = [
        RobotMode::Disabled,
        RobotMode::Autonomous,
        RobotMode::Teleop,
        RobotMode::Disabled,
    ];
    for (index, mode) in phases.into_iter().enumerate() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        match (index, mode) {
            // The field sends the plate assignment shortly before autonomous.
            (0, RobotMode::Disabled) => driver_station.set_game_specific_message(Some(args.plates.as_str())),
            // Driver pushes forward holding the heading, ramp running.
            (_, RobotMode::Teleop) => gamepad.set_state(GamepadState {
                left_y: -0.6,
                right_trigger: 0.8,
                x: true,
                ..GamepadState::default()
            }),
            _ => {}
        }

        robot.set_mode(mode);
        run_cycles(&mut robot, args.cycles, period, &running, || {
            physics.step(&drivetrain, &gyro, period);
        });
    }

    let stopped = hw.stop_all_motors();
    info!("Stopped {} motor controllers", stopped);

    info!(
        "Match complete: plates {}, scheduler passes {}, distance {:.3} m, heading {:.1} deg",
        robot
            .plate_assignment()
            .map_or_else(|| "none".to_string(), |p| p.to_string()),
        scheduler.passes(),
        drivetrain.distance(),
        gyro.angle(),
    );
    if let Some(message) = driver_station.game_specific_message() {
        info!("Last FMS message: {}", message);
    }

    let report = hw.port_report();
    info!("{} ports bound", report.len());
    if args.dump_ports {
        info!("Port report: {}", report.to_json()?);
    }

    info!("Semi HAL shutdown complete");
    Ok(())
}

/// Run `cycles` control periods in the current mode, stepping the
/// simulation after each.
fn run_cycles(robot: &mut Robot, cycles: u32, period: Duration, running: &AtomicBool, simulate: impl Fn()) {
    for _ in 0..cycles {
        if !running.load(Ordering::SeqCst) {
            return;
        }
        robot.periodic();
        simulate();
        std::thread::sleep(period);
    }
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: Level) {
    let level = if args.verbose { Level::DEBUG } else { configured };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
