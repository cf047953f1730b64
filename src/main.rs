use clap::Parser;
use std::error::Error;

use key_bridge::bridge::SerialBridge;
use key_bridge::cli::{handle_config_action, list_ports, Args, Command};
use key_bridge::config::{Config, SerialConfig};
use key_bridge::keys::KeyState;
use key_bridge::serial;
use key_bridge::shutdown::{setup_ctrlc_handler, ShutdownSignal};
use key_bridge::tracker::InputTracker;

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    match args.command {
        Some(Command::ListPorts) => return list_ports(),
        Some(Command::Config { ref action }) => {
            return handle_config_action(action.clone(), args.config.as_deref());
        }
        None => {}
    }

    let mut config = Config::load(args.config.as_deref())?;
    args.apply_overrides(&mut config.serial);
    config.serial.validate()?;

    let shutdown = ShutdownSignal::new();
    setup_ctrlc_handler(&shutdown)?;

    let keys = KeyState::new();
    let mut tracker = InputTracker::new(keys.clone(), shutdown.clone());
    tracker.start()?;

    let port = serial::open(&config.serial)?;
    print_banner(&config.serial);

    let mut bridge = SerialBridge::new(port, keys, &config.serial);
    bridge.run(&shutdown)?;
    Ok(())
}

fn print_banner(serial: &SerialConfig) {
    println!();
    println!("┌─────────────────────────────────────────┐");
    println!("│         key-bridge v{:<20}│", env!("CARGO_PKG_VERSION"));
    println!("├─────────────────────────────────────────┤");
    println!("│  Port:     {:<29}│", serial.port);
    println!("│  Baud:     {:<29}│", serial.baud_rate);
    println!(
        "│  Timeouts: {:<29}│",
        format!("read {}ms, write {}ms", serial.read_timeout_ms, serial.write_timeout_ms)
    );
    println!("├─────────────────────────────────────────┤");
    println!("│  KEYS                                   │");
    println!("│    W/A/S/D  Move                        │");
    println!("│    Z, X     Modifier flags              │");
    println!("│    Esc      Quit                        │");
    println!("└─────────────────────────────────────────┘");
    println!();
}
