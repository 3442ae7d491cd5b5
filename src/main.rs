//! gpioctl
//!
//! Command-line access to BCM2835-family GPIO pins through the register
//! window.
//!
//! # Usage
//!
//! ```bash
//! # List supported chips
//! gpioctl chips
//!
//! # Drive GPIO 17 high on a Pi 3 without root
//! gpioctl --chip pi3 --gpiomem mode 17 out
//! gpioctl --chip pi3 --gpiomem write 17 high
//!
//! # Enable the pull-up on GPIO 4 and read it
//! sudo gpioctl pull 4 up
//! sudo gpioctl read 4
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use bcm2835_gpio::{Access, Chip, Config, Direction, Level, Manager, Pull};

/// BCM2835 GPIO control
#[derive(Parser, Debug)]
#[command(name = "gpioctl")]
#[command(version = "0.1.0")]
#[command(about = "Direct register GPIO control for BCM2835-family SoCs")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Chip variant or board (bcm2835, bcm2836, bcm2837, pi1, pi2, pi3, zero)
    #[arg(long, global = true)]
    chip: Option<Chip>,

    /// Map /dev/gpiomem instead of /dev/mem
    #[arg(long, global = true)]
    gpiomem: bool,

    /// Memory device override
    #[arg(long, global = true)]
    device: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List supported chip variants
    Chips,

    /// Set a pin's direction
    Mode {
        pin: u8,
        /// in | out
        direction: Direction,
    },

    /// Drive an output pin
    Write {
        pin: u8,
        /// high | low
        level: Level,
    },

    /// Read a pin's level
    Read { pin: u8 },

    /// Configure the pull resistor
    Pull {
        pin: u8,
        /// up | down | off
        pull: Pull,
    },

    /// Show a pin's function-select setting
    Function { pin: u8 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Commands::Chips = cli.command {
        print_chips();
        return Ok(());
    }

    let config = build_config(&cli)?;
    let gpio = Manager::open_with(&config).with_context(|| {
        format!(
            "Failed to map GPIO registers via {}",
            config.device_path().display()
        )
    })?;

    let outcome = run(&gpio, &cli.command);
    gpio.close().context("Failed to unmap GPIO registers")?;
    outcome
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(chip) = cli.chip {
        config = config.with_chip(chip);
    }
    if cli.gpiomem {
        config = config.with_access(Access::Gpiomem);
    }
    if let Some(device) = &cli.device {
        config = config.with_device(device);
    }
    Ok(config)
}

fn run(gpio: &Manager, command: &Commands) -> Result<()> {
    match *command {
        Commands::Chips => {}

        Commands::Mode { pin, direction } => {
            gpio.pin(pin)?.set_direction(direction);
            println!("{} GPIO {} set to {:?}", "[OK]".green().bold(), pin, direction);
        }

        Commands::Write { pin, level } => {
            gpio.pin(pin)?.set_value(level);
            println!("{} GPIO {} driven {}", "[OK]".green().bold(), pin, level);
        }

        Commands::Read { pin } => {
            let level = gpio.pin(pin)?.value();
            let shown = match level {
                Level::High => level.to_string().green().bold(),
                Level::Low => level.to_string().dimmed(),
            };
            println!("GPIO {}: {}", pin, shown);
        }

        Commands::Pull { pin, pull } => {
            gpio.pin(pin)?.set_pull(pull);
            println!("{} GPIO {} pull {:?}", "[OK]".green().bold(), pin, pull);
        }

        Commands::Function { pin } => {
            let function = gpio.pin(pin)?.function();
            println!("GPIO {}: {}", pin, function.to_string().cyan());
        }
    }

    Ok(())
}

fn print_chips() {
    println!("{}", "=".repeat(60));
    println!("{}", "Supported Chips".cyan().bold());
    println!("{}", "=".repeat(60));

    for chip in Chip::ALL {
        println!("\n  {}: {}", chip.name().white().bold(), chip.boards());
        println!("    Peripheral base: {:#010x}", chip.peripheral_base());
        println!("    GPIO base:       {:#010x}", chip.gpio_base());
        println!("    GPIOs:           0-{}", chip.max_pin());
    }

    println!("\n{}", "=".repeat(60));
}
