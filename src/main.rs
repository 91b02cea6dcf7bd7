use std::str::FromStr;
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use clap::Parser;

use prologic_bridge::{Bridge, Key};

/// Watches a ProLogic pool controller bus and prints status snapshots.
#[derive(Parser, Debug)]
struct Args {
    /// Serial port the RS-485 adapter is attached to
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,

    /// Queue a simulated key press once the bridge is running (Lights or Filter)
    #[arg(short = 'k', long)]
    press: Option<String>,

    /// Seconds between printed status snapshots
    #[arg(short, long, default_value_t = 5)]
    interval: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let press = args
        .press
        .as_deref()
        .map(Key::from_str)
        .transpose()
        .map_err(|_| anyhow!("unknown key; expected Lights or Filter"))?;

    let mut bridge = Bridge::new(&args.port);
    bridge.start()?;

    if let Some(key) = press {
        bridge.press_key(key)?;
    }

    loop {
        thread::sleep(Duration::from_secs(args.interval));
        let snapshot = bridge.status()?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
}
