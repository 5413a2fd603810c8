//! pulse - four-part drum machine in the terminal
//!
//! Run with: cargo run -- [kit.json]

mod app;
mod sequencer;

use std::path::PathBuf;

use app::Pulse;
use sequencer::Pattern;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let kit = std::env::args_os().nth(1).map(PathBuf::from);

    // KICK, SNARE, HAT, PERC
    let groove = Pattern::parse([
        "X.....x...X.....",
        "....X.......X..x",
        "x.x.x.x.x.x.x.xX",
        "..........x.....",
    ]);

    Pulse::new(groove).bpm(112.0).kit(kit).run()
}
