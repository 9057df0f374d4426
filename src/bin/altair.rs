/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use altair_8080::bus::Pacing;
use altair_8080::panel::HANDOFF_TIMEOUT;
use altair_8080::{Altair, MachineConfig, Memory};
use anyhow::{bail, Context};
use clap::{ArgAction, Parser};
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "altair",
    about = "Runs a memory image on an 8080 behind an Altair front panel until it halts."
)]
struct Args {
    /// Binary image to load.
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Address the image is loaded at (hex with 0x, or decimal).
    #[arg(long, value_name = "ADDR", value_parser = parse_address, default_value = "0")]
    load: u16,

    /// Address to examine before running. Defaults to the load address.
    #[arg(long, value_name = "ADDR", value_parser = parse_address)]
    start: Option<u16>,

    /// Front panel switches while the program runs. The high byte answers IN 0FFh.
    #[arg(long, value_name = "BITS", value_parser = parse_address, default_value = "0")]
    switches: u16,

    /// Run as fast as possible instead of at 2 MHz.
    #[arg(long, default_value_t = false)]
    unpaced: bool,

    /// Duration of one bus state when paced.
    #[arg(long, value_name = "NS", default_value_t = 500)]
    state_ns: u64,

    /// Give up waiting for HLT after this long.
    #[arg(long, value_name = "MS", default_value_t = 5_000)]
    timeout_ms: u64,

    /// More log output, repeat for more.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_address(text: &str) -> Result<u16, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => text.parse::<u16>(),
    };
    parsed.map_err(|e| format!("'{}' is not a 16 bit address: {}", text, e))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let image = fs::read(&args.image)
        .with_context(|| format!("could not read {}", args.image.display()))?;
    let memory = Memory::with_image(args.load, &image)
        .with_context(|| format!("could not load {}", args.image.display()))?;
    info!("loaded {} bytes at {:#06x}", image.len(), args.load);

    let pacing = if args.unpaced {
        Pacing::Unpaced
    } else {
        Pacing::RealTime(Duration::from_nanos(args.state_ns))
    };
    let mut altair = Altair::new(memory, MachineConfig { pacing, switches: 0, start_running: false });
    altair.start()?;

    let panel = altair.panel().clone();
    if !panel.wait_until_held(HANDOFF_TIMEOUT) {
        bail!("the core never stalled after power on");
    }
    let start = args.start.unwrap_or(args.load);
    if start != 0 {
        panel.set_switches(start);
        if !panel.examine() {
            bail!("could not examine {:#06x}", start);
        }
    }
    panel.set_switches(args.switches);
    panel.run();

    let halted = panel.wait_until_halted(Duration::from_millis(args.timeout_ms));
    if !halted {
        warn!("no HLT after {} ms, stopping", args.timeout_ms);
    }
    let core = altair.shutdown()?;

    let registers = core.registers();
    let flags = core.flags();
    println!("{}", if halted { "halted" } else { "timed out" });
    println!(
        "A={:02x} B={:02x} C={:02x} D={:02x} E={:02x} H={:02x} L={:02x} SP={:04x} PC={:04x}",
        registers.a, registers.b, registers.c, registers.d, registers.e,
        registers.h, registers.l, registers.sp, registers.pc
    );
    println!(
        "S={} Z={} AC={} P={} CY={}",
        flags.s as u8, flags.z as u8, flags.ac as u8, flags.p as u8, flags.cy as u8
    );
    println!(
        "{} instructions, {} machine cycles, {} states",
        core.instructions(), core.machine_cycles(), core.states()
    );
    Ok(())
}
