//! Model simulation command.

use super::common::parse_bit_depth;
use barrido_config::ModelConfig;
use barrido_io::{read_wav, write_wav};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct SimulateArgs {
    /// Model configuration file (TOML)
    #[arg(short, long, value_name = "TOML")]
    model: PathBuf,

    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32", value_parser = parse_bit_depth)]
    bit_depth: u16,
}

pub fn run(args: SimulateArgs) -> anyhow::Result<()> {
    println!("Reading {}...", args.input.display());
    let input = read_wav(&args.input)?;
    println!(
        "  {} samples, {} channel(s), {} Hz",
        input.len(),
        input.channel_count(),
        input.sampling_rate()
    );

    let config = ModelConfig::load(&args.model)?;
    if !config.name.is_empty() {
        println!("Loading model: {}", config.name);
    }
    let model = config.build(input, args.model.parent())?;
    println!(
        "  {} branch(es), {:?} aliasing compensation, downsampling {:?}",
        model.branch_count(),
        model.aliasing_compensation(),
        model.downsampling_position()
    );

    let output = model.output();
    if args.bit_depth != 32 && output.peak() > 1.0 {
        tracing::warn!(peak = output.peak(), "output exceeds full scale and will clip");
    }
    write_wav(&args.output, output, args.bit_depth)?;
    println!("Wrote {} samples to {}", output.len(), args.output.display());

    Ok(())
}
