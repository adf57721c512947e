//! Sweep response deconvolution command.

use super::common::{SweepArgs, harmonic_path, parse_bit_depth};
use barrido_analysis::NovakSweep;
use barrido_io::{read_wav, write_wav};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct DeconvolveArgs {
    /// Recorded or simulated response to the sweep
    #[arg(value_name = "RESPONSE")]
    pub response: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    #[command(flatten)]
    pub sweep: SweepArgs,

    /// Split into this many harmonic impulse responses (OUTPUT_h1, OUTPUT_h2, ...)
    #[arg(long)]
    pub harmonics: Option<usize>,

    /// Length of each harmonic impulse response in samples
    #[arg(long, requires = "harmonics")]
    pub ir_length: Option<usize>,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32", value_parser = parse_bit_depth)]
    pub bit_depth: u16,
}

/// Samples between the two highest harmonics, so that no cut overlaps the next.
fn default_ir_length(sweep: &NovakSweep, count: usize, buffer: usize) -> anyhow::Result<usize> {
    if count < 2 {
        return Ok(buffer / 2);
    }
    let gap = sweep.harmonic_offset(count)? - sweep.harmonic_offset(count - 1)?;
    Ok(((gap * sweep.sampling_rate()) as usize).clamp(1, buffer))
}

pub fn run(args: DeconvolveArgs) -> anyhow::Result<()> {
    let sweep = args.sweep.resolve()?.build()?;

    println!("Reading {}...", args.response.display());
    let response = read_wav(&args.response)?;
    let deconvolved = sweep.deconvolve(&response)?;
    println!("  deconvolved {} samples", deconvolved.len());

    let Some(count) = args.harmonics else {
        write_wav(&args.output, &deconvolved, args.bit_depth)?;
        println!("Wrote impulse response to {}", args.output.display());
        return Ok(());
    };

    let ir_length = match args.ir_length {
        Some(length) => length,
        None => default_ir_length(&sweep, count, deconvolved.len())?,
    };
    let responses = sweep.harmonic_impulse_responses(&deconvolved, count, ir_length)?;
    for (index, ir) in responses.iter().enumerate() {
        let order = index + 1;
        let path = harmonic_path(&args.output, order);
        write_wav(&path, ir, args.bit_depth)?;
        println!(
            "Wrote harmonic {order} ({} samples, advance {:.4}s) to {}",
            ir.len(),
            sweep.harmonic_offset(order)?,
            path.display()
        );
    }

    Ok(())
}
