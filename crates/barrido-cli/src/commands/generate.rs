//! Sweep and inverse filter generation command.

use super::common::{SweepArgs, parse_bit_depth};
use barrido_io::write_wav;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args)]
pub struct GenerateArgs {
    #[command(subcommand)]
    command: GenerateCommand,
}

#[derive(Subcommand)]
enum GenerateCommand {
    /// Generate a synchronized exponential sweep
    Sweep {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        #[command(flatten)]
        sweep: SweepArgs,

        /// Output bit depth (16, 24, or 32)
        #[arg(long, default_value = "32", value_parser = parse_bit_depth)]
        bit_depth: u16,

        /// Also write the effective sweep configuration to this TOML file
        #[arg(long, value_name = "TOML")]
        save_config: Option<PathBuf>,
    },

    /// Generate the analytic inverse filter of a sweep
    Inverse {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        #[command(flatten)]
        sweep: SweepArgs,

        /// Filter length in samples (defaults to the sweep's length)
        #[arg(long)]
        filter_length: Option<usize>,

        /// Output bit depth (16, 24, or 32)
        #[arg(long, default_value = "32", value_parser = parse_bit_depth)]
        bit_depth: u16,
    },
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    match args.command {
        GenerateCommand::Sweep {
            output,
            sweep,
            bit_depth,
            save_config,
        } => {
            let config = sweep.resolve()?;
            let generator = config.build()?;

            println!("Generating {:?} sweep...", generator.phase());
            println!(
                "  {} Hz to {} Hz, L = {:.6}s",
                generator.start_frequency(),
                generator.stop_frequency(),
                generator.excitation_rate()?
            );

            let signal = generator.generate()?;
            write_wav(&output, &signal, bit_depth)?;
            println!(
                "Wrote {} samples ({:.3}s) to {}",
                signal.len(),
                signal.duration(),
                output.display()
            );

            if let Some(path) = save_config {
                config.save(&path)?;
                println!("Saved sweep configuration to {}", path.display());
            }
        }

        GenerateCommand::Inverse {
            output,
            sweep,
            filter_length,
            bit_depth,
        } => {
            let generator = sweep.resolve()?.build()?;

            println!("Generating inverse of {:?} sweep...", generator.phase());
            let signal = generator.generate_inverse(filter_length)?;
            if bit_depth != 32 && signal.peak() > 1.0 {
                tracing::warn!(
                    peak = signal.peak(),
                    "inverse filter exceeds full scale and will clip at {bit_depth} bits"
                );
            }

            write_wav(&output, &signal, bit_depth)?;
            println!("Wrote {} samples to {}", signal.len(), output.display());
        }
    }

    Ok(())
}
