use anyhow::{Context, Result};
use bvh_mocap::parse::load_bvh_from_file_with;
use bvh_mocap::playback::{self, MotionSummary};
use bvh_mocap::{assemble_animation, baseball_skeleton, save_bvh_to_file, CaptureTable, Config, RangePolicy};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bvh-mocap")]
#[command(about = "Motion capture to .bvh converter and frame inspector")]
#[command(version)]
struct Cli {
    /// Optional TOML config (frame time, coordinate mapping, policies)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a pair of capture tables into a .bvh file
    Convert {
        /// Joint centres table
        centers: PathBuf,

        /// Joint rotations table
        rotations: PathBuf,

        /// Output .bvh file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seconds per frame (overrides config)
        #[arg(long)]
        frame_time: Option<f64>,
    },

    /// Print the hierarchy and timing of a .bvh file
    Inspect {
        /// Input .bvh file
        input: PathBuf,
    },

    /// Print the resolved joint transforms of one frame as JSON
    Frame {
        /// Input .bvh file
        input: PathBuf,

        /// Frame index
        index: usize,

        /// Out-of-range handling (overrides config)
        #[arg(short, long, value_enum)]
        policy: Option<PolicyArg>,
    },

    /// Print skeleton metadata and timing as JSON
    Summary {
        /// Input .bvh file
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Strict,
    Clamp,
    Wrap,
}

impl From<PolicyArg> for RangePolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Strict => RangePolicy::Strict,
            PolicyArg::Clamp => RangePolicy::Clamp,
            PolicyArg::Wrap => RangePolicy::Wrap,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path).with_context(|| format!("Failed to load config {:?}", path)),
        None => Ok(Config::default()),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert {
            centers,
            rotations,
            output,
            frame_time,
        } => {
            if let Some(frame_time) = frame_time {
                config.frame_time = frame_time;
            }
            config.validate()?;
            let output = output.unwrap_or_else(|| centers.with_extension("bvh"));
            tracing::info!("Converting {:?} + {:?} -> {:?}", centers, rotations, output);

            let centers = CaptureTable::load(&centers)
                .with_context(|| format!("Failed to read centres table {:?}", centers))?;
            let rotations = CaptureTable::load(&rotations)
                .with_context(|| format!("Failed to read rotations table {:?}", rotations))?;
            let animation = assemble_animation(baseball_skeleton(), &centers, &rotations, &config)?;
            save_bvh_to_file(&animation, &output)
                .with_context(|| format!("Failed to write {:?}", output))?;
            tracing::info!("Done!");
        }

        Commands::Inspect { input } => {
            let animation = load_bvh_from_file_with(&input, &config.parse_options())
                .with_context(|| format!("Failed to load {:?}", input))?;
            let skeleton = animation.skeleton();
            for joint in skeleton.iter() {
                let channels: Vec<&str> = joint.channels.iter().map(|channel| channel.as_str()).collect();
                println!(
                    "{}{} [{}]",
                    "  ".repeat(joint.depth),
                    joint.name,
                    channels.join(" ")
                );
            }
            println!(
                "{} joints, {} channels, {} frames, {:.3}s at {:.2} fps",
                skeleton.len(),
                skeleton.total_channels(),
                animation.frame_count(),
                animation.duration(),
                animation.frame_rate()
            );
        }

        Commands::Frame {
            input,
            index,
            policy,
        } => {
            let animation = load_bvh_from_file_with(&input, &config.parse_options())
                .with_context(|| format!("Failed to load {:?}", input))?;
            let policy = policy.map(RangePolicy::from).unwrap_or(config.range_policy);
            let snapshot = playback::snapshot(&animation, index, policy)?;
            println!("{}", playback::to_json(&snapshot)?);
        }

        Commands::Summary { input } => {
            let animation = load_bvh_from_file_with(&input, &config.parse_options())
                .with_context(|| format!("Failed to load {:?}", input))?;
            println!("{}", playback::to_json(&MotionSummary::from_animation(&animation))?);
        }
    }

    Ok(())
}
