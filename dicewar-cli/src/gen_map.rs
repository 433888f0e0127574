//! Gen-map command - generate and save a random map

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use dicewar_core::{Map, PlayerId};

#[derive(Args)]
pub struct GenMapArgs {
    /// Output JSON file
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,

    /// Grid width in regions
    #[arg(long, default_value = "5")]
    pub width: usize,

    /// Grid height in regions
    #[arg(long, default_value = "4")]
    pub height: usize,

    /// Number of players
    #[arg(long, default_value = "4")]
    pub players: u8,

    /// Map name stored in the file
    #[arg(long, default_value = "arena")]
    pub name: String,
}

pub fn run(args: GenMapArgs, seed: Option<u64>) -> Result<()> {
    if args.players < 2 {
        bail!("a map needs at least two players");
    }
    if args.width * args.height < args.players as usize {
        bail!(
            "{}x{} grid cannot seat {} players",
            args.width,
            args.height,
            args.players
        );
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed.unwrap_or_else(rand::random));
    let players: Vec<PlayerId> = (1..=args.players).collect();
    let map = Map::random_grid(&mut rng, args.width, args.height, &players, &args.name);
    map.to_board().context("generated map failed validation")?;
    map.save(&args.output)
        .with_context(|| format!("failed to save map: {}", args.output.display()))?;

    tracing::info!(
        "Saved {}x{} map '{}' to {}",
        args.width,
        args.height,
        args.name,
        args.output.display()
    );
    Ok(())
}
