use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use anyhow::bail;
use chrono::Utc;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};

use tipster::model::{Analyst, Config, FixtureInput};
use tipster::print;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// JSON file containing the fixture inputs
    #[clap(short = 'f', long)]
    file: PathBuf,

    /// seed for a reproducible run; drawn from the clock when omitted
    #[clap(long)]
    seed: Option<u64>,

    /// number of Monte Carlo trials per fixture
    #[clap(short = 't', long)]
    trials: Option<u64>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if let Some(trials) = self.trials {
            if trials == 0 {
                bail!("trials must be nonzero");
            }
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let mut config = Config::default();
    if let Some(trials) = args.trials {
        config.tesseract.trials = trials;
    }
    let analyst = Analyst::try_from(config)?;

    let contents = fs::read_to_string(&args.file)?;
    let inputs: Vec<FixtureInput> = serde_json::from_str(&contents)?;
    let seed = args
        .seed
        .unwrap_or_else(|| Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64);
    info!("analysing {} fixture(s) with seed {seed}", inputs.len());

    let renderer = Console::default();
    for input in &inputs {
        match analyst.analyse(input, seed, None) {
            Ok(analysis) => {
                println!("{}", renderer.render(&print::tabulate_summary(&analysis)));
                if let Some(tesseract) = &analysis.oracle.tesseract {
                    println!("{}", renderer.render(&print::tabulate_outcomes(tesseract)));
                    println!("{}", renderer.render(&print::tabulate_scores(tesseract)));
                }
                println!("{}", renderer.render(&print::tabulate_staking(&analysis.kelly)));
            }
            Err(err) => {
                warn!(
                    "skipping {} vs {}: {err}",
                    input.fixture.home_team, input.fixture.away_team
                );
            }
        }
    }
    Ok(())
}
