use anyhow::Result;
use clap::Parser;
use log::info;
use qtrade::trader::{evaluate, train, TraderConfig};
use qtrade_core::record::LogRecorder;
use std::path::Path;

/// Train/eval DQN trader on a price series
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Configuration file in YAML. Default configuration is used if not given
    #[arg(short, long)]
    config: Option<String>,

    /// CSV file with a `close` column, overriding the prices of the configuration
    #[arg(short, long)]
    prices: Option<String>,

    /// Train the agent, not evaluate
    #[arg(short, long, default_value_t = false)]
    train: bool,

    /// Evaluate the agent, not train
    #[arg(short, long, default_value_t = false)]
    eval: bool,

    /// Directory where models are saved
    #[arg(short, long, default_value = "./model/trader")]
    model_dir: String,

    /// Number of optimization steps, overriding the configuration
    #[arg(long)]
    max_opts: Option<usize>,
}

fn config(args: &Args) -> Result<TraderConfig> {
    let mut config = match &args.config {
        Some(path) => TraderConfig::load(path)?,
        None => TraderConfig::default(),
    };
    if let Some(path) = &args.prices {
        config.env_config = config.env_config.csv(path.as_str());
    }
    if let Some(max_opts) = args.max_opts {
        config.trainer_config = config.trainer_config.max_opts(max_opts);
    }
    config.trainer_config = config.trainer_config.model_dir(args.model_dir.as_str());
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = config(&args)?;
    let best = Path::new(&args.model_dir).join("best");

    if args.train || !args.eval {
        let mut recorder = LogRecorder::new();
        train(&config, &mut recorder)?;
        info!("Models are saved in {}", args.model_dir);
    }
    if args.eval || !args.train {
        let record = evaluate(&config, &best)?;
        info!("eval_net_worth = {}", record.get_scalar("eval_net_worth")?);
    }

    Ok(())
}
