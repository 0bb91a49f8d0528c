use anyhow::Context;
use clap::Parser;

mod error;
mod model;
mod render;
mod runner;
mod testlog;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "gas-report")]
#[command(about = "Gas comparison table from forge test logs", long_about = None)]
struct Cli {
    /// Fork RPC url; runs `forge clean && forge test --fork-url <rpc> -vv`.
    #[arg(long, required_unless_present = "log", conflicts_with = "log")]
    rpc: Option<String>,

    /// Read a captured `forge test -vv` output instead of running forge.
    #[arg(long)]
    log: Option<String>,

    /// Forge project directory.
    #[arg(long)]
    project: Option<std::path::PathBuf>,

    #[arg(short = 'o', long, default_value = "gas-report.html")]
    out: String,

    /// Also write the aggregated table as JSON.
    #[arg(long)]
    json: Option<String>,

    #[arg(long, value_enum, default_value_t = model::CallMode::Unfiltered)]
    call_mode: model::CallMode,

    #[arg(long, value_enum, default_value_t = render::PercentMode::AboveMinimum)]
    percent: render::PercentMode,

    /// Color of the cheapest market in a row (#rrggbb).
    #[arg(long, default_value = "#00ff00")]
    low_color: render::Rgb,

    /// Color of the most expensive market in a row (#rrggbb).
    #[arg(long, default_value = "#ff0000")]
    high_color: render::Rgb,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // 1) Obtain the raw test output.
    let measurements = match (&cli.log, &cli.rpc) {
        (Some(path), _) => testlog::parse_log_file(path)?,
        (None, rpc) => {
            let runner = runner::ForgeRunner {
                project: cli.project.clone(),
                ..runner::ForgeRunner::new(rpc.clone().unwrap_or_default())
            };
            let stdout = runner.run()?;
            // 2) Parse.
            testlog::parse_output(&stdout)?
        }
    };
    log::info!("parsed {} measurements", measurements.len());

    // 3) Aggregate.
    let table = model::aggregate(measurements, cli.call_mode);
    log::info!(
        "{} markets, {} tests",
        table.market_count(),
        table.test_names().len()
    );

    if let Some(path) = &cli.json {
        let json = serde_json::to_string_pretty(&table)?;
        std::fs::write(path, json).with_context(|| format!("write {}", path))?;
        log::info!("Wrote {}", path);
    }

    // 4) Render HTML.
    let opts = render::RenderOptions {
        colors: render::ColorScale {
            low: cli.low_color,
            high: cli.high_color,
        },
        percent: cli.percent,
    };
    let html = render::render_html_report(&table, &opts)?;
    std::fs::write(&cli.out, html).with_context(|| format!("write {}", cli.out))?;
    log::info!("Wrote {}", cli.out);

    Ok(())
}
