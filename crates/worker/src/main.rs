use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use valgauge_core::ingest::pipeline::{parse_tickers, PipelineOptions, StockListPipeline};

mod report;

#[derive(Debug, Parser)]
#[command(name = "valgauge_worker")]
struct Args {
    /// Analyze the built-in sample snapshot instead of fetching live data.
    #[arg(long)]
    sample: bool,

    /// Comma-separated tickers. Defaults to STOCK_TICKERS or the built-in list.
    #[arg(long)]
    tickers: Option<String>,

    /// Skip peer lookups; industryAvgPE stays empty.
    #[arg(long)]
    no_peers: bool,

    #[arg(long)]
    no_logos: bool,

    /// Keep tickers that have a PE but no price/book ratio.
    #[arg(long)]
    pe_only: bool,

    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = valgauge_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if args.sample {
        let scored = valgauge_core::domain::sample::sample_snapshot().analyze()?;
        tracing::info!(sample = true, "{}", report::summary_line(&scored));
        print_json(&scored, args.pretty)?;
        return Ok(());
    }

    let options = apply_args(PipelineOptions::from_env(), &args);
    let pipeline = match StockListPipeline::from_settings(&settings, options) {
        Ok(p) => p,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            return Err(err);
        }
    };

    let items = pipeline.run().await;
    if items.is_empty() {
        tracing::warn!(
            requested = pipeline.options().tickers.len(),
            "no ticker produced usable data"
        );
    }

    let reports = report::build_reports(items);
    for r in &reports {
        match &r.analysis {
            Some(scored) => tracing::info!("{}", report::summary_line(scored)),
            None => tracing::info!(ticker = %r.item.ticker, "no industry benchmark; not scored"),
        }
    }

    print_json(&reports, args.pretty)
}

fn apply_args(mut options: PipelineOptions, args: &Args) -> PipelineOptions {
    if let Some(s) = args.tickers.as_deref() {
        let tickers = parse_tickers(s);
        if !tickers.is_empty() {
            options.tickers = tickers;
        }
    }
    if args.no_peers {
        options.peer_averaging = false;
    }
    if args.no_logos {
        options.logo_resolution = false;
    }
    if args.pe_only {
        options.require_pb = false;
    }
    options
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn init_sentry(settings: &valgauge_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
