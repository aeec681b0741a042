use std::io::Write;

use clap::Parser;
use futures::stream::{self, StreamExt};
use prayer_timings::{
    AppError, Config, Listing, TimingsClient, TimingsFetcher,
    config::{DEFAULT_ENDPOINT, Overrides},
    render,
};
use tracing::{Instrument, info, span};
use tracing_subscriber::EnvFilter;

/// How many addresses are fetched at the same time
const MAX_CONCURRENT_FETCHES: usize = 3;

#[derive(Parser, Debug)]
#[clap(name = "prayer-timings", version, about = "Today's prayer timings for an address")]
struct Cli {
    #[clap(
        short,
        long = "address",
        help = "Free-text address to look up; may be repeated. Defaults to $PRAYER_TIMINGS_ADDRESS"
    )]
    addresses: Vec<String>,

    #[clap(long, help = "API base URL (overrides $PRAYER_TIMINGS_ENDPOINT)", value_name = "URL")]
    endpoint: Option<String>,

    #[clap(long, help = "Request timeout in seconds (overrides $PRAYER_TIMINGS_TIMEOUT_SECS)")]
    timeout_secs: Option<u64>,

    #[clap(long, help = "Also list Imsak, Firstthird and Lastthird")]
    all: bool,

    #[clap(short, long, help = "Refetch on every line read from stdin until `exit`")]
    interactive: bool,
}

/// Resolves one configuration per address. Command-line values win over the
/// environment, which wins over the built-in defaults.
fn resolve_configs(cli: &Cli) -> Result<Vec<Config>, AppError> {
    let addresses: Vec<Option<String>> = if cli.addresses.is_empty() {
        vec![None]
    } else {
        cli.addresses.iter().cloned().map(Some).collect()
    };

    addresses
        .into_iter()
        .map(|address| {
            Config::from_env(&Overrides {
                address,
                endpoint: cli.endpoint.clone(),
                timeout_secs: cli.timeout_secs,
            })
        })
        .collect()
}

/// Initializes tracing, resolves the configuration and prints the timings for
/// every requested address. In interactive mode the single address is fetched
/// again on each line from stdin until the user sends `exit`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let listing = if cli.all { Listing::All } else { Listing::Displayed };
    let configs = resolve_configs(&cli)?;
    info!("Using endpoint {}", configs.first().map_or(DEFAULT_ENDPOINT, |c| c.endpoint.as_str()));

    let clients = configs
        .into_iter()
        .map(TimingsClient::new)
        .collect::<Result<Vec<_>, _>>()?;

    if cli.interactive {
        let mut clients = clients.into_iter();
        return match (clients.next(), clients.next()) {
            (Some(client), None) => interactive(client, listing).await,
            _ => Err(anyhow::anyhow!("--interactive takes exactly one address")),
        };
    }

    let show_address = clients.len() > 1;
    let screens: Vec<(String, String)> = stream::iter(clients)
        .map(|client| async move {
            let address = client.config().address.clone();
            let mut fetcher = TimingsFetcher::new(client);
            fetcher.activate();
            let state = fetcher
                .wait_for_completion()
                .instrument(span!(tracing::Level::INFO, "fetch", address = address.as_str()))
                .await;
            (address, render(&state, listing))
        })
        .buffer_unordered(MAX_CONCURRENT_FETCHES)
        .collect()
        .await;

    for (address, screen) in screens {
        if show_address {
            println!("== {}", address);
        }
        println!("{}\n", screen);
    }

    Ok(())
}

/// Shows the timings screen for one address and refreshes it on demand.
async fn interactive(client: TimingsClient, listing: Listing) -> anyhow::Result<()> {
    let mut fetcher = TimingsFetcher::new(client);

    span!(tracing::Level::INFO, "screen", address = fetcher.client().config().address.as_str())
        .in_scope(|| info!("Press Enter to refresh, send `exit` to stop"));

    let mut buffer = String::new();
    loop {
        fetcher.activate();
        let state = fetcher.wait_for_completion().await;
        println!("{}", render(&state, listing));

        print!("> ");
        std::io::stdout().flush()?;

        buffer.clear();
        let read = std::io::stdin().read_line(&mut buffer)?;
        if read == 0 || buffer.trim() == "exit" {
            info!("User wants to exit");
            break;
        }
    }

    fetcher.deactivate();
    Ok(())
}
