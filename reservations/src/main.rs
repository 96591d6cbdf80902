//! Reserve ticket numbers from the command line.
//!
//! Usage: `reserve <client-id> <raffle-id> <number>...`
//!
//! Reads `RAFFLE_API_URL`, `RAFFLE_API_TOKEN` and friends from the
//! environment (or a `.env` file), drives the reservation dialog through
//! the store and prints the raffle's progress after a confirmed purchase.

use anyhow::{Context, Result, bail};
use raffle_desk_core::environment::SystemClock;
use raffle_desk_reservations::normalizer::{format_padded, normalize_in_range};
use raffle_desk_reservations::submitter::{Validation, validate};
use raffle_desk_reservations::{
    ClientConfig, ClientId, HttpRaffleApi, RaffleApi, RaffleId, RaffleOption, ReservationDialogAction,
    ReservationDialogEnvironment, ReservationDialogReducer, ReservationDialogState,
    ReservationRequest, load_progress,
};
use raffle_desk_runtime::Store;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type DialogStore = Store<
    ReservationDialogState,
    ReservationDialogAction,
    ReservationDialogEnvironment,
    ReservationDialogReducer,
>;

struct Args {
    client_id: ClientId,
    raffle_id: RaffleId,
    numbers: Vec<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let usage = "usage: reserve <client-id> <raffle-id> <number>...";

    let client_id = args
        .next()
        .context(usage)?
        .parse()
        .context("client id must be a positive integer")?;
    let raffle_id = args
        .next()
        .context(usage)?
        .parse()
        .context("raffle id must be a positive integer")?;
    let numbers: Vec<String> = args.collect();
    if numbers.is_empty() {
        bail!(usage);
    }

    Ok(Args {
        client_id: ClientId::new(client_id),
        raffle_id: RaffleId::new(raffle_id),
        numbers,
    })
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "raffle_desk_reservations=info,reserve=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

const fn is_page_load(action: &ReservationDialogAction) -> bool {
    matches!(action, ReservationDialogAction::CatalogPageLoaded { .. })
}

/// Page through the catalog until `raffle_id` shows up
async fn find_raffle(store: &DialogStore, raffle_id: RaffleId, wait: Duration) -> Result<RaffleOption> {
    let mut next = ReservationDialogAction::Opened;

    loop {
        let loaded = store.send_and_wait_for(next, is_page_load, wait).await?;
        if let ReservationDialogAction::CatalogPageLoaded { result: Err(error), .. } = loaded {
            bail!("could not load raffles: {}", error.user_message());
        }

        let (found, next_page) = store
            .state(|s| {
                let page = s.catalog.current();
                (
                    s.catalog.find(raffle_id).cloned(),
                    page.has_next_page().then_some(page.page + 1),
                )
            })
            .await;

        match (found, next_page) {
            (Some(raffle), _) => return Ok(raffle),
            (None, Some(page)) => next = ReservationDialogAction::CatalogPageRequested { page },
            (None, None) => bail!("raffle {raffle_id} not found"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = parse_args()?;
    let config = ClientConfig::from_env()?;
    let wait = config.request_timeout + Duration::from_secs(5);

    let api: Arc<dyn RaffleApi> = Arc::new(HttpRaffleApi::from_config(&config)?);
    let refresh = Arc::new(|client_id: ClientId, request: &ReservationRequest| {
        info!(%client_id, raffle_id = %request.raffle_id, "Client's reservations changed");
    });
    let env = ReservationDialogEnvironment::new(
        Arc::clone(&api),
        Arc::new(SystemClock),
        refresh,
        config.dialog(),
    );
    let store: DialogStore = Store::new(
        ReservationDialogState::new(args.client_id, config.page_size),
        ReservationDialogReducer::new(),
        env,
    );

    info!(api_url = %config.api_url, "Opening reservation dialog");
    let raffle = find_raffle(&store, args.raffle_id, wait).await?;
    store
        .send(ReservationDialogAction::RaffleChosen { raffle_id: raffle.id })
        .await?;

    for raw in &args.numbers {
        let before = store.state(|s| s.selection.len()).await;
        store
            .send(ReservationDialogAction::NumberEntered { raw: raw.clone() })
            .await?;
        if store.state(|s| s.selection.len()).await == before {
            match normalize_in_range(raw, raffle.total_numbers) {
                Err(rejection) => eprintln!("skipping {raw:?}: {rejection}"),
                Ok(number) => eprintln!("skipping {raw:?}: {number} already selected"),
            }
        }
    }

    let selection = store.state(|s| s.selection.clone()).await;
    if let Validation::FieldErrors(errors) = validate(&selection, raffle.id) {
        for error in errors.values() {
            eprintln!("{error}");
        }
        bail!("nothing to reserve");
    }

    let answer = store
        .send_and_wait_for(
            ReservationDialogAction::SubmitRequested,
            |a| {
                matches!(
                    a,
                    ReservationDialogAction::SubmitSucceeded { .. }
                        | ReservationDialogAction::SubmitFailed { .. }
                )
            },
            wait,
        )
        .await?;

    match answer {
        ReservationDialogAction::SubmitSucceeded { request, message, .. } => {
            println!("{message}");
            let numbers: Vec<String> = request
                .numbers
                .iter()
                .map(|n| format_padded(n, raffle.total_numbers))
                .collect();
            println!("reserved in {}: {}", raffle.name, numbers.join(", "));
        },
        ReservationDialogAction::SubmitFailed { message, .. } => bail!(message),
        other => bail!("unexpected answer: {other:?}"),
    }

    let progress = load_progress(api.as_ref(), &raffle).await?;
    for segment in progress.breakdown.segments() {
        println!("{:<10} {:>6}  {}", format!("{:?}", segment.status), segment.count, segment.label());
    }

    // lets the catalog refresh and notification timers run to completion
    if let Err(error) = store.shutdown(wait).await {
        tracing::debug!(%error, "Store shutdown left effects running");
    }

    Ok(())
}
