//! Reservation dialog driven through the real store.

#![allow(clippy::unwrap_used)]

use raffle_desk_reservations::mocks::{MockRaffleApi, RecordingRefresh};
use raffle_desk_reservations::normalizer::normalize;
use raffle_desk_reservations::{
    ApiError, ClientId, DialogConfig, NotificationLevel, RaffleId, RaffleOption,
    ReservationDialogAction, ReservationDialogEnvironment, ReservationDialogReducer,
    ReservationDialogState,
};
use raffle_desk_runtime::Store;
use raffle_desk_testing::test_clock;
use std::sync::Arc;
use std::time::Duration;

type DialogStore = Store<
    ReservationDialogState,
    ReservationDialogAction,
    ReservationDialogEnvironment,
    ReservationDialogReducer,
>;

const WAIT: Duration = Duration::from_secs(2);

fn raffles() -> Vec<RaffleOption> {
    (1..=3)
        .map(|id| RaffleOption {
            id: RaffleId::new(id),
            name: format!("Rifa {id}"),
            identification: "900123".to_string(),
            total_numbers: 100 * id,
        })
        .collect()
}

fn store_with(api: &MockRaffleApi, refresh: &RecordingRefresh, notification: Duration) -> DialogStore {
    let env = ReservationDialogEnvironment::new(
        Arc::new(api.clone()),
        Arc::new(test_clock()),
        Arc::new(refresh.clone()),
        DialogConfig {
            page_size: 2,
            notification_duration: notification,
        },
    );
    Store::new(
        ReservationDialogState::new(ClientId::new(42), 2),
        ReservationDialogReducer::new(),
        env,
    )
}

fn entered(raw: &str) -> ReservationDialogAction {
    ReservationDialogAction::NumberEntered { raw: raw.to_string() }
}

const fn is_page_load(action: &ReservationDialogAction) -> bool {
    matches!(action, ReservationDialogAction::CatalogPageLoaded { .. })
}

const fn is_answer(action: &ReservationDialogAction) -> bool {
    matches!(
        action,
        ReservationDialogAction::SubmitSucceeded { .. } | ReservationDialogAction::SubmitFailed { .. }
    )
}

/// Open the dialog, choose raffle 1 (100 numbers) and enter `numbers`
async fn prepared(store: &DialogStore, numbers: &[&str]) {
    store
        .send_and_wait_for(ReservationDialogAction::Opened, is_page_load, WAIT)
        .await
        .unwrap();
    store
        .send(ReservationDialogAction::RaffleChosen {
            raffle_id: RaffleId::new(1),
        })
        .await
        .unwrap();
    for raw in numbers {
        store.send(entered(raw)).await.unwrap();
    }
}

#[tokio::test]
async fn opening_loads_first_catalog_page() {
    let api = MockRaffleApi::new().with_raffles(raffles());
    let store = store_with(&api, &RecordingRefresh::new(), WAIT);

    store
        .send(ReservationDialogAction::Opened)
        .await
        .unwrap()
        .wait()
        .await;

    let ids: Vec<u64> = store
        .state(|s| s.catalog.raffles().iter().map(|r| r.id.get()).collect())
        .await;
    assert_eq!(ids, vec![1, 2]);
    assert!(store.state(|s| s.catalog.current().has_next_page()).await);
    assert_eq!(api.catalog_calls(), 1);
}

#[tokio::test]
async fn second_catalog_page_replaces_first() {
    let api = MockRaffleApi::new().with_raffles(raffles());
    let store = store_with(&api, &RecordingRefresh::new(), WAIT);

    store
        .send_and_wait_for(ReservationDialogAction::Opened, is_page_load, WAIT)
        .await
        .unwrap();
    store
        .send_and_wait_for(
            ReservationDialogAction::CatalogPageRequested { page: 2 },
            is_page_load,
            WAIT,
        )
        .await
        .unwrap();

    let ids: Vec<u64> = store
        .state(|s| s.catalog.raffles().iter().map(|r| r.id.get()).collect())
        .await;
    assert_eq!(ids, vec![3]);
}

#[tokio::test]
async fn catalog_failure_shows_error_and_empty_page() {
    let api = MockRaffleApi::new()
        .with_raffles(raffles())
        .failing_catalog(ApiError::Transport("connection refused".to_string()));
    let store = store_with(&api, &RecordingRefresh::new(), Duration::from_secs(60));

    store
        .send_and_wait_for(ReservationDialogAction::Opened, is_page_load, WAIT)
        .await
        .unwrap();

    let (empty, level) = store
        .state(|s| {
            (
                s.catalog.raffles().is_empty(),
                s.latest_notification().map(|n| n.level),
            )
        })
        .await;
    assert!(empty);
    assert_eq!(level, Some(NotificationLevel::Error));
}

#[tokio::test]
async fn empty_selection_makes_no_backend_call() {
    let api = MockRaffleApi::new().with_raffles(raffles());
    let store = store_with(&api, &RecordingRefresh::new(), WAIT);
    prepared(&store, &[]).await;

    store
        .send(ReservationDialogAction::SubmitRequested)
        .await
        .unwrap()
        .wait()
        .await;

    assert_eq!(api.buy_calls(), 0);
    assert!(!store.state(|s| s.field_errors.is_empty()).await);
}

#[tokio::test]
async fn confirmed_reservation_clears_selection_and_refreshes() {
    let api = MockRaffleApi::new().with_raffles(raffles());
    let refresh = RecordingRefresh::new();
    let store = store_with(&api, &refresh, Duration::from_millis(10));
    prepared(&store, &["007", "70", "7", "150"]).await;

    store
        .send(ReservationDialogAction::SubmitRequested)
        .await
        .unwrap()
        .wait()
        .await;

    let purchases = api.purchases();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].0, ClientId::new(42));
    assert_eq!(
        purchases[0].1.numbers,
        vec![normalize("7").unwrap(), normalize("70").unwrap()]
    );
    assert_eq!(purchases[0].1.raffle_id, RaffleId::new(1));

    assert_eq!(refresh.confirmations(), purchases);
    assert!(store.state(|s| s.selection.is_empty()).await);
    // the success notification was auto-dismissed within the cascade
    assert!(store.state(|s| s.notifications.is_empty()).await);
}

#[tokio::test]
async fn rejected_reservation_keeps_selection_for_retry() {
    let api = MockRaffleApi::new()
        .with_raffles(raffles())
        .with_buy_result(Err(ApiError::Rejected {
            status: 409,
            message: "El número 7 ya fue vendido".to_string(),
        }));
    let refresh = RecordingRefresh::new();
    let store = store_with(&api, &refresh, Duration::from_secs(60));
    prepared(&store, &["7"]).await;

    let answer = store
        .send_and_wait_for(ReservationDialogAction::SubmitRequested, is_answer, WAIT)
        .await
        .unwrap();

    assert_eq!(
        answer,
        ReservationDialogAction::SubmitFailed {
            generation: 1,
            message: "El número 7 ya fue vendido".to_string(),
        }
    );
    let (selected, in_flight, note) = store
        .state(|s| {
            (
                s.selection.to_list(),
                s.submitter.is_in_flight(),
                s.latest_notification().cloned(),
            )
        })
        .await;
    assert_eq!(selected, vec![normalize("7").unwrap()]);
    assert!(!in_flight);
    let note = note.unwrap();
    assert_eq!(note.level, NotificationLevel::Error);
    assert_eq!(note.message, "El número 7 ya fue vendido");
    assert!(refresh.confirmations().is_empty());

    api.set_buy_result(Ok("Números comprados".to_string()));
    let retry = store
        .send_and_wait_for(ReservationDialogAction::SubmitRequested, is_answer, WAIT)
        .await
        .unwrap();
    assert!(matches!(retry, ReservationDialogAction::SubmitSucceeded { .. }));
    assert_eq!(api.buy_calls(), 2);
}

#[tokio::test]
async fn double_submit_while_in_flight_calls_backend_once() {
    let api = MockRaffleApi::new().with_raffles(raffles()).gated();
    let store = store_with(&api, &RecordingRefresh::new(), Duration::from_millis(10));
    prepared(&store, &["5"]).await;

    let mut first = store.send(ReservationDialogAction::SubmitRequested).await.unwrap();
    let mut second = store.send(ReservationDialogAction::SubmitRequested).await.unwrap();

    assert_eq!(second.pending(), 0);
    assert!(store.state(|s| s.submitter.is_in_flight()).await);

    api.release_purchase();
    first.wait_with_timeout(WAIT).await.unwrap();
    second.wait().await;

    assert_eq!(api.buy_calls(), 1);
    assert!(!store.state(|s| s.submitter.is_in_flight()).await);
}

#[tokio::test]
async fn closing_mid_flight_still_reports_outcome() {
    let api = MockRaffleApi::new()
        .with_raffles(raffles())
        .with_buy_result(Err(ApiError::Transport("timed out".to_string())))
        .gated();
    let store = store_with(&api, &RecordingRefresh::new(), Duration::from_secs(60));
    prepared(&store, &["5"]).await;

    let mut observer = store.subscribe_actions();
    store.send(ReservationDialogAction::SubmitRequested).await.unwrap();
    store.send(ReservationDialogAction::Closed).await.unwrap();
    assert!(store.state(|s| s.selection.is_empty()).await);

    api.release_purchase();
    let answer = tokio::time::timeout(WAIT, async {
        loop {
            let action = observer.recv().await.unwrap();
            if is_answer(&action) {
                return action;
            }
        }
    })
    .await
    .unwrap();

    assert!(matches!(answer, ReservationDialogAction::SubmitFailed { .. }));
    let (open, notes) = store.state(|s| (s.open, s.notifications.len())).await;
    assert!(!open);
    assert_eq!(notes, 1);
}

#[tokio::test]
async fn earlier_confirmation_leaves_reopened_dialog_usable() {
    let api = MockRaffleApi::new().with_raffles(raffles()).gated();
    let refresh = RecordingRefresh::new();
    let store = store_with(&api, &refresh, Duration::from_millis(10));
    prepared(&store, &["5"]).await;

    let mut earlier = store.send(ReservationDialogAction::SubmitRequested).await.unwrap();
    store.send(ReservationDialogAction::Closed).await.unwrap();
    prepared(&store, &["9"]).await;

    api.release_purchase();
    earlier.wait_with_timeout(WAIT).await.unwrap();

    let (selected, in_flight) = store
        .state(|s| (s.selection.to_list(), s.submitter.is_in_flight()))
        .await;
    assert_eq!(selected, vec![normalize("9").unwrap()]);
    assert!(!in_flight);
    assert_eq!(refresh.confirmations().len(), 1);
    assert_eq!(refresh.confirmations()[0].1.numbers, vec![normalize("5").unwrap()]);

    api.release_purchase();
    let answer = store
        .send_and_wait_for(ReservationDialogAction::SubmitRequested, is_answer, WAIT)
        .await
        .unwrap();
    assert!(matches!(
        answer,
        ReservationDialogAction::SubmitSucceeded { generation: 2, .. }
    ));
    assert_eq!(api.buy_calls(), 2);
    assert_eq!(api.purchases()[1].1.numbers, vec![normalize("9").unwrap()]);
}

#[tokio::test]
async fn shutdown_after_confirmation_lets_refresh_finish() {
    let api = MockRaffleApi::new().with_raffles(raffles());
    let refresh = RecordingRefresh::new();
    let store = store_with(&api, &refresh, Duration::from_millis(10));
    prepared(&store, &["7"]).await;

    let answer = store
        .send_and_wait_for(ReservationDialogAction::SubmitRequested, is_answer, WAIT)
        .await
        .unwrap();
    assert!(matches!(answer, ReservationDialogAction::SubmitSucceeded { .. }));

    store.shutdown(WAIT).await.unwrap();

    assert_eq!(store.pending_effects(), 0);
    assert_eq!(refresh.confirmations().len(), 1);
}
