//! Integration tests for Store action broadcasting
//!
//! Observers see every effect-produced action, which is how callers wait for
//! a workflow's terminal answer without polling state.

#![allow(clippy::unwrap_used, clippy::panic)]

use raffle_desk_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use raffle_desk_runtime::{Store, StoreError};
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum HoldAction {
    /// Start holding `count` tickets
    Hold { count: u32 },
    /// One ticket was held
    TicketHeld { remaining: u32 },
    /// Every ticket is held (terminal)
    HoldCompleted,
    /// Does nothing and produces nothing
    Ignore,
}

#[derive(Debug, Default)]
struct HoldState {
    held: u32,
    completed: bool,
}

struct HoldReducer;

impl Reducer for HoldReducer {
    type State = HoldState;
    type Action = HoldAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut HoldState,
        action: HoldAction,
        _env: &(),
    ) -> SmallVec<[Effect<HoldAction>; 4]> {
        match action {
            HoldAction::Hold { count } => {
                state.held = 0;
                state.completed = false;
                smallvec![Effect::future(async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Some(HoldAction::TicketHeld { remaining: count.saturating_sub(1) })
                })]
            },
            HoldAction::TicketHeld { remaining } => {
                state.held += 1;
                if remaining == 0 {
                    smallvec![Effect::future(async { Some(HoldAction::HoldCompleted) })]
                } else {
                    smallvec![Effect::future(async move {
                        Some(HoldAction::TicketHeld { remaining: remaining - 1 })
                    })]
                }
            },
            HoldAction::HoldCompleted => {
                state.completed = true;
                SmallVec::new()
            },
            HoldAction::Ignore => SmallVec::new(),
        }
    }
}

fn store() -> Store<HoldState, HoldAction, (), HoldReducer> {
    Store::new(HoldState::default(), HoldReducer, ())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn send_and_wait_for_follows_multi_step_cascade() {
    let store = store();

    let terminal = store
        .send_and_wait_for(
            HoldAction::Hold { count: 3 },
            |a| matches!(a, HoldAction::HoldCompleted),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(terminal, HoldAction::HoldCompleted);
    assert_eq!(store.state(|s| (s.held, s.completed)).await, (3, true));
}

#[tokio::test]
async fn send_and_wait_for_times_out_without_match() {
    let store = store();

    let result = store
        .send_and_wait_for(
            HoldAction::Ignore,
            |a| matches!(a, HoldAction::HoldCompleted),
            Duration::from_millis(20),
        )
        .await;

    assert!(matches!(result, Err(StoreError::Timeout)));
}

#[tokio::test]
async fn every_subscriber_sees_effect_actions_in_order() {
    let store = store();
    let mut first = store.subscribe_actions();
    let mut second = store.subscribe_actions();

    store
        .send(HoldAction::Hold { count: 2 })
        .await
        .unwrap()
        .wait()
        .await;

    for rx in [&mut first, &mut second] {
        assert_eq!(rx.recv().await.unwrap(), HoldAction::TicketHeld { remaining: 1 });
        assert_eq!(rx.recv().await.unwrap(), HoldAction::TicketHeld { remaining: 0 });
        assert_eq!(rx.recv().await.unwrap(), HoldAction::HoldCompleted);
    }
}

#[tokio::test]
async fn sent_actions_are_not_broadcast() {
    let store = store();
    let mut rx = store.subscribe_actions();

    store.send(HoldAction::Ignore).await.unwrap().wait().await;

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn shutdown_waits_for_running_cascade() {
    let store = store();

    store.send(HoldAction::Hold { count: 2 }).await.unwrap();
    store.shutdown(Duration::from_secs(1)).await.unwrap();

    assert_eq!(store.pending_effects(), 0);
    // feedback after shutdown began is dropped, so the hold may be partial
    assert!(store.state(|s| s.held).await <= 2);
}
