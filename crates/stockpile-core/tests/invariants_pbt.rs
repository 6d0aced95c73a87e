//! Property tests for the game-state invariants.
//!
//! Arbitrary interleavings of player adjustments and ticks must never push
//! a stock line outside `0..=MAX_STOCK`, leave a stale `warning` flag, or
//! take accuracy past `MAX_ACCURACY`, whatever the demand draws.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use stockpile_core::demand::{DemandSource, NegativeDemand, RandomDemand, ScriptedDemand};
use stockpile_core::game::GameState;
use stockpile_core::rules::{self, MAX_ACCURACY, MAX_STOCK};
use stockpile_core::tick::{self, TickError};
use stockpile_types::{Category, GamePhase, SessionId};

#[derive(Debug, Clone, Copy)]
enum Step {
    Adjust(Category, i32),
    Tick,
}

fn arb_category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

fn arb_amount() -> impl Strategy<Value = i32> {
    prop_oneof![
        4 => -120i32..=120,
        1 => any::<i32>(),
    ]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        2 => (arb_category(), arb_amount())
            .prop_map(|(category, amount)| Step::Adjust(category, amount)),
        1 => Just(Step::Tick),
    ]
}

fn arb_policy() -> impl Strategy<Value = NegativeDemand> {
    prop_oneof![Just(NegativeDemand::Floor), Just(NegativeDemand::Signed)]
}

fn assert_invariants(state: &GameState) -> Result<(), TestCaseError> {
    for (category, item) in state.inventory().iter() {
        prop_assert!(
            item.stock() <= MAX_STOCK,
            "{} stock {} over capacity",
            category,
            item.stock()
        );
        prop_assert_eq!(
            item.warning(),
            rules::is_warning(item.stock(), item.demand(), item.optimal()),
            "{} warning flag is stale at stock {}",
            category,
            item.stock()
        );
        prop_assert!(item.snapshot().fill_percent <= 100);
    }
    prop_assert!(state.stock_accuracy() <= MAX_ACCURACY);
    Ok(())
}

fn play(
    steps: &[Step],
    source: &mut dyn DemandSource,
    policy: NegativeDemand,
) -> Result<(), TestCaseError> {
    let mut state = GameState::new();
    state.start(SessionId::new());
    assert_invariants(&state)?;

    for step in steps {
        let playing = state.phase() == GamePhase::Playing;
        let before = state.clone();
        match *step {
            Step::Adjust(category, amount) => {
                let adjustment = state.adjust_stock(category, amount);
                if !playing {
                    prop_assert!(adjustment.is_none());
                    prop_assert_eq!(&state, &before);
                }
            }
            Step::Tick => {
                let ticked = tick::run_tick(&mut state, source, policy);
                if playing {
                    prop_assert!(ticked.is_ok());
                } else {
                    let not_playing = matches!(ticked, Err(TickError::NotPlaying { .. }));
                    prop_assert!(not_playing);
                    prop_assert_eq!(&state, &before);
                }
            }
        }
        assert_invariants(&state)?;
    }
    Ok(())
}

fn ended_state() -> GameState {
    let mut state = GameState::new();
    state.start(SessionId::new());
    let mut source = ScriptedDemand::steady();
    while state.phase() == GamePhase::Playing {
        tick::run_tick(&mut state, &mut source, NegativeDemand::Floor).unwrap();
    }
    state
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn random_demand_keeps_every_invariant(
        seed in any::<u64>(),
        policy in arb_policy(),
        steps in prop::collection::vec(arb_step(), 0..120),
    ) {
        let mut source = RandomDemand::from_seed(seed);
        play(&steps, &mut source, policy)?;
    }

    #[test]
    fn extreme_demand_never_breaks_stock_bounds(
        perturbations in prop::collection::vec(-1_000i32..=1_000, 0..150),
        policy in arb_policy(),
        steps in prop::collection::vec(arb_step(), 0..120),
    ) {
        let mut source = ScriptedDemand::new(perturbations);
        play(&steps, &mut source, policy)?;
    }

    #[test]
    fn adjust_outside_play_changes_nothing(
        ended in any::<bool>(),
        category in arb_category(),
        amount in arb_amount(),
    ) {
        let mut state = if ended { ended_state() } else { GameState::new() };
        let before = state.clone();

        prop_assert!(state.adjust_stock(category, amount).is_none());
        prop_assert_eq!(state, before);
    }
}
