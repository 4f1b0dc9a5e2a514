//! The decision-reward-update cycle shared by both loops.

use super::{
    reward::{RewardRules, TickOutcome, evaluate},
    session::Session,
};
use crate::{
    Error, Result,
    ports::{World, world::rects},
    q_learning::{QLearningAgent, State, StateBuilder},
    types::{Action, Rect},
};

/// One completed tick.
#[derive(Debug, Clone)]
pub struct TickStep {
    pub action: Action,
    pub next_state: State,
    pub outcome: TickOutcome,
}

/// Build the current state from the world, relative to `player`.
pub fn observe<W>(builder: &StateBuilder, world: &W, player: &Rect) -> State
where
    W: World + ?Sized,
{
    builder.build_state(
        player,
        &rects(&world.enemy_bullets()),
        &rects(&world.enemies()),
    )
}

/// Observe the state around the live player.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`] if the world has no player.
pub fn observe_player<W>(builder: &StateBuilder, world: &W) -> Result<State>
where
    W: World + ?Sized,
{
    let player = world.player().ok_or_else(|| Error::InvariantViolation {
        message: "cannot observe a state without a player".to_string(),
    })?;
    Ok(observe(builder, world, &player))
}

/// Choose, act, evaluate, learn and decay for one tick starting in `state`.
///
/// The world is not advanced; the caller does that unless the tick ended the
/// episode.
pub fn run_tick<W>(
    agent: &mut QLearningAgent,
    world: &mut W,
    builder: &StateBuilder,
    rules: &RewardRules,
    session: &mut Session,
    state: &State,
) -> Result<TickStep>
where
    W: World + ?Sized,
{
    let action = agent.choose_action(state)?;
    world.apply_action(action);
    world.fire();

    let outcome = evaluate(world, rules, session)?;
    let player = world.player().unwrap_or(outcome.player);
    let next_state = observe(builder, world, &player);

    agent.learn(state, action, outcome.reward, &next_state)?;
    agent.decay_epsilon();
    session.advance_tick();

    Ok(TickStep {
        action,
        next_state,
        outcome,
    })
}
