#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use planewar::{
    Action, Rect,
    arena::{Arena, ArenaConfig},
    ports::{EpisodeSummary, Observer, TickReport, World},
    types::{Entity, EntityId},
};

/// Arena whose every fresh start parks an enemy bullet inside the player's
/// box, so the first tick of each game is fatal.
pub struct Ambush {
    pub arena: Arena,
}

impl Ambush {
    pub fn new(seed: u64) -> Self {
        Self {
            arena: Arena::new(ArenaConfig::default()).unwrap().with_seed(seed),
        }
    }
}

impl World for Ambush {
    fn player(&self) -> Option<Rect> {
        self.arena.player()
    }

    fn enemies(&self) -> Vec<Entity> {
        self.arena.enemies()
    }

    fn enemy_bullets(&self) -> Vec<Entity> {
        self.arena.enemy_bullets()
    }

    fn player_bullets(&self) -> Vec<Entity> {
        self.arena.player_bullets()
    }

    fn apply_action(&mut self, action: Action) {
        self.arena.apply_action(action);
    }

    fn fire(&mut self) {
        self.arena.fire();
    }

    fn despawn(&mut self, id: EntityId) {
        self.arena.despawn(id);
    }

    fn remove_player(&mut self) {
        self.arena.remove_player();
    }

    fn advance(&mut self) {
        self.arena.advance();
    }

    fn reset(&mut self) {
        self.arena.reset();
        // Player starts at (189, 550) and is 102x126.
        self.arena.spawn_enemy_bullet(230.0, 600.0);
    }
}

/// Everything an observer saw, shared with the test body.
#[derive(Debug, Default)]
pub struct Recorded {
    pub ticks: Vec<TickReport>,
    pub episodes: Vec<EpisodeSummary>,
    pub game_overs: Vec<u32>,
    pub explosions: usize,
}

pub struct Recorder(pub Arc<Mutex<Recorded>>);

impl Recorder {
    pub fn new() -> (Self, Arc<Mutex<Recorded>>) {
        let shared = Arc::new(Mutex::new(Recorded::default()));
        (Self(Arc::clone(&shared)), shared)
    }
}

impl Observer for Recorder {
    fn on_tick(&mut self, report: &TickReport) -> planewar::Result<()> {
        self.0.lock().unwrap().ticks.push(report.clone());
        Ok(())
    }

    fn on_explosion(&mut self, _explosion: &planewar::ports::Explosion) -> planewar::Result<()> {
        self.0.lock().unwrap().explosions += 1;
        Ok(())
    }

    fn on_game_over(&mut self, score: u32) -> planewar::Result<()> {
        self.0.lock().unwrap().game_overs.push(score);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> planewar::Result<()> {
        self.0.lock().unwrap().episodes.push(summary.clone());
        Ok(())
    }
}
