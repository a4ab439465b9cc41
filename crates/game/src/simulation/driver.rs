use crate::combat::{CombatEvent, CombatSystem};
use crate::physics::PhysicsSystem;
use crate::player::PlayerSystem;
use crate::sync::{SnapshotStore, Tick};
use crate::world::{EntityId, World};
use crate::zone::ZoneSystem;

/// Sequences one simulation tick and owns everything that must survive a
/// resync rewind: the world, the combat resolver, the snapshot history, and
/// the tick counter.
///
/// A snapshot is captured at the start of each tick, before any system runs,
/// so the entry at tick T is the state the tick-T update consumed. Rewinding
/// to T and advancing re-runs T exactly.
pub struct Simulation {
    world: World,
    combat: CombatSystem,
    snapshots: SnapshotStore,
    events: Vec<CombatEvent>,
    tick: Tick,
    dt: f32,
}

impl Simulation {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            world: World::new(),
            combat: CombatSystem::new(),
            snapshots: SnapshotStore::new(),
            events: Vec::new(),
            tick: 0,
            dt: 1.0 / tick_rate as f32,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn snapshots_mut(&mut self) -> &mut SnapshotStore {
        &mut self.snapshots
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn set_tick(&mut self, tick: Tick) {
        self.tick = tick;
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Runs one full tick: capture history, then player intent, combat,
    /// physics, zones.
    pub fn advance(&mut self) {
        self.snapshots.capture(self.tick, &self.world);
        self.step_systems(None);
        self.tick += 1;
    }

    /// Like `advance`, but resolves combat in focus mode: only the given
    /// entity's combat state progresses, checked against everyone else.
    pub fn advance_focused(&mut self, focus: EntityId) {
        self.snapshots.capture(self.tick, &self.world);
        self.step_systems(Some(focus));
        self.tick += 1;
    }

    /// Deterministic fast-replay after a correction: identical to the normal
    /// path by construction, overwriting stored history as it goes.
    pub fn replay_to(&mut self, target: Tick) {
        while self.tick < target {
            self.advance();
        }
    }

    /// Drops history older than `window` ticks behind the present.
    pub fn prune_history(&mut self, window: u64) {
        self.snapshots.prune_below(self.tick.saturating_sub(window));
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    fn step_systems(&mut self, focus: Option<EntityId>) {
        PlayerSystem::update(&mut self.world);
        let events = self.combat.resolve_tick(&mut self.world, focus);
        self.events.extend(events);
        PhysicsSystem::step(&mut self.world, self.dt);
        ZoneSystem::update(&mut self.world, self.dt);
    }
}
