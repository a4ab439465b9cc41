use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Frame data and hitbox shape for one weapon. Frame counts are in simulation
/// ticks; every phase lasts at least one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub stamina_cost: u32,
    pub startup_frames: u32,
    pub active_frames: u32,
    pub recovery_frames: u32,
    /// Hitbox extent while the swing is active.
    pub reach: Vec2,
    /// Hitbox offset from the owner's position, mirrored by facing.
    pub offset: Vec2,
}

impl Weapon {
    pub fn new(
        name: impl Into<String>,
        stamina_cost: u32,
        startup_frames: u32,
        active_frames: u32,
        recovery_frames: u32,
        reach: Vec2,
        offset: Vec2,
    ) -> Self {
        Self {
            name: name.into(),
            stamina_cost,
            startup_frames: startup_frames.max(1),
            active_frames: active_frames.max(1),
            recovery_frames: recovery_frames.max(1),
            reach,
            offset,
        }
    }

    pub fn player_sword() -> Self {
        Self::new(
            "player_sword",
            15,
            2,
            3,
            4,
            Vec2::new(20.0, 20.0),
            Vec2::new(4.0, -20.0),
        )
    }
}

/// Registry of weapon definitions. Combatants receive clones, never shared
/// references; an attack owns its weapon outright.
#[derive(Debug, Clone, Default)]
pub struct WeaponSet {
    weapons: BTreeMap<String, Weapon>,
}

impl WeaponSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.register(Weapon::player_sword());
        set
    }

    pub fn register(&mut self, weapon: Weapon) {
        self.weapons.insert(weapon.name.clone(), weapon);
    }

    pub fn clone_weapon(&self, name: &str) -> Option<Weapon> {
        self.weapons.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.weapons.keys().map(String::as_str)
    }

    /// Loads weapon definitions from a JSON array, merging over whatever is
    /// already registered.
    pub fn load_json(&mut self, json: &str) -> Result<usize, serde_json::Error> {
        let weapons: Vec<Weapon> = serde_json::from_str(json)?;
        let count = weapons.len();
        for weapon in weapons {
            self.register(weapon);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_weapon_is_independent() {
        let set = WeaponSet::with_defaults();
        let mut a = set.clone_weapon("player_sword").unwrap();
        a.stamina_cost = 99;

        let b = set.clone_weapon("player_sword").unwrap();
        assert_eq!(b.stamina_cost, 15);
    }

    #[test]
    fn unknown_weapon_is_none() {
        let set = WeaponSet::with_defaults();
        assert!(set.clone_weapon("broken_bottle").is_none());
    }

    #[test]
    fn load_json_merges() {
        let mut set = WeaponSet::with_defaults();
        let json = r#"[{
            "name": "spear",
            "stamina_cost": 20,
            "startup_frames": 4,
            "active_frames": 2,
            "recovery_frames": 6,
            "reach": [30.0, 6.0],
            "offset": [6.0, -14.0]
        }]"#;

        assert_eq!(set.load_json(json).unwrap(), 1);
        assert!(set.clone_weapon("spear").is_some());
        assert!(set.clone_weapon("player_sword").is_some());
    }

    #[test]
    fn phase_frames_never_zero() {
        let weapon = Weapon::new("jab", 1, 0, 0, 0, Vec2::ONE, Vec2::ZERO);
        assert_eq!(weapon.startup_frames, 1);
        assert_eq!(weapon.active_frames, 1);
        assert_eq!(weapon.recovery_frames, 1);
    }
}
