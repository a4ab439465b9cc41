mod attack;
mod component;
mod resolver;
mod weapon;

pub use attack::{Attack, AttackPhase};
pub use component::{CombatComponent, CombatStats, FREEZE_FRAMES, Hurtbox};
pub use resolver::{CombatEvent, CombatSystem, RANGE_CHECK_DISTANCE};
pub use weapon::{Weapon, WeaponSet};
