use glam::Vec2;

use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn to_wire(self) -> i8 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }

    pub fn from_wire(value: i8) -> Self {
        if value < 0 { Facing::Left } else { Facing::Right }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsComponent {
    pub pos: Vec2,
    pub vel: Vec2,
    pub facing: Facing,
    /// Set by the combat resolver while the owner is in hit-stop; frozen
    /// bodies do not integrate.
    pub frozen: bool,
}

impl PhysicsComponent {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            facing: Facing::Right,
            frozen: false,
        }
    }
}

pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Deterministic kinematic step: same positions and velocities in, same
    /// positions out. No wall-clock reads, no allocation-order dependence.
    pub fn step(world: &mut World, dt: f32) {
        for (_, body) in world.physics.iter_mut() {
            if body.frozen {
                continue;
            }
            body.pos += body.vel * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_bodies_do_not_move() {
        let mut world = World::new();
        let id = world.spawn_entity();
        let mut body = PhysicsComponent::new(Vec2::ZERO);
        body.vel = Vec2::new(10.0, 0.0);
        body.frozen = true;
        world.physics.attach(id, body);

        PhysicsSystem::step(&mut world, 1.0);
        assert_eq!(world.physics.get(id).map(|b| b.pos), Some(Vec2::ZERO));
    }

    #[test]
    fn integration_is_deterministic() {
        let run = || {
            let mut world = World::new();
            let id = world.spawn_entity();
            let mut body = PhysicsComponent::new(Vec2::new(1.0, 2.0));
            body.vel = Vec2::new(3.0, -1.5);
            world.physics.attach(id, body);

            for _ in 0..120 {
                PhysicsSystem::step(&mut world, 1.0 / 60.0);
            }
            world.physics.get(id).map(|b| b.pos)
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn facing_wire_roundtrip() {
        assert_eq!(Facing::from_wire(Facing::Left.to_wire()), Facing::Left);
        assert_eq!(Facing::from_wire(Facing::Right.to_wire()), Facing::Right);
    }
}
