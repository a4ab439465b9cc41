use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub res: Vec2,
}

impl Aabb {
    pub const fn new(pos: Vec2, res: Vec2) -> Self {
        Self { pos, res }
    }

    pub fn from_center(center: Vec2, res: Vec2) -> Self {
        Self {
            pos: center - res * 0.5,
            res,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.res * 0.5
    }

    pub fn max(&self) -> Vec2 {
        self.pos + self.res
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.pos.x < other.max().x
            && self.max().x > other.pos.x
            && self.pos.y < other.max().y
            && self.max().y > other.pos.y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.pos.x
            && point.x <= self.max().x
            && point.y >= self.pos.y
            && point.y <= self.max().y
    }

    pub fn shifted(&self, by: Vec2) -> Aabb {
        Aabb::new(self.pos + by, self.res)
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        let min = self.pos.min(other.pos);
        let max = self.max().max(other.max());
        Aabb::new(min, max - min)
    }
}
