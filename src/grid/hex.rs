//! Hex coordinate system (axial coordinates)
//!
//! Uses axial coordinates (q, r); the implicit cube coordinate is `s = -q - r`.

use serde::{Deserialize, Serialize};

/// Axial hex coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    /// Neighbor offsets, indexed by edge (0 = East, counter-clockwise)
    pub const DIRECTIONS: [HexCoord; 6] = [
        HexCoord { q: 1, r: 0 },
        HexCoord { q: 1, r: -1 },
        HexCoord { q: 0, r: -1 },
        HexCoord { q: -1, r: 0 },
        HexCoord { q: -1, r: 1 },
        HexCoord { q: 0, r: 1 },
    ];

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Hex distance: `(|dq| + |dq + dr| + |dr|) / 2`
    pub fn distance(&self, other: &Self) -> i32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        (dq.abs() + (dq + dr).abs() + dr.abs()) / 2
    }

    /// The neighbor across edge `edge` (taken modulo 6)
    pub fn neighbor(&self, edge: usize) -> HexCoord {
        let d = Self::DIRECTIONS[edge % 6];
        HexCoord::new(self.q + d.q, self.r + d.r)
    }

    /// All 6 neighboring coordinates, in edge order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            self.neighbor(0),
            self.neighbor(1),
            self.neighbor(2),
            self.neighbor(3),
            self.neighbor(4),
            self.neighbor(5),
        ]
    }

    /// Edge index pointing at `other`, if adjacent
    pub fn edge_to(&self, other: &HexCoord) -> Option<usize> {
        (0..6).find(|&edge| self.neighbor(edge) == *other)
    }

    /// All hexes at exactly `radius`
    pub fn ring(&self, radius: i32) -> Vec<HexCoord> {
        if radius <= 0 {
            return vec![*self];
        }
        self.range(radius)
            .into_iter()
            .filter(|c| c.distance(self) == radius)
            .collect()
    }

    /// All hexes within `radius` (inclusive), in a deterministic order
    pub fn range(&self, radius: i32) -> Vec<HexCoord> {
        let radius = radius.max(0);
        let mut results = Vec::with_capacity((1 + 3 * radius * (radius + 1)) as usize);
        for dq in -radius..=radius {
            for dr in (-radius).max(-dq - radius)..=radius.min(-dq + radius) {
                results.push(HexCoord::new(self.q + dq, self.r + dr));
            }
        }
        results
    }
}

impl std::ops::Add for HexCoord {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }
}
