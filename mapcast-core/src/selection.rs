use serde::Serialize;

use crate::coord::Coordinate;

/// The currently picked point and whether it has been confirmed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    coordinate: Option<Coordinate>,
    confirmed: bool,
    address: Option<String>,
    /// Bumped on every pick; in-flight requests remember the value they started under.
    #[serde(skip)]
    generation: u64,
}

impl Selection {
    /// Replace whatever was selected with a fresh, unconfirmed point.
    pub fn pick(&mut self, coordinate: Coordinate) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.coordinate = Some(coordinate);
        self.confirmed = false;
        self.address = None;
        self.generation
    }

    pub fn confirm(&mut self, address: String) {
        self.confirmed = true;
        self.address = Some(address);
    }

    /// True when a result started under `generation` for `coordinate` still
    /// describes this selection.
    pub fn is_current(&self, generation: u64, coordinate: Coordinate) -> bool {
        self.generation == generation && self.coordinate == Some(coordinate)
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
