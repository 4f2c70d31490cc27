/*
 *  display/dirty.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Bounding box of framebuffer pixels touched since the last flush
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::ops::RangeInclusive;

use crate::display::{BANK_HEIGHT, HEIGHT, WIDTH};

/// Inclusive pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub x_min: u8,
    pub y_min: u8,
    pub x_max: u8,
    pub y_max: u8,
}

impl Area {
    /// The whole 84x48 surface
    pub const FULL: Area = Area {
        x_min: 0,
        y_min: 0,
        x_max: WIDTH as u8 - 1,
        y_max: HEIGHT as u8 - 1,
    };

    pub fn contains(&self, x: u8, y: u8) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }

    /// Columns covered by the area
    pub fn columns(&self) -> RangeInclusive<u8> {
        self.x_min..=self.x_max
    }

    /// Hardware banks (8-row pages) intersecting the area's rows
    pub fn banks(&self) -> RangeInclusive<u8> {
        (self.y_min / BANK_HEIGHT as u8)..=(self.y_max / BANK_HEIGHT as u8)
    }
}

/// Dirty-region state machine: Empty -> Dirty(bbox) -> (flush) -> Empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirtyRegion {
    #[default]
    Empty,
    Dirty(Area),
}

impl DirtyRegion {
    pub fn is_empty(&self) -> bool {
        matches!(self, DirtyRegion::Empty)
    }

    pub fn area(&self) -> Option<Area> {
        match self {
            DirtyRegion::Empty => None,
            DirtyRegion::Dirty(area) => Some(*area),
        }
    }

    /// Widen the region to cover (x, y). Callers pass in-bounds coordinates only.
    pub fn include(&mut self, x: u8, y: u8) {
        *self = match *self {
            DirtyRegion::Empty => DirtyRegion::Dirty(Area { x_min: x, y_min: y, x_max: x, y_max: y }),
            DirtyRegion::Dirty(a) => DirtyRegion::Dirty(Area {
                x_min: a.x_min.min(x),
                y_min: a.y_min.min(y),
                x_max: a.x_max.max(x),
                y_max: a.y_max.max(y),
            }),
        };
    }

    pub fn mark_all(&mut self) {
        *self = DirtyRegion::Dirty(Area::FULL);
    }

    pub fn reset(&mut self) {
        *self = DirtyRegion::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let region = DirtyRegion::default();
        assert!(region.is_empty());
        assert_eq!(region.area(), None);
    }

    #[test]
    fn test_include_grows_monotonically() {
        let mut region = DirtyRegion::Empty;
        region.include(10, 20);
        assert_eq!(region.area(), Some(Area { x_min: 10, y_min: 20, x_max: 10, y_max: 20 }));

        region.include(5, 30);
        region.include(12, 22);
        assert_eq!(region.area(), Some(Area { x_min: 5, y_min: 20, x_max: 12, y_max: 30 }));
    }

    #[test]
    fn test_banks_cover_row_range() {
        let area = Area { x_min: 0, y_min: 7, x_max: 3, y_max: 8 };
        assert_eq!(area.banks(), 0..=1);

        let area = Area { x_min: 0, y_min: 16, x_max: 3, y_max: 23 };
        assert_eq!(area.banks(), 2..=2);

        assert_eq!(Area::FULL.banks(), 0..=5);
    }

    #[test]
    fn test_mark_all_and_reset() {
        let mut region = DirtyRegion::Empty;
        region.mark_all();
        assert_eq!(region.area(), Some(Area::FULL));
        assert!(Area::FULL.contains(83, 47));

        region.reset();
        assert!(region.is_empty());
    }
}
