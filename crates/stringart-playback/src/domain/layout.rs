//! Circular board layout and quadrant mapping.
//!
//! A board has `total_pins` pins numbered `0..total_pins`, split into
//! `quarters_count` equal angular quadrants. Quadrants and pins within a
//! quadrant are both numbered from 1.
//!
//! Pin 0 is mapped with the same formula as every other pin (quarter 1,
//! local index 1). Only pins that fall outside the board map to
//! [`QuadrantCoordinate::NONE`].

use serde::Serialize;
use stringart_core::error::DomainError;

/// Number of quadrants on every supported board.
pub const QUARTERS_COUNT: u32 = 4;

/// Position of a pin expressed as quadrant plus 1-based index inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct QuadrantCoordinate {
    /// Quadrant number in `1..=quarters_count`, or `0` for no quadrant.
    pub quarter: u32,
    /// Pin number inside the quadrant in `1..=pins_per_quarter`, or `0`.
    pub local_index: u32,
}

impl QuadrantCoordinate {
    /// No active quadrant; renderers highlight nothing.
    pub const NONE: Self = Self {
        quarter: 0,
        local_index: 0,
    };

    /// Returns `true` if this coordinate highlights no quadrant.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.quarter == 0
    }
}

/// Fixed geometry of a pin board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    total_pins: u32,
    quarters_count: u32,
}

impl BoardLayout {
    /// Creates a layout.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if either count is zero or if
    /// `total_pins` is not evenly divisible by `quarters_count`.
    pub fn new(total_pins: u32, quarters_count: u32) -> Result<Self, DomainError> {
        if quarters_count == 0 {
            return Err(DomainError::Validation(
                "quarters count must be positive".to_owned(),
            ));
        }
        if total_pins == 0 || total_pins % quarters_count != 0 {
            return Err(DomainError::Validation(format!(
                "total pins {total_pins} must be a positive multiple of {quarters_count}"
            )));
        }
        Ok(Self {
            total_pins,
            quarters_count,
        })
    }

    /// Creates a four-quadrant layout.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `total_pins` is zero or not a
    /// multiple of [`QUARTERS_COUNT`].
    pub fn quartered(total_pins: u32) -> Result<Self, DomainError> {
        Self::new(total_pins, QUARTERS_COUNT)
    }

    #[must_use]
    pub fn total_pins(&self) -> u32 {
        self.total_pins
    }

    #[must_use]
    pub fn quarters_count(&self) -> u32 {
        self.quarters_count
    }

    #[must_use]
    pub fn pins_per_quarter(&self) -> u32 {
        self.total_pins / self.quarters_count
    }

    /// Returns `true` if `pin` exists on this board.
    #[must_use]
    pub fn contains(&self, pin: u32) -> bool {
        pin < self.total_pins
    }

    /// Maps a pin value to its quadrant coordinate.
    #[must_use]
    pub fn locate(&self, pin: u32) -> QuadrantCoordinate {
        if !self.contains(pin) {
            return QuadrantCoordinate::NONE;
        }
        let per_quarter = self.pins_per_quarter();
        let one_indexed = pin + 1;
        let local_index = match one_indexed % per_quarter {
            0 => per_quarter,
            rest => rest,
        };
        QuadrantCoordinate {
            quarter: one_indexed.div_ceil(per_quarter),
            local_index,
        }
    }

    /// Inverse of [`locate`](Self::locate) for coordinates on the board.
    #[must_use]
    pub fn pin_at(&self, coordinate: QuadrantCoordinate) -> Option<u32> {
        let per_quarter = self.pins_per_quarter();
        if !(1..=self.quarters_count).contains(&coordinate.quarter)
            || !(1..=per_quarter).contains(&coordinate.local_index)
        {
            return None;
        }
        Some((coordinate.quarter - 1) * per_quarter + coordinate.local_index - 1)
    }
}
