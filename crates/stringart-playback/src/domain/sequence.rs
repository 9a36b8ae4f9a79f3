//! The immutable pin sequence played back by a session.

use std::sync::Arc;

use stringart_core::error::DomainError;

use super::layout::BoardLayout;

/// Ordered pin indices produced by the thread-path generator.
///
/// Always non-empty, and every pin lies on the board it was validated
/// against. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadSequence {
    pins: Arc<[u32]>,
}

impl ThreadSequence {
    /// Validates `pins` against `layout`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `pins` is empty or if any pin is
    /// not smaller than the layout's pin count.
    pub fn new(pins: Vec<u32>, layout: &BoardLayout) -> Result<Self, DomainError> {
        let Some(&max_pin) = pins.iter().max() else {
            return Err(DomainError::Validation(
                "thread sequence is empty".to_owned(),
            ));
        };
        if !layout.contains(max_pin) {
            return Err(DomainError::Validation(format!(
                "pin {max_pin} exceeds board of {} pins",
                layout.total_pins()
            )));
        }
        Ok(Self { pins: pins.into() })
    }

    /// Number of steps in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Index of the final step.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.pins.len() - 1
    }

    /// Pin at step `index`.
    #[must_use]
    pub fn pin(&self, index: usize) -> Option<u32> {
        self.pins.get(index).copied()
    }

    #[must_use]
    pub fn pins(&self) -> &[u32] {
        &self.pins
    }
}
