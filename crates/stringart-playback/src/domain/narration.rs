//! Spoken step announcements and quadrant colour labels.

use serde::Serialize;

use super::layout::QuadrantCoordinate;

/// Colour painted on each quadrant of the physical board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuarterColor {
    Amarillo,
    Verde,
    Azul,
    Rojo,
}

impl QuarterColor {
    /// Colour of quadrant `quarter`; quadrants outside `1..=4` have none.
    #[must_use]
    pub fn for_quarter(quarter: u32) -> Option<Self> {
        match quarter {
            1 => Some(Self::Amarillo),
            2 => Some(Self::Verde),
            3 => Some(Self::Azul),
            4 => Some(Self::Rojo),
            _ => None,
        }
    }

    /// Label used in narration and render descriptors.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Amarillo => "amarillo",
            Self::Verde => "verde",
            Self::Azul => "azul",
            Self::Rojo => "rojo",
        }
    }
}

/// Sentence announcing a step. `step_number` is 1-based.
#[must_use]
pub fn step_announcement(step_number: usize, coordinate: QuadrantCoordinate) -> String {
    match QuarterColor::for_quarter(coordinate.quarter) {
        Some(color) => format!(
            "Paso {step_number}. Cuadrante {}, pin {}.",
            color.label(),
            coordinate.local_index
        ),
        None => format!("Paso {step_number}. Pin {}.", coordinate.local_index),
    }
}
