//! Pool items.

use serde::{Deserialize, Serialize};
use wheel_core::error::DomainError;

/// One weighted entry on the wheel.
///
/// `original_weight` is fixed at creation; `weight` is what the draw engine
/// sees and is lowered by depletion until a reset restores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Display name, non-empty.
    pub name: String,
    /// Current drawable weight.
    pub weight: u32,
    /// Weight the item was created with.
    pub original_weight: u32,
}

impl Item {
    /// Validates user input and builds a fresh item.
    ///
    /// The name is trimmed before validation. The weight arrives as a signed
    /// integer so that zero and negative input can be rejected rather than
    /// silently wrapped.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidItem` if the trimmed name is empty or the
    /// weight is not a positive integer that fits in `u32`.
    pub fn new(name: &str, weight: i64) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidItem("name must not be empty".to_owned()));
        }
        if weight <= 0 {
            return Err(DomainError::InvalidItem(format!(
                "weight must be a positive integer, got {weight}"
            )));
        }
        let weight = u32::try_from(weight).map_err(|_| {
            DomainError::InvalidItem(format!("weight {weight} exceeds {}", u32::MAX))
        })?;

        Ok(Self {
            name: name.to_owned(),
            weight,
            original_weight: weight,
        })
    }

    /// Whether the item can currently be drawn.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.weight > 0
    }

    /// Puts the weight back to the value the item was created with.
    pub fn restore(&mut self) {
        self.weight = self.original_weight;
    }
}
