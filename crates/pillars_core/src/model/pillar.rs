//! Pillar domain model.
//!
//! # Responsibility
//! - Define the tracked life area ("card") and its presentation tokens.
//! - Map stored categories to color/description tokens.
//!
//! # Invariants
//! - `id` is stable and never reused for another pillar.
//! - `name` is never empty after trimming.
//! - Unknown categories resolve to the fallback tokens instead of failing.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a pillar (`cards.id`).
pub type PillarId = Uuid;

const FALLBACK_COLOR: &str = "sage";
const FALLBACK_DESCRIPTION: &str = "Desenvolva este aspecto da sua vida";

struct CategoryStyle {
    category: &'static str,
    color: &'static str,
    description: &'static str,
}

const CATEGORY_STYLES: &[CategoryStyle] = &[
    CategoryStyle {
        category: "financeiro",
        color: "emerald",
        description: "Gerencie sua vida financeira e investimentos",
    },
    CategoryStyle {
        category: "espiritual",
        color: "purple",
        description: "Cultive sua conexão espiritual e paz interior",
    },
    CategoryStyle {
        category: "produtividade",
        color: "blue",
        description: "Organize seu tempo e aumente sua eficiência",
    },
    CategoryStyle {
        category: "social",
        color: "pink",
        description: "Fortaleça seus relacionamentos e conexões",
    },
    CategoryStyle {
        category: "educacao",
        color: "indigo",
        description: "Desenvolva conhecimentos e habilidades",
    },
    CategoryStyle {
        category: "saude",
        color: "green",
        description: "Cuide do seu bem-estar físico e mental",
    },
];

/// Validation failures for pillar records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PillarValidationError {
    NilId,
    EmptyName,
}

impl Display for PillarValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "pillar id must not be nil"),
            Self::EmptyName => write!(f, "pillar name must not be empty"),
        }
    }
}

impl Error for PillarValidationError {}

/// A tracked life area, stored in the `cards` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pillar {
    pub id: PillarId,
    pub name: String,
    /// Icon token rendered by the UI (usually an emoji).
    pub icon: String,
    /// Raw category key; drives color and description tokens.
    pub category: String,
}

impl Pillar {
    /// Creates a pillar with a generated stable ID.
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: icon.into(),
            category: category.into(),
        }
    }

    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), PillarValidationError> {
        if self.id.is_nil() {
            return Err(PillarValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(PillarValidationError::EmptyName);
        }
        Ok(())
    }

    /// Color token for this pillar's category.
    pub fn color_token(&self) -> &'static str {
        category_style(&self.category).map_or(FALLBACK_COLOR, |style| style.color)
    }

    /// Human-readable description for this pillar's category.
    pub fn description(&self) -> &'static str {
        category_style(&self.category).map_or(FALLBACK_DESCRIPTION, |style| style.description)
    }
}

fn category_style(category: &str) -> Option<&'static CategoryStyle> {
    let key = category.trim().to_lowercase();
    CATEGORY_STYLES.iter().find(|style| style.category == key)
}
