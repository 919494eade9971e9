//! Learning plan model - an ordered sequence of steps with authoring metadata.

use serde::{Deserialize, Serialize};
use crate::id::PlanId;
use crate::Time;

/// A user-authored learning plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPlan {
    /// Unique identifier
    pub id: PlanId,

    /// Plan title
    pub title: String,

    /// Topic category
    pub category: Category,

    /// Free-form duration, e.g. "4 weeks"
    pub duration: String,

    /// Learning outcomes shown next to the steps
    #[serde(default)]
    pub what_youll_learn: Vec<String>,

    /// Ordered steps. Never empty.
    pub steps: Vec<Step>,

    /// Plan-level image references
    #[serde(default)]
    pub images: Vec<String>,

    /// Display name of the author
    pub author: String,

    /// Derived completion percentage (0-100).
    ///
    /// Mirrors the tracker so list views can show it without loading step
    /// status. Not authoritative.
    pub progress: u8,

    /// Set once every step has been completed and the plan was finished
    #[serde(default)]
    pub finished: bool,

    /// When created
    pub created_at: Time,

    /// Last edited or progressed
    pub updated_at: Time,
}

impl LearningPlan {
    /// Number of steps in the plan.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

/// One ordered unit of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Step {
    /// Step title
    pub title: String,

    /// Optional descriptive text
    #[serde(default)]
    pub description: String,

    /// Image references, opaque to progress tracking
    #[serde(default)]
    pub images: Vec<String>,
}

impl Step {
    /// Create a step with a title and description.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            images: Vec::new(),
        }
    }
}

/// Plan topic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Organic farming
    Organic,
    /// Seasonal planning
    Seasonal,
    /// Composting
    Composting,
    /// Irrigation
    Irrigation,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 4] = [
        Category::Organic,
        Category::Seasonal,
        Category::Composting,
        Category::Irrigation,
    ];

    /// Short machine name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Organic => "organic",
            Category::Seasonal => "seasonal",
            Category::Composting => "composting",
            Category::Irrigation => "irrigation",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Organic => "Organic Farming",
            Category::Seasonal => "Seasonal Planning",
            Category::Composting => "Composting",
            Category::Irrigation => "Irrigation",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == needle || c.label().to_lowercase() == needle)
            .ok_or_else(|| crate::PlanError::UnknownCategory(s.to_string()))
    }
}
