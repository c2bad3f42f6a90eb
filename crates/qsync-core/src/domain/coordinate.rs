//! Coordinates addressing a sheet and its rendered output.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::resource::AGGREGATE_ID;

/// Full path of a sheet: `(vendor, bank, category, sheet)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetCoordinate {
    pub vendor: String,
    pub bank: String,
    pub category: String,
    pub sheet: String,
}

impl SheetCoordinate {
    pub fn new(
        vendor: impl Into<String>,
        bank: impl Into<String>,
        category: impl Into<String>,
        sheet: impl Into<String>,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            bank: bank.into(),
            category: category.into(),
            sheet: sheet.into(),
        }
    }

    /// Whether this addresses the synthetic ALL sheet rather than a real one.
    pub fn is_aggregate(&self) -> bool {
        self.sheet == AGGREGATE_ID
    }

    /// The same sheet rendered for `output`.
    pub fn with_output(&self, output: impl Into<String>) -> ArtifactCoordinate {
        ArtifactCoordinate {
            sheet: self.clone(),
            output: output.into(),
        }
    }
}

impl fmt::Display for SheetCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.vendor, self.bank, self.category, self.sheet
        )
    }
}

/// A sheet plus the render target its artifacts are produced for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    pub sheet: SheetCoordinate,
    pub output: String,
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.sheet, self.output)
    }
}
