use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::ProgramId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgramError {
    #[error("program name cannot be empty")]
    EmptyName,
}

//
// ─── PROGRAM ───────────────────────────────────────────────────────────────────
//

/// A named curriculum composed of ordered pages.
///
/// Pages are attached through [`crate::model::ProgramPage`] join rows, which
/// carry the order index and the required flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    id: ProgramId,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl Program {
    /// Creates a program, validating the name.
    ///
    /// # Errors
    ///
    /// Returns `ProgramError::EmptyName` if the name is blank.
    pub fn new(
        id: ProgramId,
        name: impl Into<String>,
        description: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ProgramError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProgramError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            description,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> ProgramId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
