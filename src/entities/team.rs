//! TEAM record - a racing team (reference entity)

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{RecordKind, TeamId};

/// Racing team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Store key
    pub team_id: TeamId,

    /// Team name
    pub name: String,

    /// Registered country
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Team principal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_name: Option<String>,
}

impl Entity for Team {
    const KIND: RecordKind = RecordKind::Team;

    fn key(&self) -> i64 {
        self.team_id.get()
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

impl Team {
    /// Create a new team with only the required fields
    pub fn new(team_id: TeamId, name: impl Into<String>) -> Self {
        Self {
            team_id,
            name: name.into(),
            country: None,
            principal_name: None,
        }
    }
}
