//! DTOs for team draws.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{dto::roster::PlayerSummary, services::team_sorter::Team, state::DrawRecord};

/// Request to split the present players into teams.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct DrawTeamsRequest {
    /// Number of teams to produce.
    #[validate(range(min = 2))]
    pub team_count: usize,
}

/// One drawn team, labelled from 1.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct TeamSummary {
    /// Team number, starting at 1.
    pub label: usize,
    /// Number of members.
    pub size: usize,
    /// Members, seeded players first.
    pub players: Vec<PlayerSummary>,
}

/// Result of a draw.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct DrawResponse {
    /// Number of teams produced.
    pub team_count: usize,
    /// Players the draw was taken from.
    pub present_count: usize,
    /// Teams in label order.
    pub teams: Vec<TeamSummary>,
}

impl From<(usize, &Team)> for TeamSummary {
    fn from((index, team): (usize, &Team)) -> Self {
        Self {
            label: index + 1,
            size: team.len(),
            players: team.members.iter().map(PlayerSummary::from).collect(),
        }
    }
}

impl From<&DrawRecord> for DrawResponse {
    fn from(record: &DrawRecord) -> Self {
        Self {
            team_count: record.teams.len(),
            present_count: record.present_count,
            teams: record
                .teams
                .iter()
                .enumerate()
                .map(TeamSummary::from)
                .collect(),
        }
    }
}
