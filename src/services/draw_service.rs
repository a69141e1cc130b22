use tracing::info;

use crate::{
    dto::draw::{DrawResponse, DrawTeamsRequest},
    error::ServiceError,
    services::{sse_events, team_sorter},
    state::{DrawRecord, SharedState},
};

/// Split the present players into `team_count` balanced teams and remember the outcome.
///
/// Draws read the in-memory roster only, so they keep working in degraded mode.
pub async fn draw_teams(
    state: &SharedState,
    request: DrawTeamsRequest,
) -> Result<DrawResponse, ServiceError> {
    let max = state.config().max_team_count;
    if request.team_count > max {
        return Err(ServiceError::InvalidInput(format!(
            "at most {max} teams can be drawn (got {})",
            request.team_count
        )));
    }

    let record = state
        .record_draw(|roster| {
            let present = roster.present_players();
            if present.is_empty() {
                return Err(ServiceError::InvalidInput(
                    "mark at least one player as present".into(),
                ));
            }
            let teams = team_sorter::assign_teams(&present, request.team_count)?;
            Ok(DrawRecord {
                teams,
                present_count: present.len(),
            })
        })
        .await?;
    let response = DrawResponse::from(&record);

    info!(
        team_count = response.team_count,
        present_count = response.present_count,
        "teams drawn"
    );
    sse_events::broadcast_teams_drawn(state, &response);
    Ok(response)
}

/// Latest draw, or [`ServiceError::NotFound`] before the first one.
pub async fn last_draw(state: &SharedState) -> Result<DrawResponse, ServiceError> {
    state
        .last_draw()
        .await
        .as_ref()
        .map(DrawResponse::from)
        .ok_or_else(|| ServiceError::NotFound("no teams have been drawn yet".into()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::roster_store::memory::MemoryRosterStore,
        dto::roster::CreatePlayerRequest,
        services::roster_service,
        state::{AppState, roster::Role},
    };

    async fn state_with(players: &[(&str, Role)]) -> SharedState {
        let state = AppState::new(AppConfig::default());
        state
            .install_roster_store(Arc::new(MemoryRosterStore::new()))
            .await;
        for (name, role) in players {
            roster_service::add_player(
                &state,
                CreatePlayerRequest {
                    name: name.to_string(),
                    role: *role,
                },
            )
            .await
            .unwrap();
        }
        state
    }

    #[tokio::test]
    async fn draw_uses_present_players_only() {
        let state = state_with(&[
            ("Ana", Role::Regular),
            ("Bia", Role::Regular),
            ("Caio", Role::Regular),
            ("Duda", Role::Regular),
            ("Edu", Role::Regular),
        ])
        .await;
        let absent = roster_service::list_players(&state).await.players[4]
            .id
            .clone();
        roster_service::toggle_presence(&state, &absent).await.unwrap();

        let draw = draw_teams(&state, DrawTeamsRequest { team_count: 2 })
            .await
            .unwrap();
        assert_eq!(draw.present_count, 4);
        assert_eq!(draw.teams.len(), 2);
        assert!(draw.teams.iter().all(|team| team.size == 2));
        assert_eq!(draw.teams[0].label, 1);
        assert!(
            draw.teams
                .iter()
                .flat_map(|team| &team.players)
                .all(|player| player.id != absent)
        );
    }

    #[tokio::test]
    async fn draw_requires_present_players() {
        let state = state_with(&[]).await;
        let err = draw_teams(&state, DrawTeamsRequest { team_count: 2 })
            .await
            .unwrap_err();
        match err {
            ServiceError::InvalidInput(message) => {
                assert_eq!(message, "mark at least one player as present")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn engine_rejections_surface_as_invalid_input() {
        let state = state_with(&[
            ("Ana", Role::Captain),
            ("Bia", Role::Regular),
            ("Caio", Role::Regular),
            ("Duda", Role::Regular),
        ])
        .await;
        let err = draw_teams(&state, DrawTeamsRequest { team_count: 2 })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(last_draw(&state).await.is_err());
    }

    #[tokio::test]
    async fn team_count_is_capped() {
        let state = state_with(&[("Ana", Role::Regular)]).await;
        let err = draw_teams(&state, DrawTeamsRequest { team_count: 17 })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn last_draw_is_kept_until_roster_is_cleared() {
        let state = state_with(&[("Ana", Role::Regular), ("Bia", Role::Regular)]).await;
        assert!(matches!(
            last_draw(&state).await,
            Err(ServiceError::NotFound(_))
        ));

        draw_teams(&state, DrawTeamsRequest { team_count: 2 })
            .await
            .unwrap();
        assert_eq!(last_draw(&state).await.unwrap().present_count, 2);

        roster_service::clear_roster(&state).await.unwrap();
        assert!(last_draw(&state).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn draw_racing_a_clear_never_outlives_the_roster() {
        for _ in 0..32 {
            let state = state_with(&[
                ("Ana", Role::Regular),
                ("Bia", Role::Regular),
                ("Caio", Role::Regular),
                ("Duda", Role::Regular),
            ])
            .await;

            let draws: Vec<_> = (0..4)
                .map(|_| {
                    let state = state.clone();
                    tokio::spawn(async move {
                        let _ = draw_teams(&state, DrawTeamsRequest { team_count: 2 }).await;
                    })
                })
                .collect();
            let clear = {
                let state = state.clone();
                tokio::spawn(async move { roster_service::clear_roster(&state).await.unwrap() })
            };
            for draw in draws {
                draw.await.unwrap();
            }
            clear.await.unwrap();

            assert_eq!(roster_service::list_players(&state).await.total, 0);
            assert!(matches!(
                last_draw(&state).await,
                Err(ServiceError::NotFound(_))
            ));
        }
    }

    #[tokio::test]
    async fn last_draw_survives_rehydration() {
        let state = state_with(&[("Ana", Role::Regular), ("Bia", Role::Regular)]).await;
        draw_teams(&state, DrawTeamsRequest { team_count: 2 })
            .await
            .unwrap();

        let store = state.roster_store().await.unwrap();
        roster_service::hydrate(&state, store.as_ref()).await.unwrap();
        assert_eq!(last_draw(&state).await.unwrap().present_count, 2);
    }
}
