use tracing::info;

use crate::{
    dao::{models::RosterEntity, roster_store::RosterStore},
    dto::roster::{
        CreatePlayerRequest, PlayerSummary, PresenceResponse, RosterResponse, UpdatePlayerRequest,
    },
    error::ServiceError,
    services::sse_events,
    state::{
        OrganizerState, SharedState,
        roster::{Player, normalize_name},
    },
};

/// Load the persisted roster into memory, starting from an empty one when none is stored yet.
pub async fn hydrate(state: &SharedState, store: &dyn RosterStore) -> Result<(), ServiceError> {
    let roster_id = state.config().roster_id.clone();
    let entity = store
        .load_roster(roster_id.clone())
        .await?
        .unwrap_or_else(|| RosterEntity::empty(roster_id));
    let organizer = OrganizerState::from(entity);
    info!(players = organizer.roster.len(), "roster loaded from storage");
    sse_events::broadcast_roster_updated(state, &organizer.roster);
    state.replace_organizer(organizer).await;
    Ok(())
}

/// Current roster in display order.
pub async fn list_players(state: &SharedState) -> RosterResponse {
    state
        .read_organizer(|organizer| RosterResponse::from(&organizer.roster))
        .await
}

/// Add a present player with a freshly generated identifier.
pub async fn add_player(
    state: &SharedState,
    request: CreatePlayerRequest,
) -> Result<PlayerSummary, ServiceError> {
    let name = require_name(&request.name)?;
    let player = Player::new(name, request.role);
    let summary = PlayerSummary::from(&player);

    state
        .update_organizer(|organizer| {
            organizer.roster.insert(player);
            Ok(())
        })
        .await?;

    info!(player_id = %summary.id, "player added");
    sse_events::broadcast_player_created(state, summary.clone());
    Ok(summary)
}

/// Edit the name and/or role of a player.
pub async fn update_player(
    state: &SharedState,
    id: &str,
    request: UpdatePlayerRequest,
) -> Result<PlayerSummary, ServiceError> {
    let name = request.name.as_deref().map(require_name).transpose()?;

    let summary = state
        .update_organizer(|organizer| {
            let player = organizer
                .roster
                .get_mut(id)
                .ok_or_else(|| player_not_found(id))?;
            if let Some(name) = name {
                player.name = name;
            }
            if let Some(role) = request.role {
                player.role = role;
            }
            Ok(PlayerSummary::from(&*player))
        })
        .await?;

    sse_events::broadcast_player_updated(state, summary.clone());
    Ok(summary)
}

/// Flip the presence flag of a player.
pub async fn toggle_presence(
    state: &SharedState,
    id: &str,
) -> Result<PresenceResponse, ServiceError> {
    let summary = state
        .update_organizer(|organizer| {
            organizer
                .roster
                .toggle_presence(id)
                .ok_or_else(|| player_not_found(id))?;
            player_summary(organizer, id)
        })
        .await?;

    let response = PresenceResponse {
        id: summary.id.clone(),
        present: summary.present,
    };
    sse_events::broadcast_player_updated(state, summary);
    Ok(response)
}

/// Set the presence flag explicitly. Returns the summary when the flag changed.
pub async fn set_presence(
    state: &SharedState,
    id: &str,
    present: bool,
) -> Result<Option<PlayerSummary>, ServiceError> {
    let changed = state
        .update_organizer(|organizer| {
            let player = organizer
                .roster
                .get_mut(id)
                .ok_or_else(|| player_not_found(id))?;
            if player.present == present {
                return Ok(None);
            }
            player.present = present;
            Ok(Some(PlayerSummary::from(&*player)))
        })
        .await?;

    if let Some(ref summary) = changed {
        sse_events::broadcast_player_updated(state, summary.clone());
    }
    Ok(changed)
}

/// Remove a player from the roster.
pub async fn remove_player(state: &SharedState, id: &str) -> Result<(), ServiceError> {
    state
        .update_organizer(|organizer| {
            organizer
                .roster
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| player_not_found(id))
        })
        .await?;

    info!(player_id = %id, "player removed");
    sse_events::broadcast_player_deleted(state, id.to_string());
    Ok(())
}

/// Remove every player and forget the last draw.
pub async fn clear_roster(state: &SharedState) -> Result<(), ServiceError> {
    let removed = state
        .update_organizer(|organizer| {
            let removed = organizer.roster.len();
            organizer.roster.clear();
            organizer.last_draw = None;
            Ok(removed)
        })
        .await?;

    info!(removed, "roster cleared");
    sse_events::broadcast_roster_cleared(state);
    Ok(())
}

fn require_name(raw: &str) -> Result<String, ServiceError> {
    normalize_name(raw).ok_or_else(|| ServiceError::InvalidInput("player name is invalid".into()))
}

fn player_not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("player `{id}`"))
}

fn player_summary(organizer: &OrganizerState, id: &str) -> Result<PlayerSummary, ServiceError> {
    organizer
        .roster
        .get(id)
        .map(PlayerSummary::from)
        .ok_or_else(|| player_not_found(id))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::roster_store::memory::MemoryRosterStore,
        state::{AppState, roster::Role},
    };

    async fn ready_state() -> (SharedState, MemoryRosterStore) {
        let store = MemoryRosterStore::new();
        let state = AppState::new(AppConfig::default());
        state.install_roster_store(Arc::new(store.clone())).await;
        (state, store)
    }

    fn create(name: &str, role: Role) -> CreatePlayerRequest {
        CreatePlayerRequest {
            name: name.into(),
            role,
        }
    }

    #[tokio::test]
    async fn add_player_trims_and_persists() {
        let (state, store) = ready_state().await;
        let player = add_player(&state, create("  Ana  ", Role::Captain))
            .await
            .unwrap();
        assert_eq!(player.name, "Ana");
        assert!(player.present);

        let saved = store
            .load_roster(state.config().roster_id.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.players.len(), 1);
        assert_eq!(saved.players[0].id, player.id);
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let (state, _) = ready_state().await;
        let err = add_player(&state, create("   ", Role::Regular))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn mutations_fail_while_degraded() {
        let state = AppState::new(AppConfig::default());
        let err = add_player(&state, create("Ana", Role::Regular))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
        assert_eq!(list_players(&state).await.total, 0);
    }

    #[tokio::test]
    async fn toggle_and_update_unknown_players_are_not_found() {
        let (state, _) = ready_state().await;
        assert!(matches!(
            toggle_presence(&state, "ghost").await,
            Err(ServiceError::NotFound(_))
        ));
        let update = UpdatePlayerRequest {
            name: Some("Bia".into()),
            role: None,
        };
        assert!(matches!(
            update_player(&state, "ghost", update).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            remove_player(&state, "ghost").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn toggle_presence_updates_counts() {
        let (state, _) = ready_state().await;
        let ana = add_player(&state, create("Ana", Role::Regular)).await.unwrap();
        add_player(&state, create("Bia", Role::Goalkeeper))
            .await
            .unwrap();

        let presence = toggle_presence(&state, &ana.id).await.unwrap();
        assert!(!presence.present);

        let roster = list_players(&state).await;
        assert_eq!(roster.total, 2);
        assert_eq!(roster.present_count, 1);
        assert_eq!(roster.players[0].name, "Ana");
    }

    #[tokio::test]
    async fn set_presence_reports_only_changes() {
        let (state, _) = ready_state().await;
        let ana = add_player(&state, create("Ana", Role::Regular)).await.unwrap();
        assert!(set_presence(&state, &ana.id, true).await.unwrap().is_none());
        let changed = set_presence(&state, &ana.id, false).await.unwrap().unwrap();
        assert!(!changed.present);
    }

    #[tokio::test]
    async fn update_player_keeps_omitted_fields() {
        let (state, _) = ready_state().await;
        let ana = add_player(&state, create("Ana", Role::Captain)).await.unwrap();
        let updated = update_player(
            &state,
            &ana.id,
            UpdatePlayerRequest {
                name: Some(" Ana Maria ".into()),
                role: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Ana Maria");
        assert_eq!(updated.role, Role::Captain);
    }

    #[tokio::test]
    async fn clear_roster_empties_everything() {
        let (state, store) = ready_state().await;
        add_player(&state, create("Ana", Role::Regular)).await.unwrap();
        clear_roster(&state).await.unwrap();

        assert_eq!(list_players(&state).await.total, 0);
        let saved = store
            .load_roster(state.config().roster_id.clone())
            .await
            .unwrap()
            .unwrap();
        assert!(saved.players.is_empty());
    }

    #[tokio::test]
    async fn hydrate_restores_the_stored_roster() {
        let (state, store) = ready_state().await;
        add_player(&state, create("Ana", Role::Child)).await.unwrap();

        let fresh = AppState::new(AppConfig::default());
        hydrate(&fresh, &store).await.unwrap();
        let roster = list_players(&fresh).await;
        assert_eq!(roster.total, 1);
        assert_eq!(roster.players[0].role, Role::Child);
    }
}
