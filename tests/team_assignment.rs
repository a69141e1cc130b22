use std::{collections::HashSet, sync::Arc};

use team_sorter_back::{
    config::AppConfig,
    dao::roster_store::memory::MemoryRosterStore,
    dto::{draw::DrawTeamsRequest, roster::CreatePlayerRequest},
    services::{
        draw_service, roster_service,
        team_sorter::{AssignmentError, assign_teams},
    },
    state::{
        AppState,
        roster::{Player, Role},
    },
};

fn players(composition: &[(Role, usize)]) -> Vec<Player> {
    composition
        .iter()
        .flat_map(|(role, count)| {
            (0..*count).map(move |i| {
                Player::with_id(format!("{role:?}-{i}"), format!("{role:?} {i}"), *role)
            })
        })
        .collect()
}

#[test]
fn mixed_roles_are_spread_one_per_team() {
    let input = players(&[
        (Role::Captain, 3),
        (Role::Goalkeeper, 3),
        (Role::Child, 3),
        (Role::Regular, 4),
    ]);
    let teams = assign_teams(&input, 3).unwrap();

    assert_eq!(teams.len(), 3);
    for team in &teams {
        assert_eq!(team.count_role(Role::Captain), 1);
        assert_eq!(team.count_role(Role::Goalkeeper), 1);
    }
    let sizes: Vec<usize> = teams.iter().map(|team| team.len()).collect();
    let (min, max) = (sizes.iter().min().unwrap(), sizes.iter().max().unwrap());
    assert!(max - min <= 1);

    let ids: HashSet<&str> = teams
        .iter()
        .flat_map(|team| team.members.iter().map(|player| player.id.as_str()))
        .collect();
    assert_eq!(ids.len(), input.len());
}

#[test]
fn too_few_players_names_the_minimum() {
    let input = players(&[(Role::Regular, 2)]);
    let err = assign_teams(&input, 3).unwrap_err();
    assert_eq!(err, AssignmentError::InsufficientPlayers { required: 3 });
    assert!(err.to_string().contains('3'));
}

#[tokio::test]
async fn organizer_flow_draws_from_present_players() {
    let state = AppState::new(AppConfig::default());
    state
        .install_roster_store(Arc::new(MemoryRosterStore::new()))
        .await;

    let mut ids = Vec::new();
    for (name, role) in [
        ("Ana", Role::Captain),
        ("Bia", Role::Captain),
        ("Caio", Role::Regular),
        ("Duda", Role::Regular),
        ("Edu", Role::Regular),
        ("Fabi", Role::Regular),
        ("Gui", Role::Regular),
    ] {
        let player = roster_service::add_player(
            &state,
            CreatePlayerRequest {
                name: name.into(),
                role,
            },
        )
        .await
        .unwrap();
        ids.push(player.id);
    }
    roster_service::toggle_presence(&state, &ids[6])
        .await
        .unwrap();

    let draw = draw_service::draw_teams(&state, DrawTeamsRequest { team_count: 2 })
        .await
        .unwrap();
    assert_eq!(draw.present_count, 6);
    for team in &draw.teams {
        assert_eq!(team.size, 3);
        assert_eq!(
            team.players
                .iter()
                .filter(|player| player.role == Role::Captain)
                .count(),
            1
        );
    }
}
