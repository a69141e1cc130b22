//! Team assignment engine: splits a list of present players into balanced teams.
//!
//! Captains and goalkeepers are seated one per team when their count matches the number of
//! teams; everyone else is shuffled and dealt to the currently smallest team. The engine is a
//! pure function over its input: it clones what it needs and never touches the caller's slice.

use rand::{Rng, rng, seq::SliceRandom};
use thiserror::Error;

use crate::state::roster::{Player, Role};

/// Smallest number of teams a draw can produce.
pub const MIN_TEAM_COUNT: usize = 2;

/// Reasons a draw request is rejected. None of them are retryable without changing the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    /// Fewer than two teams were requested.
    #[error("at least 2 teams are required (got {0})")]
    InvalidTeamCount(usize),
    /// The input list is empty.
    #[error("no players to distribute")]
    NoPlayers,
    /// Fewer players than the minimum for the requested team count.
    #[error("at least {required} players are required for the draw")]
    InsufficientPlayers {
        /// Smallest player count accepted.
        required: usize,
    },
    /// Captains present but not one per team.
    #[error("the number of captains must be 0 or equal to the number of teams ({team_count}), found {found}")]
    InvalidCaptainCount {
        /// Requested number of teams.
        team_count: usize,
        /// Captains among the players.
        found: usize,
    },
    /// Goalkeepers present but not one per team.
    #[error("the number of goalkeepers must be 0 or equal to the number of teams ({team_count}), found {found}")]
    InvalidGoalkeeperCount {
        /// Requested number of teams.
        team_count: usize,
        /// Goalkeepers among the players.
        found: usize,
    },
}

/// One team produced by a draw. Index in the returned list is the team number minus one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Team {
    /// Members in seating order.
    pub members: Vec<Player>,
}

impl Team {
    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the team has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of members holding `role`.
    pub fn count_role(&self, role: Role) -> usize {
        self.members.iter().filter(|p| p.role == role).count()
    }
}

/// Split `players` into exactly `team_count` teams using the thread-local RNG.
pub fn assign_teams(players: &[Player], team_count: usize) -> Result<Vec<Team>, AssignmentError> {
    assign_teams_with_rng(players, team_count, &mut rng())
}

/// Same as [`assign_teams`] with an explicit random source.
pub fn assign_teams_with_rng<R: Rng + ?Sized>(
    players: &[Player],
    team_count: usize,
    rng: &mut R,
) -> Result<Vec<Team>, AssignmentError> {
    let groups = RoleGroups::split(players);
    validate(&groups, players.len(), team_count)?;

    let mut teams = vec![Team::default(); team_count];
    let mut pool: Vec<Player> = groups.regulars.into_iter().cloned().collect();

    for seeded in [groups.captains, groups.goalkeepers] {
        if seeded.len() == team_count {
            seat_one_per_team(&mut teams, seeded, rng);
        } else {
            pool.extend(seeded.into_iter().cloned());
        }
    }

    pool.shuffle(rng);
    for player in pool {
        let index = smallest_team(&teams);
        teams[index].members.push(player);
    }

    Ok(teams)
}

/// References into the input grouped by how the engine places them.
struct RoleGroups<'a> {
    captains: Vec<&'a Player>,
    goalkeepers: Vec<&'a Player>,
    /// Regular players and children, in input order.
    regulars: Vec<&'a Player>,
}

impl<'a> RoleGroups<'a> {
    fn split(players: &'a [Player]) -> Self {
        let mut groups = Self {
            captains: Vec::new(),
            goalkeepers: Vec::new(),
            regulars: Vec::new(),
        };
        for player in players {
            if !player.role.is_seeded() {
                groups.regulars.push(player);
            } else if player.role == Role::Captain {
                groups.captains.push(player);
            } else {
                groups.goalkeepers.push(player);
            }
        }
        groups
    }
}

fn validate(
    groups: &RoleGroups<'_>,
    total: usize,
    team_count: usize,
) -> Result<(), AssignmentError> {
    if team_count < MIN_TEAM_COUNT {
        return Err(AssignmentError::InvalidTeamCount(team_count));
    }
    if total == 0 {
        return Err(AssignmentError::NoPlayers);
    }
    if total < team_count {
        return Err(AssignmentError::InsufficientPlayers {
            required: team_count,
        });
    }

    let captains = groups.captains.len();
    if captains > 0 && captains != team_count {
        return Err(AssignmentError::InvalidCaptainCount {
            team_count,
            found: captains,
        });
    }

    let goalkeepers = groups.goalkeepers.len();
    if goalkeepers > 0 && goalkeepers != team_count {
        return Err(AssignmentError::InvalidGoalkeeperCount {
            team_count,
            found: goalkeepers,
        });
    }

    Ok(())
}

/// Shuffle `seeded` and hand the i-th player to the i-th team.
fn seat_one_per_team<R: Rng + ?Sized>(teams: &mut [Team], mut seeded: Vec<&Player>, rng: &mut R) {
    seeded.shuffle(rng);
    for (team, player) in teams.iter_mut().zip(seeded) {
        team.members.push(player.clone());
    }
}

/// Index of the team with the fewest members; the lowest index wins ties.
fn smallest_team(teams: &[Team]) -> usize {
    let mut best = 0;
    for (index, team) in teams.iter().enumerate().skip(1) {
        if team.len() < teams[best].len() {
            best = index;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn players(composition: &[(Role, usize)]) -> Vec<Player> {
        let mut out = Vec::new();
        for &(role, count) in composition {
            for n in 0..count {
                let id = format!("{role:?}-{n}").to_lowercase();
                out.push(Player::with_id(id.clone(), id, role));
            }
        }
        out
    }

    fn sizes(teams: &[Team]) -> Vec<usize> {
        teams.iter().map(Team::len).collect()
    }

    fn assert_partition(input: &[Player], teams: &[Team]) {
        let mut seen = HashSet::new();
        for team in teams {
            for member in &team.members {
                assert!(seen.insert(member.id.clone()), "{} placed twice", member.id);
            }
        }
        let expected: HashSet<_> = input.iter().map(|p| p.id.clone()).collect();
        assert_eq!(seen, expected);
    }

    fn assert_balanced(teams: &[Team]) {
        let sizes = sizes(teams);
        let max = sizes.iter().max().copied().unwrap_or(0);
        let min = sizes.iter().min().copied().unwrap_or(0);
        assert!(max - min <= 1, "unbalanced sizes {sizes:?}");
    }

    #[test]
    fn six_regulars_split_three_and_three() {
        let input = players(&[(Role::Regular, 6)]);
        let teams = assign_teams(&input, 2).unwrap();
        assert_eq!(sizes(&teams), vec![3, 3]);
        assert_partition(&input, &teams);
    }

    #[test]
    fn captains_are_seated_one_per_team() {
        let input = players(&[(Role::Captain, 2), (Role::Regular, 4)]);
        for _ in 0..50 {
            let teams = assign_teams(&input, 2).unwrap();
            for team in &teams {
                assert_eq!(team.count_role(Role::Captain), 1);
                assert_eq!(team.count_role(Role::Regular), 2);
            }
            assert_partition(&input, &teams);
        }
    }

    #[test]
    fn one_of_each_special_role_per_team() {
        let input = players(&[(Role::Captain, 3), (Role::Goalkeeper, 3), (Role::Child, 3)]);
        for _ in 0..50 {
            let teams = assign_teams(&input, 3).unwrap();
            assert_eq!(teams.len(), 3);
            for team in &teams {
                assert_eq!(team.count_role(Role::Captain), 1);
                assert_eq!(team.count_role(Role::Goalkeeper), 1);
                assert_eq!(team.count_role(Role::Child), 1);
            }
        }
    }

    #[test]
    fn seeded_captain_leads_each_bucket() {
        let input = players(&[(Role::Captain, 3), (Role::Regular, 7)]);
        let teams = assign_teams(&input, 3).unwrap();
        for team in &teams {
            assert_eq!(team.members[0].role, Role::Captain);
        }
        assert_balanced(&teams);
    }

    #[test]
    fn rejects_fewer_players_than_teams() {
        let input = players(&[(Role::Regular, 2)]);
        let err = assign_teams(&input, 3).unwrap_err();
        assert_eq!(err, AssignmentError::InsufficientPlayers { required: 3 });
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn rejects_partial_captain_count() {
        let input = players(&[(Role::Regular, 4), (Role::Captain, 1)]);
        assert_eq!(
            assign_teams(&input, 2).unwrap_err(),
            AssignmentError::InvalidCaptainCount {
                team_count: 2,
                found: 1
            }
        );

        let input = players(&[(Role::Captain, 1), (Role::Regular, 5)]);
        assert!(matches!(
            assign_teams(&input, 2),
            Err(AssignmentError::InvalidCaptainCount { .. })
        ));
    }

    #[test]
    fn rejects_partial_goalkeeper_count() {
        let input = players(&[(Role::Goalkeeper, 3), (Role::Regular, 5)]);
        assert_eq!(
            assign_teams(&input, 2).unwrap_err(),
            AssignmentError::InvalidGoalkeeperCount {
                team_count: 2,
                found: 3
            }
        );
    }

    #[test]
    fn captain_check_runs_before_goalkeeper_check() {
        let input = players(&[(Role::Captain, 1), (Role::Goalkeeper, 1), (Role::Regular, 4)]);
        assert!(matches!(
            assign_teams(&input, 2),
            Err(AssignmentError::InvalidCaptainCount { .. })
        ));
    }

    #[test]
    fn insufficient_players_wins_over_role_errors() {
        let input = players(&[(Role::Captain, 1)]);
        assert_eq!(
            assign_teams(&input, 2).unwrap_err(),
            AssignmentError::InsufficientPlayers { required: 2 }
        );
    }

    #[test]
    fn rejects_degenerate_requests() {
        let input = players(&[(Role::Regular, 4)]);
        assert_eq!(
            assign_teams(&input, 1).unwrap_err(),
            AssignmentError::InvalidTeamCount(1)
        );
        assert_eq!(
            assign_teams(&input, 0).unwrap_err(),
            AssignmentError::InvalidTeamCount(0)
        );
        assert_eq!(assign_teams(&[], 2).unwrap_err(), AssignmentError::NoPlayers);
    }

    #[test]
    fn balance_holds_across_mixed_rosters() {
        let mut rng = StdRng::seed_from_u64(7);
        for team_count in 2..=5 {
            for extra in 0..12 {
                let input = players(&[
                    (Role::Captain, team_count),
                    (Role::Regular, extra),
                    (Role::Child, extra / 3),
                ]);
                let teams = assign_teams_with_rng(&input, team_count, &mut rng).unwrap();
                assert_eq!(teams.len(), team_count);
                assert_balanced(&teams);
                assert_partition(&input, &teams);
            }
        }
    }

    #[test]
    fn caller_slice_is_left_untouched() {
        let input = players(&[(Role::Captain, 2), (Role::Regular, 6)]);
        let before = input.clone();
        let _ = assign_teams(&input, 2).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn draws_vary_between_calls() {
        let input = players(&[(Role::Regular, 8)]);
        let outcomes: HashSet<Vec<String>> = (0..64)
            .map(|_| {
                let teams = assign_teams(&input, 2).unwrap();
                let mut first: Vec<String> =
                    teams[0].members.iter().map(|p| p.id.clone()).collect();
                first.sort();
                first
            })
            .collect();
        assert!(outcomes.len() > 1);
    }

    #[test]
    fn same_seed_gives_same_draw() {
        let input = players(&[(Role::Goalkeeper, 2), (Role::Regular, 7)]);
        let a = assign_teams_with_rng(&input, 2, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = assign_teams_with_rng(&input, 2, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    /// Distinct players seated on team 1 with `role` across many seeded draws.
    fn first_team_seat_variety(role: Role) -> usize {
        let input = players(&[(role, 3), (Role::Regular, 3)]);
        let mut rng = StdRng::seed_from_u64(11);
        (0..64)
            .map(|_| {
                let teams = assign_teams_with_rng(&input, 3, &mut rng).unwrap();
                teams[0]
                    .members
                    .iter()
                    .find(|p| p.role == role)
                    .map(|p| p.id.clone())
                    .unwrap()
            })
            .collect::<HashSet<_>>()
            .len()
    }

    #[test]
    fn captain_seats_are_shuffled_between_draws() {
        assert_eq!(first_team_seat_variety(Role::Captain), 3);
    }

    #[test]
    fn goalkeeper_seats_are_shuffled_between_draws() {
        assert_eq!(first_team_seat_variety(Role::Goalkeeper), 3);
    }

    #[test]
    fn split_sends_unseeded_roles_to_the_pool() {
        let input = players(&[
            (Role::Captain, 2),
            (Role::Goalkeeper, 1),
            (Role::Child, 2),
            (Role::Regular, 3),
        ]);
        let groups = RoleGroups::split(&input);
        assert_eq!(groups.captains.len(), 2);
        assert_eq!(groups.goalkeepers.len(), 1);
        assert_eq!(groups.regulars.len(), 5);
    }

    #[test]
    fn smallest_team_prefers_lowest_index_on_ties() {
        let filler = Player::with_id("x".into(), "x".into(), Role::Regular);
        let teams = vec![
            Team {
                members: vec![filler.clone()],
            },
            Team::default(),
            Team::default(),
        ];
        assert_eq!(smallest_team(&teams), 1);
        assert_eq!(smallest_team(&[Team::default(), Team::default()]), 0);
    }
}
