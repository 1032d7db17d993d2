//! Standings calculation: folds completed matches into per-team aggregates
//! and orders teams by the cup's configured ranking rule.

use serde::{Deserialize, Serialize};

use crate::state::cup::{Match, Outcome, Team};

/// Ranking key applied when ordering standings entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RankingRule {
    /// League scoring: points (win 2 / tie 1 / loss 0) then total percent.
    PointsPercent,
    /// Knockout scoring: wins, then total stars, then total percent.
    WinsStarsPercent,
}

/// Derived per-team aggregate; recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct StandingsEntry {
    /// Team name.
    pub team: String,
    /// Completed matches the team took part in.
    pub played: u32,
    /// Decisive wins.
    pub wins: u32,
    /// Decisive losses.
    pub losses: u32,
    /// Drawn matches.
    pub ties: u32,
    /// League points (win 2 / tie 1).
    pub points: u32,
    /// Accumulated stars across completed matches.
    pub total_stars: u32,
    /// Accumulated match percent aggregates. Stays `0.0` for unplayed teams;
    /// nothing here ever divides by the match count.
    pub total_percent: f64,
}

impl StandingsEntry {
    fn new(team: &str) -> Self {
        Self {
            team: team.to_owned(),
            played: 0,
            wins: 0,
            losses: 0,
            ties: 0,
            points: 0,
            total_stars: 0,
            total_percent: 0.0,
        }
    }

    fn credit_side(&mut self, stars: u32, percent: f64) {
        self.played += 1;
        self.total_stars += stars;
        self.total_percent += percent;
    }
}

/// Fold `matches` into a ranked table over `teams`.
///
/// Matches referencing teams outside `teams` (for example sides of a deleted
/// team) contribute nothing for the missing side. Teams without any completed
/// match keep all-zero aggregates and therefore rank last among equals.
pub fn compute(teams: &[Team], matches: &[Match], rule: RankingRule) -> Vec<StandingsEntry> {
    let mut table: Vec<StandingsEntry> = teams
        .iter()
        .map(|team| StandingsEntry::new(&team.name))
        .collect();

    for m in matches.iter().filter(|m| m.completed) {
        let idx1 = table.iter().position(|entry| entry.team == m.team1);
        let idx2 = table.iter().position(|entry| entry.team == m.team2);

        if let Some(i) = idx1 {
            table[i].credit_side(m.score1, m.percent1);
        }
        if let Some(i) = idx2 {
            table[i].credit_side(m.score2, m.percent2);
        }

        match &m.outcome {
            Some(Outcome::Tie) => {
                if let Some(i) = idx1 {
                    table[i].ties += 1;
                    table[i].points += 1;
                }
                if let Some(i) = idx2 {
                    table[i].ties += 1;
                    table[i].points += 1;
                }
            }
            Some(Outcome::Winner(winner)) => {
                let (winner_idx, loser_idx) = if *winner == m.team1 {
                    (idx1, idx2)
                } else {
                    (idx2, idx1)
                };
                if let Some(i) = winner_idx {
                    table[i].wins += 1;
                    table[i].points += 2;
                }
                if let Some(i) = loser_idx {
                    table[i].losses += 1;
                }
            }
            None => {}
        }
    }

    match rule {
        RankingRule::PointsPercent => table.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then(b.total_percent.total_cmp(&a.total_percent))
        }),
        RankingRule::WinsStarsPercent => table.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then(b.total_stars.cmp(&a.total_stars))
                .then(b.total_percent.total_cmp(&a.total_percent))
        }),
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::cup::{Match, TeamStatus};
    use std::time::SystemTime;

    fn team(name: &str) -> Team {
        Team {
            name: name.into(),
            captain_tag: "#CAP".into(),
            captain_name: "Captain".into(),
            roster: Vec::new(),
            eliminated: false,
            status: TeamStatus::Active,
            registered_at: SystemTime::UNIX_EPOCH,
        }
    }

    fn completed(
        id: &str,
        team1: &str,
        team2: &str,
        score: (u32, u32),
        percent: (f64, f64),
        outcome: Outcome,
    ) -> Match {
        let mut m = Match::new(id, id, 1, 0, None, team1, team2);
        m.completed = true;
        m.score1 = score.0;
        m.score2 = score.1;
        m.percent1 = percent.0;
        m.percent2 = percent.1;
        m.outcome = Some(outcome);
        m
    }

    #[test]
    fn league_points_order_wins_over_percent() {
        let teams = vec![team("Alpha"), team("Bravo"), team("Charlie")];
        let matches = vec![
            completed(
                "R1_M1",
                "Alpha",
                "Bravo",
                (9, 5),
                (85.0, 70.0),
                Outcome::Winner("Alpha".into()),
            ),
            completed(
                "R1_M2",
                "Bravo",
                "Charlie",
                (6, 6),
                (99.0, 99.0),
                Outcome::Tie,
            ),
        ];

        let table = compute(&teams, &matches, RankingRule::PointsPercent);
        assert_eq!(table[0].team, "Alpha");
        assert_eq!(table[0].points, 2);
        assert_eq!(table[1].team, "Bravo");
        assert_eq!(table[1].points, 1);
        assert_eq!(table[1].ties, 1);
        assert_eq!(table[2].team, "Charlie");
    }

    #[test]
    fn equal_points_break_on_total_percent() {
        let teams = vec![team("Alpha"), team("Bravo"), team("Charlie"), team("Delta")];
        let matches = vec![
            completed(
                "R1_M1",
                "Alpha",
                "Charlie",
                (9, 0),
                (80.0, 10.0),
                Outcome::Winner("Alpha".into()),
            ),
            completed(
                "R1_M2",
                "Bravo",
                "Delta",
                (9, 0),
                (95.0, 10.0),
                Outcome::Winner("Bravo".into()),
            ),
        ];

        let table = compute(&teams, &matches, RankingRule::PointsPercent);
        assert_eq!(table[0].team, "Bravo");
        assert_eq!(table[1].team, "Alpha");
    }

    #[test]
    fn knockout_rule_ranks_wins_then_stars() {
        let teams = vec![team("Alpha"), team("Bravo"), team("Charlie"), team("Delta")];
        let matches = vec![
            completed(
                "R1_M1",
                "Alpha",
                "Bravo",
                (7, 3),
                (200.0, 150.0),
                Outcome::Winner("Alpha".into()),
            ),
            completed(
                "R1_M2",
                "Charlie",
                "Delta",
                (9, 2),
                (210.0, 120.0),
                Outcome::Winner("Charlie".into()),
            ),
        ];

        let table = compute(&teams, &matches, RankingRule::WinsStarsPercent);
        assert_eq!(table[0].team, "Charlie");
        assert_eq!(table[0].total_stars, 9);
        assert_eq!(table[1].team, "Alpha");
    }

    #[test]
    fn unplayed_team_keeps_zeroes_and_ranks_last() {
        let teams = vec![team("Alpha"), team("Bravo"), team("Idle")];
        let matches = vec![completed(
            "R1_M1",
            "Alpha",
            "Bravo",
            (5, 4),
            (75.0, 74.0),
            Outcome::Winner("Alpha".into()),
        )];

        let table = compute(&teams, &matches, RankingRule::PointsPercent);
        let idle = table.iter().find(|entry| entry.team == "Idle").unwrap();
        assert_eq!(idle.played, 0);
        assert_eq!(idle.total_percent, 0.0);
        assert_eq!(table[2].team, "Idle");
    }

    #[test]
    fn sides_of_unknown_teams_are_skipped() {
        let teams = vec![team("Alpha")];
        let matches = vec![completed(
            "R1_M1",
            "Alpha",
            "Ghost",
            (5, 9),
            (75.0, 90.0),
            Outcome::Winner("Ghost".into()),
        )];

        let table = compute(&teams, &matches, RankingRule::PointsPercent);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].losses, 1);
        assert_eq!(table[0].points, 0);
    }
}
