//! End-to-end progression scenarios over the in-memory store: full league +
//! page playoff, knockout cut into double elimination, cascade deletes and
//! result edits.

use std::sync::Arc;

use clash_cup_back::{
    config::AppConfig,
    dao::cup_store::memory::MemoryCupStore,
    dto::{
        cup::CreateCupRequest,
        matches::{MatchListQuery, MatchSummary, SideStatsRequest, StatLineInput},
        team::{RegisterTeamRequest, RosterSlotInput},
    },
    error::ServiceError,
    services::{cup_service, match_service, team_service},
    state::{AppState, SharedState, match_phase::Side},
};

async fn fresh_state() -> SharedState {
    let state = AppState::new(AppConfig::default());
    state.set_cup_store(Arc::new(MemoryCupStore::new())).await;
    state
}

async fn create_cup(state: &SharedState, slug: &str, format: &str) {
    cup_service::create_cup(
        state,
        CreateCupRequest {
            slug: slug.into(),
            name: format!("{slug} cup"),
            format: format.into(),
        },
    )
    .await
    .unwrap();
}

fn roster(team_idx: usize, size: usize) -> Vec<RosterSlotInput> {
    (0..size)
        .map(|p| RosterSlotInput {
            tag: format!("#T{team_idx}P{p}"),
            town_hall: None,
        })
        .collect()
}

async fn register_teams(state: &SharedState, slug: &str, count: usize, size: usize) {
    for i in 0..count {
        team_service::register_team(
            state,
            slug,
            RegisterTeamRequest {
                name: format!("Team {i}"),
                captain_tag: format!("#T{i}P0"),
                roster: roster(i, size),
            },
        )
        .await
        .unwrap();
    }
}

async fn all_matches(state: &SharedState, slug: &str) -> Vec<MatchSummary> {
    match_service::list_matches(state, slug, MatchListQuery::default())
        .await
        .unwrap()
}

async fn find_match(state: &SharedState, slug: &str, id: &str) -> MatchSummary {
    all_matches(state, slug)
        .await
        .into_iter()
        .find(|m| m.id == id)
        .unwrap_or_else(|| panic!("match {id} not found"))
}

/// Enter both sides' stats so `winner` takes the match, then finalize.
async fn play_match(state: &SharedState, slug: &str, id: &str, winner: &str) -> MatchSummary {
    let m = find_match(state, slug, id).await;
    let teams = team_service::list_teams(state, slug).await.unwrap();

    for (side, team_name) in [(Side::Team1, &m.team1), (Side::Team2, &m.team2)] {
        let team = teams.iter().find(|t| &t.name == team_name).unwrap();
        let wins = team_name == winner;
        let lines = team
            .roster
            .iter()
            .map(|slot| StatLineInput {
                tag: slot.tag.clone(),
                stars: if wins { 3 } else { 1 },
                percent: if wins { 100.0 } else { 50.0 },
            })
            .collect();
        match_service::enter_side_stats(state, slug, id, side, SideStatsRequest { lines })
            .await
            .unwrap();
    }

    match_service::finalize_match(state, slug, id).await.unwrap()
}

#[tokio::test]
async fn league_runs_through_page_playoff_to_a_title() {
    let state = fresh_state().await;
    create_cup(&state, "buc", "war5v5_league").await;
    register_teams(&state, "buc", 8, 5).await;

    // 8 teams: seven pre-drawn rounds of four, no bye ever persisted.
    let plan = match_service::generate_round(&state, "buc").await.unwrap();
    assert_eq!(plan.round, 1);
    assert_eq!(plan.matches.len(), 28);
    let drawn = all_matches(&state, "buc").await;
    assert_eq!(drawn.iter().map(|m| m.round).max(), Some(7));
    assert!(drawn.iter().all(|m| m.team1 != "BYE" && m.team2 != "BYE"));

    // Team 0 sweeps the league; other matches go to team1.
    for m in drawn {
        let winner = if m.team1 == "Team 0" || m.team2 == "Team 0" {
            "Team 0".to_owned()
        } else {
            m.team1.clone()
        };
        play_match(&state, "buc", &m.id, &winner).await;
    }

    let table = match_service::standings(&state, "buc").await.unwrap();
    assert_eq!(table[0].team, "Team 0");
    assert_eq!(table[0].played, 7);
    assert_eq!(table[0].points, 14);

    // League done: the next generation seeds the page playoff from the top 4.
    let playoff = match_service::generate_round(&state, "buc").await.unwrap();
    let ids: Vec<&str> = playoff.matches.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["PP_Q1", "PP_E1"]);
    let q1 = &playoff.matches[0];
    assert_eq!(q1.team1, table[0].team);
    assert_eq!(q1.team2, table[1].team);

    let q1 = play_match(&state, "buc", "PP_Q1", &q1.team1.clone()).await;
    let e1 = find_match(&state, "buc", "PP_E1").await;
    play_match(&state, "buc", "PP_E1", &e1.team1).await;

    // The semi-final pairs the qualifier loser with the eliminator winner.
    let sf = find_match(&state, "buc", "PP_SF").await;
    assert_eq!(sf.team1, q1.team2);
    assert_eq!(sf.team2, e1.team1);

    // Re-delivering the finalize trigger neither errors nor duplicates SF.
    match_service::finalize_match(&state, "buc", "PP_E1")
        .await
        .unwrap();
    let semis = all_matches(&state, "buc")
        .await
        .into_iter()
        .filter(|m| m.id == "PP_SF")
        .count();
    assert_eq!(semis, 1);

    play_match(&state, "buc", "PP_SF", &sf.team1.clone()).await;
    let gf = find_match(&state, "buc", "PP_GF").await;
    assert_eq!(gf.team1, q1.team1);
    assert_eq!(gf.team2, sf.team1);
    play_match(&state, "buc", "PP_GF", &gf.team1.clone()).await;

    // Nothing left to generate.
    let err = match_service::generate_round(&state, "buc")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test]
async fn playoff_cut_waits_for_the_league_to_finish() {
    let state = fresh_state().await;
    create_cup(&state, "early", "war5v5_league").await;
    register_teams(&state, "early", 4, 5).await;

    match_service::generate_round(&state, "early").await.unwrap();
    for m in all_matches(&state, "early").await {
        if m.round == 1 {
            let winner = m.team1.clone();
            play_match(&state, "early", &m.id, &winner).await;
        }
    }

    let err = match_service::generate_round(&state, "early")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::PrerequisiteNotMet { round: 2 }
    ));
}

#[tokio::test]
async fn knockout_cuts_to_double_elimination_at_four_survivors() {
    let state = fresh_state().await;
    create_cup(&state, "bsn", "war3v3_double_elim").await;
    register_teams(&state, "bsn", 8, 3).await;

    // The format carries an approval gate: nobody is in contention yet.
    let err = match_service::generate_round(&state, "bsn").await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InsufficientParticipants { needed: 2, got: 0 }
    ));
    for i in 0..8 {
        team_service::approve_team(&state, "bsn", &format!("Team {i}"))
            .await
            .unwrap();
    }

    // Opening knockout round, sequential seeding: adjacent registration pairs.
    let round1 = match_service::generate_round(&state, "bsn").await.unwrap();
    assert_eq!(round1.matches.len(), 4);
    for m in &round1.matches {
        let winner = m.team1.clone();
        play_match(&state, "bsn", &m.id, &winner).await;
    }

    // Losers carry the elimination flag.
    let teams = team_service::list_teams(&state, "bsn").await.unwrap();
    let eliminated: Vec<&str> = teams
        .iter()
        .filter(|t| t.eliminated)
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(eliminated, ["Team 1", "Team 3", "Team 5", "Team 7"]);

    // Four survivors: the next generation seeds the double elimination.
    let bracket = match_service::generate_round(&state, "bsn").await.unwrap();
    let ids: Vec<&str> = bracket.matches.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["UB_SF1", "UB_SF2"]);
    let sf1 = &bracket.matches[0];
    assert_eq!((sf1.team1.as_str(), sf1.team2.as_str()), ("Team 0", "Team 6"));
    let sf2 = &bracket.matches[1];
    assert_eq!((sf2.team1.as_str(), sf2.team2.as_str()), ("Team 2", "Team 4"));

    // First semi alone creates nothing; the second splits winners and losers.
    play_match(&state, "bsn", "UB_SF1", "Team 0").await;
    assert!(
        !all_matches(&state, "bsn").await.iter().any(|m| m.id == "UB_F"),
        "upper final waits for both semis"
    );
    play_match(&state, "bsn", "UB_SF2", "Team 2").await;

    let ub_final = find_match(&state, "bsn", "UB_F").await;
    assert_eq!(
        (ub_final.team1.as_str(), ub_final.team2.as_str()),
        ("Team 0", "Team 2")
    );
    let lb_r1 = find_match(&state, "bsn", "LB_R1").await;
    assert_eq!(
        (lb_r1.team1.as_str(), lb_r1.team2.as_str()),
        ("Team 6", "Team 4")
    );

    // Upper final completes before the losers bracket; the join still waits
    // for both feeders and pairs the lower survivor with the upper loser.
    play_match(&state, "bsn", "UB_F", "Team 0").await;
    assert!(
        !all_matches(&state, "bsn").await.iter().any(|m| m.id == "LB_SF"),
        "lower semi waits for LB_R1"
    );
    play_match(&state, "bsn", "LB_R1", "Team 4").await;

    let lb_sf = find_match(&state, "bsn", "LB_SF").await;
    assert_eq!(
        (lb_sf.team1.as_str(), lb_sf.team2.as_str()),
        ("Team 4", "Team 2")
    );
    play_match(&state, "bsn", "LB_SF", "Team 4").await;

    let gf = find_match(&state, "bsn", "GF").await;
    assert_eq!((gf.team1.as_str(), gf.team2.as_str()), ("Team 0", "Team 4"));
    play_match(&state, "bsn", "GF", "Team 4").await;

    let teams = team_service::list_teams(&state, "bsn").await.unwrap();
    for name in ["Team 6", "Team 2", "Team 0"] {
        assert!(
            teams.iter().find(|t| t.name == name).unwrap().eliminated,
            "{name} should be knocked out"
        );
    }
    assert!(!teams.iter().find(|t| t.name == "Team 4").unwrap().eliminated);
}

#[tokio::test]
async fn deleting_a_team_invalidates_its_pending_matches() {
    let state = fresh_state().await;
    create_cup(&state, "del", "war5v5_league").await;
    register_teams(&state, "del", 4, 5).await;

    match_service::generate_round(&state, "del").await.unwrap();
    assert_eq!(all_matches(&state, "del").await.len(), 6);

    // Play one of Team 3's matches, then remove the team.
    let played = all_matches(&state, "del")
        .await
        .into_iter()
        .find(|m| m.team1 == "Team 3" || m.team2 == "Team 3")
        .unwrap();
    let winner = played.team1.clone();
    play_match(&state, "del", &played.id, &winner).await;

    team_service::remove_team(&state, "del", "Team 3").await.unwrap();

    let remaining = all_matches(&state, "del").await;
    assert_eq!(remaining.len(), 4, "two pending matches removed");
    assert!(
        remaining.iter().any(|m| m.id == played.id),
        "the completed match stays as history"
    );
    assert!(
        remaining
            .iter()
            .filter(|m| !m.completed)
            .all(|m| m.team1 != "Team 3" && m.team2 != "Team 3")
    );
}

#[tokio::test]
async fn reopening_a_result_allows_a_corrected_winner() {
    let state = fresh_state().await;
    create_cup(&state, "edit", "war5v5_league").await;
    register_teams(&state, "edit", 2, 5).await;

    match_service::generate_round(&state, "edit").await.unwrap();
    let m = all_matches(&state, "edit").await.remove(0);
    let first = play_match(&state, "edit", &m.id, "Team 0").await;
    assert_eq!(first.winner.as_deref(), Some("Team 0"));

    // Duplicate finalize is absorbed as a no-op.
    let again = match_service::finalize_match(&state, "edit", &m.id)
        .await
        .unwrap();
    assert_eq!(again.winner.as_deref(), Some("Team 0"));

    let reopened = match_service::reopen_match(&state, "edit", &m.id)
        .await
        .unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.winner, None);

    let corrected = play_match(&state, "edit", &m.id, "Team 1").await;
    assert_eq!(corrected.winner.as_deref(), Some("Team 1"));

    let table = match_service::standings(&state, "edit").await.unwrap();
    assert_eq!(table[0].team, "Team 1");
    assert_eq!(table[0].points, 2);
}
