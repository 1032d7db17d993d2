//! Match orchestration: stat entry, finalization with bracket progression,
//! round/stage generation, standings and bracket queries.
//!
//! Every mutating operation re-fetches the match from the store under the
//! progression gate before touching it, and duplicate finalize triggers are
//! absorbed as no-ops.

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::{
    dao::cup_store::{CupStore, MatchFilter},
    dto::matches::{
        BracketRound, GeneratedRound, MatchListQuery, MatchSummary, SideStatsRequest, StandingsRow,
    },
    engine::{StageContext, resolver, standings},
    error::ServiceError,
    services::{
        cup_service::require_cup,
        events::{
            broadcast_bracket_advanced, broadcast_match_finalized, broadcast_match_reopened,
            broadcast_round_complete, broadcast_round_generated, broadcast_team_updated,
        },
    },
    state::{
        SharedState,
        cup::{Cup, Match, Outcome, StatLine, Team},
        match_phase::{MatchEvent, MatchPhase, Side},
    },
};

/// Generate whatever comes next for the cup: the opening draw, the next
/// knockout round, or the next stage once the current one is exhausted.
pub async fn generate_round(
    state: &SharedState,
    slug: &str,
) -> Result<GeneratedRound, ServiceError> {
    let _gate = state.lock_progression().await;
    let store = state.require_cup_store().await?;
    let cup = require_cup(&store, slug).await?;

    let teams = load_teams(&store, slug).await?;
    let all_matches = load_matches(&store, slug).await?;

    let stage_idx = next_stage_index(&cup, &teams, &all_matches)?;
    let Some(strategy) = cup.format.stages.get(stage_idx).copied() else {
        return Err(ServiceError::InvalidState(
            "tournament is complete; there is no further stage to generate".into(),
        ));
    };

    let entrants: Vec<Team> = teams
        .iter()
        .filter(|team| team.is_in_contention())
        .cloned()
        .collect();

    // Seeds come from the standings over every earlier stage; with no prior
    // matches this degenerates to registration order.
    let prior: Vec<Match> = all_matches
        .iter()
        .filter(|m| m.stage < stage_idx)
        .cloned()
        .collect();
    let seeds: Vec<String> = standings::compute(&entrants, &prior, cup.format.ranking)
        .into_iter()
        .map(|entry| entry.team)
        .collect();

    let stage_matches: Vec<Match> = all_matches
        .iter()
        .filter(|m| m.stage == stage_idx)
        .cloned()
        .collect();
    let round_base = match stage_matches.iter().map(|m| m.round).min() {
        Some(first) => first,
        None => all_matches.iter().map(|m| m.round).max().unwrap_or(0) + 1,
    };

    let ctx = StageContext {
        stage: stage_idx,
        round_base,
        entrants: &entrants,
        seeds: &seeds,
        matches: &stage_matches,
    };
    let plan = strategy.generate_next(&ctx)?;

    for m in &plan.matches {
        store.save_match(m.clone().into_entity(slug)).await?;
    }

    let summaries: Vec<MatchSummary> = plan.matches.into_iter().map(Into::into).collect();
    info!(
        cup = slug,
        stage = stage_idx,
        round = plan.round,
        count = summaries.len(),
        "generated round"
    );
    broadcast_round_generated(state, slug, plan.round, &summaries);

    Ok(GeneratedRound {
        round: plan.round,
        matches: summaries,
    })
}

/// Record one side's per-player stats on a match.
///
/// Partial by design: the other side may be entered later, by a different
/// staff member. The match is re-fetched first so concurrent edits converge
/// on last-write-wins.
pub async fn enter_side_stats(
    state: &SharedState,
    slug: &str,
    match_id: &str,
    side: Side,
    request: SideStatsRequest,
) -> Result<MatchSummary, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    let store = state.require_cup_store().await?;
    let cup = require_cup(&store, slug).await?;
    let mut m = require_match(&store, slug, match_id).await?;

    MatchPhase::of(&m).apply(MatchEvent::StatsEntered(side))?;

    let team_name = match side {
        Side::Team1 => m.team1.clone(),
        Side::Team2 => m.team2.clone(),
    };
    let Some(team) = store.find_team(slug, &team_name).await? else {
        return Err(ServiceError::NotFound(format!(
            "team `{team_name}` not found"
        )));
    };
    let team = team.into_team();

    if request.lines.len() != cup.format.roster_size {
        return Err(ServiceError::InvalidInput(format!(
            "expected {} stat lines, got {}",
            cup.format.roster_size,
            request.lines.len()
        )));
    }

    let mut lines = Vec::with_capacity(request.lines.len());
    let mut seen = std::collections::HashSet::new();
    for line in &request.lines {
        let tag = line.tag.trim().to_owned();
        if !seen.insert(tag.clone()) {
            return Err(ServiceError::InvalidInput(format!(
                "duplicate tag {tag} in the submitted stats"
            )));
        }
        let Some(member) = team.roster.iter().find(|member| member.tag == tag) else {
            return Err(ServiceError::InvalidInput(format!(
                "player {tag} is not on team `{team_name}`'s roster"
            )));
        };
        lines.push(StatLine {
            tag: member.tag.clone(),
            name: member.name.clone(),
            stars: line.stars,
            percent: line.percent,
        });
    }

    match side {
        Side::Team1 => m.team1_stats = lines,
        Side::Team2 => m.team2_stats = lines,
    }
    store.save_match(m.clone().into_entity(slug)).await?;
    info!(cup = slug, id = match_id, ?side, "stats recorded");

    Ok(m.into())
}

/// Finalize a match: resolve the winner, persist, and advance the bracket.
///
/// Re-delivering the finalize trigger for an already-completed match is a
/// defined no-op returning the current record.
pub async fn finalize_match(
    state: &SharedState,
    slug: &str,
    match_id: &str,
) -> Result<MatchSummary, ServiceError> {
    let _gate = state.lock_progression().await;
    let store = state.require_cup_store().await?;
    let cup = require_cup(&store, slug).await?;
    let mut m = require_match(&store, slug, match_id).await?;

    if m.completed {
        info!(
            cup = slug,
            id = match_id,
            "finalize re-delivered for a completed match; absorbing"
        );
        return Ok(m.into());
    }

    if m.team1_stats.is_empty() || m.team2_stats.is_empty() {
        return Err(ServiceError::InvalidState(
            "both teams' stats must be recorded before finalizing".into(),
        ));
    }
    MatchPhase::of(&m).apply(MatchEvent::Finalized)?;

    let resolution = resolver::resolve(
        &m.team1_stats,
        &m.team2_stats,
        cup.format.roster_size,
        cup.format.percent_aggregation,
    )?;

    m.score1 = resolution.side1.stars;
    m.score2 = resolution.side2.stars;
    m.percent1 = resolution.side1.percent;
    m.percent2 = resolution.side2.percent;
    m.outcome = Some(match resolution.verdict {
        resolver::Verdict::Side1 => Outcome::Winner(m.team1.clone()),
        resolver::Verdict::Side2 => Outcome::Winner(m.team2.clone()),
        resolver::Verdict::Tie => Outcome::Tie,
    });
    m.completed = true;
    store.save_match(m.clone().into_entity(slug)).await?;
    info!(cup = slug, id = match_id, winner = ?m.winner_name(), "match finalized");

    let created = advance_bracket(state, &store, slug, &cup, &m).await?;

    let summary = MatchSummary::from(m);
    broadcast_match_finalized(state, summary.clone());
    if !created.is_empty() {
        broadcast_bracket_advanced(state, slug, &created);
    }

    Ok(summary)
}

/// Reopen a completed match so its result can be edited and re-finalized.
pub async fn reopen_match(
    state: &SharedState,
    slug: &str,
    match_id: &str,
) -> Result<MatchSummary, ServiceError> {
    let _gate = state.lock_progression().await;
    let store = state.require_cup_store().await?;
    require_cup(&store, slug).await?;
    let mut m = require_match(&store, slug, match_id).await?;

    MatchPhase::of(&m).apply(MatchEvent::Reopened)?;

    m.completed = false;
    m.outcome = None;
    store.save_match(m.clone().into_entity(slug)).await?;
    info!(cup = slug, id = match_id, "match reopened for editing");

    let summary = MatchSummary::from(m);
    broadcast_match_reopened(state, summary.clone());
    Ok(summary)
}

/// List a cup's matches, optionally filtered by round or completion state.
pub async fn list_matches(
    state: &SharedState,
    slug: &str,
    query: MatchListQuery,
) -> Result<Vec<MatchSummary>, ServiceError> {
    let store = state.require_cup_store().await?;
    require_cup(&store, slug).await?;
    let matches = store
        .list_matches(
            slug,
            MatchFilter {
                round: query.round,
                completed: query.completed,
            },
        )
        .await?;
    Ok(matches
        .into_iter()
        .map(|entity| entity.into_match().into())
        .collect())
}

/// Compute the current standings table using the cup's ranking rule.
pub async fn standings(state: &SharedState, slug: &str) -> Result<Vec<StandingsRow>, ServiceError> {
    let store = state.require_cup_store().await?;
    let cup = require_cup(&store, slug).await?;

    let teams: Vec<Team> = load_teams(&store, slug)
        .await?
        .into_iter()
        .filter(|team| team.status == crate::state::cup::TeamStatus::Active)
        .collect();
    let matches = load_matches(&store, slug).await?;

    Ok(standings::compute(&teams, &matches, cup.format.ranking)
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Snapshot of the bracket: every match grouped by round.
pub async fn bracket(state: &SharedState, slug: &str) -> Result<Vec<BracketRound>, ServiceError> {
    let store = state.require_cup_store().await?;
    require_cup(&store, slug).await?;
    let matches = load_matches(&store, slug).await?;

    let mut rounds: Vec<BracketRound> = Vec::new();
    for m in matches {
        let summary = MatchSummary::from(m);
        match rounds.iter().position(|r| r.round == summary.round) {
            Some(i) => rounds[i].matches.push(summary),
            None => rounds.push(BracketRound {
                round: summary.round,
                matches: vec![summary],
            }),
        }
    }
    rounds.sort_by_key(|r| r.round);
    Ok(rounds)
}

/// Run the stage strategy's completion hook and apply its consequences:
/// create absent downstream nodes, flag eliminations, and report round
/// completion. Creation is guarded on absence so re-delivered triggers stay
/// idempotent.
async fn advance_bracket(
    state: &SharedState,
    store: &Arc<dyn CupStore>,
    slug: &str,
    cup: &Cup,
    completed: &Match,
) -> Result<Vec<MatchSummary>, ServiceError> {
    let Some(strategy) = cup.format.stages.get(completed.stage).copied() else {
        return Err(ServiceError::InvalidState(format!(
            "match `{}` references stage {} outside the cup format",
            completed.id, completed.stage
        )));
    };

    let teams = load_teams(store, slug).await?;
    let entrants: Vec<Team> = teams
        .iter()
        .filter(|team| team.is_in_contention())
        .cloned()
        .collect();
    let stage_matches: Vec<Match> = load_matches(store, slug)
        .await?
        .into_iter()
        .filter(|m| m.stage == completed.stage)
        .collect();
    let round_base = stage_matches
        .iter()
        .map(|m| m.round)
        .min()
        .unwrap_or(completed.round);

    let ctx = StageContext {
        stage: completed.stage,
        round_base,
        entrants: &entrants,
        seeds: &[],
        matches: &stage_matches,
    };
    let advancement = strategy.on_match_completed(&ctx, completed);

    let mut created = Vec::new();
    for node in advancement.new_matches {
        if store.find_match(slug, &node.id).await?.is_none() {
            store.save_match(node.clone().into_entity(slug)).await?;
            info!(cup = slug, id = %node.id, "bracket advanced");
            created.push(MatchSummary::from(node));
        }
    }

    for name in advancement.eliminated {
        let Some(entity) = store.find_team(slug, &name).await? else {
            continue;
        };
        let mut team = entity.into_team();
        if !team.eliminated {
            team.eliminated = true;
            store.save_team(team.clone().into_entity(slug)).await?;
            info!(cup = slug, team = %name, "team eliminated");
            broadcast_team_updated(state, team.into());
        }
    }

    if let Some(round) = advancement.completed_round {
        info!(cup = slug, round, "round complete");
        broadcast_round_complete(state, slug, round);
    }

    Ok(created)
}

/// Which stage the next generation step targets: the current stage while it
/// still has play left, the following one once it is exhausted, or — for
/// knockout stages feeding a fixed-size finale — once the survivor count has
/// been cut down to exactly what the finale seats.
fn next_stage_index(cup: &Cup, teams: &[Team], all_matches: &[Match]) -> Result<usize, ServiceError> {
    if all_matches.is_empty() {
        return Ok(0);
    }

    let current = all_matches.iter().map(|m| m.stage).max().unwrap_or(0);
    let Some(strategy) = cup.format.stages.get(current).copied() else {
        return Ok(current + 1);
    };

    let entrants: Vec<Team> = teams
        .iter()
        .filter(|team| team.is_in_contention())
        .cloned()
        .collect();
    let stage_matches: Vec<Match> = all_matches
        .iter()
        .filter(|m| m.stage == current)
        .cloned()
        .collect();
    let round_base = stage_matches
        .iter()
        .map(|m| m.round)
        .min()
        .unwrap_or(1);

    let ctx = StageContext {
        stage: current,
        round_base,
        entrants: &entrants,
        seeds: &[],
        matches: &stage_matches,
    };

    if strategy.stage_exhausted(&ctx) {
        return Ok(current + 1);
    }

    let all_played = !stage_matches.is_empty() && stage_matches.iter().all(|m| m.completed);
    let cut_ready = all_played
        && cup
            .format
            .stages
            .get(current + 1)
            .is_some_and(|next| entrants.len() == next.min_entrants());
    if cut_ready {
        Ok(current + 1)
    } else {
        Ok(current)
    }
}

async fn require_match(
    store: &Arc<dyn CupStore>,
    slug: &str,
    id: &str,
) -> Result<Match, ServiceError> {
    let Some(entity) = store.find_match(slug, id).await? else {
        return Err(ServiceError::NotFound(format!("match `{id}` not found")));
    };
    Ok(entity.into_match())
}

async fn load_teams(store: &Arc<dyn CupStore>, slug: &str) -> Result<Vec<Team>, ServiceError> {
    Ok(store
        .list_teams(slug)
        .await?
        .into_iter()
        .map(|entity| entity.into_team())
        .collect())
}

async fn load_matches(store: &Arc<dyn CupStore>, slug: &str) -> Result<Vec<Match>, ServiceError> {
    Ok(store
        .list_matches(slug, MatchFilter::default())
        .await?
        .into_iter()
        .map(|entity| entity.into_match())
        .collect())
}
