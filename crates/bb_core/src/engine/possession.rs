//! Possession mechanics: shooting, catching, the off-limits clamp and goal
//! detection.

use rand::Rng;
use std::cmp::Ordering;
use std::f32::consts::PI;

use crate::events::EngineEvent;
use crate::field::consts;
use crate::player::{PlayerId, PlayerState};

use super::{Locator, MatchEngine};

/// Launch velocity whose friction decay covers `distance` before stopping.
pub(crate) fn perfect_velocity(distance: f32) -> f32 {
    ((8.0 * distance).sqrt() - 1.0) / 2.0
}

impl MatchEngine {
    /// Releases the ball toward `target` with randomized aim and power.
    /// No-op unless `shooter` owns the ball, has held it long enough, and
    /// the target is neither the shooter's own spot nor a fallen player.
    pub(crate) fn shoot(&mut self, shooter: PlayerId, target: &Locator) {
        if self.ball.owner() != Some(shooter) {
            return;
        }
        if self.ball.owning_time < consts::MIN_OWNING_TICKS {
            return;
        }
        if let Locator::Player(id) = target {
            if self.players[*id].is_falling() {
                return;
            }
        }
        let from = self.players[shooter].coord;
        let to = self.locate(target);
        let distance = from.distance(to);
        if distance == 0.0 {
            return;
        }
        let perfect_angle = from.angle_to(to);
        let angle = perfect_angle
            + consts::SHOT_ANGLE_ERROR_MARGIN / 90.0 * PI * (self.rng.gen::<f32>() - 0.5);
        let velocity = match target {
            // A goal shot always goes at full power.
            Locator::OwnGoal | Locator::OppGoal => consts::SHOT_VELOCITY_MAX,
            _ => perfect_velocity(distance).min(consts::SHOT_VELOCITY_MAX),
        };
        let spread = 1.0 + consts::SHOT_VELOCITY_ERROR_MARGIN * (2.0 * self.rng.gen::<f32>() - 1.0);

        self.players[shooter].angle = angle;
        self.ball.coord = from;
        self.ball.angle = angle;
        self.ball.velocity = velocity * spread;
        self.ball.still = false;
        self.ball.set_owner(None);
        self.ball.clear_callers();
        for player in &mut self.players {
            if player.state() == PlayerState::Calling {
                player.set_state(PlayerState::Playing);
            }
        }
    }

    /// Resolves possession of a free ball. Candidates are taken nearest
    /// first; each one catches with probability shrinking as the ball gets
    /// faster, and a rolling ball can only be caught from its front half.
    pub(crate) fn try_catch(&mut self) {
        let ball_coord = self.ball.coord;
        let mut candidates: Vec<(PlayerId, f32)> = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, player)| !player.is_falling())
            .map(|(id, player)| (id, ball_coord.distance(player.coord)))
            .filter(|(_, dist)| *dist < consts::BALL_CATCHING_DIST)
            .collect();
        if !self.ball.still {
            let roll_angle = self.ball.angle;
            candidates.retain(|(id, _)| {
                (ball_coord.angle_to(self.players[*id].coord) - roll_angle).cos() > 0.0
            });
        }
        candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        for (id, _) in candidates {
            if self.rng.gen::<f32>() * consts::SHOT_VELOCITY_MAX > self.ball.velocity {
                self.ball.set_owner(Some(id));
                break;
            }
        }
    }

    /// Keeps a free ball on the canvas, and inside the goal mouth once a
    /// goal has halted play.
    pub(crate) fn clamp_ball_off_limits(&mut self) {
        let ball = &mut self.ball;
        ball.coord.x = ball
            .coord
            .x
            .clamp(consts::WIDTH_MARGIN, consts::CANVAS_WIDTH - consts::WIDTH_MARGIN);
        ball.coord.y = ball.coord.y.clamp(0.0, consts::CANVAS_HEIGHT);

        let behind_line = ball.coord.y < self.field.opp_goal().y + consts::GOAL_DETECTION_MARGIN
            || ball.coord.y > self.field.own_goal().y - consts::GOAL_DETECTION_MARGIN;
        if self.halted && behind_line {
            let goal_center_x = self.field.own_goal().x;
            ball.coord.x = ball
                .coord
                .x
                .clamp(goal_center_x - consts::GOAL_WIDTH / 2.0, goal_center_x + consts::GOAL_WIDTH / 2.0);
        }
    }

    pub(crate) fn check_goal(&mut self) {
        let goal_center_x = self.field.own_goal().x;
        let ball = self.ball.coord;
        if ball.x <= goal_center_x - consts::GOAL_WIDTH / 2.0
            || ball.x >= goal_center_x + consts::GOAL_WIDTH / 2.0
        {
            return;
        }
        if ball.y < self.field.opp_goal().y + consts::GOAL_DETECTION_MARGIN {
            self.score_goal(true);
        } else if ball.y > self.field.own_goal().y - consts::GOAL_DETECTION_MARGIN {
            self.score_goal(false);
        }
    }

    /// Books the goal, halts play and sets up celebration and the next
    /// kickoff. An unowned ball credits the last player who touched it.
    fn score_goal(&mut self, for_own_team: bool) {
        if for_own_team {
            self.own_score += 1;
        } else {
            self.opp_score += 1;
        }
        let scorer = self.ball.owner().or_else(|| self.ball.former_owner());
        for (id, player) in self.players.iter_mut().enumerate() {
            if player.own_team == for_own_team {
                if scorer == Some(id) {
                    player.set_state(PlayerState::Celebrating);
                } else {
                    player.set_state(PlayerState::CoCelebrating);
                }
            } else {
                player.set_state(PlayerState::Crying);
            }
        }
        self.halted = true;
        self.own_team_kicks_off = !for_own_team;
        tracing::info!(
            own_team = for_own_team,
            scorer = ?scorer,
            own_score = self.own_score,
            opp_score = self.opp_score,
            "goal scored"
        );
        self.events.push(EngineEvent::GoalScored { own_team: for_own_team, scorer });
        self.events.push(EngineEvent::KickOffReady { period: self.period });
    }
}
