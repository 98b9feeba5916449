//! Movement resolution: walking, sprinting and avoidance steering.

use rand::Rng;
use std::f32::consts::FRAC_PI_2;

use crate::field::consts;
use crate::player::PlayerState;

use super::{Locator, MatchEngine};
use crate::player::PlayerId;

impl MatchEngine {
    /// Moves `id` one step toward `target`. Entering players stop on the
    /// target and greet; everyone else respects the move threshold unless
    /// they are carrying the ball toward the goal they attack.
    pub(crate) fn move_player(&mut self, id: PlayerId, target: &Locator, sprint: bool) {
        let target_coord = self.locate(target);
        let entering = self.players[id].state() == PlayerState::Entering;
        let dist = self.players[id].coord.distance(target_coord);
        if entering && dist < 2.0 {
            self.players[id].set_state(PlayerState::Greeting);
            return;
        }
        let carrying = self.ball.owner() == Some(id);
        let attacks_goal = match target {
            Locator::OwnGoal => !self.players[id].own_team,
            Locator::OppGoal => self.players[id].own_team,
            _ => false,
        };
        if !entering && !(carrying && attacks_goal) && dist < consts::MOVE_THRESHOLD {
            return;
        }

        let direct = self.players[id].coord.angle_to(target_coord);
        let corrected = self.avoid_collision_angle(id, direct);
        let mut velocity = if carrying {
            consts::BALL_OWNER_VELOCITY
        } else {
            consts::NON_BALL_OWNER_VELOCITY
        };
        if sprint {
            velocity *= consts::SPRINTING_VELOCITY_FACTOR;
        }

        let player = &mut self.players[id];
        player.coord.x += velocity * corrected.cos();
        player.coord.y += velocity * corrected.sin();
        player.angle = corrected;
        player.still = false;
        if sprint && !entering {
            let drain = 2.0 * self.rng.gen::<f32>();
            self.players[id].add_energy(-drain);
        }
        if self.players[id].energy() == 0.0 {
            self.players[id].set_state(PlayerState::Falling);
            if carrying {
                // Drop the ball in place, nudged up for draw ordering.
                self.ball.set_owner(None);
                self.ball.coord = self.players[id].coord;
                self.ball.coord.y -= 7.0;
                self.ball.velocity = 0.0;
                self.ball.still = true;
            }
        }
    }

    /// Steers a ball carrier around the closest opponent. Players without
    /// the ball just take the direct bearing.
    fn avoid_collision_angle(&mut self, id: PlayerId, direct: f32) -> f32 {
        if self.ball.owner() != Some(id) {
            return direct;
        }
        let closest = self.get_player(id, false, None, None, true, &Locator::Player(id));
        if self.players[closest].is_falling() {
            return direct;
        }
        let here = self.players[id].coord;
        let opp_coord = self.players[closest].coord;
        if here.distance(opp_coord) > consts::OPPONENTS_AVOID_DIST {
            return direct;
        }
        let opp_angle = here.angle_to(opp_coord);
        // Opponent more than 90 degrees off course is not in the way.
        if (direct - opp_angle).cos() <= 0.0 {
            return direct;
        }
        if direct == opp_angle {
            // Dead ahead: pick a side at random.
            return if self.rng.gen::<f32>() > 0.5 {
                direct + FRAC_PI_2
            } else {
                direct - FRAC_PI_2
            };
        }
        if (direct - opp_angle).sin() > 0.0 {
            opp_angle + FRAC_PI_2
        } else {
            opp_angle - FRAC_PI_2
        }
    }
}
