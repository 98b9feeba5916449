//! Pairwise player collisions and ball stealing.

use rand::Rng;
use std::f32::consts::PI;

use crate::field::consts;
use crate::geometry::Point;
use crate::player::{PlayerId, PlayerState};

use super::MatchEngine;

impl MatchEngine {
    /// Separates `id` from every collidable player it overlaps and, when
    /// the pair straddles the ball, resolves the steal attempt.
    pub(crate) fn handle_collisions(&mut self, id: PlayerId) {
        for other in 0..self.players.len() {
            if other == id || !self.players[other].state().is_collidable() {
                continue;
            }
            let is_opponent = self.players[id].own_team != self.players[other].own_team;
            let collision_dist = if is_opponent {
                consts::OPPONENTS_COLLISION_DIST
            } else {
                consts::TEAMMATES_COLLISION_DIST
            };
            if self.players[id].coord.distance(self.players[other].coord) >= collision_dist {
                continue;
            }
            let middle = self.players[id].coord.midpoint(self.players[other].coord);
            let mut angle = self.players[id].coord.angle_to(self.players[other].coord);
            // Jitter the separation axis by +/- 22.5 degrees.
            angle += (self.rng.gen::<f32>() - 0.5) * PI / 4.0;
            let push = collision_dist * 1.1 / 2.0;
            self.players[id].coord =
                Point::new(middle.x - push * angle.cos(), middle.y - push * angle.sin());
            self.players[other].coord =
                Point::new(middle.x + push * angle.cos(), middle.y + push * angle.sin());

            if is_opponent && self.ball.owner() == Some(other) {
                self.try_steal(other, id, angle);
            } else if is_opponent && self.ball.owner() == Some(id) {
                self.try_steal(id, other, -angle);
            }
        }
    }

    /// A moving thief running at the owner within 45 degrees shoves them
    /// and drains energy; at zero energy the ball changes hands.
    fn try_steal(&mut self, owner: PlayerId, thief: PlayerId, angle_from_thief_to_owner: f32) {
        let thief_angle = self.players[thief].angle;
        if self.players[thief].still
            || (angle_from_thief_to_owner - thief_angle).cos() < (PI / 4.0).cos()
        {
            return;
        }
        if self.players[owner].state() != PlayerState::Calling {
            self.players[owner].set_state(PlayerState::Pushed);
        }
        // -1 when the thief arrives head-on, 1 from behind.
        let front_facing = (self.players[owner].angle - thief_angle).cos();
        let collision_loss = 5.0 * (front_facing - 3.0);
        let loss = self.rng.gen::<f32>() * collision_loss;
        self.players[owner].add_energy(loss);
        if self.players[owner].energy() == 0.0 {
            self.ball.set_owner(Some(thief));
            self.players[owner].set_state(PlayerState::Falling);
            tracing::debug!(owner, thief, "ball stolen");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::script::{CompiledProgram, CompiledPrograms};
    use std::sync::Arc;

    fn engine() -> MatchEngine {
        let idle = CompiledProgram::from_json("{}").expect("idle program compiles");
        let programs =
            CompiledPrograms { own: Arc::clone(&idle), opp: Arc::clone(&idle), entering: idle };
        let mut engine = MatchEngine::new(Field::new(), programs, 23);
        engine.kick_off();
        engine
    }

    /// Drops the thief (id 4) right of the ball owner (id 0), running at
    /// them head-on.
    fn park_thief(engine: &mut MatchEngine) {
        let owner = engine.players[0].coord;
        engine.players[4].coord = Point::new(owner.x + 10.0, owner.y);
        engine.players[4].angle = PI;
        engine.players[4].still = false;
    }

    #[test]
    fn test_steal_pushes_owner_and_takes_ball_at_zero_energy() {
        let mut engine = engine();
        park_thief(&mut engine);
        engine.handle_collisions(4);
        // One shove staggers the owner but cannot drain 100 energy.
        assert_eq!(engine.players[0].state(), PlayerState::Pushed);
        assert_eq!(engine.ball.owner(), Some(0));

        for _ in 0..200 {
            if engine.ball.owner() != Some(0) {
                break;
            }
            park_thief(&mut engine);
            engine.handle_collisions(4);
        }
        assert_eq!(engine.ball.owner(), Some(4));
        assert!(engine.players[0].is_falling());
        assert_eq!(engine.players[0].energy(), 0.0);
    }

    #[test]
    fn test_still_thief_cannot_steal() {
        let mut engine = engine();
        park_thief(&mut engine);
        engine.players[4].still = true;
        engine.handle_collisions(4);
        // Separation happens, possession does not move.
        assert!(
            engine.players[0].coord.distance(engine.players[4].coord)
                > consts::OPPONENTS_COLLISION_DIST
        );
        assert_eq!(engine.ball.owner(), Some(0));
        assert_eq!(engine.players[0].state(), PlayerState::Playing);
    }

    #[test]
    fn test_thief_facing_away_cannot_steal() {
        let mut engine = engine();
        park_thief(&mut engine);
        // Moving, but running away from the owner: outside the 45° gate.
        engine.players[4].angle = 0.0;
        engine.handle_collisions(4);
        assert_eq!(engine.ball.owner(), Some(0));
        assert_eq!(engine.players[0].state(), PlayerState::Playing);
    }

    #[test]
    fn test_teammates_separate_without_steal() {
        let mut engine = engine();
        let owner = engine.players[0].coord;
        engine.players[1].coord = Point::new(owner.x + 10.0, owner.y);
        engine.players[1].angle = PI;
        engine.players[1].still = false;
        engine.handle_collisions(1);
        assert!(
            engine.players[0].coord.distance(engine.players[1].coord)
                > consts::TEAMMATES_COLLISION_DIST
        );
        assert_eq!(engine.ball.owner(), Some(0));
        assert_eq!(engine.players[0].state(), PlayerState::Playing);
    }
}
