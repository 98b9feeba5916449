//! Ball entity: rolling physics, possession bookkeeping and pass callers.

use crate::geometry::{Dir, Point};
use crate::player::{Player, PlayerId};

/// Sprite size, used by the render-position derivation.
const BALL_WIDTH: f32 = 20.0;
const BALL_HEIGHT: f32 = 20.0;

/// A player who has called for the ball, with the ticks waited so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub player: PlayerId,
    pub waited: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Ball {
    pub coord: Point,
    pub angle: f32,
    pub velocity: f32,
    pub still: bool,
    /// Ticks the current owner has held the ball.
    pub owning_time: u32,
    owner: Option<PlayerId>,
    former_owner: Option<PlayerId>,
    callers: Vec<Caller>,
}

impl Ball {
    pub fn new() -> Self {
        Self { still: true, ..Self::default() }
    }

    /// Exclusive owner of the ball, if any.
    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    /// Last owner before the current one; attributes goals scored by a
    /// ball that crossed the line unowned.
    pub fn former_owner(&self) -> Option<PlayerId> {
        self.former_owner
    }

    /// Transfers possession. The previous owner is remembered and the
    /// owning-time counter restarts.
    pub fn set_owner(&mut self, owner: Option<PlayerId>) {
        self.former_owner = self.owner;
        self.owner = owner;
        self.owning_time = 0;
    }

    /// One tick of free rolling: advance along the facing angle, then lose
    /// one unit of velocity to friction. A shot at velocity `v` therefore
    /// travels `v + (v-1) + ... + 1 = v(v+1)/2` units before stopping.
    pub fn compute_movement(&mut self) {
        self.still = self.velocity == 0.0;
        self.coord.x += self.velocity * self.angle.cos();
        self.coord.y += self.velocity * self.angle.sin();
        self.velocity = (self.velocity - 1.0).max(0.0);
    }

    pub fn callers(&self) -> &[Caller] {
        &self.callers
    }

    /// Registers a caller; an already-registered caller keeps its counter.
    pub fn register_caller(&mut self, player: PlayerId) {
        if !self.callers.iter().any(|c| c.player == player) {
            self.callers.push(Caller { player, waited: 0 });
        }
    }

    /// Advances every caller's wait counter by one tick.
    pub fn age_callers(&mut self) {
        for caller in &mut self.callers {
            caller.waited += 1;
        }
    }

    pub fn clear_callers(&mut self) {
        self.callers.clear();
    }
}

/// Presentation position of the ball. While owned, the ball is carried at
/// the owner's feet, offset by the owner's facing direction; the stored
/// coordinate is only authoritative for a free ball.
pub fn render_position(ball: &Ball, owner: Option<&Player>) -> Point {
    let owner = match owner {
        Some(owner) => owner,
        None => return ball.coord,
    };
    match Dir::from_angle(owner.angle) {
        Dir::Up => Point::new(owner.coord.x + BALL_WIDTH / 3.0, owner.coord.y - BALL_HEIGHT / 8.0),
        Dir::Down | Dir::Left => {
            Point::new(owner.coord.x - BALL_WIDTH / 3.0, owner.coord.y + BALL_HEIGHT / 8.0)
        }
        Dir::Right => Point::new(owner.coord.x + BALL_WIDTH / 3.0, owner.coord.y + BALL_HEIGHT / 8.0),
    }
}
