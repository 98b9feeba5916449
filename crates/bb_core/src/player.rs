//! Player entity: identity, behavior state machine and animation clock.
//!
//! ## State transition rules
//! ```text
//! Entering → Greeting (reached walk-on target) → Waiting
//! Waiting → Playing (kickoff)
//! Playing → Pushed (steal attempt) → Playing (cooldown elapsed)
//! Playing/Pushed → Falling (energy hit 0) → Playing (cycle done, energy 100)
//! Playing → Calling (call for ball) → Playing (pass released)
//! Playing → Celebrating/CoCelebrating/Crying (goal) → Waiting (kickoff)
//! ```
//! Transitions out of Greeting/Falling/Crying are driven by the animation
//! clock completing a cycle, not by a fixed duration table. The clock is
//! presentation bookkeeping and never feeds back into physics.

use serde::{Deserialize, Serialize};

use crate::field::consts;
use crate::geometry::Point;

/// Index into the engine's fixed 8-player roster.
pub type PlayerId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Entering,
    Greeting,
    Playing,
    Pushed,
    Falling,
    Celebrating,
    CoCelebrating,
    Crying,
    Waiting,
    Calling,
}

impl PlayerState {
    /// Whether a player in this state runs its behavior program this tick.
    pub fn is_executable(&self) -> bool {
        matches!(self, PlayerState::Entering | PlayerState::Playing | PlayerState::Pushed)
    }

    /// Whether a player in this state takes part in pairwise collisions.
    pub fn is_collidable(&self) -> bool {
        matches!(self, PlayerState::Playing | PlayerState::Pushed | PlayerState::Calling)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlayerState::Entering => "Entering",
            PlayerState::Greeting => "Greeting",
            PlayerState::Playing => "Playing",
            PlayerState::Pushed => "Pushed",
            PlayerState::Falling => "Falling",
            PlayerState::Celebrating => "Celebrating",
            PlayerState::CoCelebrating => "CoCelebrating",
            PlayerState::Crying => "Crying",
            PlayerState::Waiting => "Waiting",
            PlayerState::Calling => "Calling",
        }
    }
}

/// One animation cycle: frame count, frames advanced per tick, and whether
/// the cycle loops or holds its last frame.
#[derive(Debug, Clone, Copy)]
struct AnimCycle {
    frames: f32,
    speed: f32,
    looping: bool,
}

fn cycle_for(state: PlayerState) -> AnimCycle {
    match state {
        PlayerState::Entering => AnimCycle { frames: 9.0, speed: 1.0, looping: true },
        PlayerState::Greeting => AnimCycle { frames: 4.0, speed: 0.1, looping: true },
        PlayerState::Playing => AnimCycle { frames: 9.0, speed: 1.0, looping: true },
        PlayerState::Pushed => AnimCycle { frames: 2.0, speed: 0.1, looping: true },
        PlayerState::Falling => AnimCycle { frames: 6.0, speed: 0.05, looping: true },
        PlayerState::Celebrating => AnimCycle { frames: 9.0, speed: 0.4, looping: true },
        PlayerState::CoCelebrating => AnimCycle { frames: 6.0, speed: 0.4, looping: true },
        PlayerState::Crying => AnimCycle { frames: 6.0, speed: 0.1, looping: false },
        PlayerState::Waiting => AnimCycle { frames: 2.0, speed: 0.1, looping: true },
        PlayerState::Calling => AnimCycle { frames: 2.0, speed: 0.1, looping: true },
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub own_team: bool,
    pub atk_role: bool,
    pub right_side: bool,
    pub coord: Point,
    pub angle: f32,
    /// True until something moved the player this tick.
    pub still: bool,
    /// Id of the last primitive block this player executed, for editor
    /// feedback. Cleared every tick unless the player keeps calling.
    pub last_block_id: Option<String>,
    energy: f32,
    state: PlayerState,
    anim_frame: f32,
    pushed_cooldown: u32,
}

impl Player {
    pub fn new(own_team: bool, atk_role: bool, right_side: bool) -> Self {
        Self {
            own_team,
            atk_role,
            right_side,
            coord: Point::default(),
            angle: 0.0,
            still: true,
            last_block_id: None,
            energy: 100.0,
            state: PlayerState::Waiting,
            anim_frame: 0.0,
            pushed_cooldown: 0,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Enters `state`, restarting the animation cycle. Re-entering Pushed
    /// only resets the cooldown; the running push cycle carries over.
    pub fn set_state(&mut self, state: PlayerState) {
        if state == PlayerState::Pushed {
            self.pushed_cooldown = consts::PUSHED_COOLDOWN_TICKS;
            if self.state == PlayerState::Pushed {
                return;
            }
        }
        self.state = state;
        self.anim_frame = 0.0;
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Adds `delta` to the energy reserve, clamped to [0, 100].
    pub fn add_energy(&mut self, delta: f32) {
        self.energy = (self.energy + delta).clamp(0.0, 100.0);
    }

    /// Full recovery, used when getting back up and at kickoff.
    pub fn restore_energy(&mut self) {
        self.energy = 100.0;
    }

    pub fn is_falling(&self) -> bool {
        self.state == PlayerState::Falling
    }

    fn should_animate(&self) -> bool {
        match self.state {
            PlayerState::Playing => !self.still,
            _ => true,
        }
    }

    /// Advances the animation clock one tick and applies the state
    /// transitions that fire on cycle completion.
    pub fn animate(&mut self) {
        if self.state == PlayerState::Pushed {
            self.anim_frame = (self.anim_frame + cycle_for(self.state).speed)
                % cycle_for(self.state).frames;
            self.pushed_cooldown = self.pushed_cooldown.saturating_sub(1);
            if self.pushed_cooldown == 0 {
                self.set_state(PlayerState::Playing);
            }
            return;
        }

        if !self.should_animate() {
            return;
        }
        let cycle = cycle_for(self.state);
        // Two-decimal rounding keeps slow cycles on an exact 0.01 grid.
        let next = ((self.anim_frame + cycle.speed) * 100.0).round() / 100.0;
        let completed = next >= cycle.frames;
        if completed && !cycle.looping {
            self.anim_frame = cycle.frames - 1.0;
            return;
        }
        self.anim_frame = if completed { 0.0 } else { next };
        if !completed {
            return;
        }
        match self.state {
            PlayerState::Greeting => self.set_state(PlayerState::Waiting),
            PlayerState::Falling => {
                self.set_state(PlayerState::Playing);
                self.restore_energy();
            }
            _ => {}
        }
    }
}
