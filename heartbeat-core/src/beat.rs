/// Beat animation: a per-frame state machine driving the heart's scale
use log::{info, trace};

use crate::picking::PulseRequest;

/// Scale the heart rests at
pub const BASE_SCALE: f32 = 1.0;

/// Frames the shrinking phase spreads a full `target_scale` change over.
/// Growing runs twice as fast.
const BEAT_DIVISIONS: f32 = 300.0;

/// Phase of the beat animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    Idle,
    Growing,
    Shrinking,
}

/// Scales the heart up quickly and back down slowly once per pulse.
///
/// The animator is stepped exactly once per rendered frame. A pulse is only
/// accepted while idle; pulses arriving mid-beat are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatAnimator {
    state: AnimationState,
    scale: f32,
    target_scale: f32,
}

impl BeatAnimator {
    /// `target_scale` is the peak scale and must be greater than [`BASE_SCALE`];
    /// `HeartConfig::validate` checks this before an animator is built.
    pub fn new(target_scale: f32) -> Self {
        Self {
            state: AnimationState::Idle,
            scale: BASE_SCALE,
            target_scale,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Scale increase per frame while growing
    pub fn grow_step(&self) -> f32 {
        self.target_scale / BEAT_DIVISIONS * 2.0
    }

    /// Scale decrease per frame while shrinking
    pub fn shrink_step(&self) -> f32 {
        self.target_scale / BEAT_DIVISIONS
    }

    pub fn is_beating(&self) -> bool {
        self.state != AnimationState::Idle
    }

    /// Advance one frame, consuming `pulse`, and return the new scale.
    pub fn step(&mut self, pulse: Option<PulseRequest>) -> f32 {
        if self.state == AnimationState::Idle {
            match pulse {
                Some(request) => {
                    info!("pulse accepted from {}", request.source);
                    self.transition(AnimationState::Growing);
                }
                None => return self.scale,
            }
        } else if let Some(request) = pulse {
            trace!("pulse from {} dropped while {:?}", request.source, self.state);
        }

        match self.state {
            AnimationState::Idle => {}
            AnimationState::Growing => {
                self.scale += self.grow_step();
                if self.scale >= self.target_scale {
                    self.scale = self.target_scale;
                    self.transition(AnimationState::Shrinking);
                }
            }
            AnimationState::Shrinking => {
                self.scale -= self.shrink_step();
                if self.scale <= BASE_SCALE {
                    self.scale = BASE_SCALE;
                    self.transition(AnimationState::Idle);
                }
            }
        }

        self.scale
    }

    fn transition(&mut self, next: AnimationState) {
        trace!("beat {:?} -> {:?} at scale {}", self.state, next, self.scale);
        self.state = next;
    }
}
