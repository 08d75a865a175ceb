//! Post-process "corruption" pipeline.
//!
//! Runs once per frame after sprite compositing. A fixed catalog of
//! effects is scanned every frame; each entry rolls one uniform draw
//! against a trigger probability that grows monotonically with the
//! externally supplied [`Intensity`] stage. Triggered effects become
//! Active [`GlitchEvent`]s for a fixed number of frames and transform the
//! frame buffer in catalog order, so output is deterministic for a given
//! RNG seed and input sequence.
//!
//! The active event list is the only state this module keeps between
//! frames, and nothing else in the renderer reads or writes it.

use rand::Rng;
use smallvec::SmallVec;

use crate::renderer::Frame;

pub mod effects;

use effects::{FxCtx, Transform};

/// Externally supplied corruption stage. An explicit parameter on every
/// [`Pipeline::apply`] call; the pipeline holds no ambient copy of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Intensity {
    Calm = 0,
    Uneasy = 1,
    Breach = 2,
}

impl Intensity {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_stage(stage: u8) -> Self {
        match stage {
            0 => Intensity::Calm,
            1 => Intensity::Uneasy,
            _ => Intensity::Breach,
        }
    }
}

/// Per-stage multipliers on every catalog probability.
///
/// Stage 0 is exactly zero: a calm world shows no corruption at all.
/// The remaining weights strictly increase, which is what makes the
/// average active-effect count rise with intensity (a tested guarantee,
/// not a tuning accident).
#[derive(Clone, Copy, Debug)]
pub struct StageWeights(pub [f32; 3]);

impl Default for StageWeights {
    fn default() -> Self {
        StageWeights([0.0, 0.35, 1.0])
    }
}

/// Cap on the caller-folded multiplicative boost (carried items and
/// similar game-state contributions, opaque to the renderer).
const MAX_BOOST: f32 = 4.0;

/// Effect identity tags, in catalog order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectKind {
    DepthBlur,
    Bloom,
    AmbientOcclusion,
    TextureLeak,
    Wireframe,
    DebugText,
    RealityBreach,
}

/// One active corruption instance. Created on trigger, decremented every
/// frame, removed at zero.
#[derive(Clone, Copy, Debug)]
pub struct GlitchEvent {
    pub kind: EffectKind,
    /// Randomized at trigger time, constant for the event's lifetime.
    pub strength: f32,
    pub frames_left: u32,
}

/// Catalog row: everything the pipeline needs to trigger and run one
/// effect. Adding an effect is adding a row; the control flow below never
/// changes.
struct EffectRow {
    kind: EffectKind,
    /// Per-frame trigger probability at stage weight 1.0 and boost 1.0.
    base_prob: f32,
    duration: u32,
    strength: (f32, f32),
    apply: Transform,
}

/// Fixed catalog, applied in this order when multiple effects are active.
static CATALOG: [EffectRow; 7] = [
    EffectRow {
        kind: EffectKind::DepthBlur,
        base_prob: 0.10,
        duration: 90,
        strength: (0.3, 1.0),
        apply: effects::depth_blur,
    },
    EffectRow {
        kind: EffectKind::Bloom,
        base_prob: 0.08,
        duration: 60,
        strength: (0.2, 0.8),
        apply: effects::bloom,
    },
    EffectRow {
        kind: EffectKind::AmbientOcclusion,
        base_prob: 0.08,
        duration: 120,
        strength: (0.3, 1.0),
        apply: effects::ambient_occlusion,
    },
    EffectRow {
        kind: EffectKind::TextureLeak,
        base_prob: 0.05,
        duration: 45,
        strength: (0.2, 1.0),
        apply: effects::texture_leak,
    },
    EffectRow {
        kind: EffectKind::Wireframe,
        base_prob: 0.04,
        duration: 30,
        strength: (0.3, 0.9),
        apply: effects::wireframe,
    },
    EffectRow {
        kind: EffectKind::DebugText,
        base_prob: 0.03,
        duration: 75,
        strength: (0.5, 1.0),
        apply: effects::debug_text,
    },
    EffectRow {
        kind: EffectKind::RealityBreach,
        base_prob: 0.008,
        duration: 20,
        strength: (0.8, 1.0),
        apply: effects::reality_breach,
    },
];

/// The post-process pipeline. Owns the active event list and nothing
/// else; frame, z-buffer, intensity, boost and RNG all arrive as
/// arguments, so a seeded run is exactly reproducible.
pub struct Pipeline {
    weights: StageWeights,
    active: SmallVec<[GlitchEvent; 4]>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(StageWeights::default())
    }
}

impl Pipeline {
    pub fn new(weights: StageWeights) -> Self {
        Self {
            weights,
            active: SmallVec::new(),
        }
    }

    /// Currently active events, in trigger order.
    pub fn active(&self) -> &[GlitchEvent] {
        &self.active
    }

    fn is_active(&self, kind: EffectKind) -> bool {
        self.active.iter().any(|e| e.kind == kind)
    }

    /// Run one post-process frame: roll triggers, apply every active
    /// transform in catalog order, expire finished events.
    ///
    /// * `zbuf` is the render pass's z-buffer (depth blur input).
    /// * `boost >= 1.0` folds external game-state scaling (carried items)
    ///   into the trigger probability; it is clamped, never trusted.
    pub fn apply<R: Rng>(
        &mut self,
        frame: &mut Frame,
        zbuf: &[f32],
        intensity: Intensity,
        boost: f32,
        rng: &mut R,
    ) {
        let stage_w = self.weights.0[intensity.index()];
        let boost = boost.clamp(1.0, MAX_BOOST);

        // two uniform draws per catalog entry per frame (trigger and
        // strength), consumed whether or not the effect fires, so the RNG
        // sequence is independent of outcomes
        for row in &CATALOG {
            let draw: f32 = rng.r#gen();
            let roll: f32 = rng.r#gen();
            let p = row.base_prob * stage_w * boost;
            if draw < p && !self.is_active(row.kind) {
                let (lo, hi) = row.strength;
                self.active.push(GlitchEvent {
                    kind: row.kind,
                    strength: lo + roll * (hi - lo),
                    frames_left: row.duration,
                });
            }
        }

        // catalog order, not trigger order, decides application order
        for row in &CATALOG {
            if let Some(ev) = self.active.iter().find(|e| e.kind == row.kind) {
                let ctx = FxCtx {
                    zbuf,
                    strength: ev.strength,
                };
                (row.apply)(frame, &ctx);
            }
        }

        for ev in self.active.iter_mut() {
            ev.frames_left = ev.frames_left.saturating_sub(1);
        }
        self.active.retain(|e| e.frames_left > 0);
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
