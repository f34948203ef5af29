//! Time-based interpolation for the chart.
//!
//! Everything here is ticked by the host's frame loop with the elapsed time
//! since the previous frame. Nothing owns a clock or a thread.
//!
//! - [`Tween`] animates one scalar and can be re-targeted mid-flight.
//! - [`EntranceAnimation`] runs the drawing-progress and alpha tracks side by
//!   side and reports completion once, on the first frame where both are done.
//! - [`ScaleAnimator`] keeps one independent tween per segment.

use serde::Serialize;
use serde_with::DeserializeFromStr;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Ease {
    #[strum(to_string = "linear")]
    Linear,
    /// cubic-bezier(0.4, 0.0, 0.2, 1.0)
    #[default]
    #[strum(to_string = "fast-out-slow-in", serialize = "standard")]
    FastOutSlowIn,
    #[strum(to_string = "out-cubic")]
    OutCubic,
    #[strum(to_string = "in-out-cubic")]
    InOutCubic,
}

impl Ease {
    pub fn sample(self, x: f64) -> f64 {
        let t = x.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::FastOutSlowIn => cubic_bezier(0.4, 0.0, 0.2, 1.0, t),
            Ease::OutCubic => 1.0 - (1.0 - t).powi(3),
            Ease::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) * 0.5
                }
            }
        }
    }
}

/// y on the curve through (0,0), (x1,y1), (x2,y2), (1,1) at horizontal position `t`.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, t: f64) -> f64 {
    let curve = |p1: f64, p2: f64, s: f64| {
        let u = 1.0 - s;
        3.0 * u * u * s * p1 + 3.0 * u * s * s * p2 + s * s * s
    };
    let slope = |p1: f64, p2: f64, s: f64| {
        let u = 1.0 - s;
        3.0 * u * u * p1 + 6.0 * u * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
    };

    let mut s = t;
    for _ in 0..8 {
        let err = curve(x1, x2, s) - t;
        let d = slope(x1, x2, s);
        if err.abs() < 1e-7 || d.abs() < 1e-6 {
            break;
        }
        s = (s - err / d).clamp(0.0, 1.0);
    }

    // Newton can stall on flat stretches; bisection always converges
    if (curve(x1, x2, s) - t).abs() > 1e-6 {
        let (mut lo, mut hi) = (0.0, 1.0);
        s = t;
        for _ in 0..48 {
            let x = curve(x1, x2, s);
            if (x - t).abs() < 1e-9 {
                break;
            }
            if x < t {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) / 2.0;
        }
    }

    curve(y1, y2, s)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// One scalar moving towards a target over a fixed duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    value: f64,
    elapsed: Duration,
    duration: Duration,
    ease: Ease,
}

impl Tween {
    /// A tween at rest on `value`.
    pub fn new(value: f64, duration: Duration, ease: Ease) -> Self {
        Self {
            from: value,
            to: value,
            value,
            elapsed: duration,
            duration,
            ease,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Heads for `to` starting from wherever the tween currently is.
    /// Re-targeting to the current target keeps the animation running as is.
    pub fn retarget(&mut self, to: f64) {
        if to == self.to {
            return;
        }
        self.from = self.value;
        self.to = to;
        self.elapsed = Duration::ZERO;
    }

    pub fn snap_to(&mut self, value: f64) {
        self.from = value;
        self.to = value;
        self.value = value;
        self.elapsed = self.duration;
    }

    pub fn advance(&mut self, dt: Duration) -> f64 {
        if self.is_finished() {
            self.value = self.to;
            return self.value;
        }

        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value = if self.is_finished() {
            self.to
        } else {
            let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
            lerp(self.from, self.to, self.ease.sample(t))
        };
        self.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntranceFrame {
    pub progress: f64,
    pub alpha: f64,
    /// True on exactly one frame: the first where both tracks reached 1.0.
    pub completed: bool,
}

/// Drawing-progress and alpha tracks for the chart's entrance, joined into a
/// single completion signal.
#[derive(Debug, Clone, PartialEq)]
pub struct EntranceAnimation {
    progress: Tween,
    alpha: Tween,
    running: bool,
    completed: bool,
}

impl EntranceAnimation {
    pub fn new(progress_duration: Duration, alpha_duration: Duration, ease: Ease) -> Self {
        Self {
            progress: Tween::new(0.0, progress_duration, ease),
            alpha: Tween::new(0.0, alpha_duration, ease),
            running: false,
            completed: false,
        }
    }

    pub fn start(&mut self) {
        self.progress.retarget(1.0);
        self.alpha.retarget(1.0);
        self.running = true;
        self.completed = false;
    }

    pub fn reset(&mut self) {
        self.progress.snap_to(0.0);
        self.alpha.snap_to(0.0);
        self.running = false;
        self.completed = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn progress(&self) -> f64 {
        self.progress.value()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha.value()
    }

    pub fn tick(&mut self, dt: Duration) -> EntranceFrame {
        let progress = self.progress.advance(dt);
        let alpha = self.alpha.advance(dt);

        let completed = self.running && !self.completed && progress >= 1.0 && alpha >= 1.0;
        if completed {
            self.completed = true;
            log::debug!("entrance animation finished");
        }

        EntranceFrame {
            progress,
            alpha,
            completed,
        }
    }
}

/// Per-segment radius multipliers, each eased on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleAnimator {
    tweens: Vec<Tween>,
    values: Vec<f64>,
    duration: Duration,
    ease: Ease,
}

impl ScaleAnimator {
    pub fn new(duration: Duration, ease: Ease) -> Self {
        Self {
            tweens: Vec::new(),
            values: Vec::new(),
            duration,
            ease,
        }
    }

    /// Points every segment at its new target. A different segment count means
    /// a different chart, so values jump straight to their targets.
    pub fn retarget(&mut self, targets: &[f64]) {
        if targets.len() != self.tweens.len() {
            self.tweens = targets
                .iter()
                .map(|&target| Tween::new(target, self.duration, self.ease))
                .collect();
        } else {
            for (tween, &target) in self.tweens.iter_mut().zip(targets) {
                tween.retarget(target);
            }
        }
        self.values = self.tweens.iter().map(Tween::value).collect();
    }

    pub fn tick(&mut self, dt: Duration) -> &[f64] {
        for (value, tween) in self.values.iter_mut().zip(&mut self.tweens) {
            *value = tween.advance(dt);
        }
        &self.values
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn is_settled(&self) -> bool {
        self.tweens.iter().all(Tween::is_finished)
    }
}
