/// Notifications produced while an [`Animator`] runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimatorEvent {
    /// Animation progress in `[0, 1]`.
    Step(f64),
    /// The duration elapsed; always preceded by `Step(1.0)`.
    Done,
    /// The animation was interrupted before completion.
    Stop,
}

/// Converts elapsed time into progress notifications.
///
/// The animator does not schedule itself: the host calls [`Animator::step`]
/// once per display frame with its own clock.
#[derive(Clone, Debug)]
pub struct Animator {
    duration_ms: f64,
    initial_time_ms: f64,
    running: bool,
}

impl Default for Animator {
    fn default() -> Self {
        Self {
            duration_ms: 500.0,
            initial_time_ms: 0.0,
            running: false,
        }
    }
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Start (or restart) the animation. The initial step is reported immediately.
    pub fn start(&mut self, duration_ms: f64, now_ms: f64) -> AnimatorEvent {
        self.duration_ms = duration_ms.max(0.0);
        self.initial_time_ms = now_ms;
        self.running = true;
        AnimatorEvent::Step(0.0)
    }

    pub fn stop(&mut self) -> Option<AnimatorEvent> {
        if self.running {
            self.running = false;
            Some(AnimatorEvent::Stop)
        } else {
            None
        }
    }

    pub fn step(&mut self, now_ms: f64) -> Vec<AnimatorEvent> {
        if !self.running {
            return Vec::new();
        }
        let elapsed = now_ms - self.initial_time_ms;
        if elapsed >= self.duration_ms {
            self.running = false;
            vec![AnimatorEvent::Step(1.0), AnimatorEvent::Done]
        } else {
            vec![AnimatorEvent::Step((elapsed / self.duration_ms).max(0.0))]
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/animator.rs"]
mod tests;
