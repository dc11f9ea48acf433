use crate::foundation::error::{SoziError, SoziResult};

const NEWTON_ITERATIONS: usize = 4;

/// Easing curve mapping linear progress in `[0, 1]` to perceived progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimingFunction {
    #[default]
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    StepStart,
    StepEnd,
    StepMiddle,
    /// CSS-style `cubic-bezier(x1, y1, x2, y2)`.
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// `count` equal steps; jumps at the start of each interval when `jump_start`.
    Steps { count: u32, jump_start: bool },
}

impl TimingFunction {
    pub fn from_name(name: &str) -> SoziResult<Self> {
        let key: String = name
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "linear" => Ok(Self::Linear),
            "ease" => Ok(Self::Ease),
            "easein" => Ok(Self::EaseIn),
            "easeout" => Ok(Self::EaseOut),
            "easeinout" => Ok(Self::EaseInOut),
            "stepstart" => Ok(Self::StepStart),
            "stepend" => Ok(Self::StepEnd),
            "stepmiddle" => Ok(Self::StepMiddle),
            _ => Err(SoziError::validation(format!(
                "unknown timing function '{name}'"
            ))),
        }
    }

    /// The curve to use when a transition is played backwards.
    pub fn reverse(self) -> Self {
        match self {
            Self::EaseIn => Self::EaseOut,
            Self::EaseOut => Self::EaseIn,
            Self::StepStart => Self::StepEnd,
            Self::StepEnd => Self::StepStart,
            Self::CubicBezier { x1, y1, x2, y2 } => Self::CubicBezier {
                x1: 1.0 - x2,
                y1: 1.0 - y2,
                x2: 1.0 - x1,
                y2: 1.0 - y1,
            },
            Self::Steps { count, jump_start } => Self::Steps {
                count,
                jump_start: !jump_start,
            },
            other => other,
        }
    }

    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::StepStart => steps(1, true, t),
            Self::StepEnd => steps(1, false, t),
            Self::StepMiddle => {
                if t >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(x1, y1, x2, y2, t),
            Self::Steps { count, jump_start } => steps(count.max(1), jump_start, t),
        }
    }
}

fn steps(count: u32, jump_start: bool, t: f64) -> f64 {
    let n = f64::from(count);
    let v = if jump_start {
        (n * t).ceil()
    } else {
        (n * t).floor()
    };
    v / n
}

// Polynomial coefficients of one Bezier coordinate with endpoints fixed at 0 and 1.
fn coeffs(p1: f64, p2: f64) -> (f64, f64, f64) {
    (1.0 - 3.0 * p2 + 3.0 * p1, 3.0 * p2 - 6.0 * p1, 3.0 * p1)
}

fn bezier(t: f64, (a, b, c): (f64, f64, f64)) -> f64 {
    ((a * t + b) * t + c) * t
}

fn bezier_slope(t: f64, (a, b, c): (f64, f64, f64)) -> f64 {
    (3.0 * a * t + 2.0 * b) * t + c
}

fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    if x1 == y1 && x2 == y2 {
        return x;
    }
    let cx = coeffs(x1, x2);
    let cy = coeffs(y1, y2);

    // Solve bezier_x(t) = x with a few Newton steps, starting from t = x.
    let mut t = x;
    for _ in 0..NEWTON_ITERATIONS {
        let slope = bezier_slope(t, cx);
        if slope == 0.0 {
            break;
        }
        t -= (bezier(t, cx) - x) / slope;
    }
    bezier(t, cy)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timing.rs"]
mod tests;
