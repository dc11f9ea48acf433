/// Convenience result type used across the crate.
pub type SoziResult<T> = Result<T, SoziError>;

/// Top-level error taxonomy used by camera, viewport and player APIs.
#[derive(thiserror::Error, Debug)]
pub enum SoziError {
    /// Invalid user-provided or presentation data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Geometry that cannot be queried or inverted (missing element, singular CTM).
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Errors while setting up or driving an animation.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SoziError {
    /// Build a [`SoziError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SoziError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`SoziError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`SoziError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for SoziError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
