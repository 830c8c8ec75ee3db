//! On-end directives.
//!
//! What the owner of a non-looping animation does once it reaches the last
//! frame. The keywords `kill`, `lock` and `reverse` are reserved: they can
//! never name a real animation.

/// Keywords that are directives, never animation names.
pub const RESERVED_ANIMATION_NAMES: [&str; 3] = ["kill", "lock", "reverse"];

/// Action taken at the end of a non-looping animation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OnEndDirective {
    /// Fall back to the asset's default animation.
    #[default]
    Default,
    /// Remove the asset.
    Kill,
    /// Stay on the last frame.
    Lock,
    /// Play backwards to the first frame.
    Reverse,
    /// Switch to the named animation.
    Animation(String),
}

impl OnEndDirective {
    /// String form written to animation documents.
    pub fn as_str(&self) -> &str {
        match self {
            OnEndDirective::Default => "default",
            OnEndDirective::Kill => "kill",
            OnEndDirective::Lock => "lock",
            OnEndDirective::Reverse => "reverse",
            OnEndDirective::Animation(name) => name,
        }
    }
}

/// Map a document string to a directive, ignoring case.
///
/// Anything that is not a keyword names an animation and keeps its original
/// spelling.
pub fn classify_on_end(value: &str) -> OnEndDirective {
    match value.to_ascii_lowercase().as_str() {
        "" | "default" => OnEndDirective::Default,
        "kill" => OnEndDirective::Kill,
        "lock" => OnEndDirective::Lock,
        "reverse" => OnEndDirective::Reverse,
        _ => OnEndDirective::Animation(value.to_string()),
    }
}

/// True for `kill`, `lock` and `reverse` in any case.
pub fn is_reserved_animation_name(name: &str) -> bool {
    RESERVED_ANIMATION_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}
