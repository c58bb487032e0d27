use std::borrow::Cow;

/// Human-readable name of a value, typically the enum variant name.
///
/// Used for logging and for [`GlobalEvent::to_friendly`](crate::GlobalEvent::to_friendly).
/// Derive it with `#[derive(Label)]`.
pub trait Label {
    fn label(&self) -> Cow<'static, str>;
}
