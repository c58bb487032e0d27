/// Enums with a symbolic wire code per variant.
///
/// Codes are what travels on the wire (e.g. `"N"`, `"SJ"`), never ordinal
/// indices, so peers running different builds keep understanding each other.
/// Derive it with `#[derive(Coded)]`, see the `session-signal-macros` crate.
pub trait Coded: Sized + Copy + 'static {
    /// Every variant, in declaration order.
    const ALL: &'static [Self];

    /// Variant used for codes this build doesn't recognise.
    const UNKNOWN: Self;

    fn code(&self) -> &'static str;

    fn from_code(code: &str) -> Option<Self>;

    /// Like [`Coded::from_code`] but falls back to [`Coded::UNKNOWN`].
    fn from_code_lossy(code: &str) -> Self {
        Self::from_code(code).unwrap_or(Self::UNKNOWN)
    }
}

/// Serde adapter for `#[serde(with = "crate::code::wire")]` fields.
pub(crate) mod wire {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Coded;

    pub fn serialize<T: Coded, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.code())
    }

    pub fn deserialize<'de, T: Coded, D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(T::from_code_lossy(&code))
    }
}
