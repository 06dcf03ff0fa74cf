/// One field of a partial update.
///
/// `Unset` leaves the stored value alone, `Clear` removes it and `Set`
/// replaces it. Keeping "not supplied" and "remove" apart avoids overloading
/// an empty string with two meanings past the HTTP edge.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Unset,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    /// Field that can be replaced but never removed.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Unset,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Patch<U>, E> {
        Ok(match self {
            Patch::Unset => Patch::Unset,
            Patch::Clear => Patch::Clear,
            Patch::Set(v) => Patch::Set(f(v)?),
        })
    }

    /// Resolve against the currently stored value.
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Unset => current,
            Patch::Clear => None,
            Patch::Set(v) => Some(v),
        }
    }
}

impl Patch<String> {
    /// Query-string form of a clearable field: an empty value means `Clear`.
    pub fn from_clearable_param(value: Option<String>) -> Self {
        match value {
            None => Patch::Unset,
            Some(s) if s.is_empty() => Patch::Clear,
            Some(s) => Patch::Set(s),
        }
    }
}
