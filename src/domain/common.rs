//! Shared vocabulary traits for the fixed choice sets of a ride record.

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// A closed set of options stored by its snake_case identifier.
pub trait Choice: Copy + Sized + 'static {
    /// Every option in presentation order.
    const ALL: &'static [Self];

    /// Stable identifier used in storage and wire formats.
    fn as_str(&self) -> &'static str;

    /// Spanish label shown to the person filling the form.
    fn label(&self) -> &'static str;
}

/// Parses a choice by identifier or label, ignoring case and surrounding whitespace.
pub fn parse_choice<T: Choice>(raw: &str) -> Option<T> {
    let needle = raw.trim().to_lowercase();
    T::ALL
        .iter()
        .copied()
        .find(|option| option.as_str() == needle || option.label().to_lowercase() == needle)
}

impl<T: Choice> Displayable for T {
    fn display_label(&self) -> String {
        self.label().to_string()
    }
}
