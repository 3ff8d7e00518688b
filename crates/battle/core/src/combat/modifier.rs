//! Named damage adjustments.

/// Origin of a modifier. Determines its position in the merged list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ModifierSource {
    /// Supplied by the caller in the battle options.
    Custom,
    AttackerJob,
    DefenderJob,
    Skill,
    /// Added by the damage calculator itself (critical hits).
    Calculator,
}

/// How a modifier changes the running damage value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ModifierKind {
    /// Flat change in damage points.
    Additive(i32),
    /// Relative change in percent: `+20` scales by 1.2, `-25` by 0.75.
    Percent(i32),
}

/// A named adjustment applied to a damage calculation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier {
    pub source: ModifierSource,
    pub name: String,
    pub kind: ModifierKind,
}

impl Modifier {
    pub fn new(source: ModifierSource, name: impl Into<String>, kind: ModifierKind) -> Self {
        Self {
            source,
            name: name.into(),
            kind,
        }
    }

    pub fn additive(source: ModifierSource, name: impl Into<String>, amount: i32) -> Self {
        Self::new(source, name, ModifierKind::Additive(amount))
    }

    pub fn percent(source: ModifierSource, name: impl Into<String>, percent: i32) -> Self {
        Self::new(source, name, ModifierKind::Percent(percent))
    }

    /// Applies this modifier to a running damage value, flooring at zero.
    pub fn apply(&self, value: u32) -> u32 {
        let value = i64::from(value);
        let next = match self.kind {
            ModifierKind::Additive(amount) => value + i64::from(amount),
            ModifierKind::Percent(percent) => value * (100 + i64::from(percent)) / 100,
        };
        next.clamp(0, i64::from(u32::MAX)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_and_percent_apply() {
        let plus = Modifier::additive(ModifierSource::Custom, "bonus", 5);
        let half = Modifier::percent(ModifierSource::DefenderJob, "guard", -50);
        assert_eq!(plus.apply(10), 15);
        assert_eq!(half.apply(15), 7);
    }

    #[test]
    fn apply_never_goes_negative() {
        let drain = Modifier::additive(ModifierSource::Custom, "drain", -100);
        assert_eq!(drain.apply(10), 0);
    }
}
