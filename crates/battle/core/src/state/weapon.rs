//! Weapon definitions and range patterns.

/// Weapon category.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WeaponType {
    #[default]
    Sword,
    Spear,
    Axe,
    Bow,
    Staff,
    Dagger,
    /// Stand-in used for skill-driven results.
    Skill,
}

/// Elemental affinity of a weapon.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Element {
    #[default]
    None,
    Fire,
    Ice,
    Lightning,
    Earth,
    Wind,
    Light,
    Dark,
}

/// Shape of the tile set a weapon can reach.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangeShape {
    /// All tiles within Manhattan distance.
    #[default]
    Diamond,
    /// Straight lines along both axes only.
    Cross,
    /// All tiles within Chebyshev distance.
    Square,
}

/// Minimum and maximum reach of a weapon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangePattern {
    pub min: u32,
    pub max: u32,
    pub shape: RangeShape,
}

impl RangePattern {
    /// Adjacent tiles only.
    pub const MELEE: Self = Self {
        min: 1,
        max: 1,
        shape: RangeShape::Diamond,
    };

    pub const fn new(min: u32, max: u32, shape: RangeShape) -> Self {
        Self { min, max, shape }
    }
}

impl Default for RangePattern {
    fn default() -> Self {
        Self::MELEE
    }
}

/// Remaining uses of a weapon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Durability {
    pub current: u32,
    pub maximum: u32,
}

/// An attack source. Immutable for the duration of a battle; job and skill
/// modifiers operate on a copy.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weapon {
    pub id: String,
    pub name: String,
    pub weapon_type: WeaponType,
    pub attack_power: u32,
    pub range: RangePattern,
    pub element: Element,
    /// Critical chance in percent.
    pub critical_rate: u32,
    /// Base hit chance in percent.
    pub accuracy: u32,
    pub durability: Option<Durability>,
}

impl Weapon {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        weapon_type: WeaponType,
        attack_power: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weapon_type,
            attack_power,
            range: RangePattern::MELEE,
            element: Element::None,
            critical_rate: 5,
            accuracy: 90,
            durability: None,
        }
    }

    /// Builds the weapon stand-in recorded in results produced by a skill.
    pub fn skill_stand_in(skill_id: &str, skill_name: &str, power: u32) -> Self {
        Self {
            id: format!("skill:{skill_id}"),
            name: skill_name.to_string(),
            weapon_type: WeaponType::Skill,
            attack_power: power,
            range: RangePattern::MELEE,
            element: Element::None,
            critical_rate: 0,
            accuracy: 100,
            durability: None,
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: RangePattern) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    #[must_use]
    pub fn with_critical_rate(mut self, critical_rate: u32) -> Self {
        self.critical_rate = critical_rate;
        self
    }

    #[must_use]
    pub fn with_accuracy(mut self, accuracy: u32) -> Self {
        self.accuracy = accuracy;
        self
    }

    #[must_use]
    pub fn with_durability(mut self, current: u32, maximum: u32) -> Self {
        self.durability = Some(Durability { current, maximum });
        self
    }

    /// A weapon with durability tracking is broken once it reaches zero uses.
    pub fn is_broken(&self) -> bool {
        self.durability.is_some_and(|d| d.current == 0)
    }
}
