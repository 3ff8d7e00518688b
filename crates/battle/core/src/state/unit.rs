use std::fmt;

use super::weapon::Weapon;

/// Unique identifier for a unit on the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance in tiles.
    pub fn distance(&self, other: &Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Allegiance of a unit.
///
/// Faction can change during a battle: a recruited enemy becomes [`Faction::Npc`].
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
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Faction {
    #[default]
    Player,
    Enemy,
    /// Neutral units, including recruited former enemies.
    Npc,
}

impl Faction {
    /// Returns true if units of these factions may attack each other.
    ///
    /// NPCs are neutral and never valid targets for either side.
    pub const fn is_hostile_to(self, other: Faction) -> bool {
        matches!(
            (self, other),
            (Faction::Player, Faction::Enemy) | (Faction::Enemy, Faction::Player)
        )
    }
}

/// Base stat block of a unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitStats {
    pub max_hp: u32,
    pub max_mp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub movement: u32,
    /// Flat evasion subtracted from incoming hit chance.
    pub evasion: u32,
}

impl UnitStats {
    pub const fn new(max_hp: u32, max_mp: u32, attack: u32, defense: u32) -> Self {
        Self {
            max_hp,
            max_mp,
            attack,
            defense,
            speed: 10,
            movement: 3,
            evasion: 0,
        }
    }

    #[must_use]
    pub const fn with_evasion(mut self, evasion: u32) -> Self {
        self.evasion = evasion;
        self
    }

    #[must_use]
    pub const fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }
}

/// Boss bookkeeping carried by boss units.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossInfo {
    pub name: String,
    /// Rose essence awarded when the boss is defeated.
    pub rose_essence: u32,
}

/// A combatant on the battlefield.
///
/// Units are owned by the orchestrator's roster and mutated in place by the
/// state manager. Collaborators only ever borrow them.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub faction: Faction,
    pub position: Position,
    pub stats: UnitStats,
    pub current_hp: u32,
    pub current_mp: u32,
    pub level: u32,
    pub has_acted: bool,
    pub has_moved: bool,
    pub equipped_weapon: Option<Weapon>,
    /// Job/class name consulted by the job integration.
    pub job: Option<String>,
    pub boss: Option<BossInfo>,
}

impl Unit {
    /// Creates a unit at full HP/MP.
    pub fn new(
        id: UnitId,
        name: impl Into<String>,
        faction: Faction,
        position: Position,
        stats: UnitStats,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            faction,
            position,
            current_hp: stats.max_hp,
            current_mp: stats.max_mp,
            stats,
            level: 1,
            has_acted: false,
            has_moved: false,
            equipped_weapon: None,
            job: None,
            boss: None,
        }
    }

    #[must_use]
    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.equipped_weapon = Some(weapon);
        self
    }

    #[must_use]
    pub fn with_hp(mut self, current_hp: u32) -> Self {
        self.current_hp = current_hp.min(self.stats.max_hp);
        self
    }

    #[must_use]
    pub fn with_job(mut self, job: impl Into<String>) -> Self {
        self.job = Some(job.into());
        self
    }

    #[must_use]
    pub fn with_boss(mut self, boss: BossInfo) -> Self {
        self.boss = Some(boss);
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    pub fn is_boss(&self) -> bool {
        self.boss.is_some()
    }

    /// Returns true if `self` may attack `other`.
    pub fn is_hostile_to(&self, other: &Unit) -> bool {
        self.id != other.id && self.faction.is_hostile_to(other.faction)
    }
}
