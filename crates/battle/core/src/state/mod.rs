//! Battlefield data: units, weapons, map and roster.
//!
//! These are plain data types. All mutation during a battle is performed by
//! the runtime's state manager on units owned by a [`Roster`].

mod map;
mod roster;
mod unit;
mod weapon;

pub use map::MapData;
pub use roster::Roster;
pub use unit::{BossInfo, Faction, Position, Unit, UnitId, UnitStats};
pub use weapon::{Durability, Element, RangePattern, RangeShape, Weapon, WeaponType};
