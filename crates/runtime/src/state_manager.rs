//! Authoritative unit mutation and result history.
//!
//! All HP/MP changes made during an exchange go through
//! [`BattleStateManager`], which floors values, keeps per-unit combat tallies
//! and publishes `unit-updated`.
use std::collections::{HashMap, VecDeque};

use battle_core::{BattleError, BattleResult, Faction, Roster, Unit, UnitId, apply_damage};

use crate::error::Result;
use crate::events::{BattleEvent, EventBus};

/// Damage and kill counts for one unit across recorded exchanges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatTally {
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub kills: u32,
}

/// HP change applied to one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HpChange {
    pub unit: UnitId,
    pub previous_hp: u32,
    pub current_hp: u32,
}

impl HpChange {
    pub fn defeated(&self) -> bool {
        self.current_hp == 0
    }
}

pub struct BattleStateManager {
    events: EventBus,
    history: VecDeque<BattleResult>,
    history_limit: usize,
    tallies: HashMap<UnitId, CombatTally>,
}

impl BattleStateManager {
    pub fn new(events: EventBus, history_limit: usize) -> Self {
        Self {
            events,
            history: VecDeque::new(),
            history_limit: history_limit.max(1),
            tallies: HashMap::new(),
        }
    }

    /// Subtracts `amount` from the target's HP, flooring at zero.
    pub fn apply_damage(
        &mut self,
        roster: &mut Roster,
        source: Option<UnitId>,
        target: UnitId,
        amount: u32,
    ) -> Result<HpChange> {
        let unit = lookup_mut(roster, target)?;
        let previous_hp = unit.current_hp;
        unit.current_hp = apply_damage(previous_hp, amount);
        let change = HpChange {
            unit: target,
            previous_hp,
            current_hp: unit.current_hp,
        };

        let dealt = u64::from(previous_hp - change.current_hp);
        self.tallies.entry(target).or_default().damage_taken += dealt;
        if let Some(source) = source {
            let tally = self.tallies.entry(source).or_default();
            tally.damage_dealt += dealt;
            if change.defeated() && previous_hp > 0 {
                tally.kills += 1;
            }
        }

        self.publish(change);
        Ok(change)
    }

    /// Restores HP, capped at the unit's maximum. Defeated units stay defeated.
    pub fn apply_healing(
        &mut self,
        roster: &mut Roster,
        target: UnitId,
        amount: u32,
    ) -> Result<HpChange> {
        let unit = lookup_mut(roster, target)?;
        let previous_hp = unit.current_hp;
        if unit.is_alive() {
            unit.current_hp = previous_hp.saturating_add(amount).min(unit.stats.max_hp);
        }
        let change = HpChange {
            unit: target,
            previous_hp,
            current_hp: unit.current_hp,
        };
        self.publish(change);
        Ok(change)
    }

    pub fn spend_mp(&mut self, roster: &mut Roster, unit: UnitId, cost: u32) -> Result<()> {
        let unit = lookup_mut(roster, unit)?;
        if unit.current_mp < cost {
            return Err(BattleError::insufficient_mp(format!(
                "{} needs {} MP but has {}",
                unit.name, cost, unit.current_mp
            )));
        }
        unit.current_mp -= cost;
        Ok(())
    }

    pub fn mark_acted(&mut self, roster: &mut Roster, unit: UnitId) -> Result<()> {
        lookup_mut(roster, unit)?.has_acted = true;
        Ok(())
    }

    /// Revives a defeated unit at 1 HP as a neutral NPC.
    pub fn convert_to_npc(&mut self, roster: &mut Roster, unit: UnitId) -> Result<HpChange> {
        let unit = lookup_mut(roster, unit)?;
        let previous_hp = unit.current_hp;
        unit.current_hp = 1;
        unit.faction = Faction::Npc;
        let change = HpChange {
            unit: unit.id,
            previous_hp,
            current_hp: 1,
        };
        self.publish(change);
        Ok(change)
    }

    /// Appends a result, dropping the oldest beyond the history limit.
    pub fn record_result(&mut self, result: BattleResult) {
        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(result);
    }

    /// The most recent `limit` results, oldest first.
    pub fn history(&self, limit: Option<usize>) -> Vec<BattleResult> {
        let skip = limit.map_or(0, |n| self.history.len().saturating_sub(n));
        self.history.iter().skip(skip).cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    pub fn last_result(&self) -> Option<&BattleResult> {
        self.history.back()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn tally(&self, unit: UnitId) -> CombatTally {
        self.tallies.get(&unit).copied().unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.tallies.clear();
    }

    fn publish(&self, change: HpChange) {
        self.events.publish(BattleEvent::UnitUpdated {
            unit: change.unit,
            previous_hp: change.previous_hp,
            current_hp: change.current_hp,
        });
    }
}

fn lookup_mut(roster: &mut Roster, id: UnitId) -> Result<&mut Unit> {
    roster
        .get_mut(id)
        .ok_or_else(|| BattleError::system(format!("unit {id} is not in the roster")))
}
