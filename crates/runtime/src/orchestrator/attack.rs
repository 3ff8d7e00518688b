use battle_core::{
    BattleError, BattlePhase, BattleResult, Position, TargetingContext, Unit, UnitId, Weapon,
};

use super::BattleOrchestrator;
use super::pipeline::BattleOptions;
use crate::error::Result;
use crate::events::BattleEvent;

impl BattleOrchestrator {
    /// Starts an attack and moves to target selection.
    ///
    /// The weapon defaults to the attacker's equipped weapon. Returns the ids
    /// of the valid targets. On failure the system is returned to idle and no
    /// unit is touched; the error is still recorded and published as
    /// `battle-error`.
    pub fn initiate_attack(
        &mut self,
        attacker: UnitId,
        weapon: Option<Weapon>,
    ) -> Result<Vec<UnitId>> {
        let (unit, weapon) = match self.check_attack_preconditions(attacker, weapon) {
            Ok(checked) => checked,
            Err(err) => return Err(self.reject(err)),
        };

        let valid_targets = match self.enter_target_selection(&unit, weapon) {
            Ok(targets) => targets,
            Err(err) => {
                self.animator.clear_highlights();
                self.target_selector.clear();
                self.state.reset_to_idle();
                return Err(self.reject(err));
            }
        };

        tracing::debug!(
            target: "battle::orchestrator",
            attacker = %attacker,
            targets = valid_targets.len(),
            "attack initiated"
        );
        Ok(valid_targets)
    }

    /// Computes the reachable tiles and hands them to the animator.
    ///
    /// Prior highlights are cleared first. Pass `range` to display a
    /// precomputed set instead.
    pub fn show_attack_range(
        &mut self,
        attacker: UnitId,
        weapon: &Weapon,
        range: Option<Vec<Position>>,
    ) -> Result<Vec<Position>> {
        let unit = self.unit_snapshot(attacker)?;
        let tiles = match range {
            Some(tiles) => tiles,
            None => self.attack_range(&unit, weapon),
        };

        self.animator.clear_highlights();
        self.animator.highlight_range(&tiles);
        self.publish(BattleEvent::AttackRangeShown {
            attacker,
            tiles: tiles.clone(),
        });
        Ok(tiles)
    }

    /// Chooses the target and runs the exchange to completion.
    ///
    /// Selection failures leave the orchestrator in target selection so the
    /// caller can pick again or cancel.
    pub async fn select_target(
        &mut self,
        target: UnitId,
        options: BattleOptions,
    ) -> Result<BattleResult> {
        let (attacker, weapon) = match (
            self.state.phase,
            self.state.current_attacker,
            self.state.current_weapon.clone(),
        ) {
            (BattlePhase::TargetSelection, Some(attacker), Some(weapon)) => (attacker, weapon),
            _ => {
                let err = BattleError::system(format!(
                    "no attack is awaiting a target (phase {})",
                    self.state.phase
                ));
                return Err(self.reject(err));
            }
        };

        let unit = match self.roster.get(target) {
            Some(unit) => unit.clone(),
            None => {
                let err = BattleError::invalid_target(format!("unit {target} does not exist"));
                return Err(self.reject(err));
            }
        };

        if let Err(err) = self.target_selector.select(&unit) {
            return Err(self.reject(err.into()));
        }

        self.state.current_target = Some(target);
        self.publish(BattleEvent::TargetSelected { attacker, target });
        self.state.transition(BattlePhase::BattleExecution)?;

        self.execute_battle(attacker, target, weapon, options).await
    }

    /// Abandons the current attack. Safe from any phase and idempotent;
    /// `attack-cancelled` is published only if an attack was active.
    pub fn cancel_attack(&mut self) {
        let was_active = self.state.is_active;
        let attacker = self.state.current_attacker;

        self.animator.clear_highlights();
        self.target_selector.clear();
        self.state.reset_to_idle();

        if was_active {
            tracing::debug!(
                target: "battle::orchestrator",
                attacker = ?attacker,
                "attack cancelled"
            );
            self.publish(BattleEvent::AttackCancelled { attacker });
        }
    }

    /// Returns true if `attacker` could attack `target` right now.
    ///
    /// Uses the given weapon or the attacker's equipped one. Does not consult
    /// or fill the range cache.
    pub fn can_attack(&self, attacker: UnitId, target: UnitId, weapon: Option<&Weapon>) -> bool {
        let (Some(attacker), Some(target)) = (self.roster.get(attacker), self.roster.get(target))
        else {
            return false;
        };
        let Some(weapon) = weapon.or(attacker.equipped_weapon.as_ref()) else {
            return false;
        };

        attacker.is_alive()
            && !attacker.has_acted
            && !weapon.is_broken()
            && target.is_alive()
            && attacker.is_hostile_to(target)
            && self
                .range_calculator
                .attack_range(attacker, weapon, self.map.as_ref())
                .contains(&target.position)
    }

    fn check_attack_preconditions(
        &self,
        attacker: UnitId,
        weapon: Option<Weapon>,
    ) -> Result<(Unit, Weapon)> {
        if self.state.is_active {
            return Err(BattleError::system(format!(
                "a battle is already in progress for {}",
                self.state
                    .current_attacker
                    .map_or_else(|| "unknown".to_string(), |id| id.to_string())
            )));
        }

        let unit = self
            .roster
            .get(attacker)
            .ok_or_else(|| {
                BattleError::invalid_attacker(format!("unit {attacker} does not exist"))
            })?;
        if !unit.is_alive() {
            return Err(BattleError::invalid_attacker(format!(
                "{} is defeated",
                unit.name
            )));
        }
        if unit.has_acted {
            return Err(BattleError::already_acted(format!(
                "{} has already acted this turn",
                unit.name
            )));
        }

        let weapon = weapon
            .or_else(|| unit.equipped_weapon.clone())
            .ok_or_else(|| BattleError::invalid_weapon(format!("{} has no weapon", unit.name)))?;
        if weapon.is_broken() {
            return Err(BattleError::weapon_broken(format!(
                "{} is broken",
                weapon.name
            )));
        }

        Ok((unit.clone(), weapon))
    }

    /// Walks idle → range_display → target_selection for a checked attacker.
    pub(super) fn enter_target_selection(
        &mut self,
        unit: &Unit,
        weapon: Weapon,
    ) -> Result<Vec<UnitId>> {
        self.state.transition(BattlePhase::RangeDisplay)?;
        self.state.activate(unit.id, weapon.clone());

        let range = self.show_attack_range(unit.id, &weapon, None)?;

        self.state.transition(BattlePhase::TargetSelection)?;
        self.target_selector.initialize(&TargetingContext {
            attacker: unit,
            weapon: &weapon,
            units: self.roster.as_slice(),
            map: self.map.as_ref(),
            attack_range: &range,
        });
        let valid_targets = self.target_selector.valid_targets().to_vec();

        self.publish(BattleEvent::AttackInitiated {
            attacker: unit.id,
            weapon: weapon.id.clone(),
            valid_targets: valid_targets.clone(),
        });
        Ok(valid_targets)
    }

    /// Attack range for `unit`, served from the cache when enabled.
    pub(super) fn attack_range(&mut self, unit: &Unit, weapon: &Weapon) -> Vec<Position> {
        if !self.config.enable_result_caching {
            return self
                .range_calculator
                .attack_range(unit, weapon, self.map.as_ref());
        }

        let key = (unit.id, unit.position, weapon.id.clone(), weapon.range);
        if let Some(tiles) = self.range_cache.get(&key) {
            return tiles.clone();
        }
        let tiles = self
            .range_calculator
            .attack_range(unit, weapon, self.map.as_ref());
        self.range_cache.insert(key, tiles.clone());
        tiles
    }

    pub(super) fn unit_snapshot(&self, id: UnitId) -> Result<Unit> {
        self.roster
            .get(id)
            .cloned()
            .ok_or_else(|| BattleError::system(format!("unit {id} is not in the roster")))
    }
}
