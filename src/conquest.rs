// src/conquest.rs
//! Захват региона конкистадором.
//!
//! Конкистадор, получивший приказ на регион, сначала доходит до его
//! сида; после прибытия раз в игровой день территория игрока
//! прирастает несколькими клетками региона — в первую очередь
//! примыкающими к уже захваченным, всегда ближайшими к юниту.

use crate::events::GameEvent;
use crate::grid::DIRECTIONS_4;
use crate::region::{RegionGrid, RegionId};
use crate::unit::Unit;
use std::collections::HashSet;

/// Сколько клеток присоединяется за один день после прибытия
pub const CONQUEST_TILES_PER_DAY: usize = 3;

/// Дистанция до сида, с которой конкистадор считается прибывшим
const ARRIVAL_DISTANCE: f32 = 0.5;

/// Ход захвата одного региона.
#[derive(Debug, Clone, Default)]
pub struct ConquestState {
    /// Прибыл ли конкистадор к сиду региона
    pub arrived_at_seed: bool,
    /// Уже присоединённые клетки
    pub tiles: HashSet<(i32, i32)>,
    /// Все клетки региона; заполняется лениво при первом расширении
    pub all_tiles: Option<HashSet<(i32, i32)>>,
    /// Счётчик присоединённых клеток
    pub progress: usize,
}

/// Дневной шаг захвата. Возвращает событие при полном захвате региона.
pub fn update_conquest(
    unit: &mut Unit,
    state: &mut ConquestState,
    region_id: RegionId,
    region_seed: Option<(i32, i32)>,
    grid: &RegionGrid,
    player_mask: &mut HashSet<(i32, i32)>,
) -> Option<GameEvent> {
    let (ux, uy) = unit.grid_pos();

    // Расширение идёт только изнутри целевого региона
    if grid.id_at(ux, uy) != Some(region_id) {
        return None;
    }

    // Сначала дойти до сида
    if !state.arrived_at_seed {
        match region_seed {
            Some((sx, sy)) => {
                let dx = unit.x - sx as f32;
                let dy = unit.y - sy as f32;
                if (dx * dx + dy * dy).sqrt() < ARRIVAL_DISTANCE {
                    state.arrived_at_seed = true;
                } else {
                    return None;
                }
            }
            None => state.arrived_at_seed = true,
        }
    }

    let all_tiles = state
        .all_tiles
        .get_or_insert_with(|| grid.tiles_of(region_id).into_iter().collect());

    for _ in 0..CONQUEST_TILES_PER_DAY {
        let mut candidates: Vec<(i32, i32)> = Vec::new();
        if state.tiles.is_empty() {
            // Первая клетка — под юнитом
            if grid.id_at(ux, uy) == Some(region_id) {
                candidates.push((ux, uy));
            }
        } else {
            for &(px, py) in &state.tiles {
                for &(dx, dy) in &DIRECTIONS_4 {
                    let n = (px + dx, py + dy);
                    if grid.id_at(n.0, n.1) == Some(region_id)
                        && !player_mask.contains(&n)
                        && !candidates.contains(&n)
                    {
                        candidates.push(n);
                    }
                }
            }
            if candidates.is_empty() {
                // Оторванные остатки региона: тянемся к ближайшей
                let unowned = all_tiles
                    .iter()
                    .filter(|t| !state.tiles.contains(t) && !player_mask.contains(t))
                    .copied()
                    .min_by_key(|&(x, y)| (sq_dist((x, y), (ux, uy)), y, x));
                if let Some(t) = unowned {
                    candidates.push(t);
                }
            }
        }

        // Тай-брейк по (y, x): порядок обхода захваченных клеток не задан
        let Some(&best) = candidates
            .iter()
            .min_by_key(|&&(x, y)| (sq_dist((x, y), (ux, uy)), y, x))
        else {
            break;
        };
        player_mask.insert(best);
        state.tiles.insert(best);
        state.progress += 1;
    }

    if state.tiles.len() >= all_tiles.len() {
        unit.conquering_region_id = None;
        return Some(GameEvent::ConquestCompleted { region_id });
    }
    None
}

fn sq_dist(a: (i32, i32), b: (i32, i32)) -> i64 {
    let dx = i64::from(a.0 - b.0);
    let dy = i64::from(a.1 - b.1);
    dx * dx + dy * dy
}
