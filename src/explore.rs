// src/explore.rs
//! Выбор цели автоисследования.
//!
//! Неоткрытые клетки целевого региона режутся на связные кластеры, и
//! кластеры оцениваются трёхуровневой лексикографической целью,
//! приближённой взвешенной суммой: размер кластера доминирует (мелкие
//! добиваются быстрее), затем дистанция от юнита, затем дистанция от
//! базы. Веса настраиваемые, но порядок приоритетов обязан сохраняться.

use crate::fog::FogGrid;
use crate::grid::connected_components;
use crate::region::{RegionGrid, RegionId};
use std::collections::HashSet;

/// Размер кластера доминирует над обеими дистанциями
pub const CLUSTER_SIZE_WEIGHT: f64 = 1_000_000.0;
/// Дистанция до юнита доминирует над дистанцией до базы
pub const UNIT_DISTANCE_WEIGHT: f64 = 100.0;
pub const BASE_DISTANCE_WEIGHT: f64 = 1.0;

/// Неоткрытые клетки региона.
#[must_use]
pub fn collect_fog_tiles(grid: &RegionGrid, fog: &FogGrid, region_id: RegionId) -> Vec<(i32, i32)> {
    let mut tiles = Vec::new();
    for y in 0..grid.height as i32 {
        for x in 0..grid.width as i32 {
            if grid.id_at(x, y) == Some(region_id) && !fog.is_revealed(x, y) {
                tiles.push((x, y));
            }
        }
    }
    tiles
}

/// Режет клетки тумана на связные кластеры (4-соседство).
#[must_use]
pub fn cluster_fog_tiles(
    width: u32,
    height: u32,
    fog_tiles: &[(i32, i32)],
) -> Vec<Vec<(i32, i32)>> {
    let fog_set: HashSet<(i32, i32)> = fog_tiles.iter().copied().collect();
    connected_components(width, height, |x, y| fog_set.contains(&(x, y)).then_some(()))
        .into_iter()
        .map(|(_, comp)| comp)
        .collect()
}

/// Выбирает клетку, к которой юнит пойдёт дальше: ближайшую клетку
/// лучшего кластера. Возвращает `None`, если кластеров нет.
#[must_use]
pub fn choose_exploration_target(
    clusters: &[Vec<(i32, i32)>],
    unit_pos: (i32, i32),
    base_pos: (i32, i32),
) -> Option<(i32, i32)> {
    let mut best_score = f64::INFINITY;
    let mut best_target = None;

    for cluster in clusters {
        if cluster.is_empty() {
            continue;
        }
        // Ближайшая к юниту клетка кластера; при равенстве — ближе к базе
        let mut min_d_unit = i64::MAX;
        let mut min_d_base = i64::MAX;
        let mut closest = cluster[0];
        for &(tx, ty) in cluster {
            let d_unit = sq_dist((tx, ty), unit_pos);
            let d_base = sq_dist((tx, ty), base_pos);
            if d_unit < min_d_unit || (d_unit == min_d_unit && d_base < min_d_base) {
                min_d_unit = d_unit;
                min_d_base = d_base;
                closest = (tx, ty);
            }
        }

        let score = cluster.len() as f64 * CLUSTER_SIZE_WEIGHT
            + min_d_unit as f64 * UNIT_DISTANCE_WEIGHT
            + min_d_base as f64 * BASE_DISTANCE_WEIGHT;
        if score < best_score {
            best_score = score;
            best_target = Some(closest);
        }
    }
    best_target
}

fn sq_dist(a: (i32, i32), b: (i32, i32)) -> i64 {
    let dx = i64::from(a.0 - b.0);
    let dy = i64::from(a.1 - b.1);
    dx * dx + dy * dy
}
