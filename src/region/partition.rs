// src/region/partition.rs
use crate::biome::BiomeGrid;
use crate::config::RegionSettings;
use crate::grid::{DIRECTIONS_4, in_bounds};
use crate::noise::{NoiseContext, value_noise};
use crate::region::RegionGrid;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashSet};

/// Набирает сиды регионов отбраковкой случайных точек.
///
/// Сид игрока всегда идёт первым (регион 0). Кандидат отбрасывается,
/// если попал на воду, на занятую клетку или ближе минимальной
/// дистанции Чебышёва к уже выбранному сиду. Бюджет попыток ограничен:
/// при исчерпании просто получается меньше регионов — это не ошибка.
pub fn pick_region_seeds(
    biome: &BiomeGrid,
    player_seed: (i32, i32),
    settings: &RegionSettings,
    rng: &mut ChaCha8Rng,
) -> Vec<(i32, i32)> {
    let seed_count = rng.gen_range(settings.seed_min..=settings.seed_max);
    let mut seeds = vec![player_seed];
    let mut seen: HashSet<(i32, i32)> = HashSet::from([player_seed]);

    let mut attempts = seed_count * 30;
    while seeds.len() < seed_count && attempts > 0 {
        attempts -= 1;
        let x = rng.gen_range(0..biome.width as i32);
        let y = rng.gen_range(0..biome.height as i32);
        if biome.get(x, y).is_water() || seen.contains(&(x, y)) {
            continue;
        }
        let too_close = seeds
            .iter()
            .any(|&(sx, sy)| (sx - x).abs().max((sy - y).abs()) < settings.min_seed_spacing);
        if too_close {
            continue;
        }
        seeds.push((x, y));
        seen.insert((x, y));
    }
    seeds
}

/// Назначает каждой клетке суши ближайший сид (Вороной) и сглаживает
/// результат одним проходом большинства.
///
/// К расстоянию каждой клетки добавляется общее шумовое дрожание: оно
/// искривляет границы, не смещая победителя на ровном месте. Водные
/// клетки остаются неназначенными до водной нарезки.
#[must_use]
pub fn assign_regions(
    biome: &BiomeGrid,
    seeds: &[(i32, i32)],
    settings: &RegionSettings,
    ctx: &NoiseContext,
) -> RegionGrid {
    let width = biome.width;
    let height = biome.height;
    let mut grid = RegionGrid::unassigned(width, height);

    // Вороной
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if biome.get(x, y).is_water() {
                continue;
            }
            let jitter = value_noise(
                ctx.voronoi,
                x as f32 * settings.voronoi_freq,
                y as f32 * settings.voronoi_freq,
            ) * settings.noise_weight;
            let mut best_id = -1;
            let mut best_dist = f32::INFINITY;
            for (idx, &(sx, sy)) in seeds.iter().enumerate() {
                let dx = (sx - x) as f32;
                let dy = (sy - y) as f32;
                let d = (dx * dx + dy * dy).sqrt() + jitter;
                if d < best_dist {
                    best_dist = d;
                    best_id = idx as i32;
                }
            }
            grid.set(x, y, best_id);
        }
    }

    // Сглаживание: большинство среди 4 сухопутных соседей,
    // тай-брейк — меньший идентификатор
    let mut smoothed = grid.clone();
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if biome.get(x, y).is_water() {
                continue;
            }
            let mut counts: BTreeMap<i32, u32> = BTreeMap::new();
            for &(dx, dy) in &DIRECTIONS_4 {
                let nx = x + dx;
                let ny = y + dy;
                if in_bounds(nx, ny, width, height) && !biome.get(nx, ny).is_water() {
                    *counts.entry(grid.raw(nx, ny)).or_insert(0) += 1;
                }
            }
            let mut best: Option<(i32, u32)> = None;
            for (&id, &c) in &counts {
                if best.is_none_or(|(_, bc)| c > bc) {
                    best = Some((id, c));
                }
            }
            if let Some((majority, _)) = best {
                smoothed.set(x, y, majority);
            }
        }
    }
    smoothed
}
