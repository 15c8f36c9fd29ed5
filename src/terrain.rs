// src/terrain.rs
//! Синтез карты биомов: шумовые поля → классификация → береговая линия →
//! пляжи → сглаживание → вулкан.
//!
//! Ни один шаг не может завершиться ошибкой: сетка фиксированного размера,
//! вырожденная карта (например, совсем без суши) — валидный результат,
//! с которым обязаны справляться потребители.

use crate::biome::{Biome, BiomeGrid};
use crate::config::WorldGenerationParams;
use crate::grid::{DIRECTIONS_4, DIRECTIONS_8, connected_components, in_bounds};
use crate::noise::{NoiseContext, fbm, value_noise};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// Пороги классификации. Значения настраиваемые, но порядок проверок
// фиксирован: сначала высота, потом влажность.
const LAKE_ELEVATION: f32 = 0.32;
const ALPINE_ELEVATION: f32 = 0.85;
const MOUNTAIN_ELEVATION: f32 = 0.70;
const SWAMP_HUMIDITY: f32 = 0.78;
const SWAMP_MAX_ELEVATION: f32 = 0.55;
const FOREST_HUMIDITY: f32 = 0.62;
const GRASSLAND_HUMIDITY: f32 = 0.45;
const ARID_HUMIDITY: f32 = 0.30;

// Дрожание болотной границы
const SWAMP_JITTER_FREQ: f32 = 0.25;
const SWAMP_JITTER_AMP: f32 = 0.15;

// Вероятность расширения пляжа на соседнюю клетку суши
const BEACH_WIDEN_CHANCE: f64 = 0.3;

/// Край карты, вдоль которого вырезана гарантированная морская полоса.
/// Используется дальше при размещении старта игрока.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoastEdge {
    Top,
    Bottom,
    Left,
    Right,
}

/// Классификация биома по высоте и влажности.
///
/// `jitter` — небольшое дрожание болотного порога, чтобы граница болот
/// не шла ровно по изолинии влажности.
#[must_use]
pub fn classify_biome(elev: f32, humid: f32, jitter: f32) -> Biome {
    if elev < LAKE_ELEVATION {
        return Biome::Lake;
    }
    if elev > ALPINE_ELEVATION {
        return Biome::Alpine;
    }
    if elev > MOUNTAIN_ELEVATION {
        return Biome::Mountain;
    }
    if humid > SWAMP_HUMIDITY + jitter && elev < SWAMP_MAX_ELEVATION {
        return Biome::Swamp;
    }
    if humid > FOREST_HUMIDITY {
        return Biome::Forest;
    }
    if humid > GRASSLAND_HUMIDITY {
        return Biome::Grassland;
    }
    if humid < ARID_HUMIDITY {
        return Biome::Arid;
    }
    Biome::Grassland
}

/// Генерирует карту биомов и возвращает её вместе с краем, вдоль
/// которого вырезано море.
pub fn generate_biome_map(
    params: &WorldGenerationParams,
    ctx: &NoiseContext,
    rng: &mut ChaCha8Rng,
) -> (BiomeGrid, CoastEdge) {
    let width = params.width;
    let height = params.height;
    let t = params.terrain.clone();
    let total = (width * height) as usize;

    // === 1. Шумовые поля: варп координат, высота, влажность ===
    let sample = |i: usize| -> Biome {
        let x = (i % width as usize) as f32;
        let y = (i / width as usize) as f32;

        let wx = value_noise(ctx.warp_x, x * t.warp_freq, y * t.warp_freq) * t.warp_amp;
        let wy = value_noise(ctx.warp_y, x * t.warp_freq, y * t.warp_freq) * t.warp_amp;
        let sx = x + wx;
        let sy = y + wy;

        let elev = fbm(ctx.elevation, sx, sy, t.elev_freq, 4, 2.0, 0.55);
        // Влажность — смещённая решётка того же варпнутого пространства
        let humid = fbm(ctx.humidity, sx + 1000.0, sy - 500.0, t.humid_freq, 3, 2.0, 0.6);
        let jitter =
            (value_noise(ctx.boundary, x * SWAMP_JITTER_FREQ, y * SWAMP_JITTER_FREQ) - 0.5)
                * SWAMP_JITTER_AMP;
        classify_biome(elev, humid, jitter)
    };

    #[cfg(feature = "parallel")]
    let data: Vec<Biome> = (0..total).into_par_iter().map(sample).collect();
    #[cfg(not(feature = "parallel"))]
    let data: Vec<Biome> = (0..total).map(sample).collect();

    let mut grid = BiomeGrid {
        width,
        height,
        data,
    };

    // === 2. Гарантированная береговая линия вдоль случайного края ===
    let edge = *[
        CoastEdge::Top,
        CoastEdge::Bottom,
        CoastEdge::Left,
        CoastEdge::Right,
    ]
    .choose(rng)
    .unwrap();
    let sea_width = rng.gen_range(t.sea_width_min..=t.sea_width_max) as i32;

    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let dist = match edge {
                CoastEdge::Top => y,
                CoastEdge::Bottom => height as i32 - 1 - y,
                CoastEdge::Left => x,
                CoastEdge::Right => width as i32 - 1 - x,
            };
            // Два независимых масштаба дрожания, чтобы граница не была прямой
            let n1 = (value_noise(
                ctx.boundary,
                x as f32 * t.sea_jitter_freq,
                y as f32 * t.sea_jitter_freq,
            ) - 0.5)
                * t.sea_jitter_amp;
            let n2 = (value_noise(
                ctx.boundary.wrapping_add(999),
                x as f32 * t.sea_jitter_freq * 0.4,
                y as f32 * t.sea_jitter_freq * 0.4,
            ) - 0.5)
                * (t.sea_jitter_amp * 0.6);
            let jitter = (n1 + n2) as i32;
            if dist <= sea_width + jitter {
                grid.set(x, y, Biome::Sea);
            }
        }
    }

    // === 3. Озёра, касающиеся моря, — это море (до неподвижной точки) ===
    let mut changed = true;
    while changed {
        changed = false;
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                if grid.get(x, y) != Biome::Lake {
                    continue;
                }
                let touches_sea = DIRECTIONS_4.iter().any(|&(dx, dy)| {
                    in_bounds(x + dx, y + dy, width, height)
                        && grid.get(x + dx, y + dy) == Biome::Sea
                });
                if touches_sea {
                    grid.set(x, y, Biome::Sea);
                    changed = true;
                }
            }
        }
    }

    // === 4. Внутренние моря (не касаются края карты) становятся озёрами ===
    let sea_components =
        connected_components(width, height, |x, y| (grid.get(x, y) == Biome::Sea).then_some(()));
    for (_, comp) in &sea_components {
        let touches_border = comp
            .iter()
            .any(|&(x, y)| x == 0 || y == 0 || x == width as i32 - 1 || y == height as i32 - 1);
        if !touches_border {
            for &(x, y) in comp {
                grid.set(x, y, Biome::Lake);
            }
        }
    }

    // === 5. Пляжи ===
    // Снимок до пляжей нужен для «заживления» участков берега на шаге 6
    let original = grid.clone();

    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if grid.get(x, y).is_water() {
                continue;
            }
            let near_water = DIRECTIONS_4
                .iter()
                .any(|&(dx, dy)| grid.is_water_at(x + dx, y + dy));
            if near_water {
                grid.set(x, y, Biome::Beach);
            }
        }
    }

    // Вероятностное расширение пляжа на одну клетку
    let mut current_beaches = Vec::new();
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if grid.get(x, y) == Biome::Beach {
                current_beaches.push((x, y));
            }
        }
    }
    for &(bx, by) in &current_beaches {
        for &(dx, dy) in &DIRECTIONS_4 {
            let nx = bx + dx;
            let ny = by + dy;
            if in_bounds(nx, ny, width, height)
                && !grid.get(nx, ny).is_water()
                && grid.get(nx, ny) != Biome::Beach
                && rng.gen_bool(BEACH_WIDEN_CHANCE)
            {
                grid.set(nx, ny, Biome::Beach);
            }
        }
    }

    // Замыкание диагоналей: у воды не должно быть чисто диагонального
    // соседства с пляжем
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if !grid.get(x, y).is_water() {
                continue;
            }
            for &(dx, dy) in &[(1, 1), (1, -1), (-1, 1), (-1, -1)] {
                let nx = x + dx;
                let ny = y + dy;
                if !in_bounds(nx, ny, width, height) || grid.get(nx, ny) != Biome::Beach {
                    continue;
                }
                if in_bounds(x + dx, y, width, height) && !grid.get(x + dx, y).is_water() {
                    grid.set(x + dx, y, Biome::Beach);
                }
                if in_bounds(x, y + dy, width, height) && !grid.get(x, y + dy).is_water() {
                    grid.set(x, y + dy, Biome::Beach);
                }
            }
        }
    }

    // === 6. Заживление части пляжных участков до исходного биома,
    //        чтобы берег не был монотонной песчаной полосой ===
    let mut coastal_land = Vec::new();
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if grid.get(x, y) != Biome::Beach {
                continue;
            }
            let near_water = DIRECTIONS_4
                .iter()
                .any(|&(dx, dy)| grid.is_water_at(x + dx, y + dy));
            if near_water {
                coastal_land.push((x, y));
            }
        }
    }
    coastal_land.shuffle(rng);
    let patch_count = (coastal_land.len() / 20).min(8);
    for _ in 0..patch_count {
        let Some((sx, sy)) = coastal_land.pop() else {
            break;
        };
        let mut target = rng.gen_range(4..=10);
        let mut stack = vec![(sx, sy)];
        let mut visited_patch = std::collections::HashSet::new();
        while let Some((cx, cy)) = stack.pop() {
            if target == 0 || !visited_patch.insert((cx, cy)) {
                continue;
            }
            if grid.get(cx, cy) != Biome::Beach {
                continue;
            }
            let base = original.get(cx, cy);
            let restored = if base.is_water() { Biome::Grassland } else { base };
            grid.set(cx, cy, restored);
            target -= 1;
            for &(dx, dy) in &DIRECTIONS_4 {
                let nx = cx + dx;
                let ny = cy + dy;
                if in_bounds(nx, ny, width, height) && grid.get(nx, ny) == Biome::Beach {
                    stack.push((nx, ny));
                }
            }
        }
    }

    // === 7. Сглаживание суши: большинство среди 4 сухопутных соседей,
    //        тай-брейк — меньший ординал биома ===
    let mut smoothed = grid.clone();
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if grid.get(x, y).is_water() {
                continue;
            }
            let mut counts: std::collections::BTreeMap<Biome, u32> = std::collections::BTreeMap::new();
            for &(dx, dy) in &DIRECTIONS_4 {
                let nx = x + dx;
                let ny = y + dy;
                if in_bounds(nx, ny, width, height) && !grid.get(nx, ny).is_water() {
                    *counts.entry(grid.get(nx, ny)).or_insert(0) += 1;
                }
            }
            let mut best: Option<(Biome, u32)> = None;
            for (&b, &c) in &counts {
                if best.is_none_or(|(_, bc)| c > bc) {
                    best = Some((b, c));
                }
            }
            if let Some((majority, _)) = best {
                smoothed.set(x, y, majority);
            }
        }
    }
    let mut grid = smoothed;

    // === 8. Ровно один вулкан ===
    // Оценка: (альпийская ли клетка, сколько альпийских 8-соседей, горная ли)
    let mut best: Option<((bool, u32, bool), (i32, i32))> = None;
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let b = grid.get(x, y);
            if b.is_water() {
                continue;
            }
            let mut alpine_neighbors = 0;
            for &(dx, dy) in &DIRECTIONS_8 {
                let nx = x + dx;
                let ny = y + dy;
                if in_bounds(nx, ny, width, height) && grid.get(nx, ny) == Biome::Alpine {
                    alpine_neighbors += 1;
                }
            }
            let score = (b == Biome::Alpine, alpine_neighbors, b == Biome::Mountain);
            if best.is_none_or(|(bs, _)| score > bs) {
                best = Some((score, (x, y)));
            }
        }
    }
    if let Some((_, (vx, vy))) = best {
        grid.set(vx, vy, Biome::Volcano);
        // Вулкан полностью окружён альпийским поясом, вода тоже перекрывается
        for &(dx, dy) in &DIRECTIONS_8 {
            let nx = vx + dx;
            let ny = vy + dy;
            if in_bounds(nx, ny, width, height) {
                grid.set(nx, ny, Biome::Alpine);
            }
        }

        // Пояс мог отрезать карман моря от края карты — такой карман
        // снова становится озером, инвариант держится построением
        let sea_components = connected_components(width, height, |x, y| {
            (grid.get(x, y) == Biome::Sea).then_some(())
        });
        for (_, comp) in &sea_components {
            let touches_border = comp.iter().any(|&(x, y)| {
                x == 0 || y == 0 || x == width as i32 - 1 || y == height as i32 - 1
            });
            if !touches_border {
                for &(x, y) in comp {
                    grid.set(x, y, Biome::Lake);
                }
            }
        }
    }

    (grid, edge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn small_params(seed: u64) -> WorldGenerationParams {
        let mut params = WorldGenerationParams {
            seed,
            width: 96,
            height: 72,
            ..WorldGenerationParams::default()
        };
        // Узкая морская полоса, чтобы на маленькой карте оставалась суша
        params.terrain.sea_width_min = 6;
        params.terrain.sea_width_max = 10;
        params.terrain.sea_jitter_amp = 8.0;
        params
    }

    fn generate(seed: u64) -> (BiomeGrid, CoastEdge) {
        let params = small_params(seed);
        let ctx = NoiseContext::from_master_seed(seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate_biome_map(&params, &ctx, &mut rng)
    }

    #[test]
    fn classification_checks_elevation_before_humidity() {
        // Высокая влажность не спасает от гор и озёр
        assert_eq!(classify_biome(0.1, 0.9, 0.0), Biome::Lake);
        assert_eq!(classify_biome(0.9, 0.9, 0.0), Biome::Alpine);
        assert_eq!(classify_biome(0.75, 0.9, 0.0), Biome::Mountain);
        // Болото требует и влажности, и небольшой высоты
        assert_eq!(classify_biome(0.4, 0.85, 0.0), Biome::Swamp);
        assert_eq!(classify_biome(0.6, 0.85, 0.0), Biome::Forest);
        assert_eq!(classify_biome(0.4, 0.5, 0.0), Biome::Grassland);
        assert_eq!(classify_biome(0.4, 0.2, 0.0), Biome::Arid);
        // Зазор между порогами сухости и травы закрывается травой
        assert_eq!(classify_biome(0.4, 0.35, 0.0), Biome::Grassland);
    }

    #[test]
    fn generation_is_deterministic() {
        let (a, edge_a) = generate(42);
        let (b, edge_b) = generate(42);
        assert_eq!(a, b);
        assert_eq!(edge_a, edge_b);
    }

    #[test]
    fn every_sea_component_touches_border() {
        for seed in [1, 42, 1234] {
            let (grid, _) = generate(seed);
            let comps = connected_components(grid.width, grid.height, |x, y| {
                (grid.get(x, y) == Biome::Sea).then_some(())
            });
            for (_, comp) in comps {
                let touches = comp.iter().any(|&(x, y)| {
                    x == 0 || y == 0 || x == grid.width as i32 - 1 || y == grid.height as i32 - 1
                });
                assert!(touches, "внутреннее море выжило (сид {seed})");
            }
        }
    }

    #[test]
    fn no_lake_touches_sea() {
        let (grid, _) = generate(42);
        for y in 0..grid.height as i32 {
            for x in 0..grid.width as i32 {
                if grid.get(x, y) != Biome::Lake {
                    continue;
                }
                for &(dx, dy) in &DIRECTIONS_4 {
                    if in_bounds(x + dx, y + dy, grid.width, grid.height) {
                        assert_ne!(grid.get(x + dx, y + dy), Biome::Sea);
                    }
                }
            }
        }
    }

    #[test]
    fn exactly_one_volcano_ringed_by_alpine() {
        for seed in [1, 42, 1234] {
            let (grid, _) = generate(seed);
            let volcanoes: Vec<(i32, i32)> = (0..grid.height as i32)
                .flat_map(|y| (0..grid.width as i32).map(move |x| (x, y)))
                .filter(|&(x, y)| grid.get(x, y) == Biome::Volcano)
                .collect();
            let has_land = grid.data.iter().any(|b| !b.is_water());
            if !has_land {
                assert!(volcanoes.is_empty());
                continue;
            }
            assert_eq!(volcanoes.len(), 1, "сид {seed}");
            let (vx, vy) = volcanoes[0];
            for &(dx, dy) in &DIRECTIONS_8 {
                if in_bounds(vx + dx, vy + dy, grid.width, grid.height) {
                    assert_eq!(grid.get(vx + dx, vy + dy), Biome::Alpine);
                }
            }
        }
    }

    #[test]
    fn coast_edge_band_is_sea() {
        let (grid, edge) = generate(42);
        // Хотя бы часть клеток вдоль выбранного края — море
        let mut sea_on_edge = 0;
        match edge {
            CoastEdge::Top => {
                for x in 0..grid.width as i32 {
                    if grid.get(x, 0) == Biome::Sea {
                        sea_on_edge += 1;
                    }
                }
            }
            CoastEdge::Bottom => {
                for x in 0..grid.width as i32 {
                    if grid.get(x, grid.height as i32 - 1) == Biome::Sea {
                        sea_on_edge += 1;
                    }
                }
            }
            CoastEdge::Left => {
                for y in 0..grid.height as i32 {
                    if grid.get(0, y) == Biome::Sea {
                        sea_on_edge += 1;
                    }
                }
            }
            CoastEdge::Right => {
                for y in 0..grid.height as i32 {
                    if grid.get(grid.width as i32 - 1, y) == Biome::Sea {
                        sea_on_edge += 1;
                    }
                }
            }
        }
        assert!(sea_on_edge > 0);
    }
}
