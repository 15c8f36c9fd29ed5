// src/region/player.rs
//! Размещение стартовой области игрока.
//!
//! Игрок начинает у побережья: стартовая клетка выбирается из суши,
//! граничащей с морем, маска области растёт BFS до целевого размера и
//! обязана иметь выход к морю. Регион 0 после нарезки принудительно
//! совпадает с маской.

use crate::biome::{Biome, BiomeGrid};
use crate::grid::{DIRECTIONS_4, in_bounds};
use crate::region::RegionGrid;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashSet, VecDeque};

const MASK_GROW_ATTEMPTS: usize = 8;

/// Суша, граничащая с морем по 4-соседству, в порядке сканирования.
#[must_use]
pub fn find_coastal_land(biome: &BiomeGrid) -> Vec<(i32, i32)> {
    let mut candidates = Vec::new();
    for y in 0..biome.height as i32 {
        for x in 0..biome.width as i32 {
            if biome.get(x, y).is_water() {
                continue;
            }
            let near_sea = DIRECTIONS_4.iter().any(|&(dx, dy)| {
                in_bounds(x + dx, y + dy, biome.width, biome.height)
                    && biome.get(x + dx, y + dy) == Biome::Sea
            });
            if near_sea {
                candidates.push((x, y));
            }
        }
    }
    candidates
}

/// Выбирает стартовую клетку игрока: прибрежная суша, иначе любая суша,
/// иначе центр карты (вырожденная карта — не ошибка).
#[must_use]
pub fn choose_player_start(biome: &BiomeGrid, rng: &mut ChaCha8Rng) -> (i32, i32) {
    let coastal = find_coastal_land(biome);
    if let Some(&p) = coastal.choose(rng) {
        return p;
    }
    let mut land = Vec::new();
    for y in 0..biome.height as i32 {
        for x in 0..biome.width as i32 {
            if !biome.get(x, y).is_water() {
                land.push((x, y));
            }
        }
    }
    if let Some(&p) = land.choose(rng) {
        return p;
    }
    (biome.width as i32 / 2, biome.height as i32 / 2)
}

/// Выращивает маску стартовой области BFS от стартовой клетки.
///
/// Рост идёт только по 4-соседству, поэтому маска всегда связна —
/// это и есть будущий регион 0, а разорванный регион 0 чинить нельзя.
/// Если выросшая маска не касается моря, попытка повторяется от новой
/// прибрежной клетки (ограниченное число раз).
pub fn build_player_region_mask(
    biome: &BiomeGrid,
    start: (i32, i32),
    target_min: usize,
    target_max: usize,
    rng: &mut ChaCha8Rng,
) -> HashSet<(i32, i32)> {
    let mut start = start;
    let mut mask = HashSet::new();

    for _ in 0..MASK_GROW_ATTEMPTS {
        mask = grow_mask(biome, start, target_min, target_max, rng);

        let has_coast = mask.iter().any(|&(mx, my)| {
            DIRECTIONS_4.iter().any(|&(dx, dy)| {
                in_bounds(mx + dx, my + dy, biome.width, biome.height)
                    && biome.get(mx + dx, my + dy) == Biome::Sea
            })
        });
        if has_coast {
            return mask;
        }
        let coastal = find_coastal_land(biome);
        match coastal.choose(rng) {
            Some(&p) => start = p,
            None => return mask, // моря нет вовсе — берём что выросло
        }
    }
    mask
}

fn grow_mask(
    biome: &BiomeGrid,
    start: (i32, i32),
    target_min: usize,
    target_max: usize,
    rng: &mut ChaCha8Rng,
) -> HashSet<(i32, i32)> {
    let target = rng.gen_range(target_min..=target_max);
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([start]);
    let mut mask = HashSet::new();
    let mut frontier = Vec::new();

    while let Some((x, y)) = queue.pop_front() {
        if mask.len() >= target || !visited.insert((x, y)) {
            continue;
        }
        if biome.get(x, y).is_water() {
            continue;
        }
        mask.insert((x, y));
        for &(dx, dy) in &DIRECTIONS_4 {
            let nx = x + dx;
            let ny = y + dy;
            if !in_bounds(nx, ny, biome.width, biome.height) || biome.get(nx, ny).is_water() {
                continue;
            }
            if !visited.contains(&(nx, ny)) {
                queue.push_back((nx, ny));
            }
            frontier.push((nx, ny));
        }
    }

    // Добор из границы в случайном порядке
    while mask.len() < target && !frontier.is_empty() {
        let i = rng.gen_range(0..frontier.len());
        let (nx, ny) = frontier.swap_remove(i);
        if !mask.contains(&(nx, ny)) && !biome.get(nx, ny).is_water() {
            mask.insert((nx, ny));
        }
    }

    // Последний добор: любая суша, примыкающая к маске по 4-соседству
    if mask.len() < target {
        let mut extra = Vec::new();
        for y in 0..biome.height as i32 {
            for x in 0..biome.width as i32 {
                if biome.get(x, y).is_water() || mask.contains(&(x, y)) {
                    continue;
                }
                let touches = DIRECTIONS_4
                    .iter()
                    .any(|&(dx, dy)| mask.contains(&(x + dx, y + dy)));
                if touches {
                    extra.push((x, y));
                }
            }
        }
        extra.shuffle(rng);
        for (x, y) in extra {
            if mask.len() >= target {
                break;
            }
            mask.insert((x, y));
        }
    }
    mask
}

/// Принудительно делает регион 0 равным маске игрока.
///
/// Клетки региона 0 вне маски отдаются ближайшему чужому сиду, клетки
/// маски получают 0, а сиды, оказавшиеся внутри маски, переезжают на
/// клетку своего региона, ближайшую к его центроиду.
pub fn enforce_player_region(
    grid: &mut RegionGrid,
    mask: &HashSet<(i32, i32)>,
    seeds: &mut [(i32, i32)],
) {
    if seeds.len() > 1 {
        for y in 0..grid.height as i32 {
            for x in 0..grid.width as i32 {
                if grid.raw(x, y) != 0 || mask.contains(&(x, y)) {
                    continue;
                }
                let mut best_id = 1;
                let mut best_dist = i64::MAX;
                for (idx, &(sx, sy)) in seeds.iter().enumerate().skip(1) {
                    let dx = i64::from(sx - x);
                    let dy = i64::from(sy - y);
                    let d = dx * dx + dy * dy;
                    if d < best_dist {
                        best_dist = d;
                        best_id = idx as i32;
                    }
                }
                grid.set(x, y, best_id);
            }
        }
    }

    for &(mx, my) in mask {
        grid.set(mx, my, 0);
    }

    for idx in 1..seeds.len() {
        if !mask.contains(&seeds[idx]) {
            continue;
        }
        let tiles = grid.tiles_of(idx as u32);
        if tiles.is_empty() {
            continue;
        }
        let c = crate::grid::centroid(&tiles);
        if let Some(p) = crate::grid::nearest_tile_to(&tiles, c) {
            seeds[idx] = p;
        }
    }
}

/// Центр стартовой области — середина её ограничивающего прямоугольника.
#[must_use]
pub fn player_region_center(mask: &HashSet<(i32, i32)>, fallback: (i32, i32)) -> (i32, i32) {
    if mask.is_empty() {
        return fallback;
    }
    let min_x = mask.iter().map(|p| p.0).min().unwrap();
    let max_x = mask.iter().map(|p| p.0).max().unwrap();
    let min_y = mask.iter().map(|p| p.1).min().unwrap();
    let max_y = mask.iter().map(|p| p.1).max().unwrap();
    ((min_x + max_x) / 2, (min_y + max_y) / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn coastal_world() -> BiomeGrid {
        let mut biome = BiomeGrid::filled(30, 30, Biome::Grassland);
        for x in 0..30 {
            biome.set(x, 0, Biome::Sea);
            biome.set(x, 1, Biome::Sea);
        }
        biome
    }

    #[test]
    fn start_prefers_coastal_land() {
        let biome = coastal_world();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (x, y) = choose_player_start(&biome, &mut rng);
        // Единственная прибрежная полоса — ряд 2
        assert_eq!(y, 2);
        assert!(!biome.get(x, y).is_water());
    }

    #[test]
    fn start_falls_back_to_grid_center_on_all_water_map() {
        let biome = BiomeGrid::filled(12, 8, Biome::Sea);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(choose_player_start(&biome, &mut rng), (6, 4));
    }

    #[test]
    fn mask_is_sized_connected_and_coastal() {
        let biome = coastal_world();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let start = choose_player_start(&biome, &mut rng);
        let mask = build_player_region_mask(&biome, start, 20, 30, &mut rng);

        assert!((20..=30).contains(&mask.len()));
        for &(x, y) in &mask {
            assert!(!biome.get(x, y).is_water());
        }
        // Связность: BFS от любой клетки маски покрывает её целиком
        let start_tile = *mask.iter().next().unwrap();
        let mut seen = HashSet::from([start_tile]);
        let mut queue = VecDeque::from([start_tile]);
        while let Some((x, y)) = queue.pop_front() {
            for &(dx, dy) in &DIRECTIONS_4 {
                let n = (x + dx, y + dy);
                if mask.contains(&n) && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        assert_eq!(seen.len(), mask.len(), "маска должна быть связной");
        // Выход к морю
        assert!(mask.iter().any(|&(x, y)| {
            DIRECTIONS_4
                .iter()
                .any(|&(dx, dy)| biome.is_water_at(x + dx, y + dy))
        }));
    }

    #[test]
    fn enforce_makes_region_zero_equal_mask() {
        let biome = BiomeGrid::filled(10, 10, Biome::Grassland);
        let mut grid = RegionGrid::unassigned(10, 10);
        // Регион 0 изначально занимает левую половину, регион 1 правую
        for y in 0..10 {
            for x in 0..10 {
                grid.set(x, y, i32::from(x >= 5));
            }
        }
        let mask: HashSet<(i32, i32)> =
            [(1, 1), (2, 1), (1, 2), (2, 2)].into_iter().collect();
        let mut seeds = [(1, 1), (8, 5)];

        enforce_player_region(&mut grid, &mask, &mut seeds);

        for y in 0..10 {
            for x in 0..10 {
                let expected = i32::from(!mask.contains(&(x, y)));
                assert_eq!(grid.raw(x, y), expected);
            }
        }
    }

    #[test]
    fn seed_inside_mask_is_relocated() {
        let mut grid = RegionGrid::unassigned(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                grid.set(x, y, i32::from(x >= 4));
            }
        }
        // Сид региона 1 стоит внутри будущей маски игрока
        let mask: HashSet<(i32, i32)> = [(4, 4), (5, 4), (4, 5), (5, 5)].into_iter().collect();
        let mut seeds = [(0, 0), (4, 4)];

        enforce_player_region(&mut grid, &mask, &mut seeds);

        let (sx, sy) = seeds[1];
        assert!(!mask.contains(&(sx, sy)));
        assert_eq!(grid.raw(sx, sy), 1);
    }

    #[test]
    fn center_is_bounding_box_midpoint() {
        let mask: HashSet<(i32, i32)> = [(2, 3), (6, 3), (4, 9)].into_iter().collect();
        assert_eq!(player_region_center(&mask, (0, 0)), (4, 6));
        assert_eq!(player_region_center(&HashSet::new(), (7, 7)), (7, 7));
    }
}
