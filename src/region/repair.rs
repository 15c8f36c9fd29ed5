// src/region/repair.rs
//! Починка топологических дефектов нарезки.
//!
//! После сглаживания один регион может распасться на несвязные куски.
//! Здесь каждый такой кусок либо получает собственный идентификатор,
//! либо вливается в соседа; затем мелкие регионы вливаются в крупных
//! соседей. После обоих проходов множество клеток каждого региона
//! связно по 4-соседству, и повторный прогон ничего не меняет.

use crate::biome::BiomeGrid;
use crate::config::RegionSettings;
use crate::grid::{DIRECTIONS_4, connected_components, in_bounds};
use crate::region::RegionGrid;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Разделяет несвязные компоненты каждого региона.
///
/// Крупнейшая компонента сохраняет идентификатор. Остальные получают
/// новый идентификатор с сидом-центроидом, если не меньше
/// `split_threshold`, иначе вливаются в самый частый регион вдоль
/// своей границы (настоящий остров без соседей тоже получает новый
/// идентификатор).
pub fn split_disjoint_regions(
    grid: &mut RegionGrid,
    biome: &BiomeGrid,
    seeds: &mut Vec<(i32, i32)>,
    split_threshold: usize,
) {
    let width = grid.width;
    let height = grid.height;

    let components = {
        let grid = &*grid;
        connected_components(width, height, move |x, y| {
            if biome.get(x, y).is_water() {
                return None;
            }
            let raw = grid.raw(x, y);
            (raw >= 0).then_some(raw)
        })
    };

    // Группировка компонент по исходному региону, порядок первого
    // появления — для стабильной нумерации новых идентификаторов
    let mut order: Vec<i32> = Vec::new();
    let mut by_region: HashMap<i32, Vec<Vec<(i32, i32)>>> = HashMap::new();
    for (rid, comp) in components {
        if !by_region.contains_key(&rid) {
            order.push(rid);
        }
        by_region.entry(rid).or_default().push(comp);
    }

    // Соседей ищем по состоянию до любых перенумераций
    let snapshot = grid.clone();
    let mut next_id = seeds.len() as i32;

    for rid in order {
        let mut comps = by_region.remove(&rid).unwrap_or_default();
        if comps.len() < 2 {
            continue;
        }
        comps.sort_by(|a, b| b.len().cmp(&a.len()));

        for comp in &comps[1..] {
            if comp.len() >= split_threshold {
                let new_id = next_id;
                next_id += 1;
                seeds.push(crate::grid::centroid(comp));
                for &(x, y) in comp {
                    grid.set(x, y, new_id);
                }
                continue;
            }

            // Мелкий кусок: самый частый сосед вдоль границы,
            // тай-брейк — меньший идентификатор. Регион 0 целью не
            // бывает: его состав зафиксирован маской игрока
            let mut neighbor_counts: BTreeMap<i32, u32> = BTreeMap::new();
            for &(x, y) in comp {
                for &(dx, dy) in &DIRECTIONS_4 {
                    let nx = x + dx;
                    let ny = y + dy;
                    if !in_bounds(nx, ny, width, height) {
                        continue;
                    }
                    let n_rid = snapshot.raw(nx, ny);
                    if n_rid > 0 && n_rid != rid {
                        *neighbor_counts.entry(n_rid).or_insert(0) += 1;
                    }
                }
            }
            let mut target: Option<(i32, u32)> = None;
            for (&id, &c) in &neighbor_counts {
                if target.is_none_or(|(_, bc)| c > bc) {
                    target = Some((id, c));
                }
            }
            if let Some((target_rid, _)) = target {
                for &(x, y) in comp {
                    grid.set(x, y, target_rid);
                }
            } else {
                // Остров без соседей: отдельный регион
                let new_id = next_id;
                next_id += 1;
                seeds.push(crate::grid::centroid(comp));
                for &(x, y) in comp {
                    grid.set(x, y, new_id);
                }
            }
        }
    }
}

/// Вливает мелкие регионы (не больше `merge_threshold` клеток) в
/// крупнейшего прямого соседа. Регион игрока (0) не трогается.
///
/// Цепочки слияний разрешаются через таблицу перенаправлений: если
/// сосед уже влит куда-то, целью становится его приёмник — иначе
/// слияние в уже опустевший регион разорвало бы связность.
///
/// Регион без сухопутных соседей — остров; влить его можно только
/// через воду, что снова создало бы разорванный регион, поэтому по
/// умолчанию остров остаётся отдельным регионом
/// (`RegionSettings::merge_islands` включает старое поведение:
/// BFS наружу до первого чужого региона).
pub fn merge_small_regions(
    grid: &mut RegionGrid,
    biome: &BiomeGrid,
    region_count: usize,
    settings: &RegionSettings,
) {
    let width = grid.width;
    let height = grid.height;

    // Сбор размеров, клеток и сухопутных соседей каждого региона.
    // Вода не участвует: водные регионы не сливаются и не принимают
    let mut tiles: Vec<Vec<(i32, i32)>> = vec![Vec::new(); region_count];
    let mut neighbors: Vec<HashSet<i32>> = vec![HashSet::new(); region_count];
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if biome.get(x, y).is_water() {
                continue;
            }
            let rid = grid.raw(x, y);
            if rid < 0 || rid as usize >= region_count {
                continue;
            }
            tiles[rid as usize].push((x, y));
            for &(dx, dy) in &DIRECTIONS_4 {
                let nx = x + dx;
                let ny = y + dy;
                if in_bounds(nx, ny, width, height) && !biome.get(nx, ny).is_water() {
                    let n_rid = grid.raw(nx, ny);
                    if n_rid != -1 && n_rid != rid {
                        neighbors[rid as usize].insert(n_rid);
                    }
                }
            }
        }
    }
    let mut sizes: Vec<usize> = tiles.iter().map(Vec::len).collect();

    let candidates: Vec<usize> = (1..region_count)
        .filter(|&rid| sizes[rid] > 0 && sizes[rid] <= settings.merge_threshold)
        .collect();

    let mut merged_into: HashMap<i32, i32> = HashMap::new();
    let resolve = |merged_into: &HashMap<i32, i32>, mut id: i32| -> i32 {
        while let Some(&next) = merged_into.get(&id) {
            id = next;
        }
        id
    };

    for rid in candidates {
        let rid_i = rid as i32;

        // Прямые соседи с учётом уже выполненных слияний;
        // регион 0 целью слияния не бывает
        let mut resolved: Vec<i32> = neighbors[rid]
            .iter()
            .map(|&n| resolve(&merged_into, n))
            .filter(|&n| n != rid_i && n != 0)
            .collect();
        resolved.sort_unstable();
        resolved.dedup();

        let target = resolved
            .iter()
            .copied()
            .max_by_key(|&n| (sizes[n as usize], std::cmp::Reverse(n)))
            .or_else(|| {
                if !settings.merge_islands {
                    return None;
                }
                // Остров: BFS наружу через воду до первого чужого региона
                let mut visited: HashSet<(i32, i32)> = tiles[rid].iter().copied().collect();
                let mut queue: VecDeque<(i32, i32)> = tiles[rid].iter().copied().collect();
                while let Some((cx, cy)) = queue.pop_front() {
                    for &(dx, dy) in &DIRECTIONS_4 {
                        let nx = cx + dx;
                        let ny = cy + dy;
                        if !in_bounds(nx, ny, width, height) || !visited.insert((nx, ny)) {
                            continue;
                        }
                        let n_rid = grid.raw(nx, ny);
                        if n_rid != -1 && !biome.get(nx, ny).is_water() {
                            let target = resolve(&merged_into, n_rid);
                            if target != rid_i && target != 0 {
                                return Some(target);
                            }
                        }
                        queue.push_back((nx, ny));
                    }
                }
                None
            });

        if let Some(target_rid) = target {
            let moved = std::mem::take(&mut tiles[rid]);
            for &(x, y) in &moved {
                grid.set(x, y, target_rid);
            }
            sizes[target_rid as usize] += moved.len();
            sizes[rid] = 0;
            tiles[target_rid as usize].extend(moved);
            merged_into.insert(rid_i, target_rid);
        }
    }
}
