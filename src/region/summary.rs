// src/region/summary.rs
use crate::biome::BiomeGrid;
use crate::grid::in_bounds;
use crate::region::{RegionGrid, RegionInfo};
use std::collections::{HashMap, HashSet};

/// Строит сводку по каждому региону: размер, гистограмму биомов,
/// процентное распределение и симметричный граф соседства.
///
/// Соседство проверяется только вправо и вниз, чтобы не считать пары
/// дважды, но записывается в обе стороны.
#[must_use]
pub fn summarize_regions(
    biome: &BiomeGrid,
    grid: &RegionGrid,
    seeds: &[(i32, i32)],
) -> Vec<RegionInfo> {
    let mut infos: Vec<RegionInfo> = seeds
        .iter()
        .map(|&seed| RegionInfo {
            seed,
            size: 0,
            biomes: HashMap::new(),
            distribution: HashMap::new(),
            neighbors: HashSet::new(),
            explored: false,
        })
        .collect();

    for y in 0..grid.height as i32 {
        for x in 0..grid.width as i32 {
            let Some(rid) = grid.id_at(x, y) else { continue };
            if rid as usize >= infos.len() {
                continue;
            }
            let b = biome.get(x, y);
            infos[rid as usize].size += 1;
            *infos[rid as usize].biomes.entry(b).or_insert(0) += 1;

            for &(dx, dy) in &[(1, 0), (0, 1)] {
                let nx = x + dx;
                let ny = y + dy;
                if !in_bounds(nx, ny, grid.width, grid.height) {
                    continue;
                }
                if let Some(n_rid) = grid.id_at(nx, ny) {
                    if n_rid != rid && (n_rid as usize) < infos.len() {
                        infos[rid as usize].neighbors.insert(n_rid);
                        infos[n_rid as usize].neighbors.insert(rid);
                    }
                }
            }
        }
    }

    for info in &mut infos {
        if info.size == 0 {
            continue;
        }
        let size = info.size as f32;
        info.distribution = info
            .biomes
            .iter()
            .map(|(&b, &ct)| (b, (ct as f32 / size * 100.0).round() as u8))
            .collect();
    }
    infos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::Biome;
    use crate::region::RegionMap;

    /// Опорный сценарий: 10×10, море в рядах 0–1, остальное трава,
    /// единственный сид в (5, 9) → два региона после водной нарезки,
    /// у суши 80 клеток и море в соседях.
    #[test]
    fn ten_by_ten_reference_scenario() {
        let mut biome = BiomeGrid::filled(10, 10, Biome::Grassland);
        for x in 0..10 {
            biome.set(x, 0, Biome::Sea);
            biome.set(x, 1, Biome::Sea);
        }

        let ctx = crate::noise::NoiseContext::from_master_seed(1);
        let settings = crate::config::RegionSettings::default();
        let mut seeds = vec![(5, 9)];
        let mut grid = crate::region::partition::assign_regions(&biome, &seeds, &settings, &ctx);
        crate::region::repair::split_disjoint_regions(
            &mut grid,
            &biome,
            &mut seeds,
            settings.split_threshold,
        );
        crate::region::repair::merge_small_regions(&mut grid, &biome, seeds.len(), &settings);
        crate::region::water::add_water_regions(&biome, &mut grid, &mut seeds);

        let infos = summarize_regions(&biome, &grid, &seeds);
        assert_eq!(infos.len(), 2);

        let land_id = 0u32;
        let sea_id = 1u32;
        assert_eq!(infos[land_id as usize].size, 80);
        assert_eq!(infos[sea_id as usize].size, 20);
        assert!(infos[land_id as usize].neighbors.contains(&sea_id));
        assert!(infos[sea_id as usize].neighbors.contains(&land_id));
        assert_eq!(infos[land_id as usize].distribution[&Biome::Grassland], 100);

        let map = RegionMap::assemble(grid, seeds, infos);
        assert!(map.is_adjacent(land_id, sea_id));
        assert!(map.is_adjacent(sea_id, land_id));
        assert!(!map.is_adjacent(land_id, land_id));
    }

    #[test]
    fn adjacency_is_symmetric() {
        let mut biome = BiomeGrid::filled(9, 3, Biome::Grassland);
        for y in 0..3 {
            biome.set(4, y, Biome::Lake);
        }
        let mut grid = RegionGrid::unassigned(9, 3);
        for y in 0..3 {
            for x in 0..4 {
                grid.set(x, y, 0);
            }
            for x in 5..9 {
                grid.set(x, y, 1);
            }
        }
        let mut seeds = vec![(1, 1), (7, 1)];
        crate::region::water::add_water_regions(&biome, &mut grid, &mut seeds);

        let infos = summarize_regions(&biome, &grid, &seeds);
        for (rid, info) in infos.iter().enumerate() {
            for &n in &info.neighbors {
                assert!(
                    infos[n as usize].neighbors.contains(&(rid as u32)),
                    "несимметричное соседство {rid} ↔ {n}"
                );
            }
        }
        // Суша с сушей не граничит — между ними озёрный регион 2
        assert!(!infos[0].neighbors.contains(&1));
        assert!(infos[0].neighbors.contains(&2));
        assert!(infos[1].neighbors.contains(&2));
    }

    #[test]
    fn distribution_percentages() {
        let mut biome = BiomeGrid::filled(4, 1, Biome::Grassland);
        biome.set(3, 0, Biome::Forest);
        let mut grid = RegionGrid::unassigned(4, 1);
        for x in 0..4 {
            grid.set(x, 0, 0);
        }
        let infos = summarize_regions(&biome, &grid, &[(0, 0)]);
        assert_eq!(infos[0].distribution[&Biome::Grassland], 75);
        assert_eq!(infos[0].distribution[&Biome::Forest], 25);
    }
}
