// src/region/water.rs
use crate::biome::BiomeGrid;
use crate::grid::{centroid, connected_components};
use crate::region::RegionGrid;

/// Назначает каждой связной водной компоненте собственный регион.
///
/// Вызывается после починки сухопутных регионов: к этому моменту
/// неназначенными остались только водные клетки. Для каждого нового
/// региона добавляется сид-центроид.
pub fn add_water_regions(biome: &BiomeGrid, grid: &mut RegionGrid, seeds: &mut Vec<(i32, i32)>) {
    let components = {
        let grid = &*grid;
        connected_components(biome.width, biome.height, move |x, y| {
            (biome.get(x, y).is_water() && grid.raw(x, y) == -1).then_some(())
        })
    };

    let mut next_id = seeds.len() as i32;
    for (_, comp) in components {
        for &(x, y) in &comp {
            grid.set(x, y, next_id);
        }
        seeds.push(centroid(&comp));
        next_id += 1;
    }
}
