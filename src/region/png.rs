// src/region/png.rs
//! Визуализация карты регионов в изображение.
//!
//! Каждый регион получает псевдослучайный цвет, выведенный из его
//! идентификатора: картинка одного и того же мира всегда раскрашена
//! одинаково. Суша — зелёные тона, вода — синие; сиды регионов
//! отмечаются кружками.

use crate::region::RegionMap;
use image::{ImageBuffer, Rgba};
use imageproc::drawing::draw_filled_circle_mut;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

#[must_use]
pub fn to_rgba_image(regions: &RegionMap) -> Vec<u8> {
    let mut colors: HashMap<u32, [u8; 4]> = HashMap::new();
    for (rid, info) in regions.infos.iter().enumerate() {
        let mut rng = ChaCha8Rng::seed_from_u64(rid as u64);
        let color = if info.has_land() {
            [
                rng.gen_range(100..220),
                rng.gen_range(120..255),
                rng.gen_range(50..100),
                255,
            ]
        } else {
            [30, 60, rng.gen_range(120..220), 255]
        };
        colors.insert(rid as u32, color);
    }

    let mut data: Vec<u8> = Vec::with_capacity(
        regions.grid.width as usize * regions.grid.height as usize * 4,
    );
    for y in 0..regions.grid.height as i32 {
        for x in 0..regions.grid.width as i32 {
            let px = regions
                .grid
                .id_at(x, y)
                .and_then(|rid| colors.get(&rid).copied())
                .unwrap_or([20, 20, 60, 255]); // тёмный фон — сигнал ошибки
            data.extend_from_slice(&px);
        }
    }
    data
}

pub fn save_as_png(regions: &RegionMap, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(
        regions.grid.width,
        regions.grid.height,
        to_rgba_image(regions),
    )
    .ok_or("Failed to create image buffer")?;

    // Отмечаем сиды регионов
    for &(sx, sy) in &regions.seeds {
        draw_filled_circle_mut(&mut img, (sx, sy), 1, Rgba([255, 255, 255, 255]));
    }

    img.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{Biome, BiomeGrid};
    use crate::region::RegionGrid;
    use crate::region::summary::summarize_regions;

    #[test]
    fn image_buffer_matches_grid_size() {
        let biome = BiomeGrid::filled(6, 4, Biome::Grassland);
        let mut grid = RegionGrid::unassigned(6, 4);
        for y in 0..4 {
            for x in 0..6 {
                grid.set(x, y, 0);
            }
        }
        let infos = summarize_regions(&biome, &grid, &[(3, 2)]);
        let map = RegionMap::assemble(grid, vec![(3, 2)], infos);
        assert_eq!(to_rgba_image(&map).len(), 6 * 4 * 4);
    }
}
