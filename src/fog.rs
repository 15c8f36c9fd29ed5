// src/fog.rs
//! Туман войны.
//!
//! Булева сетка «клетка открыта», монотонная в пределах сессии: открытое
//! не скрывается. Единственная мутирующая операция для внешних
//! потребителей — открытие круга вокруг точки.

use crate::biome::{Biome, BiomeGrid};
use crate::grid::{DIRECTIONS_4, in_bounds};
use crate::region::RegionMap;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FogGrid {
    pub width: u32,
    pub height: u32,
    data: Vec<bool>,
}

impl FogGrid {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; (width * height) as usize],
        }
    }

    #[must_use]
    pub fn is_revealed(&self, x: i32, y: i32) -> bool {
        in_bounds(x, y, self.width, self.height)
            && self.data[y as usize * self.width as usize + x as usize]
    }

    /// Открывает одну клетку; выходы за границу молча игнорируются.
    pub fn reveal(&mut self, x: i32, y: i32) {
        if in_bounds(x, y, self.width, self.height) {
            self.data[y as usize * self.width as usize + x as usize] = true;
        }
    }

    /// Открывает евклидов круг радиуса `radius` вокруг точки.
    pub fn reveal_circle(&mut self, cx: i32, cy: i32, radius: i32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.reveal(cx + dx, cy + dy);
                }
            }
        }
    }

    /// Открывает квадрат со стороной `2 * radius + 1` вокруг точки.
    pub fn reveal_square(&mut self, cx: i32, cy: i32, radius: i32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                self.reveal(cx + dx, cy + dy);
            }
        }
    }

    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

/// Стартовое открытие: полоса вдоль всего моря, стартовая область игрока
/// с одной клеткой запаса, при пустой области — блок вокруг центра.
pub fn initial_reveal(
    fog: &mut FogGrid,
    biome: &BiomeGrid,
    player_mask: &HashSet<(i32, i32)>,
    player_center: (i32, i32),
    sea_reveal_radius: i32,
) {
    for y in 0..biome.height as i32 {
        for x in 0..biome.width as i32 {
            if biome.get(x, y) == Biome::Sea {
                fog.reveal_square(x, y, sea_reveal_radius);
            }
        }
    }

    if player_mask.is_empty() {
        fog.reveal_square(player_center.0, player_center.1, 5);
    } else {
        for &(mx, my) in player_mask {
            fog.reveal_square(mx, my, 1);
        }
    }
}

/// Автооткрытие озёр: озеро нельзя обойти пешком, поэтому озёрный регион
/// открывается целиком, как только открыт весь его неозёрный периметр.
pub fn auto_reveal_lakes(fog: &mut FogGrid, biome: &BiomeGrid, regions: &RegionMap) {
    for (rid, info) in regions.infos.iter().enumerate() {
        if !info.is_lake() || info.explored {
            continue;
        }
        let tiles = regions.grid.tiles_of(rid as u32);
        let mut perimeter_revealed = true;
        let mut has_perimeter = false;
        'outer: for &(x, y) in &tiles {
            for &(dx, dy) in &DIRECTIONS_4 {
                let nx = x + dx;
                let ny = y + dy;
                if !in_bounds(nx, ny, biome.width, biome.height)
                    || biome.get(nx, ny) == Biome::Lake
                {
                    continue;
                }
                has_perimeter = true;
                if !fog.is_revealed(nx, ny) {
                    perimeter_revealed = false;
                    break 'outer;
                }
            }
        }
        if has_perimeter && perimeter_revealed {
            for &(x, y) in &tiles {
                fog.reveal(x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{RegionGrid, RegionMap};
    use crate::region::summary::summarize_regions;

    #[test]
    fn reveal_circle_is_euclidean() {
        let mut fog = FogGrid::new(16, 16);
        fog.reveal_circle(8, 8, 2);
        assert!(fog.is_revealed(8, 8));
        assert!(fog.is_revealed(10, 8));
        assert!(fog.is_revealed(8, 6));
        // Угол квадрата за пределами круга
        assert!(!fog.is_revealed(10, 10));
        assert!(!fog.is_revealed(11, 8));
    }

    #[test]
    fn reveal_ignores_out_of_bounds() {
        let mut fog = FogGrid::new(4, 4);
        fog.reveal_circle(0, 0, 3);
        assert!(fog.is_revealed(0, 0));
        assert!(!fog.is_revealed(-1, 0));
    }

    #[test]
    fn reveals_are_monotonic() {
        let mut fog = FogGrid::new(8, 8);
        fog.reveal_circle(4, 4, 2);
        let before = fog.revealed_count();
        fog.reveal_circle(4, 4, 1);
        fog.reveal_circle(6, 6, 2);
        assert!(fog.revealed_count() >= before);
        assert!(fog.is_revealed(4, 4));
    }

    /// Озеро 2×2 в центре 6×6 травы: открываем только периметр —
    /// озеро открывается целиком, хотя ни одна озёрная клетка не была
    /// в чьём-либо радиусе зрения.
    #[test]
    fn lake_opens_when_perimeter_is_revealed() {
        let mut biome = BiomeGrid::filled(6, 6, Biome::Grassland);
        for &(x, y) in &[(2, 2), (3, 2), (2, 3), (3, 3)] {
            biome.set(x, y, Biome::Lake);
        }

        // Суша — регион 0, озеро — регион 1
        let mut grid = RegionGrid::unassigned(6, 6);
        for y in 0..6 {
            for x in 0..6 {
                let id = i32::from(biome.get(x, y) == Biome::Lake);
                grid.set(x, y, id);
            }
        }
        let infos = summarize_regions(&biome, &grid, &[(0, 0), (2, 2)]);
        let mut regions = RegionMap::assemble(grid, vec![(0, 0), (2, 2)], infos);

        let mut fog = FogGrid::new(6, 6);
        // Открываем весь периметр озера, но не само озеро
        for &(x, y) in &[
            (1, 1), (2, 1), (3, 1), (4, 1),
            (1, 2), (4, 2),
            (1, 3), (4, 3),
            (1, 4), (2, 4), (3, 4), (4, 4),
        ] {
            fog.reveal(x, y);
        }
        assert!(!fog.is_revealed(2, 2));

        auto_reveal_lakes(&mut fog, &biome, &regions);
        for &(x, y) in &[(2, 2), (3, 2), (2, 3), (3, 3)] {
            assert!(fog.is_revealed(x, y));
        }

        regions.recompute_explored(&fog);
        assert!(regions.info(1).unwrap().explored);
    }

    #[test]
    fn lake_stays_hidden_while_perimeter_is_partial() {
        let mut biome = BiomeGrid::filled(5, 5, Biome::Grassland);
        biome.set(2, 2, Biome::Lake);

        let mut grid = RegionGrid::unassigned(5, 5);
        for y in 0..5 {
            for x in 0..5 {
                grid.set(x, y, i32::from(biome.get(x, y) == Biome::Lake));
            }
        }
        let infos = summarize_regions(&biome, &grid, &[(0, 0), (2, 2)]);
        let regions = RegionMap::assemble(grid, vec![(0, 0), (2, 2)], infos);

        let mut fog = FogGrid::new(5, 5);
        fog.reveal(1, 2);
        fog.reveal(3, 2);
        fog.reveal(2, 1);
        // (2, 3) остаётся скрытой

        auto_reveal_lakes(&mut fog, &biome, &regions);
        assert!(!fog.is_revealed(2, 2));
    }
}
