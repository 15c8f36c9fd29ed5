// src/biome.rs
use image::{ImageBuffer, Rgba};
use serde::{Deserialize, Serialize};

/// Биом клетки. Порядок вариантов фиксирован: он задаёт детерминированный
/// тай-брейк при сглаживании большинством (меньший ординал побеждает).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Biome {
    Sea,
    Lake,
    Beach,
    Grassland,
    Forest,
    Mountain,
    Alpine,
    Swamp,
    Arid,
    Volcano,
}

impl Biome {
    /// Вода — море и озёра; всё остальное считается сушей.
    #[must_use]
    pub fn is_water(self) -> bool {
        matches!(self, Biome::Sea | Biome::Lake)
    }

    #[must_use]
    pub fn to_rgb(self) -> [u8; 3] {
        match self {
            Biome::Sea => [30, 80, 180],
            Biome::Lake => [120, 200, 255],
            Biome::Beach => [230, 220, 170],
            Biome::Grassland => [90, 180, 70],
            Biome::Forest => [30, 120, 50],
            Biome::Mountain => [120, 110, 100],
            Biome::Alpine => [230, 240, 250],
            Biome::Swamp => [70, 120, 90],
            Biome::Arid => [200, 180, 120],
            Biome::Volcano => [180, 60, 40],
        }
    }
}

/// Карта биомов: по одному значению на клетку, неизменна после генерации.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiomeGrid {
    pub width: u32,
    pub height: u32,
    pub data: Vec<Biome>,
}

impl BiomeGrid {
    #[must_use]
    pub fn filled(width: u32, height: u32, biome: Biome) -> Self {
        Self {
            width,
            height,
            data: vec![biome; (width * height) as usize],
        }
    }

    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Biome {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: i32, y: i32, biome: Biome) {
        self.data[y as usize * self.width as usize + x as usize] = biome;
    }

    /// Вода в границах карты; клетки за краем водой не считаются.
    #[must_use]
    pub fn is_water_at(&self, x: i32, y: i32) -> bool {
        crate::grid::in_bounds(x, y, self.width, self.height) && self.get(x, y).is_water()
    }

    #[must_use]
    pub fn to_rgba_image(&self) -> Vec<u8> {
        self.data
            .iter()
            .flat_map(|&b| {
                let rgb = b.to_rgb();
                [rgb[0], rgb[1], rgb[2], 255] // RGBA
            })
            .collect()
    }

    pub fn save_as_png(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_raw(self.width, self.height, self.to_rgba_image())
                .ok_or("Failed to create image buffer")?;
        img.save(path)?;
        Ok(())
    }
}
