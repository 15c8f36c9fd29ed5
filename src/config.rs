// src/config.rs
//! Конфигурация генерации мира
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией:
//! - Частоты шума рельефа и влажности (настраиваются на каждый вызов генерации)
//! - Параметры варпа координат и береговой линии
//! - Пороги нарезки и починки регионов
//! - Настройки тумана войны
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки
//! через конфигурационные файлы.

use serde::{Deserialize, Serialize};
use std::fs;

/// Настройки рельефа и береговой линии
///
/// Управляет формой ландшафта: частотами шумовых полей, силой варпа
/// координат и параметрами вырезаемой морской полосы.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerrainSettings {
    /// Базовая частота шума высот (меньше = крупнее континентальные формы)
    #[serde(default = "default_elev_freq")]
    pub elev_freq: f32,

    /// Базовая частота шума влажности
    #[serde(default = "default_humid_freq")]
    pub humid_freq: f32,

    /// Частота шума варпа координат
    #[serde(default = "default_warp_freq")]
    pub warp_freq: f32,

    /// Амплитуда варпа в клетках (0 = без искажения решётки)
    #[serde(default = "default_warp_amp")]
    pub warp_amp: f32,

    /// Минимальная ширина вырезаемой морской полосы, в клетках
    #[serde(default = "default_sea_width_min")]
    pub sea_width_min: u32,

    /// Максимальная ширина вырезаемой морской полосы, в клетках
    #[serde(default = "default_sea_width_max")]
    pub sea_width_max: u32,

    /// Амплитуда дрожания границы моря (изрезанность берега)
    #[serde(default = "default_sea_jitter_amp")]
    pub sea_jitter_amp: f32,

    /// Частота дрожания границы моря
    #[serde(default = "default_sea_jitter_freq")]
    pub sea_jitter_freq: f32,
}

fn default_elev_freq() -> f32 {
    0.03
}
fn default_humid_freq() -> f32 {
    0.05
}
fn default_warp_freq() -> f32 {
    0.04
}
fn default_warp_amp() -> f32 {
    6.0
}
fn default_sea_width_min() -> u32 {
    15
}
fn default_sea_width_max() -> u32 {
    45
}
fn default_sea_jitter_amp() -> f32 {
    30.0
}
fn default_sea_jitter_freq() -> f32 {
    0.15
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            elev_freq: 0.03,
            humid_freq: 0.05,
            warp_freq: 0.04,
            warp_amp: 6.0,
            sea_width_min: 15,
            sea_width_max: 45,
            sea_jitter_amp: 30.0,
            sea_jitter_freq: 0.15,
        }
    }
}

/// Настройки нарезки карты на регионы и её починки
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionSettings {
    /// Минимальное число сидов регионов (включая стартовый сид игрока)
    #[serde(default = "default_seed_min")]
    pub seed_min: usize,

    /// Максимальное число сидов регионов
    #[serde(default = "default_seed_max")]
    pub seed_max: usize,

    /// Минимальная дистанция Чебышёва между сидами
    #[serde(default = "default_min_seed_spacing")]
    pub min_seed_spacing: i32,

    /// Вес шумового дрожания при вычислении расстояний Вороного
    /// (изрезанность границ регионов)
    #[serde(default = "default_noise_weight")]
    pub noise_weight: f32,

    /// Частота шумового дрожания Вороного
    #[serde(default = "default_voronoi_freq")]
    pub voronoi_freq: f32,

    /// Минимальный размер оторванной компоненты, получающей свой новый
    /// регион; компоненты меньше вливаются в соседей
    #[serde(default = "default_split_threshold")]
    pub split_threshold: usize,

    /// Регионы не больше этого размера вливаются в крупнейшего соседа
    /// (кроме региона игрока)
    #[serde(default = "default_merge_threshold")]
    pub merge_threshold: usize,

    /// Сливать ли мелкие острова через воду в ближайший регион.
    /// Выключено: слияние через воду создаёт ровно тот разорванный
    /// регион, который починка обязана устранять.
    #[serde(default)]
    pub merge_islands: bool,

    /// Минимальный размер стартовой области игрока, в клетках
    #[serde(default = "default_player_region_min")]
    pub player_region_min: usize,

    /// Максимальный размер стартовой области игрока, в клетках
    #[serde(default = "default_player_region_max")]
    pub player_region_max: usize,
}

fn default_seed_min() -> usize {
    113
}
fn default_seed_max() -> usize {
    150
}
fn default_min_seed_spacing() -> i32 {
    3
}
fn default_noise_weight() -> f32 {
    6.0
}
fn default_voronoi_freq() -> f32 {
    0.07
}
fn default_split_threshold() -> usize {
    10
}
fn default_merge_threshold() -> usize {
    30
}
fn default_player_region_min() -> usize {
    20
}
fn default_player_region_max() -> usize {
    30
}

impl Default for RegionSettings {
    fn default() -> Self {
        Self {
            seed_min: 113,
            seed_max: 150,
            min_seed_spacing: 3,
            noise_weight: 6.0,
            voronoi_freq: 0.07,
            split_threshold: 10,
            merge_threshold: 30,
            merge_islands: false,
            player_region_min: 20,
            player_region_max: 30,
        }
    }
}

/// Настройки тумана войны
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FogSettings {
    /// Радиус стартового открытия вокруг каждой клетки моря
    #[serde(default = "default_sea_reveal_radius")]
    pub sea_reveal_radius: i32,
}

fn default_sea_reveal_radius() -> i32 {
    1
}

impl Default for FogSettings {
    fn default() -> Self {
        Self {
            sea_reveal_radius: 1,
        }
    }
}

/// Основные параметры генерации мира
///
/// Полная конфигурация для генерации одного мира. Поддерживает загрузку
/// из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldGenerationParams {
    /// Сид генератора случайных чисел (детерминированная генерация)
    pub seed: u64,

    /// Ширина карты в клетках (по умолчанию 260)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота карты в клетках (по умолчанию 180)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Настройки рельефа (по умолчанию умеренно изрезанный берег)
    #[serde(default)]
    pub terrain: TerrainSettings,

    /// Настройки регионов
    #[serde(default)]
    pub regions: RegionSettings,

    /// Настройки тумана войны
    #[serde(default)]
    pub fog: FogSettings,
}

fn default_width() -> u32 {
    260
}
fn default_height() -> u32 {
    180
}

impl Default for WorldGenerationParams {
    fn default() -> Self {
        Self {
            seed: 0,
            width: 260,
            height: 180,
            terrain: TerrainSettings::default(),
            regions: RegionSettings::default(),
            fog: FogSettings::default(),
        }
    }
}

impl WorldGenerationParams {
    /// Загружает параметры из TOML-файла
    ///
    /// # Аргументы
    /// * `path` - путь к файлу конфигурации в формате TOML
    ///
    /// # Ошибки
    /// Возвращает ошибку, если файл не найден или содержит недопустимый формат.
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// seed = 42
    /// width = 260
    /// height = 180
    ///
    /// [terrain]
    /// elev_freq = 0.03
    /// humid_freq = 0.05
    /// ```
    pub fn from_toml_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let params: Self = toml::from_str(&contents)?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let params: WorldGenerationParams = toml::from_str("seed = 7").unwrap();
        assert_eq!(params.seed, 7);
        assert_eq!(params.width, 260);
        assert_eq!(params.height, 180);
        assert_eq!(params.terrain, TerrainSettings::default());
        assert_eq!(params.regions, RegionSettings::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let params: WorldGenerationParams = toml::from_str(
            "seed = 1\n[terrain]\nelev_freq = 0.05\n[regions]\nseed_max = 20\n",
        )
        .unwrap();
        assert!((params.terrain.elev_freq - 0.05).abs() < f32::EPSILON);
        assert!((params.terrain.humid_freq - 0.05).abs() < f32::EPSILON);
        assert_eq!(params.regions.seed_max, 20);
        assert_eq!(params.regions.seed_min, 113);
    }
}
