// src/world.rs
//! Сборка мира и тиковый цикл сессии.
//!
//! Однопоточная модель: одна генерация, затем N тиков. Юниты
//! обновляются в фиксированном порядке списка, и туман, открытый
//! ранним юнитом, виден позднему юниту в том же тике — два юнита не
//! возьмут одну и ту же ещё не открытую клетку целью одновременно.

use crate::biome::BiomeGrid;
use crate::config::WorldGenerationParams;
use crate::conquest::{self, ConquestState};
use crate::events::GameEvent;
use crate::explore;
use crate::fog::{self, FogGrid};
use crate::noise::NoiseContext;
use crate::region::{self, RegionId, RegionMap};
use crate::terrain::{self, CoastEdge};
use crate::unit::{Unit, UnitKind};
use rand::{Rng, SeedableRng};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};

/// Игровых единиц времени в одном дне
pub const DAY_LENGTH: f32 = 1000.0;

/// Полное состояние сессии: неизменные после генерации карты биомов и
/// регионов, монотонный туман и юниты.
#[derive(Debug, Clone)]
pub struct World {
    pub params: WorldGenerationParams,
    pub biome: BiomeGrid,
    pub coast_edge: CoastEdge,
    pub regions: RegionMap,
    pub player_region_id: RegionId,
    pub player_mask: HashSet<(i32, i32)>,
    pub player_center: (i32, i32),
    pub fog: FogGrid,
    pub units: Vec<Unit>,
    pub game_time: f32,
    pub day: u64,
    conquests: HashMap<RegionId, ConquestState>,
}

impl World {
    /// Генерирует мир целиком: биомы → стартовая область игрока →
    /// нарезка и починка регионов → водные регионы → сводки → туман →
    /// стартовые юниты.
    #[must_use]
    pub fn generate(params: &WorldGenerationParams) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let ctx = NoiseContext::from_master_seed(rng.r#gen());

        // === 1. Биомы и берег ===
        let (biome, coast_edge) = terrain::generate_biome_map(params, &ctx, &mut rng);

        // === 2. Стартовая область игрока ===
        let start = region::player::choose_player_start(&biome, &mut rng);
        let player_mask = region::player::build_player_region_mask(
            &biome,
            start,
            params.regions.player_region_min,
            params.regions.player_region_max,
            &mut rng,
        );
        let player_center = region::player::player_region_center(&player_mask, start);

        // === 3. Нарезка суши и починка ===
        let mut seeds =
            region::partition::pick_region_seeds(&biome, start, &params.regions, &mut rng);
        let mut grid = region::partition::assign_regions(&biome, &seeds, &params.regions, &ctx);
        region::repair::split_disjoint_regions(
            &mut grid,
            &biome,
            &mut seeds,
            params.regions.split_threshold,
        );
        region::repair::merge_small_regions(&mut grid, &biome, seeds.len(), &params.regions);

        // === 4. Регион 0 — это в точности маска игрока ===
        region::player::enforce_player_region(&mut grid, &player_mask, &mut seeds);
        // Вырезание маски могло разорвать затронутые регионы — чиним ещё раз
        region::repair::split_disjoint_regions(
            &mut grid,
            &biome,
            &mut seeds,
            params.regions.split_threshold,
        );
        region::repair::merge_small_regions(&mut grid, &biome, seeds.len(), &params.regions);

        // === 5. Водные регионы и сводки ===
        region::water::add_water_regions(&biome, &mut grid, &mut seeds);
        let infos = region::summary::summarize_regions(&biome, &grid, &seeds);
        let mut regions = RegionMap::assemble(grid, seeds, infos);

        // === 6. Туман и стартовые юниты ===
        let mut fog_grid = FogGrid::new(params.width, params.height);
        fog::initial_reveal(
            &mut fog_grid,
            &biome,
            &player_mask,
            player_center,
            params.fog.sea_reveal_radius,
        );

        let mut mask_tiles: Vec<(i32, i32)> = player_mask.iter().copied().collect();
        mask_tiles.sort_unstable();
        mask_tiles.shuffle(&mut rng);
        let kinds = [
            UnitKind::Explorer,
            UnitKind::Colonist,
            UnitKind::Diplomat,
            UnitKind::Conquistador,
        ];
        let mut units = Vec::with_capacity(kinds.len());
        for (i, &kind) in kinds.iter().enumerate() {
            let (x, y) = mask_tiles.get(i).copied().unwrap_or(player_center);
            units.push(Unit::new(kind, x as f32, y as f32));
        }
        for unit in &units {
            let (ux, uy) = unit.grid_pos();
            fog_grid.reveal_circle(ux, uy, unit.vision_range);
        }

        fog::auto_reveal_lakes(&mut fog_grid, &biome, &regions);
        regions.recompute_explored(&fog_grid);

        Self {
            params: params.clone(),
            biome,
            coast_edge,
            regions,
            player_region_id: 0,
            player_mask,
            player_center,
            fog: fog_grid,
            units,
            game_time: 0.0,
            day: 0,
            conquests: HashMap::new(),
        }
    }

    /// Приказ юниту автоматически исследовать регион.
    pub fn order_auto_explore(&mut self, unit_idx: usize, region_id: RegionId) {
        if let Some(unit) = self.units.get_mut(unit_idx) {
            unit.target_region_id = Some(region_id);
        }
    }

    /// Приказ конкистадору на захват региона: юнит идёт к сиду региона.
    pub fn order_conquest(&mut self, unit_idx: usize, region_id: RegionId) {
        let Some(&(sx, sy)) = self.regions.seeds.get(region_id as usize) else {
            return;
        };
        if let Some(unit) = self.units.get_mut(unit_idx) {
            if unit.kind == UnitKind::Conquistador {
                unit.conquering_region_id = Some(region_id);
                unit.set_target(sx as f32, sy as f32);
                self.conquests.entry(region_id).or_default();
            }
        }
    }

    /// Центр региона — позиция его сида.
    #[must_use]
    pub fn region_center(&self, region_id: RegionId) -> Option<(i32, i32)> {
        self.regions.seeds.get(region_id as usize).copied()
    }

    /// Один тик сессии. Возвращает события для внешнего слоя UI;
    /// ядро не решает, что делать с юнитом после завершения приказа.
    pub fn tick(&mut self, tick_scale: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();

        self.game_time += tick_scale;
        let day_rolled = self.game_time >= DAY_LENGTH;
        if day_rolled {
            self.game_time -= DAY_LENGTH;
            self.day += 1;
        }

        for i in 0..self.units.len() {
            // Автоисследование: без активной цели выбираем следующую
            if let Some(rid) = self.units[i].target_region_id {
                if self.units[i].target.is_none() {
                    let fog_tiles =
                        explore::collect_fog_tiles(&self.regions.grid, &self.fog, rid);
                    if fog_tiles.is_empty() {
                        self.units[i].target_region_id = None;
                        if let Some(info) = self.regions.info_mut(rid) {
                            info.explored = true;
                        }
                        events.push(GameEvent::RegionCompleted { region_id: rid });
                    } else {
                        let clusters = explore::cluster_fog_tiles(
                            self.params.width,
                            self.params.height,
                            &fog_tiles,
                        );
                        let pos = self.units[i].grid_pos();
                        if let Some((tx, ty)) = explore::choose_exploration_target(
                            &clusters,
                            pos,
                            self.player_center,
                        ) {
                            self.units[i].set_target(tx as f32, ty as f32);
                        }
                    }
                }
            }

            self.units[i].update_movement(tick_scale);

            // Открытый здесь туман виден следующим юнитам этого же тика
            let (ux, uy) = self.units[i].grid_pos();
            let r = self.units[i].vision_range;
            self.fog.reveal_circle(ux, uy, r);

            // Захват продвигается раз в день
            if day_rolled && self.units[i].kind == UnitKind::Conquistador {
                if let Some(rid) = self.units[i].conquering_region_id {
                    let seed = self.regions.seeds.get(rid as usize).copied();
                    if let Some(state) = self.conquests.get_mut(&rid) {
                        if let Some(ev) = conquest::update_conquest(
                            &mut self.units[i],
                            state,
                            rid,
                            seed,
                            &self.regions.grid,
                            &mut self.player_mask,
                        ) {
                            events.push(ev);
                        }
                    }
                }
            }
        }

        fog::auto_reveal_lakes(&mut self.fog, &self.biome, &self.regions);
        self.regions.recompute_explored(&self.fog);

        events
    }
}
