// src/region/mod.rs
pub mod partition;
pub mod player;
pub mod png;
pub mod repair;
pub mod summary;
pub mod water;

use std::collections::{HashMap, HashSet};

use crate::biome::Biome;
use crate::fog::FogGrid;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;

pub type RegionId = u32;

/// Сетка принадлежности клеток регионам.
///
/// Внутри хранится `i32`: `-1` означает «не назначено» и допустимо только
/// во время построения. После добавления водных регионов каждая клетка
/// имеет неотрицательный идентификатор.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionGrid {
    pub width: u32,
    pub height: u32,
    data: Vec<i32>,
}

impl RegionGrid {
    #[must_use]
    pub fn unassigned(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![-1; (width * height) as usize],
        }
    }

    /// Сырое значение клетки, `-1` = не назначено. Только в границах карты.
    #[must_use]
    pub fn raw(&self, x: i32, y: i32) -> i32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: i32, y: i32, id: i32) {
        self.data[y as usize * self.width as usize + x as usize] = id;
    }

    /// Идентификатор региона клетки; `None` за границей карты или для
    /// ещё не назначенной клетки.
    #[must_use]
    pub fn id_at(&self, x: i32, y: i32) -> Option<RegionId> {
        if !crate::grid::in_bounds(x, y, self.width, self.height) {
            return None;
        }
        let raw = self.raw(x, y);
        (raw >= 0).then_some(raw as RegionId)
    }

    /// Все клетки региона (полный проход по сетке).
    #[must_use]
    pub fn tiles_of(&self, id: RegionId) -> Vec<(i32, i32)> {
        let mut tiles = Vec::new();
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if self.raw(x, y) == id as i32 {
                    tiles.push((x, y));
                }
            }
        }
        tiles
    }
}

/// Сводка по региону. Строится один раз после нарезки; после этого
/// мутирует только флаг `explored`.
#[derive(Debug, Clone, Serialize)]
pub struct RegionInfo {
    /// Точка, из которой регион вырос; она же визуальный центр
    pub seed: (i32, i32),
    /// Число клеток региона
    pub size: usize,
    /// Гистограмма биомов по клеткам
    pub biomes: HashMap<Biome, u32>,
    /// Процентное распределение биомов
    pub distribution: HashMap<Biome, u8>,
    /// Регионы, имеющие общую границу с этим
    pub neighbors: HashSet<RegionId>,
    /// Полностью ли регион открыт из тумана
    pub explored: bool,
}

impl RegionInfo {
    /// Регион целиком состоит из озёрных клеток.
    #[must_use]
    pub fn is_lake(&self) -> bool {
        self.size > 0 && self.biomes.keys().all(|&b| b == Biome::Lake)
    }

    /// Регион содержит хотя бы одну клетку суши.
    #[must_use]
    pub fn has_land(&self) -> bool {
        self.biomes.keys().any(|b| !b.is_water())
    }
}

/// Собранный результат нарезки: сетка, сиды, сводки и граф смежности.
#[derive(Debug, Clone)]
pub struct RegionMap {
    pub grid: RegionGrid,
    pub seeds: Vec<(i32, i32)>,
    pub infos: Vec<RegionInfo>,
    graph: UnGraph<RegionId, ()>,
    node_of: HashMap<RegionId, NodeIndex>,
}

impl RegionMap {
    /// Собирает карту регионов, строя граф смежности по сводкам.
    #[must_use]
    pub fn assemble(grid: RegionGrid, seeds: Vec<(i32, i32)>, infos: Vec<RegionInfo>) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut node_of = HashMap::new();
        for rid in 0..infos.len() as RegionId {
            let node = graph.add_node(rid);
            node_of.insert(rid, node);
        }
        // Рёбра в отсортированном порядке — детерминированная структура графа
        for (rid, info) in infos.iter().enumerate() {
            let rid = rid as RegionId;
            let mut ns: Vec<RegionId> = info.neighbors.iter().copied().collect();
            ns.sort_unstable();
            for n in ns {
                if rid < n {
                    graph.add_edge(node_of[&rid], node_of[&n], ());
                }
            }
        }
        Self {
            grid,
            seeds,
            infos,
            graph,
            node_of,
        }
    }

    #[must_use]
    pub fn info(&self, id: RegionId) -> Option<&RegionInfo> {
        self.infos.get(id as usize)
    }

    pub fn info_mut(&mut self, id: RegionId) -> Option<&mut RegionInfo> {
        self.infos.get_mut(id as usize)
    }

    /// Имеют ли два региона общую границу.
    #[must_use]
    pub fn is_adjacent(&self, a: RegionId, b: RegionId) -> bool {
        match (self.node_of.get(&a), self.node_of.get(&b)) {
            (Some(&na), Some(&nb)) => self.graph.contains_edge(na, nb),
            _ => false,
        }
    }

    /// Пересчитывает флаги `explored` полным проходом по сетке.
    ///
    /// Туман монотонен, поэтому однажды открытый регион открытым и
    /// останется; полный пересчёт исключает накопление рассинхрона.
    pub fn recompute_explored(&mut self, fog: &FogGrid) {
        let mut revealed = vec![0usize; self.infos.len()];
        for y in 0..self.grid.height as i32 {
            for x in 0..self.grid.width as i32 {
                if let Some(rid) = self.grid.id_at(x, y) {
                    if (rid as usize) < revealed.len() && fog.is_revealed(x, y) {
                        revealed[rid as usize] += 1;
                    }
                }
            }
        }
        for (info, &count) in self.infos.iter_mut().zip(&revealed) {
            info.explored = info.size > 0 && count == info.size;
        }
    }
}
