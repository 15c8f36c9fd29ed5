// src/grid.rs
//! Общие примитивы для работы с тайловой сеткой.
//!
//! Поиск связных компонент используется одинаково в четырёх местах:
//! переклассификация внутренних морей, починка разорванных регионов,
//! нарезка водных регионов и кластеризация тумана при исследовании.

use std::collections::VecDeque;

/// Ортогональные соседи
pub const DIRECTIONS_4: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Ортогональные и диагональные соседи
pub const DIRECTIONS_8: [(i32, i32); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

#[must_use]
pub fn in_bounds(x: i32, y: i32, width: u32, height: u32) -> bool {
    x >= 0 && y >= 0 && x < width as i32 && y < height as i32
}

/// Разметка связных компонент по 4-соседству.
///
/// `key` возвращает метку клетки или `None`, если клетка не участвует.
/// Компонента — максимальное связное множество клеток с равными метками.
/// Компоненты возвращаются в порядке сканирования (слева направо,
/// сверху вниз по первой клетке), внутри компоненты — в порядке обхода
/// BFS; это фиксирует порядок для детерминированной нумерации регионов.
pub fn connected_components<K, F>(width: u32, height: u32, key: F) -> Vec<(K, Vec<(i32, i32)>)>
where
    K: PartialEq + Copy,
    F: Fn(i32, i32) -> Option<K>,
{
    let w = width as usize;
    let mut visited = vec![false; w * height as usize];
    let mut components = Vec::new();

    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let idx = y as usize * w + x as usize;
            if visited[idx] {
                continue;
            }
            let Some(k) = key(x, y) else { continue };

            let mut comp = Vec::new();
            let mut queue = VecDeque::new();
            visited[idx] = true;
            queue.push_back((x, y));

            while let Some((cx, cy)) = queue.pop_front() {
                comp.push((cx, cy));
                for &(dx, dy) in &DIRECTIONS_4 {
                    let nx = cx + dx;
                    let ny = cy + dy;
                    if !in_bounds(nx, ny, width, height) {
                        continue;
                    }
                    let nidx = ny as usize * w + nx as usize;
                    if !visited[nidx] && key(nx, ny) == Some(k) {
                        visited[nidx] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }
            components.push((k, comp));
        }
    }
    components
}

/// Целочисленный центроид набора клеток (среднее по осям).
///
/// Для невыпуклых фигур может лежать вне набора — см. [`nearest_tile_to`].
#[must_use]
pub fn centroid(tiles: &[(i32, i32)]) -> (i32, i32) {
    let n = tiles.len().max(1) as i64;
    let sx: i64 = tiles.iter().map(|p| i64::from(p.0)).sum();
    let sy: i64 = tiles.iter().map(|p| i64::from(p.1)).sum();
    ((sx / n) as i32, (sy / n) as i32)
}

/// Клетка набора, ближайшая к точке (по квадрату расстояния,
/// при равенстве — меньшая по (y, x) для воспроизводимости).
#[must_use]
pub fn nearest_tile_to(tiles: &[(i32, i32)], point: (i32, i32)) -> Option<(i32, i32)> {
    tiles
        .iter()
        .copied()
        .min_by_key(|&(x, y)| {
            let dx = i64::from(x - point.0);
            let dy = i64::from(y - point.1);
            (dx * dx + dy * dy, i64::from(y), i64::from(x))
        })
}
