// src/unit.rs
use crate::region::RegionId;
use serde::{Deserialize, Serialize};

/// Дистанция, с которой цель считается достигнутой
const ARRIVE_EPSILON: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    Explorer,
    Colonist,
    Diplomat,
    Conquistador,
}

impl UnitKind {
    /// Скорость в клетках за единицу игрового времени
    #[must_use]
    pub fn move_speed(self) -> f32 {
        match self {
            UnitKind::Explorer | UnitKind::Conquistador => 0.01,
            UnitKind::Colonist => 0.008,
            UnitKind::Diplomat => 0.012,
        }
    }

    #[must_use]
    pub fn vision_range(self) -> i32 {
        match self {
            UnitKind::Explorer | UnitKind::Conquistador => 2,
            UnitKind::Colonist | UnitKind::Diplomat => 1,
        }
    }
}

/// Юнит: непрерывная позиция, зрение и текущие приказы.
///
/// Живёт от генерации мира до конца сессии; позицию и цели меняет
/// только сам владелец-сессия.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub x: f32,
    pub y: f32,
    pub kind: UnitKind,
    pub move_speed: f32,
    pub vision_range: i32,
    /// Активная цель движения
    pub target: Option<(f32, f32)>,
    /// Приказ автоисследования региона
    pub target_region_id: Option<RegionId>,
    /// Приказ захвата региона (только конкистадор)
    pub conquering_region_id: Option<RegionId>,
}

impl Unit {
    #[must_use]
    pub fn new(kind: UnitKind, x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            kind,
            move_speed: kind.move_speed(),
            vision_range: kind.vision_range(),
            target: None,
            target_region_id: None,
            conquering_region_id: None,
        }
    }

    pub fn set_target(&mut self, tx: f32, ty: f32) {
        self.target = Some((tx, ty));
    }

    /// Клетка, в которой юнит стоит (позиция округляется вниз).
    #[must_use]
    pub fn grid_pos(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }

    /// Прямолинейное движение к цели без учёта рельефа.
    ///
    /// Вблизи цели юнит прищёлкивается к ней и цель сбрасывается.
    pub fn update_movement(&mut self, tick_scale: f32) {
        let Some((tx, ty)) = self.target else { return };
        let dx = tx - self.x;
        let dy = ty - self.y;
        let dist = (dx * dx + dy * dy).sqrt();

        if dist < ARRIVE_EPSILON {
            self.x = tx;
            self.y = ty;
            self.target = None;
            return;
        }
        let move_dist = (self.move_speed * tick_scale).min(dist);
        self.x += dx / dist * move_dist;
        self.y += dy / dist * move_dist;
    }

    /// Клетки в евклидовом радиусе зрения вокруг текущей клетки.
    #[must_use]
    pub fn vision_tiles(&self, width: u32, height: u32) -> Vec<(i32, i32)> {
        let (cx, cy) = self.grid_pos();
        let r = self.vision_range;
        let mut tiles = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r
                    && crate::grid::in_bounds(cx + dx, cy + dy, width, height)
                {
                    tiles.push((cx + dx, cy + dy));
                }
            }
        }
        tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_straight_towards_target() {
        let mut unit = Unit::new(UnitKind::Explorer, 0.0, 0.0);
        unit.set_target(3.0, 4.0);
        unit.update_movement(100.0); // 1 клетка пути
        assert!((unit.x - 0.6).abs() < 1e-4);
        assert!((unit.y - 0.8).abs() < 1e-4);
        assert!(unit.target.is_some());
    }

    #[test]
    fn snaps_to_target_when_close() {
        let mut unit = Unit::new(UnitKind::Explorer, 5.0, 5.0);
        unit.set_target(5.05, 5.0);
        unit.update_movement(1.0);
        assert_eq!((unit.x, unit.y), (5.05, 5.0));
        assert!(unit.target.is_none());
    }

    #[test]
    fn does_not_overshoot() {
        let mut unit = Unit::new(UnitKind::Explorer, 0.0, 0.0);
        unit.set_target(1.0, 0.0);
        // Огромный тик: шаг обрезается по оставшейся дистанции
        unit.update_movement(1_000_000.0);
        assert!((unit.x - 1.0).abs() < 1e-4);
        assert!((unit.y - 0.0).abs() < 1e-4);
    }

    #[test]
    fn vision_is_circular_and_clipped() {
        let unit = Unit::new(UnitKind::Explorer, 1.0, 1.0);
        let tiles = unit.vision_tiles(64, 64);
        assert!(tiles.contains(&(1, 1)));
        assert!(tiles.contains(&(3, 1)));
        // Угол квадрата вне круга радиуса 2
        assert!(!tiles.contains(&(3, 3)));
        // Клетки за границей карты отсечены
        assert!(tiles.iter().all(|&(x, y)| x >= 0 && y >= 0));
    }

    #[test]
    fn idle_unit_stays_put() {
        let mut unit = Unit::new(UnitKind::Colonist, 2.5, 2.5);
        unit.update_movement(50.0);
        assert_eq!((unit.x, unit.y), (2.5, 2.5));
    }
}
