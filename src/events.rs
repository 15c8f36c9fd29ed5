// src/events.rs
use crate::region::RegionId;
use serde::{Deserialize, Serialize};

/// События, поднимаемые тиком ядра.
///
/// Ядро не владеет никакими колбэками представления: как показать
/// завершение исследования или захвата — решает внешний слой UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Регион полностью открыт из тумана автоисследованием
    RegionCompleted { region_id: RegionId },
    /// Захват региона завершён: все его клетки в территории игрока
    ConquestCompleted { region_id: RegionId },
}
