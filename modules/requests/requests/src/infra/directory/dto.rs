//! Wire shapes of the directory/inventory service.

use requests_sdk::WarehouseLine;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct HouseGroupsDto {
    pub group_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct WorkersDto {
    pub worker_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct HousesDto {
    pub house_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationItemDto {
    pub warehouse_id: Uuid,
    pub item_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
}

impl From<&WarehouseLine> for ReservationItemDto {
    fn from(line: &WarehouseLine) -> Self {
        Self {
            warehouse_id: line.warehouse_id,
            item_id: line.item_id,
            name: line.name.clone(),
            quantity: line.quantity,
        }
    }
}

impl From<ReservationItemDto> for WarehouseLine {
    fn from(dto: ReservationItemDto) -> Self {
        Self {
            warehouse_id: dto.warehouse_id,
            item_id: dto.item_id,
            name: dto.name,
            quantity: dto.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReservationRequestDto {
    pub provider_id: Uuid,
    pub items: Vec<ReservationItemDto>,
}

#[derive(Debug, Deserialize)]
pub struct ReservationDto {
    pub items: Vec<ReservationItemDto>,
}
