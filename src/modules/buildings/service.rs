use anyhow::anyhow;
use tracing::{info, instrument};

use reservo_core::{AppError, rules};
use reservo_db::prelude::*;
use reservo_models::{
    Building, BuildingChanges, BuildingId, BuildingResponse, BuildingsResponse,
    CreateBuildingDto, UpdateBuildingDto,
};

use crate::metrics::track_entity_created;

pub struct BuildingService;

impl BuildingService {
    #[instrument(skip(store, dto), fields(building.name = %dto.name))]
    pub async fn create_building(
        store: &dyn Store,
        dto: CreateBuildingDto,
    ) -> Result<BuildingResponse, AppError> {
        rules::building_name(&dto.name)?;
        rules::building_address(&dto.address)?;

        if store
            .building_by_name_and_address(&dto.name, &dto.address)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(anyhow!(
                "A building with the name '{}' at address '{}' already exists.",
                dto.name,
                dto.address
            )));
        }

        let building = store.insert_building(&dto).await?;
        info!(building.id = %building.id, "Building created");
        track_entity_created("building");

        Self::view(store, building).await
    }

    #[instrument(skip(store, dto))]
    pub async fn update_building(
        store: &dyn Store,
        id: BuildingId,
        dto: UpdateBuildingDto,
    ) -> Result<BuildingResponse, AppError> {
        Self::load(store, id).await?;
        let mut changes = BuildingChanges::default();

        if let Some(name) = dto.new_name.into_required("name")? {
            rules::building_name(&name)?;
            changes.name = Some(name);
        }
        if let Some(address) = dto.new_address.into_required("address")? {
            rules::building_address(&address)?;
            changes.address = Some(address);
        }

        let building = Self::stored(store.update_building(id, &changes).await?, id)?;
        info!(building.id = %building.id, "Building updated");

        Self::view(store, building).await
    }

    #[instrument(skip(store))]
    pub async fn find_building(
        store: &dyn Store,
        id: BuildingId,
    ) -> Result<BuildingResponse, AppError> {
        let building = Self::load(store, id).await?;
        Self::view(store, building).await
    }

    #[instrument(skip(store))]
    pub async fn find_all_buildings(store: &dyn Store) -> Result<BuildingsResponse, AppError> {
        let buildings = store.all_buildings().await?;
        if buildings.is_empty() {
            return Err(AppError::empty_result(anyhow!(
                "No buildings found in the database."
            )));
        }
        Self::views(store, buildings).await
    }

    /// Every building with exactly this name; possibly none.
    #[instrument(skip(store))]
    pub async fn find_buildings_by_name(
        store: &dyn Store,
        name: &str,
    ) -> Result<BuildingsResponse, AppError> {
        let buildings = store.buildings_by_name(name).await?;
        Self::views(store, buildings).await
    }

    async fn load(store: &dyn Store, id: BuildingId) -> Result<Building, AppError> {
        Self::stored(store.building_by_id(id).await?, id)
    }

    fn stored(building: Option<Building>, id: BuildingId) -> Result<Building, AppError> {
        building.ok_or_else(|| AppError::not_found(anyhow!("No building found with ID: {}", id)))
    }

    async fn views(
        store: &dyn Store,
        buildings: Vec<Building>,
    ) -> Result<BuildingsResponse, AppError> {
        let mut views = Vec::with_capacity(buildings.len());
        for building in buildings {
            views.push(Self::view(store, building).await?);
        }
        Ok(BuildingsResponse { buildings: views })
    }

    async fn view(store: &dyn Store, building: Building) -> Result<BuildingResponse, AppError> {
        let classrooms = store.classroom_ids_in_building(building.id).await?;
        Ok(BuildingResponse {
            id: building.id,
            name: building.name,
            address: building.address,
            classrooms,
        })
    }
}
