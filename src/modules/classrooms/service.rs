use anyhow::anyhow;
use tracing::{info, instrument};

use reservo_core::{AppError, rules};
use reservo_db::prelude::*;
use reservo_models::{
    Classroom, ClassroomChanges, ClassroomId, ClassroomResponse, ClassroomsResponse,
    CreateClassroomDto, UpdateClassroomDto,
};

use crate::metrics::track_entity_created;

pub struct ClassroomService;

impl ClassroomService {
    #[instrument(skip(store, dto), fields(classroom.name = %dto.name))]
    pub async fn create_classroom(
        store: &dyn Store,
        dto: CreateClassroomDto,
    ) -> Result<ClassroomResponse, AppError> {
        rules::classroom_name(&dto.name)?;

        let classroom = store.insert_classroom(&dto).await?;
        info!(classroom.id = %classroom.id, "Classroom created");
        track_entity_created("classroom");

        Self::view(store, classroom).await
    }

    /// Relations are resolved before anything is written; `null` detaches.
    #[instrument(skip(store, dto))]
    pub async fn update_classroom(
        store: &dyn Store,
        id: ClassroomId,
        dto: UpdateClassroomDto,
    ) -> Result<ClassroomResponse, AppError> {
        Self::load(store, id).await?;
        let mut changes = ClassroomChanges::default();

        if let Some(name) = dto.new_name.into_required("name")? {
            rules::classroom_name(&name)?;
            changes.name = Some(name);
        }
        if let Some(building_id) = dto.new_building_id.into_change() {
            if let Some(building_id) = building_id
                && store.building_by_id(building_id).await?.is_none()
            {
                return Err(AppError::not_found(anyhow!(
                    "No building found with ID: {}",
                    building_id
                )));
            }
            changes.building_id = Some(building_id);
        }
        if let Some(department_id) = dto.new_department_id.into_change() {
            if let Some(department_id) = department_id
                && store.department_by_id(department_id).await?.is_none()
            {
                return Err(AppError::not_found(anyhow!(
                    "No department found with ID: {}",
                    department_id
                )));
            }
            changes.department_id = Some(department_id);
        }
        if let Some(manager_id) = dto.new_manager_id.into_change() {
            if let Some(manager_id) = manager_id
                && store.user_by_id(manager_id).await?.is_none()
            {
                return Err(AppError::not_found(anyhow!(
                    "No manager found with ID: {}",
                    manager_id
                )));
            }
            changes.manager_id = Some(manager_id);
        }
        if let Some(is_private) = dto.new_is_private.into_required("privacy flag")? {
            changes.is_private = Some(is_private);
        }

        let classroom = Self::stored(store.update_classroom(id, &changes).await?, id)?;
        info!(classroom.id = %classroom.id, "Classroom updated");

        Self::view(store, classroom).await
    }

    #[instrument(skip(store))]
    pub async fn find_classroom(
        store: &dyn Store,
        id: ClassroomId,
    ) -> Result<ClassroomResponse, AppError> {
        let classroom = Self::load(store, id).await?;
        Self::view(store, classroom).await
    }

    #[instrument(skip(store))]
    pub async fn find_all_classrooms(store: &dyn Store) -> Result<ClassroomsResponse, AppError> {
        let classrooms = store.all_classrooms().await?;
        if classrooms.is_empty() {
            return Err(AppError::empty_result(anyhow!(
                "No classrooms found in the database."
            )));
        }
        Self::views(store, classrooms).await
    }

    #[instrument(skip(store))]
    pub async fn find_all_non_private_classrooms(
        store: &dyn Store,
    ) -> Result<ClassroomsResponse, AppError> {
        let classrooms = store.non_private_classrooms().await?;
        if classrooms.is_empty() {
            return Err(AppError::empty_result(anyhow!(
                "No non-private classrooms found in the database."
            )));
        }
        Self::views(store, classrooms).await
    }

    async fn load(store: &dyn Store, id: ClassroomId) -> Result<Classroom, AppError> {
        Self::stored(store.classroom_by_id(id).await?, id)
    }

    fn stored(classroom: Option<Classroom>, id: ClassroomId) -> Result<Classroom, AppError> {
        classroom.ok_or_else(|| AppError::not_found(anyhow!("No classroom found with ID: {}", id)))
    }

    async fn views(
        store: &dyn Store,
        classrooms: Vec<Classroom>,
    ) -> Result<ClassroomsResponse, AppError> {
        let mut views = Vec::with_capacity(classrooms.len());
        for classroom in classrooms {
            views.push(Self::view(store, classroom).await?);
        }
        Ok(ClassroomsResponse { classrooms: views })
    }

    async fn view(store: &dyn Store, classroom: Classroom) -> Result<ClassroomResponse, AppError> {
        let occupants = store.occupant_ids(classroom.id).await?;
        let requests = store
            .requests_by_classroom(classroom.id)
            .await?
            .into_iter()
            .map(|request| request.id)
            .collect();
        Ok(ClassroomResponse {
            id: classroom.id,
            name: classroom.name,
            floor: classroom.floor,
            is_private: classroom.is_private,
            building: classroom.building_id,
            department: classroom.department_id,
            manager: classroom.manager_id,
            occupants,
            requests,
        })
    }
}
