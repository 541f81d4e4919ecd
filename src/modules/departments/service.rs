use anyhow::anyhow;
use tracing::{debug, info, instrument};

use reservo_core::{AppError, rules};
use reservo_db::prelude::*;
use reservo_models::{
    CreateDepartmentDto, Department, DepartmentChanges, DepartmentId, DepartmentResponse,
    DepartmentsResponse, UpdateDepartmentDto,
};

use crate::metrics::track_entity_created;

pub struct DepartmentService;

impl DepartmentService {
    #[instrument(skip(store, dto), fields(department.code_name = %dto.code_name))]
    pub async fn create_department(
        store: &dyn Store,
        dto: CreateDepartmentDto,
    ) -> Result<DepartmentResponse, AppError> {
        rules::department_full_name(&dto.full_name)?;
        rules::department_code_name(&dto.code_name)?;

        if store
            .department_by_names(&dto.full_name, &dto.code_name)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(anyhow!(
                "A department with the full name '{}' and code name '{}' already exists.",
                dto.full_name,
                dto.code_name
            )));
        }

        let department = store.insert_department(&dto).await?;
        info!(department.id = %department.id, "Department created");
        track_entity_created("department");

        Self::view(store, department).await
    }

    /// `new_manager_id` must name an existing user who manages no other
    /// department; `null` leaves the department without a manager.
    #[instrument(skip(store, dto))]
    pub async fn update_department(
        store: &dyn Store,
        id: DepartmentId,
        dto: UpdateDepartmentDto,
    ) -> Result<DepartmentResponse, AppError> {
        Self::load(store, id).await?;
        let mut changes = DepartmentChanges::default();

        if let Some(full_name) = dto.new_full_name.into_required("full name")? {
            rules::department_full_name(&full_name)?;
            changes.full_name = Some(full_name);
        }
        if let Some(code_name) = dto.new_code_name.into_required("code name")? {
            rules::department_code_name(&code_name)?;
            changes.code_name = Some(code_name);
        }
        if let Some(manager_id) = dto.new_manager_id.into_change() {
            if let Some(manager_id) = manager_id {
                if store.user_by_id(manager_id).await?.is_none() {
                    return Err(AppError::not_found(anyhow!(
                        "No manager found with ID: {}",
                        manager_id
                    )));
                }
                if let Some(other) = store.department_managed_by(manager_id).await?
                    && other.id != id
                {
                    return Err(AppError::conflict(anyhow!(
                        "The user already manages another department."
                    )));
                }
            }
            debug!(department.id = %id, manager = ?manager_id, "Department manager changed");
            changes.manager_id = Some(manager_id);
        }

        let department = Self::stored(store.update_department(id, &changes).await?, id)?;
        info!(department.id = %department.id, "Department updated");

        Self::view(store, department).await
    }

    #[instrument(skip(store))]
    pub async fn find_department(
        store: &dyn Store,
        id: DepartmentId,
    ) -> Result<DepartmentResponse, AppError> {
        let department = Self::load(store, id).await?;
        Self::view(store, department).await
    }

    #[instrument(skip(store))]
    pub async fn find_all_departments(store: &dyn Store) -> Result<DepartmentsResponse, AppError> {
        let departments = store.all_departments().await?;
        if departments.is_empty() {
            return Err(AppError::empty_result(anyhow!(
                "No departments found in the database."
            )));
        }
        Self::views(store, departments).await
    }

    #[instrument(skip(store))]
    pub async fn find_departments_by_code_name(
        store: &dyn Store,
        code_name: &str,
    ) -> Result<DepartmentsResponse, AppError> {
        let departments = store.departments_by_code_name(code_name).await?;
        Self::views(store, departments).await
    }

    async fn load(store: &dyn Store, id: DepartmentId) -> Result<Department, AppError> {
        Self::stored(store.department_by_id(id).await?, id)
    }

    fn stored(department: Option<Department>, id: DepartmentId) -> Result<Department, AppError> {
        department
            .ok_or_else(|| AppError::not_found(anyhow!("No department found with ID: {}", id)))
    }

    async fn views(
        store: &dyn Store,
        departments: Vec<Department>,
    ) -> Result<DepartmentsResponse, AppError> {
        let mut views = Vec::with_capacity(departments.len());
        for department in departments {
            views.push(Self::view(store, department).await?);
        }
        Ok(DepartmentsResponse { departments: views })
    }

    async fn view(
        store: &dyn Store,
        department: Department,
    ) -> Result<DepartmentResponse, AppError> {
        let users = store.user_ids_in_department(department.id).await?;
        let classrooms = store.classroom_ids_in_department(department.id).await?;
        Ok(DepartmentResponse {
            id: department.id,
            full_name: department.full_name,
            code_name: department.code_name,
            manager: department.manager_id,
            users,
            classrooms,
        })
    }
}
