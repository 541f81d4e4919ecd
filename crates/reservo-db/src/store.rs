//! The entity store port.
//!
//! Services and the authorization resolver talk to persistence only through
//! these traits. Relationships are foreign-key ids on the records plus
//! on-demand lookups here; no adapter hands out a live object graph.
//!
//! Every list comes back sorted by id ascending. Lookups by id or unique key
//! return `Ok(None)` when nothing matches; `Err` is reserved for adapter
//! failures.
//!
//! Updates take a change set and write only the columns it names, returning
//! the row as stored afterwards (`None` when the id is unknown). A concurrent
//! write to another column survives.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use reservo_models::{
    Building, BuildingChanges, BuildingId, Classroom, ClassroomChanges, ClassroomId,
    CreateBuildingDto, CreateClassroomDto, CreateDepartmentDto, Department, DepartmentChanges,
    DepartmentId, NewRequest, NewUser, Request, RequestChanges, RequestId, User, UserChanges,
    UserId,
};

use crate::error::StoreError;

#[async_trait]
pub trait BuildingStore: Send + Sync {
    async fn insert_building(&self, building: &CreateBuildingDto) -> Result<Building, StoreError>;

    async fn building_by_id(&self, id: BuildingId) -> Result<Option<Building>, StoreError>;

    async fn all_buildings(&self) -> Result<Vec<Building>, StoreError>;

    /// The building matching both fields on the same record.
    async fn building_by_name_and_address(
        &self,
        name: &str,
        address: &str,
    ) -> Result<Option<Building>, StoreError>;

    async fn buildings_by_name(&self, name: &str) -> Result<Vec<Building>, StoreError>;

    async fn update_building(
        &self,
        id: BuildingId,
        changes: &BuildingChanges,
    ) -> Result<Option<Building>, StoreError>;
}

#[async_trait]
pub trait DepartmentStore: Send + Sync {
    async fn insert_department(
        &self,
        department: &CreateDepartmentDto,
    ) -> Result<Department, StoreError>;

    async fn department_by_id(&self, id: DepartmentId) -> Result<Option<Department>, StoreError>;

    async fn all_departments(&self) -> Result<Vec<Department>, StoreError>;

    /// The department matching both names on the same record.
    async fn department_by_names(
        &self,
        full_name: &str,
        code_name: &str,
    ) -> Result<Option<Department>, StoreError>;

    async fn departments_by_code_name(
        &self,
        code_name: &str,
    ) -> Result<Vec<Department>, StoreError>;

    /// The department whose `manager_id` is `user_id`. At most one exists.
    async fn department_managed_by(
        &self,
        user_id: UserId,
    ) -> Result<Option<Department>, StoreError>;

    async fn update_department(
        &self,
        id: DepartmentId,
        changes: &DepartmentChanges,
    ) -> Result<Option<Department>, StoreError>;
}

#[async_trait]
pub trait ClassroomStore: Send + Sync {
    async fn insert_classroom(
        &self,
        classroom: &CreateClassroomDto,
    ) -> Result<Classroom, StoreError>;

    async fn classroom_by_id(&self, id: ClassroomId) -> Result<Option<Classroom>, StoreError>;

    async fn all_classrooms(&self) -> Result<Vec<Classroom>, StoreError>;

    async fn non_private_classrooms(&self) -> Result<Vec<Classroom>, StoreError>;

    async fn update_classroom(
        &self,
        id: ClassroomId,
        changes: &ClassroomChanges,
    ) -> Result<Option<Classroom>, StoreError>;

    async fn classroom_ids_in_building(
        &self,
        building_id: BuildingId,
    ) -> Result<Vec<ClassroomId>, StoreError>;

    async fn classroom_ids_in_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<ClassroomId>, StoreError>;

    async fn classroom_ids_managed_by(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ClassroomId>, StoreError>;

    async fn occupant_ids(&self, classroom_id: ClassroomId) -> Result<Vec<UserId>, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &NewUser) -> Result<User, StoreError>;

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn user_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;

    async fn all_users(&self) -> Result<Vec<User>, StoreError>;

    /// Column changes and the occupied-set replacement commit as one unit.
    async fn update_user(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, StoreError>;

    async fn user_ids_in_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<UserId>, StoreError>;

    async fn occupied_classroom_ids(&self, user_id: UserId)
    -> Result<Vec<ClassroomId>, StoreError>;
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Inserts the request unapproved together with its participants.
    async fn insert_request(
        &self,
        request: &NewRequest,
        requesting_users: &[UserId],
    ) -> Result<Request, StoreError>;

    async fn request_by_id(&self, id: RequestId) -> Result<Option<Request>, StoreError>;

    async fn all_requests(&self) -> Result<Vec<Request>, StoreError>;

    /// Column changes and the participant-set replacement commit as one unit.
    /// Never touches `is_approved` or the dates.
    async fn update_request(
        &self,
        id: RequestId,
        changes: &RequestChanges,
    ) -> Result<Option<Request>, StoreError>;

    /// Sets `is_approved` and nothing else.
    async fn approve_request(&self, id: RequestId) -> Result<Option<Request>, StoreError>;

    async fn requesting_user_ids(&self, request_id: RequestId)
    -> Result<Vec<UserId>, StoreError>;

    async fn requests_by_author(&self, author_id: UserId) -> Result<Vec<Request>, StoreError>;

    async fn requests_by_classroom(
        &self,
        classroom_id: ClassroomId,
    ) -> Result<Vec<Request>, StoreError>;

    /// Requests lying inside `[from, to]`: `start_date >= from AND end_date <= to`.
    async fn requests_in_range(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Request>, StoreError>;

    /// Requests the user participates in.
    async fn request_ids_joined_by(&self, user_id: UserId) -> Result<Vec<RequestId>, StoreError>;
}

/// Everything a service needs. Implemented for any type providing all five
/// entity stores, so handlers hold a single `Arc<dyn Store>`.
pub trait Store: BuildingStore + DepartmentStore + ClassroomStore + UserStore + RequestStore {}

impl<T> Store for T where
    T: BuildingStore + DepartmentStore + ClassroomStore + UserStore + RequestStore
{
}
