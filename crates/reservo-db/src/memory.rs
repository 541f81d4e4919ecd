//! In-process adapter for the store port.
//!
//! Backs the test suite and local runs without a database. It enforces the
//! same unique keys as the SQL schema so both adapters report the same
//! conflicts; foreign keys are left to the services, as they are checked
//! there before every write anyway.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;

use reservo_models::{
    Building, BuildingChanges, BuildingId, Classroom, ClassroomChanges, ClassroomId,
    CreateBuildingDto, CreateClassroomDto, CreateDepartmentDto, Department, DepartmentChanges,
    DepartmentId, NewRequest, NewUser, Request, RequestChanges, RequestId, User, UserChanges,
    UserId,
};

use crate::error::{
    BUILDING_CONFLICT, DEPARTMENT_CONFLICT, LOGIN_CONFLICT, MANAGER_CONFLICT, StoreError,
};
use crate::store::{BuildingStore, ClassroomStore, DepartmentStore, RequestStore, UserStore};

#[derive(Debug, Default)]
struct Tables {
    buildings: BTreeMap<BuildingId, Building>,
    departments: BTreeMap<DepartmentId, Department>,
    classrooms: BTreeMap<ClassroomId, Classroom>,
    users: BTreeMap<UserId, User>,
    requests: BTreeMap<RequestId, Request>,
    /// (user, classroom)
    occupancy: BTreeSet<(UserId, ClassroomId)>,
    /// (request, user)
    participants: BTreeSet<(RequestId, UserId)>,
    last_id: i32,
}

impl Tables {
    /// Ids are unique across tables, which keeps tests honest about passing
    /// the right kind of id.
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn building_conflict(&self, building: &Building) -> bool {
        self.buildings.values().any(|other| {
            other.id != building.id
                && other.name == building.name
                && other.address == building.address
        })
    }

    fn department_conflict(&self, department: &Department) -> Option<&'static str> {
        for other in self.departments.values() {
            if other.id == department.id {
                continue;
            }
            if other.full_name == department.full_name && other.code_name == department.code_name
            {
                return Some(DEPARTMENT_CONFLICT);
            }
            if department.manager_id.is_some() && other.manager_id == department.manager_id {
                return Some(MANAGER_CONFLICT);
            }
        }
        None
    }

    fn login_taken(&self, login: &str) -> bool {
        self.users.values().any(|other| other.login == login)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BuildingStore for MemoryStore {
    async fn insert_building(&self, building: &CreateBuildingDto) -> Result<Building, StoreError> {
        let mut tables = self.tables.write().await;
        let mut created = Building {
            id: BuildingId::new(0),
            name: building.name.clone(),
            address: building.address.clone(),
        };
        if tables.building_conflict(&created) {
            return Err(StoreError::Conflict(BUILDING_CONFLICT.to_string()));
        }
        created.id = BuildingId::new(tables.next_id());
        tables.buildings.insert(created.id, created.clone());
        Ok(created)
    }

    async fn building_by_id(&self, id: BuildingId) -> Result<Option<Building>, StoreError> {
        Ok(self.tables.read().await.buildings.get(&id).cloned())
    }

    async fn all_buildings(&self) -> Result<Vec<Building>, StoreError> {
        Ok(self.tables.read().await.buildings.values().cloned().collect())
    }

    async fn building_by_name_and_address(
        &self,
        name: &str,
        address: &str,
    ) -> Result<Option<Building>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .buildings
            .values()
            .find(|b| b.name == name && b.address == address)
            .cloned())
    }

    async fn buildings_by_name(&self, name: &str) -> Result<Vec<Building>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .buildings
            .values()
            .filter(|b| b.name == name)
            .cloned()
            .collect())
    }

    async fn update_building(
        &self,
        id: BuildingId,
        changes: &BuildingChanges,
    ) -> Result<Option<Building>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(mut building) = tables.buildings.get(&id).cloned() else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            building.name = name.clone();
        }
        if let Some(address) = &changes.address {
            building.address = address.clone();
        }
        if tables.building_conflict(&building) {
            return Err(StoreError::Conflict(BUILDING_CONFLICT.to_string()));
        }
        tables.buildings.insert(id, building.clone());
        Ok(Some(building))
    }
}

#[async_trait]
impl DepartmentStore for MemoryStore {
    async fn insert_department(
        &self,
        department: &CreateDepartmentDto,
    ) -> Result<Department, StoreError> {
        let mut tables = self.tables.write().await;
        let mut created = Department {
            id: DepartmentId::new(0),
            full_name: department.full_name.clone(),
            code_name: department.code_name.clone(),
            manager_id: None,
        };
        if let Some(message) = tables.department_conflict(&created) {
            return Err(StoreError::Conflict(message.to_string()));
        }
        created.id = DepartmentId::new(tables.next_id());
        tables.departments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn department_by_id(&self, id: DepartmentId) -> Result<Option<Department>, StoreError> {
        Ok(self.tables.read().await.departments.get(&id).cloned())
    }

    async fn all_departments(&self) -> Result<Vec<Department>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .departments
            .values()
            .cloned()
            .collect())
    }

    async fn department_by_names(
        &self,
        full_name: &str,
        code_name: &str,
    ) -> Result<Option<Department>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .departments
            .values()
            .find(|d| d.full_name == full_name && d.code_name == code_name)
            .cloned())
    }

    async fn departments_by_code_name(
        &self,
        code_name: &str,
    ) -> Result<Vec<Department>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .departments
            .values()
            .filter(|d| d.code_name == code_name)
            .cloned()
            .collect())
    }

    async fn department_managed_by(
        &self,
        user_id: UserId,
    ) -> Result<Option<Department>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .departments
            .values()
            .find(|d| d.manager_id == Some(user_id))
            .cloned())
    }

    async fn update_department(
        &self,
        id: DepartmentId,
        changes: &DepartmentChanges,
    ) -> Result<Option<Department>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(mut department) = tables.departments.get(&id).cloned() else {
            return Ok(None);
        };
        if let Some(full_name) = &changes.full_name {
            department.full_name = full_name.clone();
        }
        if let Some(code_name) = &changes.code_name {
            department.code_name = code_name.clone();
        }
        if let Some(manager_id) = changes.manager_id {
            department.manager_id = manager_id;
        }
        if let Some(message) = tables.department_conflict(&department) {
            return Err(StoreError::Conflict(message.to_string()));
        }
        tables.departments.insert(id, department.clone());
        Ok(Some(department))
    }
}

#[async_trait]
impl ClassroomStore for MemoryStore {
    async fn insert_classroom(
        &self,
        classroom: &CreateClassroomDto,
    ) -> Result<Classroom, StoreError> {
        let mut tables = self.tables.write().await;
        let created = Classroom {
            id: ClassroomId::new(tables.next_id()),
            name: classroom.name.clone(),
            floor: classroom.floor,
            is_private: classroom.is_private,
            building_id: None,
            department_id: None,
            manager_id: None,
        };
        tables.classrooms.insert(created.id, created.clone());
        Ok(created)
    }

    async fn classroom_by_id(&self, id: ClassroomId) -> Result<Option<Classroom>, StoreError> {
        Ok(self.tables.read().await.classrooms.get(&id).cloned())
    }

    async fn all_classrooms(&self) -> Result<Vec<Classroom>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .classrooms
            .values()
            .cloned()
            .collect())
    }

    async fn non_private_classrooms(&self) -> Result<Vec<Classroom>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .classrooms
            .values()
            .filter(|c| !c.is_private)
            .cloned()
            .collect())
    }

    async fn update_classroom(
        &self,
        id: ClassroomId,
        changes: &ClassroomChanges,
    ) -> Result<Option<Classroom>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(classroom) = tables.classrooms.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            classroom.name = name.clone();
        }
        if let Some(is_private) = changes.is_private {
            classroom.is_private = is_private;
        }
        if let Some(building_id) = changes.building_id {
            classroom.building_id = building_id;
        }
        if let Some(department_id) = changes.department_id {
            classroom.department_id = department_id;
        }
        if let Some(manager_id) = changes.manager_id {
            classroom.manager_id = manager_id;
        }
        Ok(Some(classroom.clone()))
    }

    async fn classroom_ids_in_building(
        &self,
        building_id: BuildingId,
    ) -> Result<Vec<ClassroomId>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .classrooms
            .values()
            .filter(|c| c.building_id == Some(building_id))
            .map(|c| c.id)
            .collect())
    }

    async fn classroom_ids_in_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<ClassroomId>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .classrooms
            .values()
            .filter(|c| c.department_id == Some(department_id))
            .map(|c| c.id)
            .collect())
    }

    async fn classroom_ids_managed_by(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ClassroomId>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .classrooms
            .values()
            .filter(|c| c.manager_id == Some(user_id))
            .map(|c| c.id)
            .collect())
    }

    async fn occupant_ids(&self, classroom_id: ClassroomId) -> Result<Vec<UserId>, StoreError> {
        let tables = self.tables.read().await;
        let mut ids: Vec<UserId> = tables
            .occupancy
            .iter()
            .filter(|(_, classroom)| *classroom == classroom_id)
            .map(|(user, _)| *user)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.login_taken(&user.login) {
            return Err(StoreError::Conflict(LOGIN_CONFLICT.to_string()));
        }
        let created = User {
            id: UserId::new(tables.next_id()),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            login: user.login.clone(),
            registration_date: user.registration_date,
            is_admin: user.is_admin,
            department_id: None,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.login == login)
            .cloned())
    }

    async fn all_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn update_user(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(first_name) = &changes.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(department_id) = changes.department_id {
            user.department_id = department_id;
        }
        let user = user.clone();
        if let Some(classroom_ids) = &changes.occupied_classrooms {
            tables.occupancy.retain(|(owner, _)| *owner != id);
            tables
                .occupancy
                .extend(classroom_ids.iter().map(|classroom| (id, *classroom)));
        }
        Ok(Some(user))
    }

    async fn user_ids_in_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<UserId>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .filter(|u| u.department_id == Some(department_id))
            .map(|u| u.id)
            .collect())
    }

    async fn occupied_classroom_ids(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ClassroomId>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .occupancy
            .iter()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, classroom)| *classroom)
            .collect())
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn insert_request(
        &self,
        request: &NewRequest,
        requesting_users: &[UserId],
    ) -> Result<Request, StoreError> {
        let mut tables = self.tables.write().await;
        let created = Request {
            id: RequestId::new(tables.next_id()),
            start_date: request.start_date,
            end_date: request.end_date,
            registration_date: request.registration_date,
            is_approved: false,
            author_id: Some(request.author_id),
            classroom_id: Some(request.classroom_id),
        };
        tables.requests.insert(created.id, created.clone());
        tables
            .participants
            .extend(requesting_users.iter().map(|user| (created.id, *user)));
        Ok(created)
    }

    async fn request_by_id(&self, id: RequestId) -> Result<Option<Request>, StoreError> {
        Ok(self.tables.read().await.requests.get(&id).cloned())
    }

    async fn all_requests(&self) -> Result<Vec<Request>, StoreError> {
        Ok(self.tables.read().await.requests.values().cloned().collect())
    }

    async fn update_request(
        &self,
        id: RequestId,
        changes: &RequestChanges,
    ) -> Result<Option<Request>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(request) = tables.requests.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(author_id) = changes.author_id {
            request.author_id = author_id;
        }
        if let Some(classroom_id) = changes.classroom_id {
            request.classroom_id = classroom_id;
        }
        let request = request.clone();
        if let Some(user_ids) = &changes.requesting_users {
            tables.participants.retain(|(owner, _)| *owner != id);
            tables
                .participants
                .extend(user_ids.iter().map(|user| (id, *user)));
        }
        Ok(Some(request))
    }

    async fn approve_request(&self, id: RequestId) -> Result<Option<Request>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.requests.get_mut(&id).map(|request| {
            request.is_approved = true;
            request.clone()
        }))
    }

    async fn requesting_user_ids(
        &self,
        request_id: RequestId,
    ) -> Result<Vec<UserId>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .participants
            .iter()
            .filter(|(request, _)| *request == request_id)
            .map(|(_, user)| *user)
            .collect())
    }

    async fn requests_by_author(&self, author_id: UserId) -> Result<Vec<Request>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .requests
            .values()
            .filter(|r| r.author_id == Some(author_id))
            .cloned()
            .collect())
    }

    async fn requests_by_classroom(
        &self,
        classroom_id: ClassroomId,
    ) -> Result<Vec<Request>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .requests
            .values()
            .filter(|r| r.classroom_id == Some(classroom_id))
            .cloned()
            .collect())
    }

    async fn requests_in_range(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Request>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .requests
            .values()
            .filter(|r| r.start_date >= from && r.end_date <= to)
            .cloned()
            .collect())
    }

    async fn request_ids_joined_by(&self, user_id: UserId) -> Result<Vec<RequestId>, StoreError> {
        let tables = self.tables.read().await;
        let mut ids: Vec<RequestId> = tables
            .participants
            .iter()
            .filter(|(_, user)| *user == user_id)
            .map(|(request, _)| *request)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn new_user(login: &str) -> NewUser {
        NewUser {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            login: login.to_string(),
            is_admin: false,
            registration_date: at(1, 8),
        }
    }

    #[tokio::test]
    async fn test_duplicate_login_is_conflict() {
        let store = MemoryStore::new();
        store.insert_user(&new_user("ada")).await.unwrap();

        let err = store.insert_user(&new_user("ada")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_building_conflict_needs_both_fields() {
        let store = MemoryStore::new();
        let dto = CreateBuildingDto {
            name: "Main".to_string(),
            address: "1 Campus Way".to_string(),
        };
        store.insert_building(&dto).await.unwrap();

        let same_name = CreateBuildingDto {
            name: "Main".to_string(),
            address: "2 Campus Way".to_string(),
        };
        assert!(store.insert_building(&same_name).await.is_ok());
        assert!(store.insert_building(&dto).await.is_err());
    }

    #[tokio::test]
    async fn test_manager_can_run_only_one_department() {
        let store = MemoryStore::new();
        let user = store.insert_user(&new_user("ada")).await.unwrap();
        let first = store
            .insert_department(&CreateDepartmentDto {
                full_name: "Mathematics".to_string(),
                code_name: "MATH".to_string(),
            })
            .await
            .unwrap();
        let second = store
            .insert_department(&CreateDepartmentDto {
                full_name: "Physics".to_string(),
                code_name: "PHYS".to_string(),
            })
            .await
            .unwrap();

        let managed_by_ada = DepartmentChanges {
            manager_id: Some(Some(user.id)),
            ..Default::default()
        };
        store
            .update_department(first.id, &managed_by_ada)
            .await
            .unwrap();

        let err = store
            .update_department(second.id, &managed_by_ada)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(message) if message == MANAGER_CONFLICT));
        assert_eq!(
            store.department_by_id(second.id).await.unwrap().unwrap().manager_id,
            None
        );
    }

    #[tokio::test]
    async fn test_update_user_replaces_occupied_set() {
        let store = MemoryStore::new();
        let user = store.insert_user(&new_user("ada")).await.unwrap();
        let dto = CreateClassroomDto {
            name: "101".to_string(),
            floor: 1,
            is_private: false,
        };
        let a = store.insert_classroom(&dto).await.unwrap();
        let b = store.insert_classroom(&dto).await.unwrap();

        let occupy = |ids: Vec<ClassroomId>| UserChanges {
            occupied_classrooms: Some(ids),
            ..Default::default()
        };

        store.update_user(user.id, &occupy(vec![a.id, b.id])).await.unwrap();
        assert_eq!(
            store.occupied_classroom_ids(user.id).await.unwrap(),
            vec![a.id, b.id]
        );

        store.update_user(user.id, &occupy(vec![b.id])).await.unwrap();
        assert_eq!(store.occupied_classroom_ids(user.id).await.unwrap(), vec![b.id]);
        assert_eq!(store.occupant_ids(a.id).await.unwrap(), Vec::<UserId>::new());

        // `None` leaves the association untouched
        let renamed = store
            .update_user(
                user.id,
                &UserChanges {
                    first_name: Some("Augusta".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.first_name, "Augusta");
        assert_eq!(renamed.last_name, "Lovelace");
        assert_eq!(store.occupied_classroom_ids(user.id).await.unwrap(), vec![b.id]);
    }

    #[tokio::test]
    async fn test_requests_in_range_is_inclusive_containment() {
        let store = MemoryStore::new();
        let author = store.insert_user(&new_user("ada")).await.unwrap();
        let classroom = store
            .insert_classroom(&CreateClassroomDto {
                name: "101".to_string(),
                floor: 1,
                is_private: false,
            })
            .await
            .unwrap();

        let inside = store
            .insert_request(
                &NewRequest {
                    start_date: at(2, 9),
                    end_date: at(2, 11),
                    registration_date: at(1, 8),
                    author_id: author.id,
                    classroom_id: classroom.id,
                },
                &[],
            )
            .await
            .unwrap();
        store
            .insert_request(
                &NewRequest {
                    start_date: at(2, 9),
                    end_date: at(3, 11),
                    registration_date: at(1, 8),
                    author_id: author.id,
                    classroom_id: classroom.id,
                },
                &[],
            )
            .await
            .unwrap();

        let found = store.requests_in_range(at(2, 9), at(2, 11)).await.unwrap();
        assert_eq!(found, vec![inside]);
    }

    #[tokio::test]
    async fn test_update_request_never_writes_approval() {
        let store = MemoryStore::new();
        let author = store.insert_user(&new_user("ada")).await.unwrap();
        let guest = store.insert_user(&new_user("grace")).await.unwrap();
        let classroom = store
            .insert_classroom(&CreateClassroomDto {
                name: "101".to_string(),
                floor: 1,
                is_private: false,
            })
            .await
            .unwrap();
        let request = store
            .insert_request(
                &NewRequest {
                    start_date: at(2, 9),
                    end_date: at(2, 11),
                    registration_date: at(1, 8),
                    author_id: author.id,
                    classroom_id: classroom.id,
                },
                &[],
            )
            .await
            .unwrap();

        let approved = store.approve_request(request.id).await.unwrap().unwrap();
        assert!(approved.is_approved);

        let updated = store
            .update_request(
                request.id,
                &RequestChanges {
                    classroom_id: Some(None),
                    requesting_users: Some(vec![guest.id]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(updated.is_approved);
        assert_eq!(updated.classroom_id, None);
        assert_eq!(updated.author_id, Some(author.id));
        assert_eq!(store.requesting_user_ids(request.id).await.unwrap(), vec![guest.id]);

        assert_eq!(
            store.approve_request(RequestId::new(999)).await.unwrap(),
            None
        );
    }
}
