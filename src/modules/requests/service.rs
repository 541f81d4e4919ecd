use anyhow::anyhow;
use chrono::Utc;
use tracing::{debug, info, instrument};

use reservo_core::{AppError, rules};
use reservo_db::prelude::*;
use reservo_models::{
    ApproveRequestDto, CreateRequestDto, NewRequest, Request, RequestChanges,
    RequestFilterParams, RequestId, RequestResponse, RequestsResponse, UpdateRequestDto, UserId,
};

use crate::metrics::{track_reservation_approved, track_reservation_created};

pub struct RequestService;

impl RequestService {
    /// Creates an unapproved reservation stamped with the current time.
    ///
    /// The author, the classroom and every requesting login must already
    /// exist. Duplicate logins collapse into one participant.
    #[instrument(skip(store, dto), fields(author_id = %dto.author_id, classroom_id = %dto.classroom_id))]
    pub async fn create_request(
        store: &dyn Store,
        dto: CreateRequestDto,
    ) -> Result<RequestResponse, AppError> {
        rules::request_dates(dto.start_date, dto.end_date)?;

        if store.user_by_id(dto.author_id).await?.is_none() {
            return Err(AppError::not_found(anyhow!(
                "No user found with author ID: {}",
                dto.author_id
            )));
        }
        if store.classroom_by_id(dto.classroom_id).await?.is_none() {
            return Err(AppError::not_found(anyhow!(
                "No classroom found with ID: {}",
                dto.classroom_id
            )));
        }
        let requesting_users = Self::resolve_logins(store, &dto.requesting_user_logins).await?;

        let request = store
            .insert_request(
                &NewRequest {
                    start_date: dto.start_date,
                    end_date: dto.end_date,
                    registration_date: Utc::now().naive_utc(),
                    author_id: dto.author_id,
                    classroom_id: dto.classroom_id,
                },
                &requesting_users,
            )
            .await?;
        info!(request.id = %request.id, participants = requesting_users.len(), "Request created");
        track_reservation_created();

        Self::view(store, request).await
    }

    /// Writes only the relations named in the payload; the approval flag and
    /// the dates are never part of an update.
    #[instrument(skip(store, dto))]
    pub async fn update_request(
        store: &dyn Store,
        id: RequestId,
        dto: UpdateRequestDto,
    ) -> Result<RequestResponse, AppError> {
        Self::load(store, id).await?;
        let mut changes = RequestChanges::default();

        if let Some(author_id) = dto.new_author_id.into_change() {
            if let Some(author_id) = author_id
                && store.user_by_id(author_id).await?.is_none()
            {
                return Err(AppError::not_found(anyhow!(
                    "No user found with ID: {}",
                    author_id
                )));
            }
            changes.author_id = Some(author_id);
        }
        if let Some(classroom_id) = dto.new_classroom_id.into_change() {
            if let Some(classroom_id) = classroom_id
                && store.classroom_by_id(classroom_id).await?.is_none()
            {
                return Err(AppError::not_found(anyhow!(
                    "No classroom found with ID: {}",
                    classroom_id
                )));
            }
            changes.classroom_id = Some(classroom_id);
        }
        if let Some(logins) = dto.new_requesting_user_logins.into_change() {
            changes.requesting_users =
                Some(Self::resolve_logins(store, &logins.unwrap_or_default()).await?);
        }

        let request = Self::stored(store.update_request(id, &changes).await?, id)?;
        info!(request.id = %request.id, "Request updated");

        Self::view(store, request).await
    }

    /// Marks the request approved. The caller's authority over the request
    /// is checked by the route gate, not here.
    #[instrument(skip(store, dto), fields(manager_id = %dto.manager_id))]
    pub async fn approve_request(
        store: &dyn Store,
        id: RequestId,
        dto: ApproveRequestDto,
    ) -> Result<RequestResponse, AppError> {
        Self::load(store, id).await?;
        if store.user_by_id(dto.manager_id).await?.is_none() {
            return Err(AppError::not_found(anyhow!(
                "No manager found with ID: {}",
                dto.manager_id
            )));
        }

        let request = Self::stored(store.approve_request(id).await?, id)?;
        info!(request.id = %request.id, "Request approved");
        track_reservation_approved();

        Self::view(store, request).await
    }

    #[instrument(skip(store))]
    pub async fn find_request(
        store: &dyn Store,
        id: RequestId,
    ) -> Result<RequestResponse, AppError> {
        let request = Self::load(store, id).await?;
        Self::view(store, request).await
    }

    #[instrument(skip(store))]
    pub async fn find_all_requests(store: &dyn Store) -> Result<RequestsResponse, AppError> {
        let requests = store.all_requests().await?;
        if requests.is_empty() {
            return Err(AppError::empty_result(anyhow!(
                "No requests found in the database."
            )));
        }
        Self::views(store, requests).await
    }

    /// Filters combine with AND. An empty match is an empty list.
    #[instrument(skip(store))]
    pub async fn find_requests(
        store: &dyn Store,
        filters: RequestFilterParams,
    ) -> Result<RequestsResponse, AppError> {
        let mut requests = if let Some(author_id) = filters.author_id {
            store.requests_by_author(author_id).await?
        } else if let Some(classroom_id) = filters.classroom_id {
            store.requests_by_classroom(classroom_id).await?
        } else if let (Some(from), Some(to)) = (filters.from, filters.to) {
            store.requests_in_range(from, to).await?
        } else {
            store.all_requests().await?
        };

        requests.retain(|request| {
            filters
                .author_id
                .is_none_or(|author_id| request.author_id == Some(author_id))
                && filters
                    .classroom_id
                    .is_none_or(|classroom_id| request.classroom_id == Some(classroom_id))
                && filters.from.is_none_or(|from| request.start_date >= from)
                && filters.to.is_none_or(|to| request.end_date <= to)
        });
        requests.sort_by_key(|request| request.id);
        debug!(count = requests.len(), "Requests matched filters");

        Self::views(store, requests).await
    }

    async fn resolve_logins(store: &dyn Store, logins: &[String]) -> Result<Vec<UserId>, AppError> {
        let mut ids = Vec::with_capacity(logins.len());
        for login in logins {
            let user = store.user_by_login(login).await?.ok_or_else(|| {
                AppError::not_found(anyhow!("No user found with login: {}", login))
            })?;
            ids.push(user.id);
        }
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn load(store: &dyn Store, id: RequestId) -> Result<Request, AppError> {
        Self::stored(store.request_by_id(id).await?, id)
    }

    fn stored(request: Option<Request>, id: RequestId) -> Result<Request, AppError> {
        request.ok_or_else(|| AppError::not_found(anyhow!("No request found with ID: {}", id)))
    }

    async fn views(
        store: &dyn Store,
        requests: Vec<Request>,
    ) -> Result<RequestsResponse, AppError> {
        let mut views = Vec::with_capacity(requests.len());
        for request in requests {
            views.push(Self::view(store, request).await?);
        }
        Ok(RequestsResponse { requests: views })
    }

    async fn view(store: &dyn Store, request: Request) -> Result<RequestResponse, AppError> {
        let requesting_users = store.requesting_user_ids(request.id).await?;
        Ok(RequestResponse {
            id: request.id,
            start_date: request.start_date,
            end_date: request.end_date,
            registration_date: request.registration_date,
            is_approved: request.is_approved,
            author: request.author_id,
            requesting_users,
            classroom: request.classroom_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use reservo_core::{ErrorKind, Patch};
    use reservo_db::{MemoryStore, StoreError};
    use reservo_models::{
        Building, BuildingChanges, BuildingId, Classroom, ClassroomChanges, ClassroomId,
        CreateBuildingDto, CreateClassroomDto, CreateDepartmentDto, Department,
        DepartmentChanges, DepartmentId, NewUser, User, UserChanges,
    };

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    async fn user(store: &MemoryStore, login: &str) -> UserId {
        store
            .insert_user(&NewUser {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                login: login.to_string(),
                is_admin: false,
                registration_date: at(1, 8),
            })
            .await
            .unwrap()
            .id
    }

    async fn classroom(store: &MemoryStore, name: &str) -> ClassroomId {
        store
            .insert_classroom(&CreateClassroomDto {
                name: name.to_string(),
                floor: 0,
                is_private: false,
            })
            .await
            .unwrap()
            .id
    }

    fn dto(author_id: UserId, classroom_id: ClassroomId, day: u32) -> CreateRequestDto {
        CreateRequestDto {
            start_date: at(day, 9),
            end_date: at(day, 11),
            author_id,
            classroom_id,
            requesting_user_logins: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_new_request_is_unapproved_and_stamped() {
        let store = MemoryStore::new();
        let author = user(&store, "author").await;
        let room = classroom(&store, "101").await;
        let before = Utc::now().naive_utc();

        let mut create = dto(author, room, 10);
        create.requesting_user_logins = vec!["author".to_string(), "author".to_string()];
        let request = RequestService::create_request(&store, create).await.unwrap();

        assert!(!request.is_approved);
        assert!(request.registration_date >= before);
        assert_eq!(request.author, Some(author));
        assert_eq!(request.requesting_users, vec![author]);
    }

    #[tokio::test]
    async fn test_dates_must_be_ordered() {
        let store = MemoryStore::new();
        let author = user(&store, "author").await;
        let room = classroom(&store, "101").await;

        let mut create = dto(author, room, 10);
        create.end_date = create.start_date;
        let err = RequestService::create_request(&store, create)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(store.all_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_login_is_not_found() {
        let store = MemoryStore::new();
        let author = user(&store, "author").await;
        let room = classroom(&store, "101").await;

        let mut create = dto(author, room, 10);
        create.requesting_user_logins = vec!["ghost".to_string()];
        let err = RequestService::create_request(&store, create)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message(), "No user found with login: ghost");
    }

    #[tokio::test]
    async fn test_unknown_author_is_not_found() {
        let store = MemoryStore::new();
        let room = classroom(&store, "101").await;

        let err = RequestService::create_request(&store, dto(UserId::new(99), room, 10))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "No user found with author ID: 99");
    }

    #[tokio::test]
    async fn test_approve_requires_existing_manager() {
        let store = MemoryStore::new();
        let author = user(&store, "author").await;
        let manager = user(&store, "manager").await;
        let room = classroom(&store, "101").await;
        let request = RequestService::create_request(&store, dto(author, room, 10))
            .await
            .unwrap();

        let err = RequestService::approve_request(
            &store,
            request.id,
            ApproveRequestDto {
                manager_id: UserId::new(500),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.message(), "No manager found with ID: 500");

        let approved = RequestService::approve_request(
            &store,
            request.id,
            ApproveRequestDto {
                manager_id: manager,
            },
        )
        .await
        .unwrap();
        assert!(approved.is_approved);
    }

    #[tokio::test]
    async fn test_update_replaces_participants() {
        let store = MemoryStore::new();
        let author = user(&store, "author").await;
        let guest = user(&store, "guest").await;
        let room = classroom(&store, "101").await;
        let request = RequestService::create_request(&store, dto(author, room, 10))
            .await
            .unwrap();

        let updated = RequestService::update_request(
            &store,
            request.id,
            UpdateRequestDto {
                new_requesting_user_logins: Patch::Value(vec!["guest".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.requesting_users, vec![guest]);
        assert_eq!(updated.author, Some(author));

        let cleared = RequestService::update_request(
            &store,
            request.id,
            UpdateRequestDto {
                new_requesting_user_logins: Patch::Null,
                new_classroom_id: Patch::Null,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(cleared.requesting_users.is_empty());
        assert_eq!(cleared.classroom, None);
    }

    #[tokio::test]
    async fn test_find_all_on_empty_table() {
        let store = MemoryStore::new();
        let err = RequestService::find_all_requests(&store).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyResult);
        assert_eq!(err.message(), "No requests found in the database.");
    }

    #[tokio::test]
    async fn test_filters_combine() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let room_a = classroom(&store, "A").await;
        let room_b = classroom(&store, "B").await;

        let first = RequestService::create_request(&store, dto(alice, room_a, 10))
            .await
            .unwrap();
        let second = RequestService::create_request(&store, dto(alice, room_b, 12))
            .await
            .unwrap();
        RequestService::create_request(&store, dto(bob, room_a, 12))
            .await
            .unwrap();

        let by_author = RequestService::find_requests(
            &store,
            RequestFilterParams {
                author_id: Some(alice),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let ids: Vec<_> = by_author.requests.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);

        let narrowed = RequestService::find_requests(
            &store,
            RequestFilterParams {
                author_id: Some(alice),
                from: Some(at(11, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(narrowed.requests.len(), 1);
        assert_eq!(narrowed.requests[0].id, second.id);

        let in_range = RequestService::find_requests(
            &store,
            RequestFilterParams {
                from: Some(at(12, 0)),
                to: Some(at(12, 23)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(in_range.requests.len(), 2);

        let none = RequestService::find_requests(
            &store,
            RequestFilterParams {
                author_id: Some(bob),
                classroom_id: Some(room_b),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(none.requests.is_empty());
    }

    /// Delegates to a [`MemoryStore`] and approves `request` the first time
    /// `trigger` is looked up, landing an approval between an update's reads
    /// and its write.
    struct ApprovesDuringLookup {
        inner: MemoryStore,
        request: RequestId,
        trigger: UserId,
        fired: AtomicBool,
    }

    #[async_trait]
    impl BuildingStore for ApprovesDuringLookup {
        async fn insert_building(
            &self,
            building: &CreateBuildingDto,
        ) -> Result<Building, StoreError> {
            self.inner.insert_building(building).await
        }

        async fn building_by_id(&self, id: BuildingId) -> Result<Option<Building>, StoreError> {
            self.inner.building_by_id(id).await
        }

        async fn all_buildings(&self) -> Result<Vec<Building>, StoreError> {
            self.inner.all_buildings().await
        }

        async fn building_by_name_and_address(
            &self,
            name: &str,
            address: &str,
        ) -> Result<Option<Building>, StoreError> {
            self.inner.building_by_name_and_address(name, address).await
        }

        async fn buildings_by_name(&self, name: &str) -> Result<Vec<Building>, StoreError> {
            self.inner.buildings_by_name(name).await
        }

        async fn update_building(
            &self,
            id: BuildingId,
            changes: &BuildingChanges,
        ) -> Result<Option<Building>, StoreError> {
            self.inner.update_building(id, changes).await
        }
    }

    #[async_trait]
    impl DepartmentStore for ApprovesDuringLookup {
        async fn insert_department(
            &self,
            department: &CreateDepartmentDto,
        ) -> Result<Department, StoreError> {
            self.inner.insert_department(department).await
        }

        async fn department_by_id(
            &self,
            id: DepartmentId,
        ) -> Result<Option<Department>, StoreError> {
            self.inner.department_by_id(id).await
        }

        async fn all_departments(&self) -> Result<Vec<Department>, StoreError> {
            self.inner.all_departments().await
        }

        async fn department_by_names(
            &self,
            full_name: &str,
            code_name: &str,
        ) -> Result<Option<Department>, StoreError> {
            self.inner.department_by_names(full_name, code_name).await
        }

        async fn departments_by_code_name(
            &self,
            code_name: &str,
        ) -> Result<Vec<Department>, StoreError> {
            self.inner.departments_by_code_name(code_name).await
        }

        async fn department_managed_by(
            &self,
            user_id: UserId,
        ) -> Result<Option<Department>, StoreError> {
            self.inner.department_managed_by(user_id).await
        }

        async fn update_department(
            &self,
            id: DepartmentId,
            changes: &DepartmentChanges,
        ) -> Result<Option<Department>, StoreError> {
            self.inner.update_department(id, changes).await
        }
    }

    #[async_trait]
    impl ClassroomStore for ApprovesDuringLookup {
        async fn insert_classroom(
            &self,
            classroom: &CreateClassroomDto,
        ) -> Result<Classroom, StoreError> {
            self.inner.insert_classroom(classroom).await
        }

        async fn classroom_by_id(&self, id: ClassroomId) -> Result<Option<Classroom>, StoreError> {
            self.inner.classroom_by_id(id).await
        }

        async fn all_classrooms(&self) -> Result<Vec<Classroom>, StoreError> {
            self.inner.all_classrooms().await
        }

        async fn non_private_classrooms(&self) -> Result<Vec<Classroom>, StoreError> {
            self.inner.non_private_classrooms().await
        }

        async fn update_classroom(
            &self,
            id: ClassroomId,
            changes: &ClassroomChanges,
        ) -> Result<Option<Classroom>, StoreError> {
            self.inner.update_classroom(id, changes).await
        }

        async fn classroom_ids_in_building(
            &self,
            building_id: BuildingId,
        ) -> Result<Vec<ClassroomId>, StoreError> {
            self.inner.classroom_ids_in_building(building_id).await
        }

        async fn classroom_ids_in_department(
            &self,
            department_id: DepartmentId,
        ) -> Result<Vec<ClassroomId>, StoreError> {
            self.inner.classroom_ids_in_department(department_id).await
        }

        async fn classroom_ids_managed_by(
            &self,
            user_id: UserId,
        ) -> Result<Vec<ClassroomId>, StoreError> {
            self.inner.classroom_ids_managed_by(user_id).await
        }

        async fn occupant_ids(
            &self,
            classroom_id: ClassroomId,
        ) -> Result<Vec<UserId>, StoreError> {
            self.inner.occupant_ids(classroom_id).await
        }
    }

    #[async_trait]
    impl UserStore for ApprovesDuringLookup {
        async fn insert_user(&self, user: &NewUser) -> Result<User, StoreError> {
            self.inner.insert_user(user).await
        }

        async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
            if id == self.trigger && !self.fired.swap(true, Ordering::SeqCst) {
                self.inner.approve_request(self.request).await?;
            }
            self.inner.user_by_id(id).await
        }

        async fn user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
            self.inner.user_by_login(login).await
        }

        async fn all_users(&self) -> Result<Vec<User>, StoreError> {
            self.inner.all_users().await
        }

        async fn update_user(
            &self,
            id: UserId,
            changes: &UserChanges,
        ) -> Result<Option<User>, StoreError> {
            self.inner.update_user(id, changes).await
        }

        async fn user_ids_in_department(
            &self,
            department_id: DepartmentId,
        ) -> Result<Vec<UserId>, StoreError> {
            self.inner.user_ids_in_department(department_id).await
        }

        async fn occupied_classroom_ids(
            &self,
            user_id: UserId,
        ) -> Result<Vec<ClassroomId>, StoreError> {
            self.inner.occupied_classroom_ids(user_id).await
        }
    }

    #[async_trait]
    impl RequestStore for ApprovesDuringLookup {
        async fn insert_request(
            &self,
            request: &NewRequest,
            requesting_users: &[UserId],
        ) -> Result<Request, StoreError> {
            self.inner.insert_request(request, requesting_users).await
        }

        async fn request_by_id(&self, id: RequestId) -> Result<Option<Request>, StoreError> {
            self.inner.request_by_id(id).await
        }

        async fn all_requests(&self) -> Result<Vec<Request>, StoreError> {
            self.inner.all_requests().await
        }

        async fn update_request(
            &self,
            id: RequestId,
            changes: &RequestChanges,
        ) -> Result<Option<Request>, StoreError> {
            self.inner.update_request(id, changes).await
        }

        async fn approve_request(&self, id: RequestId) -> Result<Option<Request>, StoreError> {
            self.inner.approve_request(id).await
        }

        async fn requesting_user_ids(
            &self,
            request_id: RequestId,
        ) -> Result<Vec<UserId>, StoreError> {
            self.inner.requesting_user_ids(request_id).await
        }

        async fn requests_by_author(
            &self,
            author_id: UserId,
        ) -> Result<Vec<Request>, StoreError> {
            self.inner.requests_by_author(author_id).await
        }

        async fn requests_by_classroom(
            &self,
            classroom_id: ClassroomId,
        ) -> Result<Vec<Request>, StoreError> {
            self.inner.requests_by_classroom(classroom_id).await
        }

        async fn requests_in_range(
            &self,
            from: NaiveDateTime,
            to: NaiveDateTime,
        ) -> Result<Vec<Request>, StoreError> {
            self.inner.requests_in_range(from, to).await
        }

        async fn request_ids_joined_by(
            &self,
            user_id: UserId,
        ) -> Result<Vec<RequestId>, StoreError> {
            self.inner.request_ids_joined_by(user_id).await
        }
    }

    #[tokio::test]
    async fn test_update_keeps_approval_that_lands_mid_update() {
        let inner = MemoryStore::new();
        let author = user(&inner, "author").await;
        let successor = user(&inner, "successor").await;
        let room = classroom(&inner, "101").await;
        let request = RequestService::create_request(&inner, dto(author, room, 10))
            .await
            .unwrap();
        let store = ApprovesDuringLookup {
            inner,
            request: request.id,
            trigger: successor,
            fired: AtomicBool::new(false),
        };

        let updated = RequestService::update_request(
            &store,
            request.id,
            UpdateRequestDto {
                new_author_id: Patch::Value(successor),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(store.fired.load(Ordering::SeqCst));
        assert_eq!(updated.author, Some(successor));
        assert!(updated.is_approved);
        let stored = store.request_by_id(request.id).await.unwrap().unwrap();
        assert!(stored.is_approved);
        assert_eq!(stored.start_date, request.start_date);
        assert_eq!(stored.end_date, request.end_date);
    }
}
