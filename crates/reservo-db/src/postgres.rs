//! PostgreSQL adapter for the store port.
//!
//! Writes that touch an association table run in one transaction together
//! with the owning row.
//!
//! Updates bind a change set into a fixed statement: `COALESCE($n, col)` for
//! required columns and `CASE WHEN $flag THEN $value ELSE col END` for
//! nullable relations, so columns outside the change set keep whatever a
//! concurrent writer put there.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use tracing::{error, instrument};

use reservo_models::{
    Building, BuildingChanges, BuildingId, Classroom, ClassroomChanges, ClassroomId,
    CreateBuildingDto, CreateClassroomDto, CreateDepartmentDto, Department, DepartmentChanges,
    DepartmentId, NewRequest, NewUser, Request, RequestChanges, RequestId, User, UserChanges,
    UserId,
};

use crate::error::{StoreError, conflict_message};
use crate::store::{BuildingStore, ClassroomStore, DepartmentStore, RequestStore, UserStore};

const BUILDING_COLUMNS: &str = "id, name, address";
const DEPARTMENT_COLUMNS: &str = "id, full_name, code_name, manager_id";
const CLASSROOM_COLUMNS: &str =
    "id, name, floor, is_private, building_id, department_id, manager_id";
const USER_COLUMNS: &str =
    "id, first_name, last_name, login, registration_date, is_admin, department_id";
const REQUEST_COLUMNS: &str =
    "id, start_date, end_date, registration_date, is_approved, author_id, classroom_id";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_err(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return StoreError::Conflict(conflict_message(db_err.constraint()).to_string());
    }
    error!(error = %e, "Database error");
    StoreError::Database(e)
}

#[async_trait]
impl BuildingStore for PgStore {
    #[instrument(skip(self, building), fields(db.operation = "INSERT", db.table = "buildings"))]
    async fn insert_building(&self, building: &CreateBuildingDto) -> Result<Building, StoreError> {
        sqlx::query_as::<_, Building>(&format!(
            "INSERT INTO buildings (name, address) VALUES ($1, $2) RETURNING {BUILDING_COLUMNS}"
        ))
        .bind(&building.name)
        .bind(&building.address)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn building_by_id(&self, id: BuildingId) -> Result<Option<Building>, StoreError> {
        sqlx::query_as::<_, Building>(&format!(
            "SELECT {BUILDING_COLUMNS} FROM buildings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn all_buildings(&self) -> Result<Vec<Building>, StoreError> {
        sqlx::query_as::<_, Building>(&format!(
            "SELECT {BUILDING_COLUMNS} FROM buildings ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn building_by_name_and_address(
        &self,
        name: &str,
        address: &str,
    ) -> Result<Option<Building>, StoreError> {
        sqlx::query_as::<_, Building>(&format!(
            "SELECT {BUILDING_COLUMNS} FROM buildings WHERE name = $1 AND address = $2"
        ))
        .bind(name)
        .bind(address)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn buildings_by_name(&self, name: &str) -> Result<Vec<Building>, StoreError> {
        sqlx::query_as::<_, Building>(&format!(
            "SELECT {BUILDING_COLUMNS} FROM buildings WHERE name = $1 ORDER BY id"
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    #[instrument(skip(self, changes), fields(building.id = %id, db.operation = "UPDATE", db.table = "buildings"))]
    async fn update_building(
        &self,
        id: BuildingId,
        changes: &BuildingChanges,
    ) -> Result<Option<Building>, StoreError> {
        sqlx::query_as::<_, Building>(&format!(
            "UPDATE buildings
             SET name = COALESCE($2, name), address = COALESCE($3, address)
             WHERE id = $1
             RETURNING {BUILDING_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.address.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }
}

#[async_trait]
impl DepartmentStore for PgStore {
    #[instrument(skip(self, department), fields(db.operation = "INSERT", db.table = "departments"))]
    async fn insert_department(
        &self,
        department: &CreateDepartmentDto,
    ) -> Result<Department, StoreError> {
        sqlx::query_as::<_, Department>(&format!(
            "INSERT INTO departments (full_name, code_name) VALUES ($1, $2) RETURNING {DEPARTMENT_COLUMNS}"
        ))
        .bind(&department.full_name)
        .bind(&department.code_name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn department_by_id(&self, id: DepartmentId) -> Result<Option<Department>, StoreError> {
        sqlx::query_as::<_, Department>(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn all_departments(&self) -> Result<Vec<Department>, StoreError> {
        sqlx::query_as::<_, Department>(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn department_by_names(
        &self,
        full_name: &str,
        code_name: &str,
    ) -> Result<Option<Department>, StoreError> {
        sqlx::query_as::<_, Department>(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE full_name = $1 AND code_name = $2"
        ))
        .bind(full_name)
        .bind(code_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn departments_by_code_name(
        &self,
        code_name: &str,
    ) -> Result<Vec<Department>, StoreError> {
        sqlx::query_as::<_, Department>(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE code_name = $1 ORDER BY id"
        ))
        .bind(code_name)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn department_managed_by(
        &self,
        user_id: UserId,
    ) -> Result<Option<Department>, StoreError> {
        sqlx::query_as::<_, Department>(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE manager_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    #[instrument(skip(self, changes), fields(department.id = %id, db.operation = "UPDATE", db.table = "departments"))]
    async fn update_department(
        &self,
        id: DepartmentId,
        changes: &DepartmentChanges,
    ) -> Result<Option<Department>, StoreError> {
        sqlx::query_as::<_, Department>(&format!(
            "UPDATE departments
             SET full_name = COALESCE($2, full_name),
                 code_name = COALESCE($3, code_name),
                 manager_id = CASE WHEN $4 THEN $5 ELSE manager_id END
             WHERE id = $1
             RETURNING {DEPARTMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.full_name.as_deref())
        .bind(changes.code_name.as_deref())
        .bind(changes.manager_id.is_some())
        .bind(changes.manager_id.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }
}

#[async_trait]
impl ClassroomStore for PgStore {
    #[instrument(skip(self, classroom), fields(db.operation = "INSERT", db.table = "classrooms"))]
    async fn insert_classroom(
        &self,
        classroom: &CreateClassroomDto,
    ) -> Result<Classroom, StoreError> {
        sqlx::query_as::<_, Classroom>(&format!(
            "INSERT INTO classrooms (name, floor, is_private) VALUES ($1, $2, $3) RETURNING {CLASSROOM_COLUMNS}"
        ))
        .bind(&classroom.name)
        .bind(classroom.floor)
        .bind(classroom.is_private)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn classroom_by_id(&self, id: ClassroomId) -> Result<Option<Classroom>, StoreError> {
        sqlx::query_as::<_, Classroom>(&format!(
            "SELECT {CLASSROOM_COLUMNS} FROM classrooms WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn all_classrooms(&self) -> Result<Vec<Classroom>, StoreError> {
        sqlx::query_as::<_, Classroom>(&format!(
            "SELECT {CLASSROOM_COLUMNS} FROM classrooms ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn non_private_classrooms(&self) -> Result<Vec<Classroom>, StoreError> {
        sqlx::query_as::<_, Classroom>(&format!(
            "SELECT {CLASSROOM_COLUMNS} FROM classrooms WHERE NOT is_private ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    #[instrument(skip(self, changes), fields(classroom.id = %id, db.operation = "UPDATE", db.table = "classrooms"))]
    async fn update_classroom(
        &self,
        id: ClassroomId,
        changes: &ClassroomChanges,
    ) -> Result<Option<Classroom>, StoreError> {
        sqlx::query_as::<_, Classroom>(&format!(
            "UPDATE classrooms
             SET name = COALESCE($2, name),
                 is_private = COALESCE($3, is_private),
                 building_id = CASE WHEN $4 THEN $5 ELSE building_id END,
                 department_id = CASE WHEN $6 THEN $7 ELSE department_id END,
                 manager_id = CASE WHEN $8 THEN $9 ELSE manager_id END
             WHERE id = $1
             RETURNING {CLASSROOM_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.is_private)
        .bind(changes.building_id.is_some())
        .bind(changes.building_id.flatten())
        .bind(changes.department_id.is_some())
        .bind(changes.department_id.flatten())
        .bind(changes.manager_id.is_some())
        .bind(changes.manager_id.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn classroom_ids_in_building(
        &self,
        building_id: BuildingId,
    ) -> Result<Vec<ClassroomId>, StoreError> {
        sqlx::query_scalar::<_, ClassroomId>(
            "SELECT id FROM classrooms WHERE building_id = $1 ORDER BY id",
        )
        .bind(building_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn classroom_ids_in_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<ClassroomId>, StoreError> {
        sqlx::query_scalar::<_, ClassroomId>(
            "SELECT id FROM classrooms WHERE department_id = $1 ORDER BY id",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn classroom_ids_managed_by(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ClassroomId>, StoreError> {
        sqlx::query_scalar::<_, ClassroomId>(
            "SELECT id FROM classrooms WHERE manager_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn occupant_ids(&self, classroom_id: ClassroomId) -> Result<Vec<UserId>, StoreError> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM user_occupied_classrooms WHERE classroom_id = $1 ORDER BY user_id",
        )
        .bind(classroom_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }
}

#[async_trait]
impl UserStore for PgStore {
    #[instrument(skip(self, user), fields(user.login = %user.login, db.operation = "INSERT", db.table = "users"))]
    async fn insert_user(&self, user: &NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (first_name, last_name, login, registration_date, is_admin)
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.login)
        .bind(user.registration_date)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE login = $1"))
            .bind(login)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn all_users(&self) -> Result<Vec<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)
    }

    #[instrument(skip(self, changes), fields(user.id = %id, db.operation = "UPDATE", db.table = "users"))]
    async fn update_user(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;

        let Some(user) = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET first_name = COALESCE($2, first_name),
                 last_name = COALESCE($3, last_name),
                 department_id = CASE WHEN $4 THEN $5 ELSE department_id END
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(changes.department_id.is_some())
        .bind(changes.department_id.flatten())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_err)?
        else {
            return Ok(None);
        };

        if let Some(classroom_ids) = &changes.occupied_classrooms {
            sqlx::query("DELETE FROM user_occupied_classrooms WHERE user_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_err)?;

            sqlx::query(
                "INSERT INTO user_occupied_classrooms (user_id, classroom_id)
                 SELECT $1, classroom_id FROM UNNEST($2::INTEGER[]) AS t(classroom_id)
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(classroom_ids.as_slice())
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;
        }

        tx.commit().await.map_err(map_err)?;
        Ok(Some(user))
    }

    async fn user_ids_in_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<UserId>, StoreError> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT id FROM users WHERE department_id = $1 ORDER BY id",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn occupied_classroom_ids(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ClassroomId>, StoreError> {
        sqlx::query_scalar::<_, ClassroomId>(
            "SELECT classroom_id FROM user_occupied_classrooms WHERE user_id = $1 ORDER BY classroom_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }
}

#[async_trait]
impl RequestStore for PgStore {
    #[instrument(skip(self, request, requesting_users), fields(db.operation = "INSERT", db.table = "requests"))]
    async fn insert_request(
        &self,
        request: &NewRequest,
        requesting_users: &[UserId],
    ) -> Result<Request, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;

        let created = sqlx::query_as::<_, Request>(&format!(
            "INSERT INTO requests (start_date, end_date, registration_date, is_approved, author_id, classroom_id)
             VALUES ($1, $2, $3, FALSE, $4, $5) RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.registration_date)
        .bind(request.author_id)
        .bind(request.classroom_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_err)?;

        sqlx::query(
            "INSERT INTO request_participants (request_id, user_id)
             SELECT $1, user_id FROM UNNEST($2::INTEGER[]) AS t(user_id)
             ON CONFLICT DO NOTHING",
        )
        .bind(created.id)
        .bind(requesting_users)
        .execute(&mut *tx)
        .await
        .map_err(map_err)?;

        tx.commit().await.map_err(map_err)?;
        Ok(created)
    }

    async fn request_by_id(&self, id: RequestId) -> Result<Option<Request>, StoreError> {
        sqlx::query_as::<_, Request>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn all_requests(&self) -> Result<Vec<Request>, StoreError> {
        sqlx::query_as::<_, Request>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    #[instrument(skip(self, changes), fields(request.id = %id, db.operation = "UPDATE", db.table = "requests"))]
    async fn update_request(
        &self,
        id: RequestId,
        changes: &RequestChanges,
    ) -> Result<Option<Request>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;

        let Some(request) = sqlx::query_as::<_, Request>(&format!(
            "UPDATE requests
             SET author_id = CASE WHEN $2 THEN $3 ELSE author_id END,
                 classroom_id = CASE WHEN $4 THEN $5 ELSE classroom_id END
             WHERE id = $1
             RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.author_id.is_some())
        .bind(changes.author_id.flatten())
        .bind(changes.classroom_id.is_some())
        .bind(changes.classroom_id.flatten())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_err)?
        else {
            return Ok(None);
        };

        if let Some(user_ids) = &changes.requesting_users {
            sqlx::query("DELETE FROM request_participants WHERE request_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_err)?;

            sqlx::query(
                "INSERT INTO request_participants (request_id, user_id)
                 SELECT $1, user_id FROM UNNEST($2::INTEGER[]) AS t(user_id)
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(user_ids.as_slice())
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;
        }

        tx.commit().await.map_err(map_err)?;
        Ok(Some(request))
    }

    #[instrument(skip(self), fields(request.id = %id, db.operation = "UPDATE", db.table = "requests"))]
    async fn approve_request(&self, id: RequestId) -> Result<Option<Request>, StoreError> {
        sqlx::query_as::<_, Request>(&format!(
            "UPDATE requests SET is_approved = TRUE WHERE id = $1 RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn requesting_user_ids(
        &self,
        request_id: RequestId,
    ) -> Result<Vec<UserId>, StoreError> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM request_participants WHERE request_id = $1 ORDER BY user_id",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn requests_by_author(&self, author_id: UserId) -> Result<Vec<Request>, StoreError> {
        sqlx::query_as::<_, Request>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE author_id = $1 ORDER BY id"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn requests_by_classroom(
        &self,
        classroom_id: ClassroomId,
    ) -> Result<Vec<Request>, StoreError> {
        sqlx::query_as::<_, Request>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE classroom_id = $1 ORDER BY id"
        ))
        .bind(classroom_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn requests_in_range(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Request>, StoreError> {
        sqlx::query_as::<_, Request>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE start_date >= $1 AND end_date <= $2 ORDER BY id"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn request_ids_joined_by(&self, user_id: UserId) -> Result<Vec<RequestId>, StoreError> {
        sqlx::query_scalar::<_, RequestId>(
            "SELECT request_id FROM request_participants WHERE user_id = $1 ORDER BY request_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }
}
