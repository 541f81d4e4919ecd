//! # Reservo Models
//!
//! Data structures shared by the store adapters and the HTTP layer.
//!
//! Each entity module holds three shapes:
//!
//! - the stored record (`Building`, `Classroom`, ...) deriving [`sqlx::FromRow`],
//!   with relationships as nullable foreign-key ids
//! - the response view (`BuildingResponse`, ...) where every relationship is a
//!   bare id or a list of ids, never a nested object
//! - the create/update DTOs; update DTOs wrap every field in
//!   [`reservo_core::Patch`]
//!
//! # Modules
//!
//! - [`ids`]: integer id newtypes
//! - [`buildings`], [`departments`], [`classrooms`], [`users`], [`requests`]
//! - [`auth`]: login and token payloads

pub mod auth;
pub mod buildings;
pub mod classrooms;
pub mod departments;
pub mod ids;
pub mod requests;
pub mod users;

pub use ids::{BuildingId, ClassroomId, DepartmentId, RequestId, UserId};

pub use auth::{
    AccessTokenResponse, LoginRequest, LoginResponse, MessageResponse, RefreshTokenRequest,
};
pub use buildings::{
    Building, BuildingChanges, BuildingFilterParams, BuildingResponse, BuildingsResponse,
    CreateBuildingDto, UpdateBuildingDto,
};
pub use classrooms::{
    Classroom, ClassroomChanges, ClassroomResponse, ClassroomsResponse, CreateClassroomDto,
    UpdateClassroomDto,
};
pub use departments::{
    CreateDepartmentDto, Department, DepartmentChanges, DepartmentFilterParams,
    DepartmentResponse, DepartmentsResponse, UpdateDepartmentDto,
};
pub use requests::{
    ApproveRequestDto, CreateRequestDto, NewRequest, Request, RequestChanges,
    RequestFilterParams, RequestResponse, RequestsResponse, UpdateRequestDto,
};
pub use users::{
    CreateUserDto, NewUser, UpdateUserDto, User, UserChanges, UserResponse, UsersResponse,
};
