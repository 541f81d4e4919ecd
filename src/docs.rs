use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;
use reservo_models::{
    AccessTokenResponse, ApproveRequestDto, BuildingResponse, BuildingsResponse,
    ClassroomResponse, ClassroomsResponse, CreateBuildingDto, CreateClassroomDto,
    CreateDepartmentDto, CreateRequestDto, CreateUserDto, DepartmentResponse, DepartmentsResponse,
    LoginRequest, LoginResponse, MessageResponse, RefreshTokenRequest, RequestResponse,
    RequestsResponse, UpdateBuildingDto, UpdateClassroomDto, UpdateDepartmentDto,
    UpdateRequestDto, UpdateUserDto, UserResponse, UsersResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::logout_user,
        crate::modules::buildings::controller::create_building,
        crate::modules::buildings::controller::get_buildings_by_name,
        crate::modules::buildings::controller::get_building,
        crate::modules::buildings::controller::update_building,
        crate::modules::buildings::controller::get_all_buildings,
        crate::modules::departments::controller::create_department,
        crate::modules::departments::controller::get_departments_by_code_name,
        crate::modules::departments::controller::get_department,
        crate::modules::departments::controller::update_department,
        crate::modules::departments::controller::get_all_departments,
        crate::modules::classrooms::controller::create_classroom,
        crate::modules::classrooms::controller::get_classroom,
        crate::modules::classrooms::controller::update_classroom,
        crate::modules::classrooms::controller::get_all_classrooms,
        crate::modules::classrooms::controller::get_all_non_private_classrooms,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::get_user_by_login,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::get_all_users,
        crate::modules::requests::controller::create_request,
        crate::modules::requests::controller::get_requests,
        crate::modules::requests::controller::get_request,
        crate::modules::requests::controller::update_request,
        crate::modules::requests::controller::approve_request,
        crate::modules::requests::controller::get_all_requests,
    ),
    components(
        schemas(
            ErrorResponse,
            LoginRequest,
            LoginResponse,
            RefreshTokenRequest,
            AccessTokenResponse,
            MessageResponse,
            BuildingResponse,
            BuildingsResponse,
            CreateBuildingDto,
            UpdateBuildingDto,
            DepartmentResponse,
            DepartmentsResponse,
            CreateDepartmentDto,
            UpdateDepartmentDto,
            ClassroomResponse,
            ClassroomsResponse,
            CreateClassroomDto,
            UpdateClassroomDto,
            UserResponse,
            UsersResponse,
            CreateUserDto,
            UpdateUserDto,
            RequestResponse,
            RequestsResponse,
            CreateRequestDto,
            UpdateRequestDto,
            ApproveRequestDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and token endpoints"),
        (name = "Buildings", description = "Building management"),
        (name = "Departments", description = "Department management"),
        (name = "Classrooms", description = "Classroom management"),
        (name = "Users", description = "User registration and management"),
        (name = "Requests", description = "Classroom reservation requests and approval"),
    ),
    info(
        title = "Reservo API",
        version = "0.1.0",
        description = "Classroom reservation administration backend built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
