use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use reservo::reservo_auth::create_access_token;
use reservo::reservo_config::{CorsConfig, JwtConfig};
use reservo::reservo_db::MemoryStore;
use reservo::reservo_db::prelude::*;
use reservo::reservo_models::{
    BuildingId, ClassroomChanges, ClassroomId, CreateBuildingDto, CreateClassroomDto,
    CreateDepartmentDto, DepartmentChanges, DepartmentId, NewRequest, NewUser, RequestId, UserId,
};
use reservo::router::init_router;
use reservo::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub jwt_config: JwtConfig,
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-at-least-32-chars".to_string(),
        access_token_expiry: 1800,
        refresh_token_expiry: 86400,
    }
}

pub fn setup_test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let jwt_config = test_jwt_config();
    let state = AppState {
        store: store.clone(),
        jwt_config: jwt_config.clone(),
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
    };
    TestApp {
        router: init_router(state),
        store,
        jwt_config,
    }
}

#[allow(dead_code)]
impl TestApp {
    pub fn token_for(&self, login: &str) -> String {
        create_access_token(login, &self.jwt_config).unwrap()
    }

    /// Sends a JSON request and returns the status with the decoded body.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn create_user(&self, login: &str, is_admin: bool) -> UserId {
        self.store
            .insert_user(&NewUser {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                login: login.to_string(),
                is_admin,
                registration_date: Utc::now().naive_utc(),
            })
            .await
            .unwrap()
            .id
    }

    pub async fn create_building(&self, name: &str, address: &str) -> BuildingId {
        self.store
            .insert_building(&CreateBuildingDto {
                name: name.to_string(),
                address: address.to_string(),
            })
            .await
            .unwrap()
            .id
    }

    pub async fn create_department(
        &self,
        code_name: &str,
        manager_id: Option<UserId>,
    ) -> DepartmentId {
        let department = self
            .store
            .insert_department(&CreateDepartmentDto {
                full_name: format!("Department of {}", code_name),
                code_name: code_name.to_string(),
            })
            .await
            .unwrap();
        if manager_id.is_some() {
            let changes = DepartmentChanges {
                manager_id: Some(manager_id),
                ..Default::default()
            };
            self.store
                .update_department(department.id, &changes)
                .await
                .unwrap();
        }
        department.id
    }

    /// Inserts a classroom and wires its department and manager.
    pub async fn create_classroom(
        &self,
        name: &str,
        department_id: Option<DepartmentId>,
        manager_id: Option<UserId>,
    ) -> ClassroomId {
        let classroom = self
            .store
            .insert_classroom(&CreateClassroomDto {
                name: name.to_string(),
                floor: 1,
                is_private: false,
            })
            .await
            .unwrap();
        let changes = ClassroomChanges {
            department_id: Some(department_id),
            manager_id: Some(manager_id),
            ..Default::default()
        };
        self.store
            .update_classroom(classroom.id, &changes)
            .await
            .unwrap();
        classroom.id
    }

    pub async fn create_request(&self, author_id: UserId, classroom_id: ClassroomId) -> RequestId {
        let start_date = Utc::now().naive_utc();
        self.store
            .insert_request(
                &NewRequest {
                    start_date,
                    end_date: start_date + chrono::Duration::hours(2),
                    registration_date: start_date,
                    author_id,
                    classroom_id,
                },
                &[],
            )
            .await
            .unwrap()
            .id
    }
}
