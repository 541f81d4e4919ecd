//! Populates a store with fake buildings, departments, users, classrooms and
//! reservation requests.
//!
//! Data is generated in parallel with Rayon, then written through the domain
//! services one entity at a time. Relationships are assigned round-robin:
//! classroom `i` belongs to building `i % buildings` and department
//! `i % departments`, the first users become department managers, and every
//! user occupies one classroom.
//!
//! ```ignore
//! use reservo::cli::seeder::{SeedConfig, seed_database};
//!
//! let summary = seed_database(store.as_ref(), SeedConfig::default()).await?;
//! ```

pub mod generate;
pub mod models;

pub use models::{SeedConfig, SeedSummary};

use std::time::Instant;

use reservo_core::{AppError, Patch};
use reservo_db::Store;
use reservo_models::{
    BuildingId, ClassroomId, CreateBuildingDto, CreateClassroomDto, CreateDepartmentDto,
    CreateRequestDto, CreateUserDto, DepartmentId, UpdateClassroomDto, UpdateDepartmentDto,
    UpdateUserDto, UserId,
};

use crate::modules::buildings::BuildingService;
use crate::modules::classrooms::ClassroomService;
use crate::modules::departments::DepartmentService;
use crate::modules::requests::RequestService;
use crate::modules::users::UserService;

pub async fn seed_database(store: &dyn Store, config: SeedConfig) -> Result<SeedSummary, AppError> {
    let start_time = Instant::now();

    println!("🌱 Starting database seeding...");
    println!(
        "   - {} buildings, {} departments, {} users, {} classrooms, {} requests",
        config.buildings, config.departments, config.users, config.classrooms, config.requests
    );

    println!("\n🔧 Generating fake data in parallel...");
    let gen_start = Instant::now();
    let buildings = generate::generate_buildings(config.buildings);
    let departments = generate::generate_departments(config.departments);
    let users = generate::generate_users(config.users);
    let classrooms = generate::generate_classrooms(config.classrooms);
    let requests = generate::generate_requests(config.requests, config.users, config.classrooms);
    println!("   ✓ Generated in {:?}", gen_start.elapsed());

    println!("\n💾 Writing entities...");
    let write_start = Instant::now();

    let mut building_ids: Vec<BuildingId> = Vec::with_capacity(buildings.len());
    for seed in buildings {
        let building = BuildingService::create_building(
            store,
            CreateBuildingDto {
                name: seed.name,
                address: seed.address,
            },
        )
        .await?;
        building_ids.push(building.id);
    }

    let mut department_ids: Vec<DepartmentId> = Vec::with_capacity(departments.len());
    for seed in departments {
        let department = DepartmentService::create_department(
            store,
            CreateDepartmentDto {
                full_name: seed.full_name,
                code_name: seed.code_name,
            },
        )
        .await?;
        department_ids.push(department.id);
    }

    let mut user_ids: Vec<UserId> = Vec::with_capacity(users.len());
    let mut logins: Vec<String> = Vec::with_capacity(users.len());
    for seed in users {
        let user = UserService::create_user(
            store,
            CreateUserDto {
                first_name: seed.first_name,
                last_name: seed.last_name,
                login: seed.login,
                is_admin: false,
            },
        )
        .await?;
        user_ids.push(user.id);
        logins.push(user.login);
    }

    let mut classroom_ids: Vec<ClassroomId> = Vec::with_capacity(classrooms.len());
    for seed in classrooms {
        let classroom = ClassroomService::create_classroom(
            store,
            CreateClassroomDto {
                name: seed.name,
                floor: seed.floor,
                is_private: seed.is_private,
            },
        )
        .await?;
        classroom_ids.push(classroom.id);
    }
    println!("   ✓ Entities written in {:?}", write_start.elapsed());

    println!("\n🔗 Linking relationships...");
    let link_start = Instant::now();

    for (i, department_id) in department_ids.iter().enumerate() {
        if let Some(manager_id) = user_ids.get(i) {
            DepartmentService::update_department(
                store,
                *department_id,
                UpdateDepartmentDto {
                    new_manager_id: Patch::Value(*manager_id),
                    ..Default::default()
                },
            )
            .await?;
        }
    }

    for (i, classroom_id) in classroom_ids.iter().enumerate() {
        let update = UpdateClassroomDto {
            new_building_id: pick(&building_ids, i).map_or(Patch::Missing, Patch::Value),
            new_department_id: pick(&department_ids, i).map_or(Patch::Missing, Patch::Value),
            new_manager_id: pick(&user_ids, i * 3 + 1).map_or(Patch::Missing, Patch::Value),
            ..Default::default()
        };
        ClassroomService::update_classroom(store, *classroom_id, update).await?;
    }

    for (i, user_id) in user_ids.iter().enumerate() {
        let update = UpdateUserDto {
            new_department_id: pick(&department_ids, i).map_or(Patch::Missing, Patch::Value),
            new_occupied_classroom_ids: pick(&classroom_ids, i)
                .map_or(Patch::Missing, |classroom_id| Patch::Value(vec![classroom_id])),
            ..Default::default()
        };
        UserService::update_user(store, *user_id, update).await?;
    }
    println!("   ✓ Relationships linked in {:?}", link_start.elapsed());

    println!("\n📅 Creating reservation requests...");
    let mut request_count = 0;
    for seed in requests {
        RequestService::create_request(
            store,
            CreateRequestDto {
                start_date: seed.start_date,
                end_date: seed.end_date,
                author_id: user_ids[seed.author],
                classroom_id: classroom_ids[seed.classroom],
                requesting_user_logins: seed
                    .participants
                    .iter()
                    .map(|&index| logins[index].clone())
                    .collect(),
            },
        )
        .await?;
        request_count += 1;
    }

    let summary = SeedSummary {
        buildings: building_ids.len(),
        departments: department_ids.len(),
        users: user_ids.len(),
        classrooms: classroom_ids.len(),
        requests: request_count,
    };
    println!(
        "\n✅ Seeding complete! Created {} buildings, {} departments, {} users, {} classrooms, {} requests in {:?}",
        summary.buildings,
        summary.departments,
        summary.users,
        summary.classrooms,
        summary.requests,
        start_time.elapsed()
    );

    Ok(summary)
}

fn pick<T: Copy>(ids: &[T], index: usize) -> Option<T> {
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()])
    }
}
