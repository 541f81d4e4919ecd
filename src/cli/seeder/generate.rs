use chrono::{Duration, NaiveTime, Utc};
use fake::Fake;
use fake::faker::address::en::*;
use fake::faker::boolean::en::Boolean;
use fake::faker::company::en::Industry;
use fake::faker::name::en::*;
use rayon::prelude::*;

use super::models::{BuildingSeed, ClassroomSeed, DepartmentSeed, RequestSeed, UserSeed};

fn clip(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

pub fn generate_buildings(count: usize) -> Vec<BuildingSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let city: String = CityName().fake();
            let street: String = StreetName().fake();
            let number: String = BuildingNumber().fake();
            BuildingSeed {
                name: clip(&format!("Hall {} {}", i + 1, city), 50),
                address: clip(&format!("{} {}, {}", number, street, city), 100),
            }
        })
        .collect()
}

pub fn generate_departments(count: usize) -> Vec<DepartmentSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let industry: String = Industry().fake();
            DepartmentSeed {
                full_name: clip(&format!("Department {} of {}", i + 1, industry), 100),
                code_name: format!("D{:03}", i + 1),
            }
        })
        .collect()
}

/// Logins are `first.last<n>`, lowercased and stripped to ASCII alphanumerics.
pub fn generate_users(count: usize) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let login: String = format!(
                "{}.{}{}",
                clip(&first_name, 20),
                clip(&last_name, 20),
                i + 1
            )
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
            .collect();
            UserSeed {
                first_name,
                last_name,
                login,
            }
        })
        .collect()
}

pub fn generate_classrooms(count: usize) -> Vec<ClassroomSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let floor: i32 = (0..5).fake();
            ClassroomSeed {
                name: format!("Room {}-{:02}", floor, i + 1),
                floor,
                is_private: Boolean(20).fake(),
            }
        })
        .collect()
}

/// Reservations fall within the next two months, during working hours.
pub fn generate_requests(count: usize, users: usize, classrooms: usize) -> Vec<RequestSeed> {
    if users == 0 || classrooms == 0 {
        return Vec::new();
    }
    let today = Utc::now().date_naive().and_time(NaiveTime::MIN);

    (0..count)
        .into_par_iter()
        .map(|_| {
            let day: i64 = (1..60).fake();
            let hour: i64 = (8..18).fake();
            let length: i64 = (1..4).fake();
            let start_date = today + Duration::days(day) + Duration::hours(hour);
            let participant_count: usize = (0..4).fake();
            RequestSeed {
                start_date,
                end_date: start_date + Duration::hours(length),
                author: (0..users).fake(),
                classroom: (0..classrooms).fake(),
                participants: (0..participant_count)
                    .map(|_| (0..users).fake())
                    .collect(),
            }
        })
        .collect()
}
