use chrono::NaiveDateTime;

pub struct BuildingSeed {
    pub name: String,
    pub address: String,
}

pub struct DepartmentSeed {
    pub full_name: String,
    pub code_name: String,
}

pub struct UserSeed {
    pub first_name: String,
    pub last_name: String,
    pub login: String,
}

pub struct ClassroomSeed {
    pub name: String,
    pub floor: i32,
    pub is_private: bool,
}

/// Indices point into the seeded user and classroom lists.
pub struct RequestSeed {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub author: usize,
    pub classroom: usize,
    pub participants: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub buildings: usize,
    pub departments: usize,
    pub users: usize,
    pub classrooms: usize,
    pub requests: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            buildings: 3,
            departments: 4,
            users: 40,
            classrooms: 20,
            requests: 60,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub buildings: usize,
    pub departments: usize,
    pub users: usize,
    pub classrooms: usize,
    pub requests: usize,
}
