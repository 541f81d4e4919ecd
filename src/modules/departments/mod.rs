pub mod controller;
pub mod router;
pub mod service;

pub use router::init_departments_router;
pub use service::DepartmentService;
