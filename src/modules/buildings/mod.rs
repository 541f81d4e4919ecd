pub mod controller;
pub mod router;
pub mod service;

pub use router::init_buildings_router;
pub use service::BuildingService;
