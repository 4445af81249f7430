mod model;
mod repository;

pub use model::AppDataDB;
pub use repository::LocalCacheRepository;
