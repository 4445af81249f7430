mod repository;

pub use repository::LegacyStorageRepository;
