//! Multi-tier synchronization: storage contracts and the reconciliation engine.

mod data_service;
mod persist_queue;
mod photo_id_repair;
mod stores;
mod sync_model;

pub use data_service::*;
pub use persist_queue::Targets;
pub use photo_id_repair::repair_duplicate_photo_ids;
pub use stores::*;
pub use sync_model::*;
