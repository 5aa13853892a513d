//! Notes collection: remote operations and the reconciled local view.

mod cache;
mod repository;

pub use cache::NotesCache;
pub use repository::NotesRepository;
