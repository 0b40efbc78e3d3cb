pub mod memory;
pub mod repository;
pub mod repository_sqlx;

pub use memory::InMemoryPriceRepository;
pub use repository::PriceRepository;
pub use repository_sqlx::SqlxPriceRepository;
