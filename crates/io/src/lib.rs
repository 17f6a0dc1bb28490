// File I/O: the Burcat corpus, the PrIMe warehouse mirror, and the
// identifier index cache.

pub mod burcat;
pub mod cache;
pub mod coefficients;
pub mod error;
pub mod index;
pub mod prime;
pub mod xml;

pub use burcat::BulkCorpus;
pub use cache::CacheStore;
pub use error::IoError;
pub use index::IdentifierIndex;
pub use prime::Warehouse;
