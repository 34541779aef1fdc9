pub mod collection;
pub mod errors;
pub mod models;
pub mod oracle;
pub mod reporting;
pub mod scanner;
pub mod transport;

// Re-export commonly used items
pub use collection::*;
pub use errors::*;
pub use models::*;
pub use oracle::*;
pub use reporting::*;
pub use scanner::*;
pub use transport::*;
