pub mod crawler;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod result;

pub use crawler::Crawler;
pub use error::ScanError;
pub use fetch::{FetchGate, FetchedPage};
pub use result::Discovery;
