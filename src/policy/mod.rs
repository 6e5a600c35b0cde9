pub mod loader;

pub use loader::{load_policy, validate_policy, PolicyError, PolicyLoader};
