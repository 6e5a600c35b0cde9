pub mod forward;
pub mod request;
pub mod response;
pub mod routes;

pub use forward::{ForwardError, HttpUpstream, Upstream};
pub use routes::{create_router, AppState};
