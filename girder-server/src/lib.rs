pub mod health;
pub mod response;
pub mod router;
pub mod serve;

pub use health::Health;
pub use response::Problem;
pub use router::{Module, build_router};
pub use serve::{Server, ServerHandle};
