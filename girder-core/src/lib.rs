pub mod app;
pub mod error;
pub mod settings;

pub use app::App;
pub use error::GirderError;
pub use settings::Settings;
