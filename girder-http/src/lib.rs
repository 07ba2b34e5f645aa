pub mod error;
pub mod transport;
pub mod validator;

pub use error::ClientError;
pub use transport::{Client, ClientBuilder, ReqwestTransport, Transport};
pub use validator::{AllowList, StatusValidator};
