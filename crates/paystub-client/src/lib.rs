pub mod session;

pub use session::{Credentials, HttpTransport, Session};
