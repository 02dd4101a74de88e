pub mod error;
pub mod model;

pub use error::DaoError;
pub use model::{Role, User};
