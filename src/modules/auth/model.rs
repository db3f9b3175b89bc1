pub use schoolhouse_auth::Claims;
pub use schoolhouse_models::accounts::*;
