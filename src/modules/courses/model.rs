pub use schoolhouse_models::courses::*;
