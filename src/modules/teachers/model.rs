pub use schoolhouse_models::teachers::*;
