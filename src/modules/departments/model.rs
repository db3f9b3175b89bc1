pub use schoolhouse_models::departments::*;
