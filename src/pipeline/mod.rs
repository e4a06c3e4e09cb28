pub mod builder;
pub mod defaults;
pub mod model_runtime;
pub mod runtime;
pub mod traits;
