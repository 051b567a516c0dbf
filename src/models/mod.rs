pub mod logistic;
pub mod model_io;

pub use logistic::LogisticModel;
pub use model_io::{LocalModelSource, SavedModel};
