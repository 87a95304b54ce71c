pub mod batch;
pub mod ranker;

pub use batch::{BatchOutcome, BatchPolicy, BatchRunner, BatchStatus, Strategy};
pub use ranker::rank;
