pub mod router;

pub use router::{DrainSummary, Router, RouterOptions};
