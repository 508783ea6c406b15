pub mod award;
pub mod bid;
pub mod job;

pub use award::Award;
pub use bid::Bid;
pub use job::Job;
