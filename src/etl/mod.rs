pub mod merge;

pub use merge::{merge_datasets, HeartRecord, MergeSummary};
