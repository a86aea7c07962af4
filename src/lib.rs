pub mod classifier;
pub mod config;
pub mod flattener;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod storage;
pub mod upsert;
pub mod utils;
pub mod vocab;
