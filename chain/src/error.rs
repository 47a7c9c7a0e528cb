//! Chain-store error taxonomy.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("height {height} is below the chain's minimum kept height {min_height}")]
    HeightBelowWindow { height: u64, min_height: u64 },

    #[error("height {height} is above the chain's maximum kept height")]
    HeightAboveWindow { height: u64 },

    #[error("no chain node found for miner {miner} at height {height}")]
    NodeNotFound { miner: rblocksim_core::NodeId, height: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
