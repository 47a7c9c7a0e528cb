//! Network topology, latency, and gossip propagation.

pub mod gossip;
pub mod topology;

pub use gossip::gossip_targets;
pub use topology::{generate_peer_lists, transmission_delay, Regions};
