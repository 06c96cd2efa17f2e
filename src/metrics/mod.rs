pub mod collector;
pub mod ingestor;
pub mod ring_buffer;
pub mod sample;
pub mod store;
