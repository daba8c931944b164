pub mod channel;
pub mod ring_buffer;
pub mod rolling;
