//! Model placement for local inference.

pub mod device;

pub use device::Device;
