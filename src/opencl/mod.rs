//! Модуль для работы с OpenCL
//!
//! Содержит низкоуровневые привязки и безопасные обертки для OpenCL

pub mod api;
pub mod bindings;
pub mod resource;
pub mod types;
mod utils;

pub use api::{ClApi, KernelArg, OpenCl};
pub use resource::{CommandQueue, Context, DeviceBuffer, Kernel, Program};
