//! HAL driver implementations.
//!
//! - [`simulation`] - Software simulation driver for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Give each device type an `open(&PortAllocator, ...)` style constructor
//! 3. Add the device types to the categories in [`crate::devices`]

pub mod simulation;
