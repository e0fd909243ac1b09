use anyhow::{bail, Result};

/// Device and queue borrowed from the host's graphics context.
pub struct GpuContext {
    pub adapter: wgpu::Adapter,
    pub queue: wgpu::Queue,
    pub device: wgpu::Device,
}

impl GpuContext {
    /// Runs `create` inside a validation error scope and turns a captured validation error into
    /// an `Err`. wgpu otherwise reports these asynchronously through its uncaptured error handler.
    pub fn validated<T>(&self, what: &str, create: impl FnOnce(&wgpu::Device) -> T) -> Result<T> {
        self.scoped(&format!("create {what}"), || Ok(create(&self.device)))
    }

    /// Like `validated`, for work that can also fail on its own. Validation and out-of-memory
    /// errors raised while `body` runs come back as an `Err` instead of reaching the
    /// uncaptured error handler, which panics.
    pub fn scoped<T>(&self, what: &str, body: impl FnOnce() -> Result<T>) -> Result<T> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let result = body();
        let validation = futures::executor::block_on(self.device.pop_error_scope());
        let out_of_memory = futures::executor::block_on(self.device.pop_error_scope());
        if let Some(error) = validation.or(out_of_memory) {
            bail!("Failed to {what}: {error}");
        }
        result
    }

    /// Largest width or height a 2D texture may have on this device.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}
