use log::{debug, error, warn};

use super::driver::types::{Backend, BackendFlags};
use super::driver::Driver;
use super::error::{GPUError, Result};

/// Case-insensitive backend name that overrides every other selection rule.
pub const BACKEND_ENV: &str = "GPUCMD_BACKEND";
/// Set to `1` to force debug mode on every device.
pub const DEBUG_ENV: &str = "GPUCMD_DEBUG";

/// Cheap check that the backend can run on this machine.
pub type PrepareFn = fn() -> bool;
/// Construct the backend's driver. The flag enables debug validation.
pub type CreateFn = fn(debug_mode: bool) -> Result<Box<dyn Driver>>;

/// One entry of a backend registry.
#[derive(Clone, Copy)]
pub struct BackendEntry {
    pub name: &'static str,
    pub backend: Backend,
    pub prepare: PrepareFn,
    pub create: CreateFn,
}

impl std::fmt::Debug for BackendEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendEntry")
            .field("name", &self.name)
            .field("backend", &self.backend)
            .finish()
    }
}

/// Backends compiled into this crate, in selection order.
pub static BACKENDS: &[BackendEntry] = &[super::null::NULL_BACKEND];

/// Current value of [`BACKEND_ENV`]. An empty value counts as unset.
pub fn backend_override() -> Option<String> {
    std::env::var(BACKEND_ENV).ok().filter(|name| !name.is_empty())
}

/// `true` when [`DEBUG_ENV`] is `1`.
pub fn debug_forced() -> bool {
    std::env::var(DEBUG_ENV).map(|v| v == "1").unwrap_or(false)
}

/// Picks one backend out of a registry.
///
/// Order: an explicit override is tried alone, then every entry matching the
/// preferred mask, then every entry. The first entry whose probe succeeds
/// wins.
pub struct BackendSelector<'a> {
    registry: &'a [BackendEntry],
    override_name: Option<String>,
}

impl Default for BackendSelector<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendSelector<'static> {
    /// Built-in registry with the override taken from the environment.
    pub fn new() -> Self {
        BackendSelector::with_registry(BACKENDS)
    }
}

impl<'a> BackendSelector<'a> {
    pub fn with_registry(registry: &'a [BackendEntry]) -> Self {
        Self {
            registry,
            override_name: backend_override(),
        }
    }

    /// Replace the environment override.
    pub fn with_override(mut self, name: Option<&str>) -> Self {
        self.override_name = name.filter(|n| !n.is_empty()).map(str::to_string);
        self
    }

    pub fn registry(&self) -> &'a [BackendEntry] {
        self.registry
    }

    pub fn select(&self, preferred: BackendFlags) -> Option<&'a BackendEntry> {
        if let Some(name) = &self.override_name {
            let chosen = self
                .registry
                .iter()
                .find(|entry| entry.name.eq_ignore_ascii_case(name) && (entry.prepare)());
            if chosen.is_none() {
                error!("{} {} unsupported!", BACKEND_ENV, name);
            }
            return chosen;
        }

        if !preferred.is_empty() {
            let chosen = self
                .registry
                .iter()
                .find(|entry| preferred.intersects(entry.backend.flag()) && (entry.prepare)());
            if chosen.is_some() {
                return chosen;
            }
            warn!("No preferred gpucmd backend found!");
        }

        let chosen = self.registry.iter().find(|entry| (entry.prepare)());
        if chosen.is_none() {
            error!("No supported gpucmd backend found!");
        }
        chosen
    }

    /// Select a backend and instantiate its driver.
    pub fn create_driver(
        &self,
        preferred: BackendFlags,
        debug_mode: bool,
    ) -> Result<(Backend, Box<dyn Driver>)> {
        let selected = self.select(preferred).ok_or(GPUError::NoBackend)?.backend;

        let mut last_err = GPUError::NoBackend;
        for entry in self.registry.iter().filter(|e| e.backend == selected) {
            match (entry.create)(debug_mode) {
                Ok(driver) => {
                    debug!("Created {} device", entry.name);
                    return Ok((entry.backend, driver));
                }
                Err(err) => {
                    warn!("Failed to create {} device: {}", entry.name, err);
                    last_err = err;
                }
            }
        }

        Err(last_err)
    }
}

/// Backend that [`Device::new`](crate::Device::new) would pick.
pub fn select_backend(preferred: BackendFlags) -> Option<Backend> {
    BackendSelector::new().select(preferred).map(|e| e.backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yes() -> bool {
        true
    }

    fn no() -> bool {
        false
    }

    fn unavailable(_: bool) -> Result<Box<dyn Driver>> {
        Err(GPUError::DeviceCreation("unavailable".to_string()))
    }

    const fn entry(name: &'static str, backend: Backend, prepare: PrepareFn) -> BackendEntry {
        BackendEntry {
            name,
            backend,
            prepare,
            create: unavailable,
        }
    }

    static REGISTRY: &[BackendEntry] = &[
        entry("vulkan", Backend::Vulkan, no),
        entry("d3d11", Backend::D3D11, yes),
        entry("metal", Backend::Metal, yes),
    ];

    fn selector(name: Option<&str>) -> BackendSelector<'static> {
        BackendSelector::with_registry(REGISTRY).with_override(name)
    }

    #[test]
    fn override_is_exclusive() {
        let chosen = selector(Some("METAL")).select(BackendFlags::D3D11);
        assert_eq!(chosen.map(|e| e.backend), Some(Backend::Metal));

        assert!(selector(Some("vulkan")).select(BackendFlags::empty()).is_none());
        assert!(selector(Some("opengl")).select(BackendFlags::all()).is_none());
    }

    #[test]
    fn preferred_then_registry_order() {
        let chosen = selector(None).select(BackendFlags::METAL);
        assert_eq!(chosen.map(|e| e.backend), Some(Backend::Metal));

        let chosen = selector(None).select(BackendFlags::VULKAN);
        assert_eq!(chosen.map(|e| e.backend), Some(Backend::D3D11));

        let chosen = selector(None).select(BackendFlags::empty());
        assert_eq!(chosen.map(|e| e.backend), Some(Backend::D3D11));
    }

    #[test]
    fn creation_failure_propagates() {
        let err = selector(None)
            .create_driver(BackendFlags::empty(), false)
            .err();
        assert!(matches!(err, Some(GPUError::DeviceCreation(_))));

        let empty: &[BackendEntry] = &[];
        let err = BackendSelector::with_registry(empty)
            .with_override(None)
            .create_driver(BackendFlags::empty(), false)
            .err();
        assert!(matches!(err, Some(GPUError::NoBackend)));
    }
}
