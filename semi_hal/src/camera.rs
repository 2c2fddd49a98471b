//! Driver camera start-up.

use parking_lot::Mutex;
use semi_common::collab::CaptureService;
use semi_common::consts::{DEFAULT_CAMERA_ID, DEFAULT_CAMERA_NAME};
use std::sync::Arc;
use tracing::{info, warn};

/// Starts camera streams on a [`CaptureService`].
///
/// Calls are serialized: the capture service is not required to handle
/// concurrent start requests.
pub struct CameraSetup {
    service: Arc<dyn CaptureService>,
    lock: Mutex<()>,
}

impl CameraSetup {
    /// Wrap a capture service.
    pub fn new(service: Arc<dyn CaptureService>) -> Self {
        Self {
            service,
            lock: Mutex::new(()),
        }
    }

    /// Start automatic capture of camera `id` as `name`.
    ///
    /// Returns `false` and logs a warning if the service refuses.
    pub fn setup_camera(&self, name: &str, id: u32) -> bool {
        let _guard = self.lock.lock();
        match self.service.start_capture(name, id) {
            Ok(()) => {
                info!("Camera '{}' ({}) capturing", name, id);
                true
            }
            Err(e) => {
                warn!("Failed to start camera capture ({}, {}): {}", name, id, e);
                false
            }
        }
    }

    /// Start the default camera (`cam0`, id 0).
    pub fn setup_default_camera(&self) -> bool {
        self.setup_camera(DEFAULT_CAMERA_NAME, DEFAULT_CAMERA_ID)
    }
}

impl std::fmt::Debug for CameraSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSetup").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation::SimCamera;
    use semi_common::collab::CaptureError;

    #[test]
    fn test_default_camera() {
        let service = Arc::new(SimCamera::new());
        let setup = CameraSetup::new(service.clone());
        assert!(setup.setup_default_camera());
        assert_eq!(service.streams(), vec![("cam0".to_string(), 0)]);
    }

    #[test]
    fn test_failure_returns_false() {
        let service = Arc::new(SimCamera::failing(CaptureError::Unavailable));
        let setup = CameraSetup::new(service.clone());
        assert!(!setup.setup_camera("front", 1));
        assert!(service.streams().is_empty());
    }

    #[test]
    fn test_concurrent_setup() {
        let service = Arc::new(SimCamera::new());
        let setup = CameraSetup::new(service.clone());
        std::thread::scope(|s| {
            for id in 0..4 {
                let setup = &setup;
                s.spawn(move || setup.setup_camera(&format!("cam{id}"), id));
            }
        });
        assert_eq!(service.streams().len(), 4);
    }
}
