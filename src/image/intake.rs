//! File intake: the current selection and its preview handle.

use crate::image::types::{ImageSource, SelectedImage};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    live: HashSet<u64>,
    released: u64,
}

/// Issues preview handles and tracks which are still alive.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl PreviewRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a preview handle for the given image.
    pub fn acquire(&self, image: &SelectedImage) -> PreviewHandle {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.next_id += 1;
        let id = inner.next_id;
        inner.live.insert(id);

        let url = match image.source() {
            ImageSource::File(path) => format!("file://{}", path.display()),
            ImageSource::Bytes(_) => format!("preview://{id}/{}", image.display_name()),
        };
        tracing::debug!(id, url = %url, "acquired preview handle");

        PreviewHandle {
            id,
            url,
            registry: Arc::clone(&self.inner),
        }
    }

    /// Number of handles not yet released.
    pub fn live(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .live
            .len()
    }

    /// Number of handles released so far.
    pub fn released(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .released
    }
}

/// Display handle for the original image. Released on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    url: String,
    registry: Arc<Mutex<RegistryInner>>,
}

impl PreviewHandle {
    /// Returns the handle id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the display URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        let mut inner = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.live.remove(&self.id) {
            inner.released += 1;
            tracing::debug!(id = self.id, "released preview handle");
        }
    }
}

/// Holds the currently selected image together with its preview.
#[derive(Debug, Default)]
pub struct FileIntake {
    registry: PreviewRegistry,
    current: Option<(SelectedImage, PreviewHandle)>,
}

impl FileIntake {
    /// Creates an intake issuing previews from the given registry.
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            registry,
            current: None,
        }
    }

    /// Replaces the selection. `None` clears it.
    ///
    /// The previous preview is released before a new one is issued.
    pub fn select(&mut self, image: Option<SelectedImage>) {
        drop(self.current.take());
        self.current = image.map(|image| {
            let preview = self.registry.acquire(&image);
            (image, preview)
        });
    }

    /// Returns the selected image, if any.
    pub fn image(&self) -> Option<&SelectedImage> {
        self.current.as_ref().map(|(image, _)| image)
    }

    /// Returns the preview of the selected image, if any.
    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.current.as_ref().map(|(_, preview)| preview)
    }

    /// Returns the registry backing this intake.
    pub fn registry(&self) -> &PreviewRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> SelectedImage {
        SelectedImage::from_bytes(b"bytes".to_vec(), "image/png", name).unwrap()
    }

    #[test]
    fn test_select_issues_preview() {
        let mut intake = FileIntake::default();
        intake.select(Some(image("dog.png")));

        assert_eq!(intake.image().unwrap().display_name(), "dog.png");
        assert!(intake.preview().unwrap().url().starts_with("preview://"));
        assert_eq!(intake.registry().live(), 1);
        assert_eq!(intake.registry().released(), 0);
    }

    #[test]
    fn test_replacing_releases_previous_exactly_once() {
        let mut intake = FileIntake::default();
        intake.select(Some(image("dog.png")));
        let first_id = intake.preview().unwrap().id();

        intake.select(Some(image("cat.png")));
        assert_eq!(intake.registry().live(), 1);
        assert_eq!(intake.registry().released(), 1);
        assert_ne!(intake.preview().unwrap().id(), first_id);

        intake.select(Some(image("bird.png")));
        assert_eq!(intake.registry().live(), 1);
        assert_eq!(intake.registry().released(), 2);
    }

    #[test]
    fn test_clear_releases_preview() {
        let mut intake = FileIntake::default();
        intake.select(Some(image("dog.png")));
        intake.select(None);

        assert!(intake.image().is_none());
        assert!(intake.preview().is_none());
        assert_eq!(intake.registry().live(), 0);
        assert_eq!(intake.registry().released(), 1);

        // Clearing an empty intake releases nothing.
        intake.select(None);
        assert_eq!(intake.registry().released(), 1);
    }

    #[test]
    fn test_teardown_releases_preview() {
        let registry = PreviewRegistry::new();
        {
            let mut intake = FileIntake::new(registry.clone());
            intake.select(Some(image("dog.png")));
            assert_eq!(registry.live(), 1);
        }
        assert_eq!(registry.live(), 0);
        assert_eq!(registry.released(), 1);
    }

    #[test]
    fn test_file_preview_url() {
        let mut intake = FileIntake::default();
        intake.select(Some(SelectedImage::from_path("/tmp/dog.png").unwrap()));
        assert_eq!(intake.preview().unwrap().url(), "file:///tmp/dog.png");
    }
}
