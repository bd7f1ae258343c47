//! Scoped preview resources.
//!
//! On the web a preview is an object URL that must be revoked, elsewhere it
//! may be a temp file or a texture. A [`PreviewHandle`] owns one such resource
//! and releases it exactly once when dropped, so every exit path (upload,
//! failure, cancel, file replacement, early return) frees it.

use std::fmt;

use thiserror::Error;

type ReleaseFn = Box<dyn FnOnce(&str)>;

/// Exclusive owner of a locally generated preview.
pub struct PreviewHandle {
    url: String,
    release: Option<ReleaseFn>,
}

impl PreviewHandle {
    /// Wrap a preview URL with the function that frees it.
    pub fn new(url: impl Into<String>, release: impl FnOnce(&str) + 'static) -> Self {
        Self {
            url: url.into(),
            release: Some(Box::new(release)),
        }
    }

    /// A handle with nothing to release.
    pub fn detached(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            release: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            log::debug!("releasing preview {}", self.url);
            release(&self.url);
        }
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("url", &self.url)
            .field("pending_release", &self.release.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to create preview: {0}")]
pub struct PreviewError(pub String);

/// Creates preview handles for selected files.
pub trait PreviewProvider {
    fn acquire(&self, bytes: &[u8], mime_type: &str) -> Result<PreviewHandle, PreviewError>;
}

/// Provider for headless callers that never display a preview.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreview;

impl PreviewProvider for NoPreview {
    fn acquire(&self, _bytes: &[u8], _mime_type: &str) -> Result<PreviewHandle, PreviewError> {
        Ok(PreviewHandle::detached(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_release_on_drop_exactly_once() {
        let released = Rc::new(RefCell::new(Vec::new()));
        let log = released.clone();
        let handle = PreviewHandle::new("blob:1", move |url| log.borrow_mut().push(url.to_string()));

        assert_eq!(handle.url(), "blob:1");
        drop(handle);
        assert_eq!(*released.borrow(), vec!["blob:1".to_string()]);
    }

    #[test]
    fn test_release_on_take() {
        let released = Rc::new(RefCell::new(0));
        let count = released.clone();
        let mut slot = Some(PreviewHandle::new("blob:2", move |_| *count.borrow_mut() += 1));

        slot.take();
        slot.take();
        assert_eq!(*released.borrow(), 1);
    }

    #[test]
    fn test_detached_handle() {
        let handle = PreviewHandle::detached("file:///tmp/x.png");
        assert!(format!("{handle:?}").contains("pending_release: false"));
    }

    #[test]
    fn test_no_preview_provider() {
        let handle = NoPreview.acquire(&[1, 2, 3], "image/png").unwrap();
        assert_eq!(handle.url(), "");
    }
}
