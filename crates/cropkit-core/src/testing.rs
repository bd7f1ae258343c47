//! Test doubles shared by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::Cursor;
use std::rc::Rc;

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};

use crate::session::{PreviewError, PreviewHandle, PreviewProvider};
use crate::upload::{ObjectStorage, RawStorageError, UploadOptions};
use crate::validate::SelectedFile;

/// A PNG-encoded gradient wrapped as a selected file.
pub(crate) fn png_file(width: u32, height: u32) -> SelectedFile {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    SelectedFile::new("test.png", "image/png", buffer.into_inner())
}

/// Counts preview acquisitions and releases.
#[derive(Debug, Clone, Default)]
pub(crate) struct CountingPreviews {
    acquired: Rc<Cell<usize>>,
    released: Rc<Cell<usize>>,
}

impl CountingPreviews {
    pub(crate) fn acquired(&self) -> usize {
        self.acquired.get()
    }

    pub(crate) fn released(&self) -> usize {
        self.released.get()
    }
}

impl PreviewProvider for CountingPreviews {
    fn acquire(&self, _bytes: &[u8], _mime_type: &str) -> Result<PreviewHandle, PreviewError> {
        self.acquired.set(self.acquired.get() + 1);
        let released = self.released.clone();
        Ok(PreviewHandle::new(
            format!("blob:test/{}", self.acquired.get()),
            move |_| released.set(released.get() + 1),
        ))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct StoredObject {
    pub bucket: String,
    pub path: String,
    pub bytes: Bytes,
    pub options: UploadOptions,
}

/// In-memory storage with scripted failures.
#[derive(Debug, Default)]
pub(crate) struct MemoryStorage {
    objects: RefCell<Vec<StoredObject>>,
    failures: RefCell<VecDeque<RawStorageError>>,
}

impl MemoryStorage {
    /// Make the next upload fail with `error`.
    pub(crate) fn fail_next(&self, error: RawStorageError) {
        self.failures.borrow_mut().push_back(error);
    }

    pub(crate) fn uploads(&self) -> Vec<StoredObject> {
        self.objects.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ObjectStorage for MemoryStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Bytes,
        options: &UploadOptions,
    ) -> Result<String, RawStorageError> {
        if let Some(error) = self.failures.borrow_mut().pop_front() {
            return Err(error);
        }
        self.objects.borrow_mut().push(StoredObject {
            bucket: bucket.to_string(),
            path: path.to_string(),
            bytes,
            options: options.clone(),
        });
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("https://storage.test/{bucket}/{path}")
    }
}
