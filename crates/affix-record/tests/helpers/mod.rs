#![allow(dead_code)]

//! Shared fixtures for record store tests.

use std::sync::{Arc, Mutex};

use affix_core::{
    MemoryFileStore, MemoryUploader, MountOptions, Processor, UploadResult, UploadedFile, Uploader,
};
use affix_mount::{MountRegistry, Mountable};
use async_trait::async_trait;
use bytes::Bytes;

/// Shared log of uploader calls, for asserting ordering and counts.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count_of(&self, event: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|logged| *logged == event)
            .count()
    }

    pub fn position_of(&self, event: &str) -> Option<usize> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .position(|logged| logged == event)
    }
}

/// Uploader wrapper that records every lifecycle call.
pub struct CountingUploader {
    inner: MemoryUploader,
    events: EventLog,
}

impl CountingUploader {
    pub fn new(inner: MemoryUploader, events: EventLog) -> Self {
        Self { inner, events }
    }
}

#[async_trait]
impl Uploader for CountingUploader {
    async fn cache(&mut self, file: UploadedFile) -> UploadResult<()> {
        self.events.push(format!("cache:{}", file.filename()));
        self.inner.cache(file).await
    }

    fn identifier(&self) -> Option<String> {
        self.events.push("identifier");
        self.inner.identifier()
    }

    async fn store(&mut self) -> UploadResult<()> {
        self.events.push("store");
        self.inner.store().await
    }

    async fn remove(&mut self) -> UploadResult<()> {
        self.events.push("remove");
        self.inner.remove().await
    }

    async fn retrieve(&mut self, identifier: &str) -> UploadResult<()> {
        self.events.push(format!("retrieve:{identifier}"));
        self.inner.retrieve(identifier).await
    }
}

/// Registry with a counting uploader mounted on `avatar`, restricted to
/// png/jpg files.
pub fn avatar_registry<R: Mountable + 'static>(
    files: &MemoryFileStore,
    events: &EventLog,
    options: MountOptions,
) -> MountRegistry<R> {
    let mut registry = MountRegistry::new();
    let files = files.clone();
    let events = events.clone();
    registry.mount(
        "avatar",
        move || {
            Box::new(CountingUploader::new(
                MemoryUploader::new(files.clone()).allow_extensions(["png", "jpg"]),
                events.clone(),
            ))
        },
        options,
    );
    registry
}

pub fn png(name: &str) -> UploadedFile {
    UploadedFile::new(name, Bytes::from_static(b"\x89PNG test bytes"))
}

pub fn failing_processor(message: &'static str) -> Processor {
    Arc::new(move |_file: &UploadedFile| Err(message.to_string()))
}
