mod helpers;

use helpers::{avatar_registry, png, CountingUploader, EventLog};

use affix_core::{MemoryFileStore, MemoryUploader, MountOptions};
use affix_mount::{AttributeAccessor, Mountable, Stage};
use affix_record::{MemoryRecord, MemoryStore, RecordStore};

#[tokio::test]
async fn test_remount_does_not_stack_callbacks() {
    let files = MemoryFileStore::new();
    let events = EventLog::default();
    let mut registry = avatar_registry::<MemoryRecord>(&files, &events, MountOptions::default());

    // Mount the same column again, as a config reload would.
    {
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
            MountOptions::default(),
        );
    }
    assert_eq!(registry.callbacks().count(Stage::BeforeSave), 1);
    assert_eq!(registry.callbacks().count(Stage::AfterSave), 1);
    assert_eq!(registry.callbacks().count(Stage::AfterDestroy), 1);

    let store = MemoryStore::new(registry);
    let mut record = store.build();
    store
        .assign(&mut record, "avatar", png("avatar.png"))
        .await
        .unwrap();
    store.save(&mut record).await.unwrap();

    assert_eq!(events.count_of("store"), 1, "one store call per save");
    assert_eq!(files.len().await, 1);
}

#[tokio::test]
async fn test_remount_swaps_uploader_definition() {
    let files = MemoryFileStore::new();
    let events = EventLog::default();
    let mut registry = avatar_registry::<MemoryRecord>(&files, &events, MountOptions::default());

    // Replace the png/jpg mount with a gif-only one.
    {
        let files = files.clone();
        let events = events.clone();
        registry.mount(
            "avatar",
            move || {
                Box::new(CountingUploader::new(
                    MemoryUploader::new(files.clone()).allow_extensions(["gif"]),
                    events.clone(),
                ))
            },
            MountOptions::default(),
        );
    }
    let store = MemoryStore::new(registry);

    let mut record = store.build();
    store
        .assign(&mut record, "avatar", png("party.gif"))
        .await
        .unwrap();
    store.save(&mut record).await.unwrap();
    assert_eq!(record.read_attribute("avatar").as_deref(), Some("party.gif"));

    let mut other = store.build();
    store
        .assign(&mut other, "avatar", png("photo.png"))
        .await
        .unwrap();
    store.save(&mut other).await.unwrap();
    assert!(
        other.read_attribute("avatar").is_none(),
        "png is rejected by the replacement mount"
    );
}

#[tokio::test]
async fn test_remount_drops_stale_validators() {
    let files = MemoryFileStore::new();
    let events = EventLog::default();
    let mut registry = avatar_registry::<MemoryRecord>(
        &files,
        &events,
        MountOptions {
            validate_integrity: true,
            ..MountOptions::default()
        },
    );

    // Remount without validation: the old integrity validator must go away.
    {
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
            MountOptions::default(),
        );
    }
    let store = MemoryStore::new(registry);
    let mut record = store.build();

    store
        .assign(&mut record, "avatar", png("resume.exe"))
        .await
        .unwrap();
    store.save(&mut record).await.unwrap();

    assert!(record.errors().is_empty());
    assert_eq!(store.count().await, 1);
}
