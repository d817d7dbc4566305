use crate::pollen::config::ConfigEntry;
use crate::pollen::coordinator::{PollenCoordinator, SensorSink};
use crate::pollen::error::PollenError;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

struct LoadedEntry {
    coordinator: Arc<PollenCoordinator>,
    task: JoinHandle<()>,
}

impl Drop for LoadedEntry {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The loaded pollen entries, keyed by entry id.
///
/// Dropping the registry stops every poll loop.
#[derive(Default)]
pub struct EntryRegistry {
    entries: HashMap<String, LoadedEntry>,
}

impl EntryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the coordinator for `entry`, runs its first refresh, publishes
    /// the initial sensors and starts polling.
    ///
    /// Sensors are only created once translations are available as well;
    /// until then the poll loop keeps retrying them on every refresh.
    /// Nothing is stored if the first refresh fails. An entry that is already
    /// loaded under the same id is replaced.
    pub async fn setup(
        &mut self,
        entry: &ConfigEntry,
        sink: Arc<dyn SensorSink>,
    ) -> Result<Arc<PollenCoordinator>, PollenError> {
        debug!("Setting up entry {}", entry.entry_id);
        let coordinator = Arc::new(PollenCoordinator::new(
            entry.entry_id.clone(),
            entry.effective_config(),
        )?);
        coordinator.refresh().await?;
        coordinator.publish(sink.as_ref()).await;

        let task = coordinator.clone().spawn(sink);
        let loaded = LoadedEntry {
            coordinator: coordinator.clone(),
            task,
        };
        if self.entries.insert(entry.entry_id.clone(), loaded).is_some() {
            debug!("Replaced running entry {}", entry.entry_id);
        }
        Ok(coordinator)
    }

    /// Stops and removes an entry. Returns `false` if it was not loaded.
    pub fn unload(&mut self, entry_id: &str) -> bool {
        debug!("Unloading entry {}", entry_id);
        if self.entries.remove(entry_id).is_some() {
            true
        } else {
            warn!("Attempted to unload entry {} that was not loaded", entry_id);
            false
        }
    }

    /// Unloads and sets up `entry` again, e.g. after its options changed.
    pub async fn reload(
        &mut self,
        entry: &ConfigEntry,
        sink: Arc<dyn SensorSink>,
    ) -> Result<Arc<PollenCoordinator>, PollenError> {
        self.unload(&entry.entry_id);
        self.setup(entry, sink).await
    }

    pub fn get(&self, entry_id: &str) -> Option<Arc<PollenCoordinator>> {
        self.entries.get(entry_id).map(|e| e.coordinator.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pollen::config::PollenConfig;
    use crate::pollen::coordinator::tests::{pollen_api, FakeApi, RecordingSink};
    use crate::pollen::sensor::{SensorSnapshot, STATE_UNAVAILABLE};
    use crate::test_support::serve;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    async fn entry(api: Arc<FakeApi>, id: &str) -> ConfigEntry {
        let base = serve(pollen_api(api)).await;
        ConfigEntry::new(
            id,
            PollenConfig::builder()
                .base_url(format!("{base}/api"))
                .build(),
        )
    }

    #[tokio::test]
    async fn test_setup_publishes_and_stores() -> Result<(), PollenError> {
        let mut registry = EntryRegistry::new();
        let sink = Arc::new(RecordingSink::default());
        let entry = entry(Arc::default(), "a").await;

        let coordinator = registry.setup(&entry, sink.clone()).await?;
        assert!(coordinator.is_ready().await);
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.get("a").unwrap(), &coordinator));

        let published = sink.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].1[0].entity_id, "sensor.pollen_birch");
        Ok(())
    }

    async fn wait_for_publishes(sink: &RecordingSink, count: usize) -> Vec<SensorSnapshot> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some((_, sensors)) = sink.published.lock().unwrap().get(count - 1) {
                    return sensors.clone();
                }
                sink.notify.notified().await;
            }
        })
        .await
        .expect("sensors were not published")
    }

    #[tokio::test]
    async fn test_inactive_pollen_keeps_published_sensor() -> Result<(), PollenError> {
        let api = Arc::new(FakeApi::default());
        let mut registry = EntryRegistry::new();
        let sink = Arc::new(RecordingSink::default());
        let coordinator = registry
            .setup(&entry(api.clone(), "a").await, sink.clone())
            .await?;

        api.birch_inactive.store(true, Ordering::SeqCst);
        coordinator.request_refresh();
        let sensors = wait_for_publishes(&sink, 2).await;

        let birch = sensors
            .iter()
            .find(|s| s.entity_id == "sensor.pollen_birch")
            .expect("birch sensor dropped");
        assert_eq!(birch.state, STATE_UNAVAILABLE);
        assert_eq!(birch.attributes, None);
        assert_eq!(sensors.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_setup_without_translations_defers_sensors() -> Result<(), PollenError> {
        let api = Arc::new(FakeApi::default());
        api.translations_down.store(true, Ordering::SeqCst);
        let mut registry = EntryRegistry::new();
        let sink = Arc::new(RecordingSink::default());
        let coordinator = registry
            .setup(&entry(api.clone(), "a").await, sink.clone())
            .await?;
        assert!(!coordinator.is_ready().await);
        assert!(sink.published.lock().unwrap().is_empty());

        api.translations_down.store(false, Ordering::SeqCst);
        coordinator.request_refresh();
        let sensors = wait_for_publishes(&sink, 1).await;
        assert_eq!(sensors[0].name, "Pollen Birch");
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_first_refresh_is_not_stored() {
        let api = Arc::new(FakeApi::default());
        api.pollen_down.store(true, Ordering::SeqCst);
        let mut registry = EntryRegistry::new();
        let entry = entry(api, "a").await;

        let result = registry.setup(&entry, Arc::new(RecordingSink::default())).await;
        assert!(matches!(result, Err(PollenError::PollenFetch(_))));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_unload() -> Result<(), PollenError> {
        let mut registry = EntryRegistry::new();
        let sink = Arc::new(RecordingSink::default());
        registry.setup(&entry(Arc::default(), "a").await, sink.clone()).await?;
        registry.setup(&entry(Arc::default(), "b").await, sink).await?;
        assert_eq!(registry.len(), 2);

        assert!(registry.unload("a"));
        assert!(!registry.unload("a"));
        assert!(registry.get("a").is_none());
        assert!(registry.get("b").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_unload_stops_polling() -> Result<(), PollenError> {
        let api = Arc::new(FakeApi::default());
        let mut registry = EntryRegistry::new();
        let coordinator = registry
            .setup(&entry(api.clone(), "a").await, Arc::new(RecordingSink::default()))
            .await?;

        registry.unload("a");
        coordinator.request_refresh();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(api.pollen_requests.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_reload_applies_new_options() -> Result<(), PollenError> {
        let mut registry = EntryRegistry::new();
        let sink = Arc::new(RecordingSink::default());
        let mut entry = entry(Arc::default(), "a").await;
        let first = registry.setup(&entry, sink.clone()).await?;
        assert_eq!(first.period(), Duration::from_secs(3600));

        entry.options.scan_interval = Some(5);
        let second = registry.reload(&entry, sink).await?;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.period(), Duration::from_secs(300));
        assert_eq!(registry.len(), 1);
        Ok(())
    }
}
