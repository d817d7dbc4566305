//! Periodic refresh of pollen data for one configured entry.

use crate::fetch::{HeaderProfile, HttpFetcher};
use crate::pollen::config::PollenConfig;
use crate::pollen::error::PollenError;
use crate::pollen::sensor::{sensors_for, PollenSensor, SensorSnapshot};
use crate::pollen::types::{Envelope, PollenRecord, PollenState, TranslationEntry};
use chrono::{Local, TimeDelta};
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Receives rendered sensors after every successful refresh.
pub trait SensorSink: Send + Sync {
    fn publish(&self, entry_id: &str, sensors: &[SensorSnapshot]);
}

pub struct PollenCoordinator {
    entry_id: String,
    config: PollenConfig,
    period: Duration,
    fetcher: HttpFetcher,
    state: RwLock<PollenState>,
    /// Created once, when data and translations are first both present.
    sensors: RwLock<Option<Vec<PollenSensor>>>,
    /// Serializes scheduled and on-demand refreshes.
    refresh_lock: Mutex<()>,
    wake: Notify,
}

impl PollenCoordinator {
    pub fn new(entry_id: impl Into<String>, config: PollenConfig) -> Result<Self, PollenError> {
        let period = config.poll_period();
        info!(
            "Polling {} every {} minutes",
            config.base_url,
            period.as_secs() / 60
        );
        Ok(Self {
            entry_id: entry_id.into(),
            fetcher: HttpFetcher::new(HeaderProfile::PollenApi)?,
            config,
            period,
            state: RwLock::new(PollenState::default()),
            sensors: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            wake: Notify::new(),
        })
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn config(&self) -> &PollenConfig {
        &self.config
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub async fn fetch_translations(&self) -> Result<Vec<TranslationEntry>, PollenError> {
        let envelope: Envelope<Vec<TranslationEntry>> = self
            .fetcher
            .get_json(&self.config.translations_url())
            .await
            .map_err(PollenError::TranslationsFetch)?;
        Ok(envelope.data)
    }

    pub async fn fetch_pollen(&self) -> Result<Vec<PollenRecord>, PollenError> {
        let envelope: Envelope<Vec<PollenRecord>> = self
            .fetcher
            .get_json(&self.config.pollens_url())
            .await
            .map_err(PollenError::PollenFetch)?;
        Ok(envelope.data)
    }

    /// Fetches translations and pollen data and updates the stored state.
    ///
    /// A translations failure is logged and the previous translations are
    /// kept. A pollen failure fails the refresh and leaves the pollen data
    /// and poll times untouched.
    pub async fn refresh(&self) -> Result<(), PollenError> {
        let _guard = self.refresh_lock.lock().await;
        debug!("Fetching translation and pollen data for {}", self.entry_id);

        let translations = match self.fetch_translations().await {
            Ok(translations) => {
                debug!("Fetched {} translations", translations.len());
                Some(translations)
            }
            Err(e) => {
                error!("{}", e);
                None
            }
        };
        let pollen = self.fetch_pollen().await;

        let mut state = self.state.write().await;
        if let Some(translations) = translations {
            state.translations = Some(translations);
        }
        let pollen = pollen?;
        debug!("Fetched {} pollen records", pollen.len());

        let now = Local::now();
        state.pollen = Some(pollen);
        state.last_poll = Some(now);
        state.next_poll = TimeDelta::from_std(self.period)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta));
        Ok(())
    }

    pub async fn snapshot(&self) -> PollenState {
        self.state.read().await.clone()
    }

    /// True once both pollen data and translations have been fetched.
    pub async fn is_ready(&self) -> bool {
        self.state.read().await.is_ready()
    }

    /// Asks the running poll loop to refresh now instead of at the next tick.
    pub fn request_refresh(&self) {
        self.wake.notify_one();
    }

    /// Creates one sensor per active record, unless that already happened.
    ///
    /// Returns `false` while pollen data or translations are still missing.
    /// The set is never rebuilt: a pollen type that later turns inactive
    /// keeps its sensor, which then reports the unavailable state.
    async fn ensure_sensors(&self) -> bool {
        let mut sensors = self.sensors.write().await;
        if sensors.is_some() {
            return true;
        }
        let state = self.state.read().await;
        if !state.is_ready() {
            return false;
        }
        let created = sensors_for(&state);
        info!("Created {} pollen sensors for {}", created.len(), self.entry_id);
        *sensors = Some(created);
        true
    }

    /// The sensors of this entry, empty until they have been created.
    pub async fn sensors(&self) -> Vec<PollenSensor> {
        self.ensure_sensors().await;
        self.sensors.read().await.clone().unwrap_or_default()
    }

    /// Renders every sensor of this entry against the current state.
    pub async fn render(&self) -> Vec<SensorSnapshot> {
        self.ensure_sensors().await;
        let sensors = self.sensors.read().await;
        let state = self.state.read().await;
        sensors
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|sensor| sensor.render(&state, &self.config.language))
            .collect()
    }

    /// Hands the rendered sensors to `sink`. Nothing is published until
    /// the sensors exist.
    pub(crate) async fn publish(&self, sink: &dyn SensorSink) {
        if !self.ensure_sensors().await {
            debug!(
                "Sensors for {} wait for pollen data and translations",
                self.entry_id
            );
            return;
        }
        let sensors = self.render().await;
        sink.publish(&self.entry_id, &sensors);
    }

    /// Starts the poll loop. The first refresh is expected to have happened
    /// already, so the loop waits one full period (or a refresh request)
    /// before polling.
    pub fn spawn(self: Arc<Self>, sink: Arc<dyn SensorSink>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = self.wake.notified() => ticker.reset(),
                }
                match self.refresh().await {
                    Ok(()) => self.publish(sink.as_ref()).await,
                    Err(e) => error!("Refresh of {} failed: {}", self.entry_id, e),
                }
            }
        })
    }
}
