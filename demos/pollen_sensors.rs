use lu_environment::pollen::SensorSnapshot;
use lu_environment::{ConfigEntry, EntryRegistry, PollenConfig, PollenError, SensorSink};
use std::sync::Arc;
use std::time::Duration;

struct PrintSink;

impl SensorSink for PrintSink {
    fn publish(&self, entry_id: &str, sensors: &[SensorSnapshot]) {
        println!("[{entry_id}] {} sensors", sensors.len());
        for sensor in sensors {
            println!(
                "  {:<28} {:>5} {}  {:?}",
                sensor.name, sensor.state, sensor.unit, sensor.attributes
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), PollenError> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let entry = ConfigEntry::new("pollen_lu", PollenConfig::builder().scan_interval(1).build());
    let mut registry = EntryRegistry::new();
    let coordinator = registry.setup(&entry, Arc::new(PrintSink)).await?;

    // One forced refresh, then let the schedule take over for a while.
    tokio::time::sleep(Duration::from_secs(5)).await;
    coordinator.request_refresh();
    tokio::time::sleep(Duration::from_secs(150)).await;

    registry.unload(&entry.entry_id);
    Ok(())
}
