use lu_environment::{AddressQuery, EnvironmentClient, EnvironmentError, Geocoder};

#[tokio::main]
async fn main() -> Result<(), EnvironmentError> {
    // RUST_LOG=debug shows which station and grid cell were picked.
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let client = EnvironmentClient::builder().build()?;
    let report = client.report().await?;

    let c = &report.coordinates;
    println!(
        "Our location: Lat = {:.2}, Lon = {:.2}. LUREF: X = {:.0}, Y = {:.0}. ETRS89: X = {:.0}, Y = {:.0}",
        report.latitude, report.longitude, c.luref_x, c.luref_y, c.etrs89_x, c.etrs89_y
    );
    if let Some(o3) = &report.o3 {
        println!("O3: {o3:?}");
    }
    if let Some(no2) = &report.no2 {
        println!("NO2: {no2:?}");
    }
    if let Some(weather) = &report.weather {
        println!("Weather: {weather:?}");
    }
    if let Some(km) = report.station_distance_km {
        println!("Weather station is {km:.1} km away");
    }

    let geocoder = Geocoder::new()?;
    let query = AddressQuery::builder().zip("8437").num("13").build();
    if let Some(location) = geocoder.search(&query).await? {
        println!("Coordinates: {location:?}");
        let address = geocoder.reverse(location).await?;
        println!("Address: {address}");
    }

    Ok(())
}
