use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use venue_map::storage::FileStore;
use venue_map::utils::logging::default_filter;
use venue_map::validation::CoordinateValidator;
use venue_map::{
    init_logging, CalibrationStore, ConfigurationManager, GpsCoordinate, MapPosition, MemoryStore, MockGeoProvider,
    OnceResponse, VenueBounds, VenueCatalog, VenueMap, VenueMapConfig,
};

fn load_config(path: Option<&String>) -> Result<VenueMapConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(ConfigurationManager::from_file(path)?.config().clone()),
        None => Ok(VenueMapConfig::default()),
    }
}

/// Inverse of the fallback projection, used to script plausible fixes
fn gps_at(bounds: &VenueBounds, position: MapPosition) -> GpsCoordinate {
    GpsCoordinate::new(
        bounds.min_latitude() + (100.0 - position.y) / 100.0 * bounds.lat_delta,
        bounds.min_longitude() + position.x / 100.0 * bounds.lon_delta,
    )
}

fn demo() -> Result<(), Box<dyn std::error::Error>> {
    let config = VenueMapConfig::default();
    let catalog = VenueCatalog::default_venue();
    let bounds = config.bounds.to_bounds();
    let provider = MockGeoProvider::new();
    let mut map = VenueMap::new(
        &config,
        catalog.clone(),
        Arc::new(provider.clone()),
        Box::new(MemoryStore::new()),
    );

    println!("=== Venue Map Demo ===");
    println!("{} points of interest", catalog.len());

    // Unlock admin mode with a quick burst of taps
    for tap in 0..config.admin.required_taps {
        map.register_admin_tap(u64::from(tap) * 100);
    }
    println!("Admin mode: {}", map.is_admin_mode());

    // The surveyed fixes sit slightly off the fallback grid
    for (id, drift) in [("food", 0.00002), ("stage", -0.00001), ("hall2", 0.00003)] {
        let pin = catalog.get(id).ok_or("default venue is missing a demo pin")?;
        let mut gps = gps_at(&bounds, pin.position());
        gps.longitude += drift;
        provider.push_once_response(OnceResponse::Sample(gps));
        let pair = map.calibrate(id)?;
        println!("Calibrated {:<8} at {}", pair.point_id, pair.gps);
    }
    map.exit_admin_mode();

    map.start_tracking();
    let walk = [
        MapPosition::new(50.0, 95.0),
        MapPosition::new(45.0, 70.0),
        MapPosition::new(40.0, 50.0),
        MapPosition::new(60.0, 55.0),
        MapPosition::new(85.0, 60.0),
    ];
    for step in walk {
        provider.emit_sample(gps_at(&bounds, step));
        if let Some(result) = map.user_position_detailed() {
            let nearby = map.nearby_point().map_or("-", |p| p.label.as_str());
            println!(
                "You are here: ({:6.2}, {:6.2}) calibrated={} nearby={}",
                result.position.x,
                result.position.y,
                result.is_calibrated(),
                nearby
            );
        }
    }
    map.stop_tracking();
    Ok(())
}

fn replay(trace_path: &str, config: &VenueMapConfig) -> Result<(), Box<dyn std::error::Error>> {
    let trace: Vec<GpsCoordinate> = serde_json::from_str(&std::fs::read_to_string(trace_path)?)?;
    let provider = MockGeoProvider::new();
    let mut map = VenueMap::from_config(config, VenueCatalog::default_venue(), Arc::new(provider.clone()));
    info!(samples = trace.len(), calibrations = map.calibrations().len(), "replaying trace");

    map.start_tracking();
    for gps in trace {
        if let Err(error) = CoordinateValidator::validate_wgs84(&gps) {
            warn!(%gps, %error, "skipping sample");
            continue;
        }
        provider.emit_sample(gps);
        if let Some(result) = map.user_position_detailed() {
            info!(
                %gps,
                x = result.position.x,
                y = result.position.y,
                calibrated = result.is_calibrated(),
                nearby = map.nearby_point().map(|p| p.id.as_str()),
                "mapped"
            );
        }
    }
    Ok(())
}

fn calibrate(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let point_id = &args[0];
    let gps = GpsCoordinate::new(args[1].parse()?, args[2].parse()?);
    CoordinateValidator::validate_wgs84(&gps)?;

    let config = load_config(args.get(3))?;
    let catalog = VenueCatalog::default_venue();
    if !catalog.contains(point_id) {
        return Err(format!("unknown point '{}'", point_id).into());
    }

    let directory = config.storage.directory.clone().unwrap_or_else(|| Path::new(".").to_path_buf());
    let mut store = CalibrationStore::open_with_key(Box::new(FileStore::new(&directory)), &config.storage.key);
    store.put(point_id, gps)?;
    info!(point_id = %point_id, %gps, total = store.len(), directory = %directory.display(), "calibration saved");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(default_filter());
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map_or("venue-map", |s| s.as_str());

    if args.len() == 2 && args[1] == "--demo" {
        return demo();
    }

    if (5..=6).contains(&args.len()) && args[1] == "--calibrate" {
        return calibrate(&args[2..]);
    }

    if (2..=3).contains(&args.len()) && !args[1].starts_with("--") {
        let config = load_config(args.get(2))?;
        return replay(&args[1], &config);
    }

    eprintln!("Usage: {} <trace.json> [config.json]", program);
    eprintln!("   or: {} --calibrate <point_id> <lat> <lon> [config.json]", program);
    eprintln!("   or: {} --demo", program);
    std::process::exit(1);
}
