use pano_cli::{Interpolation, StitchConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Panorama configuration serialization demo");
    println!("=========================================\n");

    // Demo 1: defaults and a tuned variant
    let default_config = StitchConfig::default();
    let mut strict = StitchConfig::default();
    strict.matching.ratio_threshold = 0.5;
    strict.matching.min_match_count = 25;
    strict.ransac.reprojection_threshold = 2.0;
    strict.ransac.seed = Some(42);
    strict.compose.interpolation = Interpolation::Nearest;

    println!("Default: {}", default_config.summary());
    println!("Strict:  {}", strict.summary());

    // Demo 2: JSON
    let json = strict.to_json()?;
    println!("\nStrict config as JSON:\n{json}");
    assert_eq!(StitchConfig::from_json(&json)?, strict);

    // Demo 3: TOML
    let toml = strict.to_toml()?;
    println!("\nStrict config as TOML:\n{toml}");
    assert_eq!(StitchConfig::from_toml(&toml)?, strict);

    // Demo 4: partial files fall back to defaults
    let partial = StitchConfig::from_toml("[ransac]\nseed = 7\n")?;
    println!("\nPartial TOML: {}", partial.summary());

    // Demo 5: validation on load
    match StitchConfig::from_toml("[matching]\nratio_threshold = 1.5\n") {
        Ok(_) => println!("\nUnexpectedly accepted an invalid ratio"),
        Err(e) => println!("\nRejected invalid config: {e}"),
    }

    let dir = std::env::temp_dir();
    let path = dir.join("pano_strict.toml");
    strict.save(&path)?;
    let loaded = StitchConfig::load(&path)?;
    println!("\nReloaded from {}: {}", path.display(), loaded.summary());
    std::fs::remove_file(&path)?;

    Ok(())
}
