use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::analyze_session::RecordedSession;
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::UserProfile;
use crate::types::WorkoutSummary;

/// JSON fra streng med sti i feilmeldingen (`user.weight_kg: invalid type ...`).
pub fn from_json_str<T: DeserializeOwned>(txt: &str) -> EngineResult<T> {
    let mut de = serde_json::Deserializer::from_str(txt);
    let value = serde_path_to_error::deserialize(&mut de)?;
    Ok(value)
}

fn write_pretty<T: Serialize>(value: &T, path: &Path) -> EngineResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Leser konfig fra disk (JSON). Mangler filen, brukes default.
pub fn load_config(path: impl AsRef<Path>) -> EngineResult<EngineConfig> {
    let path = path.as_ref();
    if !path.exists() {
        warn!("Fant ikke konfig på {}, bruker default", path.display());
        return Ok(EngineConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    let config: EngineConfig = from_json_str(&contents)?;
    config.validate()?;
    info!(
        "Konfig lastet fra {} (segment={}, seksjon={})",
        path.display(),
        config.segment_capacity,
        config.section_capacity()
    );
    Ok(config)
}

pub fn save_config(config: &EngineConfig, path: impl AsRef<Path>) -> EngineResult<()> {
    let path = path.as_ref();
    write_pretty(config, path)?;
    info!("Konfig lagret til {}", path.display());
    Ok(())
}

/// Brukerprofil; default (70 kg / 170 cm) når filen mangler.
pub fn load_user_profile(path: impl AsRef<Path>) -> EngineResult<UserProfile> {
    let path = path.as_ref();
    if !path.exists() {
        warn!("Fant ikke profil på {}, returnerer default", path.display());
        return Ok(UserProfile::default());
    }
    let contents = fs::read_to_string(path)?;
    let profile: UserProfile = from_json_str(&contents)?;
    info!("Profil lastet fra {} (vekt={} kg)", path.display(), profile.weight_kg);
    Ok(profile)
}

pub fn save_user_profile(profile: &UserProfile, path: impl AsRef<Path>) -> EngineResult<()> {
    let path = path.as_ref();
    write_pretty(profile, path)?;
    info!("Profil lagret til {}", path.display());
    Ok(())
}

/// Opptak for offline replay. Her er manglende fil en feil.
pub fn load_recording(path: impl AsRef<Path>) -> EngineResult<RecordedSession> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let rec: RecordedSession = from_json_str(&contents)?;
    info!(
        "Opptak lastet fra {} ({} gyro, {} høyde, {} posisjoner)",
        path.display(),
        rec.rotation.len(),
        rec.altitude.len(),
        rec.locations.len()
    );
    Ok(rec)
}

pub fn save_summary(summary: &WorkoutSummary, path: impl AsRef<Path>) -> EngineResult<()> {
    let path = path.as_ref();
    write_pretty(summary, path)?;
    info!(
        "Sammendrag lagret til {} ({} segmenter)",
        path.display(),
        summary.cadence_segments.len()
    );
    Ok(())
}
