//! Maps a channel update to the set of NMEA builders it should trigger.
use crate::nmea::builders;
use crate::state::LiveStore;

/// Identifies one NMEA sentence builder. Kept as an enum (rather than a table of function
/// pointers or closures) so the channel-to-builder mapping stays a plain, greppable `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderId {
    Vhw,
    Dbt,
    Rsa,
    XdrBattv,
    Mwd,
    MwvTrue,
    MwvApparent,
    Mtw,
    Hdm,
    Vtg,
    Gll,
    XdrRawWindAngle,
    XdrRawWindSpeed,
    XdrDrift,
    XdrSet,
    XdrRawBsp,
    XdrRoll,
    XdrPitch,
}

/// The builders that should run whenever `channel_name`'s value changes.
pub fn builders_for(channel_name: &str) -> &'static [BuilderId] {
    use BuilderId::*;
    match channel_name {
        "Boatspeed (Knots)" => &[Vhw],
        "Heading" => &[Hdm, Vhw],
        "Depth (Meters)" | "Depth (Feet)" | "Depth (Fathoms)" => &[Dbt],
        "Rudder Angle" => &[Rsa],
        "Battery Volts" => &[XdrBattv],
        "True Wind Direction" => &[Mwd],
        "True Wind Speed (Knots)" => &[Mwd, MwvTrue],
        "True Wind Angle" => &[MwvTrue],
        "Apparent Wind Speed (Knots)" => &[MwvApparent],
        "Apparent Wind Angle" => &[MwvApparent],
        "Sea Temperature (\u{b0}C)" => &[Mtw],
        "Course Over Ground (True)" | "Course Over Ground (Mag)" | "Speed Over Ground" => &[Vtg],
        "LatLon" => &[Gll],
        "Apparent Wind Angle (Raw)" => &[XdrRawWindAngle],
        "Apparent Wind Speed (Raw)" => &[XdrRawWindSpeed],
        "Tidal Drift" => &[XdrDrift],
        "Tidal Set" => &[XdrSet],
        "Boatspeed (Raw)" => &[XdrRawBsp],
        "Heel Angle" => &[XdrRoll],
        "Fore/Aft Trim" => &[XdrPitch],
        _ => &[],
    }
}

/// Run a single builder against the store.
pub fn build(id: BuilderId, store: &LiveStore) -> Option<String> {
    match id {
        BuilderId::Vhw => builders::vhw(store),
        BuilderId::Dbt => builders::dbt(store),
        BuilderId::Rsa => builders::rsa(store),
        BuilderId::XdrBattv => builders::xdr_battv(store),
        BuilderId::Mwd => builders::mwd(store),
        BuilderId::MwvTrue => builders::mwv_true(store),
        BuilderId::MwvApparent => builders::mwv_apparent(store),
        BuilderId::Mtw => builders::mtw(store),
        BuilderId::Hdm => builders::hdm(store),
        BuilderId::Vtg => builders::vtg(store),
        BuilderId::Gll => builders::gll(store),
        BuilderId::XdrRawWindAngle => builders::xdr_raw_wind_angle(store),
        BuilderId::XdrRawWindSpeed => builders::xdr_raw_wind_speed(store),
        BuilderId::XdrDrift => builders::xdr_drift(store),
        BuilderId::XdrSet => builders::xdr_set(store),
        BuilderId::XdrRawBsp => builders::xdr_raw_bsp(store),
        BuilderId::XdrRoll => builders::xdr_roll(store),
        BuilderId::XdrPitch => builders::xdr_pitch(store),
    }
}

/// Invoke every builder triggered by an update to `channel_name`, collecting their non-`None`
/// output. A builder returning `None` (missing sibling input) never prevents its neighbors in
/// the same fan-out from running.
pub fn route(channel_name: &str, store: &LiveStore) -> Vec<String> {
    builders_for(channel_name)
        .iter()
        .filter_map(|&id| build(id, store))
        .collect()
}
