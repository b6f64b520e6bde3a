//! NMEA-0183 sentence builders.
//!
//! Each builder is a plain function reading whatever channels it needs from a `LiveStore` and
//! returning `Some(sentence)` or `None` if a required input is missing. There is no shared
//! mutable state between builders beyond the store itself, so a missing input in one builder
//! never affects any other.
use chrono::Utc;

use crate::nmea::{normalize_angle, wrap};
use crate::state::LiveStore;

fn fmt1(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_default()
}

fn fmt2(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

/// `$IIVHW,,,<HDG>,M,<BSP>,N,,*HH` — heading fields omitted entirely when heading is missing.
pub fn vhw(store: &LiveStore) -> Option<String> {
    let hdg = store.get_number("Heading");
    let bsp = store.get_number("Boatspeed (Knots)");
    let body = if let Some(hdg) = hdg {
        format!("IIVHW,,,{:.1},M,{},N,,", hdg, fmt1(bsp))
    } else {
        format!("IIVHW,,,,,{},N,,", fmt1(bsp))
    };
    Some(wrap(&body))
}

/// `$IIDBT,<ft>,f,<m>,M,<fath>,F*HH` — any missing field is emitted blank.
pub fn dbt(store: &LiveStore) -> Option<String> {
    let feet = store.get_number("Depth (Feet)");
    let meters = store.get_number("Depth (Meters)");
    let fathoms = store.get_number("Depth (Fathoms)");
    let body = format!("IIDBT,{},f,{},M,{},F", fmt1(feet), fmt1(meters), fmt1(fathoms));
    Some(wrap(&body))
}

/// `$IIRSA,<angle>,A,,A*HH`, or blank angle with status `V` when unavailable.
pub fn rsa(store: &LiveStore) -> Option<String> {
    let angle = store.get_number("Rudder Angle");
    let (angle_str, status) = match angle {
        Some(a) => (format!("{:.1}", a), "A"),
        None => (String::new(), "V"),
    };
    let body = format!("IIRSA,{},{},,{}", angle_str, status, status);
    Some(wrap(&body))
}

/// `$IIXDR,U,<v>,V,BATTV*HH`.
pub fn xdr_battv(store: &LiveStore) -> Option<String> {
    let volts = store.get_number("Battery Volts");
    let body = format!("IIXDR,U,{},V,BATTV", fmt2(volts));
    Some(wrap(&body))
}

/// `$WIMWD,,,<TWD>,M,<TWS kn>,N,<TWS m/s>,M*HH`.
pub fn mwd(store: &LiveStore) -> Option<String> {
    let twd = store.get_number("True Wind Direction").map(normalize_angle);
    let tws = store.get_number("True Wind Speed (Knots)");
    let tws_ms = tws.map(|kn| kn * 1852.0 / 3600.0);
    let body = format!("WIMWD,,,{},M,{},N,{},M", fmt1(twd), fmt1(tws), fmt1(tws_ms));
    Some(wrap(&body))
}

fn mwv(store: &LiveStore, angle_channel: &str, speed_channel: &str, reference: char) -> Option<String> {
    let angle = store.get_number(angle_channel).map(normalize_angle);
    let speed = store.get_number(speed_channel);
    let angle_str = fmt1(angle);
    let speed_str = fmt1(speed);
    let status = if !angle_str.is_empty() && !speed_str.is_empty() { "A" } else { "V" };
    let body = format!("IIMWV,{},{},{},N,{}", angle_str, reference, speed_str, status);
    Some(wrap(&body))
}

/// `$IIMWV,<TWA>,T,<TWS>,N,A*HH`.
pub fn mwv_true(store: &LiveStore) -> Option<String> {
    mwv(store, "True Wind Angle", "True Wind Speed (Knots)", 'T')
}

/// `$IIMWV,<AWA>,R,<AWS>,N,A*HH`.
pub fn mwv_apparent(store: &LiveStore) -> Option<String> {
    mwv(store, "Apparent Wind Angle", "Apparent Wind Speed (Knots)", 'R')
}

/// `$IIMTW,<T>,C*HH`.
pub fn mtw(store: &LiveStore) -> Option<String> {
    let temp = store.get_number("Sea Temperature (\u{b0}C)");
    let body = format!("IIMTW,{},C", fmt1(temp));
    Some(wrap(&body))
}

/// `$IIHDM,<HDG>,M*HH`.
pub fn hdm(store: &LiveStore) -> Option<String> {
    let hdg = store.get_number("Heading");
    let body = format!("IIHDM,{},M", fmt1(hdg));
    Some(wrap(&body))
}

/// `$IIVTG,<TT>,T,<MT>,M,<SOG kn>,N,<SOG km/h>,K,A*HH`.
pub fn vtg(store: &LiveStore) -> Option<String> {
    let true_track = store.get_number("Course Over Ground (True)").map(normalize_angle);
    let mag_track = store.get_number("Course Over Ground (Mag)").map(normalize_angle);
    let sog = store.get_number("Speed Over Ground");

    let tt_str = fmt1(true_track);
    let mt_str = fmt1(mag_track);
    let kts_str = fmt1(sog);
    let kmph_str = fmt1(sog.map(|kn| kn * 1.852));
    let mode = if !kts_str.is_empty() { "A" } else { "V" };

    let fields = [
        tt_str.clone(),
        if tt_str.is_empty() { String::new() } else { "T".to_string() },
        mt_str.clone(),
        if mt_str.is_empty() { String::new() } else { "M".to_string() },
        kts_str.clone(),
        if kts_str.is_empty() { String::new() } else { "N".to_string() },
        kmph_str.clone(),
        if kmph_str.is_empty() { String::new() } else { "K".to_string() },
        mode.to_string(),
    ];
    let body = format!("IIVTG,{}", fields.join(","));
    Some(wrap(&body))
}

/// `$GPGLL,<lat>,<N/S>,<lon>,<E/W>,<UTC hhmmss>,A*HH`. Returns `None` on a malformed or absent
/// LatLon string.
pub fn gll(store: &LiveStore) -> Option<String> {
    let latlon = store.get_string("LatLon")?;

    let lat_idx = latlon.rfind(['N', 'S'])?;
    let lon_idx = latlon.rfind(['E', 'W'])?;
    if lon_idx <= lat_idx {
        return None;
    }

    let lat_part = &latlon[..lat_idx];
    let lat_dir = &latlon[lat_idx..=lat_idx];
    let lon_part = &latlon[lat_idx + 1..lon_idx];
    let lon_dir = &latlon[lon_idx..=lon_idx];

    let time_str = Utc::now().format("%H%M%S").to_string();
    let body = format!("GPGLL,{},{},{},{},{},A", lat_part, lat_dir, lon_part, lon_dir, time_str);
    Some(wrap(&body))
}

fn xdr_raw(store: &LiveStore, channel: &str, kind: char, unit: char, name: &str) -> Option<String> {
    let value = store.get_number(channel);
    let body = format!("IIXDR,{},{},{},{}", kind, fmt2(value), unit, name);
    Some(wrap(&body))
}

/// `$IIXDR,A,<deg>,V,RAW_WIND_A*HH`.
pub fn xdr_raw_wind_angle(store: &LiveStore) -> Option<String> {
    xdr_raw(store, "Apparent Wind Angle (Raw)", 'A', 'V', "RAW_WIND_A")
}

/// `$IIXDR,N,<kn>,V,RAW_WIND_S*HH`.
pub fn xdr_raw_wind_speed(store: &LiveStore) -> Option<String> {
    xdr_raw(store, "Apparent Wind Speed (Raw)", 'N', 'V', "RAW_WIND_S")
}

/// `$IIXDR,N,<kn>,V,DRIFT*HH`.
pub fn xdr_drift(store: &LiveStore) -> Option<String> {
    xdr_raw(store, "Tidal Drift", 'N', 'V', "DRIFT")
}

/// `$IIXDR,A,<deg>,V,SET*HH`.
pub fn xdr_set(store: &LiveStore) -> Option<String> {
    xdr_raw(store, "Tidal Set", 'A', 'V', "SET")
}

/// `$IIXDR,N,<kn>,V,RAW_BSP*HH`.
pub fn xdr_raw_bsp(store: &LiveStore) -> Option<String> {
    xdr_raw(store, "Boatspeed (Raw)", 'N', 'V', "RAW_BSP")
}

/// `$IIXDR,A,<deg>,D,ROLL*HH`.
pub fn xdr_roll(store: &LiveStore) -> Option<String> {
    xdr_raw(store, "Heel Angle", 'A', 'D', "ROLL")
}

/// `$IIXDR,A,<deg>,D,PITCH*HH`.
pub fn xdr_pitch(store: &LiveStore) -> Option<String> {
    xdr_raw(store, "Fore/Aft Trim", 'A', 'D', "PITCH")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ChannelValue;

    #[test]
    fn vhw_omits_heading_when_absent() {
        let store = LiveStore::new();
        store.put("Boatspeed (Knots)", 0x41, &ChannelValue::Number(9.1));
        let sentence = vhw(&store).unwrap();
        assert!(sentence.starts_with("$IIVHW,,,,,9.1,N,,*"));
    }

    #[test]
    fn vhw_includes_heading_when_present() {
        let store = LiveStore::new();
        store.put("Heading", 0x49, &ChannelValue::Number(182.3));
        store.put("Boatspeed (Knots)", 0x41, &ChannelValue::Number(9.1));
        let sentence = vhw(&store).unwrap();
        assert!(sentence.starts_with("$IIVHW,,,182.3,M,9.1,N,,*"));
    }

    #[test]
    fn dbt_blanks_missing_fields() {
        let store = LiveStore::new();
        store.put("Depth (Meters)", 0xC1, &ChannelValue::Number(4.2));
        let sentence = dbt(&store).unwrap();
        assert!(sentence.starts_with("$IIDBT,,f,4.2,M,,F*"));
    }

    #[test]
    fn mwv_true_reports_invalid_without_speed() {
        let store = LiveStore::new();
        store.put("True Wind Angle", 0x59, &ChannelValue::Number(-45.0));
        let sentence = mwv_true(&store).unwrap();
        assert!(sentence.starts_with("$IIMWV,315.0,T,,N,V*"));
    }

    #[test]
    fn mwv_true_reports_valid_with_both() {
        let store = LiveStore::new();
        store.put("True Wind Angle", 0x59, &ChannelValue::Number(-45.0));
        store.put("True Wind Speed (Knots)", 0x55, &ChannelValue::Number(12.3));
        let sentence = mwv_true(&store).unwrap();
        assert!(sentence.starts_with("$IIMWV,315.0,T,12.3,N,A*"));
    }

    #[test]
    fn gll_parses_packed_latlon() {
        let store = LiveStore::new();
        store.put("LatLon", 0x47, &ChannelValue::Text("4916.45N12311.12W".to_string()));
        let sentence = gll(&store).unwrap();
        assert!(sentence.starts_with("$GPGLL,4916.45,N,12311.12,W,"));
    }

    #[test]
    fn gll_returns_none_for_malformed_input() {
        let store = LiveStore::new();
        store.put("LatLon", 0x47, &ChannelValue::Text("not a position".to_string()));
        assert!(gll(&store).is_none());
    }

    #[test]
    fn gll_returns_none_when_absent() {
        let store = LiveStore::new();
        assert!(gll(&store).is_none());
    }

    #[test]
    fn vtg_mode_invalid_without_sog() {
        let store = LiveStore::new();
        let sentence = vtg(&store).unwrap();
        assert!(sentence.starts_with("$IIVTG,,,,,,,,,V*"));
    }

    #[test]
    fn vtg_mode_valid_with_sog() {
        let store = LiveStore::new();
        store.put("Speed Over Ground", 0xEB, &ChannelValue::Number(6.0));
        let sentence = vtg(&store).unwrap();
        assert!(sentence.starts_with("$IIVTG,,,,,6.0,N,11.1,K,A*"));
    }
}
