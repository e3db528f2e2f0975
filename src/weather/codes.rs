//! WMO weather code lookups: description, icon and color band

/// Indonesian description of an Open-Meteo (WMO) weather code
#[must_use]
pub const fn describe(code: u8) -> &'static str {
    match code {
        0 => "Cerah",
        1 => "Cerah Berawan",
        2 => "Berawan",
        3 => "Teredu/berawan tebal",
        45 => "Kabut",
        48 => "Kabut berdebu",
        51 => "Gerimis ringan",
        53 => "Gerimis sedang",
        55 => "Gerimis lebat",
        56 => "Hujan beku ringan",
        57 => "Hujan beku lebat",
        61 => "Hujan ringan",
        63 => "Hujan sedang",
        65 => "Hujan lebat",
        66 => "Hujan es ringan",
        67 => "Hujan es lebat",
        71 => "Salju ringan",
        73 => "Salju sedang",
        75 => "Salju lebat",
        80 => "Hujan lokal ringan",
        81 => "Hujan lokal sedang",
        82 => "Hujan lokal lebat",
        95 => "Badai Petir",
        96 => "Badai Petir dengan hujan ringan",
        99 => "Badai Petir dengan hujan lebat",
        _ => "Tidak diketahui",
    }
}

/// OpenWeatherMap day-icon id approximating a weather code
#[must_use]
pub const fn icon_id(code: u8) -> &'static str {
    match code {
        0 => "01d",
        1 => "02d",
        2 => "03d",
        3 => "04d",
        45 | 48 => "50d",
        51..=57 => "09d",
        61..=67 => "10d",
        71..=75 => "13d",
        80..=82 => "09d",
        95..=99 => "11d",
        _ => "01d",
    }
}

/// CSS color for a weather code; unknown or missing codes get the dark base color
#[must_use]
pub const fn color_band(code: Option<u8>) -> &'static str {
    let Some(code) = code else {
        return "#0f172a";
    };
    match code {
        51..=67 | 80..=82 => "#0ea5e9",
        0 | 1 => "#fb923c",
        2 | 3 => "#94a3b8",
        95..=99 => "#7c3aed",
        45 | 48 => "#64748b",
        _ => "#0f172a",
    }
}

/// Icon image URL at the given pixel scale (2 or 4)
#[must_use]
pub fn icon_url(code: u8, scale: u8) -> String {
    format!(
        "https://openweathermap.org/img/wn/{}@{scale}x.png",
        icon_id(code)
    )
}
