//! HTML summary card for a forecast report

use std::fmt::Write;

use chrono::{Datelike, NaiveDate};

use crate::models::{ForecastReport, Horizon};
use crate::weather::codes;

const WEEKDAYS: [&str; 7] = ["Min", "Sen", "Sel", "Rab", "Kam", "Jum", "Sab"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Escape text for safe inclusion in HTML content and attribute values
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Indonesian short weekday and date label for an ISO date, e.g. `("Rab", "13 Nov")`
fn day_labels(iso_date: &str) -> (String, String) {
    match NaiveDate::parse_from_str(iso_date, "%Y-%m-%d") {
        Ok(date) => (
            WEEKDAYS[date.weekday().num_days_from_sunday() as usize].to_string(),
            format!("{} {}", date.day(), MONTHS[date.month0() as usize]),
        ),
        Err(_) => (String::new(), escape_html(iso_date)),
    }
}

fn rounded(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{}", v.round()))
}

fn forecast_strip(report: &ForecastReport, horizon: Horizon) -> String {
    let daily = &report.daily;
    let dates = daily.dates();
    let weather_codes = daily.weather_codes();
    let max = daily.temperature_max();
    let min = daily.temperature_min();

    let mut strip = String::new();
    for (i, date) in dates.iter().take(horizon.days()).enumerate() {
        let code = weather_codes.get(i).copied().flatten();
        let (weekday, date_label) = day_labels(date);
        let _ = write!(
            strip,
            r#"<div class="day"><div class="weekday">{weekday}</div><div class="date">{date_label}</div><div class="tile" style="background:{color}"><img src="{icon}" width="48" height="48"/></div><div class="temp">{max}°/{min}°</div></div>"#,
            color = codes::color_band(code),
            icon = codes::icon_url(code.unwrap_or_default(), 2),
            max = rounded(max.get(i).copied().flatten()),
            min = rounded(min.get(i).copied().flatten()),
        );
    }
    strip
}

/// Build the complete card document for a forecast report
#[must_use]
pub fn build_card_html(report: &ForecastReport, horizon: Horizon) -> String {
    let current = &report.current;
    let main_color = codes::color_band(Some(current.weather_code));

    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8"/>
<title>Cuaca</title>
<style>
body {{ font-family: Arial, Helvetica, sans-serif; margin: 0; padding: 0; }}
.card {{ width: 852px; padding: 24px; background: linear-gradient(180deg, {main_color}, #071024); color: #fff; display: flex; gap: 20px; align-items: center; }}
.icon {{ width: 200px; height: 200px; flex: 0 0 200px; }}
.info {{ flex: 1; }}
.loc {{ font-size: 20px; font-weight: 700; margin-bottom: 8px; }}
.status {{ font-size: 18px; margin-bottom: 12px; }}
.meta {{ font-size: 16px; color: #d1d5db; }}
.forecast {{ display: flex; margin-top: 12px; }}
.day {{ flex: 1; text-align: center; margin: 6px; background: rgba(255,255,255,0.03); padding: 8px; border-radius: 8px; }}
.weekday {{ font-weight: 700; margin-bottom: 6px; }}
.date {{ font-size: 12px; color: #cbd5e1; margin-bottom: 6px; }}
.tile {{ width: 64px; height: 64px; margin: 0 auto; border-radius: 8px; display: flex; align-items: center; justify-content: center; }}
.temp {{ margin-top: 6px; font-weight: 600; }}
</style>
</head>
<body>
<div id="card" class="card">
<div class="icon"><img src="{icon}" width="200" height="200"/></div>
<div class="info">
<div class="loc">{place}</div>
<div class="status">{status}</div>
<div class="meta">
<div>Suhu: <strong>{temperature}°C</strong></div>
<div>Kecepatan angin: <strong>{wind_speed} km/h</strong> (arah {wind_direction}°)</div>
<div>Sumber: Open-Meteo</div>
</div>
<div class="forecast">{strip}</div>
</div>
</div>
</body>
</html>"#,
        icon = codes::icon_url(current.weather_code, 4),
        place = escape_html(&report.place.display_name),
        status = escape_html(report.summary.description),
        temperature = current.temperature,
        wind_speed = current.wind_speed,
        wind_direction = current.wind_direction,
        strip = forecast_strip(report, horizon),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrentConditions, ResolvedPlace};
    use rstest::rstest;
    use serde_json::json;

    fn report(place: &str, days: usize) -> ForecastReport {
        let time: Vec<String> = (0..days).map(|d| format!("2024-11-{:02}", 13 + d)).collect();
        let codes: Vec<u8> = (0..days).map(|d| [0, 61, 95][d % 3]).collect();
        let max: Vec<f64> = (0..days).map(|d| 31.4 + d as f64).collect();
        let min: Vec<f64> = (0..days).map(|d| 23.6 - d as f64).collect();
        ForecastReport::new(
            ResolvedPlace::new(place, "-6.2", "106.8"),
            CurrentConditions {
                temperature: 28.3,
                wind_speed: 11.0,
                wind_direction: 180.0,
                weather_code: 63,
                time: None,
                is_day: None,
            },
            serde_json::from_value(json!({
                "time": time,
                "weathercode": codes,
                "temperature_2m_max": max,
                "temperature_2m_min": min,
            }))
            .unwrap(),
        )
    }

    #[rstest]
    #[case("a & b", "a &amp; b")]
    #[case("<script>", "&lt;script&gt;")]
    #[case(r#"say "hi""#, "say &quot;hi&quot;")]
    #[case("Jum'at", "Jum&#39;at")]
    #[case("Bandung", "Bandung")]
    fn test_escape_html(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_html(input), expected);
    }

    #[rstest]
    #[case("2024-11-13", "Rab", "13 Nov")]
    #[case("2024-05-05", "Min", "5 Mei")]
    #[case("2024-08-17", "Sab", "17 Agu")]
    #[case("2024-12-30", "Sen", "30 Des")]
    fn test_day_labels(#[case] iso: &str, #[case] weekday: &str, #[case] date: &str) {
        assert_eq!(day_labels(iso), (weekday.to_string(), date.to_string()));
    }

    #[test]
    fn test_card_escapes_location() {
        let html = build_card_html(&report("<b>Kota</b> & Sekitarnya", 3), Horizon::new(3));
        assert!(html.contains("&lt;b&gt;Kota&lt;/b&gt; &amp; Sekitarnya"));
        assert!(!html.contains("<b>Kota</b>"));
    }

    #[test]
    fn test_card_contents() {
        let html = build_card_html(&report("Jakarta", 5), Horizon::new(5));
        assert!(html.contains("10d@4x.png"));
        assert!(html.contains("Hujan sedang"));
        assert!(html.contains("28.3°C"));
        assert!(html.contains("11 km/h"));
        assert!(html.contains("(arah 180°)"));
        assert!(html.contains("linear-gradient(180deg, #0ea5e9"));
        assert!(html.contains("Rab"));
        assert!(html.contains("13 Nov"));
        assert!(html.contains("31°/24°"));
        assert!(html.contains("01d@2x.png"));
    }

    #[rstest]
    #[case(7, 3, 3)]
    #[case(2, 5, 2)]
    #[case(5, 5, 5)]
    fn test_strip_length(#[case] available: usize, #[case] horizon: i64, #[case] expected: usize) {
        let html = build_card_html(&report("Bogor", available), Horizon::new(horizon));
        assert_eq!(html.matches(r#"class="day""#).count(), expected);
    }
}
