use geoweather_core::DisplayModel;

pub fn print_display(display: &DisplayModel, tag: Option<&str>) {
    print!("{}", format_display(display, tag));
}

/// Human-readable block for one render.
pub fn format_display(display: &DisplayModel, tag: Option<&str>) -> String {
    let mut out = format!("{}, {}", display.name, display.country);
    if let Some(tag) = tag {
        out.push_str(&format!(" ({tag})"));
    }
    out.push('\n');

    let icon = display.icon.map(|i| format!(" [{i}]")).unwrap_or_default();
    out.push_str(&format!("  {} - {}{}\n", display.condition, display.description, icon));
    out.push_str(&format!("  {}  {}  {}\n", display.temperature, display.min, display.max));
    out.push_str(&format!("  Humidity: {}\n", display.humidity));
    out.push_str(&format!("  Wind: {}\n", display.wind));
    out.push_str(&format!("  Sunrise: {}  Sunset: {}\n", display.sunrise, display.sunset));
    out
}
