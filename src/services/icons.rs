//! Weather text → pictogram mapping.
//!
//! JMA publishes free-form Japanese weather text ("晴れ時々曇り",
//! "くもり後一時雨"). The first table entry whose key occurs anywhere in the
//! text decides the icon, so compound terms must precede any shorter key
//! they contain ("大雨" before "雨").

/// Priority-ordered (substring, icon) table. First match wins.
const WEATHER_ICONS: &[(&str, &str)] = &[
    ("晴れ", "☀️"),
    ("晴", "☀️"),
    ("暴風雨", "🌪️"),
    ("大雨", "🌧️"),
    ("小雨", "🌦️"),
    ("雨", "🌧️"),
    ("曇り", "☁️"),
    ("曇", "☁️"),
    ("くもり", "☁️"),
    ("雪", "❄️"),
    ("雷", "⚡"),
    ("霧", "🌫️"),
    ("みぞれ", "🌨️"),
];

/// Icon for a weather description, or `""` when no key matches.
pub fn classify(weather: &str) -> &'static str {
    WEATHER_ICONS
        .iter()
        .find(|(key, _)| weather.contains(key))
        .map(|(_, icon)| *icon)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_keys() {
        assert_eq!(classify("晴れ"), "☀️");
        assert_eq!(classify("くもり"), "☁️");
        assert_eq!(classify("雪"), "❄️");
        assert_eq!(classify("霧"), "🌫️");
        assert_eq!(classify("みぞれ"), "🌨️");
    }

    #[test]
    fn test_compound_rain_terms_are_not_shadowed() {
        assert_eq!(classify("大雨のち曇り"), "🌧️");
        assert_eq!(classify("小雨"), "🌦️");
        assert_eq!(classify("暴風雨"), "🌪️");
        assert_eq!(classify("くもり時々小雨"), "🌦️");
    }

    #[test]
    fn test_first_match_in_table_order_wins() {
        // Both 晴 and 曇 occur; 晴 is declared first regardless of position in the text.
        assert_eq!(classify("曇り時々晴れ"), "☀️");
        // 雨 precedes くもり and 雷 in the table
        assert_eq!(classify("くもり　所により　雨　で　雷を伴う"), "🌧️");
    }

    #[test]
    fn test_every_key_matches_itself() {
        for (key, icon) in WEATHER_ICONS {
            assert_eq!(classify(key), *icon, "{key}");
        }
    }

    #[test]
    fn test_no_match_is_empty() {
        assert_eq!(classify(""), "");
        assert_eq!(classify("風強く"), "");
    }
}
