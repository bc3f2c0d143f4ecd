//! Presentation helpers for turn-by-turn instructions.
//!
//! The routing engine produces English instruction text. [`translate_pt`]
//! rewrites the phrasings it emits into Brazilian Portuguese with a small
//! rule table; anything it does not recognise passes through unchanged.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

use crate::route::Maneuver;

/// `"1.2 km"` from 1000 m upwards, `"222 m"` below, empty for NaN.
pub fn format_distance(meters: f64) -> String {
    if meters.is_nan() {
        return String::new();
    }
    if meters >= 1000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{} m", meters.round() as i64)
    }
}

impl Maneuver {
    /// Terminal glyph shown next to an instruction.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Head | Self::Straight => "⬆️",
            Self::SlightRight => "↗️",
            Self::Right => "➡️",
            Self::SharpRight => "↪️",
            Self::TurnAround => "U🔄",
            Self::SlightLeft => "↖️",
            Self::Left => "⬅️",
            Self::SharpLeft => "↩️",
            Self::WaypointReached | Self::DestinationReached => "📍",
            Self::Roundabout => "🔄",
            Self::OffRamp => "↘️",
            Self::Fork => "🍴",
            Self::Merge => " M ",
            Self::OnRamp | Self::EndOfRoad => "●",
        }
    }
}

// ── Portuguese translation ──

const DISTANCE: &str = r"(?: for ([\d.]+) (km|m|miles|yards|feet))?";

struct Rule {
    pattern: Regex,
    render: fn(&Captures<'_>) -> String,
}

impl Rule {
    fn new(pattern: &str, render: fn(&Captures<'_>) -> String) -> Self {
        let pattern = Regex::new(&format!("(?i)^{pattern}$")).expect("valid instruction pattern");
        Self { pattern, render }
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            r"You have arrived at your destination, on the (left|right)",
            |c| format!("Você chegou ao seu destino, à {}", side(&c[1])),
        ),
        Rule::new(r"You have arrived at your destination", |_| {
            "Você chegou ao seu destino".to_string()
        }),
        Rule::new(r"Destination reached", |_| "Destino alcançado".to_string()),
        Rule::new(r"Waypoint reached", |_| {
            "Ponto de parada alcançado".to_string()
        }),
        Rule::new(
            &format!(r"At the roundabout, take the (\d+)(?:st|nd|rd|th) exit(?: onto (.+?))?{DISTANCE}"),
            |c| {
                let mut out = format!("Na rotatória, pegue a {} saída", ordinal(&c[1]));
                out.push_str(&road(c, 2, "na"));
                out.push_str(&distance(c, 3, "e siga por"));
                out
            },
        ),
        Rule::new(
            &format!(r"Turn (sharp left|left|slight left|sharp right|right|slight right)(?: onto (.+?))?{DISTANCE}"),
            |c| {
                let mut out = format!("Vire {}", turn_modifier(&c[1]));
                out.push_str(&road(c, 2, "na"));
                out.push_str(&distance(c, 3, "e siga por"));
                out
            },
        ),
        Rule::new(&format!(r"Make a U-turn(?: onto (.+?))?{DISTANCE}"), |c| {
            let mut out = "Faça o retorno".to_string();
            out.push_str(&road(c, 1, "na"));
            out.push_str(&distance(c, 2, "e siga por"));
            out
        }),
        Rule::new(
            &format!(r"Head (north|south|east|west|northeast|northwest|southeast|southwest)(?: on (.+?))?{DISTANCE}"),
            |c| {
                let mut out = format!("Siga para {}", compass(&c[1]));
                out.push_str(&road(c, 2, "na"));
                out.push_str(&distance(c, 3, "por"));
                out
            },
        ),
        Rule::new(
            &format!(r"Continue(?: straight)?(?: on(?:to)? (.+?))?{DISTANCE}"),
            |c| {
                if c.get(1).is_none() && c.get(2).is_none() {
                    return "Continue reto".to_string();
                }
                let mut out = "Continue".to_string();
                out.push_str(&road(c, 1, "na"));
                out.push_str(&distance(c, 2, "por"));
                out
            },
        ),
        Rule::new(
            &format!(r"Keep (left|right) at the fork(?: onto (.+?))?{DISTANCE}"),
            |c| {
                let mut out = format!("Mantenha-se à {} na bifurcação", side(&c[1]));
                out.push_str(&road(c, 2, "na"));
                out.push_str(&distance(c, 3, "por"));
                out
            },
        ),
        Rule::new(&format!(r"Keep (left|right)(?: onto (.+?))?{DISTANCE}"), |c| {
            let mut out = format!("Mantenha-se à {}", side(&c[1]));
            out.push_str(&road(c, 2, "na"));
            out.push_str(&distance(c, 3, "por"));
            out
        }),
        Rule::new(&format!(r"Merge(?: onto (.+?))?{DISTANCE}"), |c| {
            let mut out = "Entre".to_string();
            out.push_str(&road(c, 1, "na"));
            out.push_str(&distance(c, 2, "por"));
            out
        }),
        Rule::new(&format!(r"(Take the ramp|Exit)(?: onto (.+?))?{DISTANCE}"), |c| {
            let mut out = if c[1].eq_ignore_ascii_case("exit") {
                "Saia".to_string()
            } else {
                "Pegue a rampa".to_string()
            };
            out.push_str(&road(c, 2, "para"));
            out.push_str(&distance(c, 3, "por"));
            out
        }),
    ]
});

static IMPERIAL_UNITS: LazyLock<[(Regex, &'static str); 3]> = LazyLock::new(|| {
    [
        (Regex::new(r"(?i)(\d*\.?\d+)\s*miles").expect("valid unit pattern"), "$1 milhas"),
        (Regex::new(r"(?i)(\d*\.?\d+)\s*yards").expect("valid unit pattern"), "$1 jardas"),
        (Regex::new(r"(?i)(\d*\.?\d+)\s*feet").expect("valid unit pattern"), "$1 pés"),
    ]
});

/// Translate an English routing instruction into Brazilian Portuguese.
///
/// Unknown phrasings only get imperial units translated; if even that does
/// not apply, the trimmed input is returned as-is.
pub fn translate_pt(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }
    for rule in RULES.iter() {
        if let Some(caps) = rule.pattern.captures(text) {
            return (rule.render)(&caps);
        }
    }

    let mut fallback = text.to_string();
    for (pattern, replacement) in IMPERIAL_UNITS.iter() {
        fallback = pattern.replace_all(&fallback, *replacement).into_owned();
    }
    if fallback != text {
        warn!(input = text, output = %fallback, "instruction translated by unit fallback only");
    } else {
        warn!(input = text, "no translation rule for instruction");
    }
    fallback
}

fn road(c: &Captures<'_>, idx: usize, preposition: &str) -> String {
    c.get(idx)
        .map(|m| format!(" {preposition} {}", m.as_str().trim()))
        .unwrap_or_default()
}

fn distance(c: &Captures<'_>, idx: usize, lead: &str) -> String {
    match (c.get(idx), c.get(idx + 1)) {
        (Some(value), Some(unit)) => format!(" {lead} {} {}", value.as_str(), unit_pt(unit.as_str())),
        _ => String::new(),
    }
}

fn unit_pt(unit: &str) -> String {
    match unit.to_lowercase().as_str() {
        "miles" => "milhas".to_string(),
        "yards" => "jardas".to_string(),
        "feet" => "pés".to_string(),
        other => other.to_string(),
    }
}

fn side(s: &str) -> &'static str {
    if s.eq_ignore_ascii_case("left") {
        "esquerda"
    } else {
        "direita"
    }
}

fn ordinal(s: &str) -> String {
    match s.parse::<u32>() {
        Ok(n) if n >= 1 => format!("{n}ª"),
        _ => s.to_string(),
    }
}

fn turn_modifier(s: &str) -> &'static str {
    match s.to_lowercase().as_str() {
        "sharp left" => "acentuadamente à esquerda",
        "left" => "à esquerda",
        "slight left" => "levemente à esquerda",
        "sharp right" => "acentuadamente à direita",
        "right" => "à direita",
        _ => "levemente à direita",
    }
}

fn compass(s: &str) -> &'static str {
    match s.to_lowercase().as_str() {
        "north" => "norte",
        "south" => "sul",
        "east" => "leste",
        "west" => "oeste",
        "northeast" => "nordeste",
        "northwest" => "noroeste",
        "southeast" => "sudeste",
        _ => "sudoeste",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_formatting() {
        assert_eq!(format_distance(222.39), "222 m");
        assert_eq!(format_distance(999.4), "999 m");
        assert_eq!(format_distance(1000.0), "1.0 km");
        assert_eq!(format_distance(1234.0), "1.2 km");
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(f64::NAN), "");
    }

    #[test]
    fn arrivals() {
        assert_eq!(
            translate_pt("You have arrived at your destination, on the left"),
            "Você chegou ao seu destino, à esquerda"
        );
        assert_eq!(
            translate_pt("You have arrived at your destination"),
            "Você chegou ao seu destino"
        );
        assert_eq!(translate_pt("Destination reached"), "Destino alcançado");
    }

    #[test]
    fn turns_and_roundabouts() {
        assert_eq!(
            translate_pt("Turn slight left onto Rua Augusta"),
            "Vire levemente à esquerda na Rua Augusta"
        );
        assert_eq!(
            translate_pt("Turn right onto Av. Paulista for 1.2 km"),
            "Vire à direita na Av. Paulista e siga por 1.2 km"
        );
        assert_eq!(
            translate_pt("At the roundabout, take the 2nd exit onto Rua B"),
            "Na rotatória, pegue a 2ª saída na Rua B"
        );
        assert_eq!(translate_pt("Make a U-turn"), "Faça o retorno");
    }

    #[test]
    fn head_continue_keep() {
        assert_eq!(
            translate_pt("Head southeast on Rua A for 300 m"),
            "Siga para sudeste na Rua A por 300 m"
        );
        assert_eq!(translate_pt("Continue"), "Continue reto");
        assert_eq!(translate_pt("Continue straight"), "Continue reto");
        assert_eq!(translate_pt("Continue onto BR-116"), "Continue na BR-116");
        assert_eq!(translate_pt("Continue on BR-116"), "Continue na BR-116");
        assert_eq!(
            translate_pt("Continue straight on Rua A for 300 m"),
            "Continue na Rua A por 300 m"
        );
        assert_eq!(translate_pt("Continue for 2 km"), "Continue por 2 km");
        assert_eq!(
            translate_pt("Keep left at the fork onto SP-070"),
            "Mantenha-se à esquerda na bifurcação na SP-070"
        );
        assert_eq!(translate_pt("Keep right"), "Mantenha-se à direita");
    }

    #[test]
    fn merge_and_ramps() {
        assert_eq!(translate_pt("Merge onto Marginal"), "Entre na Marginal");
        assert_eq!(translate_pt("Take the ramp onto I-5 N"), "Pegue a rampa para I-5 N");
        assert_eq!(translate_pt("Exit onto Rua C"), "Saia para Rua C");
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(translate_pt("TURN LEFT"), "Vire à esquerda");
    }

    #[test]
    fn fallback_units_and_passthrough() {
        assert_eq!(translate_pt("Drive 2 miles then stop"), "Drive 2 milhas then stop");
        assert_eq!(translate_pt("  Something else  "), "Something else");
        assert_eq!(translate_pt("   "), "");
    }

    #[test]
    fn every_maneuver_has_a_glyph() {
        assert_eq!(Maneuver::Left.glyph(), "⬅️");
        assert_eq!(Maneuver::DestinationReached.glyph(), "📍");
        assert!(!Maneuver::EndOfRoad.glyph().is_empty());
    }
}
