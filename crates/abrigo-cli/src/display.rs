//! Terminal rendering for cities, hazard zones, shelters and routes.

use abrigo_core::{
    City, GeoPoint, HazardOccurrence, HazardZone, RouteFailure, Shelter, format_distance,
    translate_pt, zone_for,
};
use abrigo_sync::PlannedRoute;

use crate::config::Lang;

const NOT_INFORMED: &str = "not informed";

// ── Public API ──

pub fn print_cities(cities: &[City]) {
    println!("=== Cities ({}) ===", cities.len());
    for city in cities {
        println!(
            "  {:>5}  {}  CEP {}  shelters: {}  occurrences: {}",
            city.id,
            city.name,
            or_not_informed(city.cep.as_deref().map(format_cep)),
            count(city.shelter_count),
            count(city.occurrence_count),
        );
    }
}

pub fn print_city_header(city: &City) {
    println!("# {} (CEP {})", city.name, or_not_informed(city.cep.as_deref().map(format_cep)));
    println!();
}

pub fn print_zones(occurrences: &[HazardOccurrence]) {
    println!("=== Hazard zones ({}) ===", occurrences.len());
    for occurrence in occurrences {
        let zone = zone_for(occurrence);
        println!(
            "  {:>5}  {:<12} severity {:<8} radius {:>4} m  at {}",
            occurrence.id,
            occurrence.category().as_str(),
            occurrence.severity().as_str(),
            zone.radius_m,
            zone.center,
        );
    }
}

/// Shelter list with a hazard flag and, when `origin` is known, the distance.
pub fn print_shelters(shelters: &[Shelter], zones: &[HazardZone], origin: Option<GeoPoint>) {
    println!("=== Shelters ({}) ===", shelters.len());
    for shelter in shelters {
        let position = shelter.position();
        let flag = if !position.is_finite() {
            "NO LOCATION"
        } else if zones.iter().any(|z| z.contains(&position)) {
            "IN HAZARD ZONE"
        } else {
            "outside hazard zones"
        };
        let distance = origin
            .map(|o| format_distance(o.distance_m(&position)))
            .filter(|d| !d.is_empty())
            .map(|d| format!("  {d} away"))
            .unwrap_or_default();
        println!("  {:>5}  {}  [{flag}]{distance}", shelter.id, shelter.name);
        print_shelter_details(shelter);
    }
}

/// Print a planned route as a card: destination, summary, warning, steps.
pub fn print_route_card(route: &PlannedRoute, lang: Lang) {
    let shelter = &route.shelter;
    println!("=== Route to {} ===", shelter.name);
    print_shelter_details(shelter);
    println!();

    println!(
        "  {} · {}  (straight line {})",
        format_distance(route.path.distance_m),
        format_duration(route.path.duration_s),
        format_distance(route.direct_distance_m),
    );
    println!("  from {}", route.origin);
    println!("  computed {}", route.computed_at.format("%Y-%m-%d %H:%M:%S UTC"));

    if !route.verdict.is_safe() {
        println!();
        println!("  ⚠ WARNING: this route passes through a hazard area.");
        println!("    Proceed with caution or choose another shelter.");
    }

    if route.path.instructions.is_empty() {
        return;
    }
    println!();
    println!("  Instructions:");
    for (i, step) in route.path.instructions.iter().enumerate() {
        let text = match lang {
            Lang::En => step.text.clone(),
            Lang::Pt => translate_pt(&step.text),
        };
        let distance = format_distance(step.distance_m);
        if step.distance_m > 0.0 && !distance.is_empty() {
            println!("  {:>3}. {} {}  ({distance})", i + 1, step.maneuver.glyph(), text);
        } else {
            println!("  {:>3}. {} {}", i + 1, step.maneuver.glyph(), text);
        }
    }
}

pub fn print_failure(failure: &RouteFailure) {
    let title = match failure {
        RouteFailure::NoShelters => "No shelter available",
        RouteFailure::NoSafeShelter => "No safe shelter",
        RouteFailure::Geolocation(_) => "Location error",
        RouteFailure::Routing(_) => "Routing error",
    };
    eprintln!("=== {title} ===");
    eprintln!("{failure}");
}

// ── Field formatting ──

/// `12345678` → `12345-678`; anything that is not 8 digits is left alone.
pub fn format_cep(cep: &str) -> String {
    let digits = digits(cep);
    if digits.len() == 8 {
        format!("{}-{}", &digits[..5], &digits[5..])
    } else {
        cep.to_string()
    }
}

/// Brazilian phone numbers: 11 digits → `(XX) XXXXX-XXXX`,
/// 10 digits → `(XX) XXXX-XXXX`, anything else unchanged.
pub fn format_phone(phone: &str) -> String {
    let digits = digits(phone);
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => phone.to_string(),
    }
}

pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return String::new();
    }
    let minutes = (seconds / 60.0).round() as u64;
    if minutes < 60 {
        format!("{minutes} min")
    } else {
        format!("{} h {:02} min", minutes / 60, minutes % 60)
    }
}

// ── Helpers ──

fn print_shelter_details(shelter: &Shelter) {
    if let Some(address) = shelter.address.as_deref().filter(|a| !a.is_empty()) {
        println!("         {address}");
    }
    println!(
        "         CEP {}  phone {}  capacity {}  status {}",
        or_not_informed(shelter.cep.as_deref().map(format_cep)),
        or_not_informed(shelter.phone.as_deref().map(format_phone)),
        count(shelter.capacity),
        shelter.operating_status.as_deref().unwrap_or(NOT_INFORMED),
    );
}

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

fn or_not_informed(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_INFORMED.to_string())
}

fn count(value: Option<u32>) -> String {
    value.map_or_else(|| "?".to_string(), |n| n.to_string())
}
