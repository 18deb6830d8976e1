// ── Property normalization ──
//
// Source files disagree on property spelling (name vs nombre vs Nombre,
// and so on). All alias resolution happens here, once, at ingestion;
// the rest of the crate only ever sees the canonical schema.

use serde_json::Value;
use tracing::warn;

use super::feature::{Feature, FeatureId};
use super::level::Level;

/// Source-field aliases for the group (aquifer) name, checked in order.
const GROUP_ALIASES: &[&str] = &[
    "acuifero", "Acuifero", "ACUIFERO", "nombre", "Nombre", "NOMBRE", "name",
];

/// Source-field aliases for the alternate lookup key.
const KEY_ALIASES: &[&str] = &["clave", "Clave", "CLAVE", "key"];

/// Source-field aliases for the vulnerability level.
const LEVEL_ALIASES: &[&str] = &[
    "vulnerabilidad",
    "Vulnerabilidad",
    "VULNERABILIDAD",
    "vulnerability",
    "vuln",
];

/// Build a canonical [`Feature`] from a raw GeoJSON feature.
///
/// Returns `None` when the feature has no usable geometry — such
/// features cannot be rendered or contribute to bounds, so they are
/// dropped (and counted by the caller). Missing or malformed attributes
/// never drop a feature: they normalize to `None` / `Unknown`.
pub fn normalize_feature(id: FeatureId, raw: &geojson::Feature) -> Option<Feature> {
    let geometry = match raw.geometry.as_ref().map(geo_types::Geometry::try_from) {
        Some(Ok(geometry)) => geometry,
        Some(Err(e)) => {
            warn!(feature = %id, error = %e, "unsupported geometry; dropping feature");
            return None;
        }
        None => {
            warn!(feature = %id, "feature has no geometry; dropping");
            return None;
        }
    };

    let props = raw.properties.as_ref();

    let group = props.and_then(|p| first_string(p, GROUP_ALIASES));
    let key = props.and_then(|p| first_string(p, KEY_ALIASES));

    let level_value = props.and_then(|p| first_value(p, LEVEL_ALIASES));
    let level = Level::from_value(level_value);
    if level == Level::Unknown && level_value.is_some() {
        warn!(feature = %id, value = ?level_value, "malformed vulnerability level");
    }

    let display = props
        .map(|p| {
            p.iter()
                .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.clone(), s)))
                .collect()
        })
        .unwrap_or_default();

    Some(Feature {
        id,
        group,
        key,
        level,
        display,
        geometry,
    })
}

/// First alias present with a non-empty string value.
fn first_string(props: &geojson::JsonObject, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| props.get(*alias))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            _ => None,
        })
}

/// First alias present with any value.
fn first_value<'a>(props: &'a geojson::JsonObject, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| props.get(*alias))
}

/// Scalar property → display string; structured values are skipped.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
