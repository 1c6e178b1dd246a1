use crate::domain::model::{Cell, DisplayRow};

use super::dto::Track;
use serde_json::Value;

const UNKNOWN_SIGNIN_ERROR: &str = "Unknown error";

pub fn parse_tracks(body: &[u8]) -> Result<Vec<Track>, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Interprets the body of `POST /signin`. An empty body (blank, `{}`, `[]`
/// or `null`) is a success; anything else carries an error, described by the
/// object's `message` field when present.
pub fn signin_error(body: &str) -> Result<Option<String>, serde_json::Error> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let v: Value = serde_json::from_str(body)?;
    let failed = match &v {
        Value::Null => false,
        Value::Object(m) => !m.is_empty(),
        Value::Array(a) => !a.is_empty(),
        _ => true,
    };
    if !failed {
        return Ok(None);
    }

    // Only an object can carry a message; arrays and scalars cannot.
    let message = match &v {
        Value::Object(m) => m.get("message").and_then(Value::as_str),
        _ => None,
    }
    .unwrap_or(UNKNOWN_SIGNIN_ERROR)
    .to_owned();
    Ok(Some(message))
}

/// True when `body` is the JSON empty object.
pub fn is_empty_object(body: &str) -> bool {
    matches!(serde_json::from_str::<Value>(body), Ok(Value::Object(m)) if m.is_empty())
}

pub fn to_display_rows(tracks: &[Track]) -> Vec<DisplayRow> {
    tracks.iter().map(to_display_row).collect()
}

fn to_display_row(t: &Track) -> DisplayRow {
    DisplayRow::new([
        text_or(&t.title, "unknown title"),
        text_or(&t.artists_title, "unknown artists"),
        Cell::empty(),
        Cell::empty(),
        number_or(t.duration, "unknown duration"),
        number_or(t.bpm, "unknown bpm"),
        Cell::Text(
            t.genres
                .as_ref()
                .map(|g| g.join(", "))
                .unwrap_or_else(|| "unknown genre".to_owned()),
        ),
        text_or(&t.release_date, "unknown releaseDate"),
    ])
}

fn text_or(v: &Option<String>, default: &str) -> Cell {
    Cell::Text(v.clone().unwrap_or_else(|| default.to_owned()))
}

fn number_or(v: Option<f64>, default: &str) -> Cell {
    match v {
        Some(n) => Cell::Number(n),
        None => Cell::Text(default.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::COLUMN_COUNT;

    #[test]
    fn missing_fields_get_sentinels() {
        let rows = to_display_rows(&[Track::default()]);
        let cells = rows[0].cells();
        assert_eq!(cells.len(), COLUMN_COUNT);
        assert_eq!(cells[0].to_string(), "unknown title");
        assert_eq!(cells[1].to_string(), "unknown artists");
        assert_eq!(cells[2].to_string(), "");
        assert_eq!(cells[3].to_string(), "");
        assert_eq!(cells[4].to_string(), "unknown duration");
        assert_eq!(cells[5].to_string(), "unknown bpm");
        assert_eq!(cells[6].to_string(), "unknown genre");
        assert_eq!(cells[7].to_string(), "unknown releaseDate");
    }

    #[test]
    fn fields_are_mapped_in_column_order() {
        let tracks = parse_tracks(
            br#"[{"title":"Tokyo","artistsTitle":"Rogue","duration":254,"bpm":128.5,
                 "genres":["Techno","House"],"releaseDate":"2017-03-01","extra":{"x":1}}]"#,
        )
        .unwrap();
        let rows = to_display_rows(&tracks);
        let cells = rows[0].cells();
        assert_eq!(cells[0], Cell::Text("Tokyo".to_owned()));
        assert_eq!(cells[1], Cell::Text("Rogue".to_owned()));
        assert_eq!(cells[4], Cell::Number(254.0));
        assert_eq!(cells[4].to_string(), "254");
        assert_eq!(cells[5].to_string(), "128.5");
        assert_eq!(cells[6].to_string(), "Techno, House");
        assert_eq!(cells[7].to_string(), "2017-03-01");
    }

    #[test]
    fn missing_bpm_only_affects_its_column() {
        let tracks = parse_tracks(br#"[{"title":"A","duration":10}]"#).unwrap();
        let rows = to_display_rows(&tracks);
        assert_eq!(rows[0].cells()[5].to_string(), "unknown bpm");
        assert_eq!(rows[0].cells()[4], Cell::Number(10.0));
    }

    #[test]
    fn null_fields_default_like_missing_ones() {
        let tracks = parse_tracks(br#"[{"title":null,"genres":null}]"#).unwrap();
        let rows = to_display_rows(&tracks);
        assert_eq!(rows[0].cells()[0].to_string(), "unknown title");
        assert_eq!(rows[0].cells()[6].to_string(), "unknown genre");
    }

    #[test]
    fn mistyped_fields_default_without_failing_the_list() {
        let tracks = parse_tracks(
            br#"[{"title":"Tokyo","bpm":128},
                 {"title":"Odd","bpm":"128","duration":"4:14","genres":"House","artistsTitle":7}]"#,
        )
        .unwrap();
        assert_eq!(tracks.len(), 2);
        let rows = to_display_rows(&tracks);
        assert_eq!(rows[0].cells()[5], Cell::Number(128.0));
        let odd = rows[1].cells();
        assert_eq!(odd[0].to_string(), "Odd");
        assert_eq!(odd[1].to_string(), "unknown artists");
        assert_eq!(odd[4].to_string(), "unknown duration");
        assert_eq!(odd[5].to_string(), "unknown bpm");
        assert_eq!(odd[6].to_string(), "unknown genre");
    }

    #[test]
    fn parse_tracks_rejects_non_json() {
        assert!(parse_tracks(b"<html>").is_err());
        assert!(parse_tracks(b"{}").is_err());
    }

    #[test]
    fn signin_error_cases() {
        assert_eq!(signin_error("{}").unwrap(), None);
        assert_eq!(signin_error("").unwrap(), None);
        assert_eq!(signin_error("[]").unwrap(), None);
        assert_eq!(
            signin_error(r#"{"message":"bad password"}"#).unwrap().as_deref(),
            Some("bad password")
        );
        assert_eq!(
            signin_error(r#"{"error":true}"#).unwrap().as_deref(),
            Some("Unknown error")
        );
        assert_eq!(
            signin_error(r#"["nope"]"#).unwrap().as_deref(),
            Some("Unknown error")
        );
        assert_eq!(
            signin_error(r#"[{"message":"nope"}]"#).unwrap().as_deref(),
            Some("Unknown error")
        );
        assert_eq!(
            signin_error(r#""denied""#).unwrap().as_deref(),
            Some("Unknown error")
        );
        assert_eq!(
            signin_error(r#"{"message":42}"#).unwrap().as_deref(),
            Some("Unknown error")
        );
        assert!(signin_error("not json").is_err());
    }

    #[test]
    fn empty_object_detection() {
        assert!(is_empty_object("{}"));
        assert!(is_empty_object(" { }\n"));
        assert!(!is_empty_object(r#"{"user":{"id":"1"}}"#));
        assert!(!is_empty_object("[]"));
        assert!(!is_empty_object("garbage"));
    }
}
