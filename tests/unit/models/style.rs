//! Unit tests for overlay styles

use findscan::models::style::{
    hex_to_rgba, parse_hex_color, BollingerStyles, LineStyleKind, StyleError,
};

#[test]
fn test_default_styles_are_valid() {
    let styles = BollingerStyles::default();
    assert!(styles.validate().is_ok());
    assert_eq!(styles.basis.color, "#FFD700");
    assert_eq!(styles.upper.color, "#2196F3");
    assert_eq!(styles.background.opacity, 0.2);
}

#[test]
fn test_parse_hex_color() {
    assert_eq!(parse_hex_color("#2196F3"), Some((0x21, 0x96, 0xF3)));
    assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
    assert_eq!(parse_hex_color("2196F3"), None);
    assert_eq!(parse_hex_color("#12345"), None);
    assert_eq!(parse_hex_color("#zzzzzz"), None);
}

#[test]
fn test_hex_to_rgba() {
    assert_eq!(
        hex_to_rgba("#2196F3", 0.2).as_deref(),
        Some("rgba(33,150,243,0.2)")
    );
    assert_eq!(hex_to_rgba("#f00", 1.0).as_deref(), Some("rgba(255,0,0,1)"));
}

#[test]
fn test_dash_values() {
    assert_eq!(LineStyleKind::Solid.dash_value(), [1, 0]);
    assert_eq!(LineStyleKind::Dashed.dash_value(), [2, 2]);
}

#[test]
fn test_validate_rejects_bad_width() {
    let mut styles = BollingerStyles::default();
    styles.upper.width = 11;
    assert_eq!(
        styles.validate(),
        Err(StyleError::InvalidWidth {
            target: "upper",
            width: 11
        })
    );

    styles.upper.width = 0;
    assert!(styles.validate().is_err());
}

#[test]
fn test_validate_rejects_bad_color() {
    let mut styles = BollingerStyles::default();
    styles.lower.color = "blue".to_string();
    assert!(matches!(
        styles.validate(),
        Err(StyleError::InvalidColor { target: "lower", .. })
    ));
}

#[test]
fn test_validate_rejects_bad_opacity() {
    let mut styles = BollingerStyles::default();
    styles.background.opacity = 1.5;
    assert_eq!(styles.validate(), Err(StyleError::InvalidOpacity(1.5)));
}

#[test]
fn test_styles_wire_format() {
    let json = serde_json::to_value(BollingerStyles::default()).unwrap();
    assert_eq!(json["basis"]["style"], "solid");
    assert_eq!(json["background"]["display"], true);

    let parsed: BollingerStyles = serde_json::from_value(serde_json::json!({
        "basis": {"display": false, "color": "#FFD700", "width": 2, "style": "dashed"},
        "upper": {"display": true, "color": "#2196F3", "width": 1, "style": "solid"},
        "lower": {"display": true, "color": "#2196F3", "width": 1, "style": "solid"},
        "background": {"display": true, "color": "#2196F3", "opacity": 0.5}
    }))
    .unwrap();
    assert!(!parsed.basis.display);
    assert_eq!(parsed.basis.style, LineStyleKind::Dashed);
}
