use super::*;

const CATALOG_JSON: &str = r##"
{
  "templates": [
    {
      "name": "swadeshi",
      "source": "bg/swadeshi.png",
      "canvas": { "width": 1080, "height": 1920 },
      "frame": { "size_px": 400, "offset_frac": -0.05 },
      "campaign_prefix": "Swadeshi",
      "overlay": { "font": "fonts/Bold.ttf", "max_line_width_px": 520, "background": "#fafafa" },
      "share": { "title": "My Swadeshi Poster", "text": "Join the movement!" }
    },
    {
      "name": "square-small",
      "source": "data:image/png;base64,AAAA",
      "canvas": { "width": 512, "height": 512 },
      "frame": { "size_px": 128 },
      "campaign_prefix": "Small",
      "share": { "title": "t", "text": "x" }
    }
  ]
}
"##;

#[test]
fn builtin_catalog_has_both_reference_posters() {
    let catalog = TemplateCatalog::builtin("/assets");
    assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["poster1", "poster2"]);

    let t = catalog.get(&TemplateSelector::default()).unwrap();
    t.validate().unwrap();
    assert_eq!(t.canvas, Canvas { width: 1080, height: 1920 });
    assert_eq!(t.frame.size_px, 360);
    assert_eq!(t.campaign_prefix, "GCCD-2025");
    assert_eq!(
        t.source,
        ImageSource::Path(PathBuf::from("/assets/templates/poster1.png"))
    );
}

#[test]
fn json_catalog_parses_and_resolves_relative_paths() {
    let catalog =
        TemplateCatalog::from_reader(CATALOG_JSON.as_bytes(), Path::new("/cfg")).unwrap();
    assert_eq!(catalog.len(), 2);

    let t = catalog.get(&TemplateSelector::new("swadeshi")).unwrap();
    assert_eq!(t.source, ImageSource::Path(PathBuf::from("/cfg/bg/swadeshi.png")));
    assert_eq!(t.overlay.font, FontSource::Path(PathBuf::from("/cfg/fonts/Bold.ttf")));
    assert_eq!(t.overlay.max_line_width_px, 520.0);
    // Unspecified overlay fields keep their defaults.
    assert_eq!(t.overlay.font_size_px, 36.0);
    assert_eq!(t.overlay.background, Rgba8::rgb(0xfa, 0xfa, 0xfa));

    let small = catalog.get(&TemplateSelector::new("square-small")).unwrap();
    assert!(matches!(small.source, ImageSource::DataUrl(_)));
    assert_eq!(small.frame.offset_frac, 0.0);
    assert_eq!(small.overlay, OverlayStyle::default());
}

#[test]
fn unknown_selector_is_a_validation_error() {
    let catalog = TemplateCatalog::builtin(".");
    let err = catalog.get(&TemplateSelector::new("poster9")).unwrap_err();
    assert!(err.to_string().contains("unknown template 'poster9'"));
}

#[test]
fn oversized_frame_is_rejected_at_definition_time() {
    let json = r#"{ "templates": [ {
        "name": "bad", "source": "bg.png",
        "canvas": { "width": 300, "height": 300 },
        "frame": { "size_px": 301 },
        "campaign_prefix": "Bad",
        "share": { "title": "t", "text": "x" } } ] }"#;
    let err = TemplateCatalog::from_reader(json.as_bytes(), Path::new(".")).unwrap_err();
    assert!(err.to_string().contains("template 'bad'"));
}

#[test]
fn translucent_overlay_background_is_rejected() {
    let mut t = PosterTemplate::reference("p", ImageSource::from_bytes(vec![0u8]));
    t.overlay.background = Rgba8::from_hex("#ffffff80").unwrap();
    assert!(t.validate().is_err());
}

#[test]
fn duplicate_names_and_bad_prefixes_are_rejected() {
    let mut catalog = TemplateCatalog::new();
    let t = PosterTemplate::reference("p", ImageSource::from_bytes(vec![0u8]));
    catalog.insert(t.clone()).unwrap();
    assert!(catalog.insert(t.clone()).is_err());

    let mut bad = t;
    bad.name = "q".to_owned();
    bad.campaign_prefix = "a/b".to_owned();
    assert!(catalog.insert(bad).is_err());
}

#[test]
fn malformed_json_is_a_validation_error() {
    let err = TemplateCatalog::from_reader("{".as_bytes(), Path::new(".")).unwrap_err();
    assert!(matches!(err, PosterError::Validation(_)));
}
