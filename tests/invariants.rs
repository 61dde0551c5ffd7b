//! Contract Invariant Tests
//!
//! These tests drive the whole pipeline against real PNG files.

use std::fs;
use std::path::PathBuf;

use cssprite_core::{
    config::Correspondence, hash_pixels, PipelineError, RunReport, SpriteConfig, SpritePipeline,
};
use image::{Rgba, RgbaImage};
use tempfile::TempDir;

struct Roots {
    src: TempDir,
    out: TempDir,
}

impl Roots {
    fn new() -> Self {
        Self {
            src: tempfile::tempdir().unwrap(),
            out: tempfile::tempdir().unwrap(),
        }
    }

    fn icon_dir(&self, config: &SpriteConfig) -> PathBuf {
        let dir = self.src.path().join(&config.src.dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn add_icon(&self, config: &SpriteConfig, file: &str, w: u32, h: u32, color: Rgba<u8>) {
        let path = self.icon_dir(config).join(file);
        RgbaImage::from_pixel(w, h, color).save(path).unwrap();
    }

    fn run(&self, config: &SpriteConfig) -> Result<RunReport, PipelineError> {
        SpritePipeline::default().run(config, self.src.path(), self.out.path())
    }

    fn css(&self, config: &SpriteConfig) -> String {
        fs::read_to_string(self.src.path().join(&config.dst.css_file)).unwrap()
    }
}

fn quiet() -> SpriteConfig {
    SpriteConfig {
        verbose: false,
        ..SpriteConfig::default()
    }
}

fn icon_rules(css: &str) -> Vec<&str> {
    css.lines().filter(|l| l.starts_with(".sprite-")).collect()
}

#[test]
fn invariant_two_icon_example() {
    let roots = Roots::new();
    let config = quiet();
    roots.add_icon(&config, "a.png", 10, 20, Rgba([255, 0, 0, 255]));
    roots.add_icon(&config, "b.png", 30, 5, Rgba([0, 0, 255, 128]));

    let report = roots.run(&config).unwrap();
    assert_eq!((report.canvas.width, report.canvas.height), (40, 20));
    assert_eq!(report.icon_count, 2);
    assert_eq!(report.rule_count, 3);

    let sprite_path = roots.out.path().join("img/sprite.png");
    assert_eq!(report.sprite_files, vec![sprite_path.clone()]);
    let sprite = image::open(&sprite_path).unwrap().into_rgba8();
    assert_eq!(sprite.dimensions(), (40, 20));
    assert_eq!(sprite.get_pixel(9, 19), &Rgba([255, 0, 0, 255]));
    assert_eq!(sprite.get_pixel(10, 0), &Rgba([0, 0, 255, 128]));
    assert_eq!(sprite.get_pixel(10, 5)[3], 0);

    let css = roots.css(&config);
    assert!(css.starts_with("/* Auto-generated by cssprite */\n"));
    assert_eq!(
        icon_rules(&css),
        vec![
            ".sprite-a { background-position: -0px -0px; width: 10px; height: 20px; }",
            ".sprite-b { background-position: -10px -0px; width: 30px; height: 5px; }",
        ]
    );
}

#[test]
fn invariant_hash_matches_written_pixels() {
    let roots = Roots::new();
    let config = quiet();
    roots.add_icon(&config, "a.png", 3, 3, Rgba([1, 2, 3, 4]));

    let report = roots.run(&config).unwrap();
    let sprite = image::open(roots.out.path().join("img/sprite.png"))
        .unwrap()
        .into_rgba8();
    assert_eq!(hash_pixels(&sprite), report.hash);

    let css = roots.css(&config);
    let expected = format!(".sprite {{ background-image: url(/img/sprite.png?v={}); }}", report.hash);
    assert!(css.contains(&expected));
}

#[test]
fn invariant_rerun_is_byte_identical() {
    let roots = Roots::new();
    let config = quiet();
    roots.add_icon(&config, "x.png", 4, 4, Rgba([9, 9, 9, 255]));
    roots.add_icon(&config, "y.png", 2, 6, Rgba([0, 200, 0, 10]));

    let first = roots.run(&config).unwrap();
    let css1 = roots.css(&config);
    let preload1 = fs::read_to_string(first.preload_file.as_ref().unwrap()).unwrap();

    let second = roots.run(&config).unwrap();
    assert_eq!(first.hash, second.hash);
    assert_eq!(css1, roots.css(&config));
    assert_eq!(
        preload1,
        fs::read_to_string(second.preload_file.as_ref().unwrap()).unwrap()
    );
}

#[test]
fn invariant_hash_ignores_encoding() {
    // Same pixels written as webp and png must not change the token
    let roots = Roots::new();
    let mut config = quiet();
    roots.add_icon(&config, "a.png", 5, 5, Rgba([100, 50, 25, 200]));
    let png = roots.run(&config).unwrap();

    config.dst.sprite_file = "img/sprite.webp".into();
    let webp = roots.run(&config).unwrap();
    assert_eq!(png.hash, webp.hash);
    assert!(roots.css(&config).contains("url(/img/sprite.webp?v="));
}

#[test]
fn invariant_pixel_change_changes_hash() {
    let roots = Roots::new();
    let config = quiet();
    roots.add_icon(&config, "a.png", 5, 5, Rgba([100, 50, 25, 200]));
    let before = roots.run(&config).unwrap();

    roots.add_icon(&config, "a.png", 5, 5, Rgba([100, 50, 25, 201]));
    let after = roots.run(&config).unwrap();
    assert_ne!(before.hash, after.hash);
}

#[test]
fn invariant_missing_correspondence_file_skipped() {
    let roots = Roots::new();
    let mut config = quiet();
    roots.add_icon(&config, "house.png", 8, 8, Rgba([0, 0, 0, 255]));
    roots.add_icon(&config, "envelope.png", 6, 4, Rgba([0, 0, 0, 255]));
    config.src.correspondence = Some(vec![
        Correspondence::new("mail", "envelope.png"),
        Correspondence::new("ghost", "missing.png"),
        Correspondence::new("home", "house.png"),
    ]);

    let report = roots.run(&config).unwrap();
    assert_eq!(report.icon_count, 2);
    assert_eq!(report.rule_count, 3);

    let css = roots.css(&config);
    assert!(!css.contains("ghost"));
    assert_eq!(
        icon_rules(&css),
        vec![
            ".sprite-mail { background-position: -0px -0px; width: 6px; height: 4px; }",
            ".sprite-home { background-position: -6px -0px; width: 8px; height: 8px; }",
        ]
    );
}

#[test]
fn invariant_prefix_selects_icon() {
    let roots = Roots::new();
    let mut config = quiet();
    config.dst.css_prefix = ".icon-".into();
    roots.add_icon(&config, "home.png", 2, 2, Rgba([0, 0, 0, 255]));

    roots.run(&config).unwrap();
    assert!(roots.css(&config).contains("\n.icon-home { "));
}

#[test]
fn invariant_preload_optional() {
    let roots = Roots::new();
    let mut config = quiet();
    config.dst.preload_file = None;
    roots.add_icon(&config, "a.png", 2, 2, Rgba([0, 0, 0, 255]));

    let report = roots.run(&config).unwrap();
    assert!(report.preload_file.is_none());
    assert!(!roots.src.path().join("components").exists());
}

#[test]
fn invariant_preload_references_same_url() {
    let roots = Roots::new();
    let config = quiet();
    roots.add_icon(&config, "a.png", 2, 2, Rgba([0, 0, 0, 255]));

    let report = roots.run(&config).unwrap();
    let path = report.preload_file.unwrap();
    assert_eq!(path, roots.src.path().join("components/SpritePreload.html"));
    let text = fs::read_to_string(path).unwrap();
    assert!(text.contains(&format!(r#"href="/img/sprite.png?v={}""#, report.hash)));
    assert!(text.contains(r#"rel="preload""#));
}

#[test]
fn invariant_extra_encodings_share_pixels() {
    let roots = Roots::new();
    let mut config = quiet();
    config.dst.extra_sprite_files = vec!["img/sprite.webp".into()];
    roots.add_icon(&config, "a.png", 3, 7, Rgba([0, 0, 0, 255]));

    let report = roots.run(&config).unwrap();
    assert_eq!(report.sprite_files.len(), 2);
    for file in &report.sprite_files {
        assert_eq!(image::image_dimensions(file).unwrap(), (3, 7));
    }
    assert!(!roots.css(&config).contains(".webp"));
}

#[test]
fn invariant_missing_source_dir_fatal() {
    let roots = Roots::new();
    let config = quiet();
    let err = roots.run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::SourceNotFound(_)));
    assert!(!roots.src.path().join(&config.dst.css_file).exists());
}

#[test]
fn invariant_no_stylesheet_without_sprite() {
    let roots = Roots::new();
    let config = quiet();
    roots.add_icon(&config, "a.png", 2, 2, Rgba([0, 0, 0, 255]));
    // A file where the sprite's parent directory should be
    fs::write(roots.out.path().join("img"), b"in the way").unwrap();

    let err = roots.run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Write { .. }));
    assert!(!roots.src.path().join(&config.dst.css_file).exists());
}

#[test]
fn invariant_empty_icon_set_fatal() {
    let roots = Roots::new();
    let config = quiet();
    roots.icon_dir(&config);

    let err = roots.run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::EmptySprite));
    assert!(!roots.src.path().join(&config.dst.css_file).exists());
}

#[test]
fn invariant_unreadable_icon_keeps_zero_rule() {
    let roots = Roots::new();
    let config = quiet();
    roots.add_icon(&config, "a.png", 2, 2, Rgba([0, 0, 0, 255]));
    fs::write(roots.icon_dir(&config).join("b.png"), b"corrupt").unwrap();

    let report = roots.run(&config).unwrap();
    assert_eq!(report.icon_count, 2);
    assert_eq!(report.rule_count, 3);
    assert!(roots
        .css(&config)
        .contains(".sprite-b { background-position: -2px -0px; width: 0px; height: 0px; }"));
}

#[test]
fn invariant_config_override_from_json() {
    let roots = Roots::new();
    let config = SpriteConfig::from_json_override(
        r#"{"src": {"dir": "icons"}, "dst": {"cssFile": "styles/icons.css", "useInSpan": true}, "verbose": false}"#,
    )
    .unwrap();
    roots.add_icon(&config, "a.png", 2, 2, Rgba([0, 0, 0, 255]));

    roots.run(&config).unwrap();
    let css = fs::read_to_string(roots.src.path().join("styles/icons.css")).unwrap();
    assert!(css.contains("display: inline-block;"));
    assert!(roots.src.path().join("icons/a.png").is_file());
}

#[test]
fn invariant_avif_icons_rejected_up_front() {
    let roots = Roots::new();
    let mut config = quiet();
    config.src.extension = ".avif".into();
    let icon = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
    icon.save_with_format(
        roots.icon_dir(&config).join("a.avif"),
        image::ImageFormat::Avif,
    )
    .unwrap();

    let err = roots.run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Configuration(_)));
    assert!(err.to_string().contains("AVIF"));
    assert!(!roots.out.path().join("img").exists());
    assert!(!roots.src.path().join(&config.dst.css_file).exists());
}

#[test]
fn invariant_misspelt_override_key_rejected() {
    let err = SpriteConfig::from_json_override(r#"{"dst": {"cssPrefx": ".icon-"}}"#).unwrap_err();
    assert!(matches!(err, PipelineError::Serialization(_)));
}
