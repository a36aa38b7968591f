//! Conversion options shared across the pipeline.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::geometry::{PageSize, RenderTarget};

/// Upload ceiling carried over from the upload form: 100 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// All options controlling a conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    // -- General --
    pub verbose: u8,

    // -- Page Setup --
    pub page_size: PageSize,
    /// Page margin in points, applied on all four sides.
    pub margin: f32,

    // -- Rendering --
    pub quality: Quality,
    /// Content height (CSS px) above which rasterized documents are rendered
    /// band by band instead of as one bitmap.
    pub large_document_threshold: u32,
    pub number_pages: bool,
    /// Print "Converted from: <name>" at the top of text output.
    pub text_header: bool,
    pub render_timeout_secs: Option<u64>,
    /// Instant at which the running conversion is abandoned. Set by the
    /// dispatcher from `render_timeout_secs`; never read from config.
    #[serde(skip)]
    pub deadline: Option<Instant>,

    // -- Admission --
    pub max_file_size: u64,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            verbose: 0,
            page_size: PageSize::A4,
            margin: 40.0,
            quality: Quality::Standard,
            large_document_threshold: 3000,
            number_pages: true,
            text_header: true,
            render_timeout_secs: None,
            deadline: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ConversionOptions {
    /// Parse a TOML config file body; missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ConvertError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConvertError::Config(e.to_string()))
    }

    pub fn render_target(&self) -> RenderTarget {
        RenderTarget::new(self.page_size, self.margin, self.quality.pixel_ratio())
    }

    pub fn render_timeout(&self) -> Option<Duration> {
        self.render_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Fail with `Timeout` once the deadline has passed. Long renderers call
    /// this between units of work so an abandoned conversion stops early.
    pub fn check_deadline(&self) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ConvertError::Timeout(
                self.render_timeout().unwrap_or_default(),
            )),
            _ => Ok(()),
        }
    }
}

/// Rasterization quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quality {
    Draft,
    #[default]
    Standard,
    High,
}

impl Quality {
    /// Device pixels per CSS pixel.
    pub fn pixel_ratio(self) -> f32 {
        match self {
            Quality::Draft => 1.0,
            Quality::Standard => 2.0,
            Quality::High => 3.0,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "draft" => Some(Quality::Draft),
            "standard" => Some(Quality::Standard),
            "high" => Some(Quality::High),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip_full() {
        let mut opts = ConversionOptions::default();
        opts.verbose = 2;
        opts.page_size = PageSize::Letter;
        opts.margin = 36.0;
        opts.quality = Quality::High;
        opts.large_document_threshold = 5000;
        opts.number_pages = false;
        opts.render_timeout_secs = Some(30);

        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: ConversionOptions = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.verbose, 2);
        assert_eq!(parsed.page_size, PageSize::Letter);
        assert_eq!(parsed.margin, 36.0);
        assert_eq!(parsed.quality, Quality::High);
        assert_eq!(parsed.large_document_threshold, 5000);
        assert!(!parsed.number_pages);
        assert_eq!(parsed.render_timeout_secs, Some(30));
    }

    #[test]
    fn test_deadline() {
        let mut opts = ConversionOptions {
            render_timeout_secs: Some(5),
            ..ConversionOptions::default()
        };
        assert!(opts.check_deadline().is_ok());
        opts.deadline = Some(Instant::now() + Duration::from_secs(60));
        assert!(opts.check_deadline().is_ok());
        opts.deadline = Some(Instant::now());
        assert!(matches!(
            opts.check_deadline(),
            Err(ConvertError::Timeout(d)) if d == Duration::from_secs(5)
        ));
        assert!(!opts.to_toml().unwrap().contains("deadline"));
    }

    #[test]
    fn test_toml_partial_config() {
        let toml_str = r#"
page_size = "legal"
quality = "draft"
"#;
        let opts: ConversionOptions = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.page_size, PageSize::Legal);
        assert_eq!(opts.quality, Quality::Draft);
        // Defaults filled in
        assert_eq!(opts.margin, 40.0);
        assert_eq!(opts.large_document_threshold, 3000);
        assert_eq!(opts.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert!(opts.text_header);
    }

    #[test]
    fn test_render_target_honors_options() {
        let opts = ConversionOptions {
            page_size: PageSize::Letter,
            margin: 72.0,
            quality: Quality::High,
            ..Default::default()
        };
        let target = opts.render_target();
        assert_eq!(target.width, 612.0);
        assert_eq!(target.height, 792.0);
        assert_eq!(target.printable_width(), 468.0);
        assert_eq!(target.pixel_ratio, 3.0);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let mut opts = ConversionOptions::default();
        assert_eq!(opts.render_timeout(), None);
        opts.render_timeout_secs = Some(0);
        assert_eq!(opts.render_timeout(), None);
        opts.render_timeout_secs = Some(5);
        assert_eq!(opts.render_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_unknown_quality_rejected() {
        let err = ConversionOptions::from_toml(r#"quality = "ultra""#).unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
        assert_eq!(Quality::from_name("HIGH"), Some(Quality::High));
    }

    #[test]
    fn test_dump_is_loadable() {
        let dumped = ConversionOptions::default().to_toml().unwrap();
        let parsed = ConversionOptions::from_toml(&dumped).unwrap();
        assert_eq!(parsed.page_size, PageSize::A4);
        assert_eq!(parsed.quality, Quality::Standard);
    }
}
