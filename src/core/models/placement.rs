use anyhow::{bail, Error};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AdType {
    #[default]
    Banner,
    Video,
    Audio,
    Native,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Builder)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

/// Video placement settings mapped onto the OpenRTB video object
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct VideoSettings {
    pub mimes: Vec<String>,
    /// Seconds
    pub min_duration: u32,
    /// Seconds
    pub max_duration: u32,
    /// VAST protocol codes
    pub protocols: Vec<i32>,
    pub linearity: i32,
    pub start_delay: i32,
    pub playback_methods: Vec<i32>,
    pub apis: Vec<i32>,
}

impl Default for VideoSettings {
    fn default() -> Self {
        // Defaults applied when a video placement carries no explicit
        // settings: mp4/webm, 5-30s, VAST 2/3 + wrappers, linear
        Self {
            mimes: vec!["video/mp4".to_string(), "video/webm".to_string()],
            min_duration: 5,
            max_duration: 30,
            protocols: vec![2, 3, 5, 6],
            linearity: 1,
            start_delay: 0,
            playback_methods: Vec::new(),
            apis: Vec::new(),
        }
    }
}

/// A single ad slot on a site
#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[serde(default)]
pub struct Placement {
    pub id: String,
    pub site_id: String,
    pub name: String,
    pub ad_type: AdType,
    pub width: u32,
    pub height: u32,
    /// Minimum acceptable bid in USD CPM
    pub floor_price: f64,
    /// Additional banner sizes beyond width x height
    pub formats: Vec<Size>,
    pub video: Option<VideoSettings>,
    /// Blocked IAB content categories
    pub bcat: Vec<String>,
    /// Blocked advertiser domains
    pub badv: Vec<String>,
    pub active: bool,
}

impl Placement {
    /// Catalog invariants: a video placement needs at least one MIME
    /// and a positive max duration, a banner placement needs either
    /// explicit dimensions or a format list
    pub fn validate(&self) -> Result<(), Error> {
        if self.floor_price < 0.0 {
            bail!("placement {} floor must be non-negative", self.id);
        }

        match self.ad_type {
            AdType::Video => {
                let video = self.video.clone().unwrap_or_default();

                if video.mimes.is_empty() {
                    bail!("video placement {} has no mimes", self.id);
                }
                if video.max_duration == 0 {
                    bail!("video placement {} has no max duration", self.id);
                }
            }
            AdType::Banner => {
                if (self.width == 0 || self.height == 0) && self.formats.is_empty() {
                    bail!(
                        "banner placement {} needs dimensions or a format list",
                        self.id
                    );
                }
            }
            _ => {}
        }

        Ok(())
    }
}
