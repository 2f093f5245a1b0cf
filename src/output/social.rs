use url::Url;

use crate::foundation::error::{PosterError, PosterResult};
use crate::template::catalog::ShareContent;

/// Social network the user wants to post to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    /// `wa.me` text intent.
    WhatsApp,
    /// Facebook sharer.
    Facebook,
    /// Twitter/X tweet intent.
    Twitter,
    /// LinkedIn share-offsite.
    LinkedIn,
    /// Telegram share URL.
    Telegram,
    /// No URL intent; the image goes through the clipboard.
    Instagram,
}

impl SocialPlatform {
    /// Every supported platform, in menu order.
    pub const ALL: [Self; 6] = [
        Self::WhatsApp,
        Self::Facebook,
        Self::Twitter,
        Self::LinkedIn,
        Self::Telegram,
        Self::Instagram,
    ];

    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            Self::WhatsApp => "WhatsApp",
            Self::Facebook => "Facebook",
            Self::Twitter => "Twitter/X",
            Self::LinkedIn => "LinkedIn",
            Self::Telegram => "Telegram",
            Self::Instagram => "Instagram",
        }
    }
}

impl std::str::FromStr for SocialPlatform {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whatsapp" => Ok(Self::WhatsApp),
            "facebook" => Ok(Self::Facebook),
            "twitter" | "x" => Ok(Self::Twitter),
            "linkedin" => Ok(Self::LinkedIn),
            "telegram" => Ok(Self::Telegram),
            "instagram" => Ok(Self::Instagram),
            other => Err(PosterError::validation(format!(
                "unknown social platform \"{other}\""
            ))),
        }
    }
}

/// How to reach a platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SocialTarget {
    /// Open this URL in a browser.
    Url(Url),
    /// Copy the poster to the clipboard and paste it in the app.
    Clipboard {
        /// Instruction shown to the user.
        hint: &'static str,
    },
}

/// Share link for `platform`, carrying the caption from `content` and the campaign page.
pub fn share_target(
    platform: SocialPlatform,
    content: &ShareContent,
    site_url: &Url,
) -> PosterResult<SocialTarget> {
    let site = site_url.as_str();
    let text = content.text.as_str();
    // Text-only intents have no url parameter, so the link rides in the caption.
    let text_with_site = if text.contains(site) {
        text.to_owned()
    } else {
        format!("{text} {site}")
    };
    let url = match platform {
        SocialPlatform::WhatsApp => {
            Url::parse_with_params("https://wa.me/", [("text", text_with_site.as_str())])
        }
        SocialPlatform::Facebook => Url::parse_with_params(
            "https://www.facebook.com/sharer/sharer.php",
            [("u", site), ("quote", text)],
        ),
        SocialPlatform::Twitter => {
            Url::parse_with_params(
                "https://twitter.com/intent/tweet",
                [("text", text_with_site.as_str())],
            )
        }
        SocialPlatform::LinkedIn => Url::parse_with_params(
            "https://www.linkedin.com/sharing/share-offsite/",
            [("url", site), ("title", content.title.as_str()), ("summary", text)],
        ),
        SocialPlatform::Telegram => Url::parse_with_params(
            "https://t.me/share/url",
            [("url", site), ("text", text)],
        ),
        SocialPlatform::Instagram => {
            return Ok(SocialTarget::Clipboard {
                hint: "Image copied to clipboard. Open Instagram and paste to share your story.",
            });
        }
    };
    let url = url.map_err(|e| PosterError::validation(format!("share url: {e}")))?;
    Ok(SocialTarget::Url(url))
}
