//! Brand-voice agent: derives a short tone guideline once per
//! campaign/ad-group pair in live runs.

use tracing::debug;

use crate::domain::models::BrandVoiceConfig;
use crate::domain::ports::{ProviderError, TextProvider};

use super::parse;
use super::prompts;

/// Ask the model for a brand-voice guideline. An unusable response yields an
/// empty string, which downstream prompts simply omit.
pub async fn brand_voice_guideline(
    provider: &dyn TextProvider,
    cfg: &BrandVoiceConfig,
    campaign: &str,
    ad_group: &str,
) -> Result<String, ProviderError> {
    let prompt = prompts::brand_voice_prompt(
        campaign,
        ad_group,
        &cfg.tone,
        &cfg.audience,
        &cfg.forbidden_words,
    );
    let raw = provider.generate(&prompt, prompts::COPYWRITER_SYSTEM).await?;
    let guideline = parse::parse_brand_voice(&raw).unwrap_or_default();
    debug!(campaign, ad_group, has_guideline = !guideline.is_empty(), "brand voice derived");
    Ok(guideline)
}
