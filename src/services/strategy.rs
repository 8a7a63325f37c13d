//! Strategy agent: one analysis call per ad.

use tracing::debug;

use crate::domain::models::{AdRecord, Strategy};
use crate::domain::ports::{ProviderError, TextProvider};

use super::parse;
use super::prompts;

/// Derive a creative directive for an underperforming ad.
///
/// Provider errors propagate; parse failures fall back to a generic
/// directive so the ad still gets processed.
pub async fn derive_strategy(
    provider: &dyn TextProvider,
    ad: &AdRecord,
) -> Result<Strategy, ProviderError> {
    let prompt = prompts::strategy_prompt(ad);
    let raw = provider.generate(&prompt, prompts::ANALYST_SYSTEM).await?;
    let strategy = parse::parse_strategy(&raw, &ad.ad_id);
    debug!(ad_id = %ad.ad_id, directive = %strategy.directive, "strategy derived");
    Ok(strategy)
}
