//! The request-transformation pipeline.
//!
//! # Data Flow
//! ```text
//! RequestContext
//!     → validate.rs (target URL present, matches the .json pattern)
//!     → outbound.rs (method, body, cookies, user-agent)
//!     → fetch.rs (execute, capture status/headers/body)
//!     → split.rs (ordered header pairs; native allow-list)
//!     → mode selection (Native | Enveloped, both terminal)
//!     → envelope.rs (contents / headers / status object)
//!     → PipelineOutput
//! ```
//!
//! # Design Decisions
//! - Strictly forward dataflow, one pass per request, no shared state
//! - Every failure is normalized into the same output shape as success and
//!   follows the same mode branching; nothing here returns `Err` upward
//! - Feature flags (native mode, JSONP) come from deployment config, passed
//!   in explicitly so both settings are testable

pub mod envelope;
pub mod fetch;
pub mod outbound;
pub mod split;
pub mod types;
pub mod validate;

pub use fetch::Fetcher;
pub use types::{PipelineOutput, RequestContext};

use crate::config::schema::FeatureConfig;
use crate::pipeline::types::{FetchOutcome, ProxyError};

/// Run the whole pipeline for one request.
pub async fn execute(
    ctx: &RequestContext,
    features: &FeatureConfig,
    fetcher: &Fetcher,
) -> PipelineOutput {
    let outcome = match validate::validate_target(ctx.url.as_deref()) {
        Ok(url) => {
            let spec = outbound::build(url, ctx);
            fetcher.fetch(spec).await
        }
        Err(err) => {
            tracing::debug!(error = %err, "Target validation failed");
            FetchOutcome::error(err.to_string())
        }
    };

    select_output(outcome, ctx, features)
}

/// The two-state output mode selector. `mode=native` picks `Native`,
/// everything else picks `Enveloped`; both states are terminal.
fn select_output(
    outcome: FetchOutcome,
    ctx: &RequestContext,
    features: &FeatureConfig,
) -> PipelineOutput {
    if ctx.native_mode {
        if !features.native_enabled {
            // Configuration forbids passthrough; answer on the enveloped
            // error path instead.
            let outcome = FetchOutcome::error(ProxyError::ModeDisabled.to_string());
            return enveloped(outcome, ctx, features);
        }
        return PipelineOutput::Native {
            headers: split::native_headers(&outcome.headers),
            body: outcome.body,
        };
    }

    enveloped(outcome, ctx, features)
}

fn enveloped(
    outcome: FetchOutcome,
    ctx: &RequestContext,
    features: &FeatureConfig,
) -> PipelineOutput {
    // The callback directive only takes effect when JSONP is enabled by the
    // deployment; otherwise bare JSON is emitted.
    let callback = if features.jsonp_enabled {
        ctx.callback.clone()
    } else {
        None
    };

    PipelineOutput::Enveloped {
        data: envelope::build(&outcome, ctx),
        is_xhr: ctx.is_xhr,
        callback,
    }
}
