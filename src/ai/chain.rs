//! Ordered generation strategies with a guaranteed local completion.

use std::sync::Arc;

use super::{GenerationError, GenerationProvider, GenerationRequest, GenerationTier};
use crate::core::{FallbackGenerator, InstructionKind};

/// Text produced for a request, and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub text: String,
    pub tier: GenerationTier,
    /// Most recent remote failure, if any tier failed on the way.
    pub error: Option<GenerationError>,
}

impl GenerationOutcome {
    /// Whether the result came from the local generator.
    pub fn used_fallback(&self) -> bool {
        self.tier == GenerationTier::Local
    }
}

/// Providers tried in order, each at most once per call, ending in the
/// deterministic [`FallbackGenerator`].
#[derive(Clone, Default)]
pub struct GenerationChain {
    providers: Vec<Arc<dyn GenerationProvider>>,
    fallback: FallbackGenerator,
}

impl GenerationChain {
    /// A chain with no remote providers.
    pub fn offline(fallback: FallbackGenerator) -> Self {
        Self { providers: Vec::new(), fallback }
    }

    /// Append a provider after the existing ones.
    pub fn with_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Build the configured chain: enhanced (if enabled), then standard.
    #[cfg(feature = "ai")]
    pub fn from_config(
        config: &crate::core::Config,
        store: Arc<dyn crate::core::ConfigStore>,
        fallback: FallbackGenerator,
        constraints: crate::core::PlatformConstraints,
    ) -> Self {
        use super::{EnhancedProvider, OpenAIProvider};
        use crate::core::InstructionStore;

        let mut chain = Self::offline(fallback);
        if !config.ai.enabled {
            return chain;
        }

        let transport = || {
            OpenAIProvider::from_config(store.clone(), &config.ai).with_constraints(constraints.clone())
        };

        if config.ai.enhanced {
            chain = chain.with_provider(Arc::new(EnhancedProvider::new(
                transport(),
                InstructionStore::new(store.clone()),
                &config.ai.enhanced_params,
            )));
        }
        chain.with_provider(Arc::new(transport()))
    }

    /// Names of the providers taking part in requests of `kind`.
    pub fn provider_names(&self, kind: InstructionKind) -> Vec<&str> {
        self.providers.iter().filter(|p| p.supports(kind)).map(|p| p.name()).collect()
    }

    pub fn fallback(&self) -> &FallbackGenerator {
        &self.fallback
    }

    /// Run the request through the chain. Always produces text; a blank
    /// reply counts as a malformed response and moves on to the next tier.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let mut last_error = None;

        for provider in self.providers.iter().filter(|p| p.supports(request.kind)) {
            let result = provider.generate(request).await.and_then(|text| {
                if text.trim().is_empty() {
                    Err(GenerationError::malformed("Provider returned no text"))
                } else {
                    Ok(text)
                }
            });

            match result {
                Ok(text) => {
                    tracing::info!(tier = %provider.tier(), provider = provider.name(), kind = %request.kind, "Generation succeeded");
                    return GenerationOutcome { text, tier: provider.tier(), error: last_error };
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Provider failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        let text = self.local(request);
        tracing::info!(tier = %GenerationTier::Local, kind = %request.kind, "Using local fallback");
        GenerationOutcome { text, tier: GenerationTier::Local, error: last_error }
    }

    fn local(&self, request: &GenerationRequest) -> String {
        match (request.kind, request.platform) {
            (InstructionKind::Optimize, Some(platform)) => {
                self.fallback.optimize_for(&request.prompt, platform, request.content_type)
            }
            (InstructionKind::Optimize, None) => request.prompt.clone(),
            _ => self.fallback.outline_for(request.content_type, &request.prompt),
        }
    }
}

impl std::fmt::Debug for GenerationChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("GenerationChain").field("providers", &names).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::ai::GenerationErrorKind;
    use crate::core::{ContentType, Platform};

    struct Scripted {
        tier: GenerationTier,
        reply: Result<String, GenerationError>,
        only: Option<InstructionKind>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(tier: GenerationTier, reply: Result<&str, GenerationError>) -> Self {
            Self { tier, reply: reply.map(String::from), only: None, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl GenerationProvider for Scripted {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }

        fn tier(&self) -> GenerationTier {
            self.tier
        }

        fn supports(&self, kind: InstructionKind) -> bool {
            self.only.map_or(true, |only| only == kind)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn optimize_request() -> GenerationRequest {
        GenerationRequest::optimize("# Title\n\n## Part\n- item", Platform::LinkedIn, None, "inst")
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let enhanced = Arc::new(Scripted::new(GenerationTier::Enhanced, Ok("premium")));
        let standard = Arc::new(Scripted::new(GenerationTier::Standard, Ok("plain")));
        let chain = GenerationChain::default().with_provider(enhanced.clone()).with_provider(standard.clone());

        let outcome = chain.generate(&optimize_request()).await;
        assert_eq!(outcome.text, "premium");
        assert_eq!(outcome.tier, GenerationTier::Enhanced);
        assert!(outcome.error.is_none());
        assert_eq!(standard.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_enhanced_failure_retries_standard_once() {
        let enhanced = Arc::new(Scripted::new(
            GenerationTier::Enhanced,
            Err(GenerationError::transport(Some(500), "boom")),
        ));
        let standard = Arc::new(Scripted::new(GenerationTier::Standard, Ok("plain")));
        let chain = GenerationChain::default().with_provider(enhanced.clone()).with_provider(standard.clone());

        let outcome = chain.generate(&optimize_request()).await;
        assert_eq!(outcome.text, "plain");
        assert_eq!(outcome.tier, GenerationTier::Standard);
        assert_eq!(outcome.error.map(|e| e.status), Some(Some(500)));
        assert_eq!(enhanced.calls.load(Ordering::SeqCst), 1);
        assert_eq!(standard.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_remote_fail_falls_back_locally() {
        let standard = Arc::new(Scripted::new(
            GenerationTier::Standard,
            Err(GenerationError::missing_credential()),
        ));
        let chain = GenerationChain::default().with_provider(standard);

        let outcome = chain.generate(&optimize_request()).await;
        assert!(outcome.used_fallback());
        assert!(outcome.text.ends_with("Share your experience in the comments below."));
        assert_eq!(outcome.error.unwrap().kind, GenerationErrorKind::MissingCredential);
    }

    #[tokio::test]
    async fn test_blank_reply_moves_to_next_tier() {
        let enhanced = Arc::new(Scripted::new(GenerationTier::Enhanced, Ok("  \n ")));
        let standard = Arc::new(Scripted::new(GenerationTier::Standard, Ok("plain")));
        let chain = GenerationChain::default().with_provider(enhanced).with_provider(standard);

        let outcome = chain.generate(&optimize_request()).await;
        assert_eq!(outcome.text, "plain");
        assert_eq!(outcome.tier, GenerationTier::Standard);
        assert_eq!(outcome.error.unwrap().kind, GenerationErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_blank_reply_falls_back_locally() {
        let standard = Arc::new(Scripted::new(GenerationTier::Standard, Ok("")));
        let chain = GenerationChain::default().with_provider(standard);

        let request = GenerationRequest::outline("Weekly update", None, "inst");
        let outcome = chain.generate(&request).await;
        assert!(outcome.used_fallback());
        assert!(outcome.text.starts_with("# Weekly update"));
        assert_eq!(outcome.error.unwrap().kind, GenerationErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_unsupported_kinds_are_skipped() {
        let mut enhanced = Scripted::new(GenerationTier::Enhanced, Ok("premium"));
        enhanced.only = Some(InstructionKind::Optimize);
        let enhanced = Arc::new(enhanced);
        let chain = GenerationChain::default().with_provider(enhanced.clone());

        let request = GenerationRequest::outline("desc", Some(ContentType::Info), "inst");
        let outcome = chain.generate(&request).await;

        assert_eq!(outcome.tier, GenerationTier::Local);
        assert!(outcome.error.is_none());
        assert_eq!(enhanced.calls.load(Ordering::SeqCst), 0);
        assert_eq!(chain.provider_names(InstructionKind::Outline), Vec::<&str>::new());
    }

    #[tokio::test]
    async fn test_offline_outline() {
        let chain = GenerationChain::offline(FallbackGenerator::default());
        let request = GenerationRequest::outline("Weekly update", None, "inst");
        let outcome = chain.generate(&request).await;
        assert!(outcome.text.starts_with("# Weekly update"));
    }
}
