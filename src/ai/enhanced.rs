//! Enhanced generation tier.
//!
//! Writes the platform post directly with the premium model. The system
//! message is the persona + task composition unless the caller supplied an
//! instruction for this call, which is sent as is.

use async_trait::async_trait;

use super::openai::{OpenAIProvider, RequestParams};
use super::prompts::{enhanced_task_instruction, platform_content_prompt};
use super::{GenerationError, GenerationProvider, GenerationRequest, GenerationTier};
use crate::core::{EnhancedConfig, InstructionKind, InstructionStore};

/// Premium-model provider for platform optimization.
#[derive(Debug)]
pub struct EnhancedProvider {
    transport: OpenAIProvider,
    instructions: InstructionStore,
}

impl EnhancedProvider {
    /// Wrap a transport, pinning it to the enhanced model and parameters.
    pub fn new(
        transport: OpenAIProvider,
        instructions: InstructionStore,
        config: &EnhancedConfig,
    ) -> Self {
        let transport = transport
            .with_params(RequestParams {
                model: config.model.clone(),
                temperature: config.temperature,
                max_tokens: config.max_tokens,
                top_p: Some(config.top_p),
            })
            .with_fixed_model(config.model.clone());

        Self { transport, instructions }
    }
}

#[async_trait]
impl GenerationProvider for EnhancedProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let platform = request
            .platform
            .ok_or_else(|| GenerationError::malformed("Enhanced generation needs a platform"))?;

        let system = match &request.instruction_override {
            Some(instruction) => instruction.clone(),
            None => self.instructions.compose(&enhanced_task_instruction(platform)),
        };
        let prompt = platform_content_prompt(
            &request.prompt,
            platform,
            request.content_type,
            self.transport.constraints(),
        );

        self.transport.complete(&system, &prompt).await
    }

    fn tier(&self) -> GenerationTier {
        GenerationTier::Enhanced
    }

    fn supports(&self, kind: InstructionKind) -> bool {
        kind == InstructionKind::Optimize
    }

    fn name(&self) -> &str {
        "openai-enhanced"
    }
}
