use fxhash::hash64;
use serde_json::json;

use crate::{Completion, CompletionRequest, LlmConfig};

/// Deterministic stub used when mode is `"stub"`.
///
/// Returns the configured canned output when one is set, otherwise a JSON
/// envelope derived from a stable hash of the prompt. Guarantees reproducible
/// output with zero network cost, which makes the full pipeline testable
/// offline.
pub(crate) fn make_stub_completion(request: &CompletionRequest, cfg: &LlmConfig) -> Completion {
    let output_text = match cfg.stub_output.as_deref() {
        Some(canned) => canned.to_string(),
        None => json!({
            "stub": true,
            "task": request.task,
            "prompt_fingerprint": format!("{:016x}", hash64(request.prompt.as_bytes())),
        })
        .to_string(),
    };

    Completion {
        task: request.task.clone(),
        output_text,
        model: format!("stub:{}", cfg.model),
        attempts: 1,
    }
}
