use log::{debug, info};
use std::time::Duration;

use super::ModelLabel;

/// One keyword rule: fires when the lowercased message contains any keyword.
struct Rule {
    keywords: &'static [&'static str],
    render: fn(ModelLabel) -> String,
}

// Evaluated in order, first match wins. "hi" must stay ahead of "help".
const RULES: &[Rule] = &[
    Rule {
        keywords: &["hello", "hi"],
        render: |label| format!("こんにちは！{}です。今日はどのようにお手伝いできますか？", label),
    },
    Rule {
        keywords: &["help"],
        render: |_| "お手伝いいたします。何かお困りですか？".to_string(),
    },
    Rule {
        keywords: &["thank"],
        render: |_| "どういたしまして！他に何かお手伝いできることはありますか？".to_string(),
    },
];

fn fallback(message: &str, model: &str) -> String {
    format!(
        "メッセージを受け取りました：「{}」。これは{}からのシミュレートされた応答です。\
         OpenAI APIキーが設定されていないため、実際のAPIを使用するにはOPENAI_API_KEY環境変数を設定してください。",
        message, model
    )
}

/// Canned Japanese reply for `message`, with no delay.
pub fn canned_reply(message: &str, model: &str) -> String {
    let lowered = message.to_lowercase();
    let label = ModelLabel::from_model_id(model);

    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
        .map_or_else(|| fallback(message, model), |rule| (rule.render)(label))
}

/// Stand-in for the completion endpoint when no API key is configured.
pub struct SimulatedResponder {
    delay: Duration,
}

impl SimulatedResponder {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn simulate(&self, message: &str, model: &str) -> String {
        debug!("Simulating reply for model {} after {:?}", model, self.delay);
        tokio::time::sleep(self.delay).await;

        let reply = canned_reply(message, model);
        info!("Simulated response length: {} characters", reply.len());
        reply
    }
}
