//! Offline chat gateway.
//!
//! Selected at startup when no credentials are configured, so the interview
//! loop stays usable without a provider. Replies follow the judged JSON
//! contract: the answer is echoed back as the diagnosis and the next
//! question is lifted from the task text embedded in the final prompt turn.

use async_trait::async_trait;
use serde_json::json;

use crate::ports::{ChatGateway, ChatMessage, GatewayConfig, GatewayError};

const ANSWER_MARKER: &str = "我的最新回答是：【";
const TASK_MARKERS: [&str; 2] = ["【下一步任务】是：【", "任务目标：【"];

/// Gateway that fabricates judged replies without network access.
#[derive(Debug, Default)]
pub struct MockChatGateway;

impl MockChatGateway {
    pub fn new() -> Self {
        Self
    }
}

/// Extracts the 【...】 span following `marker`. Spans can themselves carry
/// brackets, so the close is located by the known instruction text that
/// follows it, falling back to the last 】.
fn extract_span<'a>(text: &'a str, marker: &str, terminator: &str) -> Option<&'a str> {
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    let end = rest.find(terminator).or_else(|| rest.rfind('】'))?;
    Some(&rest[..end])
}

/// Pulls the first numbered question out of a task description.
fn first_question(task: &str) -> String {
    let condensed: String = task.split_whitespace().collect::<Vec<_>>().join(" ");
    let body = match condensed.find("1.") {
        Some(pos) => {
            let after = &condensed[pos + 2..];
            after.split("2.").next().unwrap_or(after)
        }
        None => condensed
            .split('\n')
            .next()
            .unwrap_or(condensed.as_str()),
    };
    let trimmed = body.trim().trim_end_matches(['。', '；', ';']);
    if trimmed.is_empty() {
        "请给出一个具体事实。".to_string()
    } else if trimmed.ends_with('？') {
        trimmed.to_string()
    } else {
        format!("{trimmed}？")
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}…")
    }
}

#[async_trait]
impl ChatGateway for MockChatGateway {
    async fn invoke(
        &self,
        messages: &[ChatMessage],
        _config: &GatewayConfig,
    ) -> Result<String, GatewayError> {
        let last = messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let task = TASK_MARKERS
            .iter()
            .find_map(|marker| extract_span(last, marker, "】\n请严格返回"))
            .unwrap_or_default();
        let question = first_question(task);

        let reply = match extract_span(last, ANSWER_MARKER, "】\n请对我进行裁判") {
            Some(answer) if !answer.trim().is_empty() => {
                let diagnosis = format!(
                    "我听懂了：你说的核心是“{}”。",
                    truncate(answer.trim(), 48)
                );
                json!({
                    "diagnosis": diagnosis,
                    "question": format!("现在先回答一个最关键的：{question}"),
                    "is_passed": true,
                })
            }
            _ => json!({
                "diagnosis": "我们先别急着下结论，先把事实坐标钉牢。",
                "question": question,
                "is_passed": false,
            }),
        };
        tracing::debug!("mock gateway reply generated");
        Ok(reply.to_string())
    }
}
