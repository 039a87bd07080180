//! Judged-prompt construction.
//!
//! One downstream model call has to do two jobs per turn: judge the latest
//! answer against the current phase's standard, and (only when the judgment
//! passes) ask the question that opens the next phase. A single task text
//! cannot carry both, so the injected task is a composite of the current
//! phase task plus the next phase task as a bridging hint.

use super::Message;
use crate::ports::ChatMessage;

/// System rules sent as the first message of every judged turn.
pub const SYSTEM_RULES: &str = "你是 DeepMiner，一名苏格拉底式的深挖教练。你的唯一目标是：逼迫用户说出具体事实，而不是口号、感受或正确的废话。

工作规则：
1. 每一轮你会收到用户的最新回答和一个【下一步任务】。你必须先裁判用户的回答是否满足当前任务的要求：回答中必须包含可验证的具体事实（人物、数字、场景、动作），才算通过。
2. 如果回答空泛（只有形容词、态度或结论而没有事实支撑），判定为不通过，并针对缺失的事实追问。
3. 如果判定通过，依据【下一步任务】提出下一个问题，帮助用户进入下一个环节。
4. 你的回复必须是严格的 JSON 对象，不得包含任何 JSON 之外的文字或代码块标记，形如：
{\"diagnosis\": \"对用户回答的一句话诊断\", \"question\": \"你要提出的下一个问题\", \"is_passed\": true}
其中 is_passed 必须是布尔值：通过为 true，不通过为 false。
5. diagnosis 保持犀利简短，question 一次只问一件事。";

/// Closing instruction used as the composite task when no next phase exists.
const CLOSING_TASK: &str =
    "这是最后一个环节。请在裁判通过后，对整场对话做一段收尾总结：\
     指出用户已经钉牢的事实、仍然薄弱的环节，并给出一条立刻可执行的下一步行动。";

/// Combines the current phase task with the next phase task as a bridging
/// hint, or with the closing instruction when the session is on its final
/// phase.
pub fn composite_task(current: &str, next: Option<&str>) -> String {
    match next {
        Some(next_task) => format!(
            "当前环节的裁判标准：{current}\n若裁判通过，下一环节的任务是：{next_task}"
        ),
        None => format!("当前环节的裁判标准：{current}\n{CLOSING_TASK}"),
    }
}

/// Builds the ordered message list for one judged turn.
///
/// Prior turns are replayed with user answers as `user` and engine output as
/// `assistant`; inline warnings are transcript noise and are excluded. The
/// final user turn differs between the conversation opening (no answer yet)
/// and a continuation.
pub fn build_judged_prompt(
    history: &[Message],
    latest_answer: Option<&str>,
    task: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(SYSTEM_RULES));

    for msg in history.iter().filter(|m| !m.is_warning()) {
        if msg.is_user() {
            messages.push(ChatMessage::user(msg.content()));
        } else {
            messages.push(ChatMessage::assistant(msg.content()));
        }
    }

    let turn = match latest_answer {
        Some(answer) => format!(
            "我的最新回答是：【{answer}】\n请对我进行裁判。当前你需要引导的【下一步任务】是：【{task}】\n请严格返回 JSON。"
        ),
        None => format!(
            "（对话开始）请根据 SYSTEM_RULES 的要求，基于以下任务对我进行第一轮提问：\n任务目标：【{task}】\n请严格返回 JSON。"
        ),
    };
    messages.push(ChatMessage::user(turn));
    messages
}
