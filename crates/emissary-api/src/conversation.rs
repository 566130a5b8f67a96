//! Chat history as sent by clients, and its pairing into [`ChatTurn`]s.

use serde::Deserialize;

use emissary_types::content::ChatTurn;

/// Names that mark a message as the assistant's side of a turn.
const ASSISTANT_NAMES: [&str; 4] = ["ai", "assistant", "model", "bot"];

/// One chat history item: a `[human, ai]` pair or a named message.
///
/// `Pair` comes first: a struct variant would also accept a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HistoryItem {
    Pair(String, String),
    Message {
        #[serde(default)]
        name: String,
        #[serde(default)]
        content: String,
    },
}

fn is_assistant(name: &str) -> bool {
    ASSISTANT_NAMES
        .iter()
        .any(|candidate| name.trim().eq_ignore_ascii_case(candidate))
}

/// Pair history items into turns, in order.
///
/// An assistant message fills the AI side of the open turn, or opens a turn
/// with an empty human side when there is none. Any other message opens a
/// new turn.
pub fn pair_history(items: &[HistoryItem]) -> Vec<ChatTurn> {
    let mut turns: Vec<ChatTurn> = Vec::with_capacity(items.len());

    for item in items {
        match item {
            HistoryItem::Pair(human, ai) => turns.push(ChatTurn::new(human, ai)),
            HistoryItem::Message { name, content } if is_assistant(name) => {
                match turns.last_mut() {
                    Some(turn) if turn.ai.is_empty() => turn.ai.clone_from(content),
                    _ => turns.push(ChatTurn::new("", content)),
                }
            }
            HistoryItem::Message { content, .. } => turns.push(ChatTurn::new(content, "")),
        }
    }

    turns
}

/// Make sure the history ends with an unanswered turn asking `question`.
pub fn ensure_question(turns: &mut Vec<ChatTurn>, question: &str) {
    if turns
        .last()
        .is_none_or(|turn| turn.human != question || !turn.ai.is_empty())
    {
        turns.push(ChatTurn::new(question, ""));
    }
}
