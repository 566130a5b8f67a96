//! Content assembler: builds the ordered content sequence for one model call.
//!
//! Order is fixed:
//! 1. one synthetic user unit carrying the administrator-side discussion log,
//! 2. the resolved document units,
//! 3. the prior chat turns, a user unit per non-empty human text followed by
//!    a model unit per non-empty AI text.
//!
//! Empty inputs are skipped. Document resolution errors propagate.

use emissary_types::content::{ChatTurn, ContentUnit, HistoricEntry};
use emissary_types::document::DocumentRef;
use emissary_types::error::DocumentError;

use crate::document::DocumentResolver;

/// Render a discussion log as `"{name}: {content}"` lines.
pub fn format_human_chat_history(entries: &[HistoricEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{}: {}", entry.name, entry.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The synthetic unit introducing the administrator-side discussion, or
/// `None` when the log is empty.
pub fn historic_discussion_unit(entries: &[HistoricEntry]) -> Option<ContentUnit> {
    if entries.is_empty() {
        return None;
    }

    let humans = format_human_chat_history(entries);
    let text = format!(
        "The following is a record of a historic discussion between the administrator of the emissary and the user that is talking with you now: \
         <human_discussion>{humans}</human_discussion>\
         The human discussion may be relevant to the conversation as you are acting on behalf of the administrator and could help in their answers. \
         You can also use the receiver's questions as context with what they need help with, and answer on behalf of the administrator if you can help."
    );
    Some(ContentUnit::user_text(text))
}

/// Append the units for prior chat turns.
pub fn push_chat_history(contents: &mut Vec<ContentUnit>, chat_history: &[ChatTurn]) {
    for turn in chat_history {
        if !turn.human.is_empty() {
            contents.push(ContentUnit::user_text(turn.human.as_str()));
        }
        if !turn.ai.is_empty() {
            contents.push(ContentUnit::model_text(turn.ai.as_str()));
        }
    }
}

/// Build the content sequence. The resolver is only called when there are
/// documents to resolve.
pub async fn assemble_contents<R: DocumentResolver>(
    historic: &[HistoricEntry],
    documents: &[DocumentRef],
    chat_history: &[ChatTurn],
    resolver: &R,
    storage: &str,
) -> Result<Vec<ContentUnit>, DocumentError> {
    let mut contents = Vec::new();

    if let Some(unit) = historic_discussion_unit(historic) {
        contents.push(unit);
    }

    if !documents.is_empty() {
        let resolved = resolver.resolve(documents, storage).await?;
        contents.extend(resolved);
    }

    push_chat_history(&mut contents, chat_history);

    Ok(contents)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use emissary_types::content::Role;

    use super::*;

    /// Resolver returning one text unit per document.
    #[derive(Default)]
    struct FakeResolver {
        calls: AtomicUsize,
        fail: bool,
    }

    impl DocumentResolver for FakeResolver {
        async fn resolve(
            &self,
            documents: &[DocumentRef],
            storage: &str,
        ) -> Result<Vec<ContentUnit>, DocumentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DocumentError::NotFound {
                    name: documents[0].name.clone(),
                });
            }
            Ok(documents
                .iter()
                .map(|d| ContentUnit::user_text(format!("{storage}/{}", d.name)))
                .collect())
        }
    }

    fn doc(name: &str) -> DocumentRef {
        DocumentRef {
            name: name.to_string(),
            url: format!("https://example.test/{name}"),
            kind: "text/plain".to_string(),
            storage_path: None,
            content_type: None,
            size: None,
        }
    }

    fn entry(name: &str, content: &str) -> HistoricEntry {
        HistoricEntry {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_inputs_give_empty_sequence() {
        let resolver = FakeResolver::default();
        let contents = assemble_contents(&[], &[], &[], &resolver, "bucket")
            .await
            .unwrap();
        assert!(contents.is_empty());
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_historic_unit_is_first() {
        let resolver = FakeResolver::default();
        let contents = assemble_contents(
            &[entry("A", "hi")],
            &[doc("a.txt")],
            &[ChatTurn::new("hello", "")],
            &resolver,
            "bucket",
        )
        .await
        .unwrap();

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0].role, Role::User);
        let text = contents[0].text();
        assert!(text.contains("<human_discussion>A: hi</human_discussion>"));
        assert_eq!(text.matches("A: hi").count(), 1);
        assert_eq!(contents[1].text(), "bucket/a.txt");
        assert_eq!(contents[2], ContentUnit::user_text("hello"));
    }

    #[test]
    fn test_historic_unit_text() {
        let unit = historic_discussion_unit(&[entry("Admin", "hello"), entry("Receiver", "hey")])
            .unwrap();
        assert_eq!(
            unit.text(),
            "The following is a record of a historic discussion between the administrator of the emissary and the user that is talking with you now: \
             <human_discussion>Admin: hello\nReceiver: hey</human_discussion>\
             The human discussion may be relevant to the conversation as you are acting on behalf of the administrator and could help in their answers. \
             You can also use the receiver's questions as context with what they need help with, and answer on behalf of the administrator if you can help."
        );
        assert!(historic_discussion_unit(&[]).is_none());
    }

    #[test]
    fn test_empty_turn_sides_are_omitted() {
        let mut contents = Vec::new();
        push_chat_history(
            &mut contents,
            &[ChatTurn::new("hello", "hi there"), ChatTurn::new("", "follow-up")],
        );
        assert_eq!(
            contents,
            vec![
                ContentUnit::user_text("hello"),
                ContentUnit::model_text("hi there"),
                ContentUnit::model_text("follow-up"),
            ]
        );
    }

    #[test]
    fn test_format_human_chat_history() {
        assert_eq!(format_human_chat_history(&[]), "");
        assert_eq!(
            format_human_chat_history(&[entry("A", "one"), entry("B", "two")]),
            "A: one\nB: two"
        );
    }

    #[tokio::test]
    async fn test_document_failure_propagates() {
        let resolver = FakeResolver {
            fail: true,
            ..FakeResolver::default()
        };
        let err = assemble_contents(&[], &[doc("gone.pdf")], &[], &resolver, "bucket")
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::NotFound { name } if name == "gone.pdf"));
    }
}
