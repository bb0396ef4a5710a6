//! Digest composition — splicing merged records back into an emptied
//! copy of a source document.
//!
//! The template keeps everything about the original message (styles,
//! header, footer) except the content container's children, so the
//! digest renders exactly like a single alert email.

use crate::digest::classify::SubjectClassifier;
use crate::digest::sort::{priority_sort, subject_keys};
use crate::digest::types::PaperRecord;
use crate::document::{Document, Node};
use crate::error::DocumentError;

/// A source document with its content container emptied, ready to be
/// refilled with merged records.
#[derive(Debug, Clone)]
pub struct Template {
    document: Document,
}

impl Template {
    /// Empty the content container of a source document.
    ///
    /// A document with no container cannot host a digest; this is the
    /// one structural error that fails a whole run.
    pub fn from_document(mut document: Document) -> Result<Self, DocumentError> {
        let container = document
            .content_container_mut()
            .ok_or(DocumentError::MissingContentContainer)?;
        container.children.clear();
        Ok(Self { document })
    }

    /// Serialized form, for the verbose template dump.
    pub fn serialize(&self) -> String {
        self.document.serialize()
    }
}

/// The finished digest: the composed document plus both renderings the
/// sender needs for a multipart message.
#[derive(Debug, Clone)]
pub struct ComposedDigest {
    pub document: Document,
    pub html: String,
    pub text: String,
}

/// Appends ordered, annotated records into a template document.
pub struct DigestComposer<'a> {
    classifier: &'a SubjectClassifier,
}

impl<'a> DigestComposer<'a> {
    pub fn new(classifier: &'a SubjectClassifier) -> Self {
        Self { classifier }
    }

    /// Render records (already record-ordered by the caller) into the
    /// template. Mutation is append-only under the content container.
    pub fn compose(
        &self,
        records: Vec<PaperRecord>,
        template: Template,
    ) -> Result<ComposedDigest, DocumentError> {
        let mut document = template.document;
        let container = document
            .content_container_mut()
            .ok_or(DocumentError::MissingContentContainer)?;

        for record in records {
            let nodes = self.record_nodes(record);
            container.children.extend(nodes);
        }

        let html = document.serialize();
        let text = document.visible_text();
        Ok(ComposedDigest {
            document,
            html,
            text,
        })
    }

    /// The comma-joined, priority-ordered abbreviated labels for one
    /// record's subjects.
    pub fn subjects_line(&self, record: &PaperRecord) -> String {
        let ordered = priority_sort(record.subjects.clone(), &subject_keys(self.classifier));
        ordered
            .iter()
            .map(|subject| self.classifier.abbreviate(subject))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Nodes appended for one record: identity fragments, the bold
    /// subjects block, and a separator. The summary fragment only
    /// appears for the structural variant that has one.
    fn record_nodes(&self, record: PaperRecord) -> Vec<Node> {
        let subjects = Node::bold_block(&self.subjects_line(&record));
        let with_summary = record.entry.has_summary();

        let mut fragments = record.entry.fragments.into_iter();
        let mut nodes = Vec::with_capacity(5);
        if let Some(title) = fragments.next() {
            nodes.push(title);
        }
        if let Some(authors) = fragments.next() {
            nodes.push(authors);
        }
        if with_summary {
            if let Some(summary) = fragments.next() {
                nodes.push(summary);
            }
        }
        nodes.push(subjects);
        nodes.push(Node::line_break());
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DigestConfig;
    use crate::digest::types::RawEntry;

    const TEMPLATE_HTML: &str = concat!(
        "<html><body><div>",
        "<h3><a href=\"u\">Old Content</a></h3><div>old authors</div>",
        "</div></body></html>"
    );

    fn classifier() -> SubjectClassifier {
        SubjectClassifier::from_config(&DigestConfig::default())
    }

    fn entry(title: &str, with_summary: bool) -> RawEntry {
        let third = if with_summary {
            "<div>summary text</div>"
        } else {
            "<div><a href=\"s\"><img src=\"f.png\"></a></div>"
        };
        let html = format!(
            "<html><body><div><h3><a href=\"http://x.org\">{title}</a></h3><div>A Author - Venue</div>{third}<div><img src=\"t.png\"></div><br></div></body></html>"
        );
        let doc = Document::parse(&html);
        RawEntry::new(doc.content_container().unwrap().children.clone())
    }

    fn record(title: &str, subjects: &[&str], with_summary: bool) -> PaperRecord {
        let mut record = PaperRecord::new(title.to_string(), entry(title, with_summary));
        for subject in subjects {
            record.add_subject(subject);
        }
        record
    }

    #[test]
    fn template_empties_the_container() {
        let template = Template::from_document(Document::parse(TEMPLATE_HTML)).unwrap();
        assert!(!template.serialize().contains("Old Content"));
        assert!(template.serialize().contains("<div></div>"));
    }

    #[test]
    fn template_requires_a_container() {
        let result = Template::from_document(Document::parse("<html><body></body></html>"));
        assert!(matches!(result, Err(DocumentError::MissingContentContainer)));
    }

    #[test]
    fn summary_variant_appends_five_nodes() {
        let template = Template::from_document(Document::parse(TEMPLATE_HTML)).unwrap();
        let classifier = classifier();
        let composer = DigestComposer::new(&classifier);
        let digest = composer
            .compose(vec![record("P", &["A - new articles"], true)], template)
            .unwrap();

        let container = digest.document.content_container().unwrap();
        assert_eq!(container.children.len(), 5);
        assert!(digest.html.contains("summary text"));
        assert!(digest.html.contains("<div><b>A(a)</b></div>"));
    }

    #[test]
    fn summaryless_variant_skips_the_summary_node() {
        let template = Template::from_document(Document::parse(TEMPLATE_HTML)).unwrap();
        let classifier = classifier();
        let composer = DigestComposer::new(&classifier);
        let digest = composer
            .compose(vec![record("P", &["A - new articles"], false)], template)
            .unwrap();

        // title, authors, subjects, separator — no summary, no social links
        let container = digest.document.content_container().unwrap();
        assert_eq!(container.children.len(), 4);
        assert!(!digest.html.contains("f.png"));
    }

    #[test]
    fn records_render_in_given_order() {
        let template = Template::from_document(Document::parse(TEMPLATE_HTML)).unwrap();
        let classifier = classifier();
        let composer = DigestComposer::new(&classifier);
        let digest = composer
            .compose(
                vec![
                    record("First Paper", &["A - new articles"], true),
                    record("Second Paper", &["B - new citations"], true),
                ],
                template,
            )
            .unwrap();

        let first = digest.html.find("First Paper").unwrap();
        let second = digest.html.find("Second Paper").unwrap();
        assert!(first < second);
    }

    #[test]
    fn subjects_line_is_priority_ordered_and_joined() {
        let classifier = classifier();
        let composer = DigestComposer::new(&classifier);
        let record = record(
            "P",
            &["John Smith - new articles", "New citations to my articles"],
            true,
        );
        assert_eq!(composer.subjects_line(&record), "me(c), John Smith(a)");
    }

    #[test]
    fn plain_text_matches_composed_tree() {
        let template = Template::from_document(Document::parse(TEMPLATE_HTML)).unwrap();
        let classifier = classifier();
        let composer = DigestComposer::new(&classifier);
        let digest = composer
            .compose(vec![record("Visible Title", &["A - new articles"], true)], template)
            .unwrap();

        assert!(digest.text.contains("Visible Title"));
        assert!(digest.text.contains("A(a)"));
        assert!(!digest.text.contains('<'));
    }

    #[test]
    fn empty_record_list_leaves_template_empty() {
        let template = Template::from_document(Document::parse(TEMPLATE_HTML)).unwrap();
        let classifier = classifier();
        let composer = DigestComposer::new(&classifier);
        let digest = composer.compose(Vec::new(), template).unwrap();
        let container = digest.document.content_container().unwrap();
        assert!(container.children.is_empty());
    }
}
