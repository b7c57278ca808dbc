//! Page definitions for the application and assessment forms.
//!
//! Each page is one type implementing [`crate::Page`]; pages share no behaviour beyond that
//! contract. Registration happens explicitly in each form's `register` function.

/// Implements [`crate::page::PageType`] for a page type holding its typed answers in `body`.
macro_rules! page_type {
    (
        $page:ident,
        $body:ty,
        name: $name:literal,
        display_name: $display:literal,
        fields: [$($field:literal),* $(,)?] $(,)?
    ) => {
        impl $crate::page::PageType for $page {
            const METADATA: $crate::page::PageMetadata = $crate::page::PageMetadata {
                name: $name,
                display_name: $display,
                fields: &[$($field),*],
            };

            fn from_answers(
                id: &$crate::page::PageId,
                answers: &::serde_json::Value,
            ) -> $crate::FormResult<Self> {
                let body = $crate::page::coerce_body::<$body>(
                    id,
                    &<Self as $crate::page::PageType>::METADATA,
                    answers,
                )?;
                Ok(Self { body })
            }
        }
    };
}

pub mod application;
pub mod assessment;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::document::AnswerDocument;
    use crate::page::{FormType, Page, PageId, PageType};
    use chrono::Utc;
    use forms_uuid::DocumentId;
    use serde_json::Value;

    pub(crate) fn build<P: PageType>(form: FormType, section: &str, task: &str, answers: Value) -> P {
        let id = PageId::new(form, section, task, P::METADATA.name);
        P::from_answers(&id, &answers).expect("page should construct")
    }

    pub(crate) fn empty_document(form: FormType) -> AnswerDocument {
        AnswerDocument::new(DocumentId::new(), form, Utc::now())
    }

    /// Document holding the given (task, page, body) answers.
    pub(crate) fn document(form: FormType, answers: &[(&str, &str, Value)]) -> AnswerDocument {
        let mut doc = empty_document(form);
        for (task, page, body) in answers {
            doc.merge(task, page, body.clone(), Utc::now());
        }
        doc
    }

    /// Asserts a valid page renders exactly one answer per owned field.
    pub(crate) fn assert_complete_response(page: &dyn Page) {
        assert!(
            page.errors().is_empty(),
            "{} should be valid: {:?}",
            page.metadata().name,
            page.errors()
        );
        let response = page.response();
        assert_eq!(
            response.len(),
            page.metadata().fields.len(),
            "{} response should cover each owned field once: {response:?}",
            page.metadata().name
        );
    }
}
