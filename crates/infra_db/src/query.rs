//! SQL text for partial note updates
//!
//! Column names come from a closed set; caller values only ever travel as
//! positional parameters.

use domain_notes::UpdateNoteRequest;

/// Columns a partial update may assign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteColumn {
    Title,
    Content,
}

impl NoteColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteColumn::Title => "title",
            NoteColumn::Content => "content",
        }
    }
}

/// An `UPDATE notes` statement assigning only the present fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialUpdate {
    assignments: Vec<(NoteColumn, String)>,
}

impl PartialUpdate {
    /// Collects the fields present in `request`, in column order
    pub fn from_request(request: &UpdateNoteRequest) -> Self {
        let mut update = Self::default();
        if let Some(title) = &request.title {
            update.assignments.push((NoteColumn::Title, title.clone()));
        }
        if let Some(content) = &request.content {
            update.assignments.push((NoteColumn::Content, content.clone()));
        }
        update
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Values to bind, in placeholder order; the id binds last
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.assignments.iter().map(|(_, value)| value.as_str())
    }

    /// Renders the statement; the id takes the placeholder after the last value
    pub fn to_sql(&self) -> String {
        let mut sets: Vec<String> = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ${}", column.as_str(), i + 1))
            .collect();
        sets.push("updated_at = NOW()".to_string());

        format!(
            "UPDATE notes SET {} WHERE id = ${} \
             RETURNING id, title, content, created_at, updated_at",
            sets.join(", "),
            self.assignments.len() + 1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_utils::update_request_strategy;

    #[test]
    fn test_title_only() {
        let update = PartialUpdate::from_request(&UpdateNoteRequest::title("New"));
        assert_eq!(
            update.to_sql(),
            "UPDATE notes SET title = $1, updated_at = NOW() WHERE id = $2 \
             RETURNING id, title, content, created_at, updated_at"
        );
        assert_eq!(update.values().collect::<Vec<_>>(), vec!["New"]);
    }

    #[test]
    fn test_both_fields_number_in_order() {
        let request = UpdateNoteRequest {
            title: Some("T".into()),
            content: Some("C".into()),
        };
        let sql = PartialUpdate::from_request(&request).to_sql();

        assert!(sql.starts_with(
            "UPDATE notes SET title = $1, content = $2, updated_at = NOW() WHERE id = $3"
        ));
    }

    #[test]
    fn test_content_only_starts_at_one() {
        let sql = PartialUpdate::from_request(&UpdateNoteRequest::content("body")).to_sql();
        assert!(sql.contains("SET content = $1,"));
        assert!(!sql.contains("title ="));
    }

    #[test]
    fn test_values_never_reach_sql_text() {
        let request = UpdateNoteRequest::title("'; DROP TABLE notes; --");
        let sql = PartialUpdate::from_request(&request).to_sql();
        assert!(!sql.contains("DROP"));
    }

    #[test]
    fn test_empty_request() {
        assert!(PartialUpdate::from_request(&UpdateNoteRequest::default()).is_empty());
    }

    proptest! {
        #[test]
        fn prop_placeholders_match_bound_values(request in update_request_strategy()) {
            let update = PartialUpdate::from_request(&request);
            let sql = update.to_sql();
            let values = update.values().count();

            let id_placeholder = format!("WHERE id = ${} ", values + 1);
            prop_assert!(sql.contains(&id_placeholder));
            prop_assert_eq!(sql.matches('$').count(), values + 1);
            prop_assert!(sql.contains("updated_at = NOW()"));
        }
    }
}
