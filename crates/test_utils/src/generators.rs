//! Property-Based Test Generators
//!
//! Proptest strategies for note requests that respect the store's
//! validation rules.

use proptest::prelude::*;

use domain_notes::{CreateNoteRequest, UpdateNoteRequest};

/// Strategy for titles within the 1..=255 character bound
pub fn title_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 ]{0,60}"
}

/// Strategy for non-empty note bodies
pub fn content_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 .,\n]{1,200}"
}

/// Strategy for valid create requests
pub fn create_request_strategy() -> impl Strategy<Value = CreateNoteRequest> {
    (title_strategy(), content_strategy())
        .prop_map(|(title, content)| CreateNoteRequest { title, content })
}

/// Strategy for partial updates, including the empty one
pub fn update_request_strategy() -> impl Strategy<Value = UpdateNoteRequest> {
    (
        proptest::option::of(title_strategy()),
        proptest::option::of(content_strategy()),
    )
        .prop_map(|(title, content)| UpdateNoteRequest { title, content })
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    proptest! {
        #[test]
        fn test_generated_requests_validate(request in create_request_strategy()) {
            prop_assert!(request.validate().is_ok());
        }

        #[test]
        fn test_generated_updates_validate(request in update_request_strategy()) {
            prop_assert!(request.validate().is_ok());
        }
    }
}
