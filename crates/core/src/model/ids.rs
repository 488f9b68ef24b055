use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new id from its raw value.
            #[must_use]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value.
            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a Program
    ProgramId
);
entity_id!(
    /// Unique identifier for a Page
    PageId
);
entity_id!(
    /// Unique identifier for a page Category
    CategoryId
);
entity_id!(
    /// Unique identifier for a snapshot of a page's content
    PageVersionId
);
entity_id!(
    /// Unique identifier for an Employee
    EmployeeId
);
entity_id!(
    /// Unique identifier for an Assignment
    AssignmentId
);
entity_id!(
    /// Unique identifier for an AssignmentPage
    AssignmentPageId
);
entity_id!(
    /// Unique identifier for a Submission
    SubmissionId
);
entity_id!(
    /// Unique identifier for a Comment
    CommentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_includes_type_name() {
        assert_eq!(format!("{:?}", ProgramId::new(7)), "ProgramId(7)");
        assert_eq!(format!("{:?}", AssignmentPageId::new(42)), "AssignmentPageId(42)");
    }

    #[test]
    fn display_is_raw_value() {
        assert_eq!(PageId::new(3).to_string(), "3");
    }
}
