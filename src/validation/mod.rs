use std::{collections::BTreeMap, fmt};

use crate::{
    dto::{CreateNoteRequest, Tag},
    store::NoteDraft,
};

pub const TITLE_MIN_LEN: usize = 3;
pub const TITLE_MAX_LEN: usize = 50;
pub const CONTENT_MAX_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Title,
    Content,
    Tag,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: Field,
    pub message: String,
}

impl FieldViolation {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// One message per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }
}

impl From<Vec<FieldViolation>> for ValidationErrors {
    /// Keeps the first violation reported for each field.
    fn from(violations: Vec<FieldViolation>) -> Self {
        let mut errors = BTreeMap::new();
        for violation in violations {
            errors.entry(violation.field).or_insert(violation.message);
        }
        Self { errors }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid note")?;
        for (i, (field, message)) in self.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[must_use]
pub fn validate_title(title: &str) -> Option<FieldViolation> {
    let len = title.chars().count();
    if title.is_empty() {
        Some(FieldViolation::new(Field::Title, "Title is required"))
    } else if len < TITLE_MIN_LEN {
        Some(FieldViolation::new(
            Field::Title,
            format!("Too short title, min {TITLE_MIN_LEN} symbols"),
        ))
    } else if len > TITLE_MAX_LEN {
        Some(FieldViolation::new(
            Field::Title,
            format!("Too long title, max {TITLE_MAX_LEN} symbols"),
        ))
    } else {
        None
    }
}

#[must_use]
pub fn validate_content(content: &str) -> Option<FieldViolation> {
    (content.chars().count() > CONTENT_MAX_LEN).then(|| {
        FieldViolation::new(
            Field::Content,
            format!("Too long content, max {CONTENT_MAX_LEN} symbols"),
        )
    })
}

/// # Errors
///
/// Fails when the tag is empty or not one of [`Tag::ALL`].
pub fn validate_tag(tag: &str) -> Result<Tag, FieldViolation> {
    if tag.is_empty() {
        return Err(FieldViolation::new(Field::Tag, "Tag is required"));
    }

    tag.parse().map_err(|_| {
        let allowed = Tag::ALL.map(Tag::as_str).join(", ");
        FieldViolation::new(
            Field::Tag,
            format!("tag must be one of the following values: {allowed}"),
        )
    })
}

/// Checks every field of the draft and turns it into a create request.
///
/// All failing fields are reported together.
///
/// # Errors
///
/// Returns the per-field messages when any rule fails.
pub fn validate_note(draft: &NoteDraft) -> Result<CreateNoteRequest, ValidationErrors> {
    let mut violations = Vec::new();
    violations.extend(validate_title(&draft.title));
    violations.extend(validate_content(&draft.content));

    let tag = match validate_tag(&draft.tag) {
        Ok(tag) => Some(tag),
        Err(violation) => {
            violations.push(violation);
            None
        }
    };

    match tag {
        Some(tag) if violations.is_empty() => Ok(CreateNoteRequest {
            title: draft.title.clone(),
            content: draft.content.clone(),
            tag,
        }),
        _ => Err(violations.into()),
    }
}
