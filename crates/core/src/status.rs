//! Lookup enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding lookup table (`survey_statuses`,
//! `survey_visibilities`, `question_types`). The string name is what the
//! API speaks.

use serde::{Deserialize, Serialize};

/// Lookup ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_lookup_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant = $val ),+
        }

        impl $name {
            /// Return the database lookup ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Resolve a database lookup ID. Returns `None` for unknown IDs.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// The API-facing name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_lookup_enum! {
    /// Survey lifecycle status.
    SurveyStatus {
        Draft = 1 => "draft",
        Active = 2 => "active",
        Closed = 3 => "closed",
    }
}

define_lookup_enum! {
    /// Who sees respondent identities. `Anonymous` surveys never record a
    /// response as attributed, even for signed-in respondents.
    SurveyVisibility {
        Anonymous = 1 => "anonymous",
        Public = 2 => "public",
    }
}

define_lookup_enum! {
    /// Question answer type.
    QuestionType {
        Single = 1 => "single",
        Multiple = 2 => "multiple",
        Text = 3 => "text",
        Rating = 4 => "rating",
    }
}

impl QuestionType {
    /// Single- and multiple-choice questions carry a choice list.
    pub fn has_choices(self) -> bool {
        matches!(self, Self::Single | Self::Multiple)
    }

    /// Human-readable label used in CSV exports.
    pub fn display_label(self) -> &'static str {
        match self {
            Self::Single => "Single choice",
            Self::Multiple => "Multiple choice",
            Self::Text => "Text",
            Self::Rating => "Rating 1-5",
        }
    }
}
