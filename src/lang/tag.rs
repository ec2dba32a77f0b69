use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

static OUTSIDE_TAG: &str = "O";
static TAG_DELIMITER: char = '-';

/// Intra-span role of a token in the 2-way (IOB2) scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Begin,
    Inside,
}

impl Position {
    pub fn marker(self) -> &'static str {
        match self {
            Position::Begin => "B",
            Position::Inside => "I",
        }
    }
}

/// Maps a position marker of the 4-way (BIOUL) or 2-way (IOB2) scheme onto IOB2.
///
/// `U` (single-token span) becomes `B` and `L` (last token of a span) becomes `I`.
pub fn normalize_position(marker: &str) -> Result<Position, ParseError> {
    match marker {
        "B" | "U" => Ok(Position::Begin),
        "I" | "L" => Ok(Position::Inside),
        _ => Err(ParseError::UnknownPositionMarker(marker.to_string())),
    }
}

/// Node type of a span.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Category {
    /// Coarse action label `A`.
    Action,
    /// `Ac`: action by the chef.
    ChefAction,
    /// `Af`: action by food.
    FoodAction,
    /// `At`: action by a tool.
    ToolAction,
    /// `Ac2`: discontinuous secondary part of a chef action.
    SecondaryAction,
    Food,
    Tool,
    Other(String),
}

impl Category {
    pub fn from_label(label: &str) -> Self {
        match label {
            "A" => Category::Action,
            "Ac" => Category::ChefAction,
            "Af" => Category::FoodAction,
            "At" => Category::ToolAction,
            "Ac2" => Category::SecondaryAction,
            "F" => Category::Food,
            "T" => Category::Tool,
            other => Category::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match *self {
            Category::Action => "A",
            Category::ChefAction => "Ac",
            Category::FoodAction => "Af",
            Category::ToolAction => "At",
            Category::SecondaryAction => "Ac2",
            Category::Food => "F",
            Category::Tool => "T",
            Category::Other(ref label) => label,
        }
    }

    pub fn is_action(&self) -> bool {
        match *self {
            Category::Action
            | Category::ChefAction
            | Category::FoodAction
            | Category::ToolAction
            | Category::SecondaryAction => true,
            _ => false,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == OUTSIDE_TAG {
            return Err(ParseError::MalformedTag(s.to_string()));
        }
        Ok(Category::from_label(s))
    }
}

impl From<Category> for String {
    fn from(category: Category) -> String {
        category.label().to_string()
    }
}

impl From<String> for Category {
    fn from(label: String) -> Category {
        Category::from_label(&label)
    }
}

/// Collapses the fine-grained action subtypes into `A`; other categories pass through.
pub fn normalize_category(category: &Category) -> Category {
    if category.is_action() {
        Category::Action
    } else {
        category.clone()
    }
}

/// Keeps action spans, collapsed to `A`, and turns every other tag into `O`.
pub fn project_actions(tag: &Tag) -> Tag {
    match *tag {
        Tag::Span(position, ref category) if category.is_action() => {
            Tag::Span(position, Category::Action)
        }
        _ => Tag::Outside,
    }
}

/// Column 5 of a token line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Outside,
    Span(Position, Category),
}

impl Tag {
    /// Parses `O` or `<POSITION>-<CATEGORY>`, normalizing the position to IOB2.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        if value == OUTSIDE_TAG {
            return Ok(Tag::Outside);
        }
        let mut parts = value.splitn(2, TAG_DELIMITER);
        let (marker, label) = match (parts.next(), parts.next()) {
            (Some(marker), Some(label)) if !marker.is_empty() && !label.is_empty() => {
                (marker, label)
            }
            _ => return Err(ParseError::MalformedTag(value.to_string())),
        };
        let position = normalize_position(marker)?;
        Ok(Tag::Span(position, Category::from_label(label)))
    }

    pub fn position(&self) -> Option<Position> {
        match *self {
            Tag::Outside => None,
            Tag::Span(position, _) => Some(position),
        }
    }

    pub fn category(&self) -> Option<&Category> {
        match *self {
            Tag::Outside => None,
            Tag::Span(_, ref category) => Some(category),
        }
    }
}

impl fmt::Display for Tag {
    /// Always renders IOB2 with the normalized category.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::Outside => f.write_str(OUTSIDE_TAG),
            Tag::Span(position, ref category) => write!(
                f,
                "{}{}{}",
                position.marker(),
                TAG_DELIMITER,
                normalize_category(category)
            ),
        }
    }
}
