use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Closed set of block kinds.
///
/// Wire names are snake_case with an underscore before the level/column digit
/// (`heading_1`, `columns_3`), so every numbered variant is renamed explicitly.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BlockType {
    #[default]
    Text,
    #[serde(rename = "heading_1")]
    #[strum(serialize = "heading_1")]
    Heading1,
    #[serde(rename = "heading_2")]
    #[strum(serialize = "heading_2")]
    Heading2,
    #[serde(rename = "heading_3")]
    #[strum(serialize = "heading_3")]
    Heading3,
    BulletedList,
    NumberedList,
    Todo,
    Toggle,
    Code,
    Quote,
    Callout,
    Divider,
    PageLink,
    #[serde(rename = "columns_2")]
    #[strum(serialize = "columns_2")]
    Columns2,
    #[serde(rename = "columns_3")]
    #[strum(serialize = "columns_3")]
    Columns3,
    #[serde(rename = "columns_4")]
    #[strum(serialize = "columns_4")]
    Columns4,
    #[serde(rename = "columns_5")]
    #[strum(serialize = "columns_5")]
    Columns5,
}

impl BlockType {
    pub fn label(self) -> &'static str {
        match self {
            BlockType::Text => "Text",
            BlockType::Heading1 => "Heading 1",
            BlockType::Heading2 => "Heading 2",
            BlockType::Heading3 => "Heading 3",
            BlockType::BulletedList => "Bulleted list",
            BlockType::NumberedList => "Numbered list",
            BlockType::Todo => "To-do list",
            BlockType::Toggle => "Toggle",
            BlockType::Code => "Code",
            BlockType::Quote => "Quote",
            BlockType::Callout => "Callout",
            BlockType::Divider => "Divider",
            BlockType::PageLink => "Link to page",
            BlockType::Columns2 => "2 columns",
            BlockType::Columns3 => "3 columns",
            BlockType::Columns4 => "4 columns",
            BlockType::Columns5 => "5 columns",
        }
    }

    /// Kind of the block created when Enter splits a block of this kind.
    ///
    /// List-like kinds continue the list; everything else starts a plain paragraph.
    pub fn continuation(self) -> BlockType {
        match self {
            BlockType::BulletedList | BlockType::NumberedList | BlockType::Todo => self,
            _ => BlockType::Text,
        }
    }

    /// Whether the block carries an editable text surface.
    pub fn has_text(self) -> bool {
        !matches!(
            self,
            BlockType::Divider
                | BlockType::Columns2
                | BlockType::Columns3
                | BlockType::Columns4
                | BlockType::Columns5
        )
    }

    pub fn column_count(self) -> Option<usize> {
        match self {
            BlockType::Columns2 => Some(2),
            BlockType::Columns3 => Some(3),
            BlockType::Columns4 => Some(4),
            BlockType::Columns5 => Some(5),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockContent {
    #[serde(default)]
    pub text: String,
}

impl BlockContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Type-specific block attributes.
///
/// Every field is optional: absent means "not set", which is distinct from a
/// default value. Transforms only fill in absent fields.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,

    #[serde(rename = "textColor", default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,

    #[serde(rename = "bgColor", default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,

    /// Target page of a `page_link` block.
    #[serde(rename = "pageId", default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
}

pub(crate) const DEFAULT_CODE_LANGUAGE: &str = "plain";
pub(crate) const DEFAULT_CALLOUT_EMOJI: &str = "💡";

impl BlockProps {
    /// Fill in the defaults `kind` needs, leaving anything already set untouched.
    pub fn apply_defaults(&mut self, kind: BlockType) {
        match kind {
            BlockType::Todo => {
                self.checked.get_or_insert(false);
            }
            BlockType::Toggle => {
                self.open.get_or_insert(false);
            }
            BlockType::Code => {
                self.language
                    .get_or_insert_with(|| DEFAULT_CODE_LANGUAGE.to_string());
            }
            BlockType::Callout => {
                self.emoji
                    .get_or_insert_with(|| DEFAULT_CALLOUT_EMOJI.to_string());
            }
            _ => {}
        }
    }

    pub fn defaults_for(kind: BlockType) -> Self {
        let mut p = Self::default();
        p.apply_defaults(kind);
        p
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Block {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: BlockType,

    #[serde(default)]
    pub content: BlockContent,

    #[serde(default)]
    pub props: BlockProps,

    /// Sort key within the page. May be fractional after an insert.
    pub position: f64,

    pub page_id: String,

    #[serde(default)]
    pub created_by: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Block {
    pub fn text(&self) -> &str {
        &self.content.text
    }
}

/// Payload for creating a block; the service assigns the id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BlockDraft {
    pub page_id: String,

    #[serde(rename = "type")]
    pub kind: BlockType,

    pub content: BlockContent,
    pub props: BlockProps,
    pub position: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Partial update. The service treats it as an upsert keyed by block id.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct BlockPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<BlockType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BlockContent>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<BlockProps>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
}

impl BlockPatch {
    pub fn content(text: &str) -> Self {
        Self {
            content: Some(BlockContent::new(text)),
            ..Default::default()
        }
    }

    pub fn props(props: &BlockProps) -> Self {
        Self {
            props: Some(props.clone()),
            ..Default::default()
        }
    }

    /// What typing and menu edits change. Page and position are left to the
    /// calls that own them (move, reorder).
    pub fn edit(block: &Block) -> Self {
        Self {
            kind: Some(block.kind),
            content: Some(block.content.clone()),
            props: Some(block.props.clone()),
            ..Default::default()
        }
    }

    /// Every field, used when the server copy may be missing or stale.
    pub fn full(block: &Block) -> Self {
        Self {
            page_id: Some(block.page_id.clone()),
            kind: Some(block.kind),
            content: Some(block.content.clone()),
            props: Some(block.props.clone()),
            position: Some(block.position),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BlockLink {
    pub slug: String,

    #[serde(default)]
    pub block_id: String,
}

/// A sibling container a block can be moved to.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub icon: Option<String>,
}

/// Current actor, provided by the host's identity context.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: String,

    #[serde(default)]
    pub name: String,
}
