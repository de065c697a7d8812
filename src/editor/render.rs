//! Block Renderer: a pure mapping from a block to the fragment the view mounts.
//!
//! Nothing here reads editor state. Rendering the whole list or a single block
//! yields the same fragment for the same input.

use crate::editor::color::color_style;
use crate::models::{Block, BlockType, DEFAULT_CALLOUT_EMOJI, DEFAULT_CODE_LANGUAGE};
use tw_merge::tw_merge;

pub(crate) const CODE_LANGUAGES: &[&str] = &[
    "plain",
    "rust",
    "javascript",
    "typescript",
    "python",
    "sql",
    "json",
    "html",
    "css",
    "bash",
];

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Template {
    Paragraph,
    Heading { level: u8 },
    Bulleted,
    Numbered { number: usize },
    Todo { checked: bool },
    Toggle { open: bool },
    Code { language: String },
    Quote,
    Callout { emoji: String },
    Divider,
    PageLink { target: Option<String> },
    Columns { count: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockFragment {
    pub id: String,
    pub kind: BlockType,
    pub template: Template,
    pub text: String,
    pub placeholder: &'static str,
    /// Classes for the text surface.
    pub class: String,
    /// Inline color style for the row.
    pub style: String,
    pub editable: bool,
}

/// Sequential numbers for numbered-list items. The counter restarts after any
/// block that is not a numbered-list item.
pub(crate) fn list_numbers(blocks: &[Block]) -> Vec<Option<usize>> {
    let mut n = 0;
    blocks
        .iter()
        .map(|b| {
            if b.kind == BlockType::NumberedList {
                n += 1;
                Some(n)
            } else {
                n = 0;
                None
            }
        })
        .collect()
}

fn template_for(block: &Block, number: Option<usize>) -> Template {
    let p = &block.props;
    match block.kind {
        BlockType::Text => Template::Paragraph,
        BlockType::Heading1 => Template::Heading { level: 1 },
        BlockType::Heading2 => Template::Heading { level: 2 },
        BlockType::Heading3 => Template::Heading { level: 3 },
        BlockType::BulletedList => Template::Bulleted,
        BlockType::NumberedList => Template::Numbered {
            number: number.unwrap_or(1),
        },
        BlockType::Todo => Template::Todo {
            checked: p.checked.unwrap_or(false),
        },
        BlockType::Toggle => Template::Toggle {
            open: p.open.unwrap_or(false),
        },
        BlockType::Code => Template::Code {
            language: p
                .language
                .clone()
                .unwrap_or_else(|| DEFAULT_CODE_LANGUAGE.to_string()),
        },
        BlockType::Quote => Template::Quote,
        BlockType::Callout => Template::Callout {
            emoji: p
                .emoji
                .clone()
                .unwrap_or_else(|| DEFAULT_CALLOUT_EMOJI.to_string()),
        },
        BlockType::Divider => Template::Divider,
        BlockType::PageLink => Template::PageLink {
            target: p.page_id.clone(),
        },
        BlockType::Columns2 | BlockType::Columns3 | BlockType::Columns4 | BlockType::Columns5 => {
            Template::Columns {
                count: block.kind.column_count().unwrap_or(2),
            }
        }
    }
}

fn placeholder_for(kind: BlockType) -> &'static str {
    match kind {
        BlockType::Text => "Type '/' for commands",
        BlockType::Heading1 => "Heading 1",
        BlockType::Heading2 => "Heading 2",
        BlockType::Heading3 => "Heading 3",
        BlockType::BulletedList | BlockType::NumberedList => "List",
        BlockType::Todo => "To-do",
        BlockType::Toggle => "Toggle",
        BlockType::Code => "Code",
        BlockType::Quote => "Quote",
        BlockType::Callout => "Callout",
        BlockType::PageLink => "Untitled page",
        _ => "",
    }
}

fn text_class(template: &Template) -> String {
    let base = "block-input w-full resize-none overflow-hidden bg-transparent outline-none whitespace-pre-wrap break-words";
    let variant = match template {
        Template::Heading { level: 1 } => "text-3xl font-bold mt-4",
        Template::Heading { level: 2 } => "text-2xl font-semibold mt-3",
        Template::Heading { .. } => "text-xl font-semibold mt-2",
        Template::Todo { checked: true } => "text-sm line-through text-muted-foreground",
        Template::Code { .. } => "font-mono text-xs",
        Template::Quote => "text-sm italic",
        Template::PageLink { .. } => "text-sm underline underline-offset-2",
        _ => "text-sm",
    };
    tw_merge!(base, variant)
}

pub fn render_block(block: &Block, number: Option<usize>) -> BlockFragment {
    let template = template_for(block, number);
    BlockFragment {
        id: block.id.clone(),
        kind: block.kind,
        class: text_class(&template),
        template,
        text: block.content.text.clone(),
        placeholder: placeholder_for(block.kind),
        style: color_style(&block.props),
        editable: block.kind.has_text(),
    }
}

pub fn render_blocks(blocks: &[Block]) -> Vec<BlockFragment> {
    blocks
        .iter()
        .zip(list_numbers(blocks))
        .map(|(b, n)| render_block(b, n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::document::block;
    use crate::models::BlockProps;
    use pretty_assertions::assert_eq;

    fn typed(id: &str, kind: BlockType) -> Block {
        let mut b = block(id, "", 1.0);
        b.kind = kind;
        b
    }

    #[test]
    fn test_list_numbers_reset_on_other_blocks() {
        let xs = vec![
            typed("a", BlockType::NumberedList),
            typed("b", BlockType::NumberedList),
            typed("c", BlockType::Text),
            typed("d", BlockType::NumberedList),
            typed("e", BlockType::BulletedList),
            typed("f", BlockType::NumberedList),
            typed("g", BlockType::NumberedList),
        ];
        assert_eq!(
            list_numbers(&xs),
            vec![Some(1), Some(2), None, Some(1), None, Some(1), Some(2)]
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let xs = vec![typed("a", BlockType::NumberedList), typed("b", BlockType::Todo)];
        assert_eq!(render_blocks(&xs), render_blocks(&xs));
        // A single-block render matches its slot in the list render.
        assert_eq!(render_block(&xs[1], None), render_blocks(&xs)[1]);
    }

    #[test]
    fn test_templates_read_props_with_defaults() {
        let mut todo = typed("t", BlockType::Todo);
        todo.props = BlockProps {
            checked: Some(true),
            ..Default::default()
        };
        assert_eq!(render_block(&todo, None).template, Template::Todo { checked: true });

        let callout = typed("c", BlockType::Callout);
        assert_eq!(
            render_block(&callout, None).template,
            Template::Callout {
                emoji: DEFAULT_CALLOUT_EMOJI.to_string()
            }
        );

        let cols = typed("k", BlockType::Columns3);
        let f = render_block(&cols, None);
        assert_eq!(f.template, Template::Columns { count: 3 });
        assert!(!f.editable);
    }

    #[test]
    fn test_heading_class_and_color_style() {
        let mut h = typed("h", BlockType::Heading1);
        h.props.text_color = Some("red".to_string());
        let f = render_block(&h, None);
        assert!(f.class.contains("text-3xl"));
        assert!(!f.class.contains("text-sm"));
        assert_eq!(f.style, "color: #d44c47;");
    }
}
