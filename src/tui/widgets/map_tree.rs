//! Mind-map tree widget
//!
//! Displays the current tree as an indented list in pre-order, which is
//! also the order the selection moves through. Flattening preserves child
//! order, so what the user sees is exactly the traversal order of the
//! underlying tree.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, StatefulWidget},
};

use crate::tree::Tree;
use crate::tui::theme::Theme;

/// One visible row of the flattened map
#[derive(Debug, Clone)]
pub struct MapRow {
    /// Node label
    pub label: String,
    /// Node description, if any
    pub description: Option<String>,
    /// Depth below the root (root is 0)
    pub depth: usize,
    /// Whether the node has children
    pub has_children: bool,
}

/// Flatten a tree into rows, pre-order
pub fn flatten_tree(tree: &Tree) -> Vec<MapRow> {
    let mut rows = Vec::with_capacity(tree.node_count());
    flatten_node(&tree.root, 0, &mut rows);
    rows
}

fn flatten_node(node: &crate::tree::Node, depth: usize, rows: &mut Vec<MapRow>) {
    rows.push(MapRow {
        label: node.label.clone(),
        description: node.description.clone(),
        depth,
        has_children: !node.children.is_empty(),
    });
    for child in &node.children {
        flatten_node(child, depth + 1, rows);
    }
}

/// Map tree widget
pub struct MapTree<'a> {
    /// Flattened rows to display
    rows: &'a [MapRow],
    /// Theme for styling
    theme: &'a Theme,
    /// Block for borders and title
    block: Option<Block<'a>>,
    /// Style for the selected row
    highlight_style: Style,
}

impl<'a> MapTree<'a> {
    /// Create a new map tree
    pub fn new(rows: &'a [MapRow], theme: &'a Theme) -> Self {
        Self {
            rows,
            theme,
            block: None,
            highlight_style: theme.selection().add_modifier(Modifier::BOLD),
        }
    }

    /// Set the block
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Set the highlight style
    pub fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }

    fn to_list_items(&self) -> Vec<ListItem<'a>> {
        self.rows
            .iter()
            .map(|row| {
                let glyph = if row.has_children { "▸ " } else { "· " };
                let label_color = if row.has_children {
                    self.theme.node_branch
                } else {
                    self.theme.node_leaf
                };

                let mut spans = vec![
                    Span::raw("  ".repeat(row.depth)),
                    Span::styled(glyph, Style::default().fg(self.theme.node_glyph)),
                    Span::styled(row.label.clone(), Style::default().fg(label_color)),
                ];

                if row.description.is_some() {
                    spans.push(Span::styled(
                        " *",
                        Style::default().fg(self.theme.text_secondary),
                    ));
                }

                ListItem::new(Line::from(spans))
            })
            .collect()
    }
}

impl<'a> StatefulWidget for MapTree<'a> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let items = self.to_list_items();
        let list = List::new(items).highlight_style(self.highlight_style);
        let list = if let Some(block) = self.block {
            list.block(block)
        } else {
            list
        };

        StatefulWidget::render(list, area, buf, state);
    }
}

/// Map tree selection state
#[derive(Debug, Default)]
pub struct MapTreeState {
    /// Inner list state
    pub list_state: ListState,
    /// Total number of rows
    pub row_count: usize,
}

impl MapTreeState {
    /// Create a new state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the selected index
    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// Select a row
    pub fn select(&mut self, index: Option<usize>) {
        self.list_state.select(index);
    }

    /// Select the next row
    pub fn next(&mut self) {
        if self.row_count == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i >= self.row_count - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };

        self.list_state.select(Some(i));
    }

    /// Select the previous row
    pub fn previous(&mut self) {
        if self.row_count == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.row_count - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };

        self.list_state.select(Some(i));
    }

    /// Update row count and ensure selection is valid
    pub fn set_row_count(&mut self, count: usize) {
        self.row_count = count;

        if let Some(selected) = self.list_state.selected() {
            if selected >= count && count > 0 {
                self.list_state.select(Some(count - 1));
            } else if count == 0 {
                self.list_state.select(None);
            }
        }
    }
}
