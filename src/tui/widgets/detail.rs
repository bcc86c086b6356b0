//! Node detail pane widget
//!
//! Displays the selected node's description with scrolling support.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Paragraph, Widget, Wrap},
};

/// Detail widget for displaying a node description
pub struct DetailView<'a> {
    /// Content to display
    content: &'a str,
    /// Block for borders and title
    block: Option<Block<'a>>,
    /// Scroll offset
    scroll: u16,
}

impl<'a> DetailView<'a> {
    /// Create a new detail view
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            block: None,
            scroll: 0,
        }
    }

    /// Set the block
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Set the scroll offset
    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }
}

impl<'a> Widget for DetailView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Descriptions are prose; wrap instead of clipping
        let paragraph = Paragraph::new(self.content)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));

        let paragraph = if let Some(block) = self.block {
            paragraph.block(block)
        } else {
            paragraph
        };

        paragraph.render(area, buf);
    }
}

/// Detail pane state for scrolling
#[derive(Debug, Default)]
pub struct DetailState {
    /// Current scroll offset (lines from top)
    pub scroll_offset: u16,
    /// Total number of lines in content
    pub total_lines: usize,
    /// Visible height
    pub visible_height: u16,
}

impl DetailState {
    /// Create a new state
    pub fn new() -> Self {
        Self::default()
    }

    /// Update content info
    pub fn set_content(&mut self, content: &str, visible_height: u16) {
        self.total_lines = content.lines().count();
        self.visible_height = visible_height;
        self.clamp_scroll();
    }

    /// Scroll up by n lines
    pub fn scroll_up(&mut self, n: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }

    /// Scroll down by n lines
    pub fn scroll_down(&mut self, n: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(n);
        self.clamp_scroll();
    }

    /// Page up
    pub fn page_up(&mut self) {
        let page = self.visible_height.saturating_sub(2);
        self.scroll_up(page);
    }

    /// Page down
    pub fn page_down(&mut self) {
        let page = self.visible_height.saturating_sub(2);
        self.scroll_down(page);
    }

    /// Reset to the top (called when the selection changes)
    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    /// Ensure scroll offset is within valid range
    fn clamp_scroll(&mut self) {
        let max_scroll = if self.total_lines > self.visible_height as usize {
            (self.total_lines - self.visible_height as usize) as u16
        } else {
            0
        };

        self.scroll_offset = self.scroll_offset.min(max_scroll);
    }
}
