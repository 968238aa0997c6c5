//! Plain-text ticket builder
//!
//! Widths are measured the way Chinese thermal printers count them: GBK
//! byte width (CJK = 2, ASCII = 1). Characters GBK cannot encode
//! (Myanmar script, symbols) count as 1.

/// Display width of one character
fn char_width(c: char) -> usize {
    let mut buf = [0u8; 4];
    let (cow, _, had_errors) = encoding_rs::GBK.encode(c.encode_utf8(&mut buf));
    if had_errors { 1 } else { cow.len().max(1) }
}

/// Printer width of a string
pub fn text_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Cut a string to at most `max_width`
pub fn truncate(s: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = char_width(c);
        if width + w > max_width {
            break;
        }
        out.push(c);
        width += w;
    }
    out
}

/// Pad (or truncate) to exactly `width`
pub fn pad(s: &str, width: usize, align_right: bool) -> String {
    let current = text_width(s);
    if current >= width {
        return truncate(s, width);
    }
    let spaces = " ".repeat(width - current);
    if align_right {
        format!("{spaces}{s}")
    } else {
        format!("{s}{spaces}")
    }
}

/// Line-oriented ticket builder
pub struct TicketBuilder {
    width: usize,
    lines: Vec<String>,
}

impl TicketBuilder {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Raw line, no wrapping
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.lines.push(s.to_string());
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    /// Centered line (left padding only)
    pub fn center(&mut self, s: &str) -> &mut Self {
        let w = text_width(s);
        let left = self.width.saturating_sub(w) / 2;
        self.lines.push(format!("{}{}", " ".repeat(left), s));
        self
    }

    /// `====...`
    pub fn sep_double(&mut self) -> &mut Self {
        self.lines.push("=".repeat(self.width));
        self
    }

    /// `----...`
    pub fn sep_single(&mut self) -> &mut Self {
        self.lines.push("-".repeat(self.width));
        self
    }

    /// Left and right text on one line; the left side is cut if both don't fit
    pub fn line_lr(&mut self, left: &str, right: &str) -> &mut Self {
        let right_w = text_width(right);
        if right_w >= self.width {
            self.lines.push(right.to_string());
            return self;
        }
        let left_space = self.width - right_w;
        let left = pad(left, left_space, false);
        self.lines.push(format!("{left}{right}"));
        self
    }

    pub fn build(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}
