//! Markdown source to block tree
//!
//! Walks the pulldown-cmark event stream and builds [`Block`]/[`Inline`]
//! trees. Containers that are not rendered (tables, quotes, lists, HTML
//! blocks, footnote definitions) are recorded once as
//! [`Block::Unsupported`] and their contents are skipped.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use nbpdf_ast::{
    Block, CodeBlock, Heading, Image, Inline, Link, Paragraph, UnsupportedBlock,
    UnsupportedInline,
};

/// Parse markdown into blocks
pub fn parse_markdown(source: &str) -> Vec<Block> {
    let mut builder = TreeBuilder::default();
    for event in Parser::new_ext(source, options()) {
        builder.push(event);
    }
    builder.finish()
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_MATH
}

#[derive(Debug)]
enum FrameKind {
    Paragraph,
    Heading(u8),
    Emphasis,
    Strong,
    Strikethrough,
    Link { url: String, title: Option<String> },
    Image { src: String },
    Transparent,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    children: Vec<Inline>,
}

#[derive(Default)]
struct TreeBuilder {
    blocks: Vec<Block>,
    stack: Vec<Frame>,
    code: Option<CodeBlock>,
    /// Nesting depth inside a skipped container
    skip_depth: usize,
}

impl TreeBuilder {
    fn push(&mut self, event: Event<'_>) {
        if self.skip_depth > 0 {
            match event {
                Event::Start(_) => self.skip_depth += 1,
                Event::End(_) => self.skip_depth -= 1,
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => match self.code.as_mut() {
                Some(code) => code.text.push_str(&text),
                None => self.inline(Inline::Text(text.into_string())),
            },
            Event::Code(code) => self.inline(Inline::Code(code.into_string())),
            Event::InlineMath(math) => self.inline(Inline::Math(math.into_string())),
            Event::DisplayMath(math) => self.display_math(math.into_string()),
            Event::Html(_) | Event::InlineHtml(_) => {
                self.inline(Inline::Unsupported(UnsupportedInline::Html))
            }
            Event::FootnoteReference(_) => {
                self.inline(Inline::Unsupported(UnsupportedInline::FootnoteReference))
            }
            Event::SoftBreak => self.inline(Inline::text("\n")),
            Event::HardBreak => self.inline(Inline::LineBreak),
            Event::Rule => self.blocks.push(Block::Rule),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::Heading { level, .. } => FrameKind::Heading(level as u8),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_string)
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeBlock {
                    language,
                    text: String::new(),
                });
                return;
            }
            Tag::Emphasis => FrameKind::Emphasis,
            Tag::Strong => FrameKind::Strong,
            Tag::Strikethrough => FrameKind::Strikethrough,
            Tag::Link {
                dest_url, title, ..
            } => FrameKind::Link {
                url: dest_url.into_string(),
                title: Some(title.into_string()).filter(|t| !t.is_empty()),
            },
            Tag::Image { dest_url, .. } => FrameKind::Image {
                src: dest_url.into_string(),
            },
            Tag::Table(_) => return self.skip(UnsupportedBlock::Table),
            Tag::BlockQuote(_) => return self.skip(UnsupportedBlock::BlockQuote),
            Tag::List(_) => return self.skip(UnsupportedBlock::List),
            Tag::Item => return self.skip(UnsupportedBlock::ListItem),
            Tag::HtmlBlock => return self.skip(UnsupportedBlock::Html),
            Tag::FootnoteDefinition(_) => return self.skip(UnsupportedBlock::Footnote),
            _ => FrameKind::Transparent,
        };
        self.stack.push(Frame {
            kind,
            children: Vec::new(),
        });
    }

    fn end(&mut self, tag: TagEnd) {
        if tag == TagEnd::CodeBlock {
            if let Some(code) = self.code.take() {
                self.blocks.push(Block::Code(code));
            }
            return;
        }

        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame.kind {
            FrameKind::Paragraph => self.flush_paragraph(frame.children),
            FrameKind::Heading(level) => self.blocks.push(Block::Heading(Heading {
                level,
                inlines: frame.children,
            })),
            FrameKind::Emphasis => self.inline(Inline::Emphasis(frame.children)),
            FrameKind::Strong => self.inline(Inline::Strong(frame.children)),
            FrameKind::Strikethrough => self.inline(Inline::Strikethrough(frame.children)),
            FrameKind::Link { url, title } => self.inline(Inline::Link(Link {
                url,
                title,
                text: frame.children,
            })),
            FrameKind::Image { src } => self.inline(Inline::Image(Image {
                src,
                alt: plain_text(&frame.children),
            })),
            FrameKind::Transparent => {
                for child in frame.children {
                    self.inline(child);
                }
            }
        }
    }

    /// Record an unsupported container and skip everything inside it
    fn skip(&mut self, kind: UnsupportedBlock) {
        log::debug!("Skipping {}", kind.name());
        self.blocks.push(Block::Unsupported(kind));
        self.skip_depth = 1;
    }

    /// Display math directly inside a paragraph splits it in two
    fn display_math(&mut self, math: String) {
        let top_level_paragraph =
            self.stack.len() == 1 && matches!(self.stack[0].kind, FrameKind::Paragraph);
        if !top_level_paragraph {
            self.inline(Inline::Math(math));
            return;
        }

        if let Some(frame) = self.stack.pop() {
            self.flush_paragraph(frame.children);
        }
        self.blocks.push(Block::Math(math));
        self.stack.push(Frame {
            kind: FrameKind::Paragraph,
            children: Vec::new(),
        });
    }

    fn flush_paragraph(&mut self, inlines: Vec<Inline>) {
        let blank = inlines
            .iter()
            .all(|i| matches!(i, Inline::Text(t) if t.trim().is_empty()));
        if !blank {
            self.blocks.push(Block::Paragraph(Paragraph { inlines }));
        }
    }

    /// Append to the innermost open frame, merging adjacent text
    fn inline(&mut self, inline: Inline) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        if let (Some(Inline::Text(last)), Inline::Text(text)) = (frame.children.last_mut(), &inline)
        {
            last.push_str(text);
            return;
        }
        frame.children.push(inline);
    }

    fn finish(mut self) -> Vec<Block> {
        while let Some(frame) = self.stack.pop() {
            if let FrameKind::Paragraph = frame.kind {
                self.flush_paragraph(frame.children);
            }
        }
        if let Some(code) = self.code.take() {
            self.blocks.push(Block::Code(code));
        }
        self.blocks
    }
}

/// Text content of an inline tree, used for image alt text
fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(t) | Inline::Code(t) | Inline::Math(t) => out.push_str(t),
            Inline::Emphasis(children)
            | Inline::Strong(children)
            | Inline::Strikethrough(children) => out.push_str(&plain_text(children)),
            Inline::Link(link) => out.push_str(&plain_text(&link.text)),
            Inline::Image(image) => out.push_str(&image.alt),
            Inline::LineBreak | Inline::Unsupported(_) => {}
        }
    }
    out
}
