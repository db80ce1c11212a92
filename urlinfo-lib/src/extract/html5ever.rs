use html5ever::{
    buffer_queue::BufferQueue,
    tendril::StrTendril,
    tokenizer::{
        Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
        states::RawKind,
    },
};

/// A `<link>` element, reduced to the attributes needed for favicons
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinkTag {
    pub(crate) rel: String,
    pub(crate) href: Option<String>,
}

impl LinkTag {
    /// Compare the `rel` attribute ASCII case-insensitively, ignoring
    /// surrounding and repeated whitespace.
    pub(crate) fn has_rel(&self, rel: &str) -> bool {
        self.rel
            .split_ascii_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .eq_ignore_ascii_case(rel)
    }
}

/// Everything the metadata extractor needs from a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct HeadElements {
    /// Raw text of the first `<title>`
    pub(crate) title: Option<String>,
    /// All `<link rel=...>` elements in document order
    pub(crate) links: Vec<LinkTag>,
}

#[derive(Clone, Default)]
struct HeadExtractor {
    elements: HeadElements,
    inside_first_title: bool,
}

impl HeadExtractor {
    fn start_tag(&mut self, tag: Tag) -> TokenSinkResult<()> {
        // A bare tokenizer does not know which elements hold raw text; the
        // tree builder normally switches states. Do the same here so that
        // markup inside `<script>` is not taken for real elements.
        match &*tag.name {
            "title" => {
                if self.elements.title.is_none() {
                    self.elements.title = Some(String::new());
                    self.inside_first_title = true;
                }
                TokenSinkResult::RawData(RawKind::Rcdata)
            }
            "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
            "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                TokenSinkResult::RawData(RawKind::Rawtext)
            }
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            "plaintext" => TokenSinkResult::Plaintext,
            "link" => {
                let attr = |name: &str| {
                    tag.attrs
                        .iter()
                        .find(|attr| &*attr.name.local == name)
                        .map(|attr| attr.value.to_string())
                };
                if let Some(rel) = attr("rel") {
                    self.elements.links.push(LinkTag {
                        rel,
                        href: attr("href"),
                    });
                }
                TokenSinkResult::Continue
            }
            _ => TokenSinkResult::Continue,
        }
    }
}

impl TokenSink for HeadExtractor {
    type Handle = ();

    #[allow(clippy::match_same_arms)]
    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(raw) => {
                if self.inside_first_title {
                    if let Some(title) = self.elements.title.as_mut() {
                        title.push_str(&raw);
                    }
                }
            }
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => return self.start_tag(tag),
                TagKind::EndTag => {
                    if &*tag.name == "title" {
                        self.inside_first_title = false;
                    }
                }
            },
            Token::ParseError(_err) => {
                // Silently ignore parse errors
            }
            Token::CommentToken(_raw) => (),
            Token::NullCharacterToken => (),
            Token::DoctypeToken(_doctype) => (),
            Token::EOFToken => (),
        }
        TokenSinkResult::Continue
    }
}

/// Collect the title and `<link>` elements of an HTML string.
pub(crate) fn extract_html(buf: &str) -> HeadElements {
    let mut input = BufferQueue::new();
    input.push_back(StrTendril::from(buf));

    let mut tokenizer = Tokenizer::new(HeadExtractor::default(), TokenizerOpts::default());
    let _handle = tokenizer.feed(&mut input);
    tokenizer.end();

    tokenizer.sink.elements
}
