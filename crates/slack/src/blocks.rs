use serde::Serialize;
use shelfcheck_core::pricing::format_gbp;
use shelfcheck_core::{ProductSummary, StockAggregate};

use crate::registry::CommandSpec;

pub const FOOTER_TEXT: &str = "Shelfcheck product lookup";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    #[serde(rename = "plain_text")]
    Plain { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Plain { text } | Self::Mrkdwn { text } => text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ButtonElement {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub action_id: String,
    pub text: TextObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ButtonElement {
    pub fn new(action_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: "button",
            action_id: action_id.into(),
            text: TextObject::plain(label),
            style: None,
            url: None,
        }
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        block_id: String,
        text: TextObject,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        fields: Vec<TextObject>,
    },
    Actions {
        block_id: String,
        elements: Vec<ButtonElement>,
    },
    Context {
        block_id: String,
        elements: Vec<TextObject>,
    },
}

impl Block {
    pub fn block_id(&self) -> &str {
        match self {
            Self::Section { block_id, .. }
            | Self::Actions { block_id, .. }
            | Self::Context { block_id, .. } => block_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub fallback_text: String,
    pub blocks: Vec<Block>,
    /// Visible only to the invoking user.
    #[serde(skip)]
    pub ephemeral: bool,
}

impl MessageTemplate {
    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.block_id() == block_id)
    }

    /// Every piece of text in the message, for assertions and logs.
    pub fn rendered_text(&self) -> String {
        let mut parts = vec![self.fallback_text.clone()];
        for block in &self.blocks {
            match block {
                Block::Section { text, fields, .. } => {
                    parts.push(text.text().to_owned());
                    parts.extend(fields.iter().map(|field| field.text().to_owned()));
                }
                Block::Actions { elements, .. } => {
                    for element in elements {
                        parts.push(element.text.text().to_owned());
                        if let Some(url) = &element.url {
                            parts.push(url.clone());
                        }
                    }
                }
                Block::Context { elements, .. } => {
                    parts.extend(elements.iter().map(|element| element.text().to_owned()));
                }
            }
        }
        parts.join("\n")
    }
}

pub struct MessageBuilder {
    fallback_text: String,
    blocks: Vec<Block>,
    ephemeral: bool,
}

impl MessageBuilder {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self { fallback_text: fallback_text.into(), blocks: Vec::new(), ephemeral: false }
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    pub fn section<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut SectionBuilder),
    {
        let mut builder = SectionBuilder::default();
        build(&mut builder);
        let (text, fields) = builder.build();
        self.blocks.push(Block::Section { block_id: block_id.into(), text, fields });
        self
    }

    pub fn actions<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ActionsBuilder),
    {
        let mut builder = ActionsBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Actions { block_id: block_id.into(), elements: builder.build() });
        self
    }

    pub fn context<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ContextBuilder),
    {
        let mut builder = ContextBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Context { block_id: block_id.into(), elements: builder.build() });
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate {
            fallback_text: self.fallback_text,
            blocks: self.blocks,
            ephemeral: self.ephemeral,
        }
    }
}

#[derive(Default)]
pub struct SectionBuilder {
    text: Option<TextObject>,
    fields: Vec<TextObject>,
}

impl SectionBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::mrkdwn(text));
        self
    }

    /// Adds a labelled two-column field.
    pub fn field(&mut self, label: &str, value: impl AsRef<str>) -> &mut Self {
        self.fields.push(TextObject::mrkdwn(format!("*{label}*\n{}", value.as_ref())));
        self
    }

    fn build(self) -> (TextObject, Vec<TextObject>) {
        (self.text.unwrap_or_else(|| TextObject::plain(" ")), self.fields)
    }
}

#[derive(Default)]
pub struct ActionsBuilder {
    elements: Vec<ButtonElement>,
}

impl ActionsBuilder {
    pub fn button(&mut self, button: ButtonElement) -> &mut Self {
        self.elements.push(button);
        self
    }

    fn build(self) -> Vec<ButtonElement> {
        self.elements
    }
}

#[derive(Default)]
pub struct ContextBuilder {
    elements: Vec<TextObject>,
}

impl ContextBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> Vec<TextObject> {
        self.elements
    }
}

fn link(url: &str, label: &str) -> String {
    format!("<{url}|{label}>")
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

pub fn product_info_card(summary: &ProductSummary) -> MessageTemplate {
    let prices =
        format!("{} - ({})", format_gbp(summary.price), format_gbp(summary.discounted_price));

    MessageBuilder::new(format!(
        "{}: {prices}, stock {}, available online: {}",
        summary.title,
        summary.stock_level,
        yes_no(summary.purchasable)
    ))
    .section("product.info.title.v1", |section| {
        section.mrkdwn(format!("*{}*", link(&summary.links.product_page, &summary.title)));
    })
    .section("product.info.fields.v1", |section| {
        section
            .mrkdwn(format!("Product `{}`", summary.code))
            .field("Price (SD)", &prices)
            .field("Stock", summary.stock_level.to_string())
            .field("Available Online", yes_no(summary.purchasable));
    })
    .actions("product.info.links.v1", |actions| {
        actions
            .button(
                ButtonElement::new("product.link.sas.v1", "SAS")
                    .style(ButtonStyle::Primary)
                    .url(&summary.links.seller_lookup),
            )
            .button(ButtonElement::new("product.link.tcb.v1", "TCB").url(&summary.links.cashback));
        if let Some(image) = &summary.links.image {
            actions.button(ButtonElement::new("product.link.image.v1", "Image URL").url(image));
        }
    })
    .context("product.info.footer.v1", |context| {
        context.plain(FOOTER_TEXT);
    })
    .build()
}

pub fn store_stock_card(summary: &ProductSummary, aggregate: &StockAggregate) -> MessageTemplate {
    let store_lines = aggregate
        .iter()
        .map(|(store, level)| format!("{store} : {level}"))
        .collect::<Vec<_>>()
        .join("\n");
    let total = aggregate.total();
    let skipped = aggregate.failed().len();

    MessageBuilder::new(format!(
        "{}: {total} in stock across {} stores",
        summary.title,
        aggregate.len()
    ))
    .section("product.stock.title.v1", |section| {
        section.mrkdwn(format!(
            "*{}*\n_Returns only stores with stock_",
            link(&summary.links.product_page, &summary.title)
        ));
    })
    .section("product.stock.stores.v1", |section| {
        section.mrkdwn(format!("*Store Stock*\n{store_lines}\n*Total Stock : {total}*"));
    })
    .section("product.stock.notes.v1", |section| {
        section.mrkdwn(format!("*Notes*\n`Price : {}`", format_gbp(summary.price)));
    })
    .section("product.stock.links.v1", |section| {
        section.mrkdwn(format!(
            "*More Info*\n{} - {}",
            link(&summary.links.api, "API"),
            link(&summary.links.seller_lookup, "SAS")
        ));
    })
    .context("product.stock.footer.v1", |context| {
        if skipped > 0 {
            context.mrkdwn(format!(":warning: {skipped} store(s) could not be checked"));
        }
        context.plain(FOOTER_TEXT);
    })
    .build()
}

pub fn upstream_error_card(reason: &str) -> MessageTemplate {
    MessageBuilder::new(format!("Error: {reason}"))
        .section("product.error.v1", |section| {
            section.mrkdwn("*Error*").field("Reason", reason);
        })
        .build()
}

pub fn notice_message(text: &str) -> MessageTemplate {
    MessageBuilder::new(text.to_owned())
        .section("shelfcheck.notice.v1", |section| {
            section.plain(text);
        })
        .build()
}

pub fn deferred_placeholder(location: &str) -> MessageTemplate {
    MessageBuilder::new(format!("Checking stores near {location}..."))
        .context("shelfcheck.deferred.v1", |context| {
            context.mrkdwn(format!(":hourglass_flowing_sand: Checking stores near *{location}*..."));
        })
        .build()
}

pub fn error_message(summary: &str, correlation_id: &str) -> MessageTemplate {
    MessageBuilder::new(summary.to_owned())
        .section("shelfcheck.error.summary.v1", |section| {
            section.mrkdwn(format!(":warning: {summary}"));
        })
        .context("shelfcheck.error.context.v1", |context| {
            context.plain(format!("Correlation ID: {correlation_id}"));
        })
        .build()
}

pub fn help_message(commands: &[CommandSpec]) -> MessageTemplate {
    let lines = commands
        .iter()
        .map(|command| format!("• `{}` - {}", command.usage(), command.description))
        .collect::<Vec<_>>()
        .join("\n");

    MessageBuilder::new("Shelfcheck command help")
        .ephemeral()
        .section("shelfcheck.help.summary.v1", |section| {
            section.mrkdwn(format!("*Available commands*\n{lines}"));
        })
        .build()
}
