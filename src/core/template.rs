/// Placeholder templating for event text: parsing, context and rendering.

use thiserror::Error;
use tracing::warn;

use crate::schema::event::ResolvedEvent;
use crate::schema::location::LocationType;
use crate::schema::player::PlayerState;
use crate::schema::world::WorldRegistry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template parse error: {0}")]
    Parse(String),
    #[error("unknown placeholder: {{{0}}}")]
    UnknownPlaceholder(String),
}

/// Name used when the current location has no registered harbor master.
pub const FALLBACK_HARBORMASTER: &str = "the harbormaster";
/// Fee used when the current location has no registered harbor master.
pub const DEFAULT_HARBOR_FEE: u32 = 8;

/// Placeholder names understood by the renderer.
pub const PLACEHOLDERS: &[&str] = &["current_port", "harbormaster_name", "harbor_fee"];

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// Named value: `{current_port}`.
    Placeholder(String),
}

/// A parsed template, as a sequence of segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse a template string into a sequence of segments.
    ///
    /// Syntax:
    /// - `{name}` → `Placeholder`
    /// - `{{` / `}}` → literal `{` / `}`
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<Template, TemplateError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            if chars[i] == '{' {
                if i + 1 < len && chars[i + 1] == '{' {
                    literal_buf.push('{');
                    i += 2;
                    continue;
                }

                if !literal_buf.is_empty() {
                    segments.push(TemplateSegment::Literal(std::mem::take(&mut literal_buf)));
                }

                let start = i + 1;
                let mut end = start;
                while end < len && chars[end] != '}' {
                    if chars[end] == '{' {
                        return Err(TemplateError::Parse(
                            "nested braces are not allowed".to_string(),
                        ));
                    }
                    end += 1;
                }

                if end == len {
                    return Err(TemplateError::Parse("unclosed brace".to_string()));
                }

                // Names are exact: `{ current_port }` is not `{current_port}`.
                let name: String = chars[start..end].iter().collect();
                if name.is_empty() {
                    return Err(TemplateError::Parse("empty braces".to_string()));
                }

                segments.push(TemplateSegment::Placeholder(name));
                i = end + 1;
            } else if chars[i] == '}' {
                if i + 1 < len && chars[i + 1] == '}' {
                    literal_buf.push('}');
                    i += 2;
                    continue;
                }
                return Err(TemplateError::Parse(
                    "unmatched closing brace".to_string(),
                ));
            } else {
                literal_buf.push(chars[i]);
                i += 1;
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }

        Ok(Template { segments })
    }

    /// Placeholder names referenced by this template, in order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            TemplateSegment::Placeholder(name) => Some(name.as_str()),
            TemplateSegment::Literal(_) => None,
        })
    }

    pub fn render(&self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Placeholder(name) => {
                    let value = ctx
                        .lookup(name)
                        .ok_or_else(|| TemplateError::UnknownPlaceholder(name.clone()))?;
                    out.push_str(&value);
                }
            }
        }
        Ok(out)
    }
}

/// Named values available to event text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    pub current_port: String,
    pub harbormaster_name: String,
    pub harbor_fee: u32,
}

impl TemplateContext {
    /// Build the context for the player's current location. The harbor
    /// master is only looked up at major ports.
    pub fn for_state(state: &PlayerState, world: &WorldRegistry) -> Self {
        let master = match state.current_location_type {
            LocationType::MajorPort => world.harbor_master_for(&state.current_location),
            LocationType::Sea | LocationType::Village => None,
        };
        Self {
            current_port: state.current_location.clone(),
            harbormaster_name: master
                .map(|m| m.name.clone())
                .unwrap_or_else(|| FALLBACK_HARBORMASTER.to_string()),
            harbor_fee: master.map(|m| m.fee).unwrap_or(DEFAULT_HARBOR_FEE),
        }
    }

    /// Resolve a placeholder name. camelCase spellings are accepted.
    pub fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "current_port" | "currentPort" => Some(self.current_port.clone()),
            "harbormaster_name" | "harbormasterName" => Some(self.harbormaster_name.clone()),
            "harbor_fee" | "harborFee" => Some(self.harbor_fee.to_string()),
            _ => None,
        }
    }
}

/// Render one string. Any parse or lookup failure yields `text` unchanged.
pub fn render_text(text: &str, ctx: &TemplateContext) -> String {
    match Template::parse(text).and_then(|template| template.render(ctx)) {
        Ok(rendered) => rendered,
        Err(err) => {
            warn!(%err, text, "leaving event text unrendered");
            text.to_string()
        }
    }
}

/// Render the description and every option label of an event.
pub fn render(event: &ResolvedEvent, ctx: &TemplateContext) -> ResolvedEvent {
    let mut rendered = event.clone();
    rendered.description = render_text(&event.description, ctx);
    for option in rendered.options.values_mut() {
        option.text = render_text(&option.text, ctx);
    }
    rendered
}
