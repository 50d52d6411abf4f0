use crate::error::TemplateError;
use crate::tpl::render_context::Context;
use std::fmt;

/// A compiled, renderable piece of a template.
///
/// Nodes are built once per compile and rendered any number of times, so
/// they hold no per-render state.
pub trait Node: Send + Sync + fmt::Debug {
    fn render(&self, ctx: &mut Context<'_>) -> Result<String, TemplateError>;
}

#[derive(Debug, Default)]
pub struct NodeList {
    nodes: Vec<Box<dyn Node>>,
}

impl NodeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Box<dyn Node>) {
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn render(&self, ctx: &mut Context<'_>) -> Result<String, TemplateError> {
        let mut out = String::new();
        for node in &self.nodes {
            out.push_str(&node.render(ctx)?);
        }
        Ok(out)
    }
}

#[derive(Debug)]
pub struct TextNode {
    text: String,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        TextNode { text: text.into() }
    }
}

impl Node for TextNode {
    fn render(&self, _ctx: &mut Context<'_>) -> Result<String, TemplateError> {
        Ok(self.text.clone())
    }
}

/// `{{ path.to.value }}` outside a verbatim block: looked up and HTML-escaped.
#[derive(Debug)]
pub struct VariableNode {
    path: String,
}

impl VariableNode {
    pub fn new(path: impl Into<String>) -> Self {
        VariableNode { path: path.into() }
    }
}

impl Node for VariableNode {
    fn render(&self, ctx: &mut Context<'_>) -> Result<String, TemplateError> {
        Ok(ctx
            .lookup(&self.path)
            .map(|v| escape_html(&v.to_string()))
            .unwrap_or_default())
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Output unit of the verbatim scanner.
#[derive(Debug)]
pub enum Segment {
    Literal(String),
    Compiled(Box<dyn Node>),
}

/// Wrap `{% verbatim %}` and `{% endverbatim %}` around a block of
/// javascript template and this will output the contents with no changes,
/// except for recognised server-side tags which are rendered in place.
///
/// ```text
/// {% verbatim %}
///     {% trans "Your name is" %} {{first}} {{last}}
/// {% endverbatim %}
/// ```
#[derive(Debug)]
pub struct VerbatimNode {
    segments: Vec<Segment>,
}

impl VerbatimNode {
    pub fn new(segments: Vec<Segment>) -> Self {
        VerbatimNode { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl Node for VerbatimNode {
    fn render(&self, ctx: &mut Context<'_>) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Compiled(node) => out.push_str(&node.render(ctx)?),
            }
        }
        Ok(out)
    }
}

/// A verbatim block wrapped inside a named `<script>` tag for Handlebars.js.
///
/// ```text
/// {% tplhandlebars "tpl-popup" %}
///     {{#ranges}}
///         <li>{{min}} < {{max}}</li>
///     {{/ranges}}
/// {% endtplhandlebars %}
/// ```
#[derive(Debug)]
pub struct HandlebarsNode {
    template_id: String,
    body: VerbatimNode,
}

impl HandlebarsNode {
    pub fn new(template_id: impl Into<String>, segments: Vec<Segment>) -> Self {
        HandlebarsNode {
            template_id: template_id.into(),
            body: VerbatimNode::new(segments),
        }
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }
}

impl Node for HandlebarsNode {
    fn render(&self, ctx: &mut Context<'_>) -> Result<String, TemplateError> {
        let body = self.body.render(ctx)?;
        let (id_attr, script_type) = if ctx.settings().use_ember_style_attrs {
            ("data-template-name", "text/x-handlebars")
        } else {
            ("id", "text/x-handlebars-template")
        };
        Ok(format!(
            "\n        <script type=\"{}\" {}=\"{}\">\n        {}\n        </script>",
            script_type, id_attr, self.template_id, body
        ))
    }
}

/// `<script>` include for the Handlebars.js runtime under `STATIC_URL`.
#[derive(Debug, Default)]
pub struct HandlebarsJsNode;

impl Node for HandlebarsJsNode {
    fn render(&self, ctx: &mut Context<'_>) -> Result<String, TemplateError> {
        Ok(format!(
            "<script src=\"{}handlebars.js\"></script>",
            ctx.settings().static_url
        ))
    }
}
