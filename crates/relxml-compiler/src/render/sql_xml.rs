//! Standard SQL/XML backend.

use super::keys::*;
use super::{Model, ROW_XML_COLUMN, RenderError, TemplateKind, Templates};

/// Renders models as standard SQL/XML (`xmlelement`, `xmlforest`, `xmlagg`).
///
/// Nested queries are indented one unit per level. The large-character
/// output type serializes the XML column with `xmlserialize(... as clob)`.
#[derive(Clone, Debug)]
pub struct SqlXmlTemplates {
    indent: String,
}

impl Default for SqlXmlTemplates {
    fn default() -> Self {
        Self::new(2)
    }
}

impl SqlXmlTemplates {
    /// `indent` is the number of spaces per nesting level.
    pub fn new(indent: usize) -> Self {
        Self {
            indent: " ".repeat(indent),
        }
    }

    fn row_elements(&self, model: &Model) -> Result<String, RenderError> {
        let alias = model.str(ALIAS)?;
        let relation = model.str(RELATION)?;
        let select_fields = model.list(SELECT_FIELDS)?;
        let xml_fields = model.list(XML_FIELDS)?;
        let row_name = model.str(ROW_ELEMENT_NAME)?;
        let namespace = model.opt_str(NAMESPACE)?;
        let parents = model.list(PARENT_FRAGMENTS)?;
        let children = model.list(CHILD_FRAGMENTS)?;
        let filter = model.opt_str(FILTER)?;
        let order_by = model.list(ORDER_BY)?;
        let large_char = model.bool(LARGE_CHAR_OUTPUT)?;
        let column = model.str(RESULT_COLUMN)?;

        let mut content = Vec::new();
        if let Some(ns) = namespace {
            content.push(vec![namespaces(ns)]);
        }
        if !xml_fields.is_empty() {
            let forest: Vec<String> = xml_fields
                .iter()
                .map(|f| format!("{alias}.{f} as {}", quote_name(&f.to_lowercase())))
                .collect();
            content.push(vec![format!("xmlforest({})", forest.join(", "))]);
        }
        for fragment in parents.iter().chain(children) {
            content.push(self.subquery(fragment));
        }

        let mut xml = self.element(row_name, content);
        if large_char {
            xml = serialized(xml);
        }
        append(&mut xml, &format!(" as {column}"));

        let mut columns: Vec<Vec<String>> = select_fields
            .iter()
            .map(|f| vec![format!("{alias}.{f}")])
            .collect();
        columns.push(xml);

        let mut lines = vec!["select".to_string()];
        lines.extend(self.comma_list(columns));
        lines.push(format!("from {relation} {alias}"));
        tail(&mut lines, filter, order_by);
        Ok(lines.join("\n"))
    }

    fn row_collection(&self, model: &Model, wrapped: bool) -> Result<String, RenderError> {
        let alias = model.str(ALIAS)?;
        let rows_query = model.str(ROWS_QUERY)?;
        let filter = model.opt_str(FILTER)?;
        let order_by = model.list(ORDER_BY)?;
        let large_char = model.bool(LARGE_CHAR_OUTPUT)?;
        let column = model.str(RESULT_COLUMN)?;

        let agg = if order_by.is_empty() {
            format!("xmlagg({alias}.{ROW_XML_COLUMN})")
        } else {
            format!(
                "xmlagg({alias}.{ROW_XML_COLUMN} order by {})",
                order_by.join(", ")
            )
        };

        let mut xml = if wrapped {
            let name = model.str(COLLECTION_ELEMENT_NAME)?;
            let mut content = Vec::new();
            if let Some(ns) = model.opt_str(NAMESPACE)? {
                content.push(vec![namespaces(ns)]);
            }
            content.push(vec![agg]);
            self.element(name, content)
        } else {
            vec![agg]
        };
        if large_char {
            xml = serialized(xml);
        }
        append(&mut xml, &format!(" as {column}"));

        let mut lines = vec!["select".to_string()];
        lines.extend(self.indented(xml));
        lines.push("from (".to_string());
        lines.extend(self.indented(rows_query.lines().map(str::to_string)));
        lines.push(format!(") {alias}"));
        tail(&mut lines, filter, &[]);
        Ok(lines.join("\n"))
    }

    /// `xmlelement(name "x", a, b)` with one content item per group of lines.
    fn element(&self, name: &str, content: Vec<Vec<String>>) -> Vec<String> {
        let head = format!("xmlelement(name {}", quote_name(name));
        if content.is_empty() {
            return vec![format!("{head})")];
        }
        let mut lines = vec![format!("{head},")];
        lines.extend(self.comma_list(content));
        lines.push(")".to_string());
        lines
    }

    fn subquery(&self, query: &str) -> Vec<String> {
        let mut lines = vec!["(".to_string()];
        lines.extend(self.indented(query.lines().map(str::to_string)));
        lines.push(")".to_string());
        lines
    }

    /// Indent every item one level and separate items with commas.
    fn comma_list(&self, items: Vec<Vec<String>>) -> Vec<String> {
        let count = items.len();
        let mut lines = Vec::new();
        for (i, mut item) in items.into_iter().enumerate() {
            if i + 1 < count {
                append(&mut item, ",");
            }
            lines.extend(self.indented(item));
        }
        lines
    }

    fn indented(&self, lines: impl IntoIterator<Item = String>) -> Vec<String> {
        lines
            .into_iter()
            .map(|line| {
                if line.is_empty() {
                    line
                } else {
                    format!("{}{line}", self.indent)
                }
            })
            .collect()
    }
}

impl Templates for SqlXmlTemplates {
    fn render(&self, template: TemplateKind, model: &Model) -> Result<String, RenderError> {
        match template {
            TemplateKind::RowElements => self.row_elements(model),
            TemplateKind::RowCollection => self.row_collection(model, true),
            TemplateKind::RowForest => self.row_collection(model, false),
        }
    }
}

fn tail(lines: &mut Vec<String>, filter: Option<&str>, order_by: &[String]) {
    if let Some(filter) = filter {
        lines.push(format!("where {filter}"));
    }
    if !order_by.is_empty() {
        lines.push(format!("order by {}", order_by.join(", ")));
    }
}

fn append(lines: &mut [String], suffix: &str) {
    if let Some(last) = lines.last_mut() {
        last.push_str(suffix);
    }
}

fn serialized(mut lines: Vec<String>) -> Vec<String> {
    if let Some(first) = lines.first_mut() {
        first.insert_str(0, "xmlserialize(content ");
    }
    append(&mut lines, " as clob)");
    lines
}

fn namespaces(ns: &str) -> String {
    format!("xmlnamespaces(default '{}')", ns.replace('\'', "''"))
}

fn quote_name(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
