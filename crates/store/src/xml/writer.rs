//! Design XML writer

use super::values::{format_bool, format_date};
use super::{attrs, tags};
use menu_model::{
    Argument, CallArgument, Function, MenuDesign, MenuTree, Node, NodeId, NodeType,
    ViewerKind, FIRST_PAGE, UNSET_COLUMN,
};
use quick_xml::escape::escape;

/// Encode a design as an XML document
pub fn encode_design(design: &MenuDesign) -> String {
    DesignWriter::new().write(design)
}

/// Attribute list builder that leaves out values at their type default
#[derive(Default)]
struct Attrs(String);

impl Attrs {
    fn always(&mut self, name: &str, value: &str) -> &mut Self {
        self.0.push_str(&format!(r#" {}="{}""#, name, escape(value)));
        self
    }

    fn text(&mut self, name: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.always(name, value);
        }
        self
    }

    fn flag(&mut self, name: &str, value: bool) -> &mut Self {
        if value {
            self.always(name, format_bool(value));
        }
        self
    }

    fn int(&mut self, name: &str, value: i64, default: i64) -> &mut Self {
        if value != default {
            self.always(name, &value.to_string());
        }
        self
    }
}

/// Writer for the design document
pub struct DesignWriter {
    indent: &'static str,
}

impl Default for DesignWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DesignWriter {
    pub fn new() -> Self {
        Self { indent: "  " }
    }

    pub fn write(&self, design: &MenuDesign) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');

        let mut root = Attrs::default();
        root.always(attrs::NAME, design.name())
            .text(attrs::AUTHOR_EMAIL, design.author_email().unwrap_or_default())
            .always(attrs::DATE, &format_date(design.date()))
            .text(attrs::SOURCE, design.source_archive().unwrap_or_default())
            .text(attrs::BINARIES, design.binaries_archive().unwrap_or_default());

        let tree = design.tree();
        let children = tree.children(tree.root_id());
        self.open(&mut xml, 0, tags::MENU_DESIGN, &root, children.is_empty());
        if !children.is_empty() {
            for &child in children {
                self.write_node(&mut xml, tree, child, 1);
            }
            self.close(&mut xml, 0, tags::MENU_DESIGN);
        }
        xml
    }

    fn write_node(&self, xml: &mut String, tree: &MenuTree, id: NodeId, depth: usize) {
        let Some(node_type) = tree.node_type(id) else {
            return;
        };
        match node_type {
            NodeType::RegularMenu => {
                let mut a = Attrs::default();
                a.always(attrs::NAME, tree.name(id).unwrap_or_default());
                self.write_container(xml, tree, id, depth, tags::MENU, &a);
            }
            NodeType::GraphicMenu => {
                if let Some(menu) = tree.get_graphic_menu(id) {
                    let mut a = Attrs::default();
                    a.always(attrs::NAME, menu.name())
                        .always(attrs::WIDTH, &menu.image_width().to_string())
                        .always(attrs::HEIGHT, &menu.image_height().to_string())
                        .always(attrs::COLUMNS, &menu.min_columns().to_string());
                    self.write_container(xml, tree, id, depth, tags::MENU, &a);
                }
            }
            NodeType::GraphicEntry => {
                if let Some(entry) = tree.get_graphic_entry(id) {
                    let mut a = Attrs::default();
                    a.text(attrs::IMAGE_PATH, &entry.image_path)
                        .text(attrs::TOOLTIP, &entry.tooltip);
                    self.write_container(xml, tree, id, depth, tags::GRAPHIC_ENTRY, &a);
                }
            }
            NodeType::Function => {
                if let Some(function) = tree.get_function(id) {
                    self.write_function(xml, function, depth);
                }
            }
            NodeType::PdfFile => {
                if let Some(pdf) = tree.get_pdf_file(id) {
                    let mut a = Attrs::default();
                    a.always(attrs::PATH, pdf.path());
                    self.open(xml, depth, tags::PDF, &a, true);
                }
            }
            NodeType::Separator => {
                self.open(xml, depth, tags::SEPARATOR, &Attrs::default(), true);
            }
        }
    }

    fn write_container(
        &self,
        xml: &mut String,
        tree: &MenuTree,
        id: NodeId,
        depth: usize,
        tag: &str,
        a: &Attrs,
    ) {
        let children = tree.children(id);
        self.open(xml, depth, tag, a, children.is_empty());
        if !children.is_empty() {
            for &child in children {
                self.write_node(xml, tree, child, depth + 1);
            }
            self.close(xml, depth, tag);
        }
    }

    fn write_function(&self, xml: &mut String, function: &Function, depth: usize) {
        let mut a = Attrs::default();
        a.always(attrs::NAME, function.name())
            .text(attrs::PACKAGE, &function.package);
        if function.has_custom_caption() {
            a.always(attrs::CAPTION, function.caption());
        }
        a.text(attrs::PRE_COMMAND, &function.pre_command)
            .flag(attrs::HAS_DATA, function.has_data)
            .flag(attrs::DATA_HEADER, function.data_header)
            .flag(attrs::REMOVE_QUOTES, function.remove_quotes);

        let example = function.example_data();
        let manual = function.manual();
        let empty = example.is_default()
            && manual.is_default()
            && function.execute_once().is_empty()
            && function.arguments().is_empty()
            && function.call_arguments().is_empty();

        self.open(xml, depth, tags::FUNCTION, &a, empty);
        if empty {
            return;
        }

        let inner = depth + 1;
        if !example.is_default() {
            let mut a = Attrs::default();
            a.text(attrs::NAME, &example.name)
                .int(attrs::START_COLUMN, example.start_column().into(), UNSET_COLUMN.into())
                .int(attrs::END_COLUMN, example.end_column().into(), UNSET_COLUMN.into());
            self.open(xml, inner, tags::EXAMPLE_DATA, &a, true);
        }
        if !manual.is_default() {
            let mut a = Attrs::default();
            a.text(attrs::NAME, &manual.pdf_name)
                .int(attrs::PAGE, manual.page().into(), FIRST_PAGE.into());
            self.open(xml, inner, tags::MANUAL, &a, true);
        }
        if !function.execute_once().is_empty() {
            self.pad(xml, inner);
            xml.push_str(&format!(
                "<{tag}>{}</{tag}>\n",
                escape(function.execute_once_text().as_str()),
                tag = tags::EXECUTE_ONCE
            ));
        }
        for argument in function.arguments() {
            self.write_argument(xml, argument, inner);
        }
        for call in function.call_arguments() {
            self.write_call_argument(xml, call, inner);
        }
        self.close(xml, depth, tags::FUNCTION);
    }

    fn write_argument(&self, xml: &mut String, argument: &Argument, depth: usize) {
        let mut a = Attrs::default();
        a.always(attrs::NAME, argument.name())
            .text(attrs::VALUE, &argument.value)
            .flag(attrs::REQUIRED, argument.required)
            .flag(attrs::READ_ONLY, argument.read_only)
            .flag(attrs::MULTISELECT, argument.multiselect)
            .text(attrs::DEPENDS_ON, &argument.depends_on);
        if argument.viewer != ViewerKind::Default {
            a.always(attrs::VIEWER, argument.viewer.as_str());
        }
        self.open(xml, depth, tags::ARGUMENT, &a, true);
    }

    fn write_call_argument(&self, xml: &mut String, call: &CallArgument, depth: usize) {
        let mut a = Attrs::default();
        a.always(attrs::NAME, call.name());
        let empty = call.args().is_empty();
        self.open(xml, depth, tags::CALL_ARGUMENT, &a, empty);
        if empty {
            return;
        }
        for arg in call.args() {
            let mut a = Attrs::default();
            a.always(attrs::NAME, arg.name()).text(attrs::VALUE, &arg.value);
            self.open(xml, depth + 1, tags::ARG, &a, true);
        }
        self.close(xml, depth, tags::CALL_ARGUMENT);
    }

    fn pad(&self, xml: &mut String, depth: usize) {
        for _ in 0..depth {
            xml.push_str(self.indent);
        }
    }

    fn open(&self, xml: &mut String, depth: usize, tag: &str, a: &Attrs, self_closing: bool) {
        self.pad(xml, depth);
        xml.push('<');
        xml.push_str(tag);
        xml.push_str(&a.0);
        xml.push_str(if self_closing { "/>\n" } else { ">\n" });
    }

    fn close(&self, xml: &mut String, depth: usize, tag: &str) {
        self.pad(xml, depth);
        xml.push_str(&format!("</{}>\n", tag));
    }
}
