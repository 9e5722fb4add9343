//! Design XML parser
//!
//! The document is read into an [`XmlElement`] tree first, then walked
//! top-down. Each node is attached to its parent under a placeholder name
//! and renamed once its attributes have been read. Errors carry the element
//! chain from the root, e.g. `MenuDesign/Menu[Stats]/Function`.

use super::classify::{classify_menu, MenuSpec};
use super::element::XmlElement;
use super::values::{parse_bool, parse_date};
use super::{attrs, tags};
use crate::error::{Result, StoreError};
use menu_model::{Arg, Argument, CallArgument, Function, MenuDesign, NodeId, ViewerKind};
use tracing::debug;

const PLACEHOLDER_NAME: &str = "unnamed";

/// Decode an XML document into a clean (not dirty) design
pub fn decode_design(xml: &str) -> Result<MenuDesign> {
    DesignParser::new().parse(xml)
}

/// Parser state: the element chain currently being decoded
#[derive(Debug, Default)]
pub struct DesignParser {
    path: Vec<String>,
}

impl DesignParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&mut self, xml: &str) -> Result<MenuDesign> {
        let root = XmlElement::parse(xml)?;
        self.path.clear();
        self.path.push(root.tag.clone());
        if !root.is(tags::MENU_DESIGN) {
            return Err(self.malformed(format!("expected <{}> root element", tags::MENU_DESIGN)));
        }

        let name = self.required(&root, attrs::NAME)?;
        let mut design = self.model(MenuDesign::new(name))?;

        if let Some(email) = root.attr(attrs::AUTHOR_EMAIL) {
            self.model(design.set_author_email(Some(email)))?;
        }
        if let Some(value) = root.attr(attrs::DATE) {
            let date = parse_date(value)
                .ok_or_else(|| self.malformed(format!("invalid date '{}'", value)))?;
            design.set_date(date);
        }
        design.set_source_archive(non_empty(root.attr(attrs::SOURCE)));
        design.set_binaries_archive(non_empty(root.attr(attrs::BINARIES)));

        let root_id = design.root_id();
        for child in &root.children {
            self.read_child(&mut design, root_id, child)?;
        }

        self.model(design.validate())?;
        design.mark_clean();
        Ok(design)
    }

    fn read_child(&mut self, design: &mut MenuDesign, parent: NodeId, el: &XmlElement) -> Result<()> {
        self.path.push(segment(el));
        let result = self.read_element(design, parent, el);
        self.path.pop();
        result
    }

    fn read_element(&mut self, design: &mut MenuDesign, parent: NodeId, el: &XmlElement) -> Result<()> {
        if el.is(tags::MENU) {
            self.read_menu(design, parent, el)
        } else if el.is(tags::GRAPHIC_ENTRY) {
            self.read_graphic_entry(design, parent, el)
        } else if el.is(tags::FUNCTION) {
            let id = self.model(design.add_function(parent, PLACEHOLDER_NAME))?;
            self.read_function(design, id, el)
        } else if el.is(tags::PDF) {
            let path = self.required(el, attrs::PATH)?;
            self.model(design.add_pdf_file(parent, path))?;
            Ok(())
        } else if el.is(tags::SEPARATOR) {
            self.model(design.add_separator(parent))?;
            Ok(())
        } else {
            debug!(element = %el.tag, path = %self.path.join("/"), "ignoring unknown element");
            Ok(())
        }
    }

    fn read_menu(&mut self, design: &mut MenuDesign, parent: NodeId, el: &XmlElement) -> Result<()> {
        let id = match classify_menu(el) {
            MenuSpec::Regular => self.model(design.add_regular_menu(parent, PLACEHOLDER_NAME))?,
            MenuSpec::Graphic => {
                let id = self.model(design.add_graphic_menu(parent, PLACEHOLDER_NAME))?;
                let width = self.int_attr(el, attrs::WIDTH)?;
                let height = self.int_attr(el, attrs::HEIGHT)?;
                let columns = self.int_attr(el, attrs::COLUMNS)?;
                let menu = self.model(design.graphic_menu_mut(id))?;
                if let Some(width) = width {
                    menu.set_image_width(width);
                }
                if let Some(height) = height {
                    menu.set_image_height(height);
                }
                if let Some(columns) = columns {
                    menu.set_min_columns(columns);
                }
                id
            }
        };
        let name = self.required(el, attrs::NAME)?;
        self.model(design.rename(id, name))?;

        for child in &el.children {
            self.read_child(design, id, child)?;
        }
        Ok(())
    }

    fn read_graphic_entry(
        &mut self,
        design: &mut MenuDesign,
        parent: NodeId,
        el: &XmlElement,
    ) -> Result<()> {
        let function_el = el.child(tags::FUNCTION).ok_or_else(|| {
            self.malformed(format!("<{}> requires a <{}> child", tags::GRAPHIC_ENTRY, tags::FUNCTION))
        })?;

        let id = self.model(design.add_graphic_entry(parent, PLACEHOLDER_NAME))?;
        {
            let entry = self.model(design.graphic_entry_mut(id))?;
            entry.image_path = el.attr(attrs::IMAGE_PATH).unwrap_or_default().to_string();
            entry.tooltip = el.attr(attrs::TOOLTIP).unwrap_or_default().to_string();
        }
        let function_id = design
            .graphic_entry(id)
            .and_then(|entry| entry.function_id())
            .ok_or_else(|| self.malformed("graphic entry has no function"))?;

        for child in el.children.iter().filter(|c| !c.is(tags::FUNCTION)) {
            debug!(element = %child.tag, "ignoring graphic entry child");
        }

        self.path.push(segment(function_el));
        let result = self.read_function(design, function_id, function_el);
        self.path.pop();
        result
    }

    /// Fill a freshly attached function from its element. Renaming a function
    /// inside a graphic entry renames the entry too.
    fn read_function(&mut self, design: &mut MenuDesign, id: NodeId, el: &XmlElement) -> Result<()> {
        let name = self.required(el, attrs::NAME)?;
        self.model(design.rename(id, name))?;

        let has_data = self.bool_attr(el, attrs::HAS_DATA)?;
        let data_header = self.bool_attr(el, attrs::DATA_HEADER)?;
        let remove_quotes = self.bool_attr(el, attrs::REMOVE_QUOTES)?;

        let mut function = self.model(design.function(id).cloned().ok_or(
            menu_model::MenuModelError::NodeNotFound(id.as_uuid()),
        ))?;
        function.package = el.attr(attrs::PACKAGE).unwrap_or_default().to_string();
        if let Some(caption) = el.attr(attrs::CAPTION) {
            function.set_caption(caption);
        }
        function.pre_command = el.attr(attrs::PRE_COMMAND).unwrap_or_default().to_string();
        function.has_data = has_data.unwrap_or(false);
        function.data_header = data_header.unwrap_or(false);
        function.remove_quotes = remove_quotes.unwrap_or(false);

        for child in &el.children {
            self.path.push(segment(child));
            let result = self.read_function_child(&mut function, child);
            self.path.pop();
            result?;
        }

        *self.model(design.function_mut(id))? = function;
        Ok(())
    }

    fn read_function_child(&mut self, function: &mut Function, el: &XmlElement) -> Result<()> {
        if el.is(tags::EXAMPLE_DATA) {
            function.set_example_data_name(el.attr(attrs::NAME).unwrap_or_default());
            if let Some(start) = self.int_attr(el, attrs::START_COLUMN)? {
                self.model(function.set_start_column(self.column(start)?))?;
            }
            if let Some(end) = self.int_attr(el, attrs::END_COLUMN)? {
                self.model(function.set_end_column(self.column(end)?))?;
            }
        } else if el.is(tags::MANUAL) {
            function.set_pdf_name(el.attr(attrs::NAME).unwrap_or_default());
            if let Some(page) = self.int_attr(el, attrs::PAGE)? {
                self.model(function.set_pdf_page(page))?;
            }
        } else if el.is(tags::EXECUTE_ONCE) {
            function.set_execute_once(&el.text);
        } else if el.is(tags::ARGUMENT) {
            let argument = self.read_argument(el)?;
            self.model(function.add_argument(argument))?;
        } else if el.is(tags::CALL_ARGUMENT) {
            let call = self.read_call_argument(el)?;
            self.model(function.add_call_argument(call))?;
        } else {
            debug!(element = %el.tag, path = %self.path.join("/"), "ignoring unknown element");
        }
        Ok(())
    }

    fn read_argument(&self, el: &XmlElement) -> Result<Argument> {
        let mut argument = self.model(Argument::new(self.required(el, attrs::NAME)?))?;
        argument.value = el.attr(attrs::VALUE).unwrap_or_default().to_string();
        argument.required = self.bool_attr(el, attrs::REQUIRED)?.unwrap_or(false);
        argument.read_only = self.bool_attr(el, attrs::READ_ONLY)?.unwrap_or(false);
        argument.multiselect = self.bool_attr(el, attrs::MULTISELECT)?.unwrap_or(false);
        argument.depends_on = el.attr(attrs::DEPENDS_ON).unwrap_or_default().to_string();
        if let Some(viewer) = el.attr(attrs::VIEWER) {
            argument.viewer = viewer
                .parse::<ViewerKind>()
                .map_err(|_| self.malformed(format!("unknown viewer '{}'", viewer)))?;
        }
        Ok(argument)
    }

    fn read_call_argument(&mut self, el: &XmlElement) -> Result<CallArgument> {
        let mut call = self.model(CallArgument::new(self.required(el, attrs::NAME)?))?;
        for child in &el.children {
            if !child.is(tags::ARG) {
                debug!(element = %child.tag, "ignoring call argument child");
                continue;
            }
            self.path.push(segment(child));
            let arg = self
                .required(child, attrs::NAME)
                .and_then(|name| {
                    self.model(Arg::new(name, child.attr(attrs::VALUE).unwrap_or_default()))
                })
                .and_then(|arg| self.model(call.add_arg(arg)));
            self.path.pop();
            arg?;
        }
        Ok(call)
    }

    // =========================================================================
    // Attribute helpers
    // =========================================================================

    fn malformed(&self, message: impl Into<String>) -> StoreError {
        StoreError::MalformedDocument {
            path: self.path.join("/"),
            message: message.into(),
        }
    }

    fn model<T>(&self, result: menu_model::Result<T>) -> Result<T> {
        result.map_err(|e| self.malformed(e.to_string()))
    }

    fn required<'e>(&self, el: &'e XmlElement, name: &str) -> Result<&'e str> {
        el.attr(name)
            .ok_or_else(|| self.malformed(format!("missing attribute '{}'", name)))
    }

    fn bool_attr(&self, el: &XmlElement, name: &str) -> Result<Option<bool>> {
        match el.attr(name) {
            None => Ok(None),
            Some(value) => parse_bool(value)
                .map(Some)
                .ok_or_else(|| self.malformed(format!("invalid boolean '{}' for '{}'", value, name))),
        }
    }

    fn int_attr(&self, el: &XmlElement, name: &str) -> Result<Option<i64>> {
        match el.attr(name) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| self.malformed(format!("invalid integer '{}' for '{}'", value, name))),
        }
    }

    fn column(&self, value: i64) -> Result<i32> {
        i32::try_from(value).map_err(|_| self.malformed(format!("column {} out of range", value)))
    }
}

/// Path segment for an element: the tag, qualified by its name when it has one
fn segment(el: &XmlElement) -> String {
    match el.attr(attrs::NAME) {
        Some(name) if !name.is_empty() => format!("{}[{}]", el.tag, name),
        _ => el.tag.clone(),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use menu_model::NodeType;

    #[test]
    fn test_decode_minimal_design() {
        let design = decode_design(
            r#"<MenuDesign Name="App" AuthorEmail="me@example.org" Date="2024-01-31">
                 <Menu Name="Stats"><Function Name="ttest" HasData="true"/></Menu>
               </MenuDesign>"#,
        )
        .unwrap();
        assert_eq!(design.name(), "App");
        assert_eq!(design.author_email(), Some("me@example.org"));
        assert_eq!(design.date().to_string(), "2024-01-31");
        assert!(!design.is_dirty());

        let stats = design.look_up(design.root_id(), "Stats").unwrap();
        let ttest = design.look_up(stats, "ttest").unwrap();
        assert!(design.function(ttest).unwrap().has_data);
    }

    #[test]
    fn test_attribute_names_ignore_case() {
        let design = decode_design(
            r#"<menudesign name="App"><menu NAME="M"><function name="f" hasdata="FALSE"/></menu></menudesign>"#,
        )
        .unwrap();
        let menu = design.look_up(design.root_id(), "M").unwrap();
        let f = design.look_up(menu, "f").unwrap();
        assert!(!design.function(f).unwrap().has_data);
    }

    #[test]
    fn test_graphic_entry_mirrors_function_name() {
        let design = decode_design(
            r#"<MenuDesign Name="App">
                 <Menu Name="Plots" Width="300" Height="10" Columns="4">
                   <GraphicEntry ImagePath="hist.png" ToolTip="Histogram">
                     <Function Name="hist" Package="graphics"/>
                   </GraphicEntry>
                 </Menu>
               </MenuDesign>"#,
        )
        .unwrap();
        let plots = design.look_up(design.root_id(), "Plots").unwrap();
        assert_eq!(design.node_type(plots), Some(NodeType::GraphicMenu));
        let menu = design.graphic_menu(plots).unwrap();
        assert_eq!(menu.image_width(), 250);
        assert_eq!(menu.image_height(), 16);
        assert_eq!(menu.min_columns(), 4);

        let entry = design.look_up(plots, "hist").unwrap();
        let entry_ref = design.graphic_entry(entry).unwrap();
        assert_eq!(entry_ref.tooltip, "Histogram");
        let f = entry_ref.function_id().unwrap();
        assert_eq!(design.function(f).unwrap().package, "graphics");
    }

    #[test]
    fn test_missing_name_reports_path() {
        let err = decode_design(
            r#"<MenuDesign Name="App"><Menu Name="Stats"><Function/></Menu></MenuDesign>"#,
        )
        .unwrap_err();
        match err {
            StoreError::MalformedDocument { path, message } => {
                assert_eq!(path, "MenuDesign/Menu[Stats]/Function");
                assert_eq!(message, "missing attribute 'Name'");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_graphic_entry_requires_function() {
        let err = decode_design(
            r#"<MenuDesign Name="App"><Menu Name="P"><GraphicEntry ImagePath="a.png"/></Menu></MenuDesign>"#,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::MalformedDocument { ref path, .. } if path == "MenuDesign/Menu[P]/GraphicEntry"));
    }

    #[test]
    fn test_bad_scalars_fail() {
        let bad = [
            r#"<MenuDesign Name="App" Date="31/01/2024"/>"#,
            r#"<MenuDesign Name="App"><Function Name="f" HasData="yes"/></MenuDesign>"#,
            r#"<MenuDesign Name="App"><Function Name="f"><Manual Page="0"/></Function></MenuDesign>"#,
            r#"<MenuDesign Name="App"><Function Name="f"><Argument Name="a" Viewer="Slider"/></Function></MenuDesign>"#,
            r#"<MenuDesign Name="App"><Function Name="f"><Argument Name="a"/><Argument Name="a"/></Function></MenuDesign>"#,
            r#"<Design Name="App"/>"#,
        ];
        for xml in bad {
            assert!(
                matches!(decode_design(xml), Err(StoreError::MalformedDocument { .. })),
                "{xml}"
            );
        }
    }

    #[test]
    fn test_unknown_elements_are_skipped() {
        let design = decode_design(
            r#"<MenuDesign Name="App"><Toolbar/><Function Name="f"><Shortcut Key="F5"/></Function></MenuDesign>"#,
        )
        .unwrap();
        assert_eq!(design.children(design.root_id()).len(), 1);
    }
}
