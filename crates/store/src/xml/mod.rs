//! Menu design XML codec
//!
//! ## Vocabulary
//!
//! ```text
//! <MenuDesign Name AuthorEmail Date Source Binaries>
//!   <Menu Name [Width Height Columns]>        regular or graphic menu
//!   <Function Name Package Caption PreCommand HasData DataHeader RemoveQuotes>
//!     <ExampleData Name StartColumn EndColumn/>
//!     <Manual Name Page/>
//!     <ExecuteOnce>statements, one per line</ExecuteOnce>
//!     <Argument Name Value Required ReadOnly Multiselect DependsOn Viewer/>
//!     <CallArgument Name><Arg Name Value/></CallArgument>
//!   </Function>
//!   <PDF Path/>
//!   <Separator/>
//!   <GraphicEntry ImagePath ToolTip><Function .../></GraphicEntry>
//! ```
//!
//! Attributes at their type default are omitted on write. Attribute and tag
//! lookups on read ignore ASCII case.

mod classify;
mod element;
mod parser;
mod values;
mod writer;

pub use classify::{classify_menu, MenuSpec};
pub use element::XmlElement;
pub use parser::{decode_design, DesignParser};
pub use values::{format_bool, format_date, parse_bool, parse_date, DATE_FORMAT};
pub use writer::{encode_design, DesignWriter};

/// Element names
pub mod tags {
    pub const MENU_DESIGN: &str = "MenuDesign";
    pub const MENU: &str = "Menu";
    pub const FUNCTION: &str = "Function";
    pub const EXAMPLE_DATA: &str = "ExampleData";
    pub const MANUAL: &str = "Manual";
    pub const EXECUTE_ONCE: &str = "ExecuteOnce";
    pub const ARGUMENT: &str = "Argument";
    pub const CALL_ARGUMENT: &str = "CallArgument";
    pub const ARG: &str = "Arg";
    pub const PDF: &str = "PDF";
    pub const SEPARATOR: &str = "Separator";
    pub const GRAPHIC_ENTRY: &str = "GraphicEntry";
}

/// Attribute names
pub mod attrs {
    pub const NAME: &str = "Name";
    pub const AUTHOR_EMAIL: &str = "AuthorEmail";
    pub const DATE: &str = "Date";
    pub const SOURCE: &str = "Source";
    pub const BINARIES: &str = "Binaries";
    pub const WIDTH: &str = "Width";
    pub const HEIGHT: &str = "Height";
    pub const COLUMNS: &str = "Columns";
    pub const PACKAGE: &str = "Package";
    pub const CAPTION: &str = "Caption";
    pub const PRE_COMMAND: &str = "PreCommand";
    pub const HAS_DATA: &str = "HasData";
    pub const DATA_HEADER: &str = "DataHeader";
    pub const REMOVE_QUOTES: &str = "RemoveQuotes";
    pub const START_COLUMN: &str = "StartColumn";
    pub const END_COLUMN: &str = "EndColumn";
    pub const PAGE: &str = "Page";
    pub const VALUE: &str = "Value";
    pub const REQUIRED: &str = "Required";
    pub const READ_ONLY: &str = "ReadOnly";
    pub const MULTISELECT: &str = "Multiselect";
    pub const DEPENDS_ON: &str = "DependsOn";
    pub const VIEWER: &str = "Viewer";
    pub const PATH: &str = "Path";
    pub const IMAGE_PATH: &str = "ImagePath";
    pub const TOOLTIP: &str = "ToolTip";
}
