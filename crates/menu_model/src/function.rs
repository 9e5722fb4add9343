//! Function nodes and their argument lists
//!
//! A [`Function`] is a leaf of the menu tree that invokes a routine from a
//! package. It carries two independently keyed argument collections (plain
//! [`Argument`]s and nested [`CallArgument`] invocations) and an ordered
//! "execute once" program that runs before the first invocation.

use crate::{validate_name, MenuModelError, Node, NodeId, NodeType, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Column value meaning "not set"
pub const UNSET_COLUMN: i32 = -1;

/// First page of a manual
pub const FIRST_PAGE: u32 = 1;

/// Widget used to edit an argument's value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewerKind {
    #[default]
    Default,
    Text,
    Number,
    CheckBox,
    ComboBox,
    ListBox,
    File,
    Folder,
    Variable,
    Variables,
}

impl ViewerKind {
    pub const ALL: [ViewerKind; 10] = [
        ViewerKind::Default,
        ViewerKind::Text,
        ViewerKind::Number,
        ViewerKind::CheckBox,
        ViewerKind::ComboBox,
        ViewerKind::ListBox,
        ViewerKind::File,
        ViewerKind::Folder,
        ViewerKind::Variable,
        ViewerKind::Variables,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewerKind::Default => "Default",
            ViewerKind::Text => "Text",
            ViewerKind::Number => "Number",
            ViewerKind::CheckBox => "CheckBox",
            ViewerKind::ComboBox => "ComboBox",
            ViewerKind::ListBox => "ListBox",
            ViewerKind::File => "File",
            ViewerKind::Folder => "Folder",
            ViewerKind::Variable => "Variable",
            ViewerKind::Variables => "Variables",
        }
    }
}

impl FromStr for ViewerKind {
    type Err = MenuModelError;

    /// Parse a viewer name, ignoring ASCII case
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        ViewerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| MenuModelError::InvalidArgument(format!("unknown viewer kind '{}'", s)))
    }
}

impl std::fmt::Display for ViewerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed parameter of a function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    name: String,
    pub value: String,
    pub required: bool,
    pub read_only: bool,
    pub multiselect: bool,
    /// Free-text reference to the argument this one depends on
    pub depends_on: String,
    pub viewer: ViewerKind,
}

impl Argument {
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            name: validate_name(name)?,
            value: String::new(),
            required: false,
            read_only: false,
            multiselect: false,
            depends_on: String::new(),
            viewer: ViewerKind::Default,
        })
    }

    /// Convenience constructor for an argument with a value
    pub fn with_value(name: &str, value: impl Into<String>) -> Result<Self> {
        let mut arg = Self::new(name)?;
        arg.value = value.into();
        Ok(arg)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A name/value pair inside a [`CallArgument`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arg {
    name: String,
    pub value: String,
}

impl Arg {
    pub fn new(name: &str, value: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: validate_name(name)?,
            value: value.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A nested function invocation passed as an argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallArgument {
    name: String,
    args: Vec<Arg>,
}

impl CallArgument {
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            name: validate_name(name)?,
            args: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn arg(&self, name: &str) -> Option<&Arg> {
        self.args.iter().find(|a| a.name == name)
    }

    pub fn add_arg(&mut self, arg: Arg) -> Result<()> {
        if self.arg(arg.name()).is_some() {
            return Err(MenuModelError::DuplicateName(arg.name));
        }
        self.args.push(arg);
        Ok(())
    }

    pub fn remove_arg(&mut self, name: &str) -> Result<Arg> {
        let index = self
            .args
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| MenuModelError::NotFound(format!("arg '{}'", name)))?;
        Ok(self.args.remove(index))
    }
}

/// Sample data set shipped with a function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleData {
    pub name: String,
    start_column: i32,
    end_column: i32,
}

impl Default for ExampleData {
    fn default() -> Self {
        Self {
            name: String::new(),
            start_column: UNSET_COLUMN,
            end_column: UNSET_COLUMN,
        }
    }
}

impl ExampleData {
    pub fn start_column(&self) -> i32 {
        self.start_column
    }

    pub fn end_column(&self) -> i32 {
        self.end_column
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Reference into a PDF manual
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualReference {
    pub pdf_name: String,
    page: u32,
}

impl Default for ManualReference {
    fn default() -> Self {
        Self {
            pdf_name: String::new(),
            page: FIRST_PAGE,
        }
    }
}

impl ManualReference {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// An invokable routine in a menu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) name: String,
    pub package: String,
    caption: String,
    pub pre_command: String,
    pub has_data: bool,
    pub data_header: bool,
    pub remove_quotes: bool,
    example_data: ExampleData,
    manual: ManualReference,
    execute_once: Vec<String>,
    arguments: Vec<Argument>,
    call_arguments: Vec<CallArgument>,
}

impl Function {
    pub(crate) fn new(name: String) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            name,
            package: String::new(),
            caption: String::new(),
            pre_command: String::new(),
            has_data: false,
            data_header: false,
            remove_quotes: false,
            example_data: ExampleData::default(),
            manual: ManualReference::default(),
            execute_once: Vec::new(),
            arguments: Vec::new(),
            call_arguments: Vec::new(),
        }
    }

    /// Caption shown to users; falls back to the function name
    pub fn caption(&self) -> &str {
        if self.caption.is_empty() {
            &self.name
        } else {
            &self.caption
        }
    }

    /// Whether a caption distinct from the name has been set
    pub fn has_custom_caption(&self) -> bool {
        !self.caption.is_empty() && self.caption != self.name
    }

    /// Store a trimmed caption; blank or name-equal captions clear it
    pub fn set_caption(&mut self, caption: impl Into<String>) {
        let caption = caption.into();
        let caption = caption.trim();
        self.caption = if caption == self.name {
            String::new()
        } else {
            caption.to_string()
        };
    }

    // ---------------------------------------------------------------------
    // Example data and manual
    // ---------------------------------------------------------------------

    pub fn example_data(&self) -> &ExampleData {
        &self.example_data
    }

    pub fn set_example_data_name(&mut self, name: impl Into<String>) {
        self.example_data.name = name.into();
    }

    pub fn set_start_column(&mut self, column: i32) -> Result<()> {
        self.example_data.start_column = check_column(column)?;
        Ok(())
    }

    pub fn set_end_column(&mut self, column: i32) -> Result<()> {
        self.example_data.end_column = check_column(column)?;
        Ok(())
    }

    pub fn manual(&self) -> &ManualReference {
        &self.manual
    }

    pub fn set_pdf_name(&mut self, pdf_name: impl Into<String>) {
        self.manual.pdf_name = pdf_name.into();
    }

    pub fn set_pdf_page(&mut self, page: i64) -> Result<()> {
        if page < FIRST_PAGE as i64 || page > u32::MAX as i64 {
            return Err(MenuModelError::InvalidArgument(format!(
                "PDF page must be at least {}, got {}",
                FIRST_PAGE, page
            )));
        }
        self.manual.page = page as u32;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Execute-once program
    // ---------------------------------------------------------------------

    pub fn execute_once(&self) -> &[String] {
        &self.execute_once
    }

    /// Statements joined by newlines
    pub fn execute_once_text(&self) -> String {
        self.execute_once.join("\n")
    }

    /// Replace the program with the non-blank lines of `text`
    pub fn set_execute_once(&mut self, text: &str) {
        self.execute_once = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
    }

    /// Append one statement; blank statements are ignored
    pub fn add_statement(&mut self, statement: &str) {
        let statement = statement.trim();
        if !statement.is_empty() {
            self.execute_once.push(statement.to_string());
        }
    }

    pub fn clear_statements(&mut self) {
        self.execute_once.clear();
    }

    // ---------------------------------------------------------------------
    // Arguments
    // ---------------------------------------------------------------------

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }

    pub fn argument_mut(&mut self, name: &str) -> Option<&mut Argument> {
        self.arguments.iter_mut().find(|a| a.name == name)
    }

    pub fn add_argument(&mut self, argument: Argument) -> Result<()> {
        if self.argument(argument.name()).is_some() {
            return Err(MenuModelError::DuplicateName(argument.name));
        }
        self.arguments.push(argument);
        Ok(())
    }

    pub fn remove_argument(&mut self, name: &str) -> Result<Argument> {
        let index = self
            .arguments
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| MenuModelError::NotFound(format!("argument '{}'", name)))?;
        Ok(self.arguments.remove(index))
    }

    /// Move an argument to a new position in the list
    pub fn move_argument(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.arguments.len();
        if from >= len || to >= len {
            return Err(MenuModelError::InvalidArgument(format!(
                "argument index out of range: {} -> {} (len {})",
                from, to, len
            )));
        }
        let arg = self.arguments.remove(from);
        self.arguments.insert(to, arg);
        Ok(())
    }

    pub fn rename_argument(&mut self, old: &str, new: &str) -> Result<()> {
        let new = validate_name(new)?;
        if old != new && self.argument(&new).is_some() {
            return Err(MenuModelError::DuplicateName(new));
        }
        let arg = self
            .argument_mut(old)
            .ok_or_else(|| MenuModelError::NotFound(format!("argument '{}'", old)))?;
        arg.name = new;
        Ok(())
    }

    pub fn call_arguments(&self) -> &[CallArgument] {
        &self.call_arguments
    }

    pub fn call_argument(&self, name: &str) -> Option<&CallArgument> {
        self.call_arguments.iter().find(|a| a.name == name)
    }

    pub fn call_argument_mut(&mut self, name: &str) -> Option<&mut CallArgument> {
        self.call_arguments.iter_mut().find(|a| a.name == name)
    }

    pub fn add_call_argument(&mut self, call: CallArgument) -> Result<()> {
        if self.call_argument(call.name()).is_some() {
            return Err(MenuModelError::DuplicateName(call.name));
        }
        self.call_arguments.push(call);
        Ok(())
    }

    pub fn remove_call_argument(&mut self, name: &str) -> Result<CallArgument> {
        let index = self
            .call_arguments
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| MenuModelError::NotFound(format!("call argument '{}'", name)))?;
        Ok(self.call_arguments.remove(index))
    }
}

fn check_column(column: i32) -> Result<i32> {
    if column < UNSET_COLUMN {
        return Err(MenuModelError::InvalidArgument(format!(
            "column must be {} or greater, got {}",
            UNSET_COLUMN, column
        )));
    }
    Ok(column)
}

impl Node for Function {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Function
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function() -> Function {
        Function::new("ttest".to_string())
    }

    #[test]
    fn test_caption_falls_back_to_name() {
        let mut f = function();
        assert_eq!(f.caption(), "ttest");
        assert!(!f.has_custom_caption());

        f.set_caption("Student's t-test");
        assert_eq!(f.caption(), "Student's t-test");
        assert!(f.has_custom_caption());

        f.set_caption("ttest");
        assert!(!f.has_custom_caption());
    }

    #[test]
    fn test_caption_is_trimmed() {
        let mut f = function();
        f.set_caption(" ttest ");
        assert!(!f.has_custom_caption());
        assert_eq!(f.caption(), "ttest");

        f.set_caption("  Student  ");
        assert_eq!(f.caption(), "Student");
        assert!(f.has_custom_caption());

        f.set_caption("   ");
        assert!(!f.has_custom_caption());
    }

    #[test]
    fn test_duplicate_argument_rejected() {
        let mut f = function();
        f.add_argument(Argument::with_value("alpha", "0.05").unwrap()).unwrap();
        let err = f.add_argument(Argument::new("alpha").unwrap()).unwrap_err();
        assert_eq!(err, MenuModelError::DuplicateName("alpha".into()));
        assert_eq!(f.arguments().len(), 1);
    }

    #[test]
    fn test_argument_and_call_argument_keys_are_independent() {
        let mut f = function();
        f.add_argument(Argument::new("x").unwrap()).unwrap();
        f.add_call_argument(CallArgument::new("x").unwrap()).unwrap();
        assert!(f.add_call_argument(CallArgument::new("x").unwrap()).is_err());
    }

    #[test]
    fn test_blank_argument_name_rejected() {
        assert!(matches!(
            Argument::new("  "),
            Err(MenuModelError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_page_and_columns_validation() {
        let mut f = function();
        assert!(f.set_pdf_page(0).is_err());
        f.set_pdf_page(12).unwrap();
        assert_eq!(f.manual().page(), 12);

        assert!(f.set_start_column(-2).is_err());
        f.set_start_column(-1).unwrap();
        f.set_end_column(7).unwrap();
        assert_eq!(f.example_data().end_column(), 7);
        assert!(f.set_end_column(-5).is_err());
        assert_eq!(f.example_data().end_column(), 7);
    }

    #[test]
    fn test_execute_once_drops_blank_lines() {
        let mut f = function();
        f.set_execute_once("library(stats)\n\n   \n  x <- 1  \n");
        assert_eq!(f.execute_once(), ["library(stats)", "x <- 1"]);
        assert_eq!(f.execute_once_text(), "library(stats)\nx <- 1");

        f.add_statement("   ");
        assert_eq!(f.execute_once().len(), 2);
        f.add_statement("y <- 2");
        assert_eq!(f.execute_once().len(), 3);
    }

    #[test]
    fn test_move_and_rename_argument() {
        let mut f = function();
        for name in ["a", "b", "c"] {
            f.add_argument(Argument::new(name).unwrap()).unwrap();
        }
        f.move_argument(2, 0).unwrap();
        let names: Vec<_> = f.arguments().iter().map(|a| a.name()).collect();
        assert_eq!(names, ["c", "a", "b"]);

        assert!(matches!(
            f.rename_argument("a", "b"),
            Err(MenuModelError::DuplicateName(_))
        ));
        f.rename_argument("a", "alpha").unwrap();
        assert!(f.argument("alpha").is_some());
        assert!(matches!(
            f.remove_argument("a"),
            Err(MenuModelError::NotFound(_))
        ));
    }

    #[test]
    fn test_call_argument_args() {
        let mut call = CallArgument::new("control").unwrap();
        call.add_arg(Arg::new("maxit", "50").unwrap()).unwrap();
        assert!(call.add_arg(Arg::new("maxit", "10").unwrap()).is_err());
        assert_eq!(call.arg("maxit").unwrap().value, "50");
        call.remove_arg("maxit").unwrap();
        assert!(call.args().is_empty());
    }

    #[test]
    fn test_clone_does_not_alias() {
        let mut f = function();
        f.add_argument(Argument::with_value("alpha", "0.05").unwrap()).unwrap();
        let mut copy = f.clone();
        copy.argument_mut("alpha").unwrap().value = "0.01".into();
        assert_eq!(f.argument("alpha").unwrap().value, "0.05");
    }

    #[test]
    fn test_viewer_kind_parse() {
        assert_eq!("combobox".parse::<ViewerKind>().unwrap(), ViewerKind::ComboBox);
        assert_eq!("Variables".parse::<ViewerKind>().unwrap(), ViewerKind::Variables);
        assert!("slider".parse::<ViewerKind>().is_err());
    }
}
